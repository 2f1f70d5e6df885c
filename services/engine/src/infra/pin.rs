use anyhow::Context as _;
use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use tillwise_domain::id::{ShopId, StaffId};

use crate::domain::repository::{CredentialPort, PinHashSource, StaffRepository};
use crate::domain::types::StaffRecord;
use crate::error::EngineError;

/// Hash a PIN with argon2id and a random salt (PHC string).
pub fn hash_pin(pin: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(pin.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| anyhow::anyhow!("hash pin: {e}"))
}

/// Constant-time check of `pin` against a stored hash. Malformed hashes never match.
pub fn verify_pin_hash(pin: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(pin.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

pub struct Argon2CredentialPort<St: StaffRepository + PinHashSource> {
    pub staff: St,
}

impl<St: StaffRepository + PinHashSource> CredentialPort for Argon2CredentialPort<St> {
    async fn verify_pin(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
        pin: &str,
    ) -> Result<Option<StaffRecord>, EngineError> {
        let Some(hash) = self.staff.pin_hash(shop_id, staff_id).await? else {
            return Ok(None);
        };

        // CPU-bound; run on the blocking pool.
        let pin = pin.to_owned();
        let matches = tokio::task::spawn_blocking(move || verify_pin_hash(&pin, &hash))
            .await
            .context("pin verification task")?;
        if !matches {
            return Ok(None);
        }

        self.staff.get_staff(shop_id, staff_id).await
    }
}

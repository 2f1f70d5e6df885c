use std::time::Duration;

use serde::Deserialize;

use tillwise_core::config::Config;
use tillwise_core::error::AppError;
use tillwise_domain::role::{BusinessMode, Role};

use crate::domain::idle::IdlePolicy;
use crate::domain::types::{DEFAULT_IDLE_TIMEOUT_MINUTES, IDLE_WARNING_LEAD_SECS};

/// Engine configuration loaded from `TILLWISE_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL` (no prefix).
    /// Optional: library users may hand in their own repositories.
    #[serde(skip)]
    pub database_url: Option<String>,
    /// Env var: `TILLWISE_IDLE_TIMEOUT_MINUTES` (default 5).
    #[serde(default = "default_idle_timeout_minutes")]
    pub idle_timeout_minutes: u64,
    /// Env var: `TILLWISE_IDLE_WARNING_SECS` (default 90).
    #[serde(default = "default_idle_warning_secs")]
    pub idle_warning_secs: u64,
    /// Comma-separated. Env var: `TILLWISE_IDLE_EXEMPT_ROLES` (default `chef`).
    #[serde(default = "default_idle_exempt_roles")]
    pub idle_exempt_roles: Vec<Role>,
    /// Env var: `TILLWISE_BUSINESS_MODE` (default `table_order`).
    #[serde(default = "default_business_mode")]
    pub business_mode: BusinessMode,
}

fn default_idle_timeout_minutes() -> u64 {
    DEFAULT_IDLE_TIMEOUT_MINUTES
}

fn default_idle_warning_secs() -> u64 {
    IDLE_WARNING_LEAD_SECS
}

fn default_idle_exempt_roles() -> Vec<Role> {
    vec![Role::Chef]
}

fn default_business_mode() -> BusinessMode {
    BusinessMode::TableOrder
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            idle_timeout_minutes: default_idle_timeout_minutes(),
            idle_warning_secs: default_idle_warning_secs(),
            idle_exempt_roles: default_idle_exempt_roles(),
            business_mode: default_business_mode(),
        }
    }
}

impl Config for EngineConfig {
    const PREFIX: &'static str = "TILLWISE_";
}

impl EngineConfig {
    /// Read the prefixed settings plus `DATABASE_URL` from the process environment.
    pub fn load() -> Result<Self, AppError> {
        let mut config = Self::try_from_env()?;
        config.database_url = std::env::var("DATABASE_URL").ok();
        Ok(config)
    }

    pub fn require_database_url(&self) -> Result<&str, AppError> {
        self.database_url
            .as_deref()
            .ok_or(AppError::MissingSetting("DATABASE_URL"))
    }

    pub fn idle_policy(&self) -> IdlePolicy {
        IdlePolicy::from_minutes(self.idle_timeout_minutes)
            .with_warning_lead(Duration::from_secs(self.idle_warning_secs))
            .with_exempt_roles(self.idle_exempt_roles.iter().copied())
    }
}

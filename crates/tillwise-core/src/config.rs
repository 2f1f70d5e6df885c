/// Trait for loading configuration from environment variables.
///
/// Implementors derive `serde::Deserialize` (with `#[serde(default = ...)]` for
/// optional settings) and pick an env-var prefix. Field `idle_timeout_minutes`
/// with prefix `TILLWISE_` reads `TILLWISE_IDLE_TIMEOUT_MINUTES`. Sequence
/// fields are comma-separated.
pub trait Config: Sized + serde::de::DeserializeOwned {
    /// Env-var prefix, including the trailing underscore.
    const PREFIX: &'static str;

    fn try_from_env() -> Result<Self, envy::Error> {
        envy::prefixed(Self::PREFIX).from_env()
    }

    /// # Panics
    ///
    /// Panics if any required env var is missing or cannot be deserialized.
    fn from_env() -> Self {
        Self::try_from_env().expect("failed to load config from environment")
    }

    /// Load from an explicit iterator of `(name, value)` pairs instead of the
    /// process environment.
    fn from_pairs<I>(pairs: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(Self::PREFIX).from_iter(pairs)
    }
}

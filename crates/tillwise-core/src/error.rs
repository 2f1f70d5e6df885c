/// Failures while bringing an engine up: configuration and connections.
///
/// Request-level outcomes have their own error type in the engine crate.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid configuration: {0}")]
    Config(#[from] envy::Error),
    #[error("missing setting {0}")]
    MissingSetting(&'static str),
    #[error("startup failed")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::MissingSetting(_) => "MISSING_SETTING",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PeptofitError {
    #[error("Strain '{0}' not found in catalog")]
    StrainNotFound(String),

    #[error("Peptone '{0}' not found in catalog")]
    PeptoneNotFound(String),

    #[error("Invalid blend: {0}")]
    InvalidBlend(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

use thiserror::Error;

/// Errors emitted while building a buffer, simulator or storm.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LightningError {
    /// Dimensions or tuning values that cannot drive a simulation.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl LightningError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        LightningError::InvalidConfiguration(msg.into())
    }
}

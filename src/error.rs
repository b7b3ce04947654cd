use thiserror::Error;

#[derive(Debug, Error)]
pub enum EtaError {
    #[error("unknown {field} condition: {value:?}")]
    UnknownCondition { field: &'static str, value: String },
    #[error("invalid trip context: {0}")]
    InvalidTripContext(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl EtaError {
    pub fn unknown(field: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownCondition {
            field,
            value: value.into(),
        }
    }

    /// Errors the caller must surface instead of showing an ETA.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownCondition { .. } | Self::InvalidTripContext(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EtaError>;

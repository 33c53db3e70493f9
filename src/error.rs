use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BloodTypeError {
    /// The candidate string does not name one of the eight blood types.
    #[error("Unrecognized blood type: {0:?}")]
    InvalidIdentifier(String),
}

impl BloodTypeError {
    pub fn invalid(candidate: impl Into<String>) -> Self {
        BloodTypeError::InvalidIdentifier(candidate.into())
    }
}

pub type Result<T> = std::result::Result<T, BloodTypeError>;

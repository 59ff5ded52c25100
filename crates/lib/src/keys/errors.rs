//! Error types for the key store
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Username must not be empty")]
    EmptyUsername,

    #[error("Key id must not be empty")]
    EmptyKeyId,
}

impl KeyError {
    /// Check if this error rejects caller input.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, KeyError::EmptyUsername | KeyError::EmptyKeyId)
    }
}

impl From<KeyError> for crate::Error {
    fn from(err: KeyError) -> Self {
        crate::Error::Key(err)
    }
}

use crate::{
    patch::{CompileError, PatchError},
    store::StoreError,
};

/// Errors returned by the item repository.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The item or patch failed basic shape checks. Never retried.
    #[error("{0}")]
    Validation(String),
    /// The targeted item does not exist.
    #[error("item `{0}` not found")]
    NotFound(String),
    /// The patch could not be compiled into an update expression.
    #[error(transparent)]
    Compile(#[from] CompileError),
    /// The store failed to carry out the request.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PatchError> for Error {
    fn from(error: PatchError) -> Self {
        Self::Validation(error.to_string())
    }
}

impl Error {
    /// Whether the caller sent something unusable, as opposed to the service failing.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound(_) | Self::Compile(CompileError::Value { .. })
        )
    }
}

/// Result alias for repository operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

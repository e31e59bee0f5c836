use frontdoor_domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// The resource is already present and has to be imported rather than created.
    #[error("a resource with the ID {id:?} already exists - to be managed it needs to be imported")]
    AlreadyExists { id: String },

    #[error("retrieving {id}: {message}")]
    Api { id: String, message: String },

    #[error("operation failed: {0}")]
    OperationFailed(String),

    #[error("decoding response for {id}: {message}")]
    Decode { id: String, message: String },

    #[error("internal driver error: {0}")]
    Internal(String),
}

impl DriverError {
    /// True when the failure came from local validation, before any request.
    pub fn is_validation(&self) -> bool {
        matches!(self, DriverError::Validation(_))
    }
}

use frontdoor_driver::DriverError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccTestError {
    #[error("step {step}: {source}")]
    Step {
        step: usize,
        #[source]
        source: DriverError,
    },

    #[error("step {step}: expected an error containing {expected:?}, got none")]
    UnexpectedSuccess { step: usize, expected: String },

    #[error("step {step}: expected an error containing {expected:?}, got: {actual}")]
    WrongError {
        step: usize,
        expected: String,
        actual: String,
    },

    #[error("step {step}: {id} does not exist after apply")]
    NotFoundAfterApply { step: usize, id: String },

    #[error("step {step}: import has no applied resource to compare against")]
    NothingToImport { step: usize },

    #[error("step {step}: imported state of {id} differs from configuration:\n  applied:  {applied}\n  imported: {imported}")]
    ImportMismatch {
        step: usize,
        id: String,
        applied: String,
        imported: String,
    },

    #[error("{id} still exists after destroy")]
    NotDestroyed { id: String },

    #[error("destroying {id}: {source}")]
    Destroy {
        id: String,
        #[source]
        source: DriverError,
    },
}

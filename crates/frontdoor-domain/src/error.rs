use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("parsing {kind} id {id:?}: {reason}")]
    InvalidResourceId {
        kind: &'static str,
        id: String,
        reason: String,
    },

    #[error(
        "{field:?} must not start with {prefix:?} if the duration is less than 1 day. \
         If the {field:?} is less than 1 day it should be in the HH:MM:SS format, got {value:?}"
    )]
    MalformedDuration {
        field: String,
        prefix: &'static str,
        value: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub mod duration;
pub mod error;
pub mod ids;
pub mod rule;
pub mod secret;


pub use duration::{validate_cache_duration, CACHE_DURATION_FIELD, ZERO_DAYS_PREFIX};
pub use error::DomainError;
pub use ids::{
    FrontdoorOriginGroupId, FrontdoorProfileId, FrontdoorRuleId, FrontdoorRuleSetId,
    FrontdoorSecretId,
};
pub use rule::*;
pub use secret::{Secret, SecretParameters};

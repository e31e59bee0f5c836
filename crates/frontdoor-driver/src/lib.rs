pub mod arm;
pub mod driver;
pub mod error;
pub mod memory;
pub mod rules;
pub mod secrets;

pub use arm::{ArmClient, StaticToken, TokenProvider};
pub use driver::ResourceLifecycle;
pub use error::DriverError;
pub use memory::{InMemoryRules, InMemorySecrets};
pub use rules::FrontdoorRulesClient;
pub use secrets::FrontdoorSecretsClient;

pub mod data;
pub mod error;
pub mod fixtures;
pub mod hcl;
pub mod runner;

pub use data::TestData;
pub use error::AccTestError;
pub use fixtures::{rule, secret, Fixture};
pub use runner::{ResourceTest, TestStep};

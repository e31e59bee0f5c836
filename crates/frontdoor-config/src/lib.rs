mod raw;
mod loader;
pub mod error;
pub mod settings;

pub use error::ConfigError;
pub use loader::{load_resource_file, load_resources, parse_resource, ResourceConfig};
pub use settings::ClientSettings;

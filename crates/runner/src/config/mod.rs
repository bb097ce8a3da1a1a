pub mod loader;

pub use loader::{ConfigError, load_config, load_config_from_str, load_default_config};

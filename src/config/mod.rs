mod config;

pub use config::{CONFIG_FILE_NAME, ListingConfig, ListingConfigError};

/// Database configuration and connection management
pub mod database;

/// Application settings loading from config.toml
pub mod settings;

/// Initial admin account configuration from environment variables
pub mod users;

pub use settings::{OffDayConfig, OrganizationConfig, Settings, SyncConfig};

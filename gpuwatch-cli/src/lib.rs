pub mod commands;
pub mod config;

// Re-export commonly used types
pub use commands::RunArgs;
pub use config::{load_config, load_config_from};

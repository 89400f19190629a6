//! Configuration: `pagescore.toml` sections plus environment overrides.

pub mod limits_config;
pub mod pagescore_config;
pub mod server_config;
pub mod share_config;
pub mod storage_config;

pub use limits_config::LimitsConfig;
pub use pagescore_config::PageScoreConfig;
pub use server_config::{LoggingConfig, ServerConfig};
pub use share_config::ShareConfig;
pub use storage_config::StorageConfig;

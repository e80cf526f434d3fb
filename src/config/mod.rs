//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CacheSettings, CorsConfig, LogFormat, LoggingConfig, PortalConfig, ServerConfig,
};

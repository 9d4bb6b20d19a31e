//! Configuration module

pub mod settings;

pub use settings::{
    AssetHostConfig, CorsConfig, FetchConfig, LoggingConfig, ProcessingConfig, PublishConfig,
    RateLimitConfig, ServerConfig, Settings, SynthesisConfig,
};

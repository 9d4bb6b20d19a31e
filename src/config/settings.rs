//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub asset_host: AssetHostConfig,
    #[serde(default)]
    pub publish: PublishConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Cross-origin configuration. An empty origin list allows any origin.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

fn default_true() -> bool {
    true
}

fn default_rps() -> u32 {
    5
}

fn default_burst() -> u32 {
    20
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: default_rps(),
            burst_size: default_burst(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Image synthesis API configuration (OpenAI-compatible)
#[derive(Clone, Deserialize, Serialize)]
pub struct SynthesisConfig {
    #[serde(default = "default_synthesis_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    /// Run the chat pattern-description step for raw `prompt` requests
    #[serde(default = "default_true")]
    pub describe_patterns: bool,
    #[serde(default = "default_size")]
    pub default_size: String,
    #[serde(default = "default_synthesis_timeout")]
    pub timeout_ms: u64,
}

fn default_synthesis_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_chat_model() -> String {
    "gpt-4-turbo-preview".to_string()
}

fn default_size() -> String {
    "1024x1024".to_string()
}

fn default_synthesis_timeout() -> u64 {
    120_000
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            base_url: default_synthesis_base_url(),
            api_key: String::new(),
            image_model: default_image_model(),
            chat_model: default_chat_model(),
            describe_patterns: true,
            default_size: default_size(),
            timeout_ms: default_synthesis_timeout(),
        }
    }
}

// Hand-written so the API key never lands in logs.
impl std::fmt::Debug for SynthesisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("image_model", &self.image_model)
            .field("chat_model", &self.chat_model)
            .field("describe_patterns", &self.describe_patterns)
            .field("default_size", &self.default_size)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// Source asset fetch configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_fetch_timeout() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36"
        .to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Post-processing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessingConfig {
    /// One of `none`, `center_crop`, `mirror_tile`, `optimize`
    #[serde(default = "default_processing_mode")]
    pub mode: String,
    #[serde(default = "default_target_dimension")]
    pub target_width: u32,
    #[serde(default = "default_target_dimension")]
    pub target_height: u32,
    #[serde(default = "default_target_dimension")]
    pub max_width: u32,
    /// `png` or `jpeg`
    #[serde(default = "default_output_format")]
    pub output_format: String,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_processing_mode() -> String {
    "none".to_string()
}

fn default_target_dimension() -> u32 {
    1024
}

fn default_output_format() -> String {
    "png".to_string()
}

fn default_jpeg_quality() -> u8 {
    80
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            mode: default_processing_mode(),
            target_width: default_target_dimension(),
            target_height: default_target_dimension(),
            max_width: default_target_dimension(),
            output_format: default_output_format(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

/// Asset host (Shopify Admin GraphQL) configuration
#[derive(Clone, Deserialize, Serialize)]
pub struct AssetHostConfig {
    /// Store domain, e.g. `example.myshopify.com`
    #[serde(default)]
    pub store_domain: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub access_token: String,
    /// Full GraphQL endpoint; overrides the one derived from `store_domain`
    #[serde(default)]
    pub graphql_url: Option<String>,
    /// Exact status the object store must answer with; any 2xx when unset
    #[serde(default)]
    pub expected_upload_status: Option<u16>,
    #[serde(default = "default_host_timeout")]
    pub timeout_ms: u64,
}

fn default_api_version() -> String {
    "2024-01".to_string()
}

fn default_host_timeout() -> u64 {
    60_000
}

impl Default for AssetHostConfig {
    fn default() -> Self {
        Self {
            store_domain: String::new(),
            api_version: default_api_version(),
            access_token: String::new(),
            graphql_url: None,
            expected_upload_status: None,
            timeout_ms: default_host_timeout(),
        }
    }
}

impl AssetHostConfig {
    pub fn graphql_endpoint(&self) -> String {
        match &self.graphql_url {
            Some(url) => url.clone(),
            None => format!(
                "https://{}/admin/api/{}/graphql.json",
                self.store_domain, self.api_version
            ),
        }
    }
}

impl std::fmt::Debug for AssetHostConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetHostConfig")
            .field("store_domain", &self.store_domain)
            .field("api_version", &self.api_version)
            .field("access_token", &redact(&self.access_token))
            .field("graphql_url", &self.graphql_url)
            .field("expected_upload_status", &self.expected_upload_status)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// Publishing defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublishConfig {
    #[serde(default = "default_alt_text")]
    pub alt_text: String,
    #[serde(default = "default_filename_prefix")]
    pub filename_prefix: String,
}

fn default_alt_text() -> String {
    "AI-generated dog image".to_string()
}

fn default_filename_prefix() -> String {
    "dog-ai".to_string()
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            alt_text: default_alt_text(),
            filename_prefix: default_filename_prefix(),
        }
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .add_source(File::from(path.as_ref()).required(false))
            // Override with environment variables, e.g. PRINT_PIPELINE__SERVER__PORT
            .add_source(
                Environment::with_prefix("PRINT_PIPELINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;
        settings.apply_legacy_env(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// Fill unset secrets from the conventional environment variable names.
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.synthesis.api_key.is_empty() {
            if let Some(key) = lookup("OPENAI_API_KEY") {
                self.synthesis.api_key = key;
            }
        }
        if self.asset_host.store_domain.is_empty() {
            if let Some(store) = lookup("SHOPIFY_STORE") {
                self.asset_host.store_domain = store;
            }
        }
        if self.asset_host.access_token.is_empty() {
            if let Some(token) = lookup("SHOPIFY_ADMIN_TOKEN") {
                self.asset_host.access_token = token;
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(invalid("Server port cannot be 0".to_string()));
        }

        if !["none", "center_crop", "mirror_tile", "optimize"]
            .contains(&self.processing.mode.as_str())
        {
            return Err(invalid(format!(
                "Unknown processing mode '{}'. Must be one of none, center_crop, mirror_tile, optimize",
                self.processing.mode
            )));
        }

        if !["png", "jpeg", "jpg"].contains(&self.processing.output_format.as_str()) {
            return Err(invalid(format!(
                "Unknown output format '{}'. Must be 'png' or 'jpeg'",
                self.processing.output_format
            )));
        }

        if self.processing.jpeg_quality == 0 || self.processing.jpeg_quality > 100 {
            return Err(invalid(format!(
                "JPEG quality must be within 1..=100, got {}",
                self.processing.jpeg_quality
            )));
        }

        if crate::synthesis::SynthesisSize::parse(&self.synthesis.default_size).is_err() {
            return Err(invalid(format!(
                "Unsupported default synthesis size '{}'",
                self.synthesis.default_size
            )));
        }

        Ok(())
    }
}

fn invalid(message: String) -> AppError {
    AppError::Config(config::ConfigError::Message(message))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            cors: CorsConfig::default(),
            rate_limit: RateLimitConfig::default(),
            logging: LoggingConfig::default(),
            synthesis: SynthesisConfig::default(),
            fetch: FetchConfig::default(),
            processing: ProcessingConfig::default(),
            asset_host: AssetHostConfig::default(),
            publish: PublishConfig::default(),
        }
    }
}

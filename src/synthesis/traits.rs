//! Common traits and types for image synthesis

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AppError, Result};

/// Pixel dimensions the synthesis API accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SynthesisSize {
    /// 1024x1024
    Square,
    /// 1024x1792
    Portrait,
}

impl SynthesisSize {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "1024x1024" | "square" => Ok(Self::Square),
            "1024x1792" | "portrait" => Ok(Self::Portrait),
            other => Err(AppError::InvalidRequest(format!(
                "Unsupported image size '{}'. Supported sizes: 1024x1024, 1024x1792",
                other
            ))),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Square => (1024, 1024),
            Self::Portrait => (1024, 1792),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1024x1024",
            Self::Portrait => "1024x1792",
        }
    }
}

impl Default for SynthesisSize {
    fn default() -> Self {
        Self::Square
    }
}

impl fmt::Display for SynthesisSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prompt text plus the target dimensions requested from the synthesis API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisPrompt {
    pub text: String,
    pub size: SynthesisSize,
}

impl SynthesisPrompt {
    pub fn new(text: impl Into<String>, size: SynthesisSize) -> Self {
        Self {
            text: text.into(),
            size,
        }
    }
}

/// Time-limited locator of a freshly synthesized image.
///
/// Either a remote URL or an inline `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporaryImageLocator(pub String);

impl TemporaryImageLocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Trait for image synthesis back-ends
#[async_trait]
pub trait ImageSynthesisClient: Send + Sync {
    /// Generate a single image and return where to fetch it from
    async fn synthesize(&self, prompt: &SynthesisPrompt) -> Result<TemporaryImageLocator>;
}

/// Turns a free-text request into a concrete visual pattern description
#[async_trait]
pub trait PatternDescriber: Send + Sync {
    async fn describe_pattern(&self, garment: &str, request: &str) -> Result<String>;
}

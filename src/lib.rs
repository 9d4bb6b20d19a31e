//! Print Asset Pipeline
//!
//! Turns a design request (garment, breed, print text, pattern options) into a
//! hosted, print-ready image: compose a prompt, synthesize an image, optionally
//! tile it, and publish it through a staged upload.

pub mod api;
pub mod config;
pub mod error;
pub mod fetch;
pub mod middleware;
pub mod pipeline;
pub mod processing;
pub mod prompt;
pub mod publish;
pub mod synthesis;

pub use error::{AppError, Result};

use std::sync::Arc;

use pipeline::PipelineOrchestrator;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<config::Settings>,
    pub pipeline: Arc<PipelineOrchestrator>,
}

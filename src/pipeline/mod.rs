//! Pipeline module - sequences prompt composition, synthesis, fetch, processing and publishing

pub mod orchestrator;

pub use orchestrator::{PipelineConfig, PipelineOrchestrator, PipelineOutput};

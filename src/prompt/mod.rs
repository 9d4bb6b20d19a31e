//! Prompt module - design requests and deterministic prompt composition

pub mod composer;
pub mod request;

pub use composer::PromptComposer;
pub use request::{DesignRequest, GarmentKind};

//! Synthesis module - capability traits and the OpenAI-compatible client

pub mod openai;
pub mod traits;

pub use openai::OpenAiClient;
pub use traits::{
    ImageSynthesisClient, PatternDescriber, SynthesisPrompt, SynthesisSize, TemporaryImageLocator,
};

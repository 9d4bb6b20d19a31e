//! Deterministic synthesis prompt composition.
//!
//! The composer is a pure function of the [`DesignRequest`]: the same request
//! always yields the same string. Every prompt carries the print constraints
//! (single subject, flat rendering, full coverage, neutral background) regardless
//! of which optional descriptors are present.

use crate::prompt::request::{non_blank, DesignRequest};

const SINGLE_SUBJECT: &str =
    "Show exactly one dog and no other animals or people.";
const FLAT_RENDERING: &str =
    "Render as a flat, print-safe graphic with solid colors only: no gradients, no 3D effects, no shadows, no photographic texture.";
const FULL_COVERAGE: &str =
    "The pattern must cover the entire garment edge to edge with no blank areas.";
const NEUTRAL_BACKGROUND: &str =
    "Place the dog on a plain, neutral background with nothing else in the scene.";

/// Builds synthesis prompts from design requests
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptComposer;

impl PromptComposer {
    pub fn new() -> Self {
        Self
    }

    pub fn compose(&self, request: &DesignRequest) -> String {
        compose(request)
    }
}

/// Compose the synthesis prompt for a design request.
pub fn compose(request: &DesignRequest) -> String {
    let breed = match request.subject_breed.trim() {
        "" => "dog",
        breed => breed,
    };
    let garment = request.garment_kind.description();

    let mut sentences = vec![format!(
        "A front-facing photograph of a single {} wearing a {}.",
        breed, garment
    )];

    if let Some(theme) = non_blank(&request.design_theme) {
        sentences.push(format!("The garment design follows this theme: {}.", theme));
    }

    let descriptors = [
        ("Pattern motif", non_blank(&request.subject)),
        ("Style", non_blank(&request.style)),
        ("Color palette", non_blank(&request.color)),
        ("Mood", non_blank(&request.mood)),
        ("Layout", non_blank(&request.layout)),
        ("Background tone", non_blank(&request.background)),
    ];
    for (label, value) in descriptors {
        if let Some(value) = value {
            sentences.push(format!("{}: {}.", label, value));
        }
    }

    if let Some(text) = non_blank(&request.print_text) {
        sentences.push(format!(
            "Print the word \"{}\" in bold, legible lettering on the chest of the {}.",
            text,
            request.garment_kind.name()
        ));
    }

    sentences.push(SINGLE_SUBJECT.to_string());
    sentences.push(FLAT_RENDERING.to_string());
    sentences.push(FULL_COVERAGE.to_string());
    sentences.push(NEUTRAL_BACKGROUND.to_string());

    sentences.join(" ")
}

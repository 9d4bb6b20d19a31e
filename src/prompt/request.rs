//! Inbound design request model

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, Result};

/// Upper bound for any free-text field of a design request
pub const MAX_FIELD_LEN: usize = 1000;

/// Garment the design is printed on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GarmentKind {
    Hoodie,
    Tshirt,
    Pajama,
    Sweater,
    Bandana,
    /// Unrecognized kinds are kept verbatim
    Other(String),
}

impl GarmentKind {
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "hoodie" => Self::Hoodie,
            "tshirt" | "t-shirt" | "tee" => Self::Tshirt,
            "pajama" | "pajamas" => Self::Pajama,
            "sweater" => Self::Sweater,
            "bandana" => Self::Bandana,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    /// Short name used in instructions and file metadata
    pub fn name(&self) -> &str {
        match self {
            Self::Hoodie => "hoodie",
            Self::Tshirt => "t-shirt",
            Self::Pajama => "pajama",
            Self::Sweater => "sweater",
            Self::Bandana => "bandana",
            Self::Other(name) => name,
        }
    }

    /// Descriptive phrase placed in the synthesis prompt
    pub fn description(&self) -> &str {
        match self {
            Self::Hoodie => "hoodie with the design wrapping the hood, body and sleeves",
            Self::Tshirt => "short-sleeve t-shirt with the design across the front and back",
            Self::Pajama => "full-body suit, no zippers or buttons",
            Self::Sweater => "knit sweater with the design covering the body and sleeves",
            Self::Bandana => "triangular neck bandana",
            Self::Other(name) => name,
        }
    }
}

impl Default for GarmentKind {
    fn default() -> Self {
        Self::Hoodie
    }
}

impl From<String> for GarmentKind {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<GarmentKind> for String {
    fn from(kind: GarmentKind) -> Self {
        kind.name().to_string()
    }
}

fn default_breed() -> String {
    "dog".to_string()
}

/// Treat an explicit `null` like an absent field
fn garment_or_default<'de, D>(deserializer: D) -> std::result::Result<GarmentKind, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<GarmentKind>::deserialize(deserializer)?.unwrap_or_default())
}

fn breed_or_default<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_breed))
}

/// A user's design request, consumed once per pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignRequest {
    #[serde(default, deserialize_with = "garment_or_default")]
    pub garment_kind: GarmentKind,
    #[serde(default = "default_breed", deserialize_with = "breed_or_default")]
    pub subject_breed: String,
    #[serde(default)]
    pub print_text: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub layout: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    /// Motif of the all-over pattern, e.g. "paw prints and bones"
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub design_theme: Option<String>,
    /// Raw free-text prompt for the direct-prompt variant
    #[serde(default)]
    pub prompt: Option<String>,
    /// Requested synthesis size, e.g. `1024x1024`
    #[serde(default)]
    pub size: Option<String>,
}

impl Default for DesignRequest {
    fn default() -> Self {
        Self {
            garment_kind: GarmentKind::default(),
            subject_breed: default_breed(),
            print_text: None,
            style: None,
            color: None,
            mood: None,
            layout: None,
            background: None,
            subject: None,
            design_theme: None,
            prompt: None,
            size: None,
        }
    }
}

/// Trimmed, non-blank view of an optional text field
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl DesignRequest {
    pub fn has_pattern_descriptors(&self) -> bool {
        [
            &self.style,
            &self.color,
            &self.mood,
            &self.layout,
            &self.background,
            &self.subject,
        ]
        .into_iter()
        .any(|field| non_blank(field).is_some())
    }

    /// Check the request carries something to design and stays within bounds.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("subjectBreed", Some(self.subject_breed.as_str())),
            ("printText", self.print_text.as_deref()),
            ("style", self.style.as_deref()),
            ("color", self.color.as_deref()),
            ("mood", self.mood.as_deref()),
            ("layout", self.layout.as_deref()),
            ("background", self.background.as_deref()),
            ("subject", self.subject.as_deref()),
            ("designTheme", self.design_theme.as_deref()),
            ("prompt", self.prompt.as_deref()),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                if value.chars().count() > MAX_FIELD_LEN {
                    return Err(AppError::InvalidRequest(format!(
                        "{} exceeds {} characters",
                        name, MAX_FIELD_LEN
                    )));
                }
            }
        }

        if self.subject_breed.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "subjectBreed must not be blank".to_string(),
            ));
        }

        let has_content = non_blank(&self.prompt).is_some()
            || non_blank(&self.print_text).is_some()
            || non_blank(&self.design_theme).is_some()
            || self.has_pattern_descriptors();
        if !has_content {
            return Err(AppError::InvalidRequest(
                "Provide printText, a prompt, a designTheme or pattern descriptors".to_string(),
            ));
        }

        Ok(())
    }
}

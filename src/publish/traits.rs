//! Types and capability trait for asset hosting platforms

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What the host needs to know before issuing an upload target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTargetRequest {
    pub filename: String,
    pub mime_type: String,
    pub byte_length: u64,
}

/// A signed form field issued by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadParameter {
    pub name: String,
    pub value: String,
}

/// Single-use write target issued by the host.
///
/// Deliberately not `Clone`: a target is consumed by exactly one upload.
#[derive(Debug, PartialEq, Eq)]
pub struct UploadTarget {
    pub upload_url: String,
    pub resource_url: String,
    /// Form fields in the exact order the host returned them
    pub parameters: Vec<UploadParameter>,
    /// Extra request headers the host's signed policy demands
    pub headers: Vec<(String, String)>,
}

/// Immutable file payload for the upload phase.
///
/// The declared length is computed once from the buffer and the buffer cannot
/// be changed afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    filename: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn byte_length(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn target_request(&self) -> UploadTargetRequest {
        UploadTargetRequest {
            filename: self.filename.clone(),
            mime_type: self.mime_type.clone(),
            byte_length: self.byte_length(),
        }
    }
}

/// The pipeline's terminal artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedAsset {
    pub durable_url: String,
}

/// Trait for asset hosting platforms that use staged uploads
#[async_trait]
pub trait AssetHostClient: Send + Sync {
    /// Phase 1: obtain a single-use upload target
    async fn create_upload_target(&self, request: &UploadTargetRequest) -> Result<UploadTarget>;

    /// Phase 2: write the bytes to object storage under the target's credentials
    async fn upload_binary(&self, target: &UploadTarget, file: UploadFile) -> Result<()>;

    /// Phase 3: register the uploaded object in the host's catalog
    async fn register_asset(
        &self,
        resource_url: &str,
        alt_text: Option<&str>,
    ) -> Result<PublishedAsset>;
}

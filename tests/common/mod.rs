//! Deterministic test doubles for the pipeline's collaborators

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use print_asset_pipeline::error::{AppError, Result};
use print_asset_pipeline::fetch::{AssetFetcher, SourceAsset};
use print_asset_pipeline::pipeline::{PipelineConfig, PipelineOrchestrator};
use print_asset_pipeline::publish::{
    AssetHostClient, PublishedAsset, UploadFile, UploadTarget, UploadTargetRequest,
};
use print_asset_pipeline::synthesis::{
    ImageSynthesisClient, PatternDescriber, SynthesisPrompt, TemporaryImageLocator,
};

pub const TEMP_URL: &str = "https://synth.example/tmp/abc.png?sig=secret";
pub const DURABLE_URL: &str = "https://cdn.example/abc.jpg";

#[derive(Default)]
pub struct FakeSynthesizer {
    pub fail: bool,
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<SynthesisPrompt>>,
}

#[async_trait]
impl ImageSynthesisClient for FakeSynthesizer {
    async fn synthesize(&self, prompt: &SynthesisPrompt) -> Result<TemporaryImageLocator> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.clone());
        if self.fail {
            return Err(AppError::UpstreamSynthesis {
                status: Some(400),
                message: "content policy violation".to_string(),
            });
        }
        Ok(TemporaryImageLocator::new(TEMP_URL))
    }
}

pub struct FakeDescriber {
    pub calls: AtomicUsize,
}

#[async_trait]
impl PatternDescriber for FakeDescriber {
    async fn describe_pattern(&self, garment: &str, request: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{} pattern for a {}", request, garment))
    }
}

pub struct FakeFetcher {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub calls: AtomicUsize,
    pub locators: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: "image/png".to_string(),
            calls: AtomicUsize::new(0),
            locators: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AssetFetcher for FakeFetcher {
    async fn fetch(&self, locator: &TemporaryImageLocator) -> Result<SourceAsset> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.locators.lock().unwrap().push(locator.as_str().to_string());
        if self.bytes.is_empty() {
            return Err(AppError::AssetUnavailable(
                "Source image host returned an empty body".to_string(),
            ));
        }
        Ok(SourceAsset {
            bytes: self.bytes.clone(),
            content_type: self.content_type.clone(),
        })
    }
}

#[derive(Default)]
pub struct FakeHost {
    pub upload_fails: bool,
    pub registration_fails: bool,
    pub create_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
    pub register_calls: AtomicUsize,
    pub target_requests: Mutex<Vec<UploadTargetRequest>>,
    pub uploaded_lengths: Mutex<Vec<u64>>,
    pub alt_texts: Mutex<Vec<Option<String>>>,
}

#[async_trait]
impl AssetHostClient for FakeHost {
    async fn create_upload_target(&self, request: &UploadTargetRequest) -> Result<UploadTarget> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.target_requests.lock().unwrap().push(request.clone());
        Ok(UploadTarget {
            upload_url: "https://objects.example/upload".to_string(),
            resource_url: "https://objects.example/tmp/resource".to_string(),
            parameters: Vec::new(),
            headers: Vec::new(),
        })
    }

    async fn upload_binary(&self, _target: &UploadTarget, file: UploadFile) -> Result<()> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.uploaded_lengths.lock().unwrap().push(file.bytes().len() as u64);
        if self.upload_fails {
            return Err(AppError::ObjectStoreUpload {
                status: Some(403),
                body: "<Error><Code>AccessDenied</Code></Error>".to_string(),
            });
        }
        Ok(())
    }

    async fn register_asset(
        &self,
        _resource_url: &str,
        alt_text: Option<&str>,
    ) -> Result<PublishedAsset> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        self.alt_texts.lock().unwrap().push(alt_text.map(str::to_string));
        if self.registration_fails {
            return Err(AppError::AssetRegistration(
                "fileCreate response has no asset URL".to_string(),
            ));
        }
        Ok(PublishedAsset {
            durable_url: DURABLE_URL.to_string(),
        })
    }
}

/// A 1024x1024 RGBA buffer's worth of bytes
pub fn raw_square_bytes() -> Vec<u8> {
    vec![0x7f; 1024 * 1024 * 4]
}

pub fn orchestrator(
    synthesizer: Arc<FakeSynthesizer>,
    fetcher: Arc<FakeFetcher>,
    host: Arc<FakeHost>,
) -> PipelineOrchestrator {
    PipelineOrchestrator::new(synthesizer, fetcher, host, PipelineConfig::default())
}

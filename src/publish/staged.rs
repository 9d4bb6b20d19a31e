//! Staged upload state machine
//!
//! ```text
//! INIT -> TARGET_ACQUIRED -> UPLOADING -> UPLOADED -> REGISTERED
//!   \___________\_______________\___________\________-> FAILED(reason)
//! ```
//!
//! A run moves forward one step at a time and never retries. Registration is only
//! reachable from `UPLOADED`, so the host catalog never sees an object whose
//! upload did not succeed.

use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::fetch::content_type;
use crate::processing::ProcessedAsset;
use crate::publish::traits::{AssetHostClient, PublishedAsset, UploadFile};

/// State of a single publish run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishState {
    Init,
    TargetAcquired,
    Uploading,
    Uploaded,
    Registered,
    Failed(String),
}

impl PublishState {
    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: &PublishState) -> bool {
        use PublishState::*;

        if self.is_terminal() {
            return false;
        }
        match (self, next) {
            (_, Failed(_)) => true,
            (Init, TargetAcquired)
            | (TargetAcquired, Uploading)
            | (Uploading, Uploaded)
            | (Uploaded, Registered) => true,
            _ => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PublishState::Registered | PublishState::Failed(_))
    }
}

impl fmt::Display for PublishState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishState::Init => f.write_str("INIT"),
            PublishState::TargetAcquired => f.write_str("TARGET_ACQUIRED"),
            PublishState::Uploading => f.write_str("UPLOADING"),
            PublishState::Uploaded => f.write_str("UPLOADED"),
            PublishState::Registered => f.write_str("REGISTERED"),
            PublishState::Failed(reason) => write!(f, "FAILED({})", reason),
        }
    }
}

/// Tracks the states one publish run has passed through
#[derive(Debug)]
struct PublishRun {
    state: PublishState,
    history: Vec<PublishState>,
}

impl PublishRun {
    fn new() -> Self {
        Self {
            state: PublishState::Init,
            history: vec![PublishState::Init],
        }
    }

    fn advance(&mut self, next: PublishState) -> Result<()> {
        if !self.state.can_transition_to(&next) {
            return Err(AppError::Internal(format!(
                "Illegal publish transition {} -> {}",
                self.state, next
            )));
        }
        debug!(from = %self.state, to = %next, "Publish state transition");
        self.state = next.clone();
        self.history.push(next);
        Ok(())
    }

    /// Record the failure and hand the original error back unchanged.
    fn fail(&mut self, error: AppError) -> AppError {
        warn!(state = %self.state, code = error.code(), error = %error, "Publish run failed");
        let failed = PublishState::Failed(error.code().to_string());
        if self.state.can_transition_to(&failed) {
            self.state = failed.clone();
            self.history.push(failed);
        }
        error
    }
}

/// Outcome of a publish run along with the states it went through
#[derive(Debug)]
pub struct PublishOutcome {
    pub result: Result<PublishedAsset>,
    pub history: Vec<PublishState>,
}

/// Drives the three-phase staged upload against an asset host
pub struct StagedPublisher {
    host: Arc<dyn AssetHostClient>,
    filename_prefix: String,
}

impl StagedPublisher {
    pub fn new(host: Arc<dyn AssetHostClient>, filename_prefix: impl Into<String>) -> Self {
        Self {
            host,
            filename_prefix: filename_prefix.into(),
        }
    }

    /// Unique filename for an asset of the given content type
    pub fn filename_for(&self, content_type: &str) -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!(
            "{}-{}-{}.{}",
            self.filename_prefix,
            Utc::now().timestamp_millis(),
            &id[..8],
            content_type::extension(content_type)
        )
    }

    /// Publish an asset and return its durable URL
    pub async fn publish(
        &self,
        asset: ProcessedAsset,
        alt_text: Option<&str>,
    ) -> Result<PublishedAsset> {
        self.publish_traced(asset, alt_text).await.result
    }

    /// Publish an asset, also returning the state history of the run
    pub async fn publish_traced(
        &self,
        asset: ProcessedAsset,
        alt_text: Option<&str>,
    ) -> PublishOutcome {
        let mut run = PublishRun::new();
        let result = self.run_phases(&mut run, asset, alt_text).await;
        let result = result.map_err(|e| run.fail(e));

        PublishOutcome {
            result,
            history: run.history,
        }
    }

    async fn run_phases(
        &self,
        run: &mut PublishRun,
        asset: ProcessedAsset,
        alt_text: Option<&str>,
    ) -> Result<PublishedAsset> {
        let filename = self.filename_for(&asset.content_type);
        // Length is taken from the buffer right before the target request;
        // `UploadFile` keeps the buffer immutable from here on.
        let file = UploadFile::new(filename, asset.content_type, asset.bytes);
        let request = file.target_request();

        let target = self.host.create_upload_target(&request).await?;
        run.advance(PublishState::TargetAcquired)?;
        debug!(
            filename = %request.filename,
            bytes = request.byte_length,
            parameters = target.parameters.len(),
            "Acquired upload target"
        );

        run.advance(PublishState::Uploading)?;
        self.host.upload_binary(&target, file).await?;
        run.advance(PublishState::Uploaded)?;

        let published = self
            .host
            .register_asset(&target.resource_url, alt_text)
            .await?;
        run.advance(PublishState::Registered)?;

        info!(url = %published.durable_url, "Published asset");
        Ok(published)
    }
}

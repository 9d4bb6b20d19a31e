//! Pipeline orchestrator
//!
//! One run is a strict chain: validate → (describe pattern) → compose prompt →
//! synthesize → fetch → process → publish. The first failure aborts the run and
//! is returned unchanged; intermediate assets never leave this module.

use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::config::Settings;
use crate::error::Result;
use crate::fetch::{AssetFetcher, HttpAssetFetcher};
use crate::processing::TileProcessor;
use crate::prompt::{request::non_blank, DesignRequest, PromptComposer};
use crate::publish::{AssetHostClient, PublishedAsset, ShopifyClient, StagedPublisher};
use crate::synthesis::{
    ImageSynthesisClient, OpenAiClient, PatternDescriber, SynthesisPrompt, SynthesisSize,
    TemporaryImageLocator,
};

/// Orchestrator defaults
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub default_size: SynthesisSize,
    pub alt_text: String,
    pub filename_prefix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_size: SynthesisSize::Square,
            alt_text: "AI-generated dog image".to_string(),
            filename_prefix: "dog-ai".to_string(),
        }
    }
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub image_url: String,
    /// Exact prompt sent to the synthesis API
    pub prompt: String,
}

/// Sequences the pipeline components for each request
pub struct PipelineOrchestrator {
    composer: PromptComposer,
    synthesizer: Arc<dyn ImageSynthesisClient>,
    describer: Option<Arc<dyn PatternDescriber>>,
    fetcher: Arc<dyn AssetFetcher>,
    processor: TileProcessor,
    publisher: StagedPublisher,
    config: PipelineConfig,
}

impl PipelineOrchestrator {
    pub fn new(
        synthesizer: Arc<dyn ImageSynthesisClient>,
        fetcher: Arc<dyn AssetFetcher>,
        host: Arc<dyn AssetHostClient>,
        config: PipelineConfig,
    ) -> Self {
        let publisher = StagedPublisher::new(host, config.filename_prefix.clone());
        Self {
            composer: PromptComposer::new(),
            synthesizer,
            describer: None,
            fetcher,
            processor: TileProcessor::passthrough(),
            publisher,
            config,
        }
    }

    /// Enable the pattern-description pre-step for raw prompts
    pub fn with_describer(mut self, describer: Arc<dyn PatternDescriber>) -> Self {
        self.describer = Some(describer);
        self
    }

    pub fn with_processor(mut self, processor: TileProcessor) -> Self {
        self.processor = processor;
        self
    }

    /// Wire the production clients from settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let openai = Arc::new(OpenAiClient::new(&settings.synthesis)?);
        let fetcher = Arc::new(HttpAssetFetcher::new(&settings.fetch)?);
        let host = Arc::new(ShopifyClient::new(&settings.asset_host)?);
        let processor = TileProcessor::from_config(&settings.processing)?;
        info!(mode = ?processor.mode(), "Tile processing configured");

        let config = PipelineConfig {
            default_size: SynthesisSize::parse(&settings.synthesis.default_size)?,
            alt_text: settings.publish.alt_text.clone(),
            filename_prefix: settings.publish.filename_prefix.clone(),
        };

        let orchestrator = Self::new(openai.clone(), fetcher, host, config).with_processor(processor);
        if settings.synthesis.describe_patterns {
            Ok(orchestrator.with_describer(openai))
        } else {
            Ok(orchestrator)
        }
    }

    /// Run the full pipeline for one design request
    #[instrument(skip_all, fields(garment = %request.garment_kind.name()))]
    pub async fn run(&self, request: DesignRequest) -> Result<PipelineOutput> {
        request.validate()?;

        let size = match request.size.as_deref() {
            Some(size) => SynthesisSize::parse(size)?,
            None => self.config.default_size,
        };

        let request = self.resolve_theme(request).await?;
        let prompt = SynthesisPrompt::new(self.composer.compose(&request), size);
        let (width, height) = size.dimensions();
        debug!(prompt = %prompt.text, width, height, "Composed synthesis prompt");

        let locator = self.synthesizer.synthesize(&prompt).await?;
        // The locator expires quickly; fetch right away.
        let published = self
            .publish_locator(&locator, Some(self.config.alt_text.as_str()))
            .await?;

        info!(url = %published.durable_url, "Pipeline run completed");
        Ok(PipelineOutput {
            image_url: published.durable_url,
            prompt: prompt.text,
        })
    }

    /// Fetch, process and publish an already generated image
    #[instrument(skip_all)]
    pub async fn publish_from_url(
        &self,
        url: &str,
        alt_text: Option<&str>,
    ) -> Result<PublishedAsset> {
        let alt_text = alt_text.unwrap_or(self.config.alt_text.as_str());
        self.publish_locator(&TemporaryImageLocator::new(url), Some(alt_text))
            .await
    }

    async fn publish_locator(
        &self,
        locator: &TemporaryImageLocator,
        alt_text: Option<&str>,
    ) -> Result<PublishedAsset> {
        let source = self.fetcher.fetch(locator).await?;
        let processed = self.processor.process(source)?;
        self.publisher.publish(processed, alt_text).await
    }

    /// Turn a raw `prompt` into the design theme when no theme was given.
    async fn resolve_theme(&self, mut request: DesignRequest) -> Result<DesignRequest> {
        if non_blank(&request.design_theme).is_some() {
            return Ok(request);
        }
        let Some(raw) = non_blank(&request.prompt).map(str::to_string) else {
            return Ok(request);
        };

        let theme = match &self.describer {
            Some(describer) => {
                describer
                    .describe_pattern(request.garment_kind.name(), &raw)
                    .await?
            }
            None => raw,
        };
        request.design_theme = Some(theme);
        Ok(request)
    }
}

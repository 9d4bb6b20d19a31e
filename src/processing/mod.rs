//! Processing module - optional post-processing of synthesized images

pub mod tile;

use image::{codecs::jpeg::JpegEncoder, DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;
use tracing::debug;

use crate::config::ProcessingConfig;
use crate::error::{AppError, Result};
use crate::fetch::SourceAsset;

/// Transform applied between fetch and publish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingMode {
    /// Publish the fetched bytes untouched
    None,
    CenterCrop { width: u32, height: u32 },
    MirrorTile,
    /// Downscale to a maximum width and re-encode
    Optimize { max_width: u32 },
}

/// Encoding of processed assets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg { quality: u8 },
}

impl OutputFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }
}

/// Bytes ready to publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedAsset {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl From<SourceAsset> for ProcessedAsset {
    fn from(source: SourceAsset) -> Self {
        Self {
            bytes: source.bytes,
            content_type: source.content_type,
        }
    }
}

/// Applies the configured transform to fetched assets
#[derive(Debug, Clone, Copy)]
pub struct TileProcessor {
    mode: ProcessingMode,
    output: OutputFormat,
}

impl Default for TileProcessor {
    fn default() -> Self {
        Self::passthrough()
    }
}

impl TileProcessor {
    pub fn new(mode: ProcessingMode, output: OutputFormat) -> Self {
        Self { mode, output }
    }

    /// A processor that leaves assets untouched
    pub fn passthrough() -> Self {
        Self::new(ProcessingMode::None, OutputFormat::Png)
    }

    pub fn from_config(config: &ProcessingConfig) -> Result<Self> {
        let mode = match config.mode.as_str() {
            "none" => ProcessingMode::None,
            "center_crop" => ProcessingMode::CenterCrop {
                width: config.target_width,
                height: config.target_height,
            },
            "mirror_tile" => ProcessingMode::MirrorTile,
            "optimize" => ProcessingMode::Optimize {
                max_width: config.max_width,
            },
            other => {
                return Err(AppError::Config(config::ConfigError::Message(format!(
                    "Unknown processing mode '{}'",
                    other
                ))))
            }
        };

        let output = match config.output_format.as_str() {
            "jpeg" | "jpg" => OutputFormat::Jpeg {
                quality: config.jpeg_quality,
            },
            _ => OutputFormat::Png,
        };

        Ok(Self::new(mode, output))
    }

    pub fn mode(&self) -> ProcessingMode {
        self.mode
    }

    /// Run the configured transform. Deterministic for a given input.
    pub fn process(&self, source: SourceAsset) -> Result<ProcessedAsset> {
        if self.mode == ProcessingMode::None {
            return Ok(source.into());
        }

        let bitmap = decode(&source.bytes)?;
        let transformed = match self.mode {
            ProcessingMode::None => bitmap,
            ProcessingMode::CenterCrop { width, height } => {
                tile::center_crop(&bitmap, width, height)?
            }
            ProcessingMode::MirrorTile => tile::mirror_tile(&bitmap)?,
            ProcessingMode::Optimize { max_width } => tile::fit_width(&bitmap, max_width)?,
        };

        let bytes = encode(transformed, self.output)?;
        debug!(mode = ?self.mode, size = bytes.len(), "Processed asset");

        Ok(ProcessedAsset {
            bytes,
            content_type: self.output.content_type().to_string(),
        })
    }
}

/// Decode image bytes into an RGBA bitmap
pub fn decode(bytes: &[u8]) -> Result<RgbaImage> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AppError::ImageProcessing(format!("Failed to guess image format: {}", e)))?;

    let image = reader
        .decode()
        .map_err(|e| AppError::ImageProcessing(format!("Failed to decode image: {}", e)))?;

    Ok(image.to_rgba8())
}

/// Encode an RGBA bitmap in the requested output format
pub fn encode(bitmap: RgbaImage, format: OutputFormat) -> Result<Vec<u8>> {
    let mut output = Vec::new();

    match format {
        OutputFormat::Png => DynamicImage::ImageRgba8(bitmap)
            .write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
            .map_err(|e| AppError::ImageProcessing(format!("Failed to encode PNG: {}", e)))?,
        OutputFormat::Jpeg { quality } => {
            // JPEG has no alpha channel.
            let rgb = DynamicImage::ImageRgba8(bitmap).to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut output, quality);
            encoder
                .encode_image(&rgb)
                .map_err(|e| AppError::ImageProcessing(format!("Failed to encode JPEG: {}", e)))?;
        }
    }

    Ok(output)
}

//! Pure bitmap transforms used to turn a synthesized image into a print tile.

use image::{imageops, RgbaImage};

use crate::error::{AppError, Result};

/// Extract a centered `width`×`height` region.
pub fn center_crop(source: &RgbaImage, width: u32, height: u32) -> Result<RgbaImage> {
    let (src_w, src_h) = source.dimensions();

    if width == 0 || height == 0 {
        return Err(AppError::InvalidDimensions(format!(
            "Crop region must be non-empty, got {}x{}",
            width, height
        )));
    }
    if width > src_w || height > src_h {
        return Err(AppError::InvalidDimensions(format!(
            "Cannot crop {}x{} from a {}x{} source",
            width, height, src_w, src_h
        )));
    }

    let x = (src_w - width) / 2;
    let y = (src_h - height) / 2;
    Ok(imageops::crop_imm(source, x, y, width, height).to_image())
}

/// Compose a seamless tile twice the sample's size from four reflections:
///
/// ```text
/// +----------+------------+
/// | original | flip H     |
/// +----------+------------+
/// | flip V   | flip H + V |
/// +----------+------------+
/// ```
///
/// Every edge of the result meets its reflection when the tile repeats.
pub fn mirror_tile(sample: &RgbaImage) -> Result<RgbaImage> {
    let (w, h) = sample.dimensions();

    if w == 0 || w != h {
        return Err(AppError::InvalidDimensions(format!(
            "Mirror tiling needs a non-empty square sample, got {}x{}",
            w, h
        )));
    }
    let side = w.checked_mul(2).ok_or_else(|| {
        AppError::InvalidDimensions(format!("Sample {}x{} is too large to tile", w, h))
    })?;

    let mut canvas = RgbaImage::new(side, side);
    let offset = i64::from(w);

    imageops::replace(&mut canvas, sample, 0, 0);
    imageops::replace(&mut canvas, &imageops::flip_horizontal(sample), offset, 0);
    imageops::replace(&mut canvas, &imageops::flip_vertical(sample), 0, offset);
    imageops::replace(&mut canvas, &imageops::rotate180(sample), offset, offset);

    Ok(canvas)
}

/// Downscale so the width is at most `max_width`, keeping the aspect ratio.
/// Images already narrow enough are returned unchanged.
pub fn fit_width(source: &RgbaImage, max_width: u32) -> Result<RgbaImage> {
    let (w, h) = source.dimensions();
    if max_width == 0 {
        return Err(AppError::InvalidDimensions("Maximum width must be non-zero".to_string()));
    }
    if w <= max_width {
        return Ok(source.clone());
    }

    let new_height = ((u64::from(h) * u64::from(max_width)) / u64::from(w)).max(1) as u32;
    Ok(imageops::resize(
        source,
        max_width,
        new_height,
        imageops::FilterType::Lanczos3,
    ))
}

//! Client-side image optimization: downscale wide images and re-encode to WebP.

use super::UploadFile;
use crate::constants::{OPTIMIZED_MAX_WIDTH, OPTIMIZED_WEBP_QUALITY};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizeOptions {
    pub max_width: u32,
    /// WebP quality, 0–100
    pub quality: f32,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            max_width: OPTIMIZED_MAX_WIDTH,
            quality: OPTIMIZED_WEBP_QUALITY,
        }
    }
}

/// Re-encodes `file` as WebP, capped at `max_width`.
///
/// SVG and GIF files are returned untouched (vector data and animation would
/// be lost), as is anything that fails to decode or encode.
pub fn optimize_image(file: UploadFile, options: OptimizeOptions) -> UploadFile {
    if file.is_svg() || file.is_gif() {
        log::debug!("Skipping optimization of {}", file.name);
        return file;
    }

    let img = match image::load_from_memory(&file.bytes) {
        Ok(img) => img,
        Err(e) => {
            log::warn!("Could not decode {} for optimization, uploading as-is: {}", file.name, e);
            return file;
        }
    };

    let img = downscale(img, options.max_width);
    // the WebP encoder only takes 8-bit RGB(A)
    let img = match img {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => img,
        other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    };

    let encoded = match webp::Encoder::from_image(&img) {
        Ok(encoder) => encoder.encode(options.quality).to_vec(),
        Err(e) => {
            log::warn!("Could not encode {} as WebP, uploading as-is: {}", file.name, e);
            return file;
        }
    };

    log::debug!(
        "Optimized {}: {} -> {} bytes ({}x{})",
        file.name,
        file.bytes.len(),
        encoded.len(),
        img.width(),
        img.height()
    );

    UploadFile::new(webp_name(&file.name), "image/webp", encoded)
}

fn downscale(img: DynamicImage, max_width: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= max_width || max_width == 0 {
        return img;
    }
    let new_height = ((u64::from(height) * u64::from(max_width)) / u64::from(width)).max(1);
    let new_height = u32::try_from(new_height).unwrap_or(u32::MAX);
    img.resize_exact(max_width, new_height, FilterType::Lanczos3)
}

fn webp_name(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image");
    format!("{}.webp", stem)
}

//! Bounded resize and JPEG re-encode of user-supplied images.

use std::path::Path;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;

use crate::error::{Error, Result};

/// Default bound on the width of a normalized image.
pub const DEFAULT_MAX_WIDTH: u32 = 1200;

/// Default bound on the height of a normalized image.
pub const DEFAULT_MAX_HEIGHT: u32 = 1200;

/// Default JPEG quality factor in `(0, 1]`.
pub const DEFAULT_QUALITY: f32 = 0.8;

/// An image as supplied by a user: raw encoded bytes plus a logical filename.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    /// Logical filename (e.g. `holiday.png`). Only the stem is kept.
    pub filename: String,
    /// Encoded image bytes in any format the codec can sniff.
    pub data: Bytes,
}

impl ImageAsset {
    /// Create a new asset.
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// Bounds and quality for [`normalize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeOptions {
    /// Width bound applied to landscape images.
    pub max_width: u32,
    /// Height bound applied to portrait and square images.
    pub max_height: u32,
    /// Quality factor in `(0, 1]`.
    pub quality: f32,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl NormalizeOptions {
    /// Quality factor mapped onto the JPEG encoder's 1..=100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        let scaled = (self.quality * 100.0).round();
        if scaled.is_nan() {
            return 1;
        }
        scaled.clamp(1.0, 100.0) as u8
    }
}

/// Result of [`normalize`]: JPEG bytes owned by the caller.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// Original filename stem with a `.jpg` extension.
    pub filename: String,
    /// JPEG-encoded bytes.
    pub data: Bytes,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Encoder quality (1..=100) that produced `data`.
    pub quality: u8,
}

impl NormalizedImage {
    /// MIME type of the encoded data.
    pub fn content_type(&self) -> &'static str {
        "image/jpeg"
    }
}

/// Compute the output size for an image of `width` x `height`.
///
/// Landscape images (`width > height`) are only checked against `max_width`;
/// portrait and square images only against `max_height`. A very elongated
/// image can therefore still exceed the other bound. Images already inside
/// their bound are returned unchanged; nothing is ever upscaled.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width > height && width > max_width {
        (max_width, scale(height, max_width, width))
    } else if height >= width && height > max_height {
        (scale(width, max_height, height), max_height)
    } else {
        (width, height)
    }
}

/// `value * numerator / denominator`, rounded to nearest, at least 1.
fn scale(value: u32, numerator: u32, denominator: u32) -> u32 {
    let denominator = u64::from(denominator.max(1));
    let scaled = (u64::from(value) * u64::from(numerator) + denominator / 2) / denominator;
    scaled.clamp(1, u64::from(u32::MAX)) as u32
}

/// Decode `input`, shrink it into the configured bounds and re-encode it as JPEG.
///
/// The input asset is left untouched. Alpha channels are dropped since the
/// output is always JPEG.
///
/// # Errors
///
/// * [`Error::InvalidImage`] if the bytes cannot be decoded
/// * [`Error::Encoding`] if the JPEG encoder fails
pub fn normalize(input: &ImageAsset, options: &NormalizeOptions) -> Result<NormalizedImage> {
    let decoded = image::load_from_memory(&input.data)
        .map_err(|e| Error::invalid_image(format!("{}: {}", input.filename, e)))?;

    let (width, height) = decoded.dimensions();
    let (target_width, target_height) = fit_within(
        width,
        height,
        options.max_width.max(1),
        options.max_height.max(1),
    );

    let resized = if (target_width, target_height) == (width, height) {
        decoded
    } else {
        decoded.resize_exact(target_width, target_height, FilterType::CatmullRom)
    };

    let rgb = resized.to_rgb8();
    let quality = options.jpeg_quality();
    let mut data = Vec::new();
    JpegEncoder::new_with_quality(&mut data, quality)
        .encode_image(&rgb)
        .map_err(|e| Error::encoding(e.to_string()))?;

    if data.is_empty() {
        return Err(Error::encoding("encoder produced no output"));
    }

    tracing::debug!(
        filename = %input.filename,
        from = %format!("{}x{}", width, height),
        to = %format!("{}x{}", target_width, target_height),
        quality,
        bytes = data.len(),
        "Normalized image"
    );

    Ok(NormalizedImage {
        filename: jpeg_filename(&input.filename),
        data: Bytes::from(data),
        width: target_width,
        height: target_height,
        quality,
    })
}

/// Keep the logical name but force the `.jpg` extension.
fn jpeg_filename(original: &str) -> String {
    let stem = Path::new(original)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image");
    format!("{}.jpg", stem)
}

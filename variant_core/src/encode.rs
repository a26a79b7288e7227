//! Resize and size-budgeted AVIF encoding.
//!
//! The quality search walks a fixed descending ladder (85 down to 45 in steps
//! of 5, 9 attempts at most), writes each attempt to the final output path and
//! accepts the first one that fits the profile's byte budget. When even the
//! floor quality misses the budget the oversized file stays on disk as best
//! effort; callers surface that through the report instead of deleting it.

use crate::errors::ConvertError;
use image::codecs::avif::AvifEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbImage};
use std::fs;
use std::path::Path;

pub const QUALITY_START: u8 = 85;
pub const QUALITY_FLOOR: u8 = 45;
pub const QUALITY_STEP: u8 = 5;

/// Encoder speed/effort knob (1 = slowest, 10 = fastest).
const AVIF_ENCODE_SPEED: u8 = 8;

/// The descending quality ladder: 85, 80, ..., 45.
pub fn quality_ladder() -> impl Iterator<Item = u8> {
    (QUALITY_FLOOR..=QUALITY_START)
        .rev()
        .step_by(QUALITY_STEP as usize)
}

/// Flattens any decoded representation to plain 8-bit RGB. Alpha and palette
/// data are dropped here; the AVIF renditions this tool produces do not carry
/// transparency (documented lossy step).
pub fn flatten_to_rgb(decoded: DynamicImage) -> RgbImage {
    match decoded {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    }
}

/// Scaled height for a width-capped resize, rounded down to a whole pixel.
pub fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    (height as u64 * target_width as u64 / width as u64) as u32
}

/// Downscales to `target_width` with Lanczos resampling when the image is
/// wider than the target. Returns `None` when the image passes through
/// unscaled; images are never upscaled.
pub fn resize_for_width(rgb: &RgbImage, target_width: u32) -> Option<RgbImage> {
    if rgb.width() <= target_width {
        return None;
    }
    let height = scaled_height(rgb.width(), rgb.height(), target_width);
    Some(image::imageops::resize(
        rgb,
        target_width,
        height.max(1),
        FilterType::Lanczos3,
    ))
}

/// Result of one quality search.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeOutcome {
    /// Quality level of the encode left on disk.
    pub quality: u8,
    /// Size of the output file in bytes.
    pub size_bytes: u64,
    /// Whether the output fits the profile's size budget.
    pub within_budget: bool,
    /// Encode attempts performed (at most the ladder length).
    pub attempts: u32,
}

impl EncodeOutcome {
    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

fn encode_avif(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    let encoder = AvifEncoder::new_with_speed_quality(&mut buf, AVIF_ENCODE_SPEED, quality);
    encoder.write_image(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(buf)
}

/// Runs the quality search for one (image, profile) pair, writing each
/// attempt to `out_path`. The last attempt always remains on disk, budget met
/// or not.
pub fn encode_within_budget(
    rgb: &RgbImage,
    max_size_kb: f64,
    out_path: &Path,
) -> Result<EncodeOutcome, ConvertError> {
    let mut attempts = 0u32;
    let mut last = EncodeOutcome {
        quality: QUALITY_FLOOR,
        size_bytes: 0,
        within_budget: false,
        attempts: 0,
    };

    for quality in quality_ladder() {
        attempts += 1;
        let bytes =
            encode_avif(rgb, quality).map_err(|e| ConvertError::from_image(out_path, e))?;
        fs::write(out_path, &bytes).map_err(|e| ConvertError::from_io(out_path, e))?;

        let size_bytes = bytes.len() as u64;
        let size_kb = size_bytes as f64 / 1024.0;
        last = EncodeOutcome {
            quality,
            size_bytes,
            within_budget: size_kb <= max_size_kb,
            attempts,
        };
        tracing::trace!(
            out = %out_path.display(),
            quality,
            size_kb = format_args!("{:.1}", size_kb),
            "encode attempt"
        );

        if last.within_budget {
            break;
        }
    }

    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use proptest::prelude::*;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    #[test]
    fn test_quality_ladder_is_fixed() {
        let ladder: Vec<u8> = quality_ladder().collect();
        assert_eq!(ladder, vec![85, 80, 75, 70, 65, 60, 55, 50, 45]);
    }

    #[test]
    fn test_never_upscales() {
        let img = gradient(100, 60);
        assert!(resize_for_width(&img, 100).is_none());
        assert!(resize_for_width(&img, 500).is_none());
    }

    #[test]
    fn test_downscale_preserves_aspect() {
        let img = gradient(400, 300);
        let small = resize_for_width(&img, 100).unwrap();
        assert_eq!(small.width(), 100);
        assert_eq!(small.height(), 75);
    }

    #[test]
    fn test_scaled_height_rounds_down() {
        // 1000 -> 333: height 500 * 333/1000 = 166.5, floor to 166
        assert_eq!(scaled_height(1000, 500, 333), 166);
        assert_eq!(scaled_height(3, 3, 2), 2);
    }

    #[test]
    fn test_flatten_drops_alpha() {
        let rgba = image::RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 128]));
        let rgb = flatten_to_rgb(DynamicImage::ImageRgba8(rgba));
        assert_eq!(rgb.dimensions(), (4, 4));
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_generous_budget_accepts_first_quality() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.avif");
        let img = gradient(32, 32);

        let outcome = encode_within_budget(&img, 10_000.0, &out).unwrap();
        assert!(outcome.within_budget);
        assert_eq!(outcome.quality, QUALITY_START);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(fs::metadata(&out).unwrap().len(), outcome.size_bytes);
    }

    #[test]
    fn test_exhausted_ladder_keeps_oversized_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.avif");
        let img = gradient(64, 64);

        // A fraction of a kilobyte: no real encode fits.
        let outcome = encode_within_budget(&img, 0.001, &out).unwrap();
        assert!(!outcome.within_budget);
        assert_eq!(outcome.quality, QUALITY_FLOOR);
        assert_eq!(outcome.attempts, quality_ladder().count() as u32);
        // Best-effort file stays on disk.
        assert_eq!(fs::metadata(&out).unwrap().len(), outcome.size_bytes);
        assert!(outcome.size_bytes > 0);
    }

    proptest! {
        #[test]
        fn prop_scaled_height_within_one_pixel(
            width in 2u32..6000,
            height in 1u32..6000,
            target in 1u32..6000,
        ) {
            prop_assume!(target < width);
            let h = scaled_height(width, height, target);
            let exact = height as f64 * target as f64 / width as f64;
            prop_assert!(h as f64 <= exact);
            prop_assert!(exact - (h as f64) < 1.0);
        }

        #[test]
        fn prop_ladder_bounded_and_descending(_seed in 0u8..1) {
            let ladder: Vec<u8> = quality_ladder().collect();
            prop_assert!(ladder.len() <= 9);
            prop_assert!(ladder.windows(2).all(|w| w[0] > w[1]));
            prop_assert_eq!(*ladder.first().unwrap(), QUALITY_START);
            prop_assert_eq!(*ladder.last().unwrap(), QUALITY_FLOOR);
        }
    }
}

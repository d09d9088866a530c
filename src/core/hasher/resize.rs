//! SIMD-accelerated resize to the grayscale grid the DCT expects.
//!
//! Uses fast_image_resize, which picks AVX2/NEON when available.

use crate::error::HashError;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::path::PathBuf;

fn resize_error(reason: String) -> HashError {
    HashError::DecodeError {
        path: PathBuf::new(),
        reason,
    }
}

/// Convert to luminance and resize to exactly `size x size` with a bilinear filter.
pub fn resize_to_grayscale(image: &DynamicImage, size: u32) -> Result<GrayImage, HashError> {
    // Grayscale first: resizing one channel is cheaper than three
    let gray = image.to_luma8();

    let (src_width, src_height) = gray.dimensions();
    if src_width == 0 || src_height == 0 {
        return Err(resize_error("Image has no pixels".to_string()));
    }
    if size == 0 {
        return Err(resize_error("Target size must be positive".to_string()));
    }

    let src_image = Image::from_vec_u8(src_width, src_height, gray.into_raw(), PixelType::U8)
        .map_err(|e| resize_error(format!("Failed to create source image: {}", e)))?;
    let mut dst_image = Image::new(size, size, PixelType::U8);

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
    Resizer::new()
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| resize_error(format!("Resize failed: {}", e)))?;

    let result: ImageBuffer<Luma<u8>, Vec<u8>> =
        ImageBuffer::from_raw(size, size, dst_image.into_vec())
            .ok_or_else(|| resize_error("Failed to create result buffer".to_string()))?;

    Ok(result)
}

/// Resized grayscale samples as `f32`, row-major.
pub fn grayscale_samples(image: &DynamicImage, size: u32) -> Result<Vec<f32>, HashError> {
    let gray = resize_to_grayscale(image, size)?;
    Ok(gray.pixels().map(|p| p.0[0] as f32).collect())
}

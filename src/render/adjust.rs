//! Whole-image tone adjustments.
//!
//! The enhancers share one rule: each builds a "degenerate" version of the
//! input and interpolates between it and the input by `factor`. A factor of
//! `1.0` returns the input, `0.0` returns the degenerate image, and values
//! above `1.0` push the image away from it.

use image::{Rgb, RgbImage};

/// Weights of the ITU-R 601 luma transform, scaled by 1000.
const LUMA_WEIGHTS: [u32; 3] = [299, 587, 114];

const SMOOTH_KERNEL: [i32; 9] = [1, 1, 1, 1, 5, 1, 1, 1, 1];

#[rustfmt::skip]
const SMOOTH_MORE_KERNEL: [i32; 25] = [
    1, 1,  1, 1, 1,
    1, 5,  5, 5, 1,
    1, 5, 44, 5, 1,
    1, 5,  5, 5, 1,
    1, 1,  1, 1, 1,
];

#[inline]
fn to_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[inline]
fn lerp(from: u8, to: u8, t: f32) -> u8 {
    let from = from as f32;
    to_channel(from + (to as f32 - from) * t)
}

/// Luma of an RGB pixel, rounded to the nearest level.
#[inline]
pub fn luma(px: &Rgb<u8>) -> u8 {
    let [r, g, b] = px.0;
    let weighted =
        r as u32 * LUMA_WEIGHTS[0] + g as u32 * LUMA_WEIGHTS[1] + b as u32 * LUMA_WEIGHTS[2];
    ((weighted + 500) / 1000) as u8
}

/// Interpolates every pixel of `degenerate` toward `image`.
fn enhance(image: &RgbImage, degenerate: &RgbImage, factor: f32) -> RgbImage {
    debug_assert_eq!(image.dimensions(), degenerate.dimensions());
    let mut out = image.clone();
    for (dst, (src, base)) in out
        .pixels_mut()
        .zip(image.pixels().zip(degenerate.pixels()))
    {
        for c in 0..3 {
            dst.0[c] = lerp(base.0[c], src.0[c], factor);
        }
    }
    out
}

/// Scales saturation. The degenerate image is the luma grayscale.
pub fn color(image: &RgbImage, factor: f32) -> RgbImage {
    let mut out = image.clone();
    for px in out.pixels_mut() {
        let l = luma(px);
        for c in 0..3 {
            px.0[c] = lerp(l, px.0[c], factor);
        }
    }
    out
}

/// Scales brightness. The degenerate image is black.
pub fn brightness(image: &RgbImage, factor: f32) -> RgbImage {
    let mut out = image.clone();
    for px in out.pixels_mut() {
        for c in 0..3 {
            px.0[c] = to_channel(px.0[c] as f32 * factor);
        }
    }
    out
}

/// Scales contrast around the mean luma of the image.
pub fn contrast(image: &RgbImage, factor: f32) -> RgbImage {
    let pixel_count = (image.width() as u64 * image.height() as u64).max(1);
    let total: u64 = image.pixels().map(|px| luma(px) as u64).sum();
    let mean = ((total as f64 / pixel_count as f64) + 0.5) as u8;

    let mut out = image.clone();
    for px in out.pixels_mut() {
        for c in 0..3 {
            px.0[c] = lerp(mean, px.0[c], factor);
        }
    }
    out
}

/// Scales sharpness. The degenerate image is a 3x3 smoothing of the input.
pub fn sharpness(image: &RgbImage, factor: f32) -> RgbImage {
    let smoothed = convolve(image, &SMOOTH_KERNEL, 3);
    enhance(image, &smoothed, factor)
}

/// A strong 5x5 smoothing filter.
pub fn smooth_more(image: &RgbImage) -> RgbImage {
    convolve(image, &SMOOTH_MORE_KERNEL, 5)
}

/// Mixes `overlay` into `image`: `image * (1 - alpha) + overlay * alpha`.
pub fn blend_color(image: &RgbImage, overlay: [u8; 3], alpha: f32) -> RgbImage {
    let mut out = image.clone();
    for px in out.pixels_mut() {
        for c in 0..3 {
            px.0[c] = lerp(px.0[c], overlay[c], alpha);
        }
    }
    out
}

/// Applies a square kernel normalized by its sum. Pixels closer to the
/// border than the kernel radius are copied unchanged.
fn convolve(image: &RgbImage, kernel: &[i32], size: u32) -> RgbImage {
    debug_assert_eq!(kernel.len() as u32, size * size);
    let (width, height) = image.dimensions();
    let radius = size / 2;
    let mut out = image.clone();
    if width <= 2 * radius || height <= 2 * radius {
        return out;
    }

    let divisor: i32 = kernel.iter().sum();
    for y in radius..height - radius {
        for x in radius..width - radius {
            let mut acc = [0i32; 3];
            for ky in 0..size {
                for kx in 0..size {
                    let weight = kernel[(ky * size + kx) as usize];
                    let src = image.get_pixel(x + kx - radius, y + ky - radius);
                    for c in 0..3 {
                        acc[c] += weight * src.0[c] as i32;
                    }
                }
            }
            let dst = out.get_pixel_mut(x, y);
            for c in 0..3 {
                dst.0[c] = to_channel(acc[c] as f32 / divisor as f32);
            }
        }
    }
    out
}

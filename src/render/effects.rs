//! Per-frame effects.
//!
//! Every effect is a pure function of `(image, frame, total_frames)` and
//! returns a new image with the same dimensions. Periodic parameters are
//! driven by the frame progress in `[0, 1)`.

use std::f64::consts::PI;

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use rayon::prelude::*;

use super::adjust;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    Wave,
    ColorOscillation,
    Zoom,
    Rotation,
    Morph,
}

impl Effect {
    pub fn apply(&self, image: &RgbImage, frame: u32, total_frames: u32) -> RgbImage {
        match self {
            Effect::Wave => wave(image, frame, total_frames),
            Effect::ColorOscillation => color_oscillation(image, frame, total_frames),
            Effect::Zoom => zoom(image, frame, total_frames),
            Effect::Rotation => rotation(image, frame, total_frames),
            Effect::Morph => morph(image, frame, total_frames),
        }
    }
}

/// Normalizes a frame index into `[0, 1)`.
pub fn progress(frame: u32, total_frames: u32) -> f64 {
    if total_frames == 0 {
        return 0.0;
    }
    frame as f64 / total_frames as f64
}

#[inline]
fn pixel_at(raw: &[u8], row_len: usize, x: usize, y: usize) -> [u8; 3] {
    let idx = y * row_len + x * 3;
    [raw[idx], raw[idx + 1], raw[idx + 2]]
}

/// Horizontal sine displacement, sampled and written in 2x2 blocks.
pub fn wave(image: &RgbImage, frame: u32, total_frames: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let p = progress(frame, total_frames);
    let strength = 5.0 * (4.0 * PI * p).sin();
    let width = width as usize;
    let row_len = width * 3;
    let src = image.as_raw();

    let mut out = image.clone();
    let buf: &mut [u8] = &mut out;
    buf.par_chunks_mut(row_len * 2)
        .enumerate()
        .for_each(|(pair, rows)| {
            let y = pair * 2;
            let offset = (strength * (y as f64 / 20.0 + 8.0 * PI * p).sin()) as i64;
            let rows_in_block = rows.len() / row_len;
            for x in (0..width).step_by(2) {
                let sx = (x as i64 + offset).rem_euclid(width as i64) as usize;
                let px = pixel_at(src, row_len, sx, y);
                for dy in 0..rows_in_block {
                    for tx in x..(x + 2).min(width) {
                        let idx = dy * row_len + tx * 3;
                        rows[idx..idx + 3].copy_from_slice(&px);
                    }
                }
            }
        });
    out
}

/// Oscillates saturation and brightness.
pub fn color_oscillation(image: &RgbImage, frame: u32, total_frames: u32) -> RgbImage {
    let p = progress(frame, total_frames);
    let saturation = 0.7 + 0.3 * (4.0 * PI * p).sin();
    let brightness = 0.8 + 0.2 * (6.0 * PI * p).cos();
    let out = adjust::color(image, saturation as f32);
    adjust::brightness(&out, brightness as f32)
}

/// Scales the image around its center over a canvas whose fill color cycles.
pub fn zoom(image: &RgbImage, frame: u32, total_frames: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    let p = progress(frame, total_frames);
    let scale = 0.8 + 0.4 * (2.0 * PI * p).sin();
    let scaled_width = (width as f64 * scale) as u32;
    let scaled_height = (height as f64 * scale) as u32;
    if scaled_width == 0 || scaled_height == 0 {
        return image.clone();
    }

    let scaled = imageops::resize(image, scaled_width, scaled_height, FilterType::Lanczos3);
    let fill = Rgb([
        (128.0 + 100.0 * (2.0 * PI * p).sin()) as u8,
        (128.0 + 100.0 * (3.0 * PI * p).cos()) as u8,
        (128.0 + 100.0 * (4.0 * PI * p).sin()) as u8,
    ]);
    let mut canvas = RgbImage::from_pixel(width, height, fill);
    let x = (width as i64 - scaled_width as i64).div_euclid(2);
    let y = (height as i64 - scaled_height as i64).div_euclid(2);
    imageops::overlay(&mut canvas, &scaled, x, y);
    canvas
}

/// Rotates around the center with bilinear sampling. The canvas keeps its
/// size, so corners are clipped and uncovered areas are black.
pub fn rotation(image: &RgbImage, frame: u32, total_frames: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let p = progress(frame, total_frames);
    let angle = (15.0 * (4.0 * PI * p).sin()).to_radians();
    let (sin, cos) = angle.sin_cos();
    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;
    let max_x = (width - 1) as f64;
    let max_y = (height - 1) as f64;
    let row_len = width as usize * 3;
    let src = image.as_raw();

    let mut out = image.clone();
    let buf: &mut [u8] = &mut out;
    buf.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let oy = y as f64 + 0.5 - cy;
            for x in 0..width as usize {
                let ox = x as f64 + 0.5 - cx;
                // Counter-clockwise on screen, so sample with the inverse rotation.
                let sx = ox * cos - oy * sin + cx - 0.5;
                let sy = ox * sin + oy * cos + cy - 0.5;
                let px = if sx < 0.0 || sy < 0.0 || sx > max_x || sy > max_y {
                    [0, 0, 0]
                } else {
                    bilinear(src, row_len, sx, sy, width as usize, height as usize)
                };
                row[x * 3..x * 3 + 3].copy_from_slice(&px);
            }
        });
    out
}

fn bilinear(raw: &[u8], row_len: usize, sx: f64, sy: f64, width: usize, height: usize) -> [u8; 3] {
    let x0 = sx.floor() as usize;
    let y0 = sy.floor() as usize;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);
    let fx = sx - x0 as f64;
    let fy = sy - y0 as f64;

    let p00 = pixel_at(raw, row_len, x0, y0);
    let p10 = pixel_at(raw, row_len, x1, y0);
    let p01 = pixel_at(raw, row_len, x0, y1);
    let p11 = pixel_at(raw, row_len, x1, y1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
        let bottom = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// A cheaper wave: shifts every other pixel on every other row, without
/// duplicating into neighbours.
pub fn morph(image: &RgbImage, frame: u32, total_frames: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let p = progress(frame, total_frames);
    let width = width as usize;
    let row_len = width * 3;
    let src = image.as_raw();

    let mut out = image.clone();
    let buf: &mut [u8] = &mut out;
    buf.par_chunks_mut(row_len * 2)
        .enumerate()
        .for_each(|(pair, rows)| {
            let y = pair * 2;
            let shift = (10.0 * (6.0 * PI * p + y as f64 / 25.0).sin()) as i64;
            for x in (0..width).step_by(2) {
                let sx = (x as i64 + shift).rem_euclid(width as i64) as usize;
                let px = pixel_at(src, row_len, sx, y);
                rows[x * 3..x * 3 + 3].copy_from_slice(&px);
            }
        });
    out
}

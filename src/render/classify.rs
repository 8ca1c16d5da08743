//! Picks an animation style from aggregate pixel statistics.

use std::fmt;

use image::RgbImage;

use super::adjust::luma;
use super::pipeline::Style;

/// Aggregate statistics of an image, the only input of [`classify`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageStats {
    /// Per-channel mean, in `[0, 255]`.
    pub mean: [f64; 3],
    /// Per-channel population standard deviation.
    pub stddev: [f64; 3],
    /// Share of pixels whose luma falls in the bottom quarter.
    pub dark_ratio: f64,
    /// Share of pixels whose luma falls in the top quarter.
    pub light_ratio: f64,
}

impl ImageStats {
    /// Collects the statistics of `image` in a single pass.
    pub fn of(image: &RgbImage) -> Self {
        let mut sum = [0f64; 3];
        let mut sum_sq = [0f64; 3];
        let mut histogram = [0u64; 256];

        for px in image.pixels() {
            for c in 0..3 {
                let v = px.0[c] as f64;
                sum[c] += v;
                sum_sq[c] += v * v;
            }
            histogram[luma(px) as usize] += 1;
        }

        let count = (image.width() as u64 * image.height() as u64).max(1) as f64;
        let mut mean = [0f64; 3];
        let mut stddev = [0f64; 3];
        for c in 0..3 {
            mean[c] = sum[c] / count;
            stddev[c] = (sum_sq[c] / count - mean[c] * mean[c]).max(0.0).sqrt();
        }

        let dark: u64 = histogram[..64].iter().sum();
        let light: u64 = histogram[192..].iter().sum();

        Self {
            mean,
            stddev,
            dark_ratio: dark as f64 / count,
            light_ratio: light as f64 / count,
        }
    }

    pub fn brightness(&self) -> f64 {
        self.mean.iter().sum::<f64>() / 3.0
    }

    pub fn contrast(&self) -> f64 {
        self.stddev.iter().sum::<f64>() / 3.0
    }

    /// Average contrast normalized against half the channel range.
    pub fn contrast_ratio(&self) -> f64 {
        self.contrast() / 128.0
    }

    /// `(max - min) / max` over the channel means, `0` for a black image.
    pub fn saturation(&self) -> f64 {
        let max = self.mean.iter().cloned().fold(f64::MIN, f64::max);
        let min = self.mean.iter().cloned().fold(f64::MAX, f64::min);
        if max == 0.0 {
            0.0
        } else {
            (max - min) / max
        }
    }
}

/// Which rule of the decision tree selected the style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleReason {
    ContrastAndSaturation,
    MutedAndSoft,
    DarkTones,
    LightTones,
    VividColors,
    Balanced,
}

impl fmt::Display for StyleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StyleReason::ContrastAndSaturation => "high contrast and saturated colors",
            StyleReason::MutedAndSoft => "muted colors and soft contrast",
            StyleReason::DarkTones => "dark tones dominate",
            StyleReason::LightTones => "light tones dominate",
            StyleReason::VividColors => "bright and saturated colors",
            StyleReason::Balanced => "balanced palette",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub style: Style,
    pub reason: StyleReason,
}

/// Maps statistics to a style. The first matching rule wins.
pub fn classify(stats: &ImageStats) -> Classification {
    let contrast_ratio = stats.contrast_ratio();
    let saturation = stats.saturation();

    let (style, reason) = if contrast_ratio > 0.7 && saturation > 0.6 {
        (Style::Cinematic, StyleReason::ContrastAndSaturation)
    } else if saturation < 0.3 && contrast_ratio < 0.4 {
        (Style::Minimalist, StyleReason::MutedAndSoft)
    } else if stats.dark_ratio > 0.6 {
        (Style::Cinematic, StyleReason::DarkTones)
    } else if stats.light_ratio > 0.6 {
        (Style::Minimalist, StyleReason::LightTones)
    } else if saturation > 0.5 {
        (Style::Artistic, StyleReason::VividColors)
    } else {
        (Style::Artistic, StyleReason::Balanced)
    };

    Classification { style, reason }
}

/// Convenience wrapper that computes the statistics and classifies them.
pub fn analyze(image: &RgbImage) -> Classification {
    let stats = ImageStats::of(image);
    debug!(
        "Image stats: brightness {:.1}, contrast {:.1}, saturation {:.2}, dark {:.1}%, light {:.1}%",
        stats.brightness(),
        stats.contrast(),
        stats.saturation(),
        stats.dark_ratio * 100.0,
        stats.light_ratio * 100.0
    );
    classify(&stats)
}

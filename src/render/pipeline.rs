//! Style pipelines.
//!
//! A pipeline grades the base image once, then builds every frame from a
//! fresh copy of the graded image by running the stages whose gate matches
//! the frame index.

use std::fmt;

use image::RgbImage;
use rand::Rng;
use tokio_util::sync::CancellationToken;

use super::adjust;
use super::effects::Effect;
use super::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Cinematic,
    Artistic,
    Minimalist,
}

/// An overlay color mixed into a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tint {
    Fixed { color: [u8; 3], alpha: f32 },
    /// Every channel is drawn uniformly from `low..=high` per frame.
    Random { low: u8, high: u8, alpha: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Effect(Effect),
    Tint(Tint),
}

/// A step that runs on frames where `frame % every == 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stage {
    pub every: u32,
    pub step: Step,
}

const fn effect(every: u32, effect: Effect) -> Stage {
    Stage {
        every,
        step: Step::Effect(effect),
    }
}

const fn tint(every: u32, tint: Tint) -> Stage {
    Stage {
        every,
        step: Step::Tint(tint),
    }
}

const CINEMATIC_STAGES: &[Stage] = &[
    effect(1, Effect::ColorOscillation),
    effect(3, Effect::Wave),
    effect(4, Effect::Zoom),
    tint(
        8,
        Tint::Fixed {
            color: [20, 15, 10],
            alpha: 0.05,
        },
    ),
];

const ARTISTIC_STAGES: &[Stage] = &[
    effect(1, Effect::ColorOscillation),
    effect(2, Effect::Morph),
    effect(3, Effect::Rotation),
    tint(
        6,
        Tint::Random {
            low: 100,
            high: 200,
            alpha: 0.08,
        },
    ),
];

const MINIMALIST_STAGES: &[Stage] = &[
    effect(5, Effect::ColorOscillation),
    effect(8, Effect::Zoom),
    tint(
        12,
        Tint::Fixed {
            color: [240, 240, 235],
            alpha: 0.03,
        },
    ),
];

impl Style {
    pub const ALL: [Style; 3] = [Style::Cinematic, Style::Artistic, Style::Minimalist];

    pub fn name(&self) -> &'static str {
        match self {
            Style::Cinematic => "cinematic",
            Style::Artistic => "artistic",
            Style::Minimalist => "minimalist",
        }
    }

    pub fn stages(&self) -> &'static [Stage] {
        match self {
            Style::Cinematic => CINEMATIC_STAGES,
            Style::Artistic => ARTISTIC_STAGES,
            Style::Minimalist => MINIMALIST_STAGES,
        }
    }

    /// The stages that run on `frame`, in application order.
    pub fn plan(&self, frame: u32) -> impl Iterator<Item = &'static Stage> {
        self.stages()
            .iter()
            .filter(move |stage| frame % stage.every == 0)
    }

    /// The one-time grade applied to the base image.
    pub fn grade(&self, image: &RgbImage) -> RgbImage {
        match self {
            Style::Cinematic => {
                let tinted = adjust::blend_color(image, [25, 20, 15], 0.1);
                adjust::contrast(&tinted, 1.2)
            }
            Style::Artistic => {
                let vivid = adjust::color(image, 1.3);
                adjust::sharpness(&vivid, 1.1)
            }
            Style::Minimalist => {
                let muted = adjust::color(image, 0.8);
                adjust::smooth_more(&muted)
            }
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Step {
    fn apply<R>(&self, image: &RgbImage, frame: u32, total_frames: u32, rng: &mut R) -> RgbImage
    where
        R: Rng + ?Sized,
    {
        match self {
            Step::Effect(effect) => effect.apply(image, frame, total_frames),
            Step::Tint(Tint::Fixed { color, alpha }) => adjust::blend_color(image, *color, *alpha),
            Step::Tint(Tint::Random { low, high, alpha }) => {
                let color = [
                    rng.gen_range(*low..=*high),
                    rng.gen_range(*low..=*high),
                    rng.gen_range(*low..=*high),
                ];
                adjust::blend_color(image, color, *alpha)
            }
        }
    }
}

/// Produces all frames of `style` for `image`.
///
/// `cancel` is checked before every frame; once it fires the work stops and
/// [`RenderError::Cancelled`] is returned instead of a partial sequence.
pub fn render_frames<R>(
    image: &RgbImage,
    style: Style,
    total_frames: u32,
    rng: &mut R,
    cancel: &CancellationToken,
) -> Result<Vec<RgbImage>, RenderError>
where
    R: Rng + ?Sized,
{
    let base = style.grade(image);
    let mut frames = Vec::with_capacity(total_frames as usize);

    for frame in 0..total_frames {
        if cancel.is_cancelled() {
            debug!("Frame rendering cancelled at {}/{}", frame, total_frames);
            return Err(RenderError::Cancelled);
        }

        let mut current = base.clone();
        for stage in style.plan(frame) {
            current = stage.step.apply(&current, frame, total_frames, rng);
        }
        frames.push(current);
    }

    Ok(frames)
}

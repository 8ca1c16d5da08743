use std::time::Duration;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame, RgbImage};

use super::error::RenderError;

/// Encodes `frames` into an infinitely looping GIF.
///
/// `speed` is handed to the palette quantizer: `1` gives the best palette,
/// `30` the fastest encode.
pub fn encode_gif(
    frames: Vec<RgbImage>,
    frame_delay: Duration,
    speed: i32,
) -> Result<Vec<u8>, RenderError> {
    if frames.is_empty() {
        return Err(RenderError::NoFrames);
    }

    let delay = Delay::from_saturating_duration(frame_delay);
    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut bytes, speed.clamp(1, 30));
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(RenderError::Encode)?;
        encoder
            .encode_frames(frames.into_iter().map(|frame| {
                let rgba = DynamicImage::ImageRgb8(frame).into_rgba8();
                Frame::from_parts(rgba, 0, 0, delay)
            }))
            .map_err(RenderError::Encode)?;
    }

    Ok(bytes)
}

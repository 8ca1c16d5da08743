use thiserror::Error;

/// Errors that can occur while turning a photo into an animation.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to decode the source image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("no frames to encode")]
    NoFrames,

    #[error("failed to encode the animation: {0}")]
    Encode(#[source] image::ImageError),

    #[error("rendering was cancelled")]
    Cancelled,

    #[error("render worker failed: {0}")]
    Worker(String),

    #[error("render pool is closed")]
    PoolClosed,
}

//! Photo-to-animation rendering.
//!
//! The flow is: decode and fit the photo ([`normalize`]), pick a [`Style`]
//! from its statistics ([`classify`]), build the frames of that style
//! ([`pipeline`], [`effects`]) and encode them as a looping GIF ([`encode`]).
//! [`Renderer`] runs those CPU-bound stages off the async runtime.

pub mod adjust;
pub mod classify;
pub mod effects;
pub mod encode;
mod error;
pub mod normalize;
pub mod pipeline;
mod worker;

pub use classify::{Classification, ImageStats, StyleReason};
pub use error::RenderError;
pub use pipeline::Style;
pub use worker::{PreparedImage, RenderSettings, Renderer};

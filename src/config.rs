//! Configuration-related types.
//!
//! The configuration can be represented in and deserialized from JSON,
//! here is an example:
//!
//! ```json
//! {
//!   "botToken": "8888888888:XXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX",
//!   "maxImageSize": 400,
//!   "frameCount": 64,
//!   "requestTimeout": 45,
//!   "i18n": {
//!     "timeoutPrompt": "Took too long, try a smaller photo."
//!   }
//! }
//! ```
//!
//! See [`Config`] for more detailed descriptions.

use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use paste::paste;
use serde::Deserialize;

use crate::render::{RenderSettings, Style};

/// A thread-safe reference-counting object that represents
/// a [`Config`] instance.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    config: Arc<Config>,
}

impl SharedConfig {
    /// Constructs a new `SharedConfig`.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl Deref for SharedConfig {
    type Target = Config;

    fn deref(&self) -> &Self::Target {
        self.config.as_ref()
    }
}

/// Top-level config type for the bot.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// The token of your Telegram bot.
    /// JSON key: `botToken`
    #[serde(rename = "botToken")]
    pub telegram_bot_token: String,

    /// The longest side, in pixels, photos are scaled down to before
    /// rendering. Value is default to 400.
    /// JSON key: `maxImageSize`
    #[serde(default = "default_max_image_size", rename = "maxImageSize")]
    pub max_image_size: u32,

    /// Number of frames in every animation. Value is default to 64.
    /// JSON key: `frameCount`
    #[serde(default = "default_frame_count", rename = "frameCount")]
    pub frame_count: u32,

    /// Display duration of a single frame, in milliseconds.
    /// JSON key: `frameDelay`
    #[serde(default = "default_frame_delay", rename = "frameDelay")]
    pub frame_delay: u64,

    /// A timeout in seconds for a whole request, from downloading the
    /// photo to sending the result.
    /// JSON key: `requestTimeout`
    #[serde(default = "default_request_timeout", rename = "requestTimeout")]
    pub request_timeout: u64,

    /// Maximum number of rendering jobs running at the same time. Requests
    /// beyond that wait for a free slot, within their own timeout.
    /// JSON key: `maxConcurrentRenders`
    #[serde(
        default = "default_max_concurrent_renders",
        rename = "maxConcurrentRenders"
    )]
    pub max_concurrent_renders: usize,

    /// Speed of the GIF palette quantizer, from 1 (best quality) to 30
    /// (fastest).
    /// JSON key: `encoderSpeed`
    #[serde(default = "default_encoder_speed", rename = "encoderSpeed")]
    pub encoder_speed: i32,

    /// A seed for the random tint of the artistic style, [`None`] to draw
    /// a new one for every request.
    /// JSON key: `artisticSeed`
    #[serde(default, rename = "artisticSeed")]
    pub artistic_seed: Option<u64>,

    /// Strings for I18N.
    /// JSON key: `i18n`
    #[serde(default)]
    pub i18n: I18nStrings,
}

impl Config {
    /// The rendering-related part of the configuration.
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            max_size: self.max_image_size,
            frame_count: self.frame_count,
            frame_delay: Duration::from_millis(self.frame_delay),
            encoder_speed: self.encoder_speed,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Strings for I18N.
#[derive(Debug, Clone, Deserialize)]
pub struct I18nStrings {
    /// A text to reply to `/start`.
    /// JSON key: `startPrompt`
    #[serde(default = "default_start_prompt", rename = "startPrompt")]
    pub start_prompt: String,
    /// A text to reply to `/gif`, describing the styles.
    /// JSON key: `gifIntroPrompt`
    #[serde(default = "default_gif_intro_prompt", rename = "gifIntroPrompt")]
    pub gif_intro_prompt: String,
    /// A text to display when a request runs out of time.
    /// JSON key: `timeoutPrompt`
    #[serde(default = "default_timeout_prompt", rename = "timeoutPrompt")]
    pub timeout_prompt: String,
    /// A text to display when rendering fails for any other reason.
    /// JSON key: `errorPrompt`
    #[serde(default = "default_error_prompt", rename = "errorPrompt")]
    pub error_prompt: String,
    /// A text to display when the message carries no usable photo.
    /// JSON key: `noPhotoPrompt`
    #[serde(default = "default_no_photo_prompt", rename = "noPhotoPrompt")]
    pub no_photo_prompt: String,
    /// A text to display when the photo cannot be downloaded.
    /// JSON key: `downloadErrorPrompt`
    #[serde(default = "default_download_error_prompt", rename = "downloadErrorPrompt")]
    pub download_error_prompt: String,
    /// Status text while the photo is being downloaded.
    /// JSON key: `receivedStatus`
    #[serde(default = "default_received_status", rename = "receivedStatus")]
    pub received_status: String,
    /// Status text while colors and contrast are analyzed.
    /// JSON key: `analyzingStatus`
    #[serde(default = "default_analyzing_status", rename = "analyzingStatus")]
    pub analyzing_status: String,
    /// Status text while the result is being uploaded.
    /// JSON key: `deliveringStatus`
    #[serde(default = "default_delivering_status", rename = "deliveringStatus")]
    pub delivering_status: String,
    /// Status text once a style is picked. Placeholders: `{style}`,
    /// `{frames}` and `{blurb}`.
    /// JSON key: `styleChosenStatus`
    #[serde(default = "default_style_chosen_status", rename = "styleChosenStatus")]
    pub style_chosen_status: String,
    /// Caption of the delivered animation. Placeholders: `{style}`, `{frames}`,
    /// `{size}` (KB), `{time}`, `{blurb}` and `{id}`.
    /// JSON key: `caption`
    #[serde(default = "default_caption")]
    pub caption: String,
    /// JSON key: `cinematicName`
    #[serde(default = "default_cinematic_name", rename = "cinematicName")]
    pub cinematic_name: String,
    /// JSON key: `artisticName`
    #[serde(default = "default_artistic_name", rename = "artisticName")]
    pub artistic_name: String,
    /// JSON key: `minimalistName`
    #[serde(default = "default_minimalist_name", rename = "minimalistName")]
    pub minimalist_name: String,
    /// Why the cinematic style suits the photo.
    /// JSON key: `cinematicBlurb`
    #[serde(default = "default_cinematic_blurb", rename = "cinematicBlurb")]
    pub cinematic_blurb: String,
    /// JSON key: `artisticBlurb`
    #[serde(default = "default_artistic_blurb", rename = "artisticBlurb")]
    pub artistic_blurb: String,
    /// JSON key: `minimalistBlurb`
    #[serde(default = "default_minimalist_blurb", rename = "minimalistBlurb")]
    pub minimalist_blurb: String,
}

impl I18nStrings {
    pub fn style_name(&self, style: Style) -> &str {
        match style {
            Style::Cinematic => &self.cinematic_name,
            Style::Artistic => &self.artistic_name,
            Style::Minimalist => &self.minimalist_name,
        }
    }

    pub fn style_blurb(&self, style: Style) -> &str {
        match style {
            Style::Cinematic => &self.cinematic_blurb,
            Style::Artistic => &self.artistic_blurb,
            Style::Minimalist => &self.minimalist_blurb,
        }
    }
}

macro_rules! define_defaults {
    ($ty_name:ident { $($name:ident: $ty:ty = $default:expr,)* }) => {
        define_defaults! { $($name: $ty = $default,)* }
        paste! {
            impl Default for $ty_name {
                fn default() -> Self {
                    Self {
                        $($name: [<default_ $name>](),)*
                    }
                }
            }
        }
    };
    ($($name:ident: $ty:ty = $default:expr,)*) => {
        paste! {
            $(
                fn [<default_ $name>]() -> $ty {
                    $default
                }
            )*
        }
    };
}

define_defaults! {
    max_image_size: u32 = 400,
    frame_count: u32 = 64,
    frame_delay: u64 = 50,
    request_timeout: u64 = 45,
    max_concurrent_renders: usize = 2,
    encoder_speed: i32 = 10,
}

define_defaults!(I18nStrings {
    start_prompt: String = "Hi! Send me a photo and I will turn it into an animated GIF.".to_owned(),
    gif_intro_prompt: String = "Smart GIF creator with automatic style selection!\n\n\
        Send a photo and I will analyze it and pick the animation style that suits it:\n\
        \u{2022} Cinematic: for contrasting and dark photos\n\
        \u{2022} Artistic: for bright and colorful photos\n\
        \u{2022} Minimalist: for light and gentle photos".to_owned(),
    timeout_prompt: String = "Processing took too long. Try a smaller image.".to_owned(),
    error_prompt: String = "Something went wrong while creating the GIF.".to_owned(),
    no_photo_prompt: String = "Could not get the photo.".to_owned(),
    download_error_prompt: String = "Failed to download the photo.".to_owned(),
    received_status: String = "Analyzing the image...".to_owned(),
    analyzing_status: String = "Analyzing colors and contrast...".to_owned(),
    delivering_status: String = "Sending the result...".to_owned(),
    style_chosen_status: String = "Style chosen: {style}\nCreating {frames} frames...\n{blurb}".to_owned(),
    caption: String = "Your smart GIF is ready!\nStyle: {style}\nFrames: {frames} | Size: {size}KB\n\
        Processing: {time}\n{blurb}\n{id}".to_owned(),
    cinematic_name: String = "Cinematic".to_owned(),
    artistic_name: String = "Artistic".to_owned(),
    minimalist_name: String = "Minimalist".to_owned(),
    cinematic_blurb: String =
        "your photo has strong contrast and deep tones, a natural fit for a cinematic look".to_owned(),
    artistic_blurb: String = "the vivid palette of your photo suits an artistic treatment".to_owned(),
    minimalist_blurb: String =
        "the gentle tones and soft contrast of your photo are ideal for a minimalist style".to_owned(),
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{ "botToken": "123:abc" }"#).unwrap();
        assert_eq!(config.telegram_bot_token, "123:abc");
        assert_eq!(config.render_settings(), RenderSettings::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(45));
        assert_eq!(config.max_concurrent_renders, 2);
        assert_eq!(config.artistic_seed, None);
        assert_eq!(config.i18n.error_prompt, default_error_prompt());
    }

    #[test]
    fn test_overrides() {
        let config: Config = serde_json::from_str(
            r#"{
                "botToken": "t",
                "maxImageSize": 256,
                "frameCount": 32,
                "frameDelay": 80,
                "requestTimeout": 10,
                "artisticSeed": 9,
                "i18n": { "timeoutPrompt": "slow" }
            }"#,
        )
        .unwrap();
        let settings = config.render_settings();
        assert_eq!(settings.max_size, 256);
        assert_eq!(settings.frame_count, 32);
        assert_eq!(settings.frame_delay, Duration::from_millis(80));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.artistic_seed, Some(9));
        assert_eq!(config.i18n.timeout_prompt, "slow");
        assert_eq!(config.i18n.no_photo_prompt, default_no_photo_prompt());
    }

    #[test]
    fn test_style_strings_are_configurable() {
        let i18n: I18nStrings = serde_json::from_str(
            r#"{ "artisticName": "Artistique", "minimalistBlurb": "doux" }"#,
        )
        .unwrap();
        assert_eq!(i18n.style_name(Style::Artistic), "Artistique");
        assert_eq!(i18n.style_name(Style::Cinematic), "Cinematic");
        assert_eq!(i18n.style_blurb(Style::Minimalist), "doux");
        assert_eq!(i18n.style_blurb(Style::Artistic), default_artistic_blurb());
    }

    #[test]
    fn test_missing_token_is_rejected() {
        assert!(serde_json::from_str::<Config>("{}").is_err());
    }
}

use std::sync::Arc;
use std::time::Duration;

use image::RgbImage;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use super::classify::{self, Classification};
use super::encode;
use super::error::RenderError;
use super::normalize;
use super::pipeline::{self, Style};

/// Knobs of the rendering pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// Longest side, in pixels, of the image frames are rendered from.
    pub max_size: u32,
    pub frame_count: u32,
    pub frame_delay: Duration,
    /// Palette quantizer speed, `1..=30`.
    pub encoder_speed: i32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_size: 400,
            frame_count: 64,
            frame_delay: Duration::from_millis(50),
            encoder_speed: 10,
        }
    }
}

/// A photo that is decoded, fitted and classified.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub image: RgbImage,
    pub classification: Classification,
}

/// Runs the CPU-heavy stages on the blocking thread pool.
///
/// At most `max_jobs` stages run at once. Every stage gets a cancellation
/// token bound to the returned future: dropping the future (for example
/// when a timeout fires) cancels the token so the worker stops early.
#[derive(Clone)]
pub struct Renderer {
    settings: Arc<RenderSettings>,
    seed: Option<u64>,
    permits: Arc<Semaphore>,
}

impl Renderer {
    pub fn new(settings: RenderSettings, max_jobs: usize) -> Self {
        Self {
            settings: Arc::new(settings),
            seed: None,
            permits: Arc::new(Semaphore::new(max_jobs.max(1))),
        }
    }

    /// Pins the random source of the artistic tint.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Decodes photo bytes, fits them to the configured size and picks a style.
    pub async fn prepare(&self, bytes: Vec<u8>) -> Result<PreparedImage, RenderError> {
        let max_size = self.settings.max_size;
        self.run_blocking(move |_cancel| {
            let image = normalize::fit(normalize::decode(&bytes)?, max_size);
            let classification = classify::analyze(&image);
            Ok(PreparedImage {
                image,
                classification,
            })
        })
        .await
    }

    /// Builds every frame of `style`.
    pub async fn render_frames(
        &self,
        image: RgbImage,
        style: Style,
    ) -> Result<Vec<RgbImage>, RenderError> {
        let frame_count = self.settings.frame_count;
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run_blocking(move |cancel| {
            pipeline::render_frames(&image, style, frame_count, &mut rng, &cancel)
        })
        .await
    }

    /// Encodes frames into the final animation.
    pub async fn encode(&self, frames: Vec<RgbImage>) -> Result<Vec<u8>, RenderError> {
        let delay = self.settings.frame_delay;
        let speed = self.settings.encoder_speed;
        self.run_blocking(move |_cancel| encode::encode_gif(frames, delay, speed))
            .await
    }

    async fn run_blocking<F, T>(&self, work: F) -> Result<T, RenderError>
    where
        F: FnOnce(CancellationToken) -> Result<T, RenderError> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| RenderError::PoolClosed)?;

        let cancel = CancellationToken::new();
        let guard = cancel.clone().drop_guard();
        let handle = tokio::task::spawn_blocking(move || {
            // The slot stays taken until the worker really returns.
            let _permit = permit;
            work(cancel)
        });

        let result = handle
            .await
            .map_err(|err| RenderError::Worker(err.to_string()))?;
        guard.disarm();
        result
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::codecs::gif::GifDecoder;
    use image::{AnimationDecoder, ImageFormat, Rgb, RgbImage};

    use super::*;

    fn png_bytes(image: &RgbImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    fn fast_settings() -> RenderSettings {
        RenderSettings {
            encoder_speed: 30,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_dark_photo_end_to_end() {
        let renderer = Renderer::new(fast_settings(), 2);
        let photo = RgbImage::from_pixel(600, 800, Rgb([60, 30, 30]));

        let prepared = renderer.prepare(png_bytes(&photo)).await.unwrap();
        assert_eq!(prepared.image.dimensions(), (300, 400));
        assert_eq!(prepared.classification.style, Style::Cinematic);

        let frames = renderer
            .render_frames(prepared.image, prepared.classification.style)
            .await
            .unwrap();
        assert_eq!(frames.len(), 64);
        assert!(frames.iter().all(|f| f.dimensions() == (300, 400)));

        let gif = renderer.encode(frames).await.unwrap();
        assert!(!gif.is_empty());
        let decoded = GifDecoder::new(Cursor::new(gif.as_slice()))
            .unwrap()
            .into_frames()
            .collect_frames()
            .unwrap();
        assert_eq!(decoded.len(), 64);
    }

    #[tokio::test]
    async fn test_light_photo_is_minimalist() {
        let renderer = Renderer::new(fast_settings(), 1);
        let photo = RgbImage::from_pixel(200, 200, Rgb([245, 245, 240]));
        let prepared = renderer.prepare(png_bytes(&photo)).await.unwrap();
        assert_eq!(prepared.image.dimensions(), (200, 200));
        assert_eq!(prepared.classification.style, Style::Minimalist);
    }

    #[tokio::test]
    async fn test_seeded_artistic_render_is_reproducible() {
        let renderer = Renderer::new(fast_settings(), 2).with_seed(Some(42));
        let image = RgbImage::from_fn(32, 24, |x, y| Rgb([(x * 8) as u8, (y * 10) as u8, 200]));
        let a = renderer
            .render_frames(image.clone(), Style::Artistic)
            .await
            .unwrap();
        let b = renderer.render_frames(image, Style::Artistic).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_invalid_bytes_fail_to_prepare() {
        let renderer = Renderer::new(fast_settings(), 1);
        let result = renderer.prepare(b"nope".to_vec()).await;
        assert!(matches!(result, Err(RenderError::Decode(_))));
    }

    #[tokio::test]
    async fn test_dropping_the_future_cancels_the_worker() {
        let renderer = Renderer::new(fast_settings(), 1);
        let (observed_tx, observed_rx) = std::sync::mpsc::channel();

        let job = renderer.run_blocking(move |cancel| {
            while !cancel.is_cancelled() {
                std::thread::sleep(Duration::from_millis(5));
            }
            let _ = observed_tx.send(());
            Err::<(), _>(RenderError::Cancelled)
        });
        let result = tokio::time::timeout(Duration::from_millis(50), job).await;
        assert!(result.is_err());

        // The worker notices the cancellation and returns on its own.
        let observed = tokio::task::spawn_blocking(move || {
            observed_rx.recv_timeout(Duration::from_secs(5))
        })
        .await
        .unwrap();
        assert!(observed.is_ok());

        // Its permit is released, so the pool accepts new work.
        let value = tokio::time::timeout(Duration::from_secs(5), renderer.run_blocking(|_| Ok(7)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value, 7);
    }
}

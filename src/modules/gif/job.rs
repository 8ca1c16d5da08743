//! A single photo-to-GIF request, from download to delivery.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::Rng;
use thiserror::Error;

use crate::config::I18nStrings;
use crate::modules::stats::StatsManager;
use crate::render::{RenderError, Renderer};
use crate::utils::format::{fill_template, format_duration};

/// Where the request is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Received,
    Downloading,
    Analyzing,
    Processing,
    Encoding,
    Delivering,
    Done,
    Failed,
}

#[derive(Debug, Error)]
pub(crate) enum JobError {
    #[error("the message carries no photo")]
    NoPhoto,
    #[error("failed to download the photo: {0}")]
    Download(anyhow::Error),
    #[error("processing did not finish within {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("failed to deliver the animation: {0}")]
    Delivery(anyhow::Error),
}

impl JobError {
    /// The fixed text shown to the user. Internal details are only logged.
    pub(crate) fn user_prompt<'a>(&self, i18n: &'a I18nStrings) -> &'a str {
        match self {
            JobError::NoPhoto => &i18n.no_photo_prompt,
            JobError::Download(_) => &i18n.download_error_prompt,
            JobError::Timeout(_) => &i18n.timeout_prompt,
            JobError::Render(_) | JobError::Delivery(_) => &i18n.error_prompt,
        }
    }
}

/// The chat side of a request.
#[async_trait]
pub(crate) trait JobChannel: Send {
    /// Downloads the highest resolution variant of the photo.
    async fn fetch_photo(&mut self) -> Result<Vec<u8>, JobError>;

    /// Posts the transient status message, or edits it if already posted.
    async fn show_status(&mut self, text: &str) -> Result<(), anyhow::Error>;

    /// Removes the status message, if any.
    async fn clear_status(&mut self) -> Result<(), anyhow::Error>;

    async fn send_animation(
        &mut self,
        gif: Vec<u8>,
        file_name: &str,
        caption: &str,
    ) -> Result<(), anyhow::Error>;

    async fn send_text(&mut self, text: &str) -> Result<(), anyhow::Error>;
}

/// Shared collaborators of every request.
pub(crate) struct JobContext<'a> {
    pub renderer: &'a Renderer,
    pub stats_mgr: &'a StatsManager,
    pub i18n: &'a I18nStrings,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Delivered {
    pub style: crate::render::Style,
    pub frame_count: usize,
    pub size_bytes: usize,
    pub processing_time: Duration,
}

pub(crate) fn new_request_id() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let suffix: u16 = rand::thread_rng().gen_range(1000..=9999);
    format!("REQ_{}_{}", now, suffix)
}

struct Job<'a, C> {
    id: &'a str,
    channel: &'a mut C,
    stage: Stage,
}

impl<'a, C> Job<'a, C>
where
    C: JobChannel,
{
    fn enter(&mut self, stage: Stage) {
        debug!("Request {}: {:?} -> {:?}", self.id, self.stage, stage);
        self.stage = stage;
    }

    async fn status(&mut self, text: &str) {
        if let Err(err) = self.channel.show_status(text).await {
            warn!("Request {}: failed to update status: {}", self.id, err);
        }
    }

    async fn process(&mut self, ctx: &JobContext<'_>) -> Result<Delivered, JobError> {
        self.enter(Stage::Downloading);
        let download_started = Instant::now();
        let bytes = self.channel.fetch_photo().await?;
        info!(
            "Request {}: photo downloaded in {}",
            self.id,
            format_duration(download_started.elapsed())
        );

        self.enter(Stage::Analyzing);
        self.status(&ctx.i18n.analyzing_status).await;
        let prepared = ctx.renderer.prepare(bytes).await?;
        let style = prepared.classification.style;
        info!(
            "Request {}: chose {} style ({})",
            self.id, style, prepared.classification.reason
        );

        let frame_total = ctx.renderer.settings().frame_count;
        self.status(&fill_template(
            &ctx.i18n.style_chosen_status,
            &[
                ("style", ctx.i18n.style_name(style)),
                ("frames", frame_total.to_string().as_str()),
                ("blurb", ctx.i18n.style_blurb(style)),
            ],
        ))
        .await;

        self.enter(Stage::Processing);
        let render_started = Instant::now();
        let frames = ctx.renderer.render_frames(prepared.image, style).await?;
        let frame_count = frames.len();

        self.enter(Stage::Encoding);
        let gif = ctx.renderer.encode(frames).await?;
        let processing_time = render_started.elapsed();
        info!(
            "Request {}: GIF created in {}",
            self.id,
            format_duration(processing_time)
        );

        self.enter(Stage::Delivering);
        self.status(&ctx.i18n.delivering_status).await;
        let delivered = Delivered {
            style,
            frame_count,
            size_bytes: gif.len(),
            processing_time,
        };
        let caption = caption(&delivered, self.id, ctx.i18n);
        let file_name = format!("smart_{}.gif", self.id);
        self.channel
            .send_animation(gif, &file_name, &caption)
            .await
            .map_err(JobError::Delivery)?;

        if let Err(err) = self.channel.clear_status().await {
            warn!("Request {}: failed to remove status: {}", self.id, err);
        }
        Ok(delivered)
    }
}

fn caption(delivered: &Delivered, request_id: &str, i18n: &I18nStrings) -> String {
    fill_template(
        &i18n.caption,
        &[
            ("style", i18n.style_name(delivered.style)),
            ("frames", delivered.frame_count.to_string().as_str()),
            ("size", format!("{:.1}", delivered.size_bytes as f64 / 1024.0).as_str()),
            ("time", format_duration(delivered.processing_time).as_str()),
            ("blurb", i18n.style_blurb(delivered.style)),
            ("id", request_id),
        ],
    )
}

/// Runs one request to completion. Every failure is handled here: it is
/// logged, counted and reported to the user, and never propagated.
pub(crate) async fn run<C>(channel: &mut C, ctx: &JobContext<'_>, request_id: &str) -> Stage
where
    C: JobChannel,
{
    ctx.stats_mgr.record_request();
    let mut job = Job {
        id: request_id,
        channel,
        stage: Stage::Received,
    };
    job.status(&format!("{}\n{}", ctx.i18n.received_status, request_id))
        .await;

    let result = match tokio::time::timeout(ctx.timeout, job.process(ctx)).await {
        Ok(result) => result,
        Err(_) => Err(JobError::Timeout(ctx.timeout)),
    };

    match result {
        Ok(delivered) => {
            job.enter(Stage::Done);
            ctx.stats_mgr.record_success();
            info!(
                "Request {}: delivered {} GIF ({} frames, {} bytes)",
                request_id, delivered.style, delivered.frame_count, delivered.size_bytes
            );
        }
        Err(err) => {
            job.enter(Stage::Failed);
            ctx.stats_mgr.record_failure();
            error!("Request {} failed: {}", request_id, err);

            if let Err(err) = job.channel.send_text(err.user_prompt(ctx.i18n)).await {
                error!("Request {}: failed to report the failure: {}", request_id, err);
            }
            if let Err(err) = job.channel.clear_status().await {
                warn!("Request {}: failed to remove status: {}", request_id, err);
            }
        }
    }

    job.stage
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use anyhow::anyhow;
    use image::{ImageFormat, Rgb, RgbImage};

    use super::*;
    use crate::render::RenderSettings;

    #[derive(Default)]
    struct MockChannel {
        photo: Option<Vec<u8>>,
        fetch_delay: Duration,
        fail_clear: bool,
        statuses: Vec<String>,
        texts: Vec<String>,
        animations: Vec<(Vec<u8>, String, String)>,
        clears: usize,
    }

    #[async_trait]
    impl JobChannel for MockChannel {
        async fn fetch_photo(&mut self) -> Result<Vec<u8>, JobError> {
            tokio::time::sleep(self.fetch_delay).await;
            self.photo.clone().ok_or(JobError::NoPhoto)
        }

        async fn show_status(&mut self, text: &str) -> Result<(), anyhow::Error> {
            self.statuses.push(text.to_owned());
            Ok(())
        }

        async fn clear_status(&mut self) -> Result<(), anyhow::Error> {
            self.clears += 1;
            if self.fail_clear {
                return Err(anyhow!("message to delete not found"));
            }
            Ok(())
        }

        async fn send_animation(
            &mut self,
            gif: Vec<u8>,
            file_name: &str,
            caption: &str,
        ) -> Result<(), anyhow::Error> {
            self.animations
                .push((gif, file_name.to_owned(), caption.to_owned()));
            Ok(())
        }

        async fn send_text(&mut self, text: &str) -> Result<(), anyhow::Error> {
            self.texts.push(text.to_owned());
            Ok(())
        }
    }

    fn png_bytes(image: &RgbImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    fn renderer() -> Renderer {
        Renderer::new(
            RenderSettings {
                frame_count: 8,
                encoder_speed: 30,
                ..Default::default()
            },
            2,
        )
    }

    fn context<'a>(
        renderer: &'a Renderer,
        stats_mgr: &'a StatsManager,
        i18n: &'a I18nStrings,
        timeout: Duration,
    ) -> JobContext<'a> {
        JobContext {
            renderer,
            stats_mgr,
            i18n,
            timeout,
        }
    }

    #[tokio::test]
    async fn test_successful_request() {
        let renderer = renderer();
        let stats_mgr = StatsManager::new();
        let i18n = I18nStrings::default();
        let ctx = context(&renderer, &stats_mgr, &i18n, Duration::from_secs(30));

        let photo = RgbImage::from_pixel(200, 200, Rgb([245, 245, 240]));
        let mut channel = MockChannel {
            photo: Some(png_bytes(&photo)),
            ..Default::default()
        };

        let stage = run(&mut channel, &ctx, "REQ_1_1234").await;
        assert_eq!(stage, Stage::Done);

        let snapshot = stats_mgr.snapshot();
        assert_eq!(snapshot.total_requests, 1);
        assert_eq!(snapshot.successes, 1);
        assert_eq!(snapshot.failures, 0);

        assert_eq!(channel.animations.len(), 1);
        let (gif, file_name, caption) = &channel.animations[0];
        assert_eq!(&gif[..6], b"GIF89a");
        assert_eq!(file_name, "smart_REQ_1_1234.gif");
        assert!(caption.contains("Style: Minimalist"));
        assert!(caption.contains("Frames: 8 |"));
        assert!(caption.ends_with("REQ_1_1234"));

        assert!(channel.texts.is_empty());
        assert_eq!(channel.clears, 1);
        assert!(channel.statuses[0].starts_with(&i18n.received_status));
        assert!(channel
            .statuses
            .iter()
            .any(|s| s.starts_with("Style chosen: Minimalist")));
    }

    #[tokio::test]
    async fn test_timeout_counts_one_failure() {
        let renderer = renderer();
        let stats_mgr = StatsManager::new();
        let i18n = I18nStrings::default();
        let ctx = context(&renderer, &stats_mgr, &i18n, Duration::from_millis(50));

        let photo = RgbImage::from_pixel(20, 20, Rgb([10, 10, 10]));
        let mut channel = MockChannel {
            photo: Some(png_bytes(&photo)),
            fetch_delay: Duration::from_secs(5),
            ..Default::default()
        };

        let stage = run(&mut channel, &ctx, "REQ_2_1234").await;
        assert_eq!(stage, Stage::Failed);

        let snapshot = stats_mgr.snapshot();
        assert_eq!(snapshot.total_requests, 1);
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.successes, 0);
        assert_eq!(channel.texts, vec![i18n.timeout_prompt.clone()]);
        assert!(channel.animations.is_empty());
    }

    #[tokio::test]
    async fn test_missing_photo() {
        let renderer = renderer();
        let stats_mgr = StatsManager::new();
        let i18n = I18nStrings::default();
        let ctx = context(&renderer, &stats_mgr, &i18n, Duration::from_secs(5));

        let mut channel = MockChannel::default();
        assert_eq!(run(&mut channel, &ctx, "REQ_3_1234").await, Stage::Failed);
        assert_eq!(channel.texts, vec![i18n.no_photo_prompt.clone()]);
        assert_eq!(stats_mgr.snapshot().failures, 1);
    }

    #[tokio::test]
    async fn test_processing_failure_uses_generic_prompt() {
        let renderer = renderer();
        let stats_mgr = StatsManager::new();
        let i18n = I18nStrings::default();
        let ctx = context(&renderer, &stats_mgr, &i18n, Duration::from_secs(5));

        let mut channel = MockChannel {
            photo: Some(b"not an image".to_vec()),
            ..Default::default()
        };
        assert_eq!(run(&mut channel, &ctx, "REQ_4_1234").await, Stage::Failed);
        assert_eq!(channel.texts, vec![i18n.error_prompt.clone()]);
        assert!(channel.animations.is_empty());
        // The status message is still cleaned up.
        assert_eq!(channel.clears, 1);
    }

    #[tokio::test]
    async fn test_status_cleanup_failure_is_swallowed() {
        let renderer = renderer();
        let stats_mgr = StatsManager::new();
        let i18n = I18nStrings::default();
        let ctx = context(&renderer, &stats_mgr, &i18n, Duration::from_secs(30));

        let photo = RgbImage::from_pixel(16, 16, Rgb([200, 40, 40]));
        let mut channel = MockChannel {
            photo: Some(png_bytes(&photo)),
            fail_clear: true,
            ..Default::default()
        };
        assert_eq!(run(&mut channel, &ctx, "REQ_5_1234").await, Stage::Done);
        assert_eq!(stats_mgr.snapshot().successes, 1);
        assert!(channel.texts.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_failure_after_error_still_reports() {
        let renderer = renderer();
        let stats_mgr = StatsManager::new();
        let i18n = I18nStrings::default();
        let ctx = context(&renderer, &stats_mgr, &i18n, Duration::from_secs(5));

        let mut channel = MockChannel {
            photo: Some(b"not an image".to_vec()),
            fail_clear: true,
            ..Default::default()
        };
        assert_eq!(run(&mut channel, &ctx, "REQ_7_1234").await, Stage::Failed);
        assert_eq!(channel.texts, vec![i18n.error_prompt.clone()]);
        assert_eq!(channel.clears, 1);
        assert_eq!(stats_mgr.snapshot().failures, 1);
    }

    #[test]
    fn test_request_id_format() {
        let id = new_request_id();
        let parts: Vec<_> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "REQ");
        assert!(parts[1].parse::<u64>().is_ok());
        let suffix: u16 = parts[2].parse().unwrap();
        assert!((1000..=9999).contains(&suffix));
    }

    #[test]
    fn test_caption() {
        let delivered = Delivered {
            style: crate::render::Style::Cinematic,
            frame_count: 64,
            size_bytes: 2048,
            processing_time: Duration::from_millis(1500),
        };
        let text = caption(&delivered, "REQ_0_1000", &I18nStrings::default());
        assert!(text.starts_with("Your smart GIF is ready!\nStyle: Cinematic\n"));
        assert!(text.contains("Frames: 64 | Size: 2.0KB"));
        assert!(text.contains("Processing: 1.50 s"));
    }

    #[test]
    fn test_caption_follows_configured_strings() {
        let i18n = I18nStrings {
            caption: "{style} | {frames} | {size} | {blurb} | {id}".to_owned(),
            cinematic_name: "Kino".to_owned(),
            cinematic_blurb: "dunkel".to_owned(),
            ..Default::default()
        };
        let delivered = Delivered {
            style: crate::render::Style::Cinematic,
            frame_count: 8,
            size_bytes: 1536,
            processing_time: Duration::from_millis(20),
        };
        assert_eq!(
            caption(&delivered, "REQ_0_1000", &i18n),
            "Kino | 8 | 1.5 | dunkel | REQ_0_1000"
        );
    }

    #[tokio::test]
    async fn test_timeout_during_render_cancels_the_worker() {
        let renderer = Renderer::new(
            RenderSettings {
                frame_count: 2000,
                encoder_speed: 30,
                ..Default::default()
            },
            1,
        );
        let stats_mgr = StatsManager::new();
        let i18n = I18nStrings::default();
        let ctx = context(&renderer, &stats_mgr, &i18n, Duration::from_millis(300));

        let photo = RgbImage::from_pixel(200, 200, Rgb([60, 30, 30]));
        let mut channel = MockChannel {
            photo: Some(png_bytes(&photo)),
            ..Default::default()
        };

        let stage = run(&mut channel, &ctx, "REQ_6_1234").await;
        assert_eq!(stage, Stage::Failed);
        assert_eq!(channel.texts, vec![i18n.timeout_prompt.clone()]);
        assert!(channel.animations.is_empty());

        let snapshot = stats_mgr.snapshot();
        assert_eq!(snapshot.total_requests, 1);
        assert_eq!(snapshot.successes, 0);
        assert_eq!(snapshot.failures, 1);

        // The single render slot is given back once the worker stops.
        let prepared = tokio::time::timeout(Duration::from_secs(5), renderer.prepare(png_bytes(&photo)))
            .await
            .unwrap();
        assert!(prepared.is_ok());
    }
}

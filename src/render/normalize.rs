use image::imageops::{self, FilterType};
use image::RgbImage;

use super::error::RenderError;

/// Decodes downloaded photo bytes into an RGB raster.
pub fn decode(bytes: &[u8]) -> Result<RgbImage, RenderError> {
    let image = image::load_from_memory(bytes).map_err(RenderError::Decode)?;
    Ok(image.to_rgb8())
}

/// Target size for fitting `(width, height)` into a `max_size` square,
/// keeping the aspect ratio. Sizes that already fit are returned unchanged.
pub fn fitted_size(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    if width <= max_size && height <= max_size {
        return (width, height);
    }

    let (w, h) = if width > height {
        let h = (max_size as f64 / width as f64 * height as f64) as u32;
        (max_size, h)
    } else {
        let w = (max_size as f64 / height as f64 * width as f64) as u32;
        (w, max_size)
    };
    (w.max(1), h.max(1))
}

/// Downscales `image` so its longer side is at most `max_size`.
pub fn fit(image: RgbImage, max_size: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    let (w, h) = fitted_size(width, height, max_size);
    if (w, h) == (width, height) {
        return image;
    }
    imageops::resize(&image, w, h, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgb, RgbImage};

    use super::*;

    #[test]
    fn test_fitted_size_bounds_and_aspect() {
        for (w, h) in [
            (600, 800),
            (800, 600),
            (4000, 3),
            (3, 4000),
            (401, 401),
            (1920, 1080),
            (1234, 987),
        ] {
            let (fw, fh) = fitted_size(w, h, 400);
            assert!(fw <= 400 && fh <= 400, "{}x{} -> {}x{}", w, h, fw, fh);
            assert!(fw >= 1 && fh >= 1);
            assert_eq!(fw.max(fh), 400);

            // Aspect ratio holds within one pixel of rounding.
            let expected_short = if w > h {
                400.0 * h as f64 / w as f64
            } else {
                400.0 * w as f64 / h as f64
            };
            let short = fw.min(fh) as f64;
            assert!((short - expected_short).abs() <= 1.0 || short == 1.0);
        }
    }

    #[test]
    fn test_small_images_are_untouched() {
        assert_eq!(fitted_size(200, 200, 400), (200, 200));
        assert_eq!(fitted_size(400, 10, 400), (400, 10));
        let image = RgbImage::from_pixel(10, 20, Rgb([1, 2, 3]));
        assert_eq!(fit(image.clone(), 400), image);
    }

    #[test]
    fn test_portrait_resize() {
        assert_eq!(fitted_size(600, 800, 400), (300, 400));
        let image = RgbImage::from_pixel(600, 800, Rgb([60, 30, 30]));
        assert_eq!(fit(image, 400).dimensions(), (300, 400));
    }

    #[test]
    fn test_decode_png_bytes() {
        let image = RgbImage::from_pixel(5, 4, Rgb([10, 20, 30]));
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();
        let decoded = decode(bytes.get_ref()).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(decode(b"definitely not an image"), Err(RenderError::Decode(_))));
    }
}

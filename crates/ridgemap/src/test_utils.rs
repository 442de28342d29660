//! Shared builders for image-based unit tests.

use image::{GrayImage, Luma};

/// Render a synthetic parallel-ridge field: a vertical sinusoidal ridge
/// pattern with two horizontal interruptions that produce ridge endings.
///
/// `period` is the full ridge+valley period in pixels.
pub(crate) fn draw_ridge_pattern(w: u32, h: u32, period: f64) -> GrayImage {
    let mut img = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let phase = 2.0 * std::f64::consts::PI * f64::from(x) / period;
            let v = 128.0 + 90.0 * phase.cos();
            img.put_pixel(x, y, Luma([v as u8]));
        }
    }

    // interrupt the ridges over two bands: endings appear at the borders
    let gap_x = (w / 4)..(3 * w / 4);
    for y in (3 * h / 8)..(3 * h / 8 + 8) {
        for x in gap_x.clone() {
            img.put_pixel(x, y, Luma([218]));
        }
    }
    for y in (5 * h / 8)..(5 * h / 8 + 8) {
        for x in gap_x.clone() {
            img.put_pixel(x, y, Luma([218]));
        }
    }
    blur_gray(&img, 0.8)
}

/// Gaussian-blur a `GrayImage` via `imageproc`, as a scanner would soften
/// the synthetic pattern.
pub(crate) fn blur_gray(img: &GrayImage, sigma: f32) -> GrayImage {
    let (w, h) = img.dimensions();
    let mut f = image::ImageBuffer::<Luma<f32>, Vec<f32>>::new(w, h);
    for y in 0..h {
        for x in 0..w {
            f.put_pixel(x, y, Luma([f32::from(img.get_pixel(x, y)[0]) / 255.0]));
        }
    }
    let blurred = imageproc::filter::gaussian_blur_f32(&f, sigma);
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let v = blurred.get_pixel(x, y)[0].clamp(0.0, 1.0);
            out.put_pixel(x, y, Luma([(v * 255.0).round() as u8]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_has_ridges_and_gaps() {
        let img = draw_ridge_pattern(64, 64, 8.0);
        // a ridge crest column stays dark, the gap band stays bright
        assert!(img.get_pixel(8, 8)[0] < 80);
        let gy = 3 * 64 / 8 + 4;
        for x in 24..40 {
            assert!(img.get_pixel(x, gy)[0] > 190);
        }
    }
}

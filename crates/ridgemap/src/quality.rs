//! Reliability refinement from raw grayscale statistics.
//!
//! Detection seeds each minutia's reliability from the block maps. This
//! pass folds in the original (unscaled) grayscale evidence: a minutia in a
//! washed-out neighborhood is less trustworthy than its block tier claims.

use image::GrayImage;
use tracing::debug;

use crate::config::QualityConfig;
use crate::minutiae::Minutiae;

/// Scale each minutia's reliability by its local contrast.
///
/// The factor is the standard deviation of the grayscale neighborhood,
/// normalized by `stddev_norm` and clamped to 1: full-contrast ridges keep
/// their map tier, flat areas collapse toward zero.
pub fn combined_minutia_quality(minutiae: &mut Minutiae, gray: &GrayImage, cfg: &QualityConfig) {
    let (w, h) = gray.dimensions();
    let r = cfg.radius as i64;

    for i in 0..minutiae.len() {
        let m = minutiae.get_mut(i);
        let (cx, cy) = (i64::from(m.x), i64::from(m.y));

        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;
        let mut n = 0u32;
        for y in (cy - r).max(0)..=(cy + r).min(i64::from(h) - 1) {
            for x in (cx - r).max(0)..=(cx + r).min(i64::from(w) - 1) {
                let v = f64::from(gray.get_pixel(x as u32, y as u32)[0]);
                sum += v;
                sum_sq += v * v;
                n += 1;
            }
        }
        if n == 0 {
            continue;
        }
        let mean = sum / f64::from(n);
        let var = (sum_sq / f64::from(n) - mean * mean).max(0.0);
        let factor = (var.sqrt() / cfg.stddev_norm).min(1.0);
        m.reliability *= factor;
    }

    debug!(count = minutiae.len(), "minutia quality refined");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minutiae::{Minutia, MinutiaKind};
    use image::Luma;

    fn minutia_at(x: i32, y: i32) -> Minutia {
        Minutia {
            x,
            y,
            ex: x,
            ey: y - 1,
            direction: 0,
            kind: MinutiaKind::RidgeEnding,
            appearing: false,
            reliability: 0.99,
            nbrs: Vec::new(),
            ridge_counts: Vec::new(),
        }
    }

    #[test]
    fn flat_neighborhood_collapses_reliability() {
        let gray = GrayImage::from_pixel(32, 32, Luma([128]));
        let mut list = Minutiae::with_capacity(4);
        assert!(list.push(minutia_at(16, 16)));
        combined_minutia_quality(&mut list, &gray, &QualityConfig::default());
        assert_eq!(list.get(0).reliability, 0.0);
    }

    #[test]
    fn high_contrast_neighborhood_keeps_the_tier() {
        // alternating 0/255 columns: stddev ~127, far above the norm
        let mut gray = GrayImage::new(32, 32);
        for y in 0..32 {
            for x in 0..32 {
                gray.put_pixel(x, y, Luma([if x % 2 == 0 { 0 } else { 255 }]));
            }
        }
        let mut list = Minutiae::with_capacity(4);
        assert!(list.push(minutia_at(16, 16)));
        combined_minutia_quality(&mut list, &gray, &QualityConfig::default());
        assert!((list.get(0).reliability - 0.99).abs() < 1e-9);
    }

    #[test]
    fn border_minutiae_use_the_clipped_window() {
        let mut gray = GrayImage::new(8, 8);
        for y in 0..8 {
            for x in 0..8 {
                gray.put_pixel(x, y, Luma([if y < 4 { 0 } else { 255 }]));
            }
        }
        let mut list = Minutiae::with_capacity(4);
        assert!(list.push(minutia_at(0, 4)));
        combined_minutia_quality(&mut list, &gray, &QualityConfig::default());
        let r = list.get(0).reliability;
        assert!(r > 0.5 && r <= 0.99, "reliability {}", r);
    }
}

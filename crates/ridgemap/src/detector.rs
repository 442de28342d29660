//! High-level detection API.
//!
//! [`Detector`] is the primary entry point: it wraps a [`DetectConfig`] and
//! runs the full pipeline on a grayscale image. Create once, detect on many
//! images; the precomputed tables are pure functions of the configuration
//! and are rebuilt per call only because they also depend on image width.

use image::GrayImage;
use serde::Serialize;
use tracing::info;

use crate::binarize::{binarize_v2, binarize_with_fallback};
use crate::config::DetectConfig;
use crate::detect::detect_minutiae;
use crate::error::DetectError;
use crate::maps::gen_image_maps;
use crate::minutiae::Minutia;
use crate::quality::combined_minutia_quality;
use crate::raster::PaddedImage;
use crate::remove::remove_false_minutiae;
use crate::ridges::count_minutiae_ridges;
use crate::tables::{DftWaveTable, DirectionTrigTable, RelativeTo, RotatedGridTable};

/// Everything one detection run produces.
#[derive(Debug, Clone)]
pub struct DetectionOutput {
    /// Final minutiae with neighbors and ridge counts.
    pub minutiae: Vec<Minutia>,
    /// Binarized image: ridge black (0), valley white (255).
    pub binary_image: GrayImage,
    /// Input dimensions `[width, height]`.
    pub image_size: [u32; 2],
}

impl DetectionOutput {
    /// Serializable feature template for enrollment/verification systems.
    pub fn template(&self, ppi: u32) -> MinutiaeTemplate<'_> {
        MinutiaeTemplate {
            image_size: self.image_size,
            ppi,
            minutiae: &self.minutiae,
        }
    }
}

/// Borrowed serializable view of a detection result.
#[derive(Debug, Serialize)]
pub struct MinutiaeTemplate<'a> {
    /// Input dimensions `[width, height]`.
    pub image_size: [u32; 2],
    /// Scan resolution as supplied by the caller (not validated here).
    pub ppi: u32,
    /// Detected minutiae.
    pub minutiae: &'a [Minutia],
}

/// Primary detection interface.
///
/// # Examples
///
/// ```no_run
/// use ridgemap::Detector;
/// use image::GrayImage;
///
/// let detector = Detector::new();
/// let image = GrayImage::new(500, 550);
/// let output = detector.detect(&image)?;
/// println!("{} minutiae", output.minutiae.len());
/// # Ok::<(), ridgemap::DetectError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Detector {
    config: DetectConfig,
}

impl Detector {
    /// Detector with the default 500ppi configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Detector with full configuration control.
    pub fn with_config(config: DetectConfig) -> Self {
        Self { config }
    }

    /// Access the current configuration.
    pub fn config(&self) -> &DetectConfig {
        &self.config
    }

    /// Mutable access for post-construction tuning.
    pub fn config_mut(&mut self) -> &mut DetectConfig {
        &mut self.config
    }

    /// Run the full pipeline on an 8-bit grayscale image.
    ///
    /// Stages: pad and 6-bit scale, build tables, generate ridge-flow maps,
    /// binarize, detect minutiae, remove false minutiae, refine quality,
    /// count inter-minutia ridges. Configuration and internal-consistency
    /// failures abort with an error and no partial output.
    pub fn detect(&self, image: &GrayImage) -> Result<DetectionOutput, DetectError> {
        let cfg = &self.config;
        let (w, h) = image.dimensions();
        info!(width = w, height = h, "detection started");

        let pad = cfg.required_pad();
        let mut padded = PaddedImage::from_gray(image, pad, cfg.pad_value);
        padded.scale_8_to_6();

        let trig = DirectionTrigTable::new(cfg.n_dirs);
        let waves = DftWaveTable::new(&cfg.map.dft_wave_coeffs, cfg.map.window_size);
        let dft_grids = RotatedGridTable::new(
            cfg.start_dir_angle,
            cfg.n_dirs,
            cfg.map.window_size,
            cfg.map.window_size,
            RelativeTo::Origin,
            w as usize,
            Some(pad),
        )?;
        let dirbin_grids = RotatedGridTable::new(
            cfg.start_dir_angle,
            cfg.n_dirs,
            cfg.binarize.grid_w,
            cfg.binarize.grid_h,
            RelativeTo::Center,
            w as usize,
            Some(pad),
        )?;

        let maps = gen_image_maps(&padded, &dft_grids, &waves, &trig, &cfg.map)?;

        let mut binary = if cfg.binarize.isotropic_fallback {
            let combined = maps.combined_map();
            binarize_with_fallback(
                &padded,
                &combined,
                &maps,
                &dirbin_grids,
                cfg.binarize.iso_grid_dim,
                cfg.binarize.fill_hole_passes,
            )
        } else {
            binarize_v2(&padded, &maps, &dirbin_grids, cfg.binarize.fill_hole_passes)
        };

        let mut minutiae = detect_minutiae(&binary, &maps, cfg);
        remove_false_minutiae(&mut minutiae, &mut binary, &maps, cfg);
        combined_minutia_quality(&mut minutiae, image, &cfg.quality);
        count_minutiae_ridges(&mut minutiae, &binary, &cfg.minutiae)?;

        info!(minutiae = minutiae.len(), "detection finished");
        Ok(DetectionOutput {
            minutiae: minutiae.into_vec(),
            binary_image: binary.to_gray(),
            image_size: [w, h],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::minutiae::MinutiaKind;
    use crate::test_utils::draw_ridge_pattern;

    #[test]
    fn detector_runs_end_to_end_on_synthetic_ridges() {
        let img = draw_ridge_pattern(160, 160, 8.0);
        let det = Detector::new();
        let out = det.detect(&img).unwrap();

        assert_eq!(out.image_size, [160, 160]);
        assert_eq!(out.binary_image.dimensions(), (160, 160));
        // a clean parallel-ridge field with interrupted lines yields
        // minutiae, each fully annotated
        for m in &out.minutiae {
            assert!(m.x >= 0 && m.x < 160);
            assert!(m.y >= 0 && m.y < 160);
            assert!((0.0..=1.0).contains(&m.reliability));
            assert!(m.direction >= 0 && m.direction < 32);
            assert_eq!(m.nbrs.len(), m.ridge_counts.len());
            assert!(m.nbrs.len() <= 5);
            assert!(matches!(
                m.kind,
                MinutiaKind::RidgeEnding | MinutiaKind::Bifurcation
            ));
        }
    }

    #[test]
    fn undersized_image_fails_with_config_error() {
        let img = GrayImage::new(4, 4);
        let det = Detector::new();
        let err = det.detect(&img).unwrap_err();
        assert!(matches!(
            err,
            DetectError::Config(ConfigError::ImageTooSmall { .. })
        ));
    }

    #[test]
    fn flat_image_yields_empty_template() {
        let img = GrayImage::from_pixel(64, 64, image::Luma([128]));
        let det = Detector::new();
        let out = det.detect(&img).unwrap();
        assert!(out.minutiae.is_empty());
        // all-invalid maps binarize to all white
        assert!(out.binary_image.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn template_serializes_with_resolution() {
        let img = draw_ridge_pattern(96, 96, 8.0);
        let det = Detector::new();
        let out = det.detect(&img).unwrap();
        let json = serde_json::to_string(&out.template(det.config().ppi)).unwrap();
        assert!(json.contains("\"ppi\":500"));
        assert!(json.contains("\"image_size\":[96,96]"));
    }

    #[test]
    fn isotropic_fallback_variant_runs() {
        let img = draw_ridge_pattern(96, 96, 8.0);
        let mut det = Detector::new();
        det.config_mut().binarize.isotropic_fallback = true;
        let out = det.detect(&img).unwrap();
        assert_eq!(out.image_size, [96, 96]);
    }
}

//! Detection configuration.
//!
//! All thresholds of the pipeline live here, grouped per stage. Defaults
//! reproduce the classical 500ppi operating point; individual fields can be
//! overridden after construction.

use serde::{Deserialize, Serialize};

/// Ridge-flow map generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Block side in pixels; one map cell per block.
    pub block_size: usize,
    /// DFT analysis window side in pixels.
    pub window_size: usize,
    /// Window shift up/left from the block origin, in pixels.
    pub window_offset: usize,
    /// Percentile (from each end) used by the block contrast test.
    pub percentile_min_max: f64,
    /// Minimum 6-bit pixel spread for a block to carry contrast.
    pub min_contrast_delta: i32,
    /// DFT wave frequency coefficients (periods per window).
    pub dft_wave_coeffs: Vec<f64>,
    /// First wave index eligible for direction ranking.
    ///
    /// The fundamental is excluded by default: slow illumination gradients
    /// dominate it.
    pub first_ranked_wave: usize,
    /// Floor applied to a window's total power before normalization.
    pub min_power_sum: f64,
    /// Primary test: minimum peak power.
    pub pow_max_min: f64,
    /// Primary test: minimum normalized peak power.
    pub pow_norm_min: f64,
    /// Peak power above which a direction is accepted outright.
    pub pow_max_max: f64,
    /// How many runner-up waves the fork test may consult.
    pub fork_interval: usize,
    /// Fork test relaxation factor on `pow_max_min`.
    pub fork_pct_pow_max: f64,
    /// Fork test relaxation factor on `pow_norm_min`.
    pub fork_pct_pow_norm: f64,
    /// Minimum valid neighbors for the direction smoothing test.
    pub min_valid_nbrs: usize,
    /// Maximum distance from the neighbor average before a direction is
    /// discarded as inconsistent.
    pub dir_distance_max: i32,
    /// Vorticity at or above which a block is marked high-curvature.
    pub vorticity_min: i32,
    /// Neighbor direction distance at or above which a block is marked
    /// high-curvature.
    pub curvature_min: i32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            block_size: 8,
            window_size: 24,
            window_offset: 8,
            percentile_min_max: 10.0,
            min_contrast_delta: 5,
            dft_wave_coeffs: vec![1.0, 2.0, 3.0, 4.0],
            first_ranked_wave: 1,
            min_power_sum: 10.0,
            pow_max_min: 100_000.0,
            pow_norm_min: 3.8,
            pow_max_max: 8_000_000.0,
            fork_interval: 2,
            fork_pct_pow_max: 0.7,
            fork_pct_pow_norm: 0.75,
            min_valid_nbrs: 3,
            dir_distance_max: 3,
            vorticity_min: 5,
            curvature_min: 7,
        }
    }
}

/// Binarization parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinarizeConfig {
    /// Directional grid width (across ridge flow).
    pub grid_w: usize,
    /// Directional grid height (along ridge flow).
    pub grid_h: usize,
    /// Square neighborhood side for the isotropic method.
    pub iso_grid_dim: usize,
    /// Use the isotropic fallback for invalid/high-curvature blocks instead
    /// of plain white fill.
    pub isotropic_fallback: bool,
    /// Hole-filling applications after binarization.
    pub fill_hole_passes: usize,
}

impl Default for BinarizeConfig {
    fn default() -> Self {
        Self {
            grid_w: 7,
            grid_h: 9,
            iso_grid_dim: 11,
            isotropic_fallback: false,
            fill_hole_passes: 3,
        }
    }
}

/// Minutiae detection, removal, and ridge counting parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinutiaeConfig {
    /// Hard cap on detected minutiae; scanning stops when reached.
    pub max_minutiae: usize,
    /// Closest neighbors counted per minutia.
    pub max_nbrs: usize,
    /// Step bound for ridge-crossing contour validation.
    pub max_ridge_steps: usize,
    /// Contour steps bounding a small island/lake/hole loop.
    pub small_loop_len: usize,
    /// Block radius around a minutia that must be free of invalid blocks.
    pub inv_block_margin: i32,
    /// Half length of the centered contour used by the side-minutia test.
    pub side_half_contour: usize,
}

impl Default for MinutiaeConfig {
    fn default() -> Self {
        Self {
            max_minutiae: 1000,
            max_nbrs: 5,
            max_ridge_steps: 10,
            small_loop_len: 15,
            inv_block_margin: 1,
            side_half_contour: 7,
        }
    }
}

/// Reliability refinement parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Grayscale neighborhood radius for the local contrast statistic.
    pub radius: usize,
    /// Standard deviation mapped to full confidence.
    pub stddev_norm: f64,
    /// Reliability tier for minutiae in clean blocks.
    pub reliability_high: f64,
    /// Reliability tier for minutiae in high-curvature blocks.
    pub reliability_medium: f64,
    /// Reliability tier for minutiae in low-flow blocks.
    pub reliability_low: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            radius: 5,
            stddev_norm: 64.0,
            reliability_high: 0.99,
            reliability_medium: 0.50,
            reliability_low: 0.25,
        }
    }
}

/// Top-level detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectConfig {
    /// Number of discrete ridge-flow directions on the half circle.
    pub n_dirs: usize,
    /// Orientation of direction index 0, in radians.
    pub start_dir_angle: f64,
    /// Pixel value used for the padded border.
    pub pad_value: u8,
    /// Scan resolution in pixels per inch. Carried into the template;
    /// range validation is left to downstream quality consumers.
    pub ppi: u32,
    /// Map generation parameters.
    pub map: MapConfig,
    /// Binarization parameters.
    pub binarize: BinarizeConfig,
    /// Minutiae parameters.
    pub minutiae: MinutiaeConfig,
    /// Reliability refinement parameters.
    pub quality: QualityConfig,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            n_dirs: 16,
            start_dir_angle: std::f64::consts::FRAC_PI_2,
            pad_value: 128,
            ppi: 500,
            map: MapConfig::default(),
            binarize: BinarizeConfig::default(),
            minutiae: MinutiaeConfig::default(),
            quality: QualityConfig::default(),
        }
    }
}

impl DetectConfig {
    /// Image pad required by every rotated grid in the pipeline.
    pub fn required_pad(&self) -> usize {
        crate::tables::max_padding_v2(
            self.map.window_size,
            self.map.window_offset,
            self.binarize.grid_w,
            self.binarize.grid_h,
        )
        .max(crate::tables::max_padding_v1(
            self.map.block_size,
            self.binarize.grid_w,
            self.binarize.grid_h,
            self.binarize.iso_grid_dim,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_stable() {
        let cfg = DetectConfig::default();
        assert_eq!(cfg.n_dirs, 16);
        assert_eq!(cfg.pad_value, 128);
        assert_eq!(cfg.map.block_size, 8);
        assert_eq!(cfg.map.window_size, 24);
        assert_eq!(cfg.map.window_offset, 8);
        assert_eq!(cfg.map.dft_wave_coeffs.len(), 4);
        assert_eq!(cfg.binarize.grid_w, 7);
        assert_eq!(cfg.binarize.grid_h, 9);
        assert_eq!(cfg.minutiae.max_minutiae, 1000);
        assert_eq!(cfg.minutiae.max_nbrs, 5);
        assert_eq!(cfg.minutiae.max_ridge_steps, 10);
        assert!((cfg.quality.reliability_high - 0.99).abs() < 1e-12);
    }

    #[test]
    fn required_pad_covers_window_grids() {
        let cfg = DetectConfig::default();
        assert_eq!(cfg.required_pad(), 13);
    }

    #[test]
    fn config_round_trips_through_json() {
        let cfg = DetectConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: DetectConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.map.block_size, cfg.map.block_size);
        assert_eq!(back.binarize.fill_hole_passes, cfg.binarize.fill_hole_passes);
    }
}

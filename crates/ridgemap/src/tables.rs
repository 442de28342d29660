//! Precomputed orientation tables.
//!
//! The pipeline samples the padded image along rotated grids millions of
//! times per run. All trigonometry happens once, here, at table build time;
//! scan time is pure integer offset arithmetic. Tables are plain functions
//! of their construction parameters, immutable after construction, and safe
//! to reuse read-only across detection runs with the same configuration.

use nalgebra::{Rotation2, Vector2};

use crate::error::ConfigError;
use crate::util::numeric::{round_nearest, trunc_precision};

/// How rotated grid offsets relate to the pixel they are applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RelativeTo {
    /// Offsets are relative to the grid's top-left origin.
    Origin,
    /// Offsets are relative to the grid center pixel.
    Center,
}

// ── Direction trig table ───────────────────────────────────────────────────

/// Cosine/sine per block direction index.
///
/// Entry `i` holds the angle `i * (2π / n_dirs)`. Block directions span a
/// half circle at `π / n_dirs` spacing, so the table carries the doubled
/// angle; summing table entries therefore averages half-circle directions
/// without the ±180° ambiguity.
#[derive(Debug, Clone)]
pub struct DirectionTrigTable {
    cos: Vec<f64>,
    sin: Vec<f64>,
}

impl DirectionTrigTable {
    pub fn new(n_dirs: usize) -> Self {
        let mut cos = Vec::with_capacity(n_dirs);
        let mut sin = Vec::with_capacity(n_dirs);
        let step = 2.0 * std::f64::consts::PI / n_dirs as f64;
        for i in 0..n_dirs {
            let theta = i as f64 * step;
            cos.push(trunc_precision(theta.cos()));
            sin.push(trunc_precision(theta.sin()));
        }
        Self { cos, sin }
    }

    #[inline]
    pub fn cos(&self, dir: usize) -> f64 {
        self.cos[dir]
    }

    #[inline]
    pub fn sin(&self, dir: usize) -> f64 {
        self.sin[dir]
    }

    pub fn n_dirs(&self) -> usize {
        self.cos.len()
    }
}

// ── DFT wave table ─────────────────────────────────────────────────────────

/// One discrete wave form: cosine and sine sampled at `wave_len` points.
#[derive(Debug, Clone)]
pub struct DftWave {
    pub cos: Vec<f64>,
    pub sin: Vec<f64>,
}

/// Wave forms used to measure directional ridge-frequency power.
#[derive(Debug, Clone)]
pub struct DftWaveTable {
    waves: Vec<DftWave>,
    wave_len: usize,
}

impl DftWaveTable {
    /// Build one wave per frequency coefficient. The angular frequency of
    /// wave `k` is `coeffs[k] * (2π / wave_len)`.
    pub fn new(coeffs: &[f64], wave_len: usize) -> Self {
        let mut waves = Vec::with_capacity(coeffs.len());
        for &c in coeffs {
            let freq = c * 2.0 * std::f64::consts::PI / wave_len as f64;
            let mut cos = Vec::with_capacity(wave_len);
            let mut sin = Vec::with_capacity(wave_len);
            for i in 0..wave_len {
                let theta = freq * i as f64;
                cos.push(theta.cos());
                sin.push(theta.sin());
            }
            waves.push(DftWave { cos, sin });
        }
        Self { waves, wave_len }
    }

    #[inline]
    pub fn wave(&self, k: usize) -> &DftWave {
        &self.waves[k]
    }

    pub fn n_waves(&self) -> usize {
        self.waves.len()
    }

    pub fn wave_len(&self) -> usize {
        self.wave_len
    }
}

// ── Rotated grid table ─────────────────────────────────────────────────────

/// Pixel-offset grids for sampling a block/window as if rotated to each of
/// `n_dirs` orientations.
///
/// Offsets are flat indices into a padded raster of the width given at
/// construction; applying a grid is `base_index + offset` per sample. The
/// required pad is derived from the grid diagonal so no offset can escape a
/// correctly padded buffer.
#[derive(Debug, Clone)]
pub struct RotatedGridTable {
    grids: Vec<Vec<i32>>,
    pub grid_w: usize,
    pub grid_h: usize,
    /// Pad the offsets were validated against.
    pub pad: usize,
    pub relative_to: RelativeTo,
}

impl RotatedGridTable {
    /// Build grids for `n_dirs` orientations spanning a half circle from
    /// `start_angle` in steps of `π / n_dirs`.
    ///
    /// `pad` of `None` adopts the computed minimum; supplying a smaller pad
    /// than the grids require is a configuration error, never silently
    /// corrected.
    pub fn new(
        start_angle: f64,
        n_dirs: usize,
        grid_w: usize,
        grid_h: usize,
        relative_to: RelativeTo,
        image_width: usize,
        pad: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let required = required_grid_pad(grid_w, grid_h, relative_to);
        let pad = match pad {
            None => required,
            Some(p) if p < required => {
                return Err(ConfigError::InsufficientPadding {
                    requested: p,
                    required,
                });
            }
            Some(p) => p,
        };
        let padded_width = (image_width + 2 * pad) as i32;

        let cx = (grid_w - 1) as f64 / 2.0;
        let cy = (grid_h - 1) as f64 / 2.0;
        let step = std::f64::consts::PI / n_dirs as f64;

        let mut grids = Vec::with_capacity(n_dirs);
        for dir in 0..n_dirs {
            let theta = start_angle + dir as f64 * step;
            let rot = Rotation2::new(theta);
            let mut grid = Vec::with_capacity(grid_w * grid_h);
            for row in 0..grid_h {
                for col in 0..grid_w {
                    let v = rot * Vector2::new(col as f64 - cx, row as f64 - cy);
                    let (mut fx, mut fy) = (v.x, v.y);
                    if relative_to == RelativeTo::Origin {
                        fx += cx;
                        fy += cy;
                    }
                    let x = round_nearest(trunc_precision(fx));
                    let y = round_nearest(trunc_precision(fy));
                    grid.push(x + y * padded_width);
                }
            }
            grids.push(grid);
        }

        Ok(Self {
            grids,
            grid_w,
            grid_h,
            pad,
            relative_to,
        })
    }

    /// Offsets for one orientation, row-major `grid_w * grid_h`.
    #[inline]
    pub fn grid(&self, dir: usize) -> &[i32] {
        &self.grids[dir]
    }

    pub fn n_dirs(&self) -> usize {
        self.grids.len()
    }
}

/// Minimum image pad a rotated grid of the given geometry needs.
pub fn required_grid_pad(grid_w: usize, grid_h: usize, relative_to: RelativeTo) -> usize {
    let diag = ((grid_w * grid_w + grid_h * grid_h) as f64).sqrt();
    let diag = trunc_precision(diag);
    let pad = match relative_to {
        RelativeTo::Center => (diag - 1.0) / 2.0,
        RelativeTo::Origin => (diag - grid_w.min(grid_h) as f64) / 2.0,
    };
    round_nearest(trunc_precision(pad)) as usize
}

/// Maximum pad required across the block-based pipeline: square DFT grids
/// sized to the block, the directional binarization grid, and the isotropic
/// binarization neighborhood radius.
pub fn max_padding_v1(
    block_size: usize,
    dirbin_grid_w: usize,
    dirbin_grid_h: usize,
    iso_grid_dim: usize,
) -> usize {
    let dft_pad = required_grid_pad(block_size, block_size, RelativeTo::Origin);
    let dirbin_pad = required_grid_pad(dirbin_grid_w, dirbin_grid_h, RelativeTo::Center);
    let iso_pad = round_nearest(trunc_precision((iso_grid_dim as f64 - 1.0) / 2.0)) as usize;
    dft_pad.max(dirbin_pad).max(iso_pad)
}

/// Maximum pad required across the windowed pipeline: square DFT grids over
/// the analysis window (shifted outward by the window offset) and the
/// directional binarization grid.
pub fn max_padding_v2(
    window_size: usize,
    window_offset: usize,
    dirbin_grid_w: usize,
    dirbin_grid_h: usize,
) -> usize {
    let dft_pad = required_grid_pad(window_size, window_size, RelativeTo::Origin) + window_offset;
    let dirbin_pad = required_grid_pad(dirbin_grid_w, dirbin_grid_h, RelativeTo::Center);
    dft_pad.max(dirbin_pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trig_table_matches_closed_form() {
        let t = DirectionTrigTable::new(16);
        assert_eq!(t.n_dirs(), 16);
        assert!((t.cos(0) - 1.0).abs() < 1e-4);
        assert!(t.sin(0).abs() < 1e-4);
        assert!((t.sin(4) - 1.0).abs() < 1e-4);
        assert!(t.cos(4).abs() < 1e-4);
        assert!((t.cos(8) + 1.0).abs() < 1e-4);
    }

    #[test]
    fn wave_table_first_coefficient_is_one_period() {
        let t = DftWaveTable::new(&[1.0, 2.0], 24);
        assert_eq!(t.n_waves(), 2);
        assert_eq!(t.wave_len(), 24);
        let w = t.wave(0);
        assert!((w.cos[0] - 1.0).abs() < 1e-12);
        assert!((w.cos[12] + 1.0).abs() < 1e-9);
        // second wave completes two periods over the window
        let w2 = t.wave(1);
        assert!((w2.cos[12] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn required_pad_center_vs_origin() {
        // 7x9 grid: diag = sqrt(130) ~ 11.40
        assert_eq!(required_grid_pad(7, 9, RelativeTo::Center), 5);
        assert_eq!(required_grid_pad(7, 9, RelativeTo::Origin), 2);
        // 24x24 window: diag ~ 33.94
        assert_eq!(required_grid_pad(24, 24, RelativeTo::Origin), 5);
    }

    #[test]
    fn insufficient_pad_is_rejected() {
        let err = RotatedGridTable::new(
            std::f64::consts::FRAC_PI_2,
            16,
            7,
            9,
            RelativeTo::Center,
            100,
            Some(2),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InsufficientPadding { required: 5, .. }));
    }

    #[test]
    fn undefined_pad_adopts_computed_minimum() {
        let t = RotatedGridTable::new(
            std::f64::consts::FRAC_PI_2,
            16,
            7,
            9,
            RelativeTo::Center,
            100,
            None,
        )
        .unwrap();
        assert_eq!(t.pad, 5);
        assert_eq!(t.n_dirs(), 16);
        assert_eq!(t.grid(0).len(), 63);
    }

    /// Split a flat offset back into (x, y); grid coordinates are small
    /// relative to the stride, so y is the nearest stride multiple.
    fn decompose(offset: i32, stride: i32) -> (i32, i32) {
        let y = (offset as f64 / stride as f64).round() as i32;
        (offset - y * stride, y)
    }

    #[test]
    fn half_circle_rotation_negates_offsets() {
        // direction d and d+8 are a half turn apart for n_dirs = 16;
        // center-relative offsets negate within rounding
        let pad = required_grid_pad(7, 9, RelativeTo::Center);
        let image_width = 64usize;
        let t = RotatedGridTable::new(
            std::f64::consts::FRAC_PI_2,
            16,
            7,
            9,
            RelativeTo::Center,
            image_width,
            Some(pad),
        )
        .unwrap();
        let stride = (image_width + 2 * pad) as i32;
        for d in 0..8 {
            for (&oa, &ob) in t.grid(d).iter().zip(t.grid(d + 8).iter()) {
                let (ax, ay) = decompose(oa, stride);
                let (bx, by) = decompose(ob, stride);
                assert!((ax + bx).abs() <= 1, "dir {}: x {} vs {}", d, ax, bx);
                assert!((ay + by).abs() <= 1, "dir {}: y {} vs {}", d, ay, by);
            }
        }
    }

    #[test]
    fn max_padding_covers_both_grid_families() {
        // windowed pipeline: dft pad 5 + offset 8 dominates dirbin pad 5
        assert_eq!(max_padding_v2(24, 8, 7, 9), 13);
        // block pipeline: 24px block dft pad 5 vs dirbin 5 vs iso radius 5
        assert_eq!(max_padding_v1(24, 7, 9, 11), 5);
    }
}

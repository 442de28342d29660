//! Ridge-flow map generation.
//!
//! One cell per image block, four parallel maps: dominant ridge-flow
//! direction, low contrast, low flow (weak direction evidence), and high
//! curvature. Binarization, minutiae detection, and removal all key off
//! these maps.

use tracing::debug;

use crate::block::{block_offsets, low_contrast_block, set_margin_blocks};
use crate::config::MapConfig;
use crate::dft::{dft_dir_powers, dft_power_stats};
use crate::error::DetectError;
use crate::raster::PaddedImage;
use crate::tables::{DftWaveTable, DirectionTrigTable, RotatedGridTable};
use crate::util::geometry::closest_dir_distance;
use crate::util::numeric::{float_mod, round_nearest};

/// Direction-map sentinel: no reliable direction for this block.
pub const INVALID_DIR: i32 = -1;
/// Combined-map sentinel: block sits in a high-curvature region.
pub const HIGH_CURVATURE: i32 = -2;
/// Combined-map sentinel: no valid direction anywhere in the neighborhood.
pub const NO_VALID_NBRS: i32 = -3;

/// Clockwise 8-neighborhood ring, starting north-west.
const NBR_RING: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
];

/// Block-indexed maps produced by [`gen_image_maps`].
#[derive(Debug, Clone)]
pub struct ImageMaps {
    /// Dominant ridge-flow direction per block, or [`INVALID_DIR`].
    pub dir_map: Vec<i32>,
    /// 1 where the block failed the contrast test.
    pub low_contrast: Vec<u8>,
    /// 1 where direction evidence was below the acceptance thresholds.
    pub low_flow: Vec<u8>,
    /// 1 where the neighborhood bends sharply (cores, deltas).
    pub high_curve: Vec<u8>,
    /// Blocks per row.
    pub width: usize,
    /// Blocks per column.
    pub height: usize,
    /// Block side in pixels.
    pub block_size: usize,
}

impl ImageMaps {
    /// Map cell owning the unpadded pixel `(x, y)`.
    #[inline]
    pub fn cell_for_pixel(&self, x: usize, y: usize) -> usize {
        let bx = (x / self.block_size).min(self.width - 1);
        let by = (y / self.block_size).min(self.height - 1);
        by * self.width + bx
    }

    /// Combined sentinel map for isotropic-fallback binarization.
    ///
    /// Per cell: [`HIGH_CURVATURE`] where the curvature map is set, else a
    /// valid direction, else [`NO_VALID_NBRS`] when the whole neighborhood
    /// lacks a direction, else [`INVALID_DIR`].
    pub fn combined_map(&self) -> Vec<i32> {
        let mut out = vec![INVALID_DIR; self.dir_map.len()];
        for by in 0..self.height as i32 {
            for bx in 0..self.width as i32 {
                let cell = by as usize * self.width + bx as usize;
                out[cell] = if self.high_curve[cell] != 0 {
                    HIGH_CURVATURE
                } else if self.dir_map[cell] >= 0 {
                    self.dir_map[cell]
                } else if !self.any_valid_nbr(bx, by) {
                    NO_VALID_NBRS
                } else {
                    INVALID_DIR
                };
            }
        }
        out
    }

    fn any_valid_nbr(&self, bx: i32, by: i32) -> bool {
        NBR_RING.iter().any(|&(dx, dy)| {
            let (nx, ny) = (bx + dx, by + dy);
            nx >= 0
                && ny >= 0
                && (nx as usize) < self.width
                && (ny as usize) < self.height
                && self.dir_map[ny as usize * self.width + nx as usize] >= 0
        })
    }
}

/// Generate the block maps for a padded 6-bit image.
///
/// `dft_grids` must be square grids over the analysis window; `waves` must
/// share the window length.
pub fn gen_image_maps(
    padded: &PaddedImage,
    dft_grids: &RotatedGridTable,
    waves: &DftWaveTable,
    trig: &DirectionTrigTable,
    cfg: &MapConfig,
) -> Result<ImageMaps, DetectError> {
    let grid = block_offsets(
        padded.orig_width(),
        padded.orig_height(),
        padded.pad,
        cfg.block_size,
    )?;
    let (map_w, map_h) = (grid.width, grid.height);
    let n_cells = map_w * map_h;
    let n_dirs = trig.n_dirs();

    let mut dir_map = vec![INVALID_DIR; n_cells];
    let mut low_contrast = vec![0u8; n_cells];
    let mut low_flow = vec![0u8; n_cells];

    let window_shift = cfg.window_offset * (padded.width + 1);
    let wave_hi = waves.n_waves();

    for (cell, &block_off) in grid.offsets.iter().enumerate() {
        if low_contrast_block(
            block_off,
            cfg.block_size,
            &padded.data,
            padded.width,
            cfg.percentile_min_max,
            cfg.min_contrast_delta,
        )? {
            low_contrast[cell] = 1;
            continue;
        }

        let powers = dft_dir_powers(&padded.data, block_off - window_shift, dft_grids, waves)?;
        let stats = dft_power_stats(&powers, cfg.first_ranked_wave, wave_hi, cfg.min_power_sum);
        let lo = cfg.first_ranked_wave;
        let Some(&best) = stats.ranked_waves.first() else {
            continue;
        };
        let pow_max = stats.max_power(best, lo);
        let pow_norm = stats.norm_power(best, lo);

        let primary = (pow_max > cfg.pow_max_min && pow_norm > cfg.pow_norm_min)
            || pow_max > cfg.pow_max_max;
        let fork = !primary
            && stats
                .ranked_waves
                .iter()
                .skip(1)
                .take(cfg.fork_interval)
                .any(|&w| {
                    stats.max_power(w, lo) > cfg.pow_max_min * cfg.fork_pct_pow_max
                        && stats.norm_power(w, lo) > cfg.pow_norm_min * cfg.fork_pct_pow_norm
                });

        // a weak winner is still recorded; low-flow marks its reliability
        dir_map[cell] = stats.max_power_dir(best, lo) as i32;
        if !(primary || fork) {
            low_flow[cell] = 1;
        }
    }

    let removed = remove_inconsistent_dirs(&mut dir_map, map_w, map_h, trig, cfg);
    let high_curve = gen_high_curve_map(&dir_map, map_w, map_h, n_dirs, cfg);
    set_margin_blocks(&mut dir_map, map_w, map_h, INVALID_DIR);

    debug!(
        map_w,
        map_h,
        low_contrast = low_contrast.iter().filter(|&&v| v != 0).count(),
        low_flow = low_flow.iter().filter(|&&v| v != 0).count(),
        smoothed_out = removed,
        high_curve = high_curve.iter().filter(|&&v| v != 0).count(),
        "image maps generated"
    );

    Ok(ImageMaps {
        dir_map,
        low_contrast,
        low_flow,
        high_curve,
        width: map_w,
        height: map_h,
        block_size: cfg.block_size,
    })
}

/// Average of half-circle direction indices via the doubled-angle trig
/// table. `None` when the summed vector cancels out.
pub(crate) fn average_dir(dirs: &[i32], trig: &DirectionTrigTable) -> Option<i32> {
    let mut sum_cos = 0.0;
    let mut sum_sin = 0.0;
    for &d in dirs {
        sum_cos += trig.cos(d as usize);
        sum_sin += trig.sin(d as usize);
    }
    if sum_cos.abs() < 1e-9 && sum_sin.abs() < 1e-9 {
        return None;
    }
    let n = trig.n_dirs() as f64;
    let two_pi = 2.0 * std::f64::consts::PI;
    let theta = float_mod(sum_sin.atan2(sum_cos) + two_pi, two_pi);
    Some(round_nearest(theta / two_pi * n) % trig.n_dirs() as i32)
}

/// Discard directions that disagree with the average of their valid
/// neighbors. Returns the number of cells invalidated.
fn remove_inconsistent_dirs(
    dir_map: &mut [i32],
    map_w: usize,
    map_h: usize,
    trig: &DirectionTrigTable,
    cfg: &MapConfig,
) -> usize {
    let n_dirs = trig.n_dirs() as i32;
    let mut invalidate = Vec::new();

    for by in 0..map_h as i32 {
        for bx in 0..map_w as i32 {
            let cell = by as usize * map_w + bx as usize;
            let dir = dir_map[cell];
            if dir < 0 {
                continue;
            }
            let nbr_dirs: Vec<i32> = NBR_RING
                .iter()
                .filter_map(|&(dx, dy)| {
                    let (nx, ny) = (bx + dx, by + dy);
                    if nx >= 0 && ny >= 0 && (nx as usize) < map_w && (ny as usize) < map_h {
                        let d = dir_map[ny as usize * map_w + nx as usize];
                        (d >= 0).then_some(d)
                    } else {
                        None
                    }
                })
                .collect();
            if nbr_dirs.len() < cfg.min_valid_nbrs {
                continue;
            }
            if let Some(avg) = average_dir(&nbr_dirs, trig) {
                if closest_dir_distance(dir, avg, n_dirs) > cfg.dir_distance_max {
                    invalidate.push(cell);
                }
            }
        }
    }

    for &cell in &invalidate {
        dir_map[cell] = INVALID_DIR;
    }
    invalidate.len()
}

/// Mark blocks whose neighborhood bends sharply.
///
/// A valid-direction block is high-curvature when either the cumulative
/// rotation around its neighbor ring (vorticity) or the worst single
/// neighbor disagreement (curvature) reaches its threshold.
fn gen_high_curve_map(
    dir_map: &[i32],
    map_w: usize,
    map_h: usize,
    n_dirs: usize,
    cfg: &MapConfig,
) -> Vec<u8> {
    let n = n_dirs as i32;
    let mut out = vec![0u8; dir_map.len()];

    for by in 0..map_h as i32 {
        for bx in 0..map_w as i32 {
            let cell = by as usize * map_w + bx as usize;
            let center = dir_map[cell];
            if center < 0 {
                continue;
            }

            // ring directions, substituting the center for missing cells
            let ring: Vec<i32> = NBR_RING
                .iter()
                .map(|&(dx, dy)| {
                    let (nx, ny) = (bx + dx, by + dy);
                    if nx >= 0 && ny >= 0 && (nx as usize) < map_w && (ny as usize) < map_h {
                        let d = dir_map[ny as usize * map_w + nx as usize];
                        if d >= 0 {
                            d
                        } else {
                            center
                        }
                    } else {
                        center
                    }
                })
                .collect();

            let mut vorticity = 0i32;
            for i in 0..ring.len() {
                vorticity += wrapped_dir_delta(ring[i], ring[(i + 1) % ring.len()], n);
            }

            let curvature = ring
                .iter()
                .map(|&d| closest_dir_distance(center, d, n))
                .max()
                .unwrap_or(0);

            if vorticity.abs() >= cfg.vorticity_min || curvature >= cfg.curvature_min {
                out[cell] = 1;
            }
        }
    }
    out
}

/// Signed minimal rotation from `d1` to `d2` on a circle of `n` buckets.
fn wrapped_dir_delta(d1: i32, d2: i32, n: i32) -> i32 {
    let mut delta = d2 - d1;
    if delta > n / 2 {
        delta -= n;
    } else if delta < -(n / 2) {
        delta += n;
    }
    delta
}

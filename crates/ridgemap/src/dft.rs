//! Directional DFT power analysis.
//!
//! For one image window, pixel rows are summed along each rotated
//! orientation and a small bank of wave forms is fitted to the row-sum
//! vector. The orientation where a wave resonates hardest is the dominant
//! ridge-flow direction for that window.

use crate::error::ConfigError;
use crate::tables::{DftWaveTable, RotatedGridTable};
use crate::util::sort::sort_parallel_desc;

/// Per-window DFT powers: `powers[wave][direction]`.
pub type DirPowers = Vec<Vec<f64>>;

/// Compute wave powers for every orientation of one window.
///
/// `window_offset` is the flat index of the window origin in the padded
/// raster; `grids` must be square (row sums feed wave forms of the same
/// length as the grid side).
pub fn dft_dir_powers(
    data: &[u8],
    window_offset: usize,
    grids: &RotatedGridTable,
    waves: &DftWaveTable,
) -> Result<DirPowers, ConfigError> {
    if grids.grid_w != grids.grid_h {
        return Err(ConfigError::NonSquareDftGrid {
            grid_w: grids.grid_w,
            grid_h: grids.grid_h,
        });
    }
    debug_assert_eq!(waves.wave_len(), grids.grid_h);

    let n_dirs = grids.n_dirs();
    let mut powers = vec![vec![0.0; n_dirs]; waves.n_waves()];
    let mut row_sums = vec![0.0f64; grids.grid_h];

    for dir in 0..n_dirs {
        sum_rotated_rows(data, window_offset, grids, dir, &mut row_sums);
        for (w, power_row) in powers.iter_mut().enumerate() {
            let wave = waves.wave(w);
            let mut cospart = 0.0;
            let mut sinpart = 0.0;
            for (i, &rs) in row_sums.iter().enumerate() {
                cospart += rs * wave.cos[i];
                sinpart += rs * wave.sin[i];
            }
            power_row[dir] = cospart * cospart + sinpart * sinpart;
        }
    }

    Ok(powers)
}

/// Sum pixel values along each rotated grid row for one orientation.
fn sum_rotated_rows(
    data: &[u8],
    window_offset: usize,
    grids: &RotatedGridTable,
    dir: usize,
    row_sums: &mut [f64],
) {
    let grid = grids.grid(dir);
    let w = grids.grid_w;
    for (row, sum) in row_sums.iter_mut().enumerate() {
        let mut acc = 0u32;
        for &off in &grid[row * w..(row + 1) * w] {
            acc += u32::from(data[(window_offset as i64 + off as i64) as usize]);
        }
        *sum = f64::from(acc);
    }
}

/// Power statistics over a wave range, used to pick a window's direction.
#[derive(Debug, Clone)]
pub struct DftPowerStats {
    /// Wave indices in `[wave_lo, wave_hi)` ranked descending by
    /// `max_power * norm_power`.
    pub ranked_waves: Vec<usize>,
    /// Peak power over directions, indexed by `wave - wave_lo`.
    pub max_powers: Vec<f64>,
    /// Direction achieving the peak, indexed by `wave - wave_lo`.
    pub max_power_dirs: Vec<usize>,
    /// Peak power normalized by mean power, indexed by `wave - wave_lo`.
    pub norm_powers: Vec<f64>,
}

impl DftPowerStats {
    /// Peak power of an absolute wave index.
    pub fn max_power(&self, wave: usize, wave_lo: usize) -> f64 {
        self.max_powers[wave - wave_lo]
    }

    /// Peak direction of an absolute wave index.
    pub fn max_power_dir(&self, wave: usize, wave_lo: usize) -> usize {
        self.max_power_dirs[wave - wave_lo]
    }

    /// Normalized power of an absolute wave index.
    pub fn norm_power(&self, wave: usize, wave_lo: usize) -> f64 {
        self.norm_powers[wave - wave_lo]
    }
}

/// Summarize `powers` over waves `[wave_lo, wave_hi)`.
///
/// Mean power is floored at `min_power_sum / n_dirs` so silent windows do
/// not produce runaway normalized powers. The ranking sort is stable:
/// equal keys keep ascending wave order.
pub fn dft_power_stats(
    powers: &DirPowers,
    wave_lo: usize,
    wave_hi: usize,
    min_power_sum: f64,
) -> DftPowerStats {
    let n = wave_hi.saturating_sub(wave_lo);
    let mut max_powers = Vec::with_capacity(n);
    let mut max_power_dirs = Vec::with_capacity(n);
    let mut norm_powers = Vec::with_capacity(n);
    let mut ranks = Vec::with_capacity(n);
    let mut ranked_waves = Vec::with_capacity(n);

    for w in wave_lo..wave_hi {
        let dir_powers = &powers[w];
        let n_dirs = dir_powers.len();
        let mut pow_max = dir_powers[0];
        let mut pow_max_dir = 0;
        let mut pow_sum = 0.0;
        for (dir, &p) in dir_powers.iter().enumerate() {
            pow_sum += p;
            if p > pow_max {
                pow_max = p;
                pow_max_dir = dir;
            }
        }
        let pow_mean = pow_sum.max(min_power_sum) / n_dirs as f64;
        let pow_norm = pow_max / pow_mean;

        max_powers.push(pow_max);
        max_power_dirs.push(pow_max_dir);
        norm_powers.push(pow_norm);
        ranks.push(pow_max * pow_norm);
        ranked_waves.push(w);
    }

    sort_parallel_desc(&mut ranks, &mut ranked_waves);

    DftPowerStats {
        ranked_waves,
        max_powers,
        max_power_dirs,
        norm_powers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{max_padding_v2, RelativeTo, RotatedGridTable};

    const WIN: usize = 24;

    fn stripe_buffer(stride: usize, height: usize, period: usize) -> Vec<u8> {
        // vertical stripes: ridge flow is vertical
        let mut data = vec![0u8; stride * height];
        for y in 0..height {
            for x in 0..stride {
                data[y * stride + x] = if (x / period) % 2 == 0 { 10 } else { 50 };
            }
        }
        data
    }

    fn square_grids(image_width: usize, pad: usize) -> RotatedGridTable {
        RotatedGridTable::new(
            std::f64::consts::FRAC_PI_2,
            16,
            WIN,
            WIN,
            RelativeTo::Origin,
            image_width,
            Some(pad),
        )
        .unwrap()
    }

    #[test]
    fn non_square_grids_are_rejected() {
        let grids = RotatedGridTable::new(
            std::f64::consts::FRAC_PI_2,
            16,
            7,
            9,
            RelativeTo::Center,
            64,
            None,
        )
        .unwrap();
        let waves = DftWaveTable::new(&[1.0], 9);
        let err = dft_dir_powers(&[0u8; 100 * 100], 0, &grids, &waves).unwrap_err();
        assert!(matches!(err, ConfigError::NonSquareDftGrid { .. }));
    }

    #[test]
    fn vertical_stripes_peak_at_vertical_direction() {
        let pad = max_padding_v2(WIN, 8, 7, 9);
        let img_w = 48;
        let img_h = 48;
        let stride = img_w + 2 * pad;
        let data = stripe_buffer(stride, img_h + 2 * pad, 6);
        let grids = square_grids(img_w, pad);
        let waves = DftWaveTable::new(&[1.0, 2.0, 3.0, 4.0], WIN);

        let offset = (pad + 8) * stride + pad + 8;
        let powers = dft_dir_powers(&data, offset, &grids, &waves).unwrap();
        let stats = dft_power_stats(&powers, 1, 4, 10.0);

        // stripes of period 12 resonate with the coefficient-2 wave
        // (two periods across the 24px window); flow direction is 0
        let best = stats.ranked_waves[0];
        assert_eq!(stats.max_power_dir(best, 1), 0);
    }

    #[test]
    fn power_stats_rank_descending() {
        let powers = vec![
            vec![1.0, 2.0],
            vec![5.0, 1.0],
            vec![100.0, 3.0],
            vec![7.0, 7.0],
        ];
        let stats = dft_power_stats(&powers, 1, 4, 10.0);
        assert_eq!(stats.ranked_waves[0], 2);
        assert_eq!(stats.max_power(2, 1), 100.0);
        assert_eq!(stats.max_power_dir(2, 1), 0);
        // uniform power across directions normalizes to ~1
        assert!(stats.norm_power(3, 1) <= 1.0 + 1e-9);
        // pow_mean floor keeps silent windows finite
        let quiet = vec![vec![0.0, 0.0]; 2];
        let qs = dft_power_stats(&quiet, 0, 2, 10.0);
        assert_eq!(qs.norm_powers[0], 0.0);
    }
}

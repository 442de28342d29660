//! Block partitioning of the padded raster and block-level tests.
//!
//! The image is tiled into fixed-size blocks from the top-left. When the
//! image size is not a block multiple, the last column/row of blocks is
//! pulled inward flush with the right/bottom image edge (overlapping the
//! penultimate column/row) instead of extending past the image. Downstream
//! maps index blocks by this tiling, so the strategy is load-bearing.

use crate::error::{ConfigError, InternalError};

/// Number of histogram buckets for the 6-bit contrast test.
const CONTRAST_BINS: usize = 64;

/// Block tiling of an image: flat offsets into the padded raster pointing
/// at each block's origin, row-major over the block grid.
#[derive(Debug, Clone)]
pub struct BlockGrid {
    /// Offset of each block origin in the padded raster.
    pub offsets: Vec<usize>,
    /// Blocks per row.
    pub width: usize,
    /// Blocks per column.
    pub height: usize,
}

/// Tile an `img_w x img_h` interior (of a raster padded by `pad`) into
/// `block_size` blocks.
///
/// Fails if the image is smaller than one block in either dimension.
pub fn block_offsets(
    img_w: usize,
    img_h: usize,
    pad: usize,
    block_size: usize,
) -> Result<BlockGrid, ConfigError> {
    if img_w < block_size || img_h < block_size {
        return Err(ConfigError::ImageTooSmall {
            width: img_w,
            height: img_h,
            block_size,
        });
    }

    let blocks_wide = img_w.div_ceil(block_size);
    let blocks_high = img_h.div_ceil(block_size);
    let stride = img_w + 2 * pad;

    let mut offsets = Vec::with_capacity(blocks_wide * blocks_high);
    for by in 0..blocks_high {
        // last row is pulled in flush with the bottom edge
        let oy = (by * block_size).min(img_h - block_size);
        for bx in 0..blocks_wide {
            let ox = (bx * block_size).min(img_w - block_size);
            offsets.push((oy + pad) * stride + ox + pad);
        }
    }

    Ok(BlockGrid {
        offsets,
        width: blocks_wide,
        height: blocks_high,
    })
}

/// Percentile-based contrast test on one block of 6-bit pixels.
///
/// Builds a 64-bucket histogram, locates the `percentile_min_max` percentile
/// from each end, and reports low contrast when the spread falls short of
/// `min_contrast_delta`. The not-found branch is a defensive consistency
/// check: the histogram always sums to the block pixel count.
pub fn low_contrast_block(
    block_offset: usize,
    block_size: usize,
    data: &[u8],
    stride: usize,
    percentile_min_max: f64,
    min_contrast_delta: i32,
) -> Result<bool, InternalError> {
    use crate::util::numeric::{round_nearest, trunc_precision};

    let mut hist = [0u32; CONTRAST_BINS];
    for row in 0..block_size {
        let start = block_offset + row * stride;
        for &p in &data[start..start + block_size] {
            hist[(p as usize).min(CONTRAST_BINS - 1)] += 1;
        }
    }

    let n_pixels = block_size * block_size;
    let threshold =
        round_nearest(trunc_precision(percentile_min_max / 100.0 * (n_pixels - 1) as f64)) as u32;

    let mut acc = 0u32;
    let mut prct_min = None;
    for (i, &h) in hist.iter().enumerate() {
        acc += h;
        if acc >= threshold {
            prct_min = Some(i as i32);
            break;
        }
    }
    let prct_min = prct_min.ok_or(InternalError::PercentileNotFound)?;

    let mut acc = 0u32;
    let mut prct_max = None;
    for (i, &h) in hist.iter().enumerate().rev() {
        acc += h;
        if acc >= threshold {
            prct_max = Some(i as i32);
            break;
        }
    }
    let prct_max = prct_max.ok_or(InternalError::PercentileNotFound)?;

    Ok(prct_max - prct_min < min_contrast_delta)
}

/// Walk the block map from `start` in unit `step`s looking for a block with
/// a valid direction.
///
/// The walk starts one step past `start`. It stops empty at the map edge or
/// at the first low-contrast block; it stops successfully at the first
/// block whose direction-map value is valid, returning the direction and
/// the block coordinates.
pub fn find_valid_block(
    dir_map: &[i32],
    low_contrast_map: &[u8],
    start: (i32, i32),
    step: (i32, i32),
    map_w: usize,
    map_h: usize,
) -> Option<(i32, i32, i32)> {
    let (mut x, mut y) = (start.0 + step.0, start.1 + step.1);
    while x >= 0 && y >= 0 && (x as usize) < map_w && (y as usize) < map_h {
        let cell = y as usize * map_w + x as usize;
        if low_contrast_map[cell] != 0 {
            return None;
        }
        if dir_map[cell] >= 0 {
            return Some((dir_map[cell], x, y));
        }
        x += step.0;
        y += step.1;
    }
    None
}

/// Assign `value` to the full perimeter row/column of a block map.
pub fn set_margin_blocks(map: &mut [i32], map_w: usize, map_h: usize, value: i32) {
    for x in 0..map_w {
        map[x] = value;
        map[(map_h - 1) * map_w + x] = value;
    }
    for y in 0..map_h {
        map[y * map_w] = value;
        map[y * map_w + map_w - 1] = value;
    }
}

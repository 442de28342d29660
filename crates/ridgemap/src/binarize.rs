//! Directional and isotropic binarization.
//!
//! Every output pixel is classified ridge/valley by comparing its local
//! intensity against a neighborhood average. Where the block has a known
//! ridge-flow direction the neighborhood is a rotated grid aligned with the
//! flow; where it does not, either an isotropic square neighborhood is used
//! or the pixel is written as valley, depending on the variant.

use tracing::debug;

use crate::maps::{ImageMaps, NO_VALID_NBRS};
use crate::raster::{BinaryImage, PaddedImage};
use crate::tables::RotatedGridTable;
use crate::util::numeric::{round_nearest, trunc_precision};

/// Direction-map-only binarization: blocks without a valid direction are
/// written as valley.
pub fn binarize_v2(
    padded: &PaddedImage,
    maps: &ImageMaps,
    grids: &RotatedGridTable,
    fill_hole_passes: usize,
) -> BinaryImage {
    let (w, h) = (padded.orig_width(), padded.orig_height());
    let mut out = BinaryImage::new(w, h);

    for y in 0..h {
        for x in 0..w {
            let dir = maps.dir_map[maps.cell_for_pixel(x, y)];
            if dir >= 0 {
                let v = dir_binarize(padded, padded.interior_index(x, y), grids, dir as usize);
                out.data[y * w + x] = v;
            }
        }
    }

    finish(&mut out, fill_hole_passes);
    out
}

/// Combined-map binarization with isotropic fallback.
///
/// Cells holding [`NO_VALID_NBRS`] are written as valley; valid directions
/// binarize directionally; everything else (invalid or high-curvature)
/// falls back to the isotropic method.
pub fn binarize_with_fallback(
    padded: &PaddedImage,
    combined_map: &[i32],
    maps: &ImageMaps,
    grids: &RotatedGridTable,
    iso_grid_dim: usize,
    fill_hole_passes: usize,
) -> BinaryImage {
    let (w, h) = (padded.orig_width(), padded.orig_height());
    let mut out = BinaryImage::new(w, h);

    for y in 0..h {
        for x in 0..w {
            let cell = combined_map[maps.cell_for_pixel(x, y)];
            let idx = padded.interior_index(x, y);
            let v = if cell == NO_VALID_NBRS {
                0
            } else if cell >= 0 {
                dir_binarize(padded, idx, grids, cell as usize)
            } else {
                iso_binarize(padded, idx, iso_grid_dim)
            };
            out.data[y * w + x] = v;
        }
    }

    finish(&mut out, fill_hole_passes);
    out
}

fn finish(out: &mut BinaryImage, fill_hole_passes: usize) {
    for _ in 0..fill_hole_passes {
        fill_holes(out);
    }
    debug!(
        ridge_pixels = out.data.iter().filter(|&&v| v != 0).count(),
        total = out.data.len(),
        "binarization complete"
    );
}

/// Ridge test along the block's flow direction: the pixel is ridge when the
/// grid's center row is darker than the grid average.
#[inline]
fn dir_binarize(padded: &PaddedImage, pixel_idx: usize, grids: &RotatedGridTable, dir: usize) -> u8 {
    let grid = grids.grid(dir);
    let (gw, gh) = (grids.grid_w, grids.grid_h);
    let center_row = round_nearest(trunc_precision((gh as f64 - 1.0) / 2.0)) as usize;

    let mut total = 0i64;
    let mut center_sum = 0i64;
    for row in 0..gh {
        let mut row_sum = 0i64;
        for &off in &grid[row * gw..(row + 1) * gw] {
            row_sum += i64::from(padded.data[(pixel_idx as i64 + i64::from(off)) as usize]);
        }
        total += row_sum;
        if row == center_row {
            center_sum = row_sum;
        }
    }

    u8::from(center_sum * (gh as i64) < total)
}

/// Ridge test without direction: the pixel is ridge when it is darker than
/// its square neighborhood average.
#[inline]
fn iso_binarize(padded: &PaddedImage, pixel_idx: usize, grid_dim: usize) -> u8 {
    let radius = round_nearest(trunc_precision((grid_dim as f64 - 1.0) / 2.0)) as i64;
    let stride = padded.width as i64;
    let center = i64::from(padded.data[pixel_idx]);

    let mut sum = 0i64;
    for dy in -radius..=radius {
        let base = pixel_idx as i64 + dy * stride;
        for dx in -radius..=radius {
            sum += i64::from(padded.data[(base + dx) as usize]);
        }
    }

    u8::from(center * ((grid_dim * grid_dim) as i64) < sum)
}

/// One hole-filling pass: horizontal triples then vertical triples.
///
/// A hole is a single pixel differing from two equal flanking neighbors; it
/// takes the flank value. After filling, the scan skips two positions so
/// the filled pixel is not re-examined as a new triple center.
pub fn fill_holes(bin: &mut BinaryImage) {
    let (w, h) = (bin.width as i32, bin.height as i32);

    for y in 0..h {
        let mut x = 1;
        while x < w - 1 {
            let (a, b, c) = (bin.get(x - 1, y), bin.get(x, y), bin.get(x + 1, y));
            if a == c && a != b {
                bin.set(x, y, a);
                x += 2;
            } else {
                x += 1;
            }
        }
    }

    for x in 0..w {
        let mut y = 1;
        while y < h - 1 {
            let (a, b, c) = (bin.get(x, y - 1), bin.get(x, y), bin.get(x, y + 1));
            if a == c && a != b {
                bin.set(x, y, a);
                y += 2;
            } else {
                y += 1;
            }
        }
    }
}

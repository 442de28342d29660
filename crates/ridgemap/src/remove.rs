//! False minutiae removal.
//!
//! Detection over-reports: speckle, block-map borders, and jagged ridge
//! edges all masquerade as minutiae. Each pass below prunes one artifact
//! family; the pass order is fixed. Passes that repair the binary raster
//! (loop filling) run before passes that re-measure it.

use tracing::debug;

use crate::config::DetectConfig;
use crate::contour::{centered_contour, trace_contour, ScanDir, TraceStatus};
use crate::contour::shape::shape_from_contour;
use crate::maps::ImageMaps;
use crate::minutiae::{MinutiaKind, Minutiae};
use crate::raster::BinaryImage;
use crate::util::geometry::min_max_extrema;
use crate::util::numeric::{round_nearest, trunc_precision};

/// Run all removal passes.
pub fn remove_false_minutiae(
    minutiae: &mut Minutiae,
    bin: &mut BinaryImage,
    maps: &ImageMaps,
    cfg: &DetectConfig,
) {
    remove_in_invalid_blocks(minutiae, maps);
    remove_near_invalid_blocks(minutiae, maps, cfg.minutiae.inv_block_margin);
    remove_small_loops(minutiae, bin, cfg.minutiae.small_loop_len);
    remove_side_minutiae(
        minutiae,
        bin,
        cfg.minutiae.side_half_contour,
        cfg.n_dirs,
    );
    debug!(remaining = minutiae.len(), "false minutiae removal done");
}

/// Drop minutiae sitting in blocks with no direction, unless the block is
/// only directionless because it bends sharply (cores and deltas are real).
fn remove_in_invalid_blocks(minutiae: &mut Minutiae, maps: &ImageMaps) {
    let before = minutiae.len();
    minutiae.retain(|m| {
        let cell = maps.cell_for_pixel(m.x as usize, m.y as usize);
        maps.dir_map[cell] >= 0 || maps.high_curve[cell] != 0
    });
    debug!(removed = before - minutiae.len(), "invalid-block pass");
}

/// Drop minutiae whose block neighborhood (Chebyshev radius `margin`)
/// contains a directionless, non-curving block: features that close to
/// unreadable area are untrustworthy.
fn remove_near_invalid_blocks(minutiae: &mut Minutiae, maps: &ImageMaps, margin: i32) {
    let before = minutiae.len();
    let (map_w, map_h) = (maps.width as i32, maps.height as i32);
    minutiae.retain(|m| {
        let cell = maps.cell_for_pixel(m.x as usize, m.y as usize);
        let bx = (cell % maps.width) as i32;
        let by = (cell / maps.width) as i32;
        for dy in -margin..=margin {
            for dx in -margin..=margin {
                let (nx, ny) = (bx + dx, by + dy);
                if nx < 0 || ny < 0 || nx >= map_w || ny >= map_h {
                    continue;
                }
                let ncell = ny as usize * maps.width + nx as usize;
                if maps.dir_map[ncell] < 0 && maps.high_curve[ncell] == 0 {
                    return false;
                }
            }
        }
        true
    });
    debug!(removed = before - minutiae.len(), "near-invalid-block pass");
}

/// Islands, lakes, and holes: minutiae whose boundary closes into a small
/// loop.
///
/// A ridge ending on a small closed boundary is an ink island; the island
/// is erased. A bifurcation on one is a lake or pore; the hole is filled.
/// Every minutia whose position lands inside a painted span is dropped with
/// the loop.
fn remove_small_loops(minutiae: &mut Minutiae, bin: &mut BinaryImage, small_loop_len: usize) {
    let before = minutiae.len();
    let mut dead = vec![false; minutiae.len()];

    for i in 0..minutiae.len() {
        if dead[i] {
            continue;
        }
        let m = minutiae.get(i);
        let start = (m.x, m.y);
        let trace = trace_contour(
            bin,
            2 * small_loop_len,
            start,
            start,
            (m.ex, m.ey),
            ScanDir::Clockwise,
        );
        if trace.status != TraceStatus::LoopFound {
            continue;
        }

        // close the loop with the start point and paint its spans
        let mut xs = trace.contour.xs.clone();
        let mut ys = trace.contour.ys.clone();
        xs.push(m.x);
        ys.push(m.y);
        let fill = match m.kind {
            MinutiaKind::RidgeEnding => 0,
            MinutiaKind::Bifurcation => 1,
        };
        let shape = shape_from_contour(&xs, &ys);
        for row in &shape.rows {
            for pair in row.xs.chunks_exact(2) {
                for x in pair[0]..=pair[1] {
                    bin.set(x, row.y, fill);
                }
                for (j, other) in minutiae.iter().enumerate() {
                    if !dead[j] && other.y == row.y && other.x >= pair[0] && other.x <= pair[1] {
                        dead[j] = true;
                    }
                }
            }
        }
        dead[i] = true;
    }

    let mut keep = dead.iter().map(|&d| !d);
    minutiae.retain(|_| keep.next().unwrap());
    debug!(removed = before - minutiae.len(), "small-loop pass");
}

/// Side minutiae: features detected on the flank of a ridge rather than at
/// its tip.
///
/// The boundary around a genuine tip, projected onto the minutia direction,
/// rises to a single extremum. A jagged flank oscillates; more than one
/// extremum condemns the minutia.
fn remove_side_minutiae(
    minutiae: &mut Minutiae,
    bin: &BinaryImage,
    half_contour: usize,
    n_dirs: usize,
) {
    let before = minutiae.len();
    minutiae.retain(|m| {
        let Some(contour) = centered_contour(bin, half_contour, (m.x, m.y), (m.ex, m.ey)) else {
            return true;
        };
        if contour.len() < 3 {
            return true;
        }

        let theta = m.direction as f64 * std::f64::consts::PI / n_dirs as f64;
        let (sin_t, cos_t) = theta.sin_cos();
        let projected: Vec<i32> = contour
            .xs
            .iter()
            .zip(contour.ys.iter())
            .map(|(&x, &y)| {
                let dx = (x - m.x) as f64;
                let dy = (y - m.y) as f64;
                round_nearest(trunc_precision(dx * sin_t - dy * cos_t))
            })
            .collect();

        min_max_extrema(&projected).len() <= 1
    });
    debug!(removed = before - minutiae.len(), "side-minutia pass");
}

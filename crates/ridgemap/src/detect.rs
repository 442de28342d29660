//! Initial minutiae detection on the binary raster.
//!
//! Two sweeps run the feature patterns over adjacent scan-line pairs: a
//! horizontal sweep over row pairs and a vertical sweep over column pairs.
//! Candidates in blocks with no usable ridge-flow direction are skipped;
//! duplicates between the sweeps collapse later, when ridge counting sorts
//! and dedupes the collection.

use tracing::{debug, warn};

use crate::block::find_valid_block;
use crate::config::DetectConfig;
use crate::maps::ImageMaps;
use crate::minutiae::{Minutia, Minutiae};
use crate::pattern::{FeaturePattern, FEATURE_PATTERNS};
use crate::raster::BinaryImage;

/// Scan the binary raster for minutiae.
///
/// Scanning stops early (with what was found so far) if the collection
/// reaches its configured capacity.
pub fn detect_minutiae(bin: &BinaryImage, maps: &ImageMaps, cfg: &DetectConfig) -> Minutiae {
    let mut minutiae = Minutiae::with_capacity(cfg.minutiae.max_minutiae);

    let full = scan_rows(bin, maps, cfg, &mut minutiae) && scan_columns(bin, maps, cfg, &mut minutiae);
    if !full {
        warn!(
            cap = cfg.minutiae.max_minutiae,
            "minutiae capacity reached, scan stopped early"
        );
    }
    debug!(count = minutiae.len(), "initial minutiae detected");
    minutiae
}

/// Horizontal sweep: vertical pixel pairs across row pairs `(y, y+1)`.
/// Returns `false` when the collection filled up.
fn scan_rows(
    bin: &BinaryImage,
    maps: &ImageMaps,
    cfg: &DetectConfig,
    minutiae: &mut Minutiae,
) -> bool {
    let (w, h) = (bin.width as i32, bin.height as i32);
    for y in 0..h - 1 {
        let pair = |x: i32| [bin.get(x, y), bin.get(x, y + 1)];
        let mut x = 0;
        while x < w - 2 {
            if let Some((p, k)) = match_at(&pair, x, w) {
                // feature sits on the ink pixel of the middle pair
                let row = if p.second[0] == 1 { y } else { y + 1 };
                let edge_row = if p.second[0] == 1 { y + 1 } else { y };
                if let Some(m) = build_minutia(p, k, row, k, edge_row, false, maps, cfg) {
                    if !minutiae.push(m) {
                        return false;
                    }
                }
            }
            x += 1;
        }
    }
    true
}

/// Vertical sweep: horizontal pixel pairs across column pairs `(x, x+1)`.
fn scan_columns(
    bin: &BinaryImage,
    maps: &ImageMaps,
    cfg: &DetectConfig,
    minutiae: &mut Minutiae,
) -> bool {
    let (w, h) = (bin.width as i32, bin.height as i32);
    for x in 0..w - 1 {
        let pair = |y: i32| [bin.get(x, y), bin.get(x + 1, y)];
        let mut y = 0;
        while y < h - 2 {
            if let Some((p, k)) = match_at(&pair, y, h) {
                let col = if p.second[0] == 1 { x } else { x + 1 };
                let edge_col = if p.second[0] == 1 { x + 1 } else { x };
                if let Some(m) = build_minutia(p, col, k, edge_col, k, true, maps, cfg) {
                    if !minutiae.push(m) {
                        return false;
                    }
                }
            }
            y += 1;
        }
    }
    true
}

/// Try every pattern at scan position `pos`: the first pair must sit at
/// `pos`, the (repeatable) middle pair starts at `pos + 1`, and the third
/// pair closes the plateau. Returns the matched pattern and the plateau's
/// final middle position.
fn match_at(
    pair: &impl Fn(i32) -> [u8; 2],
    pos: i32,
    limit: i32,
) -> Option<(&'static FeaturePattern, i32)> {
    let first = pair(pos);
    let second = pair(pos + 1);
    for p in &FEATURE_PATTERNS {
        if p.first != first || p.second != second {
            continue;
        }
        let mut k = pos + 1;
        while k + 1 < limit && pair(k + 1) == p.second {
            k += 1;
        }
        if k + 1 < limit && pair(k + 1) == p.third {
            return Some((p, k));
        }
    }
    None
}

/// Resolve direction and reliability for a candidate; `None` when no usable
/// ridge-flow direction exists anywhere nearby.
#[allow(clippy::too_many_arguments)]
fn build_minutia(
    p: &FeaturePattern,
    x: i32,
    y: i32,
    ex: i32,
    ey: i32,
    vertical_scan: bool,
    maps: &ImageMaps,
    cfg: &DetectConfig,
) -> Option<Minutia> {
    let cell = maps.cell_for_pixel(x as usize, y as usize);
    let mut dir = maps.dir_map[cell];
    if dir < 0 {
        dir = search_nearby_direction(maps, cell)?;
    }

    // the block direction is a half-circle orientation; the appearing flag
    // picks which of the two opposite minutia directions applies, mirrored
    // between the two scan axes
    let n = cfg.n_dirs as i32;
    let direction = match (vertical_scan, p.appearing) {
        (false, true) | (true, false) => dir + n,
        _ => dir,
    };

    let reliability = if maps.high_curve[cell] != 0 {
        cfg.quality.reliability_medium
    } else if maps.low_flow[cell] != 0 {
        cfg.quality.reliability_low
    } else {
        cfg.quality.reliability_high
    };

    Some(Minutia {
        x,
        y,
        ex,
        ey,
        direction,
        kind: p.kind,
        appearing: p.appearing,
        reliability,
        nbrs: Vec::new(),
        ridge_counts: Vec::new(),
    })
}

/// Walk the four cardinal block directions for the nearest valid ridge-flow
/// direction.
fn search_nearby_direction(maps: &ImageMaps, cell: usize) -> Option<i32> {
    let bx = (cell % maps.width) as i32;
    let by = (cell / maps.width) as i32;
    for step in [(0, -1), (0, 1), (-1, 0), (1, 0)] {
        if let Some((dir, _, _)) = find_valid_block(
            &maps.dir_map,
            &maps.low_contrast,
            (bx, by),
            step,
            maps.width,
            maps.height,
        ) {
            return Some(dir);
        }
    }
    None
}

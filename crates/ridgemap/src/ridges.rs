//! Inter-minutia ridge counting.
//!
//! For each minutia, the closest following minutiae are found and the
//! number of distinct ridges crossed by the straight line to each is
//! counted. Every candidate crossing is validated by tracing the ridge
//! boundary: a transition pair whose boundary walk loops back onto the
//! crossing entry is the line grazing a jagged edge, not a real crossing,
//! and jagged edges double-count without this check.

use tracing::debug;

use crate::config::MinutiaeConfig;
use crate::contour::{trace_contour, ScanDir, TraceStatus};
use crate::error::InternalError;
use crate::line::line_points;
use crate::minutiae::Minutiae;
use crate::raster::BinaryImage;
use crate::util::geometry::{find_insertion_index, squared_distance};
use crate::util::numeric::float_mod;
use crate::util::sort::sort_parallel_asc;

/// Sort, dedupe, and annotate every minutia with its neighbors and ridge
/// counts.
pub fn count_minutiae_ridges(
    minutiae: &mut Minutiae,
    bin: &BinaryImage,
    cfg: &MinutiaeConfig,
) -> Result<(), InternalError> {
    minutiae.sort_by_x_y();
    minutiae.remove_duplicates();

    let n = minutiae.len();
    for i in 0..n.saturating_sub(1) {
        let mut nbrs = find_neighbors(minutiae, i, cfg.max_nbrs)?;
        if nbrs.is_empty() {
            continue;
        }
        sort_neighbors(minutiae, i, &mut nbrs);

        let mut counts = Vec::with_capacity(nbrs.len());
        for &j in &nbrs {
            counts.push(ridge_count(minutiae, i, j, bin, cfg.max_ridge_steps)?);
        }
        let m = minutiae.get_mut(i);
        m.nbrs = nbrs;
        m.ridge_counts = counts;
    }

    debug!(minutiae = n, "ridge counting complete");
    Ok(())
}

/// Find up to `max_nbrs` closest minutiae following `first` in the sorted
/// list.
///
/// Relies on the (x, y) sort: scanning forward, once the x distance alone
/// exceeds the worst kept distance and the list is full, no later candidate
/// can qualify. Each qualifying candidate is inserted in sorted position,
/// evicting the current worst. O(n·k) instead of the exhaustive O(n²).
fn find_neighbors(
    minutiae: &Minutiae,
    first: usize,
    max_nbrs: usize,
) -> Result<Vec<usize>, InternalError> {
    if max_nbrs == 0 {
        return Ok(Vec::new());
    }
    let m1 = minutiae.get(first);
    let mut dists: Vec<f64> = Vec::with_capacity(max_nbrs + 1);
    let mut nbrs: Vec<usize> = Vec::with_capacity(max_nbrs + 1);

    for second in first + 1..minutiae.len() {
        if nbrs.len() > max_nbrs {
            return Err(InternalError::NeighborOverflow { max_nbrs });
        }
        let m2 = minutiae.get(second);
        let xd = (m2.x - m1.x) as f64;
        if nbrs.len() == max_nbrs && xd * xd > dists[max_nbrs - 1] {
            break;
        }

        let d = squared_distance(m1.x, m1.y, m2.x, m2.y);
        if nbrs.len() < max_nbrs || d < dists[max_nbrs - 1] {
            let pos = find_insertion_index(d, &dists);
            if pos > dists.len() {
                return Err(InternalError::InsertionOutOfRange {
                    position: pos,
                    len: dists.len(),
                });
            }
            dists.insert(pos, d);
            nbrs.insert(pos, second);
            if nbrs.len() > max_nbrs {
                dists.pop();
                nbrs.pop();
            }
        }
    }

    Ok(nbrs)
}

/// Order a neighbor list by the angle from each neighbor to the primary
/// minutia: 0 is vertical, increasing clockwise, ascending.
fn sort_neighbors(minutiae: &Minutiae, first: usize, nbrs: &mut Vec<usize>) {
    use crate::util::geometry::angle_to_line;

    let two_pi = 2.0 * std::f64::consts::PI;
    let m1 = minutiae.get(first);
    let mut thetas: Vec<f64> = nbrs
        .iter()
        .map(|&j| {
            let m2 = minutiae.get(j);
            // swapped coordinates: 0 lands on vertical, growing clockwise
            let theta = angle_to_line(m2.y, m2.x, m1.y, m1.x);
            float_mod(theta + two_pi, two_pi)
        })
        .collect();
    sort_parallel_asc(&mut thetas, nbrs);
}

/// Count validated ridge crossings between two minutiae.
fn ridge_count(
    minutiae: &Minutiae,
    first: usize,
    second: usize,
    bin: &BinaryImage,
    max_ridge_steps: usize,
) -> Result<i32, InternalError> {
    let m1 = minutiae.get(first);
    let m2 = minutiae.get(second);
    if m1.x == m2.x && m1.y == m2.y {
        return Ok(0);
    }

    let (xs, ys) = line_points(m1.x, m1.y, m2.x, m2.y)?;
    let pixels: Vec<u8> = xs.iter().zip(ys.iter()).map(|(&x, &y)| bin.get(x, y)).collect();

    Ok(count_crossings(&pixels, |start, end| {
        validate_ridge_crossing(bin, &xs, &ys, start, end, max_ridge_steps)
    }))
}

/// Walk the line's pixel values counting 0→1 / 1→0 transition pairs that
/// `validate` accepts.
///
/// The scan first leaves the starting pixel's run, then alternates: find
/// the next ridge entry, find the matching exit, validate the pair. Running
/// out of transitions is the normal terminal state, not an error.
fn count_crossings(pixels: &[u8], mut validate: impl FnMut(usize, usize) -> bool) -> i32 {
    let n = pixels.len();
    if n == 0 {
        return 0;
    }

    // leave the starting ridge/valley
    let start_pix = pixels[0];
    let mut i = 1;
    while i < n && pixels[i] == start_pix {
        i += 1;
    }
    if i == n {
        return 0;
    }

    let mut count = 0;
    loop {
        // ridge entry: a 0→1 transition
        let mut ridge_start = None;
        while i < n {
            if pixels[i - 1] == 0 && pixels[i] == 1 {
                ridge_start = Some(i);
                break;
            }
            i += 1;
        }
        let Some(start) = ridge_start else { break };
        i += 1;

        // ridge exit: the last ink pixel before the next 1→0 transition
        let mut ridge_end = None;
        while i < n {
            if pixels[i - 1] == 1 && pixels[i] == 0 {
                ridge_end = Some(i - 1);
                break;
            }
            i += 1;
        }
        let Some(end) = ridge_end else { break };

        if validate(start, end) {
            count += 1;
        }
    }
    count
}

/// Check that a transition pair crosses a real ridge.
///
/// The boundary is traced from the ridge-exit pixel (across its trailing
/// valley pixel), clockwise then counter-clockwise, with the ridge-entry
/// pixel as the loop sentinel. If either walk reaches the entry within the
/// step bound, entry and exit sit on the same boundary: the line grazed a
/// jagged edge and the crossing is rejected. An untraceable start pair is
/// rejected conservatively.
fn validate_ridge_crossing(
    bin: &BinaryImage,
    xs: &[i32],
    ys: &[i32],
    ridge_start: usize,
    ridge_end: usize,
    max_ridge_steps: usize,
) -> bool {
    let feat = (xs[ridge_end], ys[ridge_end]);
    let edge = (xs[ridge_end + 1], ys[ridge_end + 1]);
    let loop_point = (xs[ridge_start], ys[ridge_start]);

    for scan in [ScanDir::Clockwise, ScanDir::CounterClockwise] {
        let trace = trace_contour(bin, max_ridge_steps, loop_point, feat, edge, scan);
        if trace.status != TraceStatus::Complete {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minutiae::{Minutia, MinutiaKind};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

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

    fn collect(points: &[(i32, i32)]) -> Minutiae {
        let mut m = Minutiae::with_capacity(points.len());
        for &(x, y) in points {
            assert!(m.push(minutia_at(x, y)));
        }
        m
    }

    #[test]
    fn stripe_line_counts_two_validated_crossings() {
        // 0,1,2 valley; 3-5 ridge; 6-8 valley; 9-11 ridge; 12-14 valley;
        // 15-17 ridge. A stubbed validator isolates the transition logic.
        let pixels: Vec<u8> = (0..18).map(|x| u8::from((x / 3) % 2 == 1)).collect();
        let count = count_crossings(&pixels, |_, _| true);
        assert_eq!(count, 2);
    }

    #[test]
    fn crossings_report_entry_and_exit_indices() {
        let pixels: Vec<u8> = (0..18).map(|x| u8::from((x / 3) % 2 == 1)).collect();
        let mut pairs = Vec::new();
        count_crossings(&pixels, |s, e| {
            pairs.push((s, e));
            true
        });
        assert_eq!(pairs, vec![(3, 5), (9, 11)]);
    }

    #[test]
    fn rejected_crossings_do_not_count() {
        let pixels: Vec<u8> = (0..18).map(|x| u8::from((x / 3) % 2 == 1)).collect();
        let count = count_crossings(&pixels, |s, _| s != 3);
        assert_eq!(count, 1);
    }

    #[test]
    fn uniform_line_counts_zero() {
        assert_eq!(count_crossings(&[1; 10], |_, _| true), 0);
        assert_eq!(count_crossings(&[0; 10], |_, _| true), 0);
        assert_eq!(count_crossings(&[], |_, _| true), 0);
    }

    #[test]
    fn neighbor_search_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        for trial in 0..20 {
            let n = rng.random_range(3..=50);
            let mut pts: Vec<(i32, i32)> = (0..n)
                .map(|_| (rng.random_range(0..80), rng.random_range(0..80)))
                .collect();
            pts.sort();
            pts.dedup();
            let minutiae = collect(&pts);

            for i in 0..minutiae.len() - 1 {
                let k = 5;
                let fast = find_neighbors(&minutiae, i, k).unwrap();

                let mut brute: Vec<(f64, usize)> = (i + 1..minutiae.len())
                    .map(|j| {
                        let a = minutiae.get(i);
                        let b = minutiae.get(j);
                        (squared_distance(a.x, a.y, b.x, b.y), j)
                    })
                    .collect();
                brute.sort_by(|a, b| a.partial_cmp(b).unwrap());
                brute.truncate(k);

                let brute_dists: Vec<f64> = brute.iter().map(|&(d, _)| d).collect();
                let fast_dists: Vec<f64> = fast
                    .iter()
                    .map(|&j| {
                        let a = minutiae.get(i);
                        let b = minutiae.get(j);
                        squared_distance(a.x, a.y, b.x, b.y)
                    })
                    .collect();
                assert_eq!(fast_dists, brute_dists, "trial {} minutia {}", trial, i);
            }
        }
    }

    #[test]
    fn neighbors_sort_clockwise_from_vertical() {
        // neighbors straight up, right, down, left of the primary —
        // keyed by the angle from the neighbor back to the primary
        let minutiae = collect(&[(10, 10), (10, 2), (18, 10), (10, 18), (2, 10)]);
        let prim = minutiae
            .iter()
            .position(|m| (m.x, m.y) == (10, 10))
            .unwrap();
        let mut nbrs: Vec<usize> = (0..minutiae.len()).filter(|&j| j != prim).collect();
        sort_neighbors(&minutiae, prim, &mut nbrs);
        let order: Vec<(i32, i32)> = nbrs
            .iter()
            .map(|&j| (minutiae.get(j).x, minutiae.get(j).y))
            .collect();
        // visiting order is clockwise starting from straight up
        assert_eq!(order, vec![(10, 2), (18, 10), (10, 18), (2, 10)]);
    }

    #[test]
    fn end_to_end_stripes_count_full_ridges() {
        // vertical ridge stripes of width 3, full image height
        let mut bin = BinaryImage::new(20, 20);
        for y in 0..20 {
            for x in 0..20 {
                if (x / 3) % 2 == 1 {
                    bin.set(x, y, 1);
                }
            }
        }
        let mut minutiae = collect(&[(0, 10), (17, 10)]);
        let cfg = MinutiaeConfig::default();
        count_minutiae_ridges(&mut minutiae, &bin, &cfg).unwrap();

        let m = minutiae.get(0);
        assert_eq!(m.nbrs, vec![1]);
        // crossings at stripes x=3..5 and x=9..11; the stripe at 15..17
        // never produces an exit transition before the line ends
        assert_eq!(m.ridge_counts, vec![2]);
        // the last minutia carries no forward neighbors
        assert!(minutiae.get(1).nbrs.is_empty());
    }

    #[test]
    fn duplicate_positions_collapse_before_counting() {
        let mut bin = BinaryImage::new(8, 8);
        bin.set(3, 3, 1);
        let mut minutiae = collect(&[(2, 2), (5, 5)]);
        assert!(minutiae.push(minutia_at(2, 2)));
        let cfg = MinutiaeConfig::default();
        count_minutiae_ridges(&mut minutiae, &bin, &cfg).unwrap();
        assert_eq!(minutiae.len(), 2);
    }

    #[test]
    fn grazing_transition_is_rejected_by_validation() {
        // a single bump on an otherwise straight ridge edge: the line
        // enters and leaves the same boundary, so the trace loops back
        let mut bin = BinaryImage::new(20, 12);
        for y in 6..9 {
            for x in 0..20 {
                bin.set(x, y, 1);
            }
        }
        bin.set(9, 5, 1); // two-pixel bump just above the ridge top edge
        bin.set(10, 5, 1);

        // line runs along y = 5, grazing the bump
        let mut minutiae = collect(&[(4, 5), (15, 5)]);
        let cfg = MinutiaeConfig::default();
        count_minutiae_ridges(&mut minutiae, &bin, &cfg).unwrap();
        assert_eq!(minutiae.get(0).ridge_counts, vec![0]);
    }
}

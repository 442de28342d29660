//! Minutia records and the capacity-bounded collection that owns them.

use serde::{Deserialize, Serialize};

/// Minutia type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinutiaKind {
    /// A ridge line terminates.
    RidgeEnding,
    /// A ridge line splits in two.
    Bifurcation,
}

/// One detected minutia.
///
/// `direction` is a full-circle index in `[0, 2 * n_dirs)` with 0 pointing
/// up and indices increasing clockwise. `(ex, ey)` is the valley pixel the
/// feature was detected across; contour-based analysis starts boundary
/// walks from that pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Minutia {
    /// Pixel x coordinate.
    pub x: i32,
    /// Pixel y coordinate.
    pub y: i32,
    /// Adjacent valley pixel x.
    pub ex: i32,
    /// Adjacent valley pixel y.
    pub ey: i32,
    /// Full-circle direction index.
    pub direction: i32,
    /// Ridge ending or bifurcation.
    pub kind: MinutiaKind,
    /// Whether the feature emerged in the second scan line of its pattern.
    pub appearing: bool,
    /// Confidence in `[0, 1]`.
    pub reliability: f64,
    /// Indices of the closest following minutiae, in clockwise angular
    /// order from vertical.
    pub nbrs: Vec<usize>,
    /// Ridge counts to each neighbor, parallel to `nbrs`.
    pub ridge_counts: Vec<i32>,
}

/// Detected minutiae for one run, capped at a configured maximum.
///
/// The cap bounds memory for the whole run and is a real contract, not a
/// tuning knob: a push against a full collection is refused and the caller
/// decides whether to stop scanning.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Minutiae {
    list: Vec<Minutia>,
    #[serde(skip)]
    capacity: usize,
}

impl Minutiae {
    /// Empty collection accepting at most `capacity` minutiae.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            list: Vec::new(),
            capacity,
        }
    }

    /// Append a minutia. Returns `false` (and drops the minutia) when the
    /// collection is full.
    #[must_use]
    pub fn push(&mut self, m: Minutia) -> bool {
        if self.list.len() >= self.capacity {
            return false;
        }
        self.list.push(m);
        true
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn get(&self, i: usize) -> &Minutia {
        &self.list[i]
    }

    pub fn get_mut(&mut self, i: usize) -> &mut Minutia {
        &mut self.list[i]
    }

    pub fn as_slice(&self) -> &[Minutia] {
        &self.list
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Minutia> {
        self.list.iter()
    }

    /// Remove minutiae rejected by `keep`, compacting in place.
    pub fn retain(&mut self, keep: impl FnMut(&Minutia) -> bool) {
        self.list.retain(keep);
    }

    /// Sort by x, then y, ascending. The forward neighbor search relies on
    /// this order.
    pub fn sort_by_x_y(&mut self) {
        self.list.sort_by(|a, b| (a.x, a.y).cmp(&(b.x, b.y)));
    }

    /// Drop all but the first of minutiae sharing a pixel position.
    /// Assumes the list is already sorted by (x, y).
    pub fn remove_duplicates(&mut self) {
        self.list.dedup_by(|b, a| a.x == b.x && a.y == b.y);
    }

    /// Consume the collection, yielding the minutiae.
    pub fn into_vec(self) -> Vec<Minutia> {
        self.list
    }
}

//! Pixel-pair feature patterns.
//!
//! Minutiae appear in the binary raster as characteristic transitions
//! between adjacent scan lines. Each pattern is three consecutive pixel
//! pairs read across a line pair: a ridge line that stops produces a ridge
//! ending, a valley that stops inside ink produces a bifurcation. The
//! middle pair may repeat along a plateau before the closing pair.

use crate::minutiae::MinutiaKind;

/// One 3-pair feature template.
#[derive(Debug, Clone, Copy)]
pub struct FeaturePattern {
    /// Minutia type this pattern detects.
    pub kind: MinutiaKind,
    /// Whether the distinguishing pixel appears in the second element of
    /// the middle pair (the feature emerges in the second scan line).
    pub appearing: bool,
    /// Pair preceding the feature.
    pub first: [u8; 2],
    /// The feature pair (repeatable).
    pub second: [u8; 2],
    /// Pair following the feature.
    pub third: [u8; 2],
}

/// The ten feature templates, read-only and process-wide.
///
/// Two ridge-ending forms, then the bifurcation family: the two core forms
/// followed by the variants with one degraded flanking pair.
pub static FEATURE_PATTERNS: [FeaturePattern; 10] = [
    // ridge endings: an isolated ink pixel between empty pairs
    FeaturePattern {
        kind: MinutiaKind::RidgeEnding,
        appearing: true,
        first: [0, 0],
        second: [0, 1],
        third: [0, 0],
    },
    FeaturePattern {
        kind: MinutiaKind::RidgeEnding,
        appearing: false,
        first: [0, 0],
        second: [1, 0],
        third: [0, 0],
    },
    // bifurcations: an isolated valley pixel between full pairs
    FeaturePattern {
        kind: MinutiaKind::Bifurcation,
        appearing: false,
        first: [1, 1],
        second: [0, 1],
        third: [1, 1],
    },
    FeaturePattern {
        kind: MinutiaKind::Bifurcation,
        appearing: true,
        first: [1, 1],
        second: [1, 0],
        third: [1, 1],
    },
    // one flanking pair degraded on the leading side
    FeaturePattern {
        kind: MinutiaKind::Bifurcation,
        appearing: false,
        first: [1, 0],
        second: [0, 1],
        third: [1, 1],
    },
    FeaturePattern {
        kind: MinutiaKind::Bifurcation,
        appearing: true,
        first: [0, 1],
        second: [1, 0],
        third: [1, 1],
    },
    // one flanking pair degraded on the trailing side
    FeaturePattern {
        kind: MinutiaKind::Bifurcation,
        appearing: false,
        first: [1, 1],
        second: [0, 1],
        third: [1, 0],
    },
    FeaturePattern {
        kind: MinutiaKind::Bifurcation,
        appearing: true,
        first: [1, 1],
        second: [1, 0],
        third: [0, 1],
    },
    // diagonal forms with both flanks degraded on opposite sides
    FeaturePattern {
        kind: MinutiaKind::Bifurcation,
        appearing: false,
        first: [1, 0],
        second: [0, 1],
        third: [1, 0],
    },
    FeaturePattern {
        kind: MinutiaKind::Bifurcation,
        appearing: true,
        first: [0, 1],
        second: [1, 0],
        third: [0, 1],
    },
];

impl FeaturePattern {
    /// Test three consecutive pixel pairs against this template.
    #[inline]
    pub fn matches(&self, first: [u8; 2], second: [u8; 2], third: [u8; 2]) -> bool {
        self.first == first && self.second == second && self.third == third
    }
}

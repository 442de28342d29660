//! ridgemap — fingerprint minutiae extraction from grayscale imagery.
//!
//! The pipeline turns a raw fingerprint scan into a feature template of
//! minutiae (ridge endings and bifurcations) with positions, directions,
//! quality scores, and inter-minutia ridge counts. The stages are:
//!
//! 1. **Tables** – rotated sampling grids, DFT wave forms, direction trig,
//!    precomputed once so scan time is pure offset arithmetic.
//! 2. **Maps** – per-block DFT orientation analysis: direction, low
//!    contrast, low flow, and high curvature maps.
//! 3. **Binarize** – directional binarization along the block's ridge flow,
//!    with optional isotropic fallback, plus hole filling.
//! 4. **Detect** – pixel-pair feature patterns swept across scan-line
//!    pairs.
//! 5. **Remove** – false minutiae pruning: invalid blocks, small loops
//!    (islands, lakes, pores), jagged-edge side minutiae.
//! 6. **Quality** – reliability refinement from grayscale neighborhood
//!    statistics.
//! 7. **Ridges** – nearest-neighbor search and contour-validated ridge
//!    counting between minutiae.
//!
//! # Public API
//! [`Detector`] and [`DetectConfig`] are the primary entry points;
//! [`DetectionOutput`] carries the minutiae and the binarized image. The
//! stage modules are public for callers composing custom pipelines.
//!
//! Detection is single-threaded and synchronous: one run owns its buffers
//! exclusively and either completes or fails, no retries. Independent runs
//! may execute in parallel threads, each with its own detector.

pub mod binarize;
pub mod block;
pub mod config;
pub mod contour;
pub mod detect;
pub mod detector;
pub mod dft;
pub mod error;
pub mod line;
pub mod maps;
pub mod minutiae;
pub mod morph;
pub mod pattern;
pub mod quality;
pub mod raster;
pub mod remove;
pub mod ridges;
pub mod tables;
pub mod util;

#[cfg(test)]
mod test_utils;

pub use config::{BinarizeConfig, DetectConfig, MapConfig, MinutiaeConfig, QualityConfig};
pub use detector::{DetectionOutput, Detector, MinutiaeTemplate};
pub use error::{ConfigError, DetectError, InternalError};
pub use minutiae::{Minutia, MinutiaKind, Minutiae};

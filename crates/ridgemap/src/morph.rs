//! 4-connected erosion and dilation on binary rasters.

use crate::raster::BinaryImage;

/// Erode: a ridge pixel survives only when all four 4-connected neighbors
/// are ridge. Out-of-bounds neighbors count as valley.
pub fn erode(input: &BinaryImage) -> BinaryImage {
    let mut out = input.clone();
    for y in 0..input.height as i32 {
        for x in 0..input.width as i32 {
            if input.get(x, y) != 0
                && (input.get(x - 1, y) == 0
                    || input.get(x + 1, y) == 0
                    || input.get(x, y - 1) == 0
                    || input.get(x, y + 1) == 0)
            {
                out.set(x, y, 0);
            }
        }
    }
    out
}

/// Dilate: a valley pixel becomes ridge when any 4-connected neighbor is
/// ridge. Out-of-bounds neighbors count as valley.
pub fn dilate(input: &BinaryImage) -> BinaryImage {
    let mut out = input.clone();
    for y in 0..input.height as i32 {
        for x in 0..input.width as i32 {
            if input.get(x, y) == 0
                && (input.get(x - 1, y) != 0
                    || input.get(x + 1, y) != 0
                    || input.get(x, y - 1) != 0
                    || input.get(x, y + 1) != 0)
            {
                out.set(x, y, 1);
            }
        }
    }
    out
}

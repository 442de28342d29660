//! Minimal detection example: load a grayscale fingerprint image and print
//! its minutiae.
//!
//! Usage: cargo run --example basic_detect -- <image>

use ridgemap::Detector;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: basic_detect <image>")?;
    let image = image::ImageReader::open(&path)?.decode()?.into_luma8();

    let detector = Detector::new();
    let output = detector.detect(&image)?;

    println!("{} minutiae", output.minutiae.len());
    for m in &output.minutiae {
        println!(
            "  ({:4}, {:4}) {:?} dir={:2} rel={:.2} ridge_counts={:?}",
            m.x, m.y, m.kind, m.direction, m.reliability, m.ridge_counts
        );
    }
    Ok(())
}

//! Pixel buffer generation for tests and benchmarks.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Deterministic random packed RGB 8 pixels.
pub fn random_rgb8(seed: u64, pixels: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = vec![0u8; pixels * 3];
    rng.fill(&mut data[..]);
    data
}

/// Neutral ramp across the full 8-bit range, as packed RGB.
pub fn ramp_rgb8(pixels: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(pixels * 3);
    for i in 0..pixels {
        let v = if pixels > 1 {
            (i * 255 / (pixels - 1)) as u8
        } else {
            0
        };
        data.extend_from_slice(&[v, v, v]);
    }
    data
}

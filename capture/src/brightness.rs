use crate::device::Frame;

/// Average luma below which the scene is considered too dark.
pub const LOW_LIGHT_THRESHOLD: f64 = 70.0;

/// Mean of `(r + g + b) / 3` over every pixel. Alpha is ignored.
///
/// Returns `None` for an empty frame.
pub fn average_luma(frame: &Frame) -> Option<f64> {
    let pixels = frame.rgba.chunks_exact(4);
    let count = pixels.len();
    if count == 0 {
        return None;
    }

    let sum: f64 = pixels
        .map(|px| (px[0] as f64 + px[1] as f64 + px[2] as f64) / 3.0)
        .sum();
    Some(sum / count as f64)
}

pub fn is_low_light(luma: f64, threshold: f64) -> bool {
    luma < threshold
}

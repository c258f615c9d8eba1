//! 灰度均值 -> 感知亮度

use crate::core::video::Frame;

/// Perceptual brightness of a mean 8-bit luma value in `[0, 255]`.
pub fn luminance_to_brightness(luma: f64) -> f64 {
    413.435 * (0.002745 * luma + 0.0189623).powf(2.22)
}

pub fn frame_brightness(frame: &Frame) -> f64 {
    luminance_to_brightness(frame.mean_luma())
}

/// 采样点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub frame_index: u64,
    pub brightness: f64,
}

impl Sample {
    pub fn from_frame(frame_index: u64, frame: &Frame) -> Self {
        Self {
            frame_index,
            brightness: frame_brightness(frame),
        }
    }
}

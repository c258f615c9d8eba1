//! 饱和红色检测 - 逐帧统计饱和红像素占比

use super::config::RedConfig;
use super::error::ScreeningError;
use super::finding::Finding;
use crate::core::video::color::rgb_to_ycrcb;
use crate::core::video::source::{checked_frame_rate, read_checked, FrameSource};
use crate::core::video::Frame;
use log::{debug, error, info};
use rayon::prelude::*;

/// Fixed default predicate over one YCrCb pixel. `RedConfig::matches` is the
/// configurable form the pass uses.
#[inline]
pub fn is_saturated_red(luma: u8, chroma_red: u8, chroma_blue: u8) -> bool {
    RedConfig::DEFAULT.matches(luma, chroma_red, chroma_blue)
}

/// 按行并行统计命中像素
pub fn count_saturated_red(frame: &Frame, config: &RedConfig) -> usize {
    let row_bytes = (frame.width as usize * 4).max(4);
    frame
        .data
        .par_chunks(row_bytes)
        .map(|row| {
            row.chunks_exact(4)
                .filter(|px| {
                    let (y, cr, cb) = rgb_to_ycrcb(px[0], px[1], px[2]);
                    config.matches(y, cr, cb)
                })
                .count()
        })
        .sum()
}

pub fn red_area_fraction(frame: &Frame, config: &RedConfig) -> f64 {
    let total = frame.pixel_count();
    if total == 0 {
        return 0.0;
    }
    count_saturated_red(frame, config) as f64 / total as f64
}

/// 饱和红检测（每一帧）
pub fn detect_red(
    source: &mut dyn FrameSource,
    config: &RedConfig,
) -> Result<Vec<Finding>, ScreeningError> {
    config.validate()?;
    let fps = checked_frame_rate(source)?;
    let frame_count = source.frame_count();

    info!(
        "🟥 Red pass: {} frames at {:.2} fps, area threshold {:.2}",
        frame_count, fps, config.area_threshold
    );

    let mut findings = Vec::new();
    let mut last_processed = None;

    for frame_index in 0..frame_count {
        let frame = read_checked(source, frame_index).map_err(|e| {
            let e = e.at_frame(frame_index, last_processed);
            error!("❌ Red pass aborted: {}", e);
            e
        })?;

        let fraction = red_area_fraction(&frame, config);
        if fraction >= config.area_threshold {
            let timestamp = frame_index as f64 / fps;
            debug!(
                "red area {:.1}% at frame {} ({:.3}s)",
                fraction * 100.0,
                frame_index,
                timestamp
            );
            findings.push(Finding::saturated_red(timestamp));
        }
        last_processed = Some(frame_index);
    }

    info!("✅ Red pass complete: {} findings", findings.len());
    Ok(findings)
}

//! 有害闪烁检测
//!
//! 采样帧 -> 感知亮度 -> 反转事件 -> 两事件滑窗判定

use super::brightness::Sample;
use super::config::FlashConfig;
use super::error::ScreeningError;
use super::finding::Finding;
use super::state_machine::{BrightnessEvent, ExtremaTracker};
use crate::core::video::source::{checked_frame_rate, read_checked, FrameSource};
use log::{debug, error, info};

/// At least one event of a flashing pair must dip below this brightness.
pub const DARK_EXTREMUM_CEILING: f64 = 160.0;

pub fn detect_harmful_flashes(
    events: &[BrightnessEvent],
    frame_rate: f64,
    config: &FlashConfig,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    for window in events.windows(2) {
        let window_frames: u64 = window.iter().map(|e| e.frame_gap).sum();
        let window_time = window_frames as f64 / frame_rate;
        if window_time >= 1.0 {
            continue;
        }

        if !window
            .iter()
            .all(|e| e.amplitude >= config.flash_intensity_threshold)
        {
            continue;
        }

        let flash_frequency = 1.0 / window_time;
        if flash_frequency <= config.flash_frequency_threshold {
            continue;
        }

        if !window
            .iter()
            .any(|e| e.extremum_brightness < DARK_EXTREMUM_CEILING)
        {
            continue;
        }

        let timestamp = window[0].frame_gap as f64 / frame_rate;
        debug!(
            "⚡ flash window at {:.3}s: {:.2} Hz over {} frames",
            timestamp, flash_frequency, window_frames
        );
        findings.push(Finding::flash(timestamp, flash_frequency));
    }

    findings
}

/// 亮度闪烁分析（采样帧）
pub fn analyze(
    source: &mut dyn FrameSource,
    config: &FlashConfig,
) -> Result<Vec<Finding>, ScreeningError> {
    config.validate()?;
    let fps = checked_frame_rate(source)?;
    let frame_count = source.frame_count();
    let stride = config.sampling_stride(fps);

    info!(
        "🎬 Flash pass: {} frames at {:.2} fps, stride {} (area_threshold {:.2} carried)",
        frame_count, fps, stride, config.area_threshold
    );

    let events = extract_events(source, frame_count, stride).map_err(|e| {
        error!("❌ Flash pass aborted: {}", e);
        e
    })?;

    let findings = detect_harmful_flashes(&events, fps, config);
    info!(
        "✅ Flash pass complete: {} reversals, {} findings",
        events.len(),
        findings.len()
    );
    Ok(findings)
}

fn extract_events(
    source: &mut dyn FrameSource,
    frame_count: u64,
    stride: u64,
) -> Result<Vec<BrightnessEvent>, ScreeningError> {
    let mut tracker = ExtremaTracker::new(stride);
    let mut events = Vec::new();
    let mut last_processed = None;

    for frame_index in (0..frame_count).step_by(stride as usize) {
        let frame = read_checked(source, frame_index)
            .map_err(|e| e.at_frame(frame_index, last_processed))?;
        let sample = Sample::from_frame(frame_index, &frame);

        if let Some(event) = tracker.push(sample.brightness) {
            events.push(event);
        }
        last_processed = Some(sample.frame_index);
    }

    Ok(events)
}

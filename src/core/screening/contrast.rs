//! 文字对比度检查 - 文字区域与周围背景的亮度差过小视为可读性问题
//!
//! 文字定位由外部 OCR 提供（`TextLocator`），这里只做取色与判定。

use super::config::ContrastConfig;
use super::error::ScreeningError;
use crate::core::video::color::relative_luminance;
use crate::core::video::source::{checked_frame_rate, read_checked, FrameSource};
use crate::core::video::Frame;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// OCR 返回的文字框（像素坐标，基于传入的帧）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub text: String,
    pub confidence: f32,
}

impl TextRegion {
    fn bounds(&self) -> (u32, u32, u32, u32) {
        (self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContrastIssue {
    pub frame_number: u64,
    pub text: String,
    pub region: TextRegion,
    pub contrast: f64,
}

pub trait TextLocator: Send + Sync {
    fn locate(&self, frame: &Frame) -> Vec<TextRegion>;
}

pub struct MockTextLocator {
    // 按帧号返回预设的文字框
    regions_for: Option<Box<dyn Fn(u64) -> Vec<TextRegion> + Send + Sync>>,
}

impl MockTextLocator {
    pub fn new() -> Self {
        Self { regions_for: None }
    }

    pub fn with_pattern<F>(pattern: F) -> Self
    where
        F: Fn(u64) -> Vec<TextRegion> + Send + Sync + 'static,
    {
        Self {
            regions_for: Some(Box::new(pattern)),
        }
    }

    pub fn with_fixed_regions(regions: Vec<TextRegion>) -> Self {
        Self::with_pattern(move |_| regions.clone())
    }
}

impl Default for MockTextLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLocator for MockTextLocator {
    fn locate(&self, frame: &Frame) -> Vec<TextRegion> {
        self.regions_for
            .as_ref()
            .map(|f| f(frame.frame_number))
            .unwrap_or_default()
    }
}

/// 跨帧去重：同一段文字或同一个框只检查一次
#[derive(Default)]
struct SeenRegions {
    texts: HashSet<String>,
    boxes: HashSet<(u32, u32, u32, u32)>,
}

impl SeenRegions {
    fn first_sighting(&mut self, region: &TextRegion) -> bool {
        if !self.texts.insert(region.text.clone()) {
            return false;
        }
        self.boxes.insert(region.bounds())
    }
}

fn region_luminance(frame: &Frame, x0: u32, y0: u32, x1: u32, y1: u32) -> f64 {
    let [r, g, b] = frame.mean_rgb(x0, y0, x1, y1);
    relative_luminance(r, g, b)
}

/// Luminance difference between a text box and the box grown by `margin`.
pub fn region_contrast(frame: &Frame, region: &TextRegion, margin: u32) -> f64 {
    let x1 = region.x.saturating_add(region.width);
    let y1 = region.y.saturating_add(region.height);
    let text = region_luminance(frame, region.x, region.y, x1, y1);
    let background = region_luminance(
        frame,
        region.x.saturating_sub(margin),
        region.y.saturating_sub(margin),
        x1.saturating_add(margin),
        y1.saturating_add(margin),
    );
    (text - background).abs()
}

fn check_regions(
    frame: &Frame,
    locator: &dyn TextLocator,
    config: &ContrastConfig,
    seen: &mut SeenRegions,
) -> Vec<ContrastIssue> {
    let mut issues = Vec::new();

    for region in locator.locate(frame) {
        if region.confidence < config.min_confidence || region.width == 0 || region.height == 0 {
            continue;
        }
        if !seen.first_sighting(&region) {
            continue;
        }

        let contrast = region_contrast(frame, &region, config.background_margin);
        if contrast < config.contrast_threshold {
            debug!(
                "low contrast {:.1} for '{}' at frame {}",
                contrast, region.text, frame.frame_number
            );
            issues.push(ContrastIssue {
                frame_number: frame.frame_number,
                text: region.text.clone(),
                region,
                contrast,
            });
        }
    }

    issues
}

fn prepare(frame: &Frame, config: &ContrastConfig) -> Result<Frame, ScreeningError> {
    match config.resize_width {
        Some(width) => frame.resize_to_width(width),
        None => Ok(frame.clone()),
    }
}

/// 单张图片
pub fn check_frame_contrast(
    frame: &Frame,
    locator: &dyn TextLocator,
    config: &ContrastConfig,
) -> Result<Vec<ContrastIssue>, ScreeningError> {
    config.validate()?;
    frame.validate()?;
    let prepared = prepare(frame, config)?;
    Ok(check_regions(
        &prepared,
        locator,
        config,
        &mut SeenRegions::default(),
    ))
}

/// 视频：按 `target_sample_rate` 抽帧检查
pub fn check_contrast(
    source: &mut dyn FrameSource,
    locator: &dyn TextLocator,
    config: &ContrastConfig,
) -> Result<Vec<ContrastIssue>, ScreeningError> {
    config.validate()?;
    let fps = checked_frame_rate(source)?;
    let frame_count = source.frame_count();
    let skip = config.frame_skip(fps);

    info!(
        "🔤 Contrast pass: {} frames at {:.2} fps, every {} frames",
        frame_count, fps, skip
    );

    let mut seen = SeenRegions::default();
    let mut issues = Vec::new();
    let mut last_processed = None;

    for frame_index in 0..frame_count {
        // 帧号从 1 开始计
        if (frame_index + 1) % skip != 0 {
            continue;
        }

        let frame = read_checked(source, frame_index)
            .map_err(|e| e.at_frame(frame_index, last_processed))?;
        let prepared = prepare(&frame, config)?;
        issues.extend(check_regions(&prepared, locator, config, &mut seen));
        last_processed = Some(frame_index);
    }

    info!("✅ Contrast pass complete: {} issues", issues.len());
    Ok(issues)
}

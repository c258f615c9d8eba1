//! 视频光敏风险筛查

use crate::core::screening::{
    check_frame_contrast, ContrastIssue, ScreeningConfig, ScreeningError, ScreeningManager,
    ScreeningReport, ScreeningStats, TextLocator,
};
use crate::core::video::{Frame, FrameSequence, FrameSource, ImageSequenceSource};
use log::info;
use std::path::{Path, PathBuf};

/// 视频筛查器 - 闪烁 + 饱和红 + 风险分级
///
/// ```no_run
/// use photosafe_lib::api::video::VideoScreener;
///
/// let screener = VideoScreener::create();
/// let report = screener.screen_image_sequence("frames/", 30.0)?;
/// println!("{} violations, risk {}", report.violation_count, report.risk_level);
/// # Ok::<(), photosafe_lib::core::screening::ScreeningError>(())
/// ```
pub struct VideoScreener {
    manager: ScreeningManager,
}

impl VideoScreener {
    pub fn create() -> Self {
        info!("🎬 VideoScreener: created");
        Self {
            manager: ScreeningManager::new(),
        }
    }

    pub fn with_config(config: ScreeningConfig) -> Result<Self, ScreeningError> {
        info!("🎬 VideoScreener: created with custom thresholds");
        Ok(Self {
            manager: ScreeningManager::with_config(config)?,
        })
    }

    /// 从 JSON 阈值配置创建
    pub fn from_config_json(json: &str) -> Result<Self, ScreeningError> {
        Self::with_config(ScreeningConfig::from_json(json)?)
    }

    /// 任意帧源（顺序执行两条检测）
    pub fn screen_source(
        &self,
        source: &mut dyn FrameSource,
    ) -> Result<ScreeningReport, ScreeningError> {
        self.manager.screen(source)
    }

    /// 内存中的帧
    pub fn screen_frames(
        &self,
        frames: Vec<Frame>,
        frame_rate: f64,
    ) -> Result<ScreeningReport, ScreeningError> {
        let sequence = FrameSequence::new(frames, frame_rate);
        self.manager.screen_concurrent(|| Ok(sequence.clone()))
    }

    /// 帧目录，两条检测各自打开一个解码会话并发执行
    pub fn screen_image_sequence(
        &self,
        dir: impl AsRef<Path>,
        frame_rate: f64,
    ) -> Result<ScreeningReport, ScreeningError> {
        let dir: PathBuf = dir.as_ref().to_path_buf();
        self.manager
            .screen_concurrent(|| ImageSequenceSource::open(&dir, frame_rate))
    }

    /// 带文字对比度检查
    pub fn screen_with_contrast(
        &self,
        source: &mut dyn FrameSource,
        locator: &dyn TextLocator,
    ) -> Result<ScreeningReport, ScreeningError> {
        self.manager.screen_with_contrast(source, locator)
    }

    /// 单张图片的文字对比度
    pub fn check_image_contrast(
        &self,
        path: impl AsRef<Path>,
        locator: &dyn TextLocator,
    ) -> Result<Vec<ContrastIssue>, ScreeningError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|e| {
            ScreeningError::SourceUnavailable(format!("{}: {}", path.display(), e))
        })?;
        let frame = Frame::from_rgba_image(img.to_rgba8(), 0, 0);
        check_frame_contrast(&frame, locator, &self.manager.config().contrast)
    }

    pub fn stats(&self) -> ScreeningStats {
        self.manager.get_stats()
    }

    pub fn reset(&self) {
        self.manager.reset()
    }
}

impl Default for VideoScreener {
    fn default() -> Self {
        Self::create()
    }
}

impl Drop for VideoScreener {
    fn drop(&mut self) {
        info!("🗑️ VideoScreener: released");
    }
}

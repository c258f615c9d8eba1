//! 帧源 - 分析管线只依赖这个 trait，具体解码器在外部实现
//!
//! 每个 `FrameSource` 是一个独立的解码会话，不假设可以被多个并发消费者共享。

use super::frame::{Frame, RawFrame};
use crate::core::screening::ScreeningError;
use log::{debug, info};
use std::path::{Path, PathBuf};

pub trait FrameSource: Send {
    /// Frames per second.
    fn frame_rate(&self) -> f64;

    fn frame_count(&self) -> u64;

    /// Decodes the frame at `index`. Callers read in increasing index order.
    fn read_frame(&mut self, index: u64) -> Result<Frame, ScreeningError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn frame_rate(&self) -> f64 {
        (**self).frame_rate()
    }

    fn frame_count(&self) -> u64 {
        (**self).frame_count()
    }

    fn read_frame(&mut self, index: u64) -> Result<Frame, ScreeningError> {
        (**self).read_frame(index)
    }
}

/// 检查帧率是否可用于时间换算
pub fn checked_frame_rate(source: &dyn FrameSource) -> Result<f64, ScreeningError> {
    let fps = source.frame_rate();
    if !fps.is_finite() || fps <= 0.0 {
        return Err(ScreeningError::SourceUnavailable(format!(
            "invalid frame rate: {}",
            fps
        )));
    }
    Ok(fps)
}

/// 读取并校验缓冲区，帧源实现不必自己保证 RGBA 长度
pub fn read_checked(source: &mut dyn FrameSource, index: u64) -> Result<Frame, ScreeningError> {
    let frame = source.read_frame(index)?;
    frame.validate()?;
    Ok(frame)
}

/// 内存中的帧序列
#[derive(Debug, Clone)]
pub struct FrameSequence {
    frames: Vec<Frame>,
    frame_rate: f64,
}

impl FrameSequence {
    pub fn new(frames: Vec<Frame>, frame_rate: f64) -> Self {
        Self { frames, frame_rate }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

impl FrameSource for FrameSequence {
    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn frame_count(&self) -> u64 {
        self.frames.len() as u64
    }

    fn read_frame(&mut self, index: u64) -> Result<Frame, ScreeningError> {
        let frame = self
            .frames
            .get(index as usize)
            .cloned()
            .ok_or_else(|| ScreeningError::FrameReadFailure {
                index,
                last_processed: None,
                reason: format!("index out of range ({} frames)", self.frames.len()),
            })?;
        frame.validate()?;
        Ok(frame)
    }
}

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// 目录中按文件名排序的静态帧（如 `frame_0001.png`）
#[derive(Debug, Clone)]
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    frame_rate: f64,
}

impl ImageSequenceSource {
    pub fn open(dir: impl AsRef<Path>, frame_rate: f64) -> Result<Self, ScreeningError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            ScreeningError::SourceUnavailable(format!("{}: {}", dir.display(), e))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if is_image && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(ScreeningError::SourceUnavailable(format!(
                "no image frames in {}",
                dir.display()
            )));
        }

        info!(
            "📂 ImageSequenceSource: {} frames from {} at {:.2} fps",
            paths.len(),
            dir.display(),
            frame_rate
        );

        Ok(Self { paths, frame_rate })
    }
}

impl FrameSource for ImageSequenceSource {
    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn frame_count(&self) -> u64 {
        self.paths.len() as u64
    }

    fn read_frame(&mut self, index: u64) -> Result<Frame, ScreeningError> {
        let path = self
            .paths
            .get(index as usize)
            .ok_or_else(|| ScreeningError::FrameReadFailure {
                index,
                last_processed: None,
                reason: "index out of range".to_string(),
            })?;

        debug!("decoding frame {} from {}", index, path.display());
        let img = image::open(path).map_err(|e| ScreeningError::FrameReadFailure {
            index,
            last_processed: None,
            reason: format!("{}: {}", path.display(), e),
        })?;

        let timestamp_ms = (index as f64 * 1000.0 / self.frame_rate) as u64;
        Ok(Frame::from_rgba_image(img.to_rgba8(), timestamp_ms, index))
    }
}

/// 原生解码层交出的 YUV420 平面帧，读取时转换为 RGBA
#[derive(Debug)]
pub struct RawFrameSequence {
    frames: Vec<RawFrame>,
    frame_rate: f64,
}

impl RawFrameSequence {
    pub fn new(frames: Vec<RawFrame>, frame_rate: f64) -> Self {
        Self { frames, frame_rate }
    }
}

impl FrameSource for RawFrameSequence {
    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn frame_count(&self) -> u64 {
        self.frames.len() as u64
    }

    fn read_frame(&mut self, index: u64) -> Result<Frame, ScreeningError> {
        let raw = self
            .frames
            .get(index as usize)
            .ok_or_else(|| ScreeningError::FrameReadFailure {
                index,
                last_processed: None,
                reason: format!("index out of range ({} frames)", self.frames.len()),
            })?;
        raw.to_rgba()
    }
}

/// 原样返回帧、不做任何校验的帧源
#[cfg(test)]
pub(crate) struct UncheckedSequence(pub Vec<Frame>);

#[cfg(test)]
impl FrameSource for UncheckedSequence {
    fn frame_rate(&self) -> f64 {
        10.0
    }

    fn frame_count(&self) -> u64 {
        self.0.len() as u64
    }

    fn read_frame(&mut self, index: u64) -> Result<Frame, ScreeningError> {
        Ok(self.0[index as usize].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grey_yuv(width: u32, height: u32, frame_number: u64) -> RawFrame {
        RawFrame {
            width,
            height,
            y_plane: vec![128; (width * height) as usize],
            u_plane: vec![128; (width * height / 4) as usize],
            v_plane: vec![128; (width * height / 4) as usize],
            timestamp_ms: frame_number * 40,
            frame_number,
        }
    }

    #[test]
    fn test_raw_sequence_converts_planes() {
        let mut seq = RawFrameSequence::new(vec![grey_yuv(4, 4, 0), grey_yuv(4, 4, 1)], 25.0);
        assert_eq!(seq.frame_count(), 2);

        let frame = seq.read_frame(1).unwrap();
        assert_eq!(frame.frame_number, 1);
        assert_eq!(frame.timestamp.as_millis(), 40);
        assert_eq!(&frame.data[0..4], &[128, 128, 128, 255]);
        assert!(matches!(
            seq.read_frame(2),
            Err(ScreeningError::FrameReadFailure { index: 2, .. })
        ));
    }

    #[test]
    fn test_read_checked_rejects_truncated_buffer() {
        let mut bad = Frame::filled(4, 4, [0, 0, 0], 0);
        bad.data.truncate(7);
        let mut source = UncheckedSequence(vec![bad]);

        assert!(source.read_frame(0).is_ok());
        assert!(matches!(
            read_checked(&mut source, 0),
            Err(ScreeningError::InvalidFrame(_))
        ));
    }

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "photosafe-source-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_sequence_reads_in_range() {
        let mut seq = FrameSequence::new(vec![Frame::filled(4, 4, [1, 2, 3], 0)], 25.0);
        assert_eq!(seq.frame_count(), 1);
        assert_eq!(seq.frame_rate(), 25.0);
        assert!(seq.read_frame(0).is_ok());
        assert!(matches!(
            seq.read_frame(1),
            Err(ScreeningError::FrameReadFailure { index: 1, .. })
        ));
    }

    #[test]
    fn test_checked_frame_rate() {
        let seq = FrameSequence::new(vec![], 0.0);
        assert!(matches!(
            checked_frame_rate(&seq),
            Err(ScreeningError::SourceUnavailable(_))
        ));
        let seq = FrameSequence::new(vec![], f64::NAN);
        assert!(checked_frame_rate(&seq).is_err());
        let seq = FrameSequence::new(vec![], 30.0);
        assert_eq!(checked_frame_rate(&seq).unwrap(), 30.0);
    }

    #[test]
    fn test_image_sequence_sorted_by_name() {
        let dir = temp_dir("sorted");
        image::RgbaImage::from_pixel(6, 4, image::Rgba([255, 255, 255, 255]))
            .save(dir.join("frame_002.png"))
            .unwrap();
        image::RgbaImage::from_pixel(6, 4, image::Rgba([0, 0, 0, 255]))
            .save(dir.join("frame_001.png"))
            .unwrap();
        std::fs::write(dir.join("notes.txt"), b"not a frame").unwrap();

        let mut source = ImageSequenceSource::open(&dir, 10.0).unwrap();
        assert_eq!(source.frame_count(), 2);

        let first = source.read_frame(0).unwrap();
        let second = source.read_frame(1).unwrap();
        assert_eq!((first.width, first.height), (6, 4));
        assert_eq!(first.mean_luma(), 0.0);
        assert_eq!(second.mean_luma(), 255.0);
        assert_eq!(second.timestamp.as_millis(), 100);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_image_sequence_empty_dir_unavailable() {
        let dir = temp_dir("empty");
        assert!(matches!(
            ImageSequenceSource::open(&dir, 30.0),
            Err(ScreeningError::SourceUnavailable(_))
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_image_sequence_missing_dir_unavailable() {
        let dir = std::env::temp_dir().join("photosafe-source-does-not-exist");
        assert!(matches!(
            ImageSequenceSource::open(&dir, 30.0),
            Err(ScreeningError::SourceUnavailable(_))
        ));
    }
}

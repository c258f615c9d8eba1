use super::color::rgb_to_luma;
use crate::core::screening::ScreeningError;
use std::time::Duration;

/// 帧数据结构
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGBA 格式
    pub timestamp: Duration,
    pub frame_number: u64,
}

impl Frame {
    pub fn new(
        width: u32,
        height: u32,
        data: Vec<u8>,
        timestamp_ms: u64,
        frame_number: u64,
    ) -> Self {
        Self {
            width,
            height,
            data,
            timestamp: Duration::from_millis(timestamp_ms),
            frame_number,
        }
    }

    /// 纯色帧，测试和占位用
    pub fn filled(width: u32, height: u32, rgb: [u8; 3], frame_number: u64) -> Self {
        let data = [rgb[0], rgb[1], rgb[2], 255].repeat((width * height) as usize);
        Self::new(width, height, data, 0, frame_number)
    }

    pub fn from_rgba_image(img: image::RgbaImage, timestamp_ms: u64, frame_number: u64) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw(), timestamp_ms, frame_number)
    }

    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    pub fn validate(&self) -> Result<(), ScreeningError> {
        let expected = self.pixel_count() * 4;
        if self.data.len() != expected {
            return Err(ScreeningError::InvalidFrame(format!(
                "{}x{} RGBA frame needs {} bytes, got {}",
                self.width,
                self.height,
                expected,
                self.data.len()
            )));
        }
        Ok(())
    }

    /// Mean of the 8-bit grayscale plane, 0.0 for an empty frame.
    pub fn mean_luma(&self) -> f64 {
        let count = self.pixel_count();
        if count == 0 {
            return 0.0;
        }
        let sum: u64 = self
            .data
            .chunks_exact(4)
            .map(|px| rgb_to_luma(px[0], px[1], px[2]) as u64)
            .sum();
        sum as f64 / count as f64
    }

    /// Mean RGB over the rectangle `[x0, x1) x [y0, y1)`, clamped to the frame.
    pub fn mean_rgb(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> [f64; 3] {
        let x1 = x1.min(self.width);
        let y1 = y1.min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return [0.0; 3];
        }

        let mut sum = [0u64; 3];
        for y in y0..y1 {
            let row = (y * self.width) as usize * 4;
            let start = row + x0 as usize * 4;
            let end = row + x1 as usize * 4;
            for px in self.data[start..end].chunks_exact(4) {
                sum[0] += px[0] as u64;
                sum[1] += px[1] as u64;
                sum[2] += px[2] as u64;
            }
        }

        let n = ((x1 - x0) * (y1 - y0)) as f64;
        [sum[0] as f64 / n, sum[1] as f64 / n, sum[2] as f64 / n]
    }

    pub fn resize_to(
        &self,
        target_width: u32,
        target_height: u32,
    ) -> Result<Frame, ScreeningError> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| {
                ScreeningError::InvalidFrame(format!(
                    "buffer does not hold a {}x{} RGBA frame",
                    self.width, self.height
                ))
            })?;
        let resized = image::imageops::resize(
            &img,
            target_width,
            target_height,
            image::imageops::FilterType::Triangle,
        );

        Ok(Frame {
            width: target_width,
            height: target_height,
            data: resized.into_raw(),
            timestamp: self.timestamp,
            frame_number: self.frame_number,
        })
    }

    /// 按宽度等比缩放，宽度不变时直接克隆
    pub fn resize_to_width(&self, target_width: u32) -> Result<Frame, ScreeningError> {
        if target_width == self.width || self.width == 0 {
            return Ok(self.clone());
        }
        let target_height =
            ((self.height as u64 * target_width as u64) / self.width as u64).max(1) as u32;
        self.resize_to(target_width, target_height)
    }
}

/// 从原生解码层传递的 YUV420 平面帧
#[derive(Debug)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub y_plane: Vec<u8>,
    pub u_plane: Vec<u8>,
    pub v_plane: Vec<u8>,
    pub timestamp_ms: u64,
    pub frame_number: u64,
}

impl RawFrame {
    pub fn to_rgba(&self) -> Result<Frame, ScreeningError> {
        let luma_len = (self.width * self.height) as usize;
        let chroma_w = self.width.div_ceil(2);
        let chroma_len = (chroma_w * self.height.div_ceil(2)) as usize;
        if self.y_plane.len() < luma_len
            || self.u_plane.len() < chroma_len
            || self.v_plane.len() < chroma_len
        {
            return Err(ScreeningError::InvalidFrame(format!(
                "YUV420 planes too short for {}x{} (y={}, u={}, v={})",
                self.width,
                self.height,
                self.y_plane.len(),
                self.u_plane.len(),
                self.v_plane.len()
            )));
        }

        let mut rgba_data = vec![0u8; luma_len * 4];

        for y in 0..self.height {
            for x in 0..self.width {
                let y_idx = (y * self.width + x) as usize;
                let uv_idx = ((y / 2) * chroma_w + x / 2) as usize;

                let y_val = self.y_plane[y_idx] as f32;
                let u_val = self.u_plane[uv_idx] as f32 - 128.0;
                let v_val = self.v_plane[uv_idx] as f32 - 128.0;

                let r = (y_val + 1.402 * v_val).round().clamp(0.0, 255.0) as u8;
                let g = (y_val - 0.344136 * u_val - 0.714136 * v_val)
                    .round()
                    .clamp(0.0, 255.0) as u8;
                let b = (y_val + 1.772 * u_val).round().clamp(0.0, 255.0) as u8;

                let rgba_idx = y_idx * 4;
                rgba_data[rgba_idx..rgba_idx + 4].copy_from_slice(&[r, g, b, 255]);
            }
        }

        Ok(Frame::new(
            self.width,
            self.height,
            rgba_data,
            self.timestamp_ms,
            self.frame_number,
        ))
    }
}

//! 筛查阈值配置，全部带默认值，可从 JSON 覆盖

use super::error::ScreeningError;
use serde::{Deserialize, Serialize};

/// 闭区间 `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRange {
    pub min: u8,
    pub max: u8,
}

impl ChannelRange {
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, value: u8) -> bool {
        self.min <= value && value <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashConfig {
    /// Carried for downstream policy; the flash predicate does not read it.
    pub area_threshold: f64,
    /// Minimum brightness amplitude of both events in a window.
    pub flash_intensity_threshold: f64,
    /// Flashes per second that must be exceeded.
    pub flash_frequency_threshold: f64,
    pub sampling_interval_seconds: f64,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            area_threshold: 0.35,
            flash_intensity_threshold: 10.0,
            flash_frequency_threshold: 3.0,
            sampling_interval_seconds: 0.04,
        }
    }
}

impl FlashConfig {
    pub fn validate(&self) -> Result<(), ScreeningError> {
        check_fraction("flash.area_threshold", self.area_threshold)?;
        check(
            "flash.flash_intensity_threshold",
            self.flash_intensity_threshold,
            |v| v >= 0.0,
        )?;
        check(
            "flash.flash_frequency_threshold",
            self.flash_frequency_threshold,
            |v| v >= 0.0,
        )?;
        check(
            "flash.sampling_interval_seconds",
            self.sampling_interval_seconds,
            |v| v > 0.0,
        )
    }

    /// 采样步长（帧），至少为 1
    pub fn sampling_stride(&self, frame_rate: f64) -> u64 {
        ((frame_rate * self.sampling_interval_seconds) as u64).max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedConfig {
    pub area_threshold: f64,
    pub luma: ChannelRange,
    pub chroma_red: ChannelRange,
    pub chroma_blue: ChannelRange,
}

pub const SATURATED_RED_LUMA: ChannelRange = ChannelRange::new(66, 104);
pub const SATURATED_RED_CR: ChannelRange = ChannelRange::new(218, 255);
pub const SATURATED_RED_CB: ChannelRange = ChannelRange::new(72, 110);

impl Default for RedConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl RedConfig {
    pub const DEFAULT: RedConfig = RedConfig {
        area_threshold: 0.25,
        luma: SATURATED_RED_LUMA,
        chroma_red: SATURATED_RED_CR,
        chroma_blue: SATURATED_RED_CB,
    };

    pub fn validate(&self) -> Result<(), ScreeningError> {
        // 0 会让每一帧都命中
        check("red.area_threshold", self.area_threshold, |v| v > 0.0 && v <= 1.0)?;
        check_range("red.luma", self.luma)?;
        check_range("red.chroma_red", self.chroma_red)?;
        check_range("red.chroma_blue", self.chroma_blue)
    }

    #[inline]
    pub fn matches(&self, luma: u8, chroma_red: u8, chroma_blue: u8) -> bool {
        self.luma.contains(luma)
            && self.chroma_red.contains(chroma_red)
            && self.chroma_blue.contains(chroma_blue)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContrastConfig {
    /// 每秒分析的帧数
    pub target_sample_rate: f64,
    pub min_confidence: f32,
    /// Luminance difference below which text counts as unreadable.
    pub contrast_threshold: f64,
    pub background_margin: u32,
    pub resize_width: Option<u32>,
}

impl Default for ContrastConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 3.0,
            min_confidence: 0.5,
            contrast_threshold: 100.0,
            background_margin: 5,
            resize_width: Some(450),
        }
    }
}

impl ContrastConfig {
    pub fn validate(&self) -> Result<(), ScreeningError> {
        check(
            "contrast.target_sample_rate",
            self.target_sample_rate,
            |v| v > 0.0,
        )?;
        check(
            "contrast.min_confidence",
            self.min_confidence as f64,
            |v| (0.0..=1.0).contains(&v),
        )?;
        check(
            "contrast.contrast_threshold",
            self.contrast_threshold,
            |v| v >= 0.0,
        )?;
        if self.resize_width == Some(0) {
            return Err(ScreeningError::InvalidThreshold {
                name: "contrast.resize_width",
                value: 0.0,
            });
        }
        Ok(())
    }

    /// 每隔多少帧分析一帧
    pub fn frame_skip(&self, frame_rate: f64) -> u64 {
        ((frame_rate / self.target_sample_rate).floor() as u64).max(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    pub flash: FlashConfig,
    pub red: RedConfig,
    pub contrast: ContrastConfig,
}

impl ScreeningConfig {
    pub fn from_json(json: &str) -> Result<Self, ScreeningError> {
        let config: ScreeningConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScreeningError> {
        self.flash.validate()?;
        self.red.validate()?;
        self.contrast.validate()
    }
}

fn check(
    name: &'static str,
    value: f64,
    valid: impl Fn(f64) -> bool,
) -> Result<(), ScreeningError> {
    if value.is_finite() && valid(value) {
        Ok(())
    } else {
        Err(ScreeningError::InvalidThreshold { name, value })
    }
}

fn check_fraction(name: &'static str, value: f64) -> Result<(), ScreeningError> {
    check(name, value, |v| (0.0..=1.0).contains(&v))
}

fn check_range(name: &'static str, range: ChannelRange) -> Result<(), ScreeningError> {
    if range.min <= range.max {
        Ok(())
    } else {
        Err(ScreeningError::InvalidThreshold {
            name,
            value: range.min as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ScreeningConfig::default().validate().is_ok());
    }

    #[test]
    fn test_negative_area_rejected() {
        let config = RedConfig {
            area_threshold: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ScreeningError::InvalidThreshold {
                name: "red.area_threshold",
                ..
            })
        ));
    }

    #[test]
    fn test_non_positive_interval_rejected() {
        let config = FlashConfig {
            sampling_interval_seconds: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = FlashConfig {
            flash_intensity_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let config = RedConfig {
            luma: ChannelRange::new(120, 60),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sampling_stride() {
        let config = FlashConfig::default();
        assert_eq!(config.sampling_stride(30.0), 1);
        assert_eq!(config.sampling_stride(60.0), 2);
        assert_eq!(config.sampling_stride(10.0), 1);
    }

    #[test]
    fn test_frame_skip() {
        let config = ContrastConfig::default();
        assert_eq!(config.frame_skip(30.0), 10);
        assert_eq!(config.frame_skip(2.0), 1);
    }

    #[test]
    fn test_from_json_partial_override() {
        let config = ScreeningConfig::from_json(
            r#"{ "flash": { "flash_frequency_threshold": 5 }, "red": { "area_threshold": 0.5 } }"#,
        )
        .unwrap();
        assert_eq!(config.flash.flash_frequency_threshold, 5.0);
        assert_eq!(config.flash.flash_intensity_threshold, 10.0);
        assert_eq!(config.red.area_threshold, 0.5);
        assert_eq!(config.red.chroma_red, SATURATED_RED_CR);
    }

    #[test]
    fn test_from_json_rejects_invalid_values() {
        assert!(matches!(
            ScreeningConfig::from_json(r#"{ "red": { "area_threshold": 1.5 } }"#),
            Err(ScreeningError::InvalidThreshold { .. })
        ));
        assert!(matches!(
            ScreeningConfig::from_json("{ not json"),
            Err(ScreeningError::Config(_))
        ));
    }
}

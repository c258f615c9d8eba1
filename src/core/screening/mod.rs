//! 光敏性癫痫风险筛查
//!
//! 核心流程：
//! 1. 闪烁检测 - 定步长采样 -> 感知亮度 -> 反转事件 -> 两事件滑窗判定
//! 2. 饱和红检测 - 逐帧统计 YCrCb 饱和红像素占比
//! 3. 风险分级 - 按违规总数划分 Low / Medium / High
//! 4. 文字对比度 - 可选，单独上报

pub mod brightness;
pub mod config;
pub mod contrast;
pub mod error;
pub mod finding;
pub mod flash;
pub mod manager;
pub mod red;
pub mod risk;
pub mod state_machine;

pub use brightness::{luminance_to_brightness, Sample};
pub use config::{ChannelRange, ContrastConfig, FlashConfig, RedConfig, ScreeningConfig};
pub use contrast::{
    check_contrast, check_frame_contrast, ContrastIssue, MockTextLocator, TextLocator, TextRegion,
};
pub use error::ScreeningError;
pub use finding::{Finding, HazardKind};
pub use flash::{analyze, detect_harmful_flashes};
pub use manager::{ScreeningManager, ScreeningReport, ScreeningStats};
pub use red::{detect_red, is_saturated_red};
pub use risk::{categorize, RiskLevel};
pub use state_machine::{BrightnessEvent, ExtremaState, ExtremaTracker};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    Flash,
    SaturatedRed,
}

/// 一段危险片段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub timestamp_seconds: f64,
    pub reason: String,
    pub kind: HazardKind,
}

impl Finding {
    pub fn flash(timestamp_seconds: f64, frequency_hz: f64) -> Self {
        Self {
            timestamp_seconds,
            reason: format!("Harmful flash detected: {:.6} Hz", frequency_hz),
            kind: HazardKind::Flash,
        }
    }

    pub fn saturated_red(timestamp_seconds: f64) -> Self {
        Self {
            timestamp_seconds,
            reason: "Saturated red transition".to_string(),
            kind: HazardKind::SaturatedRed,
        }
    }
}

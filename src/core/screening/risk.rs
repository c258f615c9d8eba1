use serde::{Deserialize, Serialize};
use std::fmt;

const MEDIUM_FROM: usize = 50;
const HIGH_FROM: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// 按违规数量划分风险等级
pub fn categorize(count: usize) -> RiskLevel {
    if count < MEDIUM_FROM {
        RiskLevel::Low
    } else if count < HIGH_FROM {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(categorize(0), RiskLevel::Low);
        assert_eq!(categorize(49), RiskLevel::Low);
        assert_eq!(categorize(50), RiskLevel::Medium);
        assert_eq!(categorize(149), RiskLevel::Medium);
        assert_eq!(categorize(150), RiskLevel::High);
        assert_eq!(categorize(10_000), RiskLevel::High);
    }

    #[test]
    fn test_display_and_order() {
        assert_eq!(RiskLevel::Medium.to_string(), "Medium");
        assert!(RiskLevel::Low < RiskLevel::High);
    }
}

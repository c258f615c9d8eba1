//! 筛查管理器 - 组合闪烁/饱和红两条检测，汇总风险等级

use super::config::ScreeningConfig;
use super::contrast::{check_contrast, ContrastIssue, TextLocator};
use super::error::ScreeningError;
use super::finding::Finding;
use super::flash::analyze;
use super::red::detect_red;
use super::risk::{categorize, RiskLevel};
use crate::core::video::FrameSource;
use log::{debug, info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// 一次筛查的结构化结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningReport {
    pub flash_findings: Vec<Finding>,
    pub red_findings: Vec<Finding>,
    pub violation_count: usize,
    pub risk_level: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast_issues: Option<Vec<ContrastIssue>>,
}

impl ScreeningReport {
    pub fn new(flash_findings: Vec<Finding>, red_findings: Vec<Finding>) -> Self {
        let violation_count = flash_findings.len() + red_findings.len();
        Self {
            flash_findings,
            red_findings,
            violation_count,
            risk_level: categorize(violation_count),
            contrast_issues: None,
        }
    }

    /// 闪烁在前、饱和红在后的合并列表
    pub fn findings(&self) -> Vec<Finding> {
        self.flash_findings
            .iter()
            .chain(self.red_findings.iter())
            .cloned()
            .collect()
    }

    pub fn to_json(&self) -> Result<String, ScreeningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// 筛查统计
#[derive(Debug, Clone)]
pub struct ScreeningStats {
    pub videos_screened: u64,
    pub findings_reported: u64,
}

pub struct ScreeningManager {
    config: ScreeningConfig,
    pool: Option<ThreadPool>,
    screened_count: Arc<Mutex<u64>>,
    finding_count: Arc<Mutex<u64>>,
}

impl ScreeningManager {
    pub fn new() -> Self {
        Self::build(ScreeningConfig::default())
    }

    pub fn with_config(config: ScreeningConfig) -> Result<Self, ScreeningError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: ScreeningConfig) -> Self {
        let num_threads = num_cpus::get().min(4);
        debug!("Using {} threads for screening", num_threads);

        // 建池失败时退回全局 rayon 池
        let pool = match ThreadPoolBuilder::new().num_threads(num_threads).build() {
            Ok(pool) => Some(pool),
            Err(e) => {
                warn!("⚠️ Failed to build screening thread pool, using global pool: {}", e);
                None
            }
        };

        Self {
            config,
            pool,
            screened_count: Arc::new(Mutex::new(0)),
            finding_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn config(&self) -> &ScreeningConfig {
        &self.config
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// 在同一个帧源上顺序执行闪烁与饱和红检测
    pub fn screen(&self, source: &mut dyn FrameSource) -> Result<ScreeningReport, ScreeningError> {
        let config = &self.config;
        let (flash, red) = self.install(|| -> Result<_, ScreeningError> {
            let flash = analyze(source, &config.flash)?;
            let red = detect_red(source, &config.red)?;
            Ok((flash, red))
        })?;
        Ok(self.finish(ScreeningReport::new(flash, red)))
    }

    /// 两条检测并发执行，`open` 为每条检测各打开一个独立的帧源
    pub fn screen_concurrent<S, F>(&self, open: F) -> Result<ScreeningReport, ScreeningError>
    where
        S: FrameSource,
        F: Fn() -> Result<S, ScreeningError> + Sync,
    {
        let config = &self.config;
        let (flash, red) = self.install(|| {
            rayon::join(
                || -> Result<Vec<Finding>, ScreeningError> {
                    let mut source = open()?;
                    analyze(&mut source, &config.flash)
                },
                || -> Result<Vec<Finding>, ScreeningError> {
                    let mut source = open()?;
                    detect_red(&mut source, &config.red)
                },
            )
        });
        Ok(self.finish(ScreeningReport::new(flash?, red?)))
    }

    /// 额外执行文字对比度检查，结果不计入风险等级
    pub fn screen_with_contrast(
        &self,
        source: &mut dyn FrameSource,
        locator: &dyn TextLocator,
    ) -> Result<ScreeningReport, ScreeningError> {
        let config = &self.config;
        let (flash, red, contrast) = self.install(|| -> Result<_, ScreeningError> {
            let flash = analyze(source, &config.flash)?;
            let red = detect_red(source, &config.red)?;
            let contrast = check_contrast(source, locator, &config.contrast)?;
            Ok((flash, red, contrast))
        })?;

        let mut report = ScreeningReport::new(flash, red);
        report.contrast_issues = Some(contrast);
        Ok(self.finish(report))
    }

    fn finish(&self, report: ScreeningReport) -> ScreeningReport {
        if let Ok(mut count) = self.screened_count.lock() {
            *count += 1;
        }
        if let Ok(mut findings) = self.finding_count.lock() {
            *findings += report.violation_count as u64;
        }

        info!(
            "📊 Screening complete: {} violations, risk {}",
            report.violation_count, report.risk_level
        );
        report
    }

    pub fn get_stats(&self) -> ScreeningStats {
        ScreeningStats {
            videos_screened: self.screened_count.lock().map(|c| *c).unwrap_or(0),
            findings_reported: self.finding_count.lock().map(|c| *c).unwrap_or(0),
        }
    }

    pub fn reset(&self) {
        if let Ok(mut count) = self.screened_count.lock() {
            *count = 0;
        }
        if let Ok(mut findings) = self.finding_count.lock() {
            *findings = 0;
        }
    }
}

impl Default for ScreeningManager {
    fn default() -> Self {
        Self::new()
    }
}

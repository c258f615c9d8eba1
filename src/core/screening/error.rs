use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error("Video source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("Failed to read frame {index} (last processed: {last_processed:?}): {reason}")]
    FrameReadFailure {
        index: u64,
        last_processed: Option<u64>,
        reason: String,
    },
    #[error("Invalid threshold {name}: {value}")]
    InvalidThreshold { name: &'static str, value: f64 },
    #[error("Invalid frame buffer: {0}")]
    InvalidFrame(String),
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScreeningError {
    /// 把帧源的读取错误统一成带上下文的 `FrameReadFailure`
    pub(crate) fn at_frame(self, index: u64, last_processed: Option<u64>) -> Self {
        match self {
            ScreeningError::FrameReadFailure { reason, .. } => ScreeningError::FrameReadFailure {
                index,
                last_processed,
                reason,
            },
            other => ScreeningError::FrameReadFailure {
                index,
                last_processed,
                reason: other.to_string(),
            },
        }
    }
}

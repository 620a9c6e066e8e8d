//! Error types for the analytics core

use thiserror::Error;

/// Result type used by the mining and aggregation stages
pub type AnalyticsResult<T> = std::result::Result<T, AnalyticsError>;

/// Errors raised by the analytics core.
///
/// Data problems in individual rows are recovered locally and never surface
/// here; only invalid configuration and invalid record construction do.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// A ratio threshold fell outside its allowed range
    #[error("invalid {param}: {value} (must be {constraint})")]
    InvalidThreshold {
        param: &'static str,
        value: f64,
        constraint: &'static str,
    },

    /// A non-ratio parameter (window size, length cap) was out of range
    #[error("invalid {param}: {reason}")]
    InvalidParameter { param: &'static str, reason: String },

    /// An order record failed constructor validation
    #[error("invalid order record: {0}")]
    InvalidRecord(String),
}

impl AnalyticsError {
    pub(crate) fn threshold(param: &'static str, value: f64, constraint: &'static str) -> Self {
        Self::InvalidThreshold {
            param,
            value,
            constraint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_message() {
        let err = AnalyticsError::threshold("min_support", 0.0, "in (0, 1]");
        assert_eq!(err.to_string(), "invalid min_support: 0 (must be in (0, 1])");
    }

    #[test]
    fn test_record_message() {
        let err = AnalyticsError::InvalidRecord("negative revenue -5".to_string());
        assert!(err.to_string().contains("negative revenue"));
    }
}

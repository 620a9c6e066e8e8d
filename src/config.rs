//! Threshold configuration for mining, rule generation and reporting

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::rules::BundlePolicy;
use serde::Serialize;

/// Check that a ratio lies in (0, 1]
pub(crate) fn validate_ratio(param: &'static str, value: f64) -> AnalyticsResult<()> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(AnalyticsError::threshold(param, value, "in (0, 1]"))
    }
}

/// Frequent itemset mining parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MiningConfig {
    /// Minimum fraction of transactions an itemset must appear in
    pub min_support: f64,
    /// Largest itemset size to enumerate, unbounded when `None`
    pub max_len: Option<usize>,
}

impl MiningConfig {
    pub fn new(min_support: f64) -> Self {
        Self {
            min_support,
            max_len: None,
        }
    }

    #[must_use]
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub fn validate(&self) -> AnalyticsResult<()> {
        validate_ratio("min_support", self.min_support)?;
        if self.max_len == Some(0) {
            return Err(AnalyticsError::InvalidParameter {
                param: "max_len",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self::new(0.01)
    }
}

/// Secondary ordering applied to rules that tie on confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SecondaryKey {
    #[default]
    None,
    Lift,
    Support,
}

/// Association rule generation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RuleConfig {
    pub min_confidence: f64,
    pub min_lift: Option<f64>,
    pub secondary: SecondaryKey,
}

impl RuleConfig {
    pub fn new(min_confidence: f64) -> Self {
        Self {
            min_confidence,
            min_lift: None,
            secondary: SecondaryKey::None,
        }
    }

    #[must_use]
    pub fn with_min_lift(mut self, min_lift: f64) -> Self {
        self.min_lift = Some(min_lift);
        self
    }

    #[must_use]
    pub fn with_secondary(mut self, secondary: SecondaryKey) -> Self {
        self.secondary = secondary;
        self
    }

    pub fn validate(&self) -> AnalyticsResult<()> {
        validate_ratio("min_confidence", self.min_confidence)?;
        if let Some(lift) = self.min_lift {
            if !(lift.is_finite() && lift > 0.0) {
                return Err(AnalyticsError::threshold("min_lift", lift, "positive"));
            }
        }
        Ok(())
    }
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self::new(0.2).with_secondary(SecondaryKey::Lift)
    }
}

/// Everything the pipeline needs, validated once before any stage runs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineConfig {
    pub mining: MiningConfig,
    pub rules: RuleConfig,
    pub bundle: BundlePolicy,
    /// Number of co-occurring pairs kept in the report
    pub top_pairs: usize,
    /// Number of products kept in the best-seller list
    pub top_products: usize,
    /// Trailing window of the monthly moving average
    pub moving_average_window: usize,
}

impl PipelineConfig {
    pub fn validate(&self) -> AnalyticsResult<()> {
        self.mining.validate()?;
        self.rules.validate()?;
        self.bundle.validate()?;
        if self.moving_average_window == 0 {
            return Err(AnalyticsError::InvalidParameter {
                param: "moving_average_window",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mining: MiningConfig::default(),
            rules: RuleConfig::default(),
            bundle: BundlePolicy::default(),
            top_pairs: 10,
            top_products: 5,
            moving_average_window: 3,
        }
    }
}

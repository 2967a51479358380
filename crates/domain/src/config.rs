//! Configuration structures for detection, risk classification, and
//! governance.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_HIGH_COUNT_THRESHOLD, DEFAULT_MAX_INPUT_BYTES, DEFAULT_MIN_CONFIDENCE,
    DEFAULT_MIN_JUSTIFICATION_CHARS,
};
use crate::errors::{PhiGateError, Result};
use crate::types::detection::Confidence;

/// Detector input and filtering limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Inputs larger than this fail with `ContentTooLarge`.
    pub max_input_bytes: usize,
    /// Candidates below this confidence are discarded.
    pub min_confidence: Confidence,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            min_confidence: Confidence::new(DEFAULT_MIN_CONFIDENCE),
        }
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_input_bytes == 0 {
            return Err(PhiGateError::Config("max_input_bytes must be non-zero".into()));
        }
        Ok(())
    }
}

/// Risk classification thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Total finding count above which a scan is high risk regardless of
    /// types present.
    pub high_count_threshold: usize,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self { high_count_threshold: DEFAULT_HIGH_COUNT_THRESHOLD }
    }
}

impl RiskConfig {
    pub fn validate(&self) -> Result<()> {
        if self.high_count_threshold == 0 {
            return Err(PhiGateError::Config("high_count_threshold must be non-zero".into()));
        }
        Ok(())
    }
}

/// Override workflow settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Minimum characters required in a review justification.
    pub min_justification_chars: usize,
    /// How long an unconsumed release grant stays valid. `None` means the
    /// grant never expires.
    pub release_window: Option<Duration>,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self { min_justification_chars: DEFAULT_MIN_JUSTIFICATION_CHARS, release_window: None }
    }
}

impl GovernanceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_justification_chars == 0 {
            return Err(PhiGateError::Config("min_justification_chars must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(DetectionConfig::default().validate().is_ok());
        assert!(RiskConfig::default().validate().is_ok());
        assert!(GovernanceConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_limits_are_rejected() {
        let cfg = DetectionConfig { max_input_bytes: 0, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(PhiGateError::Config(_))));
    }
}

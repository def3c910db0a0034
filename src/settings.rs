//! Player-facing settings. Stored by the host page as JSON; any field missing
//! from a saved document falls back to its default.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::LayoutConfig;
use crate::problem::{NumberRange, QuestionType};

/// Largest `numberRange` accepted. Every sum and minuend stays within it, so
/// answers never need more than three digits.
pub const MAX_NUMBER_RANGE: u32 = 100;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("number range {max} is too small for operands of at least {min}")]
    RangeTooSmall { min: u32, max: u32 },
    #[error("number range {max} exceeds the supported maximum of {limit}")]
    RangeTooLarge { max: u32, limit: u32 },
    #[error("items per row must be at least 1")]
    InvalidRowWidth,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub question_type: QuestionType,
    /// Largest sum / minuend a generated problem may use.
    pub number_range: u32,
    pub min_number: u32,
    pub enable_timer: bool,
    pub layout: LayoutConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            question_type: QuestionType::Mixed,
            number_range: 20,
            min_number: 1,
            enable_timer: true,
            layout: LayoutConfig::default(),
        }
    }
}

impl Settings {
    /// Parse and validate a (possibly partial) settings document.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        // Addition needs room for two operands of at least `min_number`.
        if self.number_range < self.min_number.saturating_mul(2) {
            return Err(SettingsError::RangeTooSmall { min: self.min_number, max: self.number_range });
        }
        if self.number_range > MAX_NUMBER_RANGE {
            return Err(SettingsError::RangeTooLarge { max: self.number_range, limit: MAX_NUMBER_RANGE });
        }
        if self.layout.items_per_row == 0 {
            return Err(SettingsError::InvalidRowWidth);
        }
        Ok(())
    }

    pub fn number_range(&self) -> NumberRange {
        NumberRange { min: self.min_number, max: self.number_range }
    }
}

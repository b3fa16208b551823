//! Validity window of a promotion.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PromotionError;

/// A date range with `from <= to`. An inverted period cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionPeriod {
    from: DateTime<FixedOffset>,
    to: DateTime<FixedOffset>,
}

impl PromotionPeriod {
    pub fn new(from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> Result<Self, PromotionError> {
        if from > to {
            return Err(PromotionError::InvalidPeriod);
        }
        Ok(Self { from, to })
    }

    pub fn starts_at(&self) -> DateTime<FixedOffset> {
        self.from
    }

    pub fn ends_at(&self) -> DateTime<FixedOffset> {
        self.to
    }

    /// Whether `instant` falls inside the period, bounds included.
    pub fn contains(&self, instant: DateTime<FixedOffset>) -> bool {
        self.from <= instant && instant <= self.to
    }
}

/// `{ "from": "2020-01-01T00:00:00+00:00", "to": "2020-12-31T23:59:59+00:00" }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PeriodWire {
    from: String,
    to: String,
}

fn parse_bound(raw: &str, field: &'static str) -> Result<DateTime<FixedOffset>, PromotionError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map_err(|source| PromotionError::InvalidDate { field, source })
}

fn format_bound(instant: &DateTime<FixedOffset>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

impl TryFrom<&PeriodWire> for PromotionPeriod {
    type Error = PromotionError;

    fn try_from(wire: &PeriodWire) -> Result<Self, Self::Error> {
        PromotionPeriod::new(parse_bound(&wire.from, "from")?, parse_bound(&wire.to, "to")?)
    }
}

impl From<&PromotionPeriod> for PeriodWire {
    fn from(period: &PromotionPeriod) -> Self {
        PeriodWire {
            from: format_bound(&period.from),
            to: format_bound(&period.to),
        }
    }
}

/// De-normalizes a period from its wire JSON.
pub fn denormalize_period(value: &Value) -> Result<PromotionPeriod, PromotionError> {
    let wire = PeriodWire::deserialize(value).map_err(|e| PromotionError::InvalidField {
        field: "period",
        value: e.to_string(),
    })?;
    PromotionPeriod::try_from(&wire)
}

/// Normalizes a period into its wire JSON.
pub fn normalize_period(period: &PromotionPeriod) -> Value {
    let wire = PeriodWire::from(period);
    serde_json::json!({ "from": wire.from, "to": wire.to })
}

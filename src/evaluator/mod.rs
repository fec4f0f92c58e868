/// Bin capacity evaluation: fill percentage and status tier.
///
/// A bin reports a raw usage counter. The counter runs *down* as the bin
/// fills: a reading equal to the capacity is an empty bin, a reading of zero
/// is a full one. Two pure operations turn a reading into something
/// displayable:
///
/// - [`compute_fill_percentage`] — normalized fill in `[0, 100]`, clamped so
///   that out-of-range sensor values degrade to a boundary instead of failing.
/// - [`classify_status`] — Low / Medium / High tier used for colouring and
///   alert counts.
///
/// Neither function performs I/O or touches shared state; callers may invoke
/// them from any thread.
///
/// | Fill %          | Tier   | Style   | Colour    |
/// |-----------------|--------|---------|-----------|
/// | `p <= 30`       | Low    | success | `#4CAF50` |
/// | `30 < p <= 70`  | Medium | warning | `#FFC107` |
/// | `p > 70`        | High   | danger  | `#F44336` |
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Usage count corresponding to an empty bin.
pub const DEFAULT_CAPACITY: i64 = 28;

/// Upper bound (inclusive) of the Low tier.
pub const LOW_THRESHOLD: f64 = 30.0;

/// Upper bound (inclusive) of the Medium tier.
pub const MEDIUM_THRESHOLD: f64 = 70.0;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Contract violations raised by the evaluator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluatorError {
    #[error("invalid bin capacity {0}: capacity must be positive")]
    InvalidCapacity(i64),

    #[error("fill percentage {0} is outside [0, 100]")]
    OutOfRange(f64),
}

// ---------------------------------------------------------------------------
// Data model
// ---------------------------------------------------------------------------

/// A single observation of a bin's usage counter, as returned by the
/// monitoring API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinReading {
    #[serde(deserialize_with = "id_as_string")]
    pub bin_status_id: String,
    #[serde(default)]
    pub bin_name: Option<String>,
    /// Raw counter. JSON floats are rounded to the nearest integer.
    #[serde(rename = "usages", deserialize_with = "usage_as_i64")]
    pub usage_count: i64,
}

impl BinReading {
    pub fn new(bin_status_id: impl Into<String>, usage_count: i64) -> Self {
        Self {
            bin_status_id: bin_status_id.into(),
            bin_name: None,
            usage_count,
        }
    }

    /// Name shown to the user; falls back to the reading id.
    pub fn display_name(&self) -> &str {
        self.bin_name.as_deref().unwrap_or(&self.bin_status_id)
    }
}

/// Three-tier fill classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTier {
    Low,
    Medium,
    High,
}

impl StatusTier {
    /// Style role of the tier (`success`, `warning`, `danger`).
    pub fn style(self) -> &'static str {
        match self {
            Self::Low => "success",
            Self::Medium => "warning",
            Self::High => "danger",
        }
    }

    /// Palette colour of the tier.
    pub fn color_hex(self) -> &'static str {
        match self {
            Self::Low => "#4CAF50",
            Self::Medium => "#FFC107",
            Self::High => "#F44336",
        }
    }

    /// Whether a bin in this tier should count towards alerts.
    pub fn is_alert(self) -> bool {
        self == Self::High
    }
}

impl std::fmt::Display for StatusTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Derived fill state of a reading. Recomputed on every render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FillLevel {
    pub percentage: f64,
    pub status: StatusTier,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Convert a usage count into a fill percentage in `[0, 100]`.
///
/// `((capacity - usage_count) / capacity) * 100`, clamped at both ends.
/// Arithmetic is done in `f64` so extreme counters cannot overflow.
pub fn compute_fill_percentage(usage_count: i64, capacity: i64) -> Result<f64, EvaluatorError> {
    if capacity <= 0 {
        return Err(EvaluatorError::InvalidCapacity(capacity));
    }

    let capacity = capacity as f64;
    let raw = ((capacity - usage_count as f64) / capacity) * 100.0;
    Ok(raw.clamp(0.0, 100.0))
}

/// Classify a fill percentage. Boundary values belong to the lower tier.
pub fn classify_status(percentage: f64) -> Result<StatusTier, EvaluatorError> {
    // NaN fails the range check as well.
    if !(0.0..=100.0).contains(&percentage) {
        return Err(EvaluatorError::OutOfRange(percentage));
    }

    let tier = if percentage <= LOW_THRESHOLD {
        StatusTier::Low
    } else if percentage <= MEDIUM_THRESHOLD {
        StatusTier::Medium
    } else {
        StatusTier::High
    };
    Ok(tier)
}

/// Evaluate a reading against a capacity.
pub fn evaluate(reading: &BinReading, capacity: i64) -> Result<FillLevel, EvaluatorError> {
    let percentage = compute_fill_percentage(reading.usage_count, capacity)?;
    let status = classify_status(percentage)?;
    Ok(FillLevel { percentage, status })
}

// ---------------------------------------------------------------------------
// Wire helpers
// ---------------------------------------------------------------------------

pub(crate) fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

fn usage_as_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(n) = number.as_i64() {
        return Ok(n);
    }
    // Fractional counters round to the nearest count; the cast saturates.
    match number.as_f64() {
        Some(f) if f.is_finite() => Ok(f.round() as i64),
        _ => Err(serde::de::Error::custom(format!(
            "usages must be a finite number, got {number}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_capacity_reading_is_empty() {
        assert_eq!(compute_fill_percentage(28, 28).unwrap(), 0.0);
    }

    #[test]
    fn zero_reading_is_full() {
        assert_eq!(compute_fill_percentage(0, 28).unwrap(), 100.0);
    }

    #[test]
    fn over_capacity_clamps_to_zero() {
        assert_eq!(compute_fill_percentage(35, 28).unwrap(), 0.0);
        assert_eq!(compute_fill_percentage(i64::MAX, 28).unwrap(), 0.0);
    }

    #[test]
    fn negative_reading_clamps_to_hundred() {
        assert_eq!(compute_fill_percentage(-5, 28).unwrap(), 100.0);
        assert_eq!(compute_fill_percentage(i64::MIN, 28).unwrap(), 100.0);
    }

    #[test]
    fn non_positive_capacity_is_rejected() {
        assert_eq!(
            compute_fill_percentage(10, 0),
            Err(EvaluatorError::InvalidCapacity(0))
        );
        assert_eq!(
            compute_fill_percentage(10, -1),
            Err(EvaluatorError::InvalidCapacity(-1))
        );
    }

    #[test]
    fn tier_boundaries_belong_to_lower_tier() {
        assert_eq!(classify_status(30.0).unwrap(), StatusTier::Low);
        assert_eq!(classify_status(30.0001).unwrap(), StatusTier::Medium);
        assert_eq!(classify_status(70.0).unwrap(), StatusTier::Medium);
        assert_eq!(classify_status(70.0001).unwrap(), StatusTier::High);
    }

    #[test]
    fn classify_rejects_out_of_range() {
        assert!(matches!(
            classify_status(-0.1),
            Err(EvaluatorError::OutOfRange(_))
        ));
        assert!(matches!(
            classify_status(100.5),
            Err(EvaluatorError::OutOfRange(_))
        ));
        assert!(matches!(
            classify_status(f64::NAN),
            Err(EvaluatorError::OutOfRange(_))
        ));
    }

    #[test]
    fn tier_styles_match_palette() {
        assert_eq!(StatusTier::Low.style(), "success");
        assert_eq!(StatusTier::Medium.color_hex(), "#FFC107");
        assert_eq!(StatusTier::High.color_hex(), "#F44336");
        assert!(StatusTier::High.is_alert());
        assert!(!StatusTier::Medium.is_alert());
    }

    #[test]
    fn reading_accepts_numeric_id_and_float_usage() {
        let json = r#"{"binStatusId": 17, "binName": "Library", "usages": 12.0}"#;
        let reading: BinReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.bin_status_id, "17");
        assert_eq!(reading.usage_count, 12);
        assert_eq!(reading.display_name(), "Library");
    }

    #[test]
    fn reading_rounds_fractional_usage() {
        let json = r#"{"binStatusId": "a1", "usages": 12.4}"#;
        assert_eq!(serde_json::from_str::<BinReading>(json).unwrap().usage_count, 12);
        let json = r#"{"binStatusId": "a1", "usages": 12.5}"#;
        assert_eq!(serde_json::from_str::<BinReading>(json).unwrap().usage_count, 13);
        let json = r#"{"binStatusId": "a1", "usages": -0.6}"#;
        assert_eq!(serde_json::from_str::<BinReading>(json).unwrap().usage_count, -1);
    }

    #[test]
    fn reading_rejects_non_numeric_usage() {
        let json = r#"{"binStatusId": "a1", "usages": "12"}"#;
        assert!(serde_json::from_str::<BinReading>(json).is_err());
    }

    #[test]
    fn reading_without_name_displays_id() {
        let reading = BinReading::new("bin-3", 4);
        assert_eq!(reading.display_name(), "bin-3");
    }
}

//! Bin status report: a fetched bin list evaluated for display.
//!
//! Shared by the terminal output and the dashboard so both render the same
//! percentages and tiers.

use serde::Serialize;

use crate::evaluator::{self, BinReading, EvaluatorError, FillLevel, StatusTier};

/// A reading together with its derived fill level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatedBin {
    pub id: String,
    pub name: String,
    pub usage_count: i64,
    pub percentage: f64,
    pub status: StatusTier,
    pub color: &'static str,
}

impl EvaluatedBin {
    fn new(reading: &BinReading, level: FillLevel) -> Self {
        Self {
            id: reading.bin_status_id.clone(),
            name: reading.display_name().to_string(),
            usage_count: reading.usage_count,
            percentage: level.percentage,
            status: level.status,
            color: level.status.color_hex(),
        }
    }
}

/// Count of bins per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl TierCounts {
    fn add(&mut self, tier: StatusTier) {
        match tier {
            StatusTier::Low => self.low += 1,
            StatusTier::Medium => self.medium += 1,
            StatusTier::High => self.high += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub capacity: i64,
    pub bins: Vec<EvaluatedBin>,
    pub counts: TierCounts,
}

impl StatusReport {
    /// Bins that count towards alerts (High tier).
    pub fn alerts(&self) -> usize {
        self.bins.iter().filter(|b| b.status.is_alert()).count()
    }
}

/// Evaluate every reading against `capacity`, preserving API order.
///
/// Fails only when the capacity itself is invalid.
pub fn build_report(readings: &[BinReading], capacity: i64) -> Result<StatusReport, EvaluatorError> {
    let mut counts = TierCounts::default();
    let bins = readings
        .iter()
        .map(|reading| {
            let level = evaluator::evaluate(reading, capacity)?;
            counts.add(level.status);
            Ok(EvaluatedBin::new(reading, level))
        })
        .collect::<Result<Vec<_>, EvaluatorError>>()?;

    Ok(StatusReport {
        capacity,
        bins,
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings() -> Vec<BinReading> {
        vec![
            BinReading::new("b1", 28),
            BinReading::new("b2", 14),
            BinReading::new("b3", 0),
            BinReading::new("b4", 35),
        ]
    }

    #[test]
    fn report_evaluates_each_bin_in_order() {
        let report = build_report(&readings(), 28).unwrap();
        let tiers: Vec<_> = report.bins.iter().map(|b| b.status).collect();
        assert_eq!(
            tiers,
            [
                StatusTier::Low,
                StatusTier::Medium,
                StatusTier::High,
                StatusTier::Low
            ]
        );
        assert_eq!(report.bins[1].percentage, 50.0);
        assert_eq!(report.bins[2].color, "#F44336");
    }

    #[test]
    fn report_counts_tiers_and_alerts() {
        let report = build_report(&readings(), 28).unwrap();
        assert_eq!(
            report.counts,
            TierCounts {
                low: 2,
                medium: 1,
                high: 1
            }
        );
        assert_eq!(report.alerts(), 1);
    }

    #[test]
    fn invalid_capacity_fails_whole_report() {
        assert_eq!(
            build_report(&readings(), 0),
            Err(EvaluatorError::InvalidCapacity(0))
        );
    }

    #[test]
    fn empty_list_is_an_empty_report() {
        let report = build_report(&[], 28).unwrap();
        assert!(report.bins.is_empty());
        assert_eq!(report.alerts(), 0);
    }
}

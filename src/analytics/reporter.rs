//! Activity reporter — aggregates the JSONL activity log for `binwatch history`.

use std::collections::BTreeMap;

use crate::analytics::logger::{ActivityEntry, ActivityKind};

/// Per-event counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventStat {
    pub count: usize,
    pub failures: usize,
    pub avg_latency_ms: Option<f64>,
}

/// Summary of the activity log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivitySummary {
    pub total: usize,
    pub failures: usize,
    pub by_event: BTreeMap<String, EventStat>,
    /// Most recent successful bin fetch.
    pub last_fetch: Option<ActivityEntry>,
    /// Highest alert count seen in any fetch.
    pub peak_alerts: usize,
}

impl ActivitySummary {
    /// Failure percentage across all entries, 0.0 for an empty log.
    pub fn failure_pct(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.failures as f64 / self.total as f64) * 100.0
        }
    }
}

/// Aggregate a slice of log entries.
pub fn summarize(entries: &[ActivityEntry]) -> ActivitySummary {
    let mut summary = ActivitySummary {
        total: entries.len(),
        ..ActivitySummary::default()
    };

    let mut latencies: BTreeMap<String, (u64, usize)> = BTreeMap::new();

    for entry in entries {
        let key = entry.event.to_string();
        let stat = summary.by_event.entry(key.clone()).or_default();
        stat.count += 1;

        if !entry.success {
            stat.failures += 1;
            summary.failures += 1;
        }

        if let Some(ms) = entry.latency_ms {
            let slot = latencies.entry(key).or_default();
            slot.0 += ms;
            slot.1 += 1;
        }

        if entry.event == ActivityKind::FetchBins && entry.success {
            summary.peak_alerts = summary.peak_alerts.max(entry.alerts.unwrap_or(0));
            let newer = summary
                .last_fetch
                .as_ref()
                .is_none_or(|last| entry.timestamp >= last.timestamp);
            if newer {
                summary.last_fetch = Some(entry.clone());
            }
        }
    }

    for (key, (total_ms, samples)) in latencies {
        if let Some(stat) = summary.by_event.get_mut(&key) {
            stat.avg_latency_ms = Some(total_ms as f64 / samples as f64);
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn empty_log_summarizes_to_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.failure_pct(), 0.0);
        assert!(summary.last_fetch.is_none());
    }

    #[test]
    fn counts_failures_and_latency_per_event() {
        let entries = vec![
            ActivityEntry::new(ActivityKind::Login, true).with_latency(100),
            ActivityEntry::new(ActivityKind::FetchBins, true)
                .with_latency(40)
                .with_bins(6, 1),
            ActivityEntry::new(ActivityKind::FetchBins, false)
                .with_latency(60)
                .with_detail("HTTP 500"),
        ];

        let summary = summarize(&entries);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.failures, 1);

        let fetch = &summary.by_event["fetch_bins"];
        assert_eq!(fetch.count, 2);
        assert_eq!(fetch.failures, 1);
        assert_eq!(fetch.avg_latency_ms, Some(50.0));
        assert!((summary.failure_pct() - 33.333).abs() < 0.01);
    }

    #[test]
    fn last_fetch_is_most_recent_success() {
        let mut older = ActivityEntry::new(ActivityKind::FetchBins, true).with_bins(4, 3);
        older.timestamp = Utc::now() - Duration::hours(2);
        let newer = ActivityEntry::new(ActivityKind::FetchBins, true).with_bins(5, 0);
        let failed = ActivityEntry::new(ActivityKind::FetchBins, false);

        let summary = summarize(&[newer.clone(), older, failed]);
        assert_eq!(summary.last_fetch, Some(newer));
        assert_eq!(summary.peak_alerts, 3);
    }
}

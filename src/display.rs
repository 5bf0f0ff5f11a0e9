//! Read-time badges and human-readable formatting.

use crate::{config::LedgerConfig, report::Report, types::BusynessLevel};

const MINUTE_MS: u64 = 60 * 1000;
const HOUR_MS: u64 = 60 * MINUTE_MS;
const DAY_MS: u64 = 24 * HOUR_MS;

/// True when `ts_ms` is strictly younger than `threshold_ms` at `now_ms`.
pub fn is_recent(ts_ms: u64, now_ms: u64, threshold_ms: u64) -> bool {
    now_ms.saturating_sub(ts_ms) < threshold_ms
}

/// Relative age such as `"5 min ago"`.
pub fn format_time_ago(ts_ms: u64, now_ms: u64) -> String {
    let age = now_ms.saturating_sub(ts_ms);
    if age < MINUTE_MS {
        "just now".to_string()
    } else if age < HOUR_MS {
        format!("{} min ago", age / MINUTE_MS)
    } else if age < DAY_MS {
        format!("{} hr ago", age / HOUR_MS)
    } else {
        match age / DAY_MS {
            1 => "1 day ago".to_string(),
            days => format!("{days} days ago"),
        }
    }
}

/// `"350 m"` below one kilometer, `"1.2 km"` above.
pub fn format_distance(meters: u64) -> String {
    if meters < 1000 {
        format!("{meters} m")
    } else {
        format!("{:.1} km", meters as f64 / 1000.0)
    }
}

/// Header summary for a place detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceStatus {
    /// Crowd level from the latest visible report.
    pub busyness: BusynessLevel,
    /// Creation time of the latest visible report.
    pub last_updated_ms: Option<u64>,
    /// Whether the "Recent" badge applies.
    pub is_recent: bool,
    /// Visible report count.
    pub report_count: usize,
}

impl PlaceStatus {
    /// Derives the status from newest-first `reports`.
    pub fn from_reports(reports: &[&Report], now_ms: u64, config: &LedgerConfig) -> Self {
        match reports.first() {
            Some(latest) => Self {
                busyness: latest.busyness,
                last_updated_ms: Some(latest.created_at_ms),
                is_recent: is_recent(latest.created_at_ms, now_ms, config.recent_ms()),
                report_count: reports.len(),
            },
            None => Self {
                busyness: BusynessLevel::Unknown,
                last_updated_ms: None,
                is_recent: false,
                report_count: 0,
            },
        }
    }

    /// `"Last updated 5 min ago"`, or `None` without reports.
    pub fn last_updated_label(&self, now_ms: u64) -> Option<String> {
        self.last_updated_ms
            .map(|ts| format!("Last updated {}", format_time_ago(ts, now_ms)))
    }
}

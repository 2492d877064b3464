//! In-memory filtering over already-fetched jobs and candidates.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub mod candidates;
pub mod jobs;

/// Recency window for "posted within" / "active within" filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecentActivity {
    #[default]
    #[serde(rename = "any")]
    Any,
    #[serde(rename = "24h")]
    Last24Hours,
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
}

impl RecentActivity {
    pub fn window(self) -> Option<Duration> {
        match self {
            RecentActivity::Any => None,
            RecentActivity::Last24Hours => Some(Duration::hours(24)),
            RecentActivity::Last7Days => Some(Duration::days(7)),
            RecentActivity::Last30Days => Some(Duration::days(30)),
        }
    }

    /// True when `at` falls inside the window ending at `now`.
    pub fn includes(self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.window() {
            Some(window) => at >= now - window,
            None => true,
        }
    }
}

/// `"all"` (any case) and blank selections mean "no constraint".
pub(crate) fn is_all(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("all")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_boundary_is_inclusive() {
        let now = Utc::now();
        assert!(RecentActivity::Last24Hours.includes(now - Duration::hours(24), now));
        assert!(!RecentActivity::Last24Hours.includes(now - Duration::hours(25), now));
        assert!(RecentActivity::Any.includes(now - Duration::days(3650), now));
    }

    #[test]
    fn test_is_all() {
        assert!(is_all("all"));
        assert!(is_all(" ALL "));
        assert!(is_all(""));
        assert!(!is_all("Contract"));
    }
}

//! Rate-limited progress messages for image pulls.

use std::time::{Duration, Instant};

use crate::engine::PullProgress;

/// Minimum gap between two reported pull events.
pub const REPORT_INTERVAL: Duration = Duration::from_millis(250);

/// Turns a flood of pull events into at most one message per [`REPORT_INTERVAL`].
#[derive(Debug)]
pub struct PullReporter {
    last: Instant,
}

impl Default for PullReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl PullReporter {
    /// The interval starts counting now, so events in the first 250 ms are dropped.
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// The message to show for `event`, or `None` if it should be dropped.
    pub fn report(&mut self, event: &PullProgress) -> Option<String> {
        self.report_at(event, Instant::now())
    }

    fn report_at(&mut self, event: &PullProgress, now: Instant) -> Option<String> {
        if now.saturating_duration_since(self.last) < REPORT_INTERVAL {
            return None;
        }
        let detail = event.detail?;
        self.last = now;
        let percentage = match (detail.current, detail.total) {
            (Some(current), Some(total)) if total > 0 => current as f64 / total as f64 * 100.0,
            _ => 0.0,
        };
        Some(format!(
            "Pulling layer {} (status: {}): {percentage:.1}% ({}/{})",
            event.id.as_deref().unwrap_or("?"),
            event.status.as_deref().unwrap_or("?"),
            or_unknown(detail.current),
            or_unknown(detail.total),
        ))
    }
}

fn or_unknown(n: Option<i64>) -> String {
    n.map_or_else(|| "?".to_string(), |n| n.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ProgressDetail;

    fn downloading(current: Option<i64>, total: Option<i64>) -> PullProgress {
        PullProgress {
            id: Some("a1b2c3".to_string()),
            status: Some("Downloading".to_string()),
            detail: Some(ProgressDetail { current, total }),
        }
    }

    #[test]
    fn drops_events_inside_interval() {
        let start = Instant::now();
        let mut reporter = PullReporter { last: start };
        let event = downloading(Some(1), Some(2));
        assert!(reporter.report_at(&event, start + Duration::from_millis(100)).is_none());
        assert!(reporter.report_at(&event, start + Duration::from_millis(300)).is_some());
        // the window restarts from the last reported event
        assert!(reporter.report_at(&event, start + Duration::from_millis(500)).is_none());
        assert!(reporter.report_at(&event, start + Duration::from_millis(551)).is_some());
    }

    #[test]
    fn formats_percentage_and_counts() {
        let start = Instant::now();
        let mut reporter = PullReporter { last: start };
        let msg = reporter
            .report_at(&downloading(Some(512), Some(2048)), start + REPORT_INTERVAL)
            .unwrap();
        assert_eq!(
            msg,
            "Pulling layer a1b2c3 (status: Downloading): 25.0% (512/2048)"
        );
    }

    #[test]
    fn unknown_total_renders_question_mark() {
        let start = Instant::now();
        let mut reporter = PullReporter { last: start };
        let msg = reporter
            .report_at(&downloading(Some(10), None), start + REPORT_INTERVAL)
            .unwrap();
        assert!(msg.ends_with(": 0.0% (10/?)"), "got: {msg}");
    }

    #[test]
    fn events_without_detail_do_not_restart_window() {
        let start = Instant::now();
        let mut reporter = PullReporter { last: start };
        let bare = PullProgress {
            status: Some("Pulling fs layer".to_string()),
            ..Default::default()
        };
        assert!(reporter.report_at(&bare, start + REPORT_INTERVAL).is_none());
        let event = downloading(Some(1), Some(1));
        assert!(reporter
            .report_at(&event, start + REPORT_INTERVAL + Duration::from_millis(10))
            .is_some());
    }
}

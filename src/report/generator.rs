use crate::domain::format_time;
use crate::persistence::KeyValueStore;
use crate::stats::WEEKDAY_LABELS;
use crate::tracker::Tracker;
use chrono::{DateTime, Local};

/// Format seconds as "Xh Ym" or "Xm" for prose
fn format_duration(seconds: u64) -> String {
    let total_mins = seconds / 60;
    if total_mins < 60 {
        format!("{}m", total_mins)
    } else {
        let hours = total_mins / 60;
        let mins = total_mins % 60;
        if mins == 0 {
            format!("{}h", hours)
        } else {
            format!("{}h {}m", hours, mins)
        }
    }
}

/// Format percentage with 1 decimal place
fn format_percent(part: u64, whole: u64) -> String {
    if whole == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", part as f64 / whole as f64 * 100.0)
}

/// Render the dashboard numbers as a Markdown document
pub fn dashboard_markdown<S: KeyValueStore>(tracker: &Tracker<S>, generated_at: DateTime<Local>) -> String {
    let mut report = String::new();

    report.push_str(&format!("# Time Report - {}\n\n", generated_at.format("%Y-%m-%d %H:%M")));

    // Summary
    report.push_str("## Summary\n\n");
    report.push_str(&format!("- **This week:** {}\n", format_time(tracker.weekly_total())));
    report.push_str(&format!("- **This month:** {}\n", format_time(tracker.monthly_total())));
    report.push_str(&format!("- **Tasks:** {}\n", tracker.tasks().len()));

    match tracker.most_active_task() {
        Some(task) => report.push_str(&format!(
            "- **Most active task:** {} ({})\n",
            task.name,
            format_time(task.total_time())
        )),
        None => report.push_str("- **Most active task:** none yet\n"),
    }
    match tracker.most_active_category() {
        Some(total) => report.push_str(&format!(
            "- **Most active category:** {} ({})\n",
            total.category,
            format_time(total.seconds)
        )),
        None => report.push_str("- **Most active category:** none yet\n"),
    }

    if let (Some(task), Some(session)) = (tracker.active_task(), tracker.current_session()) {
        report.push_str(&format!(
            "- **Running now:** {} ({})\n",
            task.name,
            format_time(session.duration)
        ));
    }
    report.push('\n');

    // Categories
    let totals = tracker.total_time_by_category();
    if !totals.is_empty() {
        let grand_total: u64 = totals.iter().map(|t| t.seconds).sum();
        report.push_str("## Time by Category\n\n");
        report.push_str("| Category | Time | Share |\n");
        report.push_str("|----------|------|-------|\n");
        for total in &totals {
            report.push_str(&format!(
                "| {} | {} | {} |\n",
                total.category,
                format_duration(total.seconds),
                format_percent(total.seconds, grand_total)
            ));
        }
        report.push('\n');
    }

    // Weekdays
    let by_day = tracker.day_of_week_totals();
    if by_day.iter().any(|&s| s > 0) {
        report.push_str("## Activity by Weekday\n\n");
        for (label, seconds) in WEEKDAY_LABELS.iter().zip(by_day) {
            report.push_str(&format!("- {}: {}\n", label, format_duration(seconds)));
        }
        report.push('\n');
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::persistence::MemoryStore;
    use crate::tracker::TrackerOptions;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(59), "0m");
        assert_eq!(format_duration(45 * 60), "45m");
        assert_eq!(format_duration(2 * 3600), "2h");
        assert_eq!(format_duration(2 * 3600 + 5 * 60), "2h 5m");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(1, 4), "25.0%");
        assert_eq!(format_percent(1, 0), "0.0%");
    }

    #[test]
    fn test_empty_dashboard() {
        let now = Local.with_ymd_and_hms(2024, 8, 1, 12, 0, 0).unwrap();
        let clock = ManualClock::new(now);
        let tracker =
            Tracker::open_with_clock(MemoryStore::new(), TrackerOptions::default(), Box::new(clock)).unwrap();

        let report = dashboard_markdown(&tracker, now);
        assert!(report.starts_with("# Time Report - 2024-08-01 12:00"));
        assert!(report.contains("- **Most active task:** none yet"));
        assert!(!report.contains("## Time by Category"));
    }

    #[test]
    fn test_dashboard_with_activity() {
        let now = Local.with_ymd_and_hms(2024, 8, 1, 12, 0, 0).unwrap();
        let clock = ManualClock::new(now);
        let mut tracker =
            Tracker::open_with_clock(MemoryStore::new(), TrackerOptions::default(), Box::new(clock.clone()))
                .unwrap();
        let task = tracker.add_task("Write report", "work", "").unwrap();
        tracker.start_timer(&task.id).unwrap();
        clock.advance(Duration::seconds(125));
        tracker.stop_timer().unwrap();

        let report = dashboard_markdown(&tracker, clock.now());
        assert!(report.contains("- **This week:** 00:02:05"));
        assert!(report.contains("- **Most active task:** Write report (00:02:05)"));
        assert!(report.contains("| work | 2m | 100.0% |"));
        assert!(report.contains("- Thu: 2m"));
    }
}

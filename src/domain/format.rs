use chrono::{DateTime, Local};

/// Format seconds as zero-padded `HH:MM:SS` (hours are not capped at 99)
pub fn format_time(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let remaining = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, remaining)
}

/// Format a timestamp as a calendar date, e.g. "Mar 14, 2024"
pub fn format_date(date: DateTime<Local>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Format a timestamp as a wall-clock time, e.g. "09:05"
pub fn format_clock(date: DateTime<Local>) -> String {
    date.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00:00");
        assert_eq!(format_time(125), "00:02:05");
        assert_eq!(format_time(3600), "01:00:00");
        assert_eq!(format_time(86_399), "23:59:59");
        assert_eq!(format_time(360_000), "100:00:00");
    }

    #[test]
    fn test_format_date_and_clock() {
        let date = Local.with_ymd_and_hms(2024, 3, 4, 9, 5, 0).unwrap();
        assert_eq!(format_date(date), "Mar 4, 2024");
        assert_eq!(format_clock(date), "09:05");
    }
}

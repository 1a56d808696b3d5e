use crate::domain::{format_clock, format_date, format_time, Task};

/// Quote a CSV field when it needs it
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Export a task's finalized sessions as CSV, newest first.
///
/// The file starts with a short preamble (task, category, total), a blank line,
/// then the header row and one row per session.
pub fn export_sessions_csv(task: &Task) -> String {
    let mut out = String::new();

    out.push_str(&format!("Task,{}\n", csv_field(&task.name)));
    out.push_str(&format!("Category,{}\n", csv_field(&task.category)));
    out.push_str(&format!("Total time,{}\n", format_time(task.total_time())));
    out.push('\n');
    out.push_str("Date,Start,End,Duration\n");

    for session in task.sessions_newest_first() {
        let end = session
            .end_time
            .map(format_clock)
            .unwrap_or_else(|| "-".to_string());
        let row = [
            csv_field(&format_date(session.start_time)),
            format_clock(session.start_time),
            end,
            format_time(session.duration),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// File name offered for an export
pub fn export_file_name(task: &Task) -> String {
    let stem: String = task
        .name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    format!("{}-sessions.csv", stem.trim_matches('-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimeSession;
    use chrono::{DateTime, Duration, Local, TimeZone};
    use pretty_assertions::assert_eq;

    fn at(d: u32, h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, d, h, m, 0).unwrap()
    }

    #[test]
    fn test_export_sessions_csv() {
        let mut task = Task::new("Write, edit".to_string(), "work".to_string(), String::new(), at(1, 8, 0));
        for (start, secs) in [(at(4, 9, 0), 125), (at(5, 14, 30), 3600)] {
            let mut session = TimeSession::begin(start);
            session.finalize(start + Duration::seconds(secs));
            task.commit_session(session);
        }

        let csv = export_sessions_csv(&task);
        let expected = "\
Task,\"Write, edit\"
Category,work
Total time,01:02:05

Date,Start,End,Duration
\"Mar 5, 2024\",14:30,15:30,01:00:00
\"Mar 4, 2024\",09:00,09:02,00:02:05
";
        assert_eq!(csv, expected);
    }

    #[test]
    fn test_export_without_sessions_has_header_only() {
        let task = Task::new("Idle".to_string(), "other".to_string(), String::new(), at(1, 8, 0));
        let csv = export_sessions_csv(&task);
        assert!(csv.ends_with("Date,Start,End,Duration\n"));
    }

    #[test]
    fn test_export_file_name() {
        let task = Task::new("Write report!".to_string(), "work".to_string(), String::new(), at(1, 8, 0));
        assert_eq!(export_file_name(&task), "Write-report-sessions.csv");
    }
}

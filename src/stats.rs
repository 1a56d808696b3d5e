use crate::domain::Task;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

/// First day of the calendar week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

/// Summed time for one category name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub seconds: u64,
}

/// Total time per category name, in order of first appearance
pub fn total_time_by_category(tasks: &[Task]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for task in tasks {
        match totals.iter_mut().find(|t| t.category == task.category) {
            Some(entry) => entry.seconds += task.total_time(),
            None => totals.push(CategoryTotal {
                category: task.category.clone(),
                seconds: task.total_time(),
            }),
        }
    }

    totals
}

/// Task with the most recorded time; the first one wins a tie
pub fn most_active_task(tasks: &[Task]) -> Option<&Task> {
    let mut best: Option<&Task> = None;
    for task in tasks {
        match best {
            Some(current) if task.total_time() <= current.total_time() => {}
            _ => best = Some(task),
        }
    }
    best
}

/// Category with the most recorded time; the first one wins a tie
pub fn most_active_category(tasks: &[Task]) -> Option<CategoryTotal> {
    let mut best: Option<CategoryTotal> = None;
    for total in total_time_by_category(tasks) {
        match &best {
            Some(current) if total.seconds <= current.seconds => {}
            _ => best = Some(total),
        }
    }
    best
}

/// Local midnight at the start of `date`
fn local_midnight(date: NaiveDate) -> DateTime<Local> {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    match midnight.and_local_timezone(Local).earliest() {
        Some(start) => start,
        // Midnight fell into a DST gap
        None => Local.from_utc_datetime(&midnight),
    }
}

/// Local midnight on the first day of the week containing `now`
pub fn start_of_week(now: DateTime<Local>, week_start: WeekStart) -> DateTime<Local> {
    let today = now.date_naive();
    let offset = match week_start {
        WeekStart::Sunday => today.weekday().num_days_from_sunday(),
        WeekStart::Monday => today.weekday().num_days_from_monday(),
    };
    local_midnight(today - Duration::days(offset as i64))
}

/// Local midnight on the first day of the month containing `now`
pub fn start_of_month(now: DateTime<Local>) -> DateTime<Local> {
    let today = now.date_naive();
    let first = today.with_day(1).unwrap_or(today);
    local_midnight(first)
}

/// Seconds from sessions whose start lies within `[since, until]`
pub fn total_between(tasks: &[Task], since: DateTime<Local>, until: DateTime<Local>) -> u64 {
    tasks
        .iter()
        .flat_map(|task| task.sessions())
        .filter(|s| s.start_time >= since && s.start_time <= until)
        .map(|s| s.duration)
        .sum()
}

/// Seconds recorded since the start of the current week
pub fn weekly_total(tasks: &[Task], now: DateTime<Local>, week_start: WeekStart) -> u64 {
    total_between(tasks, start_of_week(now, week_start), now)
}

/// Seconds recorded since the start of the current month
pub fn monthly_total(tasks: &[Task], now: DateTime<Local>) -> u64 {
    total_between(tasks, start_of_month(now), now)
}

/// Seconds per weekday across all sessions, Sunday first
pub fn day_of_week_totals(tasks: &[Task]) -> [u64; 7] {
    let mut totals = [0u64; 7];
    for session in tasks.iter().flat_map(|task| task.sessions()) {
        let index = session.start_time.weekday().num_days_from_sunday() as usize;
        totals[index] += session.duration;
    }
    totals
}

/// Short weekday labels matching [`day_of_week_totals`]
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

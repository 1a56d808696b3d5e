use crate::domain::{format_date, format_time, TaskUpdate};
use crate::engine::StartOutcome;
use crate::persistence::{atomic_write, KeyValueStore};
use crate::report::{dashboard_markdown, export_file_name, export_sessions_csv};
use crate::stats::WEEKDAY_LABELS;
use crate::tracker::Tracker;
use crate::validate;
use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "timetrack", version)]
#[command(about = "A calm, local-first time tracker with tasks, categories and a live timer", long_about = None)]
pub struct Cli {
    /// Data directory (defaults to the nearest .timetrack, then ~/.timetrack)
    #[arg(long, global = true, env = "TIMETRACK_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a local .timetrack directory in the current directory
    Init,
    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    /// Manage categories
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },
    /// Start the timer for a task (stops any other running timer)
    Start {
        /// Task id or unique id prefix
        task: String,
    },
    /// Stop the running timer
    Stop,
    /// Show the running timer
    Status,
    /// Show dashboard statistics
    Stats,
    /// Export a task's sessions as CSV
    Export {
        /// Task id or unique id prefix
        task: String,
        /// Output file path. Defaults to <task-name>-sessions.csv
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the dashboard as a Markdown report
    Report {
        /// Output file path. Prints to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Open the live terminal view (default)
    Watch,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Create a task
    Add {
        name: String,
        #[arg(short, long, default_value = "work")]
        category: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Edit a task's name, category or description
    Edit {
        task: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a task (stops its timer first)
    Rm { task: String },
    /// Show a task and its sessions
    Show { task: String },
    /// List tasks
    List {
        /// Case-insensitive search in name and description
        #[arg(short, long, default_value = "")]
        search: String,
        /// Only tasks in this category
        #[arg(short, long)]
        category: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    /// Add a category
    Add {
        name: String,
        /// Hex color like #4361EE
        #[arg(long, default_value = "#4CC9F0")]
        color: String,
    },
    /// List categories
    List,
}

/// Execute a non-interactive command against an opened tracker
pub fn run<S: KeyValueStore>(command: Command, tracker: &mut Tracker<S>) -> Result<()> {
    match command {
        Command::Task { command } => handle_task(command, tracker),
        Command::Category { command } => handle_category(command, tracker),
        Command::Start { task } => handle_start(&task, tracker),
        Command::Stop => handle_stop(tracker),
        Command::Status => {
            handle_status(tracker);
            Ok(())
        }
        Command::Stats => {
            handle_stats(tracker);
            Ok(())
        }
        Command::Export { task, output } => handle_export(&task, output, tracker),
        Command::Report { output } => handle_report(output, tracker),
        Command::Init | Command::Watch => Ok(()),
    }
}

fn resolve<S: KeyValueStore>(task: &str, tracker: &Tracker<S>) -> Option<String> {
    let resolved = tracker.resolve_task_id(task).map(str::to_string);
    if resolved.is_none() {
        println!("Task '{}' not found (or the prefix is ambiguous).", task);
    }
    resolved
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn handle_task<S: KeyValueStore>(command: TaskCommand, tracker: &mut Tracker<S>) -> Result<()> {
    match command {
        TaskCommand::Add {
            name,
            category,
            description,
        } => {
            let name = match validate::task_fields(&name, &category, &description) {
                Ok(name) => name,
                Err(e) => {
                    println!("{}", e);
                    return Ok(());
                }
            };
            let category = category.trim().to_lowercase();
            if tracker.find_category(&category).is_none() {
                println!("Note: category '{}' is not defined yet.", category);
            }
            let task = tracker.add_task(name, &category, description.trim())?;
            println!("Task created: {} \"{}\"", short_id(&task.id), task.name);
        }
        TaskCommand::Edit {
            task,
            name,
            category,
            description,
        } => {
            let Some(id) = resolve(&task, tracker) else {
                return Ok(());
            };
            let name = match name.as_deref().map(validate::task_name).transpose() {
                Ok(name) => name.map(str::to_string),
                Err(e) => {
                    println!("{}", e);
                    return Ok(());
                }
            };
            if let Some(Err(e)) = description.as_deref().map(validate::description) {
                println!("{}", e);
                return Ok(());
            }
            let update = TaskUpdate {
                name,
                category: category.map(|c| c.trim().to_lowercase()),
                description: description.map(|d| d.trim().to_string()),
            };
            if update.is_empty() {
                println!("Nothing to change.");
                return Ok(());
            }
            if tracker.update_task(&id, &update)?.is_some() {
                println!("Task updated.");
            }
        }
        TaskCommand::Rm { task } => {
            let Some(id) = resolve(&task, tracker) else {
                return Ok(());
            };
            let was_running = tracker.active_task().map(|t| t.id == id).unwrap_or(false);
            if let Some(removed) = tracker.delete_task(&id)? {
                if was_running {
                    println!("Stopped the running timer.");
                }
                println!("Task deleted: \"{}\"", removed.name);
            }
        }
        TaskCommand::Show { task } => {
            let Some(id) = resolve(&task, tracker) else {
                return Ok(());
            };
            tracker.refresh();
            if let Some(task) = tracker.get_task_by_id(&id) {
                println!("{} ({})", task.name, task.id);
                println!("  Category:    {}", task.category);
                if !task.description.is_empty() {
                    println!("  Description: {}", task.description);
                }
                println!("  Created:     {}", format_date(task.created_at));
                println!("  Total time:  {}", format_time(task.total_time()));
                if tracker.active_task().map(|t| t.id == id).unwrap_or(false) {
                    if let Some(session) = tracker.current_session() {
                        println!("  Running:     {}", format_time(session.duration));
                    }
                }
                println!("  Sessions:    {}", task.sessions().len());
                for session in task.sessions_newest_first() {
                    let end = session
                        .end_time
                        .map(|t| t.format("%H:%M").to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "    {}  {} - {}  {}",
                        format_date(session.start_time),
                        session.start_time.format("%H:%M"),
                        end,
                        format_time(session.duration)
                    );
                }
            }
        }
        TaskCommand::List { search, category } => {
            tracker.refresh();
            let active_id = tracker.active_task().map(|t| t.id.clone());
            let tasks = tracker.tasks_filtered(&search, category.as_deref());
            if tasks.is_empty() {
                println!("No tasks.");
                return Ok(());
            }
            for task in tasks {
                let marker = if active_id.as_deref() == Some(task.id.as_str()) { "▶" } else { " " };
                println!(
                    "{} {}  {:<30}  {:<10}  {}",
                    marker,
                    short_id(&task.id),
                    task.name,
                    task.category,
                    format_time(task.total_time())
                );
            }
        }
    }
    Ok(())
}

fn handle_category<S: KeyValueStore>(command: CategoryCommand, tracker: &mut Tracker<S>) -> Result<()> {
    match command {
        CategoryCommand::Add { name, color } => {
            let name = match validate::new_category(&name, &color, tracker.categories()) {
                Ok(name) => name.to_string(),
                Err(e) => {
                    println!("{}", e);
                    return Ok(());
                }
            };
            let category = tracker.add_category(&name, &color)?;
            println!("Category added: {} {}", category.name, category.color);
        }
        CategoryCommand::List => {
            let totals = tracker.total_time_by_category();
            for category in tracker.categories() {
                let seconds = totals
                    .iter()
                    .find(|t| t.category == category.name)
                    .map(|t| t.seconds)
                    .unwrap_or(0);
                println!("{:<12} {}  {}", category.name, category.color, format_time(seconds));
            }
        }
    }
    Ok(())
}

fn handle_start<S: KeyValueStore>(task: &str, tracker: &mut Tracker<S>) -> Result<()> {
    let Some(id) = resolve(task, tracker) else {
        return Ok(());
    };
    match tracker.start_timer(&id)? {
        StartOutcome::Started { previous } => {
            if let Some(previous) = previous {
                let name = tracker
                    .get_task_by_id(&previous.task_id)
                    .map(|t| t.name.clone())
                    .unwrap_or_default();
                println!(
                    "Timer stopped: recorded {} for \"{}\".",
                    format_time(previous.session.duration),
                    name
                );
            }
            if let Some(task) = tracker.active_task() {
                println!("Timer started: tracking time for \"{}\".", task.name);
            }
        }
        StartOutcome::AlreadyRunning => println!("Timer is already running for this task."),
        StartOutcome::UnknownTask => println!("Task '{}' not found.", task),
    }
    Ok(())
}

fn handle_stop<S: KeyValueStore>(tracker: &mut Tracker<S>) -> Result<()> {
    match tracker.stop_timer()? {
        Some(stopped) => {
            let name = tracker
                .get_task_by_id(&stopped.task_id)
                .map(|t| t.name.clone())
                .unwrap_or_default();
            println!(
                "Timer stopped: recorded {} for \"{}\".",
                format_time(stopped.session.duration),
                name
            );
        }
        None => println!("No timer is running."),
    }
    Ok(())
}

fn handle_status<S: KeyValueStore>(tracker: &mut Tracker<S>) {
    tracker.refresh();
    match (tracker.active_task(), tracker.current_session()) {
        (Some(task), Some(session)) => println!(
            "▶ {}  [{}]  {}  (since {})",
            task.name,
            task.category,
            format_time(session.duration),
            session.start_time.format("%Y-%m-%d %H:%M")
        ),
        _ => println!("No timer is running."),
    }
}

fn handle_stats<S: KeyValueStore>(tracker: &Tracker<S>) {
    println!("This week:   {}", format_time(tracker.weekly_total()));
    println!("This month:  {}", format_time(tracker.monthly_total()));
    match tracker.most_active_task() {
        Some(task) => println!("Top task:    {} ({})", task.name, format_time(task.total_time())),
        None => println!("Top task:    -"),
    }
    match tracker.most_active_category() {
        Some(total) => println!("Top category: {} ({})", total.category, format_time(total.seconds)),
        None => println!("Top category: -"),
    }

    let totals = tracker.total_time_by_category();
    if !totals.is_empty() {
        println!();
        println!("By category:");
        for total in totals {
            println!("  {:<12} {}", total.category, format_time(total.seconds));
        }
    }

    println!();
    println!("By weekday:");
    for (label, seconds) in WEEKDAY_LABELS.iter().zip(tracker.day_of_week_totals()) {
        println!("  {}  {}", label, format_time(seconds));
    }
}

fn handle_export<S: KeyValueStore>(task: &str, output: Option<PathBuf>, tracker: &Tracker<S>) -> Result<()> {
    let Some(id) = resolve(task, tracker) else {
        return Ok(());
    };
    let Some(task) = tracker.get_task_by_id(&id) else {
        return Ok(());
    };
    if task.sessions().is_empty() {
        println!("\"{}\" has no sessions to export.", task.name);
        return Ok(());
    }

    let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(task)));
    // Byte order mark keeps spreadsheet apps from guessing the encoding
    let content = format!("\u{feff}{}", export_sessions_csv(task));
    atomic_write(&path, &content).with_context(|| format!("Failed to export to {}", path.display()))?;
    println!("Exported {} sessions to {}", task.sessions().len(), path.display());
    Ok(())
}

fn handle_report<S: KeyValueStore>(output: Option<PathBuf>, tracker: &mut Tracker<S>) -> Result<()> {
    tracker.refresh();
    let report = dashboard_markdown(tracker, Local::now());
    match output {
        Some(path) => {
            atomic_write(&path, &report).with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("Report generated: {}", path.display());
        }
        None => print!("{}", report),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::persistence::MemoryStore;
    use crate::tracker::TrackerOptions;
    use chrono::{Duration, TimeZone};

    fn tracker() -> (Tracker<MemoryStore>, ManualClock) {
        let clock = ManualClock::new(Local.with_ymd_and_hms(2024, 9, 2, 9, 0, 0).unwrap());
        let tracker =
            Tracker::open_with_clock(MemoryStore::new(), TrackerOptions::default(), Box::new(clock.clone()))
                .unwrap();
        (tracker, clock)
    }

    #[test]
    fn test_cli_parses_task_add() {
        let cli = Cli::try_parse_from(["timetrack", "task", "add", "Write report", "-c", "work"]).unwrap();
        match cli.command {
            Some(Command::Task {
                command: TaskCommand::Add { name, category, .. },
            }) => {
                assert_eq!(name, "Write report");
                assert_eq!(category, "work");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_data_dir_flag() {
        let cli = Cli::try_parse_from(["timetrack", "--data-dir", "/tmp/tt", "status"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/tt")));
    }

    #[test]
    fn test_add_rejects_short_name() {
        let (mut tracker, _) = tracker();
        run(
            Command::Task {
                command: TaskCommand::Add {
                    name: "x".to_string(),
                    category: "work".to_string(),
                    description: String::new(),
                },
            },
            &mut tracker,
        )
        .unwrap();
        assert!(tracker.tasks().is_empty());
    }

    #[test]
    fn test_start_stop_by_prefix() {
        let (mut tracker, clock) = tracker();
        let task = tracker.add_task("Write report", "work", "").unwrap();

        run(Command::Start { task: task.id[..6].to_string() }, &mut tracker).unwrap();
        assert!(tracker.is_timer_running());

        clock.advance(Duration::seconds(90));
        run(Command::Stop, &mut tracker).unwrap();
        assert_eq!(tracker.get_task_by_id(&task.id).unwrap().total_time(), 90);
    }

    #[test]
    fn test_category_add_rejects_duplicate() {
        let (mut tracker, _) = tracker();
        let before = tracker.categories().len();
        run(
            Command::Category {
                command: CategoryCommand::Add {
                    name: "Work".to_string(),
                    color: "#000000".to_string(),
                },
            },
            &mut tracker,
        )
        .unwrap();
        assert_eq!(tracker.categories().len(), before);
    }

    #[test]
    fn test_edit_and_remove() {
        let (mut tracker, _) = tracker();
        let task = tracker.add_task("Draft", "work", "").unwrap();

        run(
            Command::Task {
                command: TaskCommand::Edit {
                    task: task.id.clone(),
                    name: Some("  Final  ".to_string()),
                    category: Some("Study".to_string()),
                    description: None,
                },
            },
            &mut tracker,
        )
        .unwrap();
        let edited = tracker.get_task_by_id(&task.id).unwrap();
        assert_eq!(edited.name, "Final");
        assert_eq!(edited.category, "study");

        run(Command::Task { command: TaskCommand::Rm { task: task.id.clone() } }, &mut tracker).unwrap();
        assert!(tracker.get_task_by_id(&task.id).is_none());
    }

    #[test]
    fn test_export_writes_csv() {
        let (mut tracker, clock) = tracker();
        let task = tracker.add_task("Write report", "work", "").unwrap();
        tracker.start_timer(&task.id).unwrap();
        clock.advance(Duration::seconds(125));
        tracker.stop_timer().unwrap();

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out.csv");
        run(
            Command::Export {
                task: task.id.clone(),
                output: Some(path.clone()),
            },
            &mut tracker,
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with('\u{feff}'));
        assert!(content.contains("00:02:05"));
    }
}

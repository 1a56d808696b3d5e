use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use timetrack::app::App;
use timetrack::cli::{self, Cli, Command};
use timetrack::config::{resolve_data_dir, Settings};
use timetrack::persistence::{init_local_data_dir, FileStore};
use timetrack::{input, logging, ticker, ui, Tracker};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Init) = cli.command {
        let data_dir = init_local_data_dir(&std::env::current_dir()?)?;
        println!("Initialized timetrack directory: {}", data_dir.display());
        println!();
        println!("timetrack will now use this local directory for task storage.");
        println!("Run 'timetrack task add <name>' to create your first task.");
        return Ok(());
    }

    let data_dir = resolve_data_dir(cli.data_dir)?;
    let (settings, settings_error) = Settings::load_or_default(&data_dir);
    logging::init_tracing(&settings.log_filter)?;
    if let Some(e) = settings_error {
        tracing::warn!(error = %format!("{:#}", e), "ignoring settings, using defaults");
    }
    tracing::debug!(dir = %data_dir.display(), "using data directory");

    let storage = FileStore::open(&data_dir)?;
    let mut tracker = Tracker::open(storage, settings.tracker_options())?;

    match cli.command {
        None | Some(Command::Watch) => run_tui(tracker),
        Some(command) => cli::run(command, &mut tracker),
    }
}

fn run_tui(tracker: Tracker<FileStore>) -> Result<()> {
    let mut app = App::new(tracker);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(task) = app.tracker.active_task() {
        println!("Timer still running for \"{}\". Run 'timetrack stop' to record it.", task.name);
    }

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App<FileStore>) -> Result<()> {
    let idle_rate = ticker::tick_duration();

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Wake up for the next timer tick, or at the idle rate when nothing runs
        let timeout = app
            .tracker
            .until_next_tick()
            .unwrap_or(idle_rate)
            .to_std()
            .unwrap_or_default();

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press && input::handle_key(app, key)? {
                    return Ok(());
                }
            }
        }

        app.tick();
    }
}

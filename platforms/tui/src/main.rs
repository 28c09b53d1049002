mod app;

use action::Action;
use app::App;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::time::Instant;
use std::{error::Error, fs, io};
use turing_engine::DefinitionLoader;

/// A single-tape Turing machine simulator with a Terminal User Interface.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  turing-tui machines/palindrome.tm
  cat machines/binary-increment.tm | turing-tui")]
struct Cli {
    /// Path to a machine definition file (.tm).
    /// If not provided, the built-in machines are loaded.
    /// A definition can also be piped via stdin.
    definition_file: Option<String>,
}

/// Represents the state of the application loop.
#[derive(PartialEq)]
enum AppState {
    Running,
    ShouldQuit,
}

/// A wrapper around the terminal to ensure it's restored on drop.
struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl Tui {
    /// Creates a new TUI, switching the terminal to raw mode and the alternate screen.
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        // Errors are ignored, the terminal is being torn down anyway.
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // Load before entering the alternate screen so errors reach stderr.
    let app = match load_definition(&cli) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut tui = Tui::new()?;
    run_app(&mut tui.terminal, app)?;

    Ok(())
}

/// Loads from the file argument, then from stdin, and finally falls back to the built-in
/// machines.
fn load_definition(cli: &Cli) -> Result<App, String> {
    if let Some(file_path) = &cli.definition_file {
        fs::File::open(file_path)
            .map_err(|e| e.to_string())
            .and_then(|file| DefinitionLoader::read_source(file).map_err(|e| e.to_string()))
            .map_err(|e| format!("Failed to read file '{}': {}", file_path, e))
            .and_then(App::new_from_definition_string)
    } else if atty::isnt(atty::Stream::Stdin) {
        DefinitionLoader::read_source(io::stdin().lock())
            .map_err(|e| format!("Failed to read from stdin: {}", e))
            .and_then(App::new_from_definition_string)
    } else {
        App::new_default()
    }
}

/// Runs the main application loop.
///
/// Polls for key events until the next auto-run step is due, then reports the elapsed time
/// to the app so it can take the steps that became due.
fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| app.render(f))?;

        if event::poll(app.poll_timeout())? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && handle_key_event(&mut app, key) == AppState::ShouldQuit
                {
                    return Ok(());
                }
            }
        }

        let now = Instant::now();
        app.tick(now - last_tick);
        last_tick = now;
    }
}

/// Handles key events and updates the application state.
fn handle_key_event(app: &mut App, key: KeyEvent) -> AppState {
    if let Some(action) = app.keymap.get(&key) {
        match action {
            Action::Quit => return AppState::ShouldQuit,
            Action::Reset => app.reset_machine(),
            Action::Initialize => app.initialize_machine(),
            Action::Step => app.step_machine(),
            Action::ToggleAutoRun => app.toggle_auto_run(),
            Action::ToggleHelp => app.toggle_help(),
            Action::PreviousPreset => app.previous_preset(),
            Action::NextPreset => app.next_preset(),
            Action::ScrollUp => app.scroll_up(),
            Action::ScrollDown => app.scroll_down(),
        }
    }
    AppState::Running
}

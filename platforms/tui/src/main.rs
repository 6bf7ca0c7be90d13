mod app;

use action::Action;
use app::App;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::Read;
use std::{error::Error, io, time::Duration};
use tmch::types::{DEFAULT_MAX_STEPS, FIRST_LABEL};
use tmch::MachineConfig;

/// Strip length used by the interactive view, in bytes.
const TUI_STRIP_LEN: usize = 256;

/// A bit-packed Turing machine executor with a Terminal User Interface.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  tmch-tui 1RB1LB_1LA1RZ
  echo 1RB1LC_1RC1RB_1RD0LE_1LA1LD_1RZ0LA | tmch-tui --strip-len 4096")]
struct Cli {
    /// Compact transition table, e.g. 1RB1LB_1LA1RZ.
    /// If not provided, the application will load the built-in programs.
    /// Can also pipe the table via stdin.
    table: Option<String>,

    /// Strip length in bytes
    #[clap(long, default_value_t = TUI_STRIP_LEN)]
    strip_len: usize,

    /// Initial head bit offset (defaults to the middle of the strip)
    #[clap(long, allow_hyphen_values = true)]
    start_bit: Option<i64>,

    /// Label of the initial state
    #[clap(long, default_value_t = FIRST_LABEL)]
    initial_state: char,

    /// Maximum number of steps before the run is cut off
    #[clap(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: u64,
}

impl Cli {
    fn config(&self) -> MachineConfig {
        MachineConfig {
            strip_len: self.strip_len,
            start_bit: self.start_bit,
            initial_state: self.initial_state,
            max_steps: self.max_steps,
        }
    }
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
    /// Creates a new TUI.
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
        // Restore the terminal to its original state.
        // The results are ignored as we can't do much about errors during drop.
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

    // Load the program before initializing the TUI.
    // This way, if loading fails, we can print the error to stderr without
    // interfering with the terminal's alternate screen.
    let app = match load_program(&cli) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize the TUI. The `Tui` struct will handle cleanup on drop.
    let mut tui = Tui::new()?;

    // Run the application.
    run_app(&mut tui.terminal, app)?;

    Ok(())
}

/// Loads a transition table based on CLI arguments.
///
/// It tries the table argument, then stdin, and finally
/// falls back to the built-in programs.
fn load_program(cli: &Cli) -> Result<App, String> {
    let config = cli.config();
    if let Some(table) = &cli.table {
        App::new_from_table_string(table.clone(), config)
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))
            .and_then(|_| App::new_from_table_string(buffer, config))
    } else {
        App::new_default(config)
    }
}

/// Runs the main application loop.
fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        let timeout = if app.is_running() {
            Duration::from_millis(16) // Keep the key loop responsive while running
        } else {
            Duration::from_millis(100) // Slower updates when idle
        };

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if handle_key_event(&mut app, key) == AppState::ShouldQuit {
                    return Ok(());
                }
            }
        }

        if app.is_running() {
            app.tick();
        }
    }
}

/// Handles key events and updates the application state.
fn handle_key_event(app: &mut App, key: KeyEvent) -> AppState {
    if let Some(action) = app.keymap.get(&key) {
        match action {
            Action::Quit => return AppState::ShouldQuit,
            Action::Reset => app.reset_machine(),
            Action::Step => app.step_machine(),
            Action::Run => app.run_machine(),
            Action::ToggleHelp => app.toggle_help(),
            Action::PreviousProgram => app.previous_program(),
            Action::NextProgram => app.next_program(),
            Action::ScrollUp => app.scroll_up(),
            Action::ScrollDown => app.scroll_down(),
        }
    }
    AppState::Running
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_config() {
        let cli = Cli::parse_from(["tmch-tui", "1RB1LB_1LA1RZ", "--strip-len", "32"]);

        assert_eq!(cli.table.as_deref(), Some("1RB1LB_1LA1RZ"));
        assert_eq!(cli.config().strip_len, 32);
        assert_eq!(cli.config().start_head(), 128);
        assert!(load_program(&cli).is_ok());
    }

    #[test]
    fn test_invalid_table_is_reported() {
        let cli = Cli::parse_from(["tmch-tui", "1RB1LB_"]);
        assert!(load_program(&cli)
            .err()
            .is_some_and(|e| e.starts_with("Failed to load table")));
    }
}

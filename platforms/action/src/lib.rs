//! Key bindings and the interactive run controller shared by the front-ends.

mod controller;

pub use controller::{Controller, Mode, Progress};

use keymap::KeyMap;

#[derive(KeyMap, Clone, Copy, Debug, PartialEq)]
pub enum Action {
    /// Quit the application
    #[key("q")]
    Quit,
    /// Reset the machine to its initial state
    #[key("x")]
    Reset,
    /// Advance the machine by one step
    #[key("space")]
    Step,
    /// Run the machine until it stops
    #[key("r")]
    Run,
    /// Toggle help display
    #[key("h")]
    ToggleHelp,
    /// Load the previous program
    #[key("left")]
    PreviousProgram,
    /// Load the next program
    #[key("right")]
    NextProgram,
    /// Scroll strip view up
    #[key("up")]
    ScrollUp,
    /// Scroll strip view down
    #[key("down")]
    ScrollDown,
}

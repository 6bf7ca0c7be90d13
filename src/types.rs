//! This module defines the core value types shared by the table, the strip and the step
//! engine: symbols, directions, states, transitions, stop reasons and the error type.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The label used for the halt state in compact notation.
pub const HALT_LABEL: char = 'Z';
/// The label of the first state. Labels are assigned alphabetically from here.
pub const FIRST_LABEL: char = 'A';
/// The largest number of states a table can have (`A` through `Y`, `Z` is reserved for halt).
pub const MAX_STATES: usize = 25;
/// The default strip length in bytes.
pub const DEFAULT_STRIP_LEN: usize = 1 << 12;
/// The default maximum number of steps for a batch run.
pub const DEFAULT_MAX_STEPS: u64 = 100_000_000;

/// A single cell value on the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Zero,
    One,
}

impl Symbol {
    /// Returns the symbol as a bit value (`0` or `1`).
    pub fn bit(self) -> u8 {
        match self {
            Symbol::Zero => 0,
            Symbol::One => 1,
        }
    }
}

impl From<bool> for Symbol {
    fn from(bit: bool) -> Self {
        if bit {
            Symbol::One
        } else {
            Symbol::Zero
        }
    }
}

impl TryFrom<char> for Symbol {
    type Error = TuringMachineError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '0' => Ok(Symbol::Zero),
            '1' => Ok(Symbol::One),
            _ => Err(TuringMachineError::MalformedTable(format!(
                "Unsupported symbol: {c}"
            ))),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bit())
    }
}

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one bit to the left.
    Left,
    /// Move the head one bit to the right.
    Right,
}

impl Direction {
    /// The head offset applied by this direction.
    pub fn delta(self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }
}

impl TryFrom<char> for Direction {
    type Error = TuringMachineError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'L' => Ok(Direction::Left),
            'R' => Ok(Direction::Right),
            _ => Err(TuringMachineError::InvalidDirection(c)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
        }
    }
}

/// A machine state.
///
/// Active states are dense indices into the transition table. The external letters
/// (`A`, `B`, ...) are resolved by [`crate::TransitionTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    Active(usize),
    Halt,
}

impl State {
    /// Returns the table index of an active state, or `None` for the halt state.
    pub fn index(self) -> Option<usize> {
        match self {
            State::Active(index) => Some(index),
            State::Halt => None,
        }
    }

    pub fn is_halt(self) -> bool {
        self == State::Halt
    }
}

/// A single transition rule: what to write, where to move and which state comes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The symbol written under the head.
    pub write: Symbol,
    /// The direction the head moves after writing.
    pub direction: Direction,
    /// The state the machine transitions to.
    pub next_state: State,
}

impl Transition {
    pub fn new(write: Symbol, direction: Direction, next_state: State) -> Self {
        Self {
            write,
            direction,
            next_state,
        }
    }
}

/// Why a run stopped.
///
/// None of these are errors: boundary and limit stops are routine outcomes for many
/// valid machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The machine entered the halt state.
    Halted,
    /// The step counter reached the caller supplied limit.
    StepLimitExceeded,
    /// The head moved below bit 0.
    ReachedLeftEdge,
    /// The head moved past the last bit of the strip.
    ReachedRightEdge,
}

/// Represents various errors that can occur while building or running a machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TuringMachineError {
    /// The transition table description is structurally inconsistent.
    #[error("Malformed transition table: {0}")]
    MalformedTable(String),
    /// The requested strip cannot be allocated or addressed.
    #[error("Invalid strip length: {0} bytes")]
    InvalidStripLength(usize),
    /// A rule specifies a movement other than left or right.
    #[error("Invalid direction: {0:?}")]
    InvalidDirection(char),
    /// The configured initial state is not defined by the table.
    #[error("Invalid state: {0}")]
    InvalidState(char),
    /// `step` was called after the machine reached the halt state.
    #[error("Machine has already halted")]
    AlreadyHalted,
    /// No built-in program has the requested name or index.
    #[error("Unknown program: {0}")]
    UnknownProgram(String),
    /// `step` was called while the head is outside the strip.
    #[error("Head at bit {0} is outside the strip")]
    HeadOutOfBounds(i64),
}

//! This crate provides the core of a bit-packed Turing machine executor.
//! It includes modules for parsing compact transition tables, stepping a machine over a
//! fixed-size strip, analyzing tables, rendering strips, and a catalog of well-known machines.

pub mod analyzer;
pub mod config;
pub mod encoder;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod strip;
pub mod table;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisWarning` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisWarning};
/// Re-exports the run configuration.
pub use config::MachineConfig;
/// Re-exports the rendering functions from the encoder module.
pub use encoder::{encode, hex_dump};
/// Re-exports the step engine and its outcome types from the machine module.
pub use machine::{RunReport, StepOutcome, TuringMachine};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `Program`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{Program, ProgramManager, PROGRAMS};
/// Re-exports the bit-packed strip.
pub use strip::Strip;
/// Re-exports the transition table.
pub use table::TransitionTable;
/// Re-exports the value types and the error type from the types module.
pub use types::{Direction, State, StopReason, Symbol, Transition, TuringMachineError};

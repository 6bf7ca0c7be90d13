//! This module renders machines for display: the strip as a hex dump and applied transitions
//! and stop reasons as short messages. Compact table notation is produced by the `Display`
//! implementation of [`TransitionTable`].
//!
//! The hex dump prints bits left-to-right: each byte is shown with its bits reversed, so the
//! first symbol of a byte (bit 0) is the most significant nibble digit on screen.

use crate::machine::{RunReport, TuringMachine};
use crate::strip::Strip;
use crate::table::TransitionTable;
use crate::types::{StopReason, Transition};
use std::fmt;

/// Bytes shown per hex dump row.
pub const BYTES_PER_ROW: usize = 16;

/// Encodes a table into compact notation.
pub fn encode(table: &TransitionTable) -> String {
    table.to_string()
}

/// One displayed byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpCell {
    /// The byte with its bits reversed, so it reads left-to-right.
    pub value: u8,
    /// The head's bit offset within this byte, if the head is here.
    pub head: Option<u8>,
}

/// One row of the hex dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpRow {
    /// Byte offset of the first cell.
    pub offset: usize,
    pub cells: Vec<DumpCell>,
}

impl fmt::Display for DumpRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}    ", self.offset)?;
        for cell in &self.cells {
            match cell.head {
                Some(bit) => write!(f, "({bit})")?,
                None => write!(f, "  ")?,
            }
            write!(f, "{:02X} ", cell.value)?;
        }
        Ok(())
    }
}

/// Returns the hex dump rows of `strip` with the head at bit `head`.
pub fn dump_rows(strip: &Strip, head: i64) -> Vec<DumpRow> {
    let head_byte = (head >= 0).then(|| (head / 8) as usize);

    strip
        .bytes()
        .chunks(BYTES_PER_ROW)
        .enumerate()
        .map(|(row, bytes)| {
            let offset = row * BYTES_PER_ROW;
            let cells = bytes
                .iter()
                .enumerate()
                .map(|(i, &byte)| DumpCell {
                    value: byte.reverse_bits(),
                    head: (head_byte == Some(offset + i)).then(|| (head % 8) as u8),
                })
                .collect();
            DumpRow { offset, cells }
        })
        .collect()
}

/// Renders the whole strip as a hex dump, one row per line.
pub fn hex_dump(strip: &Strip, head: i64) -> String {
    dump_rows(strip, head)
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Describes an applied transition, e.g. `Wrote 1, moved right, into state B.`
pub fn describe_transition(table: &TransitionTable, transition: &Transition) -> String {
    format!(
        "Wrote {}, moved {}, into state {}.",
        transition.write,
        transition.direction,
        table.label(transition.next_state)
    )
}

/// Describes why a run stopped.
pub fn describe_stop(report: &RunReport, max_steps: u64) -> String {
    match report.reason {
        StopReason::Halted => format!("Turing machine halted after {} steps.", report.steps),
        StopReason::StepLimitExceeded => {
            format!("Turing machine terminated after max steps {max_steps}.")
        }
        StopReason::ReachedLeftEdge => {
            format!("Head ran off the left after {} steps.", report.steps)
        }
        StopReason::ReachedRightEdge => {
            format!("Head ran off the right after {} steps.", report.steps)
        }
    }
}

/// One-line status of a machine: state, head, steps and ones.
pub fn describe_machine(machine: &TuringMachine) -> String {
    format!(
        "State: {} | Head: {} | Steps: {} | Ones: {}",
        machine.state_label(),
        machine.head(),
        machine.step_count(),
        machine.ones()
    )
}

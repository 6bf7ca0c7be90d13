//! This module defines the `TuringMachine` struct, the step engine. It owns the current state,
//! the bit-addressed head, the step counter, the strip and the transition table, and executes
//! transitions one at a time or until a stop condition fires.
//!
//! Boundary policy: the write of the step that moves the head off the strip is applied, and
//! the out-of-range head is detected before any further step. No read or write ever happens
//! outside the strip.

use crate::config::MachineConfig;
use crate::strip::Strip;
use crate::table::TransitionTable;
use crate::types::{State, StopReason, Symbol, Transition, TuringMachineError};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::{debug, trace};

/// The result of a single `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// The rule that was applied.
    pub transition: Transition,
    /// The head position after the move.
    pub head: i64,
    /// The state after the transition.
    pub state: State,
    /// The step counter after the step.
    pub steps: u64,
}

/// The result of `run_to_completion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub reason: StopReason,
    pub steps: u64,
}

/// A single-tape, binary-symbol Turing machine over a fixed bit-packed strip.
#[derive(Debug, Clone)]
pub struct TuringMachine {
    state: State,
    head: i64,
    step_count: u64,
    strip: Strip,
    table: TransitionTable,
    initial_state: State,
    initial_head: i64,
}

impl TuringMachine {
    /// Creates a machine in the table's first state with a zeroed strip of `strip_len` bytes.
    ///
    /// `head` may lie outside the strip; the machine then reports a boundary stop before its
    /// first step.
    ///
    /// # Returns
    ///
    /// * `Err(TuringMachineError::InvalidStripLength)` if `strip_len` is zero, too long to
    ///   address or cannot be allocated.
    pub fn new(
        table: TransitionTable,
        strip_len: usize,
        head: i64,
    ) -> Result<Self, TuringMachineError> {
        Ok(Self::with_strip(table, Strip::new(strip_len)?, head))
    }

    /// Creates a machine from a [`MachineConfig`].
    ///
    /// # Returns
    ///
    /// * `Err(TuringMachineError::InvalidStripLength)` if the configured strip is empty,
    ///   too long to address or cannot be allocated.
    /// * `Err(TuringMachineError::InvalidState)` if the initial state label is not defined
    ///   by the table.
    pub fn with_config(
        table: TransitionTable,
        config: &MachineConfig,
    ) -> Result<Self, TuringMachineError> {
        let initial_state = table
            .state_of(config.initial_state)
            .ok_or(TuringMachineError::InvalidState(config.initial_state))?;

        // The strip must be valid before the middle bit is derived from its length.
        let strip = Strip::new(config.strip_len)?;
        let mut machine = Self::with_strip(table, strip, config.start_head());
        machine.state = initial_state;
        machine.initial_state = initial_state;

        Ok(machine)
    }

    fn with_strip(table: TransitionTable, strip: Strip, head: i64) -> Self {
        debug!(
            states = table.state_count(),
            strip_len = strip.len(),
            head,
            "created machine"
        );

        Self {
            state: State::Active(0),
            head,
            step_count: 0,
            strip,
            table,
            initial_state: State::Active(0),
            initial_head: head,
        }
    }

    /// Executes a single transition.
    ///
    /// Reads the bit under the head, looks up the rule for the current state, writes the
    /// rule's symbol (a `0` clears the bit), moves the head, adopts the next state and
    /// increments the step counter.
    ///
    /// # Returns
    ///
    /// * `Ok(StepOutcome)` with the applied rule and the new head, state and step count.
    /// * `Err(TuringMachineError::AlreadyHalted)` if the machine is in the halt state.
    /// * `Err(TuringMachineError::HeadOutOfBounds)` if the head is outside the strip.
    pub fn step(&mut self) -> Result<StepOutcome, TuringMachineError> {
        let index = self
            .state
            .index()
            .ok_or(TuringMachineError::AlreadyHalted)?;
        let symbol = self
            .strip
            .get(self.head)
            .ok_or(TuringMachineError::HeadOutOfBounds(self.head))?;

        let transition = *self.table.lookup(index, symbol);

        self.strip.set(self.head, transition.write);
        self.head += transition.direction.delta();
        self.state = transition.next_state;
        self.step_count += 1;

        trace!(
            step = self.step_count,
            read = symbol.bit(),
            write = transition.write.bit(),
            direction = %transition.direction,
            head = self.head,
            "step"
        );

        Ok(StepOutcome {
            transition,
            head: self.head,
            state: self.state,
            steps: self.step_count,
        })
    }

    /// Returns the domain stop condition that currently applies, if any.
    ///
    /// Checked in priority order: halt state, then left edge, then right edge. The step
    /// limit is not a property of the machine and is checked by [`Self::run_to_completion`].
    pub fn stop_reason(&self) -> Option<StopReason> {
        if self.state.is_halt() {
            Some(StopReason::Halted)
        } else if self.head < 0 {
            Some(StopReason::ReachedLeftEdge)
        } else if self.head >= self.strip.bit_len() {
            Some(StopReason::ReachedRightEdge)
        } else {
            None
        }
    }

    /// Runs until the machine halts, the head leaves the strip, or the step counter reaches
    /// `max_steps`.
    ///
    /// Stop conditions are checked before every step in priority order: halted, step limit,
    /// left edge, right edge. `max_steps` is compared with the total step count, so a stopped
    /// run can be resumed with a larger limit.
    ///
    /// # Returns
    ///
    /// * `Ok(RunReport)` with the stop reason and the final step count.
    /// * `Err(TuringMachineError)` if a step fails; the run is aborted.
    pub fn run_to_completion(&mut self, max_steps: u64) -> Result<RunReport, TuringMachineError> {
        debug!(
            max_steps,
            steps = self.step_count,
            head = self.head,
            "running machine"
        );

        let reason = loop {
            if let Some(reason) = self.check_stop(max_steps) {
                break reason;
            }
            self.step()?;
        };

        debug!(?reason, steps = self.step_count, "machine stopped");

        Ok(RunReport {
            reason,
            steps: self.step_count,
        })
    }

    /// Stop conditions in run-loop priority order.
    pub fn check_stop(&self, max_steps: u64) -> Option<StopReason> {
        match self.stop_reason() {
            Some(StopReason::Halted) => Some(StopReason::Halted),
            _ if self.step_count >= max_steps => Some(StopReason::StepLimitExceeded),
            reason => reason,
        }
    }

    /// Resets the machine to its initial configuration.
    /// This includes resetting the state, head position, strip and step count.
    pub fn reset(&mut self) {
        self.state = self.initial_state;
        self.head = self.initial_head;
        self.step_count = 0;
        self.strip.clear();
    }

    /// Returns the current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns the external letter of the current state.
    pub fn state_label(&self) -> char {
        self.table.label(self.state)
    }

    /// Returns the head position in bits.
    pub fn head(&self) -> i64 {
        self.head
    }

    /// Returns the total number of steps executed.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Checks if the machine is in the halt state.
    pub fn is_halted(&self) -> bool {
        self.state.is_halt()
    }

    /// The symbol under the head, or `None` if the head is off the strip.
    pub fn symbol(&self) -> Option<Symbol> {
        self.strip.get(self.head)
    }

    pub fn strip(&self) -> &Strip {
        &self.strip
    }

    /// A byte-range view of the strip for rendering.
    pub fn strip_bytes(&self, range: Range<usize>) -> &[u8] {
        self.strip.view(range)
    }

    /// Number of `1` symbols on the strip.
    pub fn ones(&self) -> u64 {
        self.strip.count_ones()
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    fn build(table: &str, strip_len: usize, head: i64) -> TuringMachine {
        TuringMachine::new(table.parse().unwrap(), strip_len, head).unwrap()
    }

    #[test]
    fn test_machine_creation() {
        let machine = build("1RB1LA_1LZ1RB", 2, 8);

        assert_eq!(machine.state(), State::Active(0));
        assert_eq!(machine.state_label(), 'A');
        assert_eq!(machine.head(), 8);
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.strip().bytes(), &[0, 0]);
    }

    #[test]
    fn test_zero_strip_length_is_rejected() {
        let result = TuringMachine::new("1RZ1RZ".parse().unwrap(), 0, 0);
        assert!(matches!(
            result,
            Err(TuringMachineError::InvalidStripLength(0))
        ));
    }

    #[test]
    fn test_single_step() {
        let mut machine = build("1RB1LA_1LZ1RB", 2, 8);

        let outcome = machine.step().unwrap();

        assert_eq!(
            outcome.transition,
            Transition::new(Symbol::One, Direction::Right, State::Active(1))
        );
        assert_eq!(outcome.head, 9);
        assert_eq!(outcome.state, State::Active(1));
        assert_eq!(outcome.steps, 1);
        assert_eq!(machine.strip().bytes(), &[0x00, 0x01]);
    }

    #[test]
    fn test_two_state_scenario() {
        let mut machine = build("1RB1LA_1LZ1RB", 2, 8);

        let report = machine.run_to_completion(1_000).unwrap();

        assert_eq!(report.reason, StopReason::Halted);
        assert_eq!(report.steps, 2);
        assert_eq!(machine.strip().bytes(), &[0x00, 0x03]);
        // 8 -> 9 -> 8
        assert_eq!(machine.head(), 8);
        assert!(machine.is_halted());
    }

    #[test]
    fn test_step_after_halt_is_rejected() {
        let mut machine = build("1RB1LA_1LZ1RB", 2, 8);
        machine.run_to_completion(10).unwrap();

        assert_eq!(machine.step(), Err(TuringMachineError::AlreadyHalted));
        assert_eq!(machine.step_count(), 2);
    }

    #[test]
    fn test_zero_write_erases() {
        // A: write 1, move right, go to B. B: move back left and erase it, then halt.
        let mut machine = build("1RB1RZ_0LZ0LZ", 1, 0);
        machine.step().unwrap();
        assert_eq!(machine.strip().bytes(), &[0x01]);

        let outcome = machine.step().unwrap();
        assert_eq!(outcome.state, State::Halt);
        assert_eq!(machine.head(), 0);
        assert_eq!(machine.strip().bytes(), &[0x01]);

        let mut machine = build("1RB0LA_0LA1RZ", 1, 0);
        let report = machine.run_to_completion(100).unwrap();
        // A0 writes 1 at bit 0, B0 at bit 1 writes 0 and returns, A1 clears bit 0 and walks off.
        assert_eq!(report.reason, StopReason::ReachedLeftEdge);
        assert_eq!(machine.strip().bytes(), &[0x00]);
    }

    #[test]
    fn test_left_edge_applies_triggering_write() {
        let mut machine = build("1RB1LB_1LA1RZ", 1, 0);

        let report = machine.run_to_completion(100).unwrap();

        assert_eq!(report.reason, StopReason::ReachedLeftEdge);
        assert_eq!(report.steps, 3);
        assert_eq!(machine.head(), -1);
        assert_eq!(machine.strip().bytes(), &[0x03]);
    }

    #[test]
    fn test_right_edge_applies_triggering_write() {
        let mut machine = build("1RB1LB_1LA1RZ", 1, 7);

        let report = machine.run_to_completion(100).unwrap();

        assert_eq!(report.reason, StopReason::ReachedRightEdge);
        assert_eq!(report.steps, 1);
        assert_eq!(machine.head(), 8);
        assert_eq!(machine.strip().bytes(), &[0x80]);
        assert_eq!(machine.step(), Err(TuringMachineError::HeadOutOfBounds(8)));
        assert_eq!(machine.step_count(), 1);
    }

    #[test]
    fn test_start_outside_strip_stops_immediately() {
        let mut machine = build("1RB1LB_1LA1RZ", 1, -5);
        let report = machine.run_to_completion(100).unwrap();

        assert_eq!(report.reason, StopReason::ReachedLeftEdge);
        assert_eq!(report.steps, 0);
    }

    #[test]
    fn test_step_limit() {
        let mut machine = build("1RB0RA_1LA0LB", 2, 8);

        let report = machine.run_to_completion(10).unwrap();

        assert_eq!(report.reason, StopReason::StepLimitExceeded);
        assert_eq!(report.steps, 10);
        assert_eq!(machine.head(), 12);
        assert_eq!(machine.strip().bytes(), &[0x00, 0x30]);
    }

    #[test]
    fn test_step_limit_is_resumable() {
        let mut machine = build("1RB1LB_1LA1RZ", 64, 256);

        let report = machine.run_to_completion(4).unwrap();
        assert_eq!(report.reason, StopReason::StepLimitExceeded);
        assert_eq!(report.steps, 4);

        let report = machine.run_to_completion(1_000).unwrap();
        assert_eq!(report.reason, StopReason::Halted);
        assert_eq!(report.steps, 6);
    }

    #[test]
    fn test_halt_takes_priority_over_limit() {
        let mut machine = build("1RB1LA_1LZ1RB", 2, 8);

        let report = machine.run_to_completion(2).unwrap();

        assert_eq!(report.reason, StopReason::Halted);
        assert_eq!(report.steps, 2);
    }

    #[test]
    fn test_limit_takes_priority_over_edge() {
        let mut machine = build("1RB1LB_1LA1RZ", 1, 7);

        let report = machine.run_to_completion(1).unwrap();

        assert_eq!(report.reason, StopReason::StepLimitExceeded);
        assert_eq!(machine.stop_reason(), Some(StopReason::ReachedRightEdge));
    }

    #[test]
    fn test_with_config() {
        let config = MachineConfig {
            strip_len: 2,
            start_bit: None,
            initial_state: 'B',
            max_steps: 50,
        };

        let machine =
            TuringMachine::with_config("1RB1LA_1LZ1RB".parse().unwrap(), &config).unwrap();

        assert_eq!(machine.state(), State::Active(1));
        assert_eq!(machine.head(), 8);
    }

    #[test]
    fn test_with_config_unknown_state() {
        let config = MachineConfig {
            initial_state: 'Q',
            ..MachineConfig::default()
        };

        let result = TuringMachine::with_config("1RB1LA_1LZ1RB".parse().unwrap(), &config);
        assert!(matches!(result, Err(TuringMachineError::InvalidState('Q'))));
    }

    #[test]
    fn test_with_config_unaddressable_strip() {
        let config = MachineConfig {
            strip_len: usize::MAX,
            ..MachineConfig::default()
        };

        let result = TuringMachine::with_config("1RB1LA_1LZ1RB".parse().unwrap(), &config);
        assert!(matches!(
            result,
            Err(TuringMachineError::InvalidStripLength(usize::MAX))
        ));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_unallocatable_strip_is_rejected() {
        let result = TuringMachine::new("1RB1LA_1LZ1RB".parse().unwrap(), 1usize << 59, 0);
        assert!(matches!(
            result,
            Err(TuringMachineError::InvalidStripLength(len)) if len == 1usize << 59
        ));
    }

    #[test]
    fn test_reset() {
        let mut machine = build("1RB1LA_1LZ1RB", 2, 8);
        machine.run_to_completion(100).unwrap();

        machine.reset();

        assert_eq!(machine.state(), State::Active(0));
        assert_eq!(machine.head(), 8);
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.strip().bytes(), &[0, 0]);
    }

    #[test]
    fn test_inspection_does_not_mutate() {
        let mut machine = build("1RB1LA_1LZ1RB", 2, 8);
        machine.step().unwrap();

        assert_eq!(machine.symbol(), Some(Symbol::Zero));
        assert_eq!(machine.strip_bytes(1..2), &[0x01]);
        assert_eq!(machine.ones(), 1);
        assert_eq!(machine.head(), 9);
        assert_eq!(machine.step_count(), 1);
    }

    #[test]
    fn test_run_report_serialization() {
        let report = RunReport {
            reason: StopReason::Halted,
            steps: 6,
        };
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["reason"], "Halted");
        assert_eq!(json["steps"], 6);
    }
}

//! The immutable transition table.
//!
//! Rules are stored densely, two per state, at index `2 * state + symbol`. State letters are
//! only an external representation: the table maps them to dense indices once, at
//! construction time.

use crate::parser;
use crate::types::{
    State, Symbol, Transition, TuringMachineError, FIRST_LABEL, HALT_LABEL, MAX_STATES,
};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Maps every (state, symbol) pair to the rule that governs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    transitions: Vec<Transition>,
    labels: Vec<char>,
    indices: HashMap<char, usize>,
}

impl TransitionTable {
    /// Builds a table from explicit rules in canonical order: state 0 reading 0, state 0
    /// reading 1, state 1 reading 0, and so on.
    ///
    /// # Returns
    ///
    /// * `Ok(TransitionTable)` if the rules describe a complete table.
    /// * `Err(TuringMachineError::MalformedTable)` if the list is empty or odd, names more
    ///   states than can be labelled, or references a next state the table does not define.
    pub fn new(transitions: Vec<Transition>) -> Result<Self, TuringMachineError> {
        if transitions.is_empty() || transitions.len() % 2 != 0 {
            return Err(TuringMachineError::MalformedTable(format!(
                "Expected two rules per state, got {} rules",
                transitions.len()
            )));
        }

        let state_count = transitions.len() / 2;
        if state_count > MAX_STATES {
            return Err(TuringMachineError::MalformedTable(format!(
                "Too many states: {state_count} (at most {MAX_STATES})"
            )));
        }

        if let Some((position, transition)) = transitions.iter().enumerate().find(|(_, t)| {
            t.next_state
                .index()
                .is_some_and(|index| index >= state_count)
        }) {
            return Err(TuringMachineError::MalformedTable(format!(
                "Rule {position} references undefined state {:?}",
                transition.next_state
            )));
        }

        let labels: Vec<char> = (0..state_count)
            .filter_map(|i| char::from_u32(FIRST_LABEL as u32 + i as u32))
            .collect();
        let indices = labels.iter().enumerate().map(|(i, &c)| (c, i)).collect();

        tracing::debug!(states = state_count, "built transition table");

        Ok(Self {
            transitions,
            labels,
            indices,
        })
    }

    /// Parses compact notation. See [`parser::parse`].
    pub fn from_compact(input: &str) -> Result<Self, TuringMachineError> {
        parser::parse(input)
    }

    /// Returns the rule for `state` reading `symbol`.
    ///
    /// `state` must be below [`Self::state_count`]; the step engine never looks up the halt
    /// state or an index the table did not validate.
    pub fn lookup(&self, state: usize, symbol: Symbol) -> &Transition {
        &self.transitions[2 * state + symbol.bit() as usize]
    }

    /// Number of non-halt states.
    pub fn state_count(&self) -> usize {
        self.labels.len()
    }

    /// All rules in canonical order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// The external letter of `state`.
    pub fn label(&self, state: State) -> char {
        match state {
            State::Active(index) => self.labels.get(index).copied().unwrap_or('?'),
            State::Halt => HALT_LABEL,
        }
    }

    /// Resolves an external letter to a state.
    pub fn state_of(&self, label: char) -> Option<State> {
        if label == HALT_LABEL {
            return Some(State::Halt);
        }
        self.indices.get(&label).map(|&index| State::Active(index))
    }
}

impl FromStr for TransitionTable {
    type Err = TuringMachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse(s)
    }
}

/// Renders the table in compact notation.
impl fmt::Display for TransitionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (state, rules) in self.transitions.chunks(2).enumerate() {
            if state > 0 {
                write!(f, "_")?;
            }
            for rule in rules {
                write!(
                    f,
                    "{}{}{}",
                    rule.write,
                    rule.direction.letter(),
                    self.label(rule.next_state)
                )?;
            }
        }
        Ok(())
    }
}

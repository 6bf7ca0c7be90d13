//! This module provides static checks over a transition table. None of the findings prevent a
//! machine from running; they flag tables that can never halt or that carry dead states, so
//! front-ends can warn before spending a long step budget.

use crate::table::TransitionTable;
use crate::types::State;
use std::collections::HashSet;
use thiserror::Error;

/// Represents the findings of [`analyze`].
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum AnalysisWarning {
    /// No rule in the table transitions to the halt state.
    #[error("No rule transitions to the halt state; the machine can only stop at an edge or the step limit")]
    NoHaltTransition,
    /// A halt transition exists, but no state reachable from the initial state uses it.
    #[error("The halt state is not reachable from state {0}")]
    HaltUnreachable(char),
    /// States that cannot be reached from the initial state.
    #[error("Unreachable states: {0:?}")]
    UnreachableStates(Vec<char>),
}

/// Analyzes `table` for a machine starting in `initial_state`.
///
/// # Returns
///
/// * The list of findings, empty if the table looks sound.
pub fn analyze(table: &TransitionTable, initial_state: State) -> Vec<AnalysisWarning> {
    [check_halt_transition, check_reachability]
        .iter()
        .flat_map(|check| check(table, initial_state))
        .collect()
}

/// Checks that at least one rule leads to the halt state.
fn check_halt_transition(table: &TransitionTable, _: State) -> Vec<AnalysisWarning> {
    if table.transitions().iter().any(|t| t.next_state.is_halt()) {
        Vec::new()
    } else {
        vec![AnalysisWarning::NoHaltTransition]
    }
}

/// Walks the state graph from `initial_state` and reports states it never visits, and
/// whether the halt state is among the visited ones.
fn check_reachability(table: &TransitionTable, initial_state: State) -> Vec<AnalysisWarning> {
    let start = match initial_state.index() {
        Some(index) if index < table.state_count() => index,
        _ => return Vec::new(),
    };

    let mut visited = HashSet::from([start]);
    let mut pending = vec![start];
    let mut halts = false;

    while let Some(index) = pending.pop() {
        for rule in &table.transitions()[2 * index..2 * index + 2] {
            match rule.next_state {
                State::Halt => halts = true,
                State::Active(next) => {
                    if visited.insert(next) {
                        pending.push(next);
                    }
                }
            }
        }
    }

    let mut warnings = Vec::new();

    let has_halt_rule = table.transitions().iter().any(|t| t.next_state.is_halt());
    if has_halt_rule && !halts {
        warnings.push(AnalysisWarning::HaltUnreachable(table.label(initial_state)));
    }

    let unreachable: Vec<char> = (0..table.state_count())
        .filter(|index| !visited.contains(index))
        .map(|index| table.label(State::Active(index)))
        .collect();
    if !unreachable.is_empty() {
        warnings.push(AnalysisWarning::UnreachableStates(unreachable));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(compact: &str) -> TransitionTable {
        compact.parse().unwrap()
    }

    #[test]
    fn test_sound_table() {
        let warnings = analyze(&table("1RB1LC_1RC1RB_1RD0LE_1LA1LD_1RZ0LA"), State::Active(0));
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn test_no_halt_transition() {
        let warnings = analyze(&table("1RB0RA_1LA0LB"), State::Active(0));
        assert_eq!(warnings, vec![AnalysisWarning::NoHaltTransition]);
    }

    #[test]
    fn test_unreachable_states() {
        let warnings = analyze(&table("1RA1RZ_1LB1LB_1LC1LC"), State::Active(0));
        assert_eq!(
            warnings,
            vec![AnalysisWarning::UnreachableStates(vec!['B', 'C'])]
        );
    }

    #[test]
    fn test_halt_unreachable_from_initial_state() {
        let warnings = analyze(&table("1RA1RA_1LZ1LB"), State::Active(0));
        assert_eq!(
            warnings,
            vec![
                AnalysisWarning::HaltUnreachable('A'),
                AnalysisWarning::UnreachableStates(vec!['B']),
            ]
        );
    }

    #[test]
    fn test_other_initial_state() {
        let warnings = analyze(&table("1RA1RA_1LZ1LB"), State::Active(1));
        assert_eq!(
            warnings,
            vec![AnalysisWarning::UnreachableStates(vec!['A'])]
        );
    }

    #[test]
    fn test_undefined_initial_state() {
        let warnings = analyze(&table("1RB1LB_1LA1RZ"), State::Active(99));
        assert!(warnings.is_empty(), "{warnings:?}");

        let warnings = analyze(&table("1RB0RA_1LA0LB"), State::Active(99));
        assert_eq!(warnings, vec![AnalysisWarning::NoHaltTransition]);
    }

    #[test]
    fn test_warning_display() {
        let msg = AnalysisWarning::UnreachableStates(vec!['C']).to_string();
        assert!(msg.contains("Unreachable states"));
    }
}

//! This module provides the parser for compact transition table notation, utilizing the `pest`
//! crate. The grammar lives in `grammar.pest`; this module validates the parse tree and turns it
//! into a [`TransitionTable`].

use crate::{
    table::TransitionTable,
    types::{
        Direction, State, Symbol, Transition, TuringMachineError, FIRST_LABEL, HALT_LABEL,
        MAX_STATES,
    },
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;

/// Characters per state, counting the delimiter that follows every segment but the last.
pub const SEGMENT_LEN: usize = 7;

/// Derives a `PestParser` for the compact table grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct CompactTableParser;

/// Parses compact notation such as `1RB1LB_1LA1RZ` into a [`TransitionTable`].
///
/// The state count is derived from the input length and must account for every
/// character: `state_count * 7 == len + 1`. Anything else is a `MalformedTable` error,
/// as are write symbols other than `0`/`1` and next states that are neither defined
/// nor the halt letter `Z`. A direction other than `L`/`R` is an `InvalidDirection` error.
///
/// # Arguments
///
/// * `input` - The compact table description. Surrounding whitespace is ignored.
pub fn parse(input: &str) -> Result<TransitionTable, TuringMachineError> {
    let input = input.trim();
    let state_count = check_length(input)?;

    let root = CompactTableParser::parse(Rule::table, input)
        .map_err(|e| TuringMachineError::MalformedTable(e.to_string()))?
        .next()
        .ok_or_else(|| TuringMachineError::MalformedTable("Empty table".to_string()))?;

    let mut transitions = Vec::with_capacity(2 * state_count);
    for segment in root.into_inner().filter(|p| p.as_rule() == Rule::segment) {
        for pair in segment.into_inner() {
            transitions.push(parse_transition(pair, state_count)?);
        }
    }

    TransitionTable::new(transitions)
}

/// Verifies that the input length is an exact multiple of the segment length and
/// returns the implied number of states.
fn check_length(input: &str) -> Result<usize, TuringMachineError> {
    let len = input.chars().count();
    let state_count = (len + 1) / SEGMENT_LEN;

    if state_count == 0 || state_count * SEGMENT_LEN != len + 1 {
        return Err(TuringMachineError::MalformedTable(format!(
            "Length {len} does not describe a whole number of states \
             ({} characters per state, separated by '_')",
            SEGMENT_LEN - 1
        )));
    }

    if state_count > MAX_STATES {
        return Err(TuringMachineError::MalformedTable(format!(
            "Too many states: {state_count} (at most {MAX_STATES})"
        )));
    }

    Ok(state_count)
}

/// Parses a single `write direction next-state` rule.
fn parse_transition(
    pair: Pair<Rule>,
    state_count: usize,
) -> Result<Transition, TuringMachineError> {
    let mut cells = pair.into_inner();
    let (symbol_pair, direction_pair, state_pair) =
        match (cells.next(), cells.next(), cells.next()) {
            (Some(symbol), Some(direction), Some(state)) => (symbol, direction, state),
            _ => {
                return Err(TuringMachineError::MalformedTable(
                    "Incomplete transition".to_string(),
                ))
            }
        };

    let write = Symbol::try_from(cell_char(&symbol_pair)).map_err(|_| {
        malformed(
            &format!("Unsupported symbol: {}", symbol_pair.as_str()),
            symbol_pair.as_span(),
        )
    })?;
    let direction = Direction::try_from(cell_char(&direction_pair))?;
    let next_state = parse_state(&state_pair, state_count)?;

    Ok(Transition::new(write, direction, next_state))
}

/// Resolves a next-state letter against the implied state alphabet.
fn parse_state(pair: &Pair<Rule>, state_count: usize) -> Result<State, TuringMachineError> {
    let label = cell_char(pair);
    if label == HALT_LABEL {
        return Ok(State::Halt);
    }

    let index = (label as u32).wrapping_sub(FIRST_LABEL as u32) as usize;
    if index < state_count {
        Ok(State::Active(index))
    } else {
        Err(malformed(
            &format!("Undefined next state: {label}"),
            pair.as_span(),
        ))
    }
}

/// Creates a `MalformedTable` error that points at the offending `Span`.
fn malformed(msg: &str, span: Span) -> TuringMachineError {
    let error = Error::<Rule>::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    );
    TuringMachineError::MalformedTable(error.to_string())
}

fn cell_char(pair: &Pair<Rule>) -> char {
    pair.as_str().chars().next().unwrap_or_default()
}

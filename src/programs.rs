//! A catalog of well-known machines, parsed once on first use.

use crate::table::TransitionTable;
use crate::types::TuringMachineError;

// Name and compact table of each built-in machine.
const PROGRAM_TEXTS: [(&str, &str); 6] = [
    ("bb2", "1RB1LB_1LA1RZ"),
    ("bb3", "1RB1RZ_1LB0RC_1LC1LA"),
    ("bb4", "1RB1LB_1LA0LC_1RZ1LD_1RD0RA"),
    ("bb5", "1RB1LC_1RC1RB_1RD0LE_1LA1LD_1RZ0LA"),
    ("drifter", "1LB0RA_1RA1LB"),
    ("shuttle", "1RB1RB_1LA0LA"),
];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<Program> = PROGRAM_TEXTS
        .iter()
        .filter_map(|&(name, table)| match TransitionTable::from_compact(table) {
            Ok(table) => Some(Program { name, table }),
            Err(e) => {
                tracing::warn!(name, error = %e, "failed to parse built-in program");
                None
            }
        })
        .collect();
}

/// A named built-in machine.
#[derive(Debug, Clone)]
pub struct Program {
    pub name: &'static str,
    pub table: TransitionTable,
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<&'static Program, TuringMachineError> {
        PROGRAMS
            .get(index)
            .ok_or_else(|| TuringMachineError::UnknownProgram(format!("#{index}")))
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<&'static Program, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|program| program.name == name)
            .ok_or_else(|| TuringMachineError::UnknownProgram(name.to_string()))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<&'static str> {
        PROGRAMS.iter().map(|program| program.name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::TuringMachine;
    use crate::types::StopReason;

    fn run(name: &str, strip_len: usize, max_steps: u64) -> (StopReason, u64, u64) {
        let program = ProgramManager::get_program_by_name(name).unwrap();
        let head = crate::config::middle_bit(strip_len);
        let mut machine = TuringMachine::new(program.table.clone(), strip_len, head).unwrap();
        let report = machine.run_to_completion(max_steps).unwrap();
        (report.reason, report.steps, machine.ones())
    }

    #[test]
    fn test_all_programs_parse() {
        assert_eq!(ProgramManager::count(), PROGRAM_TEXTS.len());
        for (name, table) in PROGRAM_TEXTS {
            let program = ProgramManager::get_program_by_name(name).unwrap();
            assert_eq!(program.table.to_string(), table);
        }
    }

    #[test]
    fn test_program_names() {
        let names = ProgramManager::list_program_names();
        assert_eq!(names, vec!["bb2", "bb3", "bb4", "bb5", "drifter", "shuttle"]);
    }

    #[test]
    fn test_program_lookup_errors() {
        assert!(ProgramManager::get_program_by_index(0).is_ok());
        assert!(ProgramManager::get_program_by_index(999).is_err());
        assert!(ProgramManager::get_program_by_name("Nonexistent").is_err());
    }

    #[test]
    fn test_busy_beaver_2() {
        assert_eq!(run("bb2", 64, 1_000), (StopReason::Halted, 6, 4));
    }

    #[test]
    fn test_busy_beaver_3() {
        assert_eq!(run("bb3", 64, 1_000), (StopReason::Halted, 21, 5));
    }

    #[test]
    fn test_busy_beaver_4() {
        assert_eq!(run("bb4", 64, 1_000), (StopReason::Halted, 107, 13));
    }

    #[test]
    #[ignore = "runs 47 million steps"]
    fn test_busy_beaver_5() {
        assert_eq!(
            run("bb5", 1 << 12, 100_000_000),
            (StopReason::Halted, 47_176_870, 4098)
        );
    }

    #[test]
    fn test_drifter_runs_off_the_right() {
        let (reason, steps, _) = run("drifter", 64, 5_000);
        assert_eq!(reason, StopReason::ReachedRightEdge);
        assert_eq!(steps, 768);
    }

    #[test]
    fn test_shuttle_never_halts() {
        let (reason, steps, _) = run("shuttle", 64, 5_000);
        assert_eq!(reason, StopReason::StepLimitExceeded);
        assert_eq!(steps, 5_000);
    }
}

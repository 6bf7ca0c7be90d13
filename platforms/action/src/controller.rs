//! The two-mode controller that drives a machine from external triggers.
//!
//! In `Stepping` mode every step trigger executes exactly one step. A run trigger switches to
//! `Running`, after which each `tick` executes a batch of steps until the machine stops. A run
//! never returns to `Stepping`; only `reset` starts a new run.

use tmch::{RunReport, StepOutcome, TuringMachine, TuringMachineError};
use tracing::debug;

/// The controller mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Stepping,
    Running,
}

/// What a trigger or tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// One step was executed.
    Stepped(StepOutcome),
    /// A batch was executed and the machine is still running.
    Running,
    /// The machine has stopped; no further steps will be executed in this run.
    Stopped(RunReport),
    /// Nothing to do in the current mode.
    Idle,
}

/// Drives a [`TuringMachine`] one trigger at a time.
#[derive(Debug, Clone)]
pub struct Controller {
    mode: Mode,
    max_steps: u64,
    batch: u64,
    report: Option<RunReport>,
}

impl Controller {
    /// Creates a controller in `Stepping` mode.
    ///
    /// `max_steps` bounds the whole run; `batch` is the number of steps per `tick` once
    /// running (at least one).
    pub fn new(max_steps: u64, batch: u64) -> Self {
        Self {
            mode: Mode::Stepping,
            max_steps,
            batch: batch.max(1),
            report: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn max_steps(&self) -> u64 {
        self.max_steps
    }

    /// The stop report, once the run has stopped.
    pub fn report(&self) -> Option<RunReport> {
        self.report
    }

    pub fn is_stopped(&self) -> bool {
        self.report.is_some()
    }

    /// Handles a step trigger. Only acts in `Stepping` mode.
    pub fn step(&mut self, machine: &mut TuringMachine) -> Result<Progress, TuringMachineError> {
        if self.mode == Mode::Running {
            return Ok(Progress::Idle);
        }
        if let Some(report) = self.stopped(machine) {
            return Ok(Progress::Stopped(report));
        }

        machine.step().map(Progress::Stepped)
    }

    /// Handles a run trigger: switches to `Running` for the rest of the run.
    pub fn run(&mut self) {
        if self.mode == Mode::Stepping {
            debug!("switching to free-run mode");
            self.mode = Mode::Running;
        }
    }

    /// Executes the next batch of steps when running.
    pub fn tick(&mut self, machine: &mut TuringMachine) -> Result<Progress, TuringMachineError> {
        if self.mode == Mode::Stepping {
            return Ok(Progress::Idle);
        }
        if let Some(report) = self.report {
            return Ok(Progress::Stopped(report));
        }

        let limit = machine
            .step_count()
            .saturating_add(self.batch)
            .min(self.max_steps);
        machine.run_to_completion(limit)?;

        Ok(match self.stopped(machine) {
            Some(report) => Progress::Stopped(report),
            None => Progress::Running,
        })
    }

    /// Resets the machine and starts a new run in `Stepping` mode.
    pub fn reset(&mut self, machine: &mut TuringMachine) {
        machine.reset();
        self.mode = Mode::Stepping;
        self.report = None;
    }

    /// Records and returns the stop report if the machine has stopped.
    fn stopped(&mut self, machine: &TuringMachine) -> Option<RunReport> {
        if self.report.is_none() {
            self.report = machine
                .check_stop(self.max_steps)
                .map(|reason| RunReport {
                    reason,
                    steps: machine.step_count(),
                });
        }
        self.report
    }
}

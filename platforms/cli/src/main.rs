use action::{Controller, Mode, Progress};
use clap::Parser;
use serde::Serialize;
use std::error::Error;
use std::io::{self, BufRead, Write};
use tmch::encoder::{describe_machine, describe_stop, describe_transition};
use tmch::types::{DEFAULT_MAX_STEPS, DEFAULT_STRIP_LEN, FIRST_LABEL};
use tmch::{
    analyze, hex_dump, MachineConfig, ProgramManager, RunReport, StopReason, TransitionTable,
    TuringMachine,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Name of the program run when neither a table nor a program is given.
const DEFAULT_PROGRAM: &str = "bb5";

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  tmch-cli --table 1RB1LB_1LA1RZ --strip-len 16
  tmch-cli --program bb4 --interactive")]
struct Cli {
    /// Compact transition table, e.g. 1RB1LB_1LA1RZ
    #[clap(short, long, conflicts_with = "program")]
    table: Option<String>,

    /// Name of a built-in program (see --list)
    #[clap(short, long)]
    program: Option<String>,

    /// List the built-in programs and exit
    #[clap(long)]
    list: bool,

    /// Strip length in bytes
    #[clap(long, default_value_t = DEFAULT_STRIP_LEN)]
    strip_len: usize,

    /// Initial head bit offset (defaults to the middle of the strip)
    #[clap(long, allow_hyphen_values = true)]
    start_bit: Option<i64>,

    /// Label of the initial state
    #[clap(long, default_value_t = FIRST_LABEL)]
    initial_state: char,

    /// Maximum number of steps before the run is cut off
    #[clap(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: u64,

    /// Step on Enter, free-run on 'r', quit on 'q'
    #[clap(short, long, conflicts_with = "json")]
    interactive: bool,

    /// Print each step of the execution
    #[clap(short = 'd', long, conflicts_with_all = ["interactive", "json"])]
    debug: bool,

    /// Print the result as JSON instead of a hex dump
    #[clap(long)]
    json: bool,
}

impl Cli {
    fn config(&self) -> MachineConfig {
        MachineConfig {
            strip_len: self.strip_len,
            start_bit: self.start_bit,
            initial_state: self.initial_state,
            max_steps: self.max_steps,
        }
    }

    fn table(&self) -> Result<TransitionTable, Box<dyn Error>> {
        match (&self.table, &self.program) {
            (Some(table), _) => Ok(table.parse::<TransitionTable>()?),
            (None, Some(name)) => Ok(ProgramManager::get_program_by_name(name)?.table.clone()),
            (None, None) => Ok(ProgramManager::get_program_by_name(DEFAULT_PROGRAM)?
                .table
                .clone()),
        }
    }
}

#[derive(Serialize)]
struct Summary<'a> {
    table: String,
    config: &'a MachineConfig,
    report: RunReport,
    head: i64,
    state: char,
    ones: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Builds the log filter from `RUST_LOG`, falling back to warnings only when it is unset
/// or invalid.
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    if cli.list {
        for program in tmch::PROGRAMS.iter() {
            println!("{:<10} {}", program.name, program.table);
        }
        return Ok(());
    }

    let config = cli.config();
    let table = cli.table()?;
    let mut machine = TuringMachine::with_config(table, &config)?;

    for warning in analyze(machine.table(), machine.state()) {
        warn!(%warning, "table analysis");
    }

    info!(
        table = %machine.table(),
        strip_len = config.strip_len,
        head = machine.head(),
        "starting machine"
    );

    let report = if cli.interactive {
        let stdin = io::stdin();
        let prompt = atty::is(atty::Stream::Stdin);
        match interactive(
            &mut machine,
            config.max_steps,
            stdin.lock(),
            &mut io::stdout(),
            prompt,
        )? {
            Some(report) => report,
            None => return Ok(()),
        }
    } else if cli.debug {
        traced(&mut machine, config.max_steps)?
    } else {
        machine.run_to_completion(config.max_steps)?
    };

    if cli.json {
        let summary = Summary {
            table: machine.table().to_string(),
            config: &config,
            report,
            head: machine.head(),
            state: machine.state_label(),
            ones: machine.ones(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", hex_dump(machine.strip(), machine.head()));
    println!("{}", describe_machine(&machine));

    let message = describe_stop(&report, config.max_steps);
    match report.reason {
        StopReason::Halted | StopReason::StepLimitExceeded => println!("{message}"),
        StopReason::ReachedLeftEdge | StopReason::ReachedRightEdge => eprintln!("{message}"),
    }

    Ok(())
}

/// Runs the machine in batch mode, printing the machine after every step.
fn traced(machine: &mut TuringMachine, max_steps: u64) -> Result<RunReport, Box<dyn Error>> {
    println!("{}", describe_machine(machine));

    loop {
        if let Some(reason) = machine.check_stop(max_steps) {
            return Ok(RunReport {
                reason,
                steps: machine.step_count(),
            });
        }
        let outcome = machine.step()?;
        println!(
            "{} {}",
            describe_machine(machine),
            describe_transition(machine.table(), &outcome.transition)
        );
    }
}

/// Drives the machine from input lines. Returns `None` if the user quit.
///
/// An empty line steps once, `r` free-runs to the end and `q` quits. The end of input
/// free-runs as well. `prompt` prints the key help for a terminal.
fn interactive(
    machine: &mut TuringMachine,
    max_steps: u64,
    input: impl BufRead,
    out: &mut impl Write,
    prompt: bool,
) -> Result<Option<RunReport>, Box<dyn Error>> {
    let mut controller = Controller::new(max_steps, max_steps);
    let mut lines = input.lines();

    writeln!(out, "Started TM with {} bytes.", machine.strip().len())?;
    if prompt {
        writeln!(
            out,
            "The bits are printed left-to-right.\n\
             Press enter to step, r to run, or q to quit."
        )?;
    }

    loop {
        if let Some(report) = controller.report() {
            return Ok(Some(report));
        }

        if controller.mode() == Mode::Running {
            controller.tick(machine)?;
            continue;
        }

        if let Some(reason) = machine.check_stop(max_steps) {
            return Ok(Some(RunReport {
                reason,
                steps: machine.step_count(),
            }));
        }

        let line = match lines.next() {
            Some(line) => line?,
            None => "r".to_string(),
        };

        match line.trim() {
            "q" => return Ok(None),
            "r" => {
                controller.run();
                writeln!(out, "Running machine...")?;
            }
            _ => {
                if let Progress::Stepped(outcome) = controller.step(machine)? {
                    writeln!(out, "{}", hex_dump(machine.strip(), machine.head()))?;
                    writeln!(
                        out,
                        "{}",
                        describe_transition(machine.table(), &outcome.transition)
                    )?;
                }
            }
        }
        out.flush()?;
    }
}

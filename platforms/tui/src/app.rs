use action::{Action, Controller, Mode, Progress};
use keymap::{Config, KeyMapConfig};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap},
    Frame,
};
use tmch::encoder::{describe_stop, describe_transition, dump_rows, BYTES_PER_ROW};
use tmch::{
    MachineConfig, ProgramManager, State, StopReason, Symbol, TransitionTable, TuringMachine,
};

const BLOCK_PADDING: Padding = Padding::new(1, 1, 0, 0);
/// Steps executed per frame while free-running.
const RUN_BATCH: u64 = 200_000;

pub struct App {
    machine: TuringMachine,
    controller: Controller,
    config: MachineConfig,
    current_program_index: usize,
    program_name: String,
    scroll_offset: usize,
    follow_head: bool,
    message: String,
    show_help: bool,
    pub(crate) keymap: Config<Action>,
    // Indicates if the table was given on the command line or stdin, disabling program switching
    program_loaded_from_source: bool,
}

impl App {
    pub fn new_default(config: MachineConfig) -> Result<Self, String> {
        let program = ProgramManager::get_program_by_index(0).map_err(|e| e.to_string())?;
        let mut app = Self::new(program.table.clone(), config, false)?;
        app.program_name = program.name.to_string();
        app.message = "Press 'h' for help.".to_string();
        Ok(app)
    }

    pub fn new_from_table_string(table: String, config: MachineConfig) -> Result<Self, String> {
        let table: TransitionTable = table
            .parse()
            .map_err(|e| format!("Failed to load table: {}", e))?;
        let mut app = Self::new(table, config, true)?;
        app.message = "Table loaded from source. Press 'h' for help.".to_string();
        Ok(app)
    }

    fn new(
        table: TransitionTable,
        config: MachineConfig,
        program_loaded_from_source: bool,
    ) -> Result<Self, String> {
        let machine = TuringMachine::with_config(table, &config).map_err(|e| e.to_string())?;

        Ok(Self {
            machine,
            controller: Controller::new(config.max_steps, RUN_BATCH),
            config,
            keymap: Action::keymap_config(),
            current_program_index: 0,
            program_name: "Custom".to_string(),
            scroll_offset: 0,
            follow_head: true,
            message: String::new(),
            show_help: false,
            program_loaded_from_source,
        })
    }

    pub fn render(&mut self, f: &mut Frame) {
        let margin_size = Margin::new(1, 0); // Define margin size
        let inner_area = f.area().inner(margin_size);

        // Main vertical chunks: Program Info, Middle (Table + Machine), Status
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // Program info (fixed height + margin)
                Constraint::Min(0),    // Middle section (flexible height)
                Constraint::Length(3), // Status/controls (fixed height + margin)
            ])
            .split(inner_area);

        self.render_program_info(f, main_chunks[0]);

        // Middle horizontal chunks: Transition table (left), Machine (right)
        let middle_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(30), // Transition table
                Constraint::Length(1),
                Constraint::Min(0), // Machine
            ])
            .split(main_chunks[1]);

        self.render_table(f, middle_chunks[0]);

        // Right vertical chunks: Machine State, Strip/Help
        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Machine State
                Constraint::Min(0),    // Strip
            ])
            .split(middle_chunks[2]);

        self.render_machine_state(f, right_chunks[0]);

        if self.show_help {
            self.render_help(f, right_chunks[1]);
        } else {
            self.render_strip(f, right_chunks[1]);
        }

        self.render_status(f, main_chunks[2]);
    }

    fn render_program_info(&self, f: &mut Frame, area: Rect) {
        let table = self.machine.table();

        let text = vec![
            Line::from(vec![
                Span::styled("Program: ", Style::default().fg(Color::Yellow)),
                Span::raw(if self.program_loaded_from_source {
                    format!("{} (Custom)", self.program_name)
                } else {
                    format!(
                        "{} ({}/{})",
                        self.program_name,
                        self.current_program_index + 1,
                        ProgramManager::count()
                    )
                }),
            ]),
            Line::from(vec![
                Span::styled("Table: ", Style::default().fg(Color::Yellow)),
                Span::raw(table.to_string()),
            ]),
            Line::from(vec![
                Span::styled("States: ", Style::default().fg(Color::Yellow)),
                Span::raw(table.state_count().to_string()),
                Span::styled(" | Strip: ", Style::default().fg(Color::Yellow)),
                Span::raw(format!("{} bytes", self.machine.strip().len())),
                Span::styled(" | Max steps: ", Style::default().fg(Color::Yellow)),
                Span::raw(self.config.max_steps.to_string()),
            ]),
        ];

        let paragraph = Paragraph::new(text)
            .block(block("tmch - Bit-packed Turing Machine").title_alignment(Alignment::Center));

        f.render_widget(paragraph, area);
    }

    fn render_table(&self, f: &mut Frame, area: Rect) {
        let table = self.machine.table();
        let current = self.machine.state().index();
        let symbol = self.machine.symbol();

        let mut lines = vec![Line::from(Span::styled(
            "       0     1",
            Style::default().fg(Color::Yellow),
        ))];

        for index in 0..table.state_count() {
            let label = table.label(State::Active(index));
            let mut spans = vec![Span::styled(
                format!("  {label}  "),
                Style::default().fg(Color::Yellow),
            )];

            for read in [Symbol::Zero, Symbol::One] {
                let rule = table.lookup(index, read);
                let text = format!(
                    " {}{}{} ",
                    rule.write,
                    rule.direction.letter(),
                    table.label(rule.next_state)
                );
                let active = current == Some(index) && symbol == Some(read);
                spans.push(if active {
                    Span::styled(
                        text,
                        Style::default()
                            .bg(Color::Yellow)
                            .fg(Color::Black)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::raw(text)
                });
            }

            lines.push(Line::from(spans));
        }

        f.render_widget(section("Transition Table", lines), area);
    }

    fn render_strip(&mut self, f: &mut Frame, area: Rect) {
        let rows = dump_rows(self.machine.strip(), self.machine.head());
        let visible = area.height.saturating_sub(2).max(1) as usize;

        if self.follow_head {
            let head = self.machine.head().max(0) as usize / 8 / BYTES_PER_ROW;
            if head < self.scroll_offset || head >= self.scroll_offset + visible {
                self.scroll_offset = head.saturating_sub(visible / 2);
            }
        }
        self.scroll_offset = self.scroll_offset.min(rows.len().saturating_sub(1));

        let lines: Vec<Line> = rows
            .iter()
            .skip(self.scroll_offset)
            .take(visible)
            .map(|row| {
                let mut spans = vec![Span::styled(
                    format!("{:04X}  ", row.offset),
                    Style::default().fg(Color::Cyan),
                )];
                for cell in &row.cells {
                    let value = format!("{:02X}", cell.value);
                    match cell.head {
                        Some(bit) => spans.push(Span::styled(
                            format!("({bit}){value}"),
                            Style::default()
                                .bg(Color::Yellow)
                                .fg(Color::Black)
                                .add_modifier(Modifier::BOLD),
                        )),
                        None if cell.value == 0 => {
                            spans.push(Span::styled(
                                format!("  {value}"),
                                Style::default().fg(Color::DarkGray),
                            ));
                        }
                        None => spans.push(Span::raw(format!("  {value}"))),
                    }
                    spans.push(Span::raw(" "));
                }
                Line::from(spans)
            })
            .collect();

        f.render_widget(section("Strip (bits left-to-right)", lines), area);
    }

    fn render_machine_state(&self, f: &mut Frame, area: Rect) {
        let (status_text, status_color) = match (self.controller.report(), self.controller.mode()) {
            (Some(report), _) => (stop_label(report.reason), Color::Red),
            (None, Mode::Running) => ("RUNNING", Color::Green),
            (None, Mode::Stepping) if self.machine.step_count() == 0 => ("READY", Color::Blue),
            (None, Mode::Stepping) => ("STEPPING", Color::Green),
        };

        let text = vec![
            Line::from(vec![
                Span::styled("Current State: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    self.machine.state_label().to_string(),
                    Style::default()
                        .fg(status_color)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" | Steps: ", Style::default().fg(Color::Yellow)),
                Span::raw(self.machine.step_count().to_string()),
                Span::styled(" | Status: ", Style::default().fg(Color::Yellow)),
                Span::styled(status_text, Style::default().fg(status_color)),
            ]),
            Line::from(vec![
                Span::styled("Head: ", Style::default().fg(Color::Cyan)),
                Span::raw(self.machine.head().to_string()),
                Span::styled(" | Symbol: ", Style::default().fg(Color::Cyan)),
                Span::raw(
                    self.machine
                        .symbol()
                        .map_or("-".to_string(), |s| s.to_string()),
                ),
                Span::styled(" | Ones: ", Style::default().fg(Color::Cyan)),
                Span::raw(self.machine.ones().to_string()),
            ]),
        ];

        f.render_widget(section("Machine State", text), area);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let help_text = vec![
            Line::from("Controls:"),
            Line::from("  Space - Step forward"),
            Line::from("  r - Run until the machine stops"),
            Line::from("  x - Reset machine"),
            Line::from(if self.program_loaded_from_source {
                "  ← → - Program switching disabled (loaded from command line/stdin)"
            } else {
                "  ← → - Switch programs"
            }),
            Line::from("  ↑ ↓ - Scroll the strip"),
            Line::from("  h - Toggle this help"),
            Line::from("  q - Quit"),
            Line::from(""),
            Line::from("Each byte is shown with its bits reversed, so bits read left-to-right."),
            Line::from("(n) marks the byte under the head and the head's bit within it."),
            Line::from("Once running, a machine runs until it halts, leaves the strip"),
            Line::from("or reaches the step limit. Reset to step it again."),
        ];

        f.render_widget(section("Help", help_text), area);
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let hint = "q quit | h help";
        let outer = block("Status");
        let inner = outer.inner(area);
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Length(hint.len() as u16)])
            .split(inner);

        let mode = match self.controller.mode() {
            Mode::Stepping => "STEP",
            Mode::Running => "RUN",
        };
        let status = Line::from(vec![
            Span::raw("Mode: "),
            Span::styled(mode, Style::default().fg(Color::Yellow)),
            Span::raw(format!(" | {}", self.message)),
        ]);

        let hint = Text::from(
            Line::from(Span::styled(hint, Style::default().fg(Color::Yellow))).right_aligned(),
        );

        f.render_widget(outer, area);
        f.render_widget(status, chunks[0]);
        f.render_widget(hint, chunks[1]);
    }

    pub fn step_machine(&mut self) {
        self.follow_head = true;
        let progress = self.controller.step(&mut self.machine);
        self.on_progress(progress);
    }

    pub fn run_machine(&mut self) {
        self.controller.run();
        self.follow_head = true;
        self.message = "Running machine...".to_string();
    }

    /// Executes the next batch of steps while running.
    pub fn tick(&mut self) {
        let progress = self.controller.tick(&mut self.machine);
        self.on_progress(progress);
    }

    fn on_progress(&mut self, progress: Result<Progress, tmch::TuringMachineError>) {
        match progress {
            Ok(Progress::Stepped(outcome)) => {
                self.message = format!(
                    "Step {}: {}",
                    outcome.steps,
                    describe_transition(self.machine.table(), &outcome.transition)
                );
            }
            Ok(Progress::Stopped(report)) => {
                self.message = format!(
                    "{} Press 'x' to reset.",
                    describe_stop(&report, self.controller.max_steps())
                );
            }
            Ok(Progress::Running) | Ok(Progress::Idle) => {}
            Err(e) => {
                self.message = format!("Error: {}", e);
            }
        }
    }

    pub fn reset_machine(&mut self) {
        self.controller.reset(&mut self.machine);
        self.message = "Machine reset".to_string();
        self.scroll_offset = 0;
        self.follow_head = true;
    }

    pub fn is_running(&self) -> bool {
        self.controller.mode() == Mode::Running && !self.controller.is_stopped()
    }

    pub fn scroll_up(&mut self) {
        self.follow_head = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.follow_head = false;
        self.scroll_offset += 1;
    }

    pub fn next_program(&mut self) {
        if self.program_loaded_from_source {
            self.message = "Cannot switch programs when loaded from command line/stdin.".to_string();
            return;
        }
        let count = ProgramManager::count();
        self.current_program_index = (self.current_program_index + 1) % count;
        self.load_current_program();
    }

    pub fn previous_program(&mut self) {
        if self.program_loaded_from_source {
            self.message = "Cannot switch programs when loaded from command line/stdin.".to_string();
            return;
        }
        let count = ProgramManager::count();
        self.current_program_index = if self.current_program_index == 0 {
            count - 1
        } else {
            self.current_program_index - 1
        };
        self.load_current_program();
    }

    fn load_current_program(&mut self) {
        let loaded = ProgramManager::get_program_by_index(self.current_program_index)
            .and_then(|program| {
                TuringMachine::with_config(program.table.clone(), &self.config)
                    .map(|machine| (program.name, machine))
            });

        match loaded {
            Ok((name, machine)) => {
                self.machine = machine;
                self.controller = Controller::new(self.config.max_steps, RUN_BATCH);
                self.program_name = name.to_string();
                self.scroll_offset = 0;
                self.follow_head = true;
                self.message = format!("Loaded program: {}", name);
            }
            Err(e) => self.message = format!("Error: {}", e),
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}

fn stop_label(reason: StopReason) -> &'static str {
    match reason {
        StopReason::Halted => "HALTED",
        StopReason::StepLimitExceeded => "STEP LIMIT",
        StopReason::ReachedLeftEdge => "LEFT EDGE",
        StopReason::ReachedRightEdge => "RIGHT EDGE",
    }
}

fn section<'a>(title: &'a str, content: Vec<Line<'a>>) -> Paragraph<'a> {
    Paragraph::new(content)
        .block(block(title))
        .wrap(Wrap { trim: false })
}

fn block(title: &str) -> Block {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {title} "))
        .padding(BLOCK_PADDING)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MachineConfig {
        MachineConfig {
            strip_len: 64,
            ..MachineConfig::default()
        }
    }

    #[test]
    fn test_step_and_reset() {
        let mut app = App::new_from_table_string("1RB1LB_1LA1RZ".to_string(), config()).unwrap();

        app.step_machine();
        assert_eq!(app.machine.step_count(), 1);
        assert!(app.message.starts_with("Step 1:"));

        app.reset_machine();
        assert_eq!(app.machine.step_count(), 0);
        assert_eq!(app.controller.mode(), Mode::Stepping);
    }

    #[test]
    fn test_run_until_halt() {
        let mut app = App::new_from_table_string("1RB1LB_1LA1RZ".to_string(), config()).unwrap();

        app.run_machine();
        assert!(app.is_running());
        app.tick();

        assert!(!app.is_running());
        assert!(app.machine.is_halted());
        assert!(app.message.contains("halted after 6 steps"));
    }

    #[test]
    fn test_invalid_table() {
        assert!(App::new_from_table_string("1RB".to_string(), config()).is_err());
    }

    #[test]
    fn test_program_switching() {
        let mut app = App::new_default(config()).unwrap();
        assert_eq!(app.program_name, "bb2");

        app.next_program();
        assert_eq!(app.program_name, "bb3");

        app.previous_program();
        app.previous_program();
        assert_eq!(app.current_program_index, ProgramManager::count() - 1);
    }

    #[test]
    fn test_program_switching_disabled_for_custom_table() {
        let mut app = App::new_from_table_string("1RB1LB_1LA1RZ".to_string(), config()).unwrap();
        app.next_program();
        assert!(app.message.starts_with("Cannot switch programs"));
    }
}

use action::Action;
use keymap::{Config, KeyMapConfig};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap},
    Frame,
};
use std::time::Duration;
use turing_engine::{
    AutoRun, Definition, DefinitionLoader, PresetManager, Status, TuringEngine,
    DEFAULT_RUN_INTERVAL,
};

const BLOCK_PADDING: Padding = Padding::new(1, 1, 0, 0);
const IDLE_POLL: Duration = Duration::from_millis(100);

pub struct App {
    engine: TuringEngine,
    definition: Definition,
    source: String,
    current_preset_index: usize,
    auto_run: Option<AutoRun>,
    log_scroll: usize,
    message: String,
    show_help: bool,
    pub(crate) keymap: Config<Action>,
    // Set when the definition came from a file or stdin, which disables preset switching
    loaded_from_source: bool,
}

impl App {
    pub fn new_default() -> Result<Self, String> {
        let preset = PresetManager::get_by_index(0).map_err(|e| e.to_string())?;

        Self::new(preset.definition.clone(), preset.source.to_string(), false)
            .map(|app| app.with_message("Press 'h' for help."))
    }

    pub fn new_from_definition_string(source: String) -> Result<Self, String> {
        let definition = DefinitionLoader::load_definition_from_string(&source)
            .map_err(|e| format!("Failed to load definition: {}", e))?;

        Self::new(definition, source, true)
            .map(|app| app.with_message("Definition loaded from source. Press 'h' for help."))
    }

    fn new(
        definition: Definition,
        source: String,
        loaded_from_source: bool,
    ) -> Result<Self, String> {
        let mut engine = TuringEngine::new();
        engine
            .load(&definition)
            .map_err(|e| format!("Failed to initialize machine: {}", e))?;

        Ok(Self {
            engine,
            definition,
            source,
            current_preset_index: 0,
            auto_run: None,
            log_scroll: 0,
            message: String::new(),
            show_help: false,
            keymap: Action::keymap_config(),
            loaded_from_source,
        })
    }

    fn with_message(mut self, message: &str) -> Self {
        self.message = message.to_string();
        self
    }

    pub fn render(&mut self, f: &mut Frame) {
        let inner_area = f.area().inner(Margin::new(1, 0));

        // Main vertical chunks: Definition Info, Middle (Source + Machine), Status
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // Definition info
                Constraint::Min(0),    // Middle section
                Constraint::Length(3), // Status/controls
            ])
            .split(inner_area);

        self.render_definition_info(f, main_chunks[0]);

        let middle_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(40), // Source
                Constraint::Length(1),
                Constraint::Percentage(60), // Machine
            ])
            .split(main_chunks[1]);

        self.render_source(f, middle_chunks[0]);

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Machine state
                Constraint::Length(5), // Tape
                Constraint::Min(0),    // Log or help
            ])
            .split(middle_chunks[2]);

        self.render_machine_state(f, right_chunks[0]);
        self.render_tape(f, right_chunks[1]);

        if self.show_help {
            self.render_help(f, right_chunks[2]);
        } else {
            self.render_log(f, right_chunks[2]);
        }

        self.render_status(f, main_chunks[2]);
    }

    fn render_source(&self, f: &mut Frame, area: Rect) {
        let keywords = ["name:", "input:", "initial:", "final:", "blank:", "rules:"];

        let lines: Vec<Line> = self
            .source
            .lines()
            .map(|line| {
                let trimmed = line.trim_start();
                if trimmed.starts_with('#') {
                    return Line::from(Span::styled(line, Style::default().fg(Color::DarkGray)));
                }

                match keywords.iter().find(|k| trimmed.starts_with(*k)) {
                    Some(keyword) => Line::from(vec![
                        Span::styled(*keyword, Style::default().fg(Color::Yellow)),
                        Span::raw(&trimmed[keyword.len()..]),
                    ]),
                    None => Line::from(Span::raw(line)),
                }
            })
            .collect();

        let paragraph = section("Definition", lines).wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    fn render_definition_info(&self, f: &mut Frame, area: Rect) {
        let name = if self.loaded_from_source {
            format!("{} (Custom)", self.definition.display_name())
        } else {
            format!(
                "{} ({}/{})",
                self.definition.display_name(),
                self.current_preset_index + 1,
                PresetManager::count()
            )
        };

        let text = vec![
            Line::from(vec![
                Span::styled("Machine: ", Style::default().fg(Color::Yellow)),
                Span::raw(name),
            ]),
            Line::from(vec![
                Span::styled("Input: ", Style::default().fg(Color::Yellow)),
                Span::raw(format!("\"{}\"", self.definition.input)),
                Span::styled(" | Blank: ", Style::default().fg(Color::Yellow)),
                Span::raw(self.engine.blank().to_string()),
            ]),
            Line::from(vec![
                Span::styled("Initial: ", Style::default().fg(Color::Yellow)),
                Span::raw(self.engine.initial_state().to_string()),
                Span::styled(" | Final: ", Style::default().fg(Color::Yellow)),
                Span::raw(
                    self.engine
                        .final_states()
                        .iter()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", "),
                ),
                Span::styled(" | Rules: ", Style::default().fg(Color::Yellow)),
                Span::raw(self.engine.rules().len().to_string()),
            ]),
        ];

        let paragraph = Paragraph::new(text)
            .block(block("Turing Machine (TUI)").title_alignment(Alignment::Center));

        f.render_widget(paragraph, area);
    }

    fn render_machine_state(&self, f: &mut Frame, area: Rect) {
        let snapshot = self.engine.snapshot();
        let color = status_color(snapshot.status);
        let state = if snapshot.state.is_empty() {
            "-".to_string()
        } else {
            snapshot.state.clone()
        };

        let text = vec![
            Line::from(vec![
                Span::styled("State: ", Style::default().fg(Color::Yellow)),
                Span::styled(state, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::styled(" | Steps: ", Style::default().fg(Color::Yellow)),
                Span::raw(snapshot.step_count.to_string()),
                Span::styled(" | Status: ", Style::default().fg(Color::Yellow)),
                Span::styled(snapshot.status.to_string(), Style::default().fg(color)),
            ]),
            Line::from(vec![
                Span::styled("Head: ", Style::default().fg(Color::Cyan)),
                Span::raw(snapshot.head.to_string()),
                Span::styled(" | Symbol: ", Style::default().fg(Color::Cyan)),
                Span::raw(format!("'{}'", snapshot.symbol())),
            ]),
        ];

        f.render_widget(section("Machine State", text), area);
    }

    fn render_tape(&self, f: &mut Frame, area: Rect) {
        let snapshot = self.engine.snapshot();
        // Each cell is three columns wide; keep the head centered.
        let cells_visible = (area.width.saturating_sub(4) / 3).max(1) as usize;
        let radius = cells_visible.saturating_sub(1) / 2;

        let window = snapshot.window(radius);
        let cells: Vec<Span> = window
            .iter()
            .map(|cell| {
                if cell.is_head {
                    Span::styled(
                        format!(" {} ", cell.symbol),
                        Style::default()
                            .bg(Color::Yellow)
                            .fg(Color::Black)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::raw(format!(" {} ", cell.symbol))
                }
            })
            .collect();

        let bounds = match window.first().zip(window.last()) {
            Some((first, last)) => format!("cells {}..={}", first.index, last.index),
            None => String::new(),
        };

        let text = vec![
            Line::from(cells),
            Line::from(Span::styled(bounds, Style::default().fg(Color::DarkGray))),
        ];

        f.render_widget(section("Tape", text), area);
    }

    fn render_log(&self, f: &mut Frame, area: Rect) {
        let entries = self.engine.journal().entries();
        let height = area.height.saturating_sub(2) as usize;
        let end = entries.len().saturating_sub(self.log_scroll);
        let start = end.saturating_sub(height);

        let lines: Vec<Line> = entries[start..end]
            .iter()
            .map(|entry| Line::from(entry.to_string()))
            .collect();

        f.render_widget(section("Log", lines), area);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let help_text = vec![
            Line::from("Controls:"),
            Line::from("  Space - Step forward"),
            Line::from("  p - Start/stop automatic run"),
            Line::from("  r - Reset (clears tape and state, keeps the rules)"),
            Line::from("  i - Initialize again from the definition"),
            Line::from(if self.loaded_from_source {
                "  ← → - Machine switching disabled (loaded from file/stdin)"
            } else {
                "  ← → - Switch built-in machines"
            }),
            Line::from("  ↑ ↓ - Scroll the log"),
            Line::from("  h - Toggle this help"),
            Line::from("  q - Quit"),
        ];

        f.render_widget(section("Help", help_text), area);
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let auto_run = if self.is_auto_running() { "ON" } else { "OFF" };
        let status = Line::from(vec![
            Span::raw("Auto-run: "),
            Span::styled(auto_run, Style::default().fg(Color::Yellow)),
            Span::raw(format!(" | {}", self.message)),
        ]);

        f.render_widget(Paragraph::new(Text::from(status)).block(block("Status")), area);
    }

    pub fn step_machine(&mut self) {
        self.engine.step();
        self.log_scroll = 0;

        if self.engine.is_halted() {
            self.stop_auto_run();
            self.message = self.halted_message();
        } else {
            self.message = format!("Step {} completed", self.engine.step_count());
        }
    }

    /// Feeds elapsed time to the automatic run, if one is active.
    pub fn tick(&mut self, elapsed: Duration) {
        let Some(run) = self.auto_run.as_mut() else {
            return;
        };

        if run.advance(&mut self.engine, elapsed) > 0 {
            self.log_scroll = 0;
            self.message = format!("Step {} completed", self.engine.step_count());
        }

        if !run.is_active() {
            self.auto_run = None;
            self.message = self.halted_message();
        }
    }

    pub fn toggle_auto_run(&mut self) {
        if self.auto_run.is_some() {
            self.stop_auto_run();
            self.message = "Auto-run stopped".to_string();
        } else if self.engine.is_halted() {
            self.message = self.halted_message();
        } else {
            self.auto_run = Some(AutoRun::new(DEFAULT_RUN_INTERVAL));
            self.message = "Auto-run started".to_string();
        }
    }

    pub fn is_auto_running(&self) -> bool {
        self.auto_run.as_ref().is_some_and(AutoRun::is_active)
    }

    /// How long the event loop may wait before the next `tick` is due.
    pub fn poll_timeout(&self) -> Duration {
        match &self.auto_run {
            Some(run) => run.next_due().min(IDLE_POLL),
            None => IDLE_POLL,
        }
    }

    pub fn reset_machine(&mut self) {
        self.stop_auto_run();
        self.engine.reset();
        self.log_scroll = 0;
        self.message = "Machine reset. Press 'i' to initialize again.".to_string();
    }

    pub fn initialize_machine(&mut self) {
        self.stop_auto_run();
        self.log_scroll = 0;
        self.message = match self.engine.load(&self.definition) {
            Ok(()) => format!("Initialized {}", self.definition.display_name()),
            Err(e) => format!("Failed to initialize: {}", e),
        };
    }

    pub fn next_preset(&mut self) {
        if self.loaded_from_source {
            self.message = "Cannot switch machines when loaded from file/stdin.".to_string();
            return;
        }
        let count = PresetManager::count();
        self.current_preset_index = (self.current_preset_index + 1) % count;
        self.load_current_preset();
    }

    pub fn previous_preset(&mut self) {
        if self.loaded_from_source {
            self.message = "Cannot switch machines when loaded from file/stdin.".to_string();
            return;
        }
        let count = PresetManager::count();
        self.current_preset_index = if self.current_preset_index == 0 {
            count - 1
        } else {
            self.current_preset_index - 1
        };
        self.load_current_preset();
    }

    fn load_current_preset(&mut self) {
        match PresetManager::get_by_index(self.current_preset_index) {
            Ok(preset) => {
                self.definition = preset.definition.clone();
                self.source = preset.source.to_string();
                // A fresh engine so the log starts with this machine only.
                self.engine = TuringEngine::new();
                self.initialize_machine();
            }
            Err(e) => self.message = e.to_string(),
        }
    }

    pub fn scroll_up(&mut self) {
        let max = self.engine.journal().len().saturating_sub(1);
        self.log_scroll = (self.log_scroll + 1).min(max);
    }

    pub fn scroll_down(&mut self) {
        self.log_scroll = self.log_scroll.saturating_sub(1);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    fn stop_auto_run(&mut self) {
        if let Some(mut run) = self.auto_run.take() {
            run.cancel();
        }
    }

    fn halted_message(&self) -> String {
        match self.engine.status() {
            Status::Accepted => "Machine accepted the input. Press 'i' to run it again.".to_string(),
            Status::Rejected => "Machine rejected the input. Press 'i' to run it again.".to_string(),
            _ => format!("Stopped after {} steps", self.engine.step_count()),
        }
    }

    #[cfg(test)]
    pub(crate) fn engine(&self) -> &TuringEngine {
        &self.engine
    }
}

fn status_color(status: Status) -> Color {
    match status {
        Status::Idle => Color::Blue,
        Status::Running => Color::Green,
        Status::Accepted => Color::Cyan,
        Status::Rejected => Color::Red,
    }
}

fn section<'a>(title: &'a str, content: Vec<Line<'a>>) -> Paragraph<'a> {
    Paragraph::new(content).block(block(title))
}

fn block(title: &str) -> Block {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {title} "))
        .padding(BLOCK_PADDING)
}

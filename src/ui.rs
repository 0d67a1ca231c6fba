use crate::catalog::{label_for, AGE_OPTIONS, BRANDS, CONDITION_OPTIONS, STORAGE_OPTIONS};
use crate::config::WizardConfig;
use crate::export::{Clipboard, Exporter, ShareTarget, SystemClipboard};
use crate::pricing::Field;
use crate::qr::QrImage;
use crate::wizard::{NoticeKind, View, Wizard};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;

/// Quiet zone drawn around the terminal preview, in modules
const PREVIEW_MARGIN: usize = 2;

pub struct App {
    pub wizard: Wizard,
    pub focus: Field,
    exporter: Exporter,
    share_target: Box<dyn ShareTarget>,
    clipboard: Box<dyn Clipboard>,
}

impl App {
    pub fn new(config: &WizardConfig) -> Result<Self> {
        let pricing = config
            .pricing_table()
            .context("Failed to load pricing table")?;

        Ok(Self::with_parts(
            Wizard::new(pricing),
            Exporter::new(config.export_dir.clone()),
            config.share_target(),
            Box::new(SystemClipboard::default()),
        ))
    }

    pub fn with_parts(
        wizard: Wizard,
        exporter: Exporter,
        share_target: Box<dyn ShareTarget>,
        clipboard: Box<dyn Clipboard>,
    ) -> Self {
        Self {
            wizard,
            focus: Field::Brand,
            exporter,
            share_target,
            clipboard,
        }
    }

    pub fn next_field(&mut self) {
        let i = field_index(self.focus);
        self.focus = Field::ALL[(i + 1) % Field::ALL.len()];
    }

    pub fn previous_field(&mut self) {
        let i = field_index(self.focus);
        self.focus = Field::ALL[(i + Field::ALL.len() - 1) % Field::ALL.len()];
    }

    /// Step the focused select field through its options. The empty
    /// "Select ..." state sits before the first option.
    pub fn cycle_option(&mut self, forward: bool) {
        let values = option_values(self.focus);
        if values.is_empty() {
            return;
        }

        let current = self.wizard.attributes.get(self.focus).to_string();
        let position = values.iter().position(|v| *v == current);
        let next = match (position, forward) {
            (None, true) => 0,
            (None, false) => values.len() - 1,
            (Some(i), true) => (i + 1) % values.len(),
            (Some(i), false) => (i + values.len() - 1) % values.len(),
        };

        *self.wizard.attributes.get_mut(self.focus) = values[next].to_string();
    }

    /// Returns `false` when the app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Char('c') if ctrl => return false,
            KeyCode::Tab | KeyCode::BackTab => {
                self.wizard.toggle_view();
                return true;
            }
            _ => {}
        }

        match self.wizard.view() {
            View::Estimator => self.handle_estimator_key(key),
            View::Encoder => self.handle_encoder_key(key, ctrl),
        }

        true
    }

    fn handle_estimator_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Down => self.next_field(),
            KeyCode::Up => self.previous_field(),
            KeyCode::Right => self.cycle_option(true),
            KeyCode::Left => self.cycle_option(false),
            KeyCode::Enter => {
                let _ = self.wizard.calculate();
            }
            KeyCode::Backspace if self.focus == Field::Model => {
                self.wizard.attributes.model.pop();
            }
            KeyCode::Char(c)
                if self.focus == Field::Model && !key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.wizard.attributes.model.push(c);
            }
            _ => {}
        }
    }

    fn handle_encoder_key(&mut self, key: KeyEvent, ctrl: bool) {
        match key.code {
            KeyCode::Char('d') if ctrl => {
                let _ = self.wizard.download(&self.exporter);
            }
            KeyCode::Char('s') if ctrl => {
                let _ = self.wizard.share(
                    &self.exporter,
                    self.share_target.as_ref(),
                    self.clipboard.as_mut(),
                );
            }
            KeyCode::Enter => {
                let _ = self.wizard.generate_qr();
            }
            KeyCode::Backspace => {
                self.wizard.encoder.custom_text.pop();
            }
            KeyCode::Char(c) if !ctrl => self.wizard.encoder.custom_text.push(c),
            _ => {}
        }
    }
}

fn field_index(field: Field) -> usize {
    Field::ALL.iter().position(|f| *f == field).unwrap_or(0)
}

fn option_values(field: Field) -> Vec<&'static str> {
    match field {
        Field::Brand => BRANDS.iter().map(|b| b.name).collect(),
        Field::Storage => STORAGE_OPTIONS.iter().map(|s| s.name).collect(),
        Field::Condition => CONDITION_OPTIONS.iter().map(|c| c.value).collect(),
        Field::Age => AGE_OPTIONS.iter().map(|a| a.value).collect(),
        Field::Model => Vec::new(),
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("UI loop failed")
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if !app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with tabs
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.wizard.view() {
        View::Estimator => render_estimator(f, chunks[1], app),
        View::Encoder => render_encoder(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, view) in [View::Estimator, View::Encoder].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *view == app.wizard.view() {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(view.title().to_string(), style));
    }

    if let Some(price) = app.wizard.last_price() {
        tab_spans.push(Span::raw("  |  "));
        tab_spans.push(Span::styled(
            format!("Last estimate: {}", price),
            Style::default().fg(Color::Green),
        ));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Mobile Price Wizard "),
    );

    f.render_widget(header, area);
}

fn render_estimator(f: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let attrs = &app.wizard.attributes;
    let mut content = vec![Line::from("")];

    for field in Field::ALL {
        let focused = field == app.focus;
        let marker = if focused {
            Span::styled("→ ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        } else {
            Span::raw("  ")
        };

        let raw = attrs.get(field);
        let value = if raw.is_empty() {
            let placeholder = match field {
                Field::Model => "Enter model name".to_string(),
                other => format!("Select {}", other.label()),
            };
            Span::styled(placeholder, Style::default().fg(Color::DarkGray))
        } else {
            let shown = match field {
                Field::Condition => label_for(&CONDITION_OPTIONS, raw),
                Field::Age => label_for(&AGE_OPTIONS, raw),
                _ => raw.to_string(),
            };
            Span::styled(shown, Style::default().fg(Color::White))
        };

        let arrows = if focused && field != Field::Model {
            Span::styled("  ◀ ▶", Style::default().fg(Color::Yellow))
        } else {
            Span::raw("")
        };

        content.push(Line::from(vec![
            marker,
            Span::styled(
                format!("{:<10}", field.label()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            value,
            arrows,
        ]));
        content.push(Line::from(""));
    }

    content.push(Line::from(vec![
        Span::styled("  Enter", Style::default().fg(Color::Yellow)),
        Span::styled(
            " Calculate Price",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ),
    ]));

    let form = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Price Calculator "),
    );
    f.render_widget(form, columns[0]);

    let result = match app.wizard.last_price() {
        Some(price) => vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Estimated Price",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("  {}", price),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "  This is an estimated price based on current market conditions and device specifications.",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )),
        ],
        None => vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Fill in every field and press Enter",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )),
        ],
    };

    let panel = Paragraph::new(result).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Estimate "),
    );
    f.render_widget(panel, columns[1]);
}

fn render_encoder(f: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let custom = &app.wizard.encoder.custom_text;
    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Custom Text (Optional)",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if custom.is_empty() {
        content.push(Line::from(Span::styled(
            "  Type custom text, or leave empty to use the calculated price...",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        content.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(custom.clone(), Style::default().fg(Color::White)),
            Span::styled("▏", Style::default().fg(Color::Yellow)),
        ]));
    }

    if let Some(price) = app.wizard.last_price() {
        content.push(Line::from(""));
        content.push(Line::from(Span::styled(
            "  Current Calculated Price:",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        content.push(Line::from(Span::styled(
            format!("  {}", price),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )));
        content.push(Line::from(Span::styled(
            "  This price will be used if no custom text is provided",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    content.push(Line::from(""));
    content.push(Line::from(vec![
        Span::styled("  Enter", Style::default().fg(Color::Yellow)),
        Span::styled(
            " Generate QR Code",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ),
    ]));

    let input = Paragraph::new(content).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" QR Code Generator "),
    );
    f.render_widget(input, columns[0]);

    let preview = match app.wizard.encoder.image() {
        Some(image) => {
            let mut lines = qr_preview_lines(image);
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "QR Code contains:",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(image.payload().to_string()));
            lines.push(Line::from(Span::styled(
                format!("Generated {}", image.generated_at().format("%H:%M:%S UTC")),
                Style::default().fg(Color::DarkGray),
            )));
            lines.push(Line::from(vec![
                Span::styled("Ctrl-D", Style::default().fg(Color::Yellow)),
                Span::raw(" Download | "),
                Span::styled("Ctrl-S", Style::default().fg(Color::Yellow)),
                Span::raw(" Share"),
            ]));
            lines
        }
        None => vec![
            Line::from(""),
            Line::from(Span::styled(
                "QR code will appear here after generation",
                Style::default().fg(Color::DarkGray),
            )),
        ],
    };

    let panel = Paragraph::new(preview).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Preview "),
    );
    f.render_widget(panel, columns[1]);
}

/// Two module rows per text row using upper half blocks: the foreground
/// paints the top module, the background paints the bottom one.
fn qr_preview_lines(image: &QrImage) -> Vec<Line<'static>> {
    let total = image.module_count() + 2 * PREVIEW_MARGIN;
    let color = |dark: bool| if dark { Color::Black } else { Color::White };

    (0..total)
        .step_by(2)
        .map(|row| {
            let spans: Vec<Span<'static>> = (0..total)
                .map(|col| {
                    let top = module_with_margin(image, row, col);
                    let bottom = module_with_margin(image, row + 1, col);
                    Span::styled("▀", Style::default().fg(color(top)).bg(color(bottom)))
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn module_with_margin(image: &QrImage, row: usize, col: usize) -> bool {
    if row < PREVIEW_MARGIN || col < PREVIEW_MARGIN {
        return false;
    }
    image.is_dark(row - PREVIEW_MARGIN, col - PREVIEW_MARGIN)
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    if let Some(notice) = app.wizard.notice() {
        let color = match notice.kind {
            NoticeKind::Info => Color::Green,
            NoticeKind::Error => Color::Red,
        };
        status_spans.push(Span::styled(
            format!(" {} ", notice.message),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        status_spans.push(Span::raw(" | "));
    }

    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Switch | "));

    match app.wizard.view() {
        View::Estimator => {
            status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Field | "));
            status_spans.push(Span::styled("←/→", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Option | "));
        }
        View::Encoder => {
            status_spans.push(Span::styled("Ctrl-D", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Download | "));
            status_spans.push(Span::styled("Ctrl-S", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Share | "));
        }
    }

    status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

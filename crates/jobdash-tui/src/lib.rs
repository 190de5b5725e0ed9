// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use jobdash_app::{
    ApplicationRecord, CanonicalStatus, DashboardBody, DashboardCommand, DashboardEvent,
    DashboardState, ExportArtifact, InputMode, LoadState, StatusSummary, export_artifact,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;

pub const EMPTY_RESULT_MESSAGE: &str = "No applications match your filters.";
pub const LOADING_MESSAGE: &str = "Loading…";
const TABLE_COLUMNS: [&str; 5] = ["Company", "Role", "Location", "Status", "Last updated"];
const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);

/// Side effects the dashboard needs from its host: fetching records and
/// delivering export files.
pub trait AppRuntime {
    /// Short description of where records come from, shown in the header.
    fn source_label(&self) -> String;
    fn fetch_applications(&mut self) -> Result<Vec<ApplicationRecord>>;
    fn save_export(&mut self, artifact: &ExportArtifact) -> Result<PathBuf>;

    /// Runs a retrieval and reports back over `tx`. The default runs inline;
    /// hosts with slow sources move the fetch onto a worker thread.
    fn spawn_retrieval(&mut self, request_id: u64, tx: Sender<InternalEvent>) -> Result<()> {
        let result = self
            .fetch_applications()
            .map_err(|error| format!("{error:#}"));
        tx.send(InternalEvent::Retrieval { request_id, result })
            .map_err(|_| anyhow::anyhow!("retrieval event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    Retrieval {
        request_id: u64,
        result: std::result::Result<Vec<ApplicationRecord>, String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    source_label: String,
    selected_row: usize,
    help_visible: bool,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(state: &mut DashboardState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData {
        source_label: runtime.source_label(),
        ..ViewData::default()
    };
    let (internal_tx, internal_rx) = mpsc::channel();
    start_load(state, runtime, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn start_load<R: AppRuntime>(
    state: &mut DashboardState,
    runtime: &mut R,
    internal_tx: &Sender<InternalEvent>,
) {
    let DashboardEvent::LoadStarted { request_id } = state.begin_load() else {
        return;
    };
    if let Err(error) = runtime.spawn_retrieval(request_id, internal_tx.clone()) {
        state.complete_load(request_id, Err(format!("{error:#}")));
    }
}

fn process_internal_events(
    state: &mut DashboardState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(DashboardCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Retrieval { request_id, result } => {
                let events = state.complete_load(request_id, result);
                handle_load_events(state, view_data, tx, &events);
            }
        }
    }
}

fn handle_load_events(
    state: &mut DashboardState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    events: &[DashboardEvent],
) {
    for event in events {
        match event {
            DashboardEvent::RecordsLoaded { count, .. } => {
                view_data.selected_row = 0;
                let noun = if *count == 1 {
                    "application"
                } else {
                    "applications"
                };
                emit_status(state, view_data, tx, format!("loaded {count} {noun}"));
            }
            DashboardEvent::LoadFailed { .. } => {
                view_data.selected_row = 0;
                emit_status(state, view_data, tx, "load failed; press r to retry");
            }
            _ => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_DELAY);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut DashboardState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(DashboardCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut DashboardState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if state.input == InputMode::Search {
        handle_search_key(state, view_data, key);
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('/') => {
            state.dispatch(DashboardCommand::EnterSearch);
        }
        KeyCode::Esc => {
            if !state.view.query.is_empty() {
                dispatch_view_command(state, view_data, DashboardCommand::ClearQuery);
                emit_status(state, view_data, internal_tx, "search cleared");
            }
        }
        KeyCode::Char('s') | KeyCode::Char('S') => {
            let delta = if key.code == KeyCode::Char('S') { -1 } else { 1 };
            dispatch_view_command(state, view_data, DashboardCommand::RotateStatusFilter(delta));
            let label = state.view.status_filter.as_str();
            emit_status(state, view_data, internal_tx, format!("status: {label}"));
        }
        KeyCode::Char('o') => {
            dispatch_view_command(state, view_data, DashboardCommand::RotateSortKey(1));
            let label = state.view.sort_key.label();
            emit_status(state, view_data, internal_tx, format!("sort: {label}"));
        }
        KeyCode::Char('r') => {
            start_load(state, runtime, internal_tx);
            if matches!(state.load, LoadState::Loading { .. }) {
                emit_status(state, view_data, internal_tx, "reloading");
            }
        }
        KeyCode::Char('e') => export_visible(state, runtime, view_data, internal_tx),
        KeyCode::Char('j') | KeyCode::Down => move_row(state, view_data, 1),
        KeyCode::Char('k') | KeyCode::Up => move_row(state, view_data, -1),
        KeyCode::Char('g') | KeyCode::Home => view_data.selected_row = 0,
        KeyCode::Char('G') | KeyCode::End => move_row(state, view_data, isize::MAX),
        KeyCode::Char('?') => view_data.help_visible = true,
        _ => {}
    }
    false
}

fn handle_search_key(state: &mut DashboardState, view_data: &mut ViewData, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            state.dispatch(DashboardCommand::ExitSearch);
        }
        KeyCode::Backspace => {
            dispatch_view_command(state, view_data, DashboardCommand::PopQueryChar);
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            dispatch_view_command(state, view_data, DashboardCommand::PushQueryChar(ch));
        }
        _ => {}
    }
}

/// Applies a view edit and puts the cursor back on the first row when the
/// visible set changed under it.
fn dispatch_view_command(
    state: &mut DashboardState,
    view_data: &mut ViewData,
    command: DashboardCommand,
) {
    let events = state.dispatch(command);
    if events
        .iter()
        .any(|event| matches!(event, DashboardEvent::ViewChanged(_)))
    {
        view_data.selected_row = 0;
    }
}

fn move_row(state: &mut DashboardState, view_data: &mut ViewData, delta: isize) {
    let row_count = state.derived().len();
    if row_count == 0 {
        view_data.selected_row = 0;
        return;
    }

    let current = view_data.selected_row;
    let next = if delta.is_negative() {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta as usize)
    };
    view_data.selected_row = next.min(row_count.saturating_sub(1));
}

fn export_visible<R: AppRuntime>(
    state: &mut DashboardState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if state.load != LoadState::Ready {
        emit_status(state, view_data, internal_tx, "nothing to export yet");
        return;
    }

    let today = OffsetDateTime::now_utc().date();
    let artifact = export_artifact(state.derived().rows, today);
    let message = match runtime.save_export(&artifact) {
        Ok(path) => {
            tracing::info!(rows = artifact.row_count, path = %path.display(), "export written");
            format!("exported {} rows to {}", artifact.row_count, path.display())
        }
        Err(error) => {
            tracing::warn!(error = %error, "export failed");
            format!("export failed: {error}")
        }
    };
    emit_status(state, view_data, internal_tx, message);
}

fn render(frame: &mut ratatui::Frame<'_>, state: &mut DashboardState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let header = Paragraph::new(filter_bar_text(state)).block(
        Block::default()
            .title(header_title(view_data))
            .borders(Borders::ALL),
    );
    frame.render_widget(header, layout[0]);

    // Counts only describe a loaded store.
    let chip_spans = if state.load == LoadState::Ready {
        summary_chip_spans(&state.derived().summary)
    } else {
        Vec::new()
    };
    let chips = Paragraph::new(Line::from(chip_spans))
        .block(Block::default().borders(Borders::ALL).title("summary"));
    frame.render_widget(chips, layout[1]);

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::TOP));

    render_body(frame, layout[2], state, view_data.selected_row);
    frame.render_widget(status, layout[3]);

    if view_data.help_visible {
        let area = centered_rect(64, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_body(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &mut DashboardState,
    selected_row: usize,
) {
    let block = Block::default().borders(Borders::ALL);
    match state.body() {
        DashboardBody::Loading => {
            let loading = Paragraph::new(LOADING_MESSAGE).block(block.title("applications"));
            frame.render_widget(loading, area);
        }
        DashboardBody::Failed(message) => {
            let failed = Paragraph::new(message.to_owned())
                .style(Style::default().fg(Color::Red))
                .block(block.title("applications"));
            frame.render_widget(failed, area);
        }
        DashboardBody::Empty => {
            let empty = Paragraph::new(EMPTY_RESULT_MESSAGE)
                .style(Style::default().fg(Color::DarkGray))
                .block(block.title("applications (0)"));
            frame.render_widget(empty, area);
        }
        DashboardBody::Rows(view) => {
            let header = Row::new(TABLE_COLUMNS.iter().map(|label| {
                Cell::from(*label).style(
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
            }));
            let rows = view.rows.iter().map(|record| {
                let color = status_color(record.canonical_status());
                let cells = table_row_cells(record);
                Row::new(cells.into_iter().enumerate().map(|(index, text)| {
                    let style = if index == 3 {
                        Style::default().fg(color)
                    } else {
                        Style::default()
                    };
                    Cell::from(text).style(style)
                }))
            });
            let widths = [
                Constraint::Percentage(22),
                Constraint::Percentage(26),
                Constraint::Percentage(20),
                Constraint::Percentage(14),
                Constraint::Percentage(18),
            ];
            let table = Table::new(rows, widths)
                .header(header)
                .column_spacing(1)
                .row_highlight_style(Style::default().bg(Color::DarkGray))
                .block(block.title(format!("applications ({})", view.len())));
            let mut table_state =
                TableState::default().with_selected(Some(selected_row.min(view.len() - 1)));
            frame.render_stateful_widget(table, area, &mut table_state);
        }
    }
}

fn header_title(view_data: &ViewData) -> String {
    if view_data.source_label.is_empty() {
        "jobdash".to_owned()
    } else {
        format!("jobdash · {}", view_data.source_label)
    }
}

fn filter_bar_text(state: &DashboardState) -> String {
    let cursor = if state.input == InputMode::Search {
        "_"
    } else {
        ""
    };
    format!(
        "search: {}{cursor} | status: {} | sort: {}",
        state.view.query,
        state.view.status_filter.as_str(),
        state.view.sort_key.label()
    )
}

fn summary_chip_labels(summary: &StatusSummary) -> Vec<String> {
    std::iter::once(format!("Total {}", summary.total))
        .chain(
            summary
                .iter()
                .map(|(status, count)| format!("{} {count}", status.title())),
        )
        .collect()
}

fn summary_chip_spans(summary: &StatusSummary) -> Vec<Span<'static>> {
    let colors = std::iter::once(Color::White)
        .chain(CanonicalStatus::ALL.into_iter().map(status_color));
    summary_chip_labels(summary)
        .into_iter()
        .zip(colors)
        .flat_map(|(label, color)| {
            [
                Span::styled(format!(" {label} "), Style::default().fg(color)),
                Span::raw(" "),
            ]
        })
        .collect()
}

fn table_row_cells(record: &ApplicationRecord) -> [String; 5] {
    [
        record.company_label().to_owned(),
        record.role_label().to_owned(),
        record.location_label().to_owned(),
        record.status_label().to_owned(),
        record.updated_label(),
    ]
}

fn status_color(status: CanonicalStatus) -> Color {
    match status {
        CanonicalStatus::Applied => Color::Blue,
        CanonicalStatus::Assessment => Color::Magenta,
        CanonicalStatus::Interview => Color::Yellow,
        CanonicalStatus::Offer => Color::Green,
        CanonicalStatus::Rejected => Color::Red,
        CanonicalStatus::Other => Color::Gray,
    }
}

fn status_text(state: &DashboardState, view_data: &ViewData) -> String {
    if view_data.help_visible {
        return String::new();
    }

    let (mode, default) = match state.input {
        InputMode::Nav => (
            "NAV",
            "/ search | esc clear | s/S status | o sort | r reload | e export | j/k g/G | ? help | q",
        ),
        InputMode::Search => ("SEARCH", "type to filter | backspace | enter/esc done"),
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {default}"),
        None => format!("{mode} | {default}"),
    }
}

fn help_overlay_text() -> &'static str {
    "search: / start | type filter | backspace delete | enter/esc leave\n\
nav: esc clear search | s/S next/prev status | o next sort\n\
nav: j/k or up/down move | g/G first/last\n\
data: r reload | e export visible rows to csv\n\
global: ? help | q or ctrl+q quit"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

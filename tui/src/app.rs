//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, resize)
//! - A [`PracticeHandle`] for sending commands to the engine
//! - [`DisplayState`] for rendering
//!
//! The App:
//! 1. Converts key presses to `PlaybackCommand`s
//! 2. Sends them to the practice runner through the handle
//! 3. Receives `PlaybackMessage`s and updates `DisplayState`
//! 4. Renders based on `DisplayState`

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use unicode_width::UnicodeWidthStr;

use practice_core::{format_clock, PlaybackMessage, PlaybackStatus, PracticeHandle};

use crate::display::{DisplayEnding, DisplayState};
use crate::keymap::{self, KeyAction};
use crate::theme;
use crate::widgets::PoseCard;

/// Redraw interval for notifications and the exit screen
const FRAME_DURATION: Duration = Duration::from_millis(100);

/// Closing lines shown after a completed practice
const CLOSING_LINES: &[&str] = &[
    "Namaste.",
    "Well done. Carry this calm with you.",
    "Take a breath before you move on.",
    "Your practice is complete.",
    "Thank you for showing up today.",
    "Rest in the stillness for a moment.",
];

/// Main application state
pub struct App {
    // === Core State ===
    /// Is the app still running?
    running: bool,
    /// Closing line shown after completion
    closing_line: Option<String>,

    // === Engine Integration ===
    /// Command channel into the practice runner
    handle: PracticeHandle,
    /// Messages from the engine
    messages: mpsc::UnboundedReceiver<PlaybackMessage>,
    /// The engine has dropped its sender
    engine_gone: bool,
    /// Display state derived from PlaybackMessages
    display: DisplayState,
}

impl App {
    /// Create an app around a running practice
    pub fn new(handle: PracticeHandle, messages: mpsc::UnboundedReceiver<PlaybackMessage>) -> Self {
        Self {
            running: true,
            closing_line: None,
            handle,
            messages,
            engine_gone: false,
            display: DisplayState::new(),
        }
    }

    /// Run the main loop until the player leaves or dismisses the end screen
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut events = EventStream::new();
        let mut frames = tokio::time::interval(FRAME_DURATION);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        terminal.draw(|frame| draw(frame, &self.display, self.closing_line.as_deref()))?;

        while self.running {
            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = events.next() => match maybe_event {
                    // Only handle Press events (not Release or Repeat)
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!("Terminal event error: {}", e);
                        self.quit();
                    }
                    None => self.quit(),
                },

                msg = self.messages.recv(), if !self.engine_gone => match msg {
                    Some(msg) => self.apply_message(msg),
                    None => {
                        tracing::debug!("Engine closed its message channel");
                        self.engine_gone = true;
                        if !self.display.is_over() {
                            self.running = false;
                        }
                    }
                },

                _ = frames.tick() => self.display.update(),
            }

            terminal.draw(|frame| draw(frame, &self.display, self.closing_line.as_deref()))?;
        }

        Ok(())
    }

    /// Apply a message from the engine
    fn apply_message(&mut self, msg: PlaybackMessage) {
        if matches!(msg, PlaybackMessage::Completed { .. }) {
            self.closing_line = Some(pick_closing_line());
        }
        self.display.apply_message(msg);

        if matches!(self.display.ending, Some(DisplayEnding::Exited)) {
            self.running = false;
        }
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyEvent) {
        let settings = self.display.settings();
        match keymap::map_key(key, &settings, self.display.is_over()) {
            Some(KeyAction::Command(command)) => {
                if !self.handle.send(command) {
                    tracing::debug!(command = command.name(), "Practice already ended");
                    self.quit();
                }
            }
            Some(KeyAction::Dismiss) => self.running = false,
            None => {}
        }
    }

    /// Leave, telling the engine first
    fn quit(&mut self) {
        self.handle.exit();
        self.running = false;
    }

    /// Closing line for the terminal after the TUI closes
    pub fn goodbye(&self) -> Option<&str> {
        self.closing_line.as_deref()
    }

    /// How the practice ended, if it did
    pub fn ending(&self) -> Option<&DisplayEnding> {
        self.display.ending.as_ref()
    }
}

/// Pick a random closing line
fn pick_closing_line() -> String {
    let idx = rand::random::<usize>() % CLOSING_LINES.len();
    CLOSING_LINES[idx].to_string()
}

// ============================================================================
// Rendering
// ============================================================================

/// Draw the whole screen
pub fn draw(frame: &mut Frame, display: &DisplayState, closing_line: Option<&str>) {
    let area = frame.area();
    match &display.ending {
        Some(DisplayEnding::Completed(summary)) => {
            let lines = vec![
                Line::styled("Practice complete", theme::status_style(PlaybackStatus::Completed)),
                Line::raw(""),
                Line::raw(format!(
                    "{} poses · {} min",
                    summary.poses_completed, summary.duration_minutes
                )),
                Line::raw(""),
                Line::styled(closing_line.unwrap_or_default().to_string(), Style::default().fg(theme::SAGE)),
                Line::raw(""),
                Line::styled("press any key", theme::dim()),
            ];
            draw_centered(frame, area, lines);
        }
        Some(DisplayEnding::Failed { kind, message }) => {
            let lines = vec![
                Line::styled(
                    format!("Could not load sequence ({})", kind.label()),
                    theme::status_style(PlaybackStatus::Failed),
                ),
                Line::raw(""),
                Line::raw(message.clone()),
                Line::raw(""),
                Line::styled("press any key", theme::dim()),
            ];
            draw_centered(frame, area, lines);
        }
        Some(DisplayEnding::Exited) => {}
        None => draw_practice(frame, area, display),
    }
}

fn draw_centered(frame: &mut Frame, area: Rect, lines: Vec<Line<'static>>) {
    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .areas(area);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        middle,
    );
}

fn draw_practice(frame: &mut Frame, area: Rect, display: &DisplayState) {
    let [header, body, countdown, gauge, up_next, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Length(1),
    ])
    .areas(area);

    draw_header(frame, header, display);

    let Some(snapshot) = display.snapshot.as_ref() else {
        frame.render_widget(
            Paragraph::new("Loading sequence…")
                .alignment(Alignment::Center)
                .style(theme::dim()),
            body,
        );
        return;
    };

    let block = Block::default().borders(Borders::TOP).border_style(theme::dim());
    let inner = block.inner(body);
    frame.render_widget(block, body);

    // Lead-in shows the first pose as a preview
    let pose = match snapshot.status {
        PlaybackStatus::Ready => snapshot.next.as_ref(),
        _ => snapshot.current.as_ref(),
    };
    if let Some(pose) = pose {
        let [_, card] =
            Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(inner);
        frame.render_widget(PoseCard::new(pose), card);
    }

    let clock = match snapshot.status {
        PlaybackStatus::Ready => format!("Get ready  {}", format_clock(snapshot.remaining_seconds)),
        PlaybackStatus::Paused => format!("{}  (paused)", format_clock(snapshot.remaining_seconds)),
        _ => format_clock(snapshot.remaining_seconds),
    };
    frame.render_widget(
        Paragraph::new(clock)
            .alignment(Alignment::Center)
            .style(theme::countdown_style(display.up_next.is_some())),
        countdown,
    );

    let total = format_clock(u32::try_from(snapshot.total_seconds).unwrap_or(u32::MAX));
    let elapsed = format_clock(u32::try_from(snapshot.elapsed_seconds).unwrap_or(u32::MAX));
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(theme::SAGE))
            .ratio(snapshot.progress())
            .label(format!("{elapsed} / {total}")),
        gauge,
    );

    if let Some(next) = display.up_next.as_ref() {
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("Up next: ", theme::dim()),
                Span::styled(next.name.clone(), Style::default().fg(theme::SAND)),
            ]))
            .alignment(Alignment::Center),
            up_next,
        );
    }

    draw_footer(frame, footer, display);
}

fn draw_header(frame: &mut Frame, area: Rect, display: &DisplayState) {
    let status = display.status();
    let name = display.sequence_name.as_deref().unwrap_or("yogaflow");
    let position = display
        .snapshot
        .as_ref()
        .and_then(|s| s.position_label())
        .unwrap_or_default();

    let badge = format!(" {} ", status.name());
    let right = format!("{position} ");
    let room = (area.width as usize).saturating_sub(badge.width() + right.width() + 1);

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(badge, theme::status_style(status)),
            Span::raw(" "),
            Span::raw(truncate(name, room)),
        ])),
        area,
    );
    frame.render_widget(
        Paragraph::new(right)
            .alignment(Alignment::Right)
            .style(theme::dim()),
        area,
    );
}

fn draw_footer(frame: &mut Frame, area: Rect, display: &DisplayState) {
    let settings = display.settings();
    let indicators = format!(
        "{}vol {:.0}%  warn {}s ",
        if display.muted() { "[muted]  " } else { "" },
        settings.volume * 100.0,
        settings.transition_warning_seconds,
    );

    let left = match display.notification.as_ref() {
        Some(n) => Span::styled(format!(" {}", n.text), Style::default().fg(theme::SAND)),
        None => Span::styled(format!(" {}", keymap::HELP), theme::dim()),
    };
    frame.render_widget(Paragraph::new(Line::from(left)), area);
    frame.render_widget(
        Paragraph::new(indicators)
            .alignment(Alignment::Right)
            .style(theme::dim()),
        area,
    );
}

/// Cut `text` to at most `max` display columns
fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w + 1 > max {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

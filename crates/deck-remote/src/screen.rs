//! Screen — the rendering collaborator surface.
//!
//! The navigation core never touches a widget directly: it calls this trait
//! with fully-computed view state, and the concrete screen decides how to
//! draw it.  `TermScreen` is the ratatui implementation; `NullScreen` keeps a
//! session alive when no terminal capability is available.

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::navigator::Row;
use crate::transport::{Clock, Tempo};

pub trait Screen {
    /// Replace the visible playlist rows with `items`.
    fn render_level(&mut self, items: &[Row]);
    /// Move the single selection highlight to `index`.
    fn mark_selected(&mut self, index: usize);
    /// Rewrite the label of every visible row with this id.
    fn update_label(&mut self, id: u64, label: &str);
    fn update_clock(&mut self, clock: &Clock);
    fn update_tempo(&mut self, tempo: &Tempo);
    fn update_track_header(&mut self, name: &str, tonality: &str);
}

/// No-op screen used when the terminal cannot be set up.  The session keeps
/// running (remote navigation, caching, outbound commands all still work);
/// only the local display is lost.
#[derive(Debug, Default)]
pub struct NullScreen;

impl Screen for NullScreen {
    fn render_level(&mut self, _items: &[Row]) {}
    fn mark_selected(&mut self, _index: usize) {}
    fn update_label(&mut self, _id: u64, _label: &str) {}
    fn update_clock(&mut self, _clock: &Clock) {}
    fn update_tempo(&mut self, _tempo: &Tempo) {}
    fn update_track_header(&mut self, _name: &str, _tonality: &str) {}
}

/// Terminal screen state.  `Screen` calls only mutate fields; `draw` renders
/// the current state into a frame, so a redraw is always idempotent.
#[derive(Debug, Default)]
pub struct TermScreen {
    rows: Vec<(u64, String)>,
    selected: usize,
    track_name: String,
    tonality: String,
    clock: Option<Clock>,
    tempo: Option<Tempo>,
}

impl TermScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(frame.area());

        // Header: track name left, tonality right.
        let header = Line::from(vec![
            Span::styled(
                self.track_name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(self.tonality.clone(), Style::default().fg(Color::Cyan)),
        ]);
        frame.render_widget(Paragraph::new(header), chunks[0]);

        // Playlist rows.
        let items: Vec<ListItem> = self
            .rows
            .iter()
            .map(|(_, label)| ListItem::new(label.clone()))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::TOP))
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            );
        let mut state = ListState::default();
        if !self.rows.is_empty() {
            state.select(Some(self.selected.min(self.rows.len() - 1)));
        }
        frame.render_stateful_widget(list, chunks[1], &mut state);

        // Transport bar.
        let mut spans = Vec::new();
        if let Some(clock) = &self.clock {
            spans.push(Span::raw(format!(
                "-{}:{}.{}  {:6.2}%",
                clock.minutes, clock.seconds, clock.hundredths, clock.percent
            )));
        }
        if let Some(tempo) = &self.tempo {
            spans.push(Span::raw(format!(
                "  {}{}%  {} BPM",
                tempo.sign,
                tempo.magnitude_text(),
                tempo.bpm_text()
            )));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), chunks[2]);
    }
}

impl Screen for TermScreen {
    fn render_level(&mut self, items: &[Row]) {
        self.rows = items
            .iter()
            .map(|row| (row.id, row.label.clone()))
            .collect();
        self.selected = 0;
    }

    fn mark_selected(&mut self, index: usize) {
        self.selected = index;
    }

    fn update_label(&mut self, id: u64, label: &str) {
        for (row_id, row_label) in &mut self.rows {
            if *row_id == id {
                *row_label = label.to_string();
            }
        }
    }

    fn update_clock(&mut self, clock: &Clock) {
        self.clock = Some(clock.clone());
    }

    fn update_tempo(&mut self, tempo: &Tempo) {
        self.tempo = Some(tempo.clone());
    }

    fn update_track_header(&mut self, name: &str, tonality: &str) {
        self.track_name = name.to_string();
        self.tonality = tonality.to_string();
    }
}

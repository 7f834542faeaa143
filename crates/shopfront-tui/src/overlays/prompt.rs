//! Single-line prompt for listing filters (search text, price bounds).

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use shopfront_core::catalog::ListingQuery;
use shopfront_core::route::Route;

use super::OverlayUpdate;
use super::render_utils::{
    InputHint, calculate_overlay_area, field_line, render_hints, render_overlay_container,
};
use crate::mutations::StateMutation;
use crate::state::TuiState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Search,
    MinPrice,
    MaxPrice,
}

impl PromptKind {
    /// The listing query key this prompt edits.
    pub fn key(self) -> &'static str {
        match self {
            PromptKind::Search => ListingQuery::SEARCH,
            PromptKind::MinPrice => ListingQuery::MIN_PRICE,
            PromptKind::MaxPrice => ListingQuery::MAX_PRICE,
        }
    }

    fn title(self) -> &'static str {
        match self {
            PromptKind::Search => "Search Products",
            PromptKind::MinPrice => "Minimum Price",
            PromptKind::MaxPrice => "Maximum Price",
        }
    }

    fn label(self) -> &'static str {
        match self {
            PromptKind::Search => "Search",
            PromptKind::MinPrice | PromptKind::MaxPrice => "Price $",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PromptState {
    pub kind: PromptKind,
    pub value: String,
    pub error: Option<String>,
}

impl PromptState {
    /// Opens prefilled with the query's current value for this prompt.
    pub fn open(kind: PromptKind, query: &ListingQuery) -> Self {
        Self {
            kind,
            value: query.get(kind.key()).unwrap_or_default().to_string(),
            error: None,
        }
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => OverlayUpdate::close(),
            KeyCode::Char('c') if ctrl => OverlayUpdate::close(),
            KeyCode::Char('u') if ctrl => {
                self.value.clear();
                OverlayUpdate::stay()
            }
            KeyCode::Backspace => {
                self.value.pop();
                self.error = None;
                OverlayUpdate::stay()
            }
            KeyCode::Enter => self.submit(tui),
            KeyCode::Char(c) if !ctrl => {
                self.value.push(c);
                self.error = None;
                OverlayUpdate::stay()
            }
            _ => OverlayUpdate::stay(),
        }
    }

    fn submit(&mut self, tui: &TuiState) -> OverlayUpdate {
        let value = self.value.trim();
        if self.kind != PromptKind::Search
            && !value.is_empty()
            && !value
                .parse::<f64>()
                .is_ok_and(|v| v.is_finite() && v >= 0.0)
        {
            self.error = Some("Enter a price like 25 or 19.99".to_string());
            return OverlayUpdate::stay();
        }

        let query = tui.listing_query().cloned().unwrap_or_default();
        let next = query.with_filter(self.kind.key(), value);
        OverlayUpdate::close().with_mutations(vec![StateMutation::Navigate(Route::Products(next))])
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let popup = calculate_overlay_area(area, 50, 7);
        let inner = render_overlay_container(frame, popup, self.kind.title(), Color::Yellow);
        let body = Rect::new(
            inner.x + 1,
            inner.y,
            inner.width.saturating_sub(2),
            inner.height.saturating_sub(1),
        );

        let mut lines = vec![
            Line::from(""),
            field_line(self.kind.label(), &self.value, true, false, body.width),
        ];
        if let Some(error) = &self.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        frame.render_widget(Paragraph::new(lines), body);
        render_hints(
            frame,
            inner,
            &[
                InputHint::new("Enter", "apply"),
                InputHint::new("Ctrl+U", "clear"),
                InputHint::new("Esc", "cancel"),
            ],
            Color::Yellow,
        );
    }
}

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::common::truncate_to_width;

/// Centers a `width` x `height` box in `area`, shrinking it to fit.
pub fn calculate_overlay_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));

    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

/// Clears the background and draws the bordered, titled frame.
/// Returns the area inside the border.
pub fn render_overlay_container(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    border_color: Color,
) -> Rect {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {title} "))
        .title_style(
            Style::default()
                .fg(border_color)
                .add_modifier(Modifier::BOLD),
        );
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

pub struct InputHint<'a> {
    pub key: &'a str,
    pub action: &'a str,
}

impl<'a> InputHint<'a> {
    pub fn new(key: &'a str, action: &'a str) -> Self {
        Self { key, action }
    }
}

/// Renders `key action • key action` centered on the last row of `area`.
pub fn render_hints(frame: &mut Frame, area: Rect, hints: &[InputHint], highlight_color: Color) {
    if area.height == 0 {
        return;
    }
    let row = Rect::new(area.x, area.y + area.height - 1, area.width, 1);
    frame.render_widget(
        Paragraph::new(hint_line(hints, highlight_color)).alignment(Alignment::Center),
        row,
    );
}

pub fn hint_line(hints: &[InputHint], highlight_color: Color) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(
            hint.key.to_string(),
            Style::default().fg(highlight_color),
        ));
        spans.push(Span::styled(
            format!(" {}", hint.action),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

/// A labelled text field: `Label: value█`. The cursor is drawn only when
/// focused; `masked` replaces each character with a bullet.
pub fn field_line(
    label: &str,
    value: &str,
    focused: bool,
    masked: bool,
    width: u16,
) -> Line<'static> {
    let shown = if masked {
        "•".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let label = format!("{label:<10}");
    let room = (width as usize).saturating_sub(label.width() + 1);
    // Keep the end of long input visible while typing.
    let shown = if shown.width() > room {
        let tail: String = shown.chars().rev().take(room).collect();
        tail.chars().rev().collect()
    } else {
        truncate_to_width(&shown, room)
    };

    let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut spans = vec![
        Span::styled(label, label_style),
        Span::styled(shown, Style::default().fg(Color::White)),
    ];
    if focused {
        spans.push(Span::styled("█", Style::default().fg(Color::Cyan)));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_overlay_area_is_centered_and_clamped() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(calculate_overlay_area(area, 50, 10), Rect::new(25, 15, 50, 10));

        let small = Rect::new(0, 0, 30, 8);
        let popup = calculate_overlay_area(small, 50, 20);
        assert_eq!((popup.width, popup.height), (26, 6));
    }

    #[test]
    fn test_masked_field_hides_value() {
        let line = field_line("Password", "secret", true, true, 40);
        let rendered = text(&line);
        assert!(rendered.contains("••••••█"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_long_field_shows_tail() {
        let line = field_line("Email", "someone.with.a.long.address@example.com", false, false, 24);
        assert!(text(&line).ends_with("example.com"));
    }
}

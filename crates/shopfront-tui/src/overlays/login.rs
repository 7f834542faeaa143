//! Login / registration modal.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use shopfront_core::auth::AuthEvent;

use super::OverlayUpdate;
use super::render_utils::{
    InputHint, calculate_overlay_area, field_line, render_hints, render_overlay_container,
};
use crate::mutations::StateMutation;
use crate::state::TuiState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthTab {
    #[default]
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FullName,
    Email,
    Password,
}

impl AuthTab {
    fn fields(self) -> &'static [Field] {
        match self {
            AuthTab::Login => &[Field::Email, Field::Password],
            AuthTab::Register => &[Field::FullName, Field::Email, Field::Password],
        }
    }

    fn toggle(self) -> Self {
        match self {
            AuthTab::Login => AuthTab::Register,
            AuthTab::Register => AuthTab::Login,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequest {
    Login {
        email: String,
        password: String,
    },
    Register {
        email: String,
        password: String,
        full_name: String,
    },
}

#[derive(Debug, Clone)]
pub struct LoginState {
    pub tab: AuthTab,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub focus: Field,
    pub error: Option<String>,
    /// A request is in flight; input is ignored until it returns.
    pub submitting: bool,
}

impl LoginState {
    pub fn open() -> Self {
        Self::with_tab(AuthTab::Login)
    }

    pub fn with_tab(tab: AuthTab) -> Self {
        Self {
            tab,
            full_name: String::new(),
            email: String::new(),
            password: String::new(),
            focus: tab.fields()[0],
            error: None,
            submitting: false,
        }
    }

    /// Back to editable after a rejected submit.
    pub fn fail(&mut self, error: String) {
        self.submitting = false;
        self.error = Some(error);
        self.password.clear();
        self.focus = Field::Password;
    }

    fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::FullName => &mut self.full_name,
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
        }
    }

    fn step_focus(&mut self, forward: bool) {
        let fields = self.tab.fields();
        let pos = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (pos + 1) % fields.len()
        } else {
            (pos + fields.len() - 1) % fields.len()
        };
        self.focus = fields[next];
    }

    fn switch_tab(&mut self) {
        self.tab = self.tab.toggle();
        self.error = None;
        self.focus = self.tab.fields()[0];
    }

    fn request(&self) -> AuthRequest {
        match self.tab {
            AuthTab::Login => AuthRequest::Login {
                email: self.email.clone(),
                password: self.password.clone(),
            },
            AuthTab::Register => AuthRequest::Register {
                email: self.email.clone(),
                password: self.password.clone(),
                full_name: self.full_name.clone(),
            },
        }
    }

    pub fn handle_key(&mut self, _tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if key.code == KeyCode::Esc || (ctrl && key.code == KeyCode::Char('c')) {
            return OverlayUpdate::close();
        }
        if self.submitting {
            return OverlayUpdate::stay();
        }

        match key.code {
            KeyCode::Left | KeyCode::Right => self.switch_tab(),
            KeyCode::Tab | KeyCode::Down => self.step_focus(true),
            KeyCode::BackTab | KeyCode::Up => self.step_focus(false),
            KeyCode::Backspace => {
                self.value_mut(self.focus).pop();
            }
            KeyCode::Enter => {
                self.submitting = true;
                self.error = None;
                return OverlayUpdate::stay().with_mutations(vec![
                    StateMutation::Auth(AuthEvent::Submit),
                    StateMutation::SubmitAuth(self.request()),
                ]);
            }
            KeyCode::Char(c) if !ctrl => self.value_mut(self.focus).push(c),
            _ => {}
        }
        OverlayUpdate::stay()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let height = 9 + self.tab.fields().len() as u16 * 2;
        let popup = calculate_overlay_area(area, 56, height);
        let title = match self.tab {
            AuthTab::Login => "Login",
            AuthTab::Register => "Create Account",
        };
        let inner = render_overlay_container(frame, popup, title, Color::Cyan);
        let body = Rect::new(
            inner.x + 1,
            inner.y,
            inner.width.saturating_sub(2),
            inner.height.saturating_sub(1),
        );

        frame.render_widget(Paragraph::new(self.lines(body.width)), body);
        render_hints(
            frame,
            inner,
            &[
                InputHint::new("Tab", "next field"),
                InputHint::new("←/→", "switch tab"),
                InputHint::new("Esc", "close"),
            ],
            Color::Cyan,
        );
    }

    fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let tab_style = |tab: AuthTab| {
            if tab == self.tab {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            }
        };
        let mut lines = vec![
            Line::from(vec![
                Span::styled(" Login ", tab_style(AuthTab::Login)),
                Span::raw("  "),
                Span::styled(" Register ", tab_style(AuthTab::Register)),
            ]),
            Line::from(""),
        ];

        for field in self.tab.fields() {
            let (label, value, masked) = match field {
                Field::FullName => ("Full name", &self.full_name, false),
                Field::Email => ("Email", &self.email, false),
                Field::Password => ("Password", &self.password, true),
            };
            let focused = !self.submitting && *field == self.focus;
            lines.push(field_line(label, value, focused, masked, width));
            lines.push(Line::from(""));
        }

        if let Some(error) = &self.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(""));
        }

        let submit = match (self.tab, self.submitting) {
            (AuthTab::Login, false) => "[ Enter ] Login",
            (AuthTab::Login, true) => "Logging in...",
            (AuthTab::Register, false) => "[ Enter ] Register",
            (AuthTab::Register, true) => "Creating account...",
        };
        let submit_style = if self.submitting {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(Span::styled(submit, submit_style)));
        lines
    }
}

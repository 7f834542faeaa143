//! Overlay modules for the TUI.
//!
//! Overlays are modal components that take over keyboard input while open.
//! Each owns its state, key handler, and render function.
//!
//! - `login.rs`: login / registration modal
//! - `prompt.rs`: one-line input for search and price filters
//! - `render_utils.rs`: shared drawing helpers

pub mod login;
pub mod prompt;
pub mod render_utils;

use crossterm::event::KeyEvent;
pub use login::{AuthRequest, AuthTab, LoginState};
pub use prompt::{PromptKind, PromptState};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::mutations::StateMutation;
use crate::state::TuiState;

/// Transition returned by overlay key handlers.
#[derive(Debug)]
pub enum OverlayTransition {
    Stay,
    Close,
}

/// Update returned by overlay key handlers.
#[derive(Debug)]
pub struct OverlayUpdate {
    pub transition: OverlayTransition,
    pub mutations: Vec<StateMutation>,
}

impl OverlayUpdate {
    fn new(transition: OverlayTransition) -> Self {
        Self {
            transition,
            mutations: Vec::new(),
        }
    }

    pub fn stay() -> Self {
        Self::new(OverlayTransition::Stay)
    }

    pub fn close() -> Self {
        Self::new(OverlayTransition::Close)
    }

    #[must_use]
    pub fn with_mutations(mut self, mutations: Vec<StateMutation>) -> Self {
        self.mutations = mutations;
        self
    }
}

#[derive(Debug)]
pub enum Overlay {
    Login(LoginState),
    Prompt(PromptState),
}

impl Overlay {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        match self {
            Overlay::Login(l) => l.render(frame, area),
            Overlay::Prompt(p) => p.render(frame, area),
        }
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        match self {
            Overlay::Login(l) => l.handle_key(tui, key),
            Overlay::Prompt(p) => p.handle_key(tui, key),
        }
    }

    pub fn as_login_mut(&mut self) -> Option<&mut LoginState> {
        match self {
            Overlay::Login(l) => Some(l),
            Overlay::Prompt(_) => None,
        }
    }
}

//! Effect handlers for the TUI runtime.
//!
//! Handlers are async functions that perform I/O and return a `UiEvent`.
//! They never touch state; the runtime spawns them and sends the result to
//! the inbox.

pub mod auth;
pub mod cart;
pub mod metrics;
pub mod page;

pub use auth::*;
pub use cart::*;
pub use metrics::*;
pub use page::*;

/// Display form of an error for toasts and inline messages.
fn display(e: &anyhow::Error) -> String {
    format!("{e:#}")
}

#[cfg(test)]
mod tests;

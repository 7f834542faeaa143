//! Full-screen storefront TUI.

pub mod common;
pub mod components;
pub mod effects;
pub mod events;
pub mod mutations;
pub mod overlays;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stderr};

use anyhow::Result;
pub use runtime::TuiRuntime;
use shopfront_core::Services;
use shopfront_core::route::Route;

/// Runs the storefront TUI starting at `route`.
///
/// # Errors
/// Returns an error if there is no terminal or the terminal fails.
pub async fn run(services: Services, route: Route) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The storefront UI requires a terminal.\n\
             Use `shopfront products` and the other subcommands for non-interactive use."
        );
    }

    tracing::info!(%route, base_url = services.api.base_url(), "starting tui");
    let mut runtime = TuiRuntime::new(services, route)?;
    runtime.run()
}

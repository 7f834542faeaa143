//! Runtime execution modes.
//!
//! - `tui`: Full-screen interactive storefront (optional feature)

#[cfg(feature = "tui")]
pub use shopfront_tui::run as run_tui;

#[cfg(not(feature = "tui"))]
use shopfront_core::Services;
#[cfg(not(feature = "tui"))]
use shopfront_core::route::Route;

#[cfg(not(feature = "tui"))]
pub async fn run_tui(_services: Services, _route: Route) -> anyhow::Result<()> {
    anyhow::bail!("TUI support is disabled in this build (feature \"tui\").");
}

//! UI events consumed by the reducer.
//!
//! Terminal input and ticks come from the runtime loop; everything else is
//! the result of an effect handler, delivered through the inbox. Failures
//! arrive as display-ready strings: the reducer only ever shows them.

use crossterm::event::Event;
use shopfront_core::api::SessionStatus;
use shopfront_core::api::types::{MetricsSnapshot, OrderConfirmation};
use shopfront_core::auth::LoginOutcome;

use crate::common::TaskId;
use crate::state::PageData;

#[derive(Debug)]
pub enum UiEvent {
    Tick,
    Terminal(Event),

    /// The API client changed session state (refresh, forced logout).
    Session(SessionStatus),

    PageLoaded {
        task: TaskId,
        result: Result<PageData, String>,
    },
    CartUpdated {
        task: TaskId,
        result: Result<u32, String>,
        /// Toast shown on success.
        success: Option<String>,
    },
    CartCount(u32),
    AuthFinished {
        task: TaskId,
        result: Result<LoginOutcome, String>,
    },
    LoggedOut {
        task: TaskId,
        result: Result<u32, String>,
    },
    OrderPlaced {
        task: TaskId,
        result: Result<OrderConfirmation, String>,
    },
    Metrics {
        task: TaskId,
        result: Result<MetricsSnapshot, String>,
    },
    MetricsEnded {
        task: TaskId,
    },
}

//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They are I/O and task spawning only; the reducer never performs either.

use shopfront_core::route::Route;

use crate::common::TaskId;

#[derive(Debug, Clone, PartialEq)]
pub enum UiEffect {
    Quit,

    /// Fetch the data for `route`.
    LoadPage { task: TaskId, route: Route },

    AddToCart {
        task: TaskId,
        product_id: u64,
        quantity: u32,
        name: String,
    },
    /// Set a cart line's quantity; zero or less removes it.
    UpdateCartItem {
        task: TaskId,
        item_id: u64,
        quantity: i64,
    },
    RemoveCartItem { task: TaskId, item_id: u64 },
    RefreshCartCount,

    Login {
        task: TaskId,
        email: String,
        password: String,
    },
    Register {
        task: TaskId,
        email: String,
        password: String,
        full_name: String,
    },
    Logout { task: TaskId },

    Checkout { task: TaskId },

    /// Open the admin metrics stream.
    StartMetrics { task: TaskId },
    /// Abort the running metrics stream, if any.
    StopMetrics,
}

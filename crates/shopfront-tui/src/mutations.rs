//! State changes requested by overlays.
//!
//! Overlay key handlers only see `&TuiState`; changes to it are returned as
//! mutations and applied by the reducer, which also owns task ids.

use shopfront_core::auth::AuthEvent;
use shopfront_core::route::Route;

use crate::overlays::AuthRequest;

#[derive(Debug, Clone, PartialEq)]
pub enum StateMutation {
    Auth(AuthEvent),
    Navigate(Route),
    /// Start a login or registration request.
    SubmitAuth(AuthRequest),
}

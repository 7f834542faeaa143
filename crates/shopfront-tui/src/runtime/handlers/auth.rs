//! Login, registration, logout and session status forwarding.

use shopfront_core::Services;
use shopfront_core::api::SessionStatus;
use tokio::sync::{mpsc, watch};

use super::display;
use crate::common::TaskId;
use crate::events::UiEvent;

pub async fn login(services: Services, task: TaskId, email: String, password: String) -> UiEvent {
    let result = services
        .auth
        .login(&email, &password)
        .await
        .map_err(|e| display(&e));
    UiEvent::AuthFinished { task, result }
}

pub async fn register(
    services: Services,
    task: TaskId,
    email: String,
    password: String,
    full_name: String,
) -> UiEvent {
    let result = services
        .auth
        .register(&email, &password, &full_name)
        .await
        .map_err(|e| display(&e));
    UiEvent::AuthFinished { task, result }
}

pub async fn logout(services: Services, task: TaskId) -> UiEvent {
    let result = services.auth.logout().await.map_err(|e| display(&e));
    UiEvent::LoggedOut { task, result }
}

/// Forwards session status changes (token refresh, forced logout) until
/// either side of the channel goes away.
pub async fn forward_session_status(
    mut status: watch::Receiver<SessionStatus>,
    tx: mpsc::UnboundedSender<UiEvent>,
) {
    while status.changed().await.is_ok() {
        let current = status.borrow_and_update().clone();
        if tx.send(UiEvent::Session(current)).is_err() {
            break;
        }
    }
}

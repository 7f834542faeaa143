//! Admin live metrics stream.

use std::sync::Arc;

use futures_util::StreamExt;
use shopfront_core::api::ApiClient;
use tokio::sync::mpsc;

use crate::common::TaskId;
use crate::events::UiEvent;

/// Streams metrics snapshots into the inbox until the server closes the
/// stream or the runtime aborts the task.
pub async fn metrics_stream(
    api: Arc<ApiClient>,
    task: TaskId,
    tx: mpsc::UnboundedSender<UiEvent>,
) -> UiEvent {
    let mut stream = match api.metrics_stream().await {
        Ok(stream) => stream,
        Err(e) => {
            let _ = tx.send(UiEvent::Metrics {
                task,
                result: Err(e.to_string()),
            });
            return UiEvent::MetricsEnded { task };
        }
    };

    while let Some(item) = stream.next().await {
        let result = item.map_err(|e| e.to_string());
        if tx.send(UiEvent::Metrics { task, result }).is_err() {
            break;
        }
    }
    tracing::debug!("metrics stream closed");
    UiEvent::MetricsEnded { task }
}

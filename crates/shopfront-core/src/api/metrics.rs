//! Live admin metrics over server-sent events.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};

use super::error::{ApiError, ApiErrorKind, ApiResult};
use super::types::MetricsSnapshot;

/// Name of the SSE event carrying a metrics snapshot.
pub const METRICS_EVENT: &str = "metrics";

pub type MetricsStream = Pin<Box<dyn Stream<Item = ApiResult<MetricsSnapshot>> + Send>>;

/// Converts a byte stream into metrics snapshots.
///
/// Events other than `metrics` (heartbeats, comments) are skipped.
pub fn parse_stream<S, B, E>(stream: S) -> MetricsStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    let events = stream.eventsource().filter_map(|item| async move {
        match item {
            Ok(event) => parse_event(&event.event, &event.data),
            Err(e) => Some(Err(ApiError::new(
                ApiErrorKind::Parse,
                format!("SSE stream error: {e}"),
            ))),
        }
    });
    Box::pin(events)
}

/// Parses one SSE event; returns `None` for events that carry no snapshot.
pub fn parse_event(event_type: &str, data: &str) -> Option<ApiResult<MetricsSnapshot>> {
    if event_type != METRICS_EVENT || data.trim().is_empty() {
        return None;
    }
    Some(
        serde_json::from_str(data)
            .map_err(|e| ApiError::parse(format!("Invalid metrics event: {e}"))),
    )
}

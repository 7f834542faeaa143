//! Storefront REST API: client, wire types, errors and the metrics stream.

mod client;
pub mod error;
pub mod metrics;
pub mod types;

pub use client::{ApiClient, SessionStatus, USER_AGENT};
pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use metrics::MetricsStream;

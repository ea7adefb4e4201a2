//! HTTP middleware for the Stockroom API.
//!
//! # Layer order (outermost first)
//!
//! 1. Sentry (`NewSentryLayer`, `SentryHttpLayer`)
//! 2. `TraceLayer` (one span per request, status and latency on response)
//! 3. Request ID (correlates logs, Sentry events and the response header)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};

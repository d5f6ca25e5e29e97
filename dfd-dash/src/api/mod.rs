//! HTTP API handlers for dfd-dash
//!
//! Two entry points (check, navigate), read-only snapshots, health and the
//! dashboard event stream.

pub mod dashboard;
pub mod health;
pub mod sse;

pub use dashboard::dashboard_routes;
pub use health::health_routes;
pub use sse::event_stream;

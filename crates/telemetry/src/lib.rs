//! Internal telemetry for sykmeldinger-arbeidsgiver.
//!
//! Structured logging via tracing, a component health registry backing the
//! readiness probe, and in-memory counters for the sync pipeline.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;

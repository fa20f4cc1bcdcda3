//! Kafka consumer plumbing for sykmeldinger-arbeidsgiver.

pub mod config;
pub mod consumer;
pub mod health;

pub use config::*;
pub use consumer::*;

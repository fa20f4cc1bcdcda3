//! HTTP read API for sykmeldinger-arbeidsgiver.

pub mod extractors;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;

pub use routes::router;
pub use service::DineSykmeldteService;
pub use state::AppState;

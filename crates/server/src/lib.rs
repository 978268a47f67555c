//! HTTP layer of the finance API: axum router, auth middleware, JSON error
//! mapping and the OpenAPI document.

pub mod routes;
pub mod startup;
pub mod errors;
pub mod openapi;

pub use startup::{build_app, run, run_until};

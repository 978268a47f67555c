//! Cross-cutting helpers shared by every crate of the workspace:
//! logging setup, request metrics, startup checks and small wire types.

pub mod types;
pub mod utils;
pub mod metrics;
pub mod env;

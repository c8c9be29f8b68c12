//! Web layer for the temperature API.
//!
//! Thin HTTP plumbing over [`crate::dataset`]: parameter validation,
//! error-to-status mapping and JSON encoding.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;

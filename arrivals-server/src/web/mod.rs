//! Web layer for the arrivals service.
//!
//! JSON endpoints for stop arrivals, the legacy consolidated circulations
//! and fare estimates.

mod dto;
mod error;
mod routes;
mod state;

pub use dto::*;
pub use error::AppError;
pub use routes::create_router;
pub use state::{AppState, madrid_now};

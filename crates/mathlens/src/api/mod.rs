//! HTTP surface: solve endpoints, health, and the request gate.

pub mod error;
pub mod gate;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{ApiError, ErrorBody};
pub use router::create_router;
pub use state::AppState;

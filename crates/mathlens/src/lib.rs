//! mathlens HTTP relay.
//!
//! Exposes the router so integration tests can drive it without binding a
//! socket.

pub mod api;

pub use api::{create_router, AppState};

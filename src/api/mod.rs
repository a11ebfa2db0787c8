//! API Module
//!
//! HTTP handlers and routing for inspecting and driving a shared cache
//! from outside the process.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;

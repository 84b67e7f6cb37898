//! TokenScan HTTP API Module
//! The scan pipeline and popularity ranking exposed over REST

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use routes::create_router;
pub use types::*;

//! ReviewPulse Server
//!
//! HTTP surface over the sentiment service: `/predict`, `/reload`,
//! `/health` and `/metrics`.

pub mod cli;
pub mod config;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use routes::create_router;
pub use state::AppState;

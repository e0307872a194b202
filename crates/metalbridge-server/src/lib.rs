pub mod config;
pub mod routes;

pub use config::{Cli, ServerConfig};
pub use routes::{create_router, AppState};

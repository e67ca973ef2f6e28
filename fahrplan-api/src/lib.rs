pub mod app_state;
pub mod config;
pub mod pdf;
pub mod repositories;
pub mod router;
pub mod routes;
pub mod seed;

pub use app_state::AppState;

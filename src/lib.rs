pub mod app;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod recognizer;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::{api_router, web_router};
pub use config::Config;
pub use state::AppState;
pub use storage::DocumentStore;

pub mod app;
pub mod auth;
pub mod config;
pub mod effects;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod runners;
pub mod schedule;
pub mod state;
pub mod storage;
pub mod theme;
pub mod timers;
pub mod ui;
pub mod wheel;

pub use app::router;
pub use config::Config;
pub use state::{AppData, AppState};
pub use storage::load_data;

pub mod app;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod endpoints;
pub mod errors;
pub mod fetch;
pub mod handlers;
pub mod models;
pub mod render;
pub mod state;
pub mod table;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use dashboard::Dashboard;
pub use state::AppState;

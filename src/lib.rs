pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod repository;
pub mod service;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod tests;

pub use db::connection;
pub use db::migration;
pub use models::{Comment, Guest};
pub use api::error::ApiError;
pub use api::response::ApiResponse;
pub use api::route::create_router;
pub use state::AppState;

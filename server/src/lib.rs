//! Kooking: recipe management REST backend.

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod query;
pub mod raw_sql;
pub mod schema;
pub mod services;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod types;

pub use state::{AppContext, AppState};

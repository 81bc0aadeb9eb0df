// src/lib.rs

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use routes::create_router;
pub use services::export::{ExportOutcome, ExportService, ExportSummary};

pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod platform;
pub mod routes;
pub mod services;
pub mod state;
pub mod view_model;

pub mod auth;
pub mod classifier;
pub mod hospitals;
pub mod models;
pub mod service;

pub use service::create_app;

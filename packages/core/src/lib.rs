pub mod auth;
pub mod models;
pub mod repositories;
pub mod services;

pub mod adapters;
pub mod app;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod gateway;
pub mod services;

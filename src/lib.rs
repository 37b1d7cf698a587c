pub mod api;
pub mod app;
pub mod business;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod ml;
pub mod observability;
pub mod security;
pub mod store;

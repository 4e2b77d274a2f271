pub mod analytics;
pub mod app;
pub mod app_config;
pub mod cache;
pub mod error;
pub mod market;
pub mod services;
pub mod time_util;

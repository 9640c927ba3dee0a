pub mod analytics;
pub mod components;
pub mod config;
pub mod error;
pub mod render;
pub mod shutdown;
pub mod startup;
pub mod utils;

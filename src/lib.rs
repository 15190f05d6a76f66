pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod providers;
pub mod ranking;

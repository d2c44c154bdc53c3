pub mod analysis;
pub mod config;
pub mod database;
pub mod error;
pub mod prediction;
pub mod types;

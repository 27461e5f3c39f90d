//! API handlers for the visualizer endpoints

pub mod data;
pub mod health;

pub use data::DataHandlers;
pub use health::HealthHandlers;

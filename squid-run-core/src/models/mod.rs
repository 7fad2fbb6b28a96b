pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod permission;
pub mod state;

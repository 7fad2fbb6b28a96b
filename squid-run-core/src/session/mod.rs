pub mod connection;
pub mod controller;
pub mod preview;
pub mod state_watch;

//! Hardware capabilities, the simulated robot, and the config file.

pub mod config;
pub mod hardware;
pub mod sim;

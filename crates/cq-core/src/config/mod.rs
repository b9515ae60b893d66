//! Console configuration

pub mod console_config;
pub mod null_handling;

pub use console_config::*;
pub use null_handling::*;

pub mod client;
pub mod config;
pub mod console;
pub mod display;
pub mod sync;
pub mod types;

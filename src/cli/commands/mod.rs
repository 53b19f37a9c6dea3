pub mod config;
pub mod interview;

#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod errors;
pub mod signal;
pub mod traits;
pub mod types;

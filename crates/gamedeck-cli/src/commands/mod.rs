//! Command handlers

pub mod browse;
pub mod cache;
pub mod providers;

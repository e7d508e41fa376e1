// src/lib.rs

pub mod chart;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod normalize;

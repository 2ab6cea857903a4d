//! HTTP request handlers

pub mod assistant;
pub mod chatgpt;
pub mod common;
pub mod health;
pub mod pipeline;
pub mod speech;

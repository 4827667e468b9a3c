// LogSift - core/mod.rs
//
// Core business logic layer.
// Dependencies: data crates only (serde, chrono, regex).
// Must NOT depend on: server, platform, app, or perform I/O.

pub mod filter;
pub mod model;
pub mod parser;
pub mod query;
pub mod rules;
pub mod user_agent;

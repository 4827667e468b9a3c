// LogSift - platform/mod.rs
//
// Platform abstraction layer: filesystem access and configuration.
// Dependencies: standard library, walkdir, directories, toml.
// Must NOT depend on: core, app, server.

pub mod config;
pub mod fs;

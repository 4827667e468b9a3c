// LogSift - app/mod.rs
//
// Application layer: query orchestration and the parsed-file cache.
// Dependencies: core and platform layers.
// Must NOT depend on: server.

pub mod aggregator;
pub mod cache;

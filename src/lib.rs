// LogSift - lib.rs
//
// Library entry point, exposing every module for integration testing and
// embedding. The binary in `main.rs` only wires configuration, logging and
// the HTTP listener together.

pub mod app;
pub mod core;
pub mod platform;
pub mod server;
pub mod util;

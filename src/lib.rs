// Library target exists solely for the integration tests under tests/.
// The binary entry point is main.rs; this file re-declares the module tree so
// that the test harness can import types via `quizcram::engine::*` and friends.
// Most code is only exercised through the binary, so suppress dead_code warnings.
#![allow(dead_code)]

// Public: used directly by the integration tests
pub mod engine;
pub mod session;
pub mod store;

// Private: required transitively (won't compile without them)
mod app;
mod config;
mod event;
mod source;
mod ui;

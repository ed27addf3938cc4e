//! Scaffolding for integration tests.
//!
//! Integration tests drive a running engine from the outside: its jobs run
//! on real time and its metrics endpoint is scraped over HTTP. Tests for
//! one specific module should be in the corresponding module.
//!
//! ```text
//! cargo test --test integration
//! ```
mod engine;

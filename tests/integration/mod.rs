//! Integration test suite for css-export
//!
//! End-to-end tests over the red/blue/purple fixture graph in
//! `tests/fixtures/scenario`:
//!
//! ```text
//! purple.js ─┬─ red.js ──┬─ lib/reset.css
//!            │           └─ red.css
//!            └─ blue.js ─┬─ lib/reset.css
//!                        └─ blue.css
//! ```
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **scenario**: the library API driven with the in-memory host
//! - **cli**: the `css-export` binary

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod scenario;

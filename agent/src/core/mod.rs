//! Deterministic, pure logic for the orchestration engine.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod coordinator;
pub mod decision;
pub mod retry;
pub mod schema;
pub mod state_update;
pub mod types;

//! Deterministic, pure logic shared by both chain-of-thought workflows.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod compose;
pub mod extract;
pub mod session;
pub mod types;
pub mod validator;

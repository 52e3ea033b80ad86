//! Sequential-thinking developer tools: commit-message drafting and
//! step-by-step code review.
//!
//! The crate keeps the same split throughout:
//!
//! - **[`core`]**: Pure, deterministic logic (validation, session history,
//!   signal extraction, message composition). No I/O.
//! - **[`io`]**: Side-effecting operations (git queries, bounded child
//!   processes, configuration). Behind traits so tests can script them.
//!
//! [`commit`] and [`review`] run one step of each workflow, [`registry`]
//! keys their sessions by caller-supplied id, and [`engine`] ties both to a
//! change source. [`guard`] is the fault boundary in front of every tool.

pub mod commit;
pub mod core;
pub mod engine;
pub mod error;
pub mod guard;
pub mod io;
pub mod logging;
pub mod registry;
pub mod review;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

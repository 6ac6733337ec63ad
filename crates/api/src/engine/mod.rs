//! The workflow transition engine.
//!
//! [`WorkflowEngine`] orchestrates every document movement: it validates
//! authorization and preconditions, mutates the document, appends audit
//! entries, and records the notification -- all inside one database
//! transaction -- then publishes the live-push event after commit.

pub mod transition;

pub use transition::{Actor, TransitionOutcome, WorkflowEngine};

//! BounceBan verification node.
//!
//! This crate provides [`BouncebanNode`], which resolves per-item parameters,
//! dispatches verification requests sequentially or concurrently, and folds
//! results or per-item errors back into the output items.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The node sequences calls between the domain types
//! in the [`pipeline`] crate and the [`pipeline::EmailVerifier`] port. It
//! contains no transport or retry logic of its own; the verifier adapter owns
//! the `408` retry budget.

pub mod bounceban_node;
pub mod parameters;

pub use bounceban_node::{BouncebanNode, NodeOutput};
pub use parameters::{EmailSource, NodeParameters};

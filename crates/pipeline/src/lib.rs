//! Core domain for the BounceBan verification node.
//!
//! This crate contains the node parameters, item types, newtype identifiers,
//! error types, and the [`EmailVerifier`] port. Infrastructure crates implement
//! the port; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers and secrets (`ItemIndex`, `RunId`, `ApiKey`, etc.) |
//! | [`types`] | Node parameters, item payloads, run accounting |
//! | [`errors`] | Service errors, node errors, and retry policy |
//! | [`verifier`] | The [`EmailVerifier`] port trait |

pub mod errors;
pub mod identifiers;
pub mod types;
pub mod verifier;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{ApiError, NodeError, RetryPolicy};
pub use identifiers::{ApiKey, FieldName, ItemIndex, RunId};
pub use types::{
    AdditionalFields, CatchallVerify, InputItem, Operation, OutputItem, PairedItem,
    ProcessingMode, RunSummary, Timestamp, VerificationMode, VerifyQuery, MISSING_EMAIL_MESSAGE,
    RESULT_KEY,
};
pub use verifier::EmailVerifier;

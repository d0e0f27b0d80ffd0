//! BounceBan API infrastructure adapter.
//!
//! Implements the [`pipeline::EmailVerifier`] trait over the BounceBan REST
//! API.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, authentication headers, status mapping,
//! response decoding, and the `408` retry loop live here. The [`pipeline`]
//! crate sees only [`pipeline::EmailVerifier`].
//!
//! ## Endpoints
//!
//! - `GET https://api-waterfall.bounceban.com/v1/verify/single`
//!   (`email`, `mode`, `disable_catchall_verify`, `url`)
//! - `GET https://api.bounceban.com/v1/account` (credential test)

mod client;
mod config;
mod http;

pub use client::{BouncebanClient, SOURCE_HEADER, SOURCE_VALUE};
pub use config::{
    ClientConfig, ACCOUNT_PATH, DEFAULT_ACCOUNT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_VERIFY_BASE_URL,
    MAX_RETRY_AFTER, VERIFY_PATH,
};

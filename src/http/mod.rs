//! HTTP invoker module
//!
//! Standalone implementation of the [`Invoker`](crate::invoker::Invoker)
//! seam for running the connector without a host dispatch layer.
//!
//! # Features
//!
//! - **GraphQL queries**: UI API record queries built from the schema catalog
//! - **OAuth token calls**: authorization-code and refresh-token grants
//! - **Interception**: auth failures trigger a refresh and a single replay
//! - **Rate Limiting**: Token bucket rate limiter using governor

mod client;
mod graphql;
mod rate_limit;

pub use client::{graphql_url, token_url, HttpInvoker};
pub use graphql::{build_body, build_query};
pub use rate_limit::RateLimiter;

#[cfg(test)]
mod tests;

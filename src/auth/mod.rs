//! Token manager module
//!
//! Supports: OAuth authorization-code exchange, refresh-token grant
//!
//! Both entry points mutate the host's [`ConnectionConfig`](crate::config::ConnectionConfig)
//! in place and talk to the token endpoint through the invoker's
//! unintercepted path, so a failing refresh can never trigger another refresh.

mod token;
mod types;

pub use token::{command_callback, update_token};
pub use types::{
    CommandInfo, TokenRefresh, INVALID_SESSION_ID, OAUTH_COMMAND, REQUEST_LIMIT_EXCEEDED,
};

#[cfg(test)]
mod tests;

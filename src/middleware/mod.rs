//! HTTP middleware and request extractors.
//!
//! - `auth`: bearer-token extractor yielding the current user and its permissions
//! - `ip`: client address resolution behind proxies
//! - `rate_limit`: sliding-window limits, global and per endpoint
//! - `security_headers`: response hardening headers

pub mod auth;
pub mod ip;
pub mod rate_limit;
pub mod security_headers;

pub use auth::CurrentUser;
pub use rate_limit::EndpointRateLimiter;

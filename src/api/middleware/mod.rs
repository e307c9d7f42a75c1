//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Trace — request id + access log line
//! 2. Credential — lifts the bearer token into an extension

pub mod credential;
pub mod trace;

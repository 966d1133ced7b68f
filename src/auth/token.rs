//! Issued credential model and its redacting secret wrapper.

pub mod credential;
pub mod secret;

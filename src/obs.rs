//! Optional observability helpers for flow stages.
//!
//! # Feature Flags
//!
//! - `tracing` (default) emits spans named `oauth2_codeflow.flow` with `stage` and `call` fields,
//!   plus a debug event for every recorded outcome.
//! - `metrics` increments the `oauth2_codeflow_outcome_total` counter labeled by `stage` and
//!   `outcome`.
//!
//! Neither path ever records secrets, codes, or raw state tokens; use [`state_fingerprint`] to
//! correlate sessions in logs.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Stages of an authorization-code flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowStage {
	/// Building the authorization request.
	Start,
	/// Classifying the provider callback.
	Callback,
	/// Redeeming the code at the token endpoint.
	Exchange,
}
impl FlowStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowStage::Start => "start",
			FlowStage::Callback => "callback",
			FlowStage::Exchange => "exchange",
		}
	}
}
impl Display for FlowStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Short, log-safe digest of a state token (first 12 chars of its base64url SHA-256).
pub fn state_fingerprint(state: &str) -> String {
	let digest = Sha256::digest(state.as_bytes());
	let mut encoded = URL_SAFE_NO_PAD.encode(digest);

	encoded.truncate(12);

	encoded
}

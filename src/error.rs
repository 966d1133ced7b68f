//! Crate-level error types shared across flows, providers, and stores.
//!
//! Only caller mistakes surface as [`Error`]. Provider verdicts (cancel, deny, protocol errors,
//! transport failures) are modeled as outcome variants in [`crate::flows`] instead.

// self
use crate::{_prelude::*, flows::FlowPhase};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Bad caller input; fatal to the call and not retryable.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Flow invoked out of order or reused; fatal to the session.
	#[error(transparent)]
	Sequence(#[from] SequenceError),
}

/// Configuration and validation failures raised before any session state changes.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Client identifier was empty.
	#[error("Client identifier cannot be empty.")]
	EmptyClientId,
	/// Client identifier failed validation.
	#[error(transparent)]
	InvalidClientId(#[from] crate::auth::IdentifierError),
	/// Client secret was empty.
	#[error("Client secret cannot be empty.")]
	EmptyClientSecret,
	/// Redirect URI was empty.
	#[error("Redirect URI cannot be empty.")]
	EmptyRedirectUri,
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Out-of-order or duplicate use of a flow session.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SequenceError {
	/// No session is registered under the request's state token.
	#[error("No authorization session is registered for this request.")]
	UnknownSession,
	/// The callback for this session was already delivered.
	#[error("Authorization callback was already delivered; session is {phase}.")]
	CallbackAlreadyDelivered {
		/// Phase the session was in when the duplicate arrived.
		phase: FlowPhase,
	},
	/// The session is not waiting for a code exchange.
	#[error("Session is {phase}, not awaiting a code exchange.")]
	NotAwaitingExchange {
		/// Phase the session was in when the exchange was attempted.
		phase: FlowPhase,
	},
	/// The granted code was already claimed by another exchange call.
	#[error("Authorization code was already claimed by an exchange.")]
	CodeAlreadyClaimed,
	/// The supplied code is not the one granted to this session.
	#[error("Authorization code does not match the code granted to this session.")]
	CodeMismatch,
}

/// Failures reported by [`crate::http::ProviderClient`] implementations.
///
/// The flow never returns these; it folds them into
/// [`TokenExchangeOutcome::UnknownFailure`](crate::flows::TokenExchangeOutcome::UnknownFailure).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The token endpoint did not answer in time.
	#[error("Request timed out while calling the token endpoint.")]
	Timeout,
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Short detail string carried by the resulting unknown-failure outcome.
	pub fn detail(&self) -> String {
		match self {
			Self::Timeout => "timeout".into(),
			Self::Network { source } => format!("network: {source}"),
			Self::Io(e) => format!("io: {e}"),
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}

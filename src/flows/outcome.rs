//! Tagged outcomes of the authorization and exchange stages.

// self
use crate::{
	_prelude::*,
	auth::Credential,
	error::TransportError,
	flows::callback::DEFAULT_ERROR_MESSAGE,
	http::TokenEndpointResponse,
};

/// Result of classifying the provider callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorizationOutcome {
	/// The user consented and the provider issued a code.
	Granted {
		/// Single-use authorization code.
		code: String,
	},
	/// The user backed out before consenting.
	Canceled,
	/// The user refused consent.
	Denied,
	/// The provider reported an error.
	ProtocolError {
		/// Provider message, surfaced verbatim.
		message: String,
		/// Machine-readable provider code.
		code: String,
	},
	/// The provider app or API version is not supported.
	UnsupportedVersion,
	/// Malformed request or state mismatch.
	InvalidRequest,
	/// Anything else.
	UnknownFailure {
		/// Diagnostic detail.
		detail: String,
	},
}
impl AuthorizationOutcome {
	/// Returns `true` for [`AuthorizationOutcome::Granted`].
	pub fn is_granted(&self) -> bool {
		matches!(self, Self::Granted { .. })
	}

	/// Stable label for logs and metrics.
	pub const fn label(&self) -> &'static str {
		match self {
			Self::Granted { .. } => "granted",
			Self::Canceled => "canceled",
			Self::Denied => "denied",
			Self::ProtocolError { .. } => "protocol_error",
			Self::UnsupportedVersion => "unsupported_version",
			Self::InvalidRequest => "invalid_request",
			Self::UnknownFailure { .. } => "unknown_failure",
		}
	}
}

/// Result of redeeming a code at the token endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenExchangeOutcome {
	/// The token endpoint issued a credential.
	Issued {
		/// Credential to hand to a [`TokenStore`](crate::store::TokenStore).
		credential: Credential,
	},
	/// The token endpoint reported an error.
	ProtocolError {
		/// Provider message, surfaced verbatim.
		message: String,
		/// Machine-readable provider code.
		code: String,
	},
	/// Transport failure, timeout, or unreadable response.
	UnknownFailure {
		/// Diagnostic detail; `"timeout"` when the exchange timed out.
		detail: String,
	},
}
impl TokenExchangeOutcome {
	/// Returns the issued credential, if any.
	pub fn credential(&self) -> Option<&Credential> {
		match self {
			Self::Issued { credential } => Some(credential),
			_ => None,
		}
	}

	/// Stable label for logs and metrics.
	pub const fn label(&self) -> &'static str {
		match self {
			Self::Issued { .. } => "issued",
			Self::ProtocolError { .. } => "protocol_error",
			Self::UnknownFailure { .. } => "unknown_failure",
		}
	}

	pub(crate) fn from_transport(error: &TransportError) -> Self {
		Self::UnknownFailure { detail: error.detail() }
	}

	pub(crate) fn from_response(response: &TokenEndpointResponse, now: OffsetDateTime) -> Self {
		let deserializer = &mut serde_json::Deserializer::from_slice(&response.body);
		let body: TokenResponseBody = match serde_path_to_error::deserialize(deserializer) {
			Ok(body) => body,
			Err(e) =>
				return Self::UnknownFailure {
					detail: format!(
						"malformed token response (status {}) at `{}`: {}",
						response.status,
						e.path(),
						e.inner()
					),
				},
		};

		if let Some(error) = body.error.filter(|error| !error.is_empty()) {
			return Self::ProtocolError {
				message: body.error_description.unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_owned()),
				code: error,
			};
		}
		if !response.is_success() {
			return Self::UnknownFailure {
				detail: format!("token endpoint returned status {}", response.status),
			};
		}

		match body.access_token.filter(|token| !token.is_empty()) {
			Some(token) => {
				let credential = Credential::new(token, now);
				let credential = match body.expires_in.filter(|seconds| *seconds > 0) {
					Some(seconds) => match credential.expiring_in(Duration::seconds(seconds)) {
						Some(credential) => credential,
						None =>
							return Self::UnknownFailure {
								detail: format!("expires_in out of range: {seconds}"),
							},
					},
					None => credential,
				};

				Self::Issued { credential }
			},
			None => Self::UnknownFailure { detail: "token response carried no access_token".into() },
		}
	}
}

#[derive(Debug, Deserialize)]
struct TokenResponseBody {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	expires_in: Option<i64>,
	#[serde(default)]
	error: Option<String>,
	#[serde(default)]
	error_description: Option<String>,
}

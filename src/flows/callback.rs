//! Provider callback parameters and their classification.

// crates.io
use serde::Deserializer;
// self
use crate::{_prelude::*, flows::AuthorizationOutcome};

const ERROR_ACCESS_DENIED: &str = "access_denied";
const ERROR_INTERNAL: &str = "internal_error";
const ERROR_INVALID_REQUEST: &str = "invalid_request";
const ERROR_UNSUPPORTED_VERSION: &str = "unsupported_version";

/// Fallback message for protocol errors that carry no description.
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred during authorization.";

/// Fields a provider may return on the redirect back to the client.
///
/// Deserializes from a query string or JSON. `denied` and `canceled` accept `true`/`false`
/// as well as `1`/`0`.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CallbackParams {
	/// Echoed anti-forgery token.
	#[serde(default)]
	pub state: Option<String>,
	/// Granted authorization code.
	#[serde(default)]
	pub code: Option<String>,
	/// OAuth error indicator.
	#[serde(default)]
	pub error: Option<String>,
	/// Machine-readable provider error code.
	#[serde(default)]
	pub error_code: Option<String>,
	/// Human-readable provider error message.
	#[serde(default)]
	pub error_description: Option<String>,
	/// Explicit deny flag.
	#[serde(default, deserialize_with = "flag")]
	pub denied: bool,
	/// User backed out before consenting.
	#[serde(default, deserialize_with = "flag")]
	pub canceled: bool,
}
impl CallbackParams {
	/// Callback for a user who backed out; carries the state so the session can be matched.
	pub fn canceled(state: impl Into<String>) -> Self {
		Self { state: Some(state.into()), canceled: true, ..Default::default() }
	}

	/// Parses the query component of a redirect URL.
	pub fn from_redirect_url(url: &Url) -> Self {
		let mut params = Self::default();

		for (name, value) in url.query_pairs() {
			match name.as_ref() {
				"state" => params.state = Some(value.into_owned()),
				"code" => params.code = Some(value.into_owned()),
				"error" => params.error = Some(value.into_owned()),
				"error_code" => params.error_code = Some(value.into_owned()),
				"error_description" => params.error_description = Some(value.into_owned()),
				"denied" => params.denied = parse_flag(&value),
				"canceled" => params.canceled = parse_flag(&value),
				_ => {},
			}
		}

		params
	}

	/// Classifies the callback against the state the session expects.
	pub fn classify(&self, expected_state: &str) -> AuthorizationOutcome {
		if self.state.as_deref() != Some(expected_state) {
			return AuthorizationOutcome::InvalidRequest;
		}
		if self.canceled {
			return AuthorizationOutcome::Canceled;
		}

		let error = self.error.as_deref().filter(|error| !error.is_empty());

		if self.denied || error == Some(ERROR_ACCESS_DENIED) {
			return AuthorizationOutcome::Denied;
		}

		match error {
			Some(ERROR_INTERNAL) => AuthorizationOutcome::UnknownFailure {
				detail: self
					.error_description
					.clone()
					.unwrap_or_else(|| format!("provider reported {ERROR_INTERNAL}")),
			},
			Some(ERROR_UNSUPPORTED_VERSION) => AuthorizationOutcome::UnsupportedVersion,
			Some(ERROR_INVALID_REQUEST) => AuthorizationOutcome::InvalidRequest,
			Some(error) => AuthorizationOutcome::ProtocolError {
				message: self
					.error_description
					.clone()
					.unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_owned()),
				code: self.error_code.clone().unwrap_or_else(|| error.to_owned()),
			},
			None => match self.code.as_deref() {
				Some(code) if !code.is_empty() =>
					AuthorizationOutcome::Granted { code: code.to_owned() },
				_ => AuthorizationOutcome::UnknownFailure {
					detail: "callback carried neither a code nor an error".into(),
				},
			},
		}
	}
}
impl Debug for CallbackParams {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CallbackParams")
			.field("state_present", &self.state.is_some())
			.field("code_present", &self.code.is_some())
			.field("error", &self.error)
			.field("error_code", &self.error_code)
			.field("error_description", &self.error_description)
			.field("denied", &self.denied)
			.field("canceled", &self.canceled)
			.finish()
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
	Bool(bool),
	Text(String),
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match Flag::deserialize(deserializer)? {
		Flag::Bool(value) => value,
		Flag::Text(value) => parse_flag(&value),
	})
}

fn parse_flag(value: &str) -> bool {
	matches!(value, "1" | "true")
}

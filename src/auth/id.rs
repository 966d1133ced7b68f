//! Validated identifiers for OAuth clients and provider descriptors.

// self
use crate::_prelude::*;

macro_rules! validated_id {
	($name:ident, $kind:literal, $doc:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Validates `value` and wraps it.
			pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
				let value = value.into();

				check($kind, &value)?;

				Ok(Self(value))
			}

			/// Identifier text as sent on the wire.
			pub fn as_str(&self) -> &str {
				&self.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				Self::new(value)
			}
		}
		impl From<$name> for String {
			fn from(id: $name) -> Self {
				id.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, "{}({})", $kind, self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 256;

/// Why an identifier was rejected.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Which identifier failed (`Client` or `Provider`).
		kind: &'static str,
	},
	/// The identifier contains whitespace or control characters.
	#[error("{kind} identifier contains whitespace or control characters.")]
	IllegalCharacter {
		/// Which identifier failed (`Client` or `Provider`).
		kind: &'static str,
	},
	/// The identifier is longer than 256 bytes.
	#[error("{kind} identifier exceeds {max} bytes.")]
	TooLong {
		/// Which identifier failed (`Client` or `Provider`).
		kind: &'static str,
		/// Byte limit.
		max: usize,
	},
}

validated_id!(ClientId, "Client", "OAuth 2.0 client identifier registered with the provider.");
validated_id!(ProviderId, "Provider", "Names the provider descriptor a flow talks to.");

fn check(kind: &'static str, value: &str) -> Result<(), IdentifierError> {
	match value {
		"" => Err(IdentifierError::Empty { kind }),
		_ if value.len() > IDENTIFIER_MAX_LEN =>
			Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN }),
		_ if value.chars().any(|c| c.is_whitespace() || c.is_control()) =>
			Err(IdentifierError::IllegalCharacter { kind }),
		_ => Ok(()),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn client_ids_reject_blank_and_padded_values() {
		assert_eq!(ClientId::new(""), Err(IdentifierError::Empty { kind: "Client" }));
		assert_eq!(
			ClientId::new(" abc"),
			Err(IdentifierError::IllegalCharacter { kind: "Client" })
		);
		assert!(ClientId::new("abc\u{0007}").is_err());

		let id = ClientId::new("JZ3MVQ1KDS0ZQ").expect("Client fixture should be valid.");

		assert_eq!(id.as_str(), "JZ3MVQ1KDS0ZQ");
		assert_eq!(format!("{id:?}"), "Client(JZ3MVQ1KDS0ZQ)");
	}

	#[test]
	fn length_limit_is_inclusive() {
		ProviderId::new("p".repeat(IDENTIFIER_MAX_LEN)).expect("Exact length should succeed.");

		assert!(ProviderId::new("p".repeat(IDENTIFIER_MAX_LEN + 1)).is_err());
	}

	#[test]
	fn deserialization_runs_validation() {
		let provider: ProviderId =
			serde_json::from_str("\"foursquare\"").expect("Provider should deserialize.");

		assert_eq!(provider.to_string(), "foursquare");
		assert!(serde_json::from_str::<ProviderId>("\"four square\"").is_err());
	}

	#[test]
	fn serializes_as_bare_string() {
		let client = ClientId::new("client-1").expect("Client fixture should be valid.");
		let json = serde_json::to_string(&client).expect("Client should serialize.");

		assert_eq!(json, "\"client-1\"");
		assert_eq!(String::from(client), "client-1");
	}
}

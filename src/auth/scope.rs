//! Requested OAuth scopes.

// self
use crate::_prelude::*;

/// Errors emitted when validating scopes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeValidationError {
	/// Empty scope entries are not allowed.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// Scopes cannot contain embedded whitespace characters.
	#[error("Scope contains whitespace: {scope}.")]
	ContainsWhitespace {
		/// The offending scope string.
		scope: String,
	},
}

/// Deduplicated scope list that keeps the caller's ordering.
///
/// An empty set means "let the provider apply its default scope" and is omitted from the
/// authorize URL entirely.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ScopeSet(Vec<String>);
impl ScopeSet {
	/// Creates a scope set from any iterator, dropping duplicates.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut normalized = Vec::new();

		for scope in scopes {
			let owned: String = scope.into();

			if owned.is_empty() {
				return Err(ScopeValidationError::Empty);
			}
			if owned.chars().any(char::is_whitespace) {
				return Err(ScopeValidationError::ContainsWhitespace { scope: owned });
			}
			if !normalized.contains(&owned) {
				normalized.push(owned);
			}
		}

		Ok(Self(normalized))
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no scopes are requested.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns true if the set contains the provided scope.
	pub fn contains(&self, scope: &str) -> bool {
		self.0.iter().any(|candidate| candidate == scope)
	}

	/// Iterator over scopes in request order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	/// Joins the scopes with the provider's delimiter; `None` when the set is empty.
	pub fn joined(&self, delimiter: char) -> Option<String> {
		if self.is_empty() {
			return None;
		}

		let mut buf = String::new();

		for (idx, scope) in self.0.iter().enumerate() {
			if idx > 0 {
				buf.push(delimiter);
			}

			buf.push_str(scope);
		}

		Some(buf)
	}
}
impl Debug for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeSet").field(&self.0).finish()
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.joined(' ').unwrap_or_default())
	}
}
impl TryFrom<Vec<String>> for ScopeSet {
	type Error = ScopeValidationError;

	fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl From<ScopeSet> for Vec<String> {
	fn from(value: ScopeSet) -> Self {
		value.0
	}
}
impl FromStr for ScopeSet {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() {
			return Ok(Self::default());
		}
		if s.chars().all(char::is_whitespace) {
			return Err(ScopeValidationError::Empty);
		}

		Self::new(s.split_whitespace())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn duplicates_collapse_in_request_order() {
		let scopes = ScopeSet::new(["checkins", "profile", "checkins"])
			.expect("Scope fixture should be valid.");

		assert_eq!(scopes.len(), 2);
		assert_eq!(scopes.iter().collect::<Vec<_>>(), ["checkins", "profile"]);
		assert_eq!(scopes.joined(','), Some("checkins,profile".into()));
		assert_eq!(scopes.to_string(), "checkins profile");
	}

	#[test]
	fn empty_set_has_no_joined_form() {
		let scopes = ScopeSet::from_str("").expect("Empty input is an empty set.");

		assert!(scopes.is_empty());
		assert_eq!(scopes.joined(' '), None);
		assert!(ScopeSet::from_str("  ").is_err());
	}

	#[test]
	fn invalid_entries_are_rejected() {
		assert_eq!(ScopeSet::new([""]), Err(ScopeValidationError::Empty));
		assert!(matches!(
			ScopeSet::new(["two words"]),
			Err(ScopeValidationError::ContainsWhitespace { .. })
		));
		assert!(serde_json::from_str::<ScopeSet>("[\"ok\",\"\"]").is_err());
	}
}

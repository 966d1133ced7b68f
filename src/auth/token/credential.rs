//! Immutable access credential produced by a successful code exchange.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Access token plus the instant it was obtained.
///
/// Values are immutable once built; replacing a credential means constructing a new one and
/// handing it to [`TokenStore::set`](crate::store::TokenStore::set).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
	access_token: TokenSecret,
	#[serde(with = "time::serde::rfc3339")]
	obtained_at: OffsetDateTime,
	#[serde(default, with = "time::serde::rfc3339::option")]
	expires_at: Option<OffsetDateTime>,
}
impl Credential {
	/// Creates a credential for a token obtained at `obtained_at`.
	pub fn new(access_token: impl Into<String>, obtained_at: OffsetDateTime) -> Self {
		Self { access_token: TokenSecret::new(access_token), obtained_at, expires_at: None }
	}

	/// Returns a copy that expires `lifetime` after it was obtained, or `None` when the expiry
	/// falls outside the representable date range.
	pub fn expiring_in(self, lifetime: Duration) -> Option<Self> {
		let expires_at = self.obtained_at.checked_add(lifetime)?;

		Some(Self { expires_at: Some(expires_at), ..self })
	}

	/// Access token secret; callers must avoid logging it.
	pub fn access_token(&self) -> &TokenSecret {
		&self.access_token
	}

	/// Instant the token endpoint issued this credential.
	pub fn obtained_at(&self) -> OffsetDateTime {
		self.obtained_at
	}

	/// Expiry instant, when the provider reported a lifetime.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.expires_at
	}

	/// Returns `true` once `instant` reaches the reported expiry. Tokens without a reported
	/// lifetime never expire locally.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expiry| instant >= expiry)
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("access_token", &"<redacted>")
			.field("obtained_at", &self.obtained_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

//! Authorization requests and the per-`state` session table.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
// self
use crate::{
	_prelude::*,
	auth::{ClientId, ScopeSet},
	provider::ProviderDescriptor,
};

const STATE_BYTES: usize = 32;

/// Redirect instruction returned by
/// [`AuthorizationCodeFlow::start_authorization`](crate::flows::AuthorizationCodeFlow::start_authorization).
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
	/// OAuth client identifier.
	pub client_id: ClientId,
	/// Redirect URI the provider calls back.
	pub redirect_uri: Url,
	/// Requested scopes; empty means the provider default.
	pub scope: ScopeSet,
	/// Anti-forgery token the provider must echo back.
	pub state: String,
	/// Fully-formed URL the user agent should be sent to.
	pub authorize_url: Url,
}
impl AuthorizationRequest {
	pub(crate) fn new(
		descriptor: &ProviderDescriptor,
		client_id: ClientId,
		redirect_uri: Url,
		scope: ScopeSet,
	) -> Self {
		let state = generate_state();
		let authorize_url =
			build_authorize_url(descriptor, &client_id, &redirect_uri, &scope, &state);

		Self { client_id, redirect_uri, scope, state, authorize_url }
	}
}
impl Debug for AuthorizationRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationRequest")
			.field("client_id", &self.client_id)
			.field("redirect_uri", &self.redirect_uri.as_str())
			.field("scope", &self.scope)
			.field("state", &"<redacted>")
			.finish()
	}
}

/// Position of a session in the authorization-code state machine.
///
/// Phases only move forward: `Pending` → `AuthorizedPendingExchange` → `Complete`, with `Failed`
/// reachable from both non-terminal phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowPhase {
	/// Waiting for the provider callback.
	Pending,
	/// Callback granted a code; waiting for the exchange.
	AuthorizedPendingExchange,
	/// Exchange issued a credential.
	Complete,
	/// Any failure outcome at either stage.
	Failed,
}
impl FlowPhase {
	/// Returns `true` for `Complete` and `Failed`.
	pub fn is_terminal(self) -> bool {
		matches!(self, FlowPhase::Complete | FlowPhase::Failed)
	}

	/// Returns a stable lowercase label.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowPhase::Pending => "pending",
			FlowPhase::AuthorizedPendingExchange => "authorized_pending_exchange",
			FlowPhase::Complete => "complete",
			FlowPhase::Failed => "failed",
		}
	}
}
impl Display for FlowPhase {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Snapshot of one authorization attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowSession {
	/// Request the session was started with.
	pub request: AuthorizationRequest,
	/// Current phase.
	pub phase: FlowPhase,
}

#[derive(Debug)]
pub(crate) struct SessionEntry {
	pub(crate) session: FlowSession,
	pub(crate) granted_code: Option<String>,
	pub(crate) created_at: OffsetDateTime,
}
impl SessionEntry {
	pub(crate) fn new(request: AuthorizationRequest, created_at: OffsetDateTime) -> Self {
		Self {
			session: FlowSession { request, phase: FlowPhase::Pending },
			granted_code: None,
			created_at,
		}
	}

	pub(crate) fn phase(&self) -> FlowPhase {
		self.session.phase
	}

	pub(crate) fn advance(&mut self, phase: FlowPhase) {
		debug_assert!(!self.session.phase.is_terminal(), "terminal sessions never transition");

		self.session.phase = phase;
	}
}

pub(crate) type SessionTable = Arc<Mutex<HashMap<String, SessionEntry>>>;

/// Moves a session to `Failed` if an in-flight exchange is dropped before it finishes.
pub(crate) struct ExchangeGuard {
	sessions: SessionTable,
	state: String,
	armed: bool,
}
impl ExchangeGuard {
	pub(crate) fn new(sessions: SessionTable, state: String) -> Self {
		Self { sessions, state, armed: true }
	}

	/// Applies the final phase and disarms the guard.
	pub(crate) fn finish(mut self, phase: FlowPhase) {
		self.armed = false;

		self.settle(phase);
	}

	fn settle(&self, phase: FlowPhase) {
		let mut sessions = self.sessions.lock();

		if let Some(entry) = sessions
			.get_mut(&self.state)
			.filter(|entry| entry.phase() == FlowPhase::AuthorizedPendingExchange)
		{
			entry.advance(phase);
		}
	}
}
impl Drop for ExchangeGuard {
	fn drop(&mut self) {
		if self.armed {
			#[cfg(feature = "tracing")]
			tracing::warn!("code exchange dropped before completion; failing session");

			self.settle(FlowPhase::Failed);
		}
	}
}

/// Drops sessions created before `cutoff`.
pub(crate) fn prune_expired(table: &mut HashMap<String, SessionEntry>, cutoff: OffsetDateTime) {
	table.retain(|_, entry| entry.created_at >= cutoff);
}

fn generate_state() -> String {
	let mut bytes = [0_u8; STATE_BYTES];

	rand::rng().fill_bytes(&mut bytes);

	URL_SAFE_NO_PAD.encode(bytes)
}

fn build_authorize_url(
	descriptor: &ProviderDescriptor,
	client_id: &ClientId,
	redirect_uri: &Url,
	scope: &ScopeSet,
	state: &str,
) -> Url {
	let mut url = descriptor.endpoints.authorization.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("response_type", "code");
	pairs.append_pair("client_id", client_id.as_str());
	pairs.append_pair("redirect_uri", redirect_uri.as_str());

	if let Some(scope_value) = scope.joined(descriptor.quirks.scope_delimiter) {
		pairs.append_pair("scope", &scope_value);
	}

	pairs.append_pair("state", state);

	for (name, value) in &descriptor.authorize_params {
		pairs.append_pair(name, value);
	}

	drop(pairs);

	url
}

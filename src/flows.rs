//! Authorization-code flow orchestration.
//!
//! [`AuthorizationCodeFlow`] drives one provider through an explicit two-call protocol:
//! [`complete_authorization`](AuthorizationCodeFlow::complete_authorization) classifies the
//! redirect, then [`exchange_code`](AuthorizationCodeFlow::exchange_code) redeems a granted code.
//! Every attempt is tracked as a [`FlowSession`] keyed by its `state` token, so duplicate or
//! out-of-order calls fail with [`SequenceError`] instead of touching the provider twice.
//!
//! Persisting an issued credential is the caller's step; the flow never writes to a
//! [`TokenStore`](crate::store::TokenStore).

pub mod callback;
pub mod outcome;
pub mod session;

pub use callback::CallbackParams;
pub use outcome::*;
pub use session::{AuthorizationRequest, FlowPhase, FlowSession};

// self
use crate::{
	_prelude::*,
	auth::{ClientId, IdentifierError, ScopeSet},
	error::{ConfigError, SequenceError, TransportError},
	flows::session::{ExchangeGuard, SessionEntry, SessionTable},
	http::{ProviderClient, TokenExchangeRequest},
	obs::{self, FlowSpan, FlowStage},
	provider::ProviderDescriptor,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestProviderClient;

#[cfg(feature = "reqwest")]
/// Flow specialized for the crate's reqwest-backed provider client.
pub type ReqwestCodeFlow = AuthorizationCodeFlow<ReqwestProviderClient>;

/// Coordinates authorization-code sessions against a single provider descriptor.
///
/// Clones share the session table, so a callback handler and an exchange worker may each hold
/// their own handle.
pub struct AuthorizationCodeFlow<C>
where
	C: ?Sized + ProviderClient,
{
	/// Provider descriptor that defines endpoints and quirks.
	pub descriptor: ProviderDescriptor,
	/// Client used for the code-for-token call.
	pub provider_client: Arc<C>,
	exchange_timeout: std::time::Duration,
	session_ttl: Duration,
	sessions: SessionTable,
}
impl<C> AuthorizationCodeFlow<C>
where
	C: ?Sized + ProviderClient,
{
	const DEFAULT_EXCHANGE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);
	const DEFAULT_SESSION_TTL: Duration = Duration::minutes(10);

	/// Creates a flow for `descriptor` that exchanges codes through `provider_client`.
	pub fn new(descriptor: ProviderDescriptor, provider_client: impl Into<Arc<C>>) -> Self {
		Self {
			descriptor,
			provider_client: provider_client.into(),
			exchange_timeout: Self::DEFAULT_EXCHANGE_TIMEOUT,
			session_ttl: Self::DEFAULT_SESSION_TTL,
			sessions: Default::default(),
		}
	}

	/// Bounds each code exchange (defaults to 30 seconds).
	pub fn with_exchange_timeout(mut self, timeout: std::time::Duration) -> Self {
		self.exchange_timeout = timeout;

		self
	}

	/// Drops sessions older than `ttl` when new ones start (defaults to 10 minutes).
	pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
		self.session_ttl = if ttl.is_negative() { Duration::ZERO } else { ttl };

		self
	}

	/// Builds a fresh authorization request and registers a `Pending` session for it.
	pub fn start_authorization(
		&self,
		client_id: &str,
		redirect_uri: &str,
		scope: ScopeSet,
	) -> Result<AuthorizationRequest> {
		const STAGE: FlowStage = FlowStage::Start;

		let client_id = ClientId::new(client_id).map_err(|e| match e {
			IdentifierError::Empty { .. } => ConfigError::EmptyClientId,
			e => ConfigError::from(e),
		})?;

		if redirect_uri.trim().is_empty() {
			return Err(ConfigError::EmptyRedirectUri.into());
		}

		let redirect_uri = Url::parse(redirect_uri)
			.map_err(|source| ConfigError::InvalidRedirect { source })?;
		let request = AuthorizationRequest::new(&self.descriptor, client_id, redirect_uri, scope);
		let fingerprint = obs::state_fingerprint(&request.state);
		let _span = FlowSpan::new(STAGE, "start_authorization", &fingerprint).entered();
		let now = OffsetDateTime::now_utc();
		let mut sessions = self.sessions.lock();

		session::prune_expired(&mut sessions, now - self.session_ttl);
		sessions.insert(request.state.clone(), SessionEntry::new(request.clone(), now));

		drop(sessions);
		obs::record_outcome(STAGE, "started");

		Ok(request)
	}

	/// Classifies the provider callback for `request`.
	///
	/// A callback whose `state` is missing or differs from `request.state` is always
	/// [`AuthorizationOutcome::InvalidRequest`]. `Granted` moves the session to
	/// [`FlowPhase::AuthorizedPendingExchange`]; every other outcome fails it.
	pub fn complete_authorization(
		&self,
		request: &AuthorizationRequest,
		callback: CallbackParams,
	) -> Result<AuthorizationOutcome> {
		const STAGE: FlowStage = FlowStage::Callback;

		let fingerprint = obs::state_fingerprint(&request.state);
		let _span = FlowSpan::new(STAGE, "complete_authorization", &fingerprint).entered();
		let mut sessions = self.sessions.lock();
		let entry = sessions.get_mut(&request.state).ok_or(SequenceError::UnknownSession)?;

		if entry.phase() != FlowPhase::Pending {
			return Err(SequenceError::CallbackAlreadyDelivered { phase: entry.phase() }.into());
		}

		let outcome = callback.classify(&request.state);

		if callback.state.as_deref() != Some(request.state.as_str()) {
			obs::warn_state_mismatch(&fingerprint);
		}

		match &outcome {
			AuthorizationOutcome::Granted { code } => {
				entry.granted_code = Some(code.clone());
				entry.advance(FlowPhase::AuthorizedPendingExchange);
			},
			_ => entry.advance(FlowPhase::Failed),
		}

		drop(sessions);
		obs::record_outcome(STAGE, outcome.label());

		Ok(outcome)
	}

	/// Parses the redirect URL's query and classifies it; see
	/// [`complete_authorization`](Self::complete_authorization).
	pub fn complete_from_redirect(
		&self,
		request: &AuthorizationRequest,
		redirect: &Url,
	) -> Result<AuthorizationOutcome> {
		self.complete_authorization(request, CallbackParams::from_redirect_url(redirect))
	}

	/// Redeems the code granted to `request`'s session.
	///
	/// The code is claimed before the provider is contacted, so a second or concurrent call
	/// fails with [`SequenceError::CodeAlreadyClaimed`]. The call is bounded by the configured
	/// exchange timeout and must run inside a Tokio runtime with the time driver enabled. If the
	/// returned future is dropped early the session moves to [`FlowPhase::Failed`].
	pub async fn exchange_code(
		&self,
		request: &AuthorizationRequest,
		code: &str,
		client_secret: &str,
	) -> Result<TokenExchangeOutcome> {
		const STAGE: FlowStage = FlowStage::Exchange;

		let fingerprint = obs::state_fingerprint(&request.state);
		let span = FlowSpan::new(STAGE, "exchange_code", &fingerprint);

		span.instrument(self.run_exchange(request, code, client_secret)).await
	}

	/// Returns a snapshot of the session started by `request`.
	pub fn session(&self, request: &AuthorizationRequest) -> Option<FlowSession> {
		self.sessions.lock().get(&request.state).map(|entry| entry.session.clone())
	}

	/// Destroys the session once its terminal outcome has been consumed.
	pub fn release(&self, request: &AuthorizationRequest) -> Option<FlowSession> {
		self.sessions.lock().remove(&request.state).map(|entry| entry.session)
	}

	async fn run_exchange(
		&self,
		request: &AuthorizationRequest,
		code: &str,
		client_secret: &str,
	) -> Result<TokenExchangeOutcome> {
		if client_secret.is_empty() {
			return Err(ConfigError::EmptyClientSecret.into());
		}

		let guard = self.claim_code(request, code)?;
		let exchange = TokenExchangeRequest {
			token_endpoint: &self.descriptor.endpoints.token,
			client_id: &request.client_id,
			client_secret,
			code,
			redirect_uri: &request.redirect_uri,
			auth_method: self.descriptor.client_auth_method,
		};
		let outcome =
			match tokio::time::timeout(self.exchange_timeout, self.provider_client.exchange(exchange))
				.await
			{
				Ok(Ok(response)) =>
					TokenExchangeOutcome::from_response(&response, OffsetDateTime::now_utc()),
				Ok(Err(e)) => TokenExchangeOutcome::from_transport(&e),
				Err(_) => TokenExchangeOutcome::from_transport(&TransportError::Timeout),
			};
		let phase = match &outcome {
			TokenExchangeOutcome::Issued { .. } => FlowPhase::Complete,
			_ => FlowPhase::Failed,
		};

		guard.finish(phase);
		obs::record_outcome(FlowStage::Exchange, outcome.label());

		Ok(outcome)
	}

	fn claim_code(&self, request: &AuthorizationRequest, code: &str) -> Result<ExchangeGuard> {
		let mut sessions = self.sessions.lock();
		let entry = sessions.get_mut(&request.state).ok_or(SequenceError::UnknownSession)?;

		if entry.phase() != FlowPhase::AuthorizedPendingExchange {
			return Err(SequenceError::NotAwaitingExchange { phase: entry.phase() }.into());
		}

		let granted = entry.granted_code.take().ok_or(SequenceError::CodeAlreadyClaimed)?;

		if granted != code {
			entry.granted_code = Some(granted);

			return Err(SequenceError::CodeMismatch.into());
		}

		Ok(ExchangeGuard::new(self.sessions.clone(), request.state.clone()))
	}
}
#[cfg(feature = "reqwest")]
impl AuthorizationCodeFlow<ReqwestProviderClient> {
	/// Creates a flow with a reqwest client whose requests never follow redirects.
	pub fn with_reqwest(descriptor: ProviderDescriptor) -> Result<Self> {
		let client = ReqwestProviderClient::with_timeout(Self::DEFAULT_EXCHANGE_TIMEOUT)?;

		Ok(Self::new(descriptor, client))
	}
}
impl<C> Clone for AuthorizationCodeFlow<C>
where
	C: ?Sized + ProviderClient,
{
	fn clone(&self) -> Self {
		Self {
			descriptor: self.descriptor.clone(),
			provider_client: self.provider_client.clone(),
			exchange_timeout: self.exchange_timeout,
			session_ttl: self.session_ttl,
			sessions: self.sessions.clone(),
		}
	}
}
impl<C> Debug for AuthorizationCodeFlow<C>
where
	C: ?Sized + ProviderClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationCodeFlow")
			.field("descriptor", &self.descriptor)
			.field("exchange_timeout", &self.exchange_timeout)
			.field("session_ttl", &self.session_ttl)
			.field("sessions", &self.sessions.lock().len())
			.finish()
	}
}

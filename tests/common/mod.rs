//! Shared fixtures for integration tests.

#![allow(dead_code)]

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use parking_lot::Mutex;
// self
use oauth2_codeflow::{
	auth::{ProviderId, ScopeSet},
	error::TransportError,
	flows::{AuthorizationCodeFlow, AuthorizationRequest, CallbackParams},
	http::{ProviderClient, ProviderFuture, TokenEndpointResponse, TokenExchangeRequest},
	provider::ProviderDescriptor,
	url::Url,
};

pub const CLIENT_ID: &str = "client-it";
pub const CLIENT_SECRET: &str = "secret-it";
pub const REDIRECT_URI: &str = "app://callback";

/// Canned behavior for [`StubClient`].
#[derive(Clone, Debug)]
pub enum Reply {
	/// Answer with a status and body.
	Respond(u16, &'static str),
	/// Fail with a network error.
	Refuse,
	/// Report a transport-level timeout.
	TimedOut,
	/// Never answer.
	Hang,
}

/// [`ProviderClient`] stub that counts calls and records the codes it was asked to redeem.
#[derive(Debug)]
pub struct StubClient {
	reply: Reply,
	calls: AtomicUsize,
	codes: Mutex<Vec<String>>,
}
impl StubClient {
	pub fn new(reply: Reply) -> Arc<Self> {
		Arc::new(Self { reply, calls: AtomicUsize::new(0), codes: Mutex::new(Vec::new()) })
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn codes(&self) -> Vec<String> {
		self.codes.lock().clone()
	}
}
impl ProviderClient for StubClient {
	fn exchange<'a>(&'a self, request: TokenExchangeRequest<'a>) -> ProviderFuture<'a> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.codes.lock().push(request.code.to_owned());

		let reply = self.reply.clone();

		Box::pin(async move {
			match reply {
				Reply::Respond(status, body) => Ok(TokenEndpointResponse::new(status, body)),
				Reply::Refuse =>
					Err(TransportError::network(std::io::Error::other("connection refused"))),
				Reply::TimedOut => Err(TransportError::Timeout),
				Reply::Hang => std::future::pending().await,
			}
		})
	}
}

pub fn url(value: &str) -> Url {
	Url::parse(value).expect("Fixture URL should parse.")
}

pub fn descriptor() -> ProviderDescriptor {
	let provider_id = ProviderId::new("foursquare").expect("Provider fixture should be valid.");

	ProviderDescriptor::builder(provider_id)
		.authorization_endpoint(url("foursquareauth://authorize"))
		.token_endpoint(url("https://foursquare.com/oauth2/access_token"))
		.authorize_param("v", "20130509")
		.build()
		.expect("Descriptor fixture should build.")
}

pub fn flow(client: Arc<StubClient>) -> AuthorizationCodeFlow<StubClient> {
	AuthorizationCodeFlow::new(descriptor(), client)
}

pub fn start(flow: &AuthorizationCodeFlow<StubClient>) -> AuthorizationRequest {
	flow.start_authorization(CLIENT_ID, REDIRECT_URI, ScopeSet::default())
		.expect("Authorization should start.")
}

/// Callback carrying the given state and code.
pub fn code_callback(state: &str, code: &str) -> CallbackParams {
	CallbackParams { state: Some(state.into()), code: Some(code.into()), ..Default::default() }
}

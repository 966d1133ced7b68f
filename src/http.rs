//! Network boundary for the code-for-token exchange.
//!
//! The flow only ever sees [`ProviderClient`]: it hands over a [`TokenExchangeRequest`] and
//! receives the raw [`TokenEndpointResponse`] (status + body) or a [`TransportError`]. Reading
//! the body stays in the flow so every client gets the same classification.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use reqwest::{header::ACCEPT, redirect::Policy};
// self
use crate::{_prelude::*, auth::ClientId, error::TransportError, provider::ClientAuthMethod};

/// Boxed future returned by [`ProviderClient::exchange`].
pub type ProviderFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TokenEndpointResponse, TransportError>> + 'a + Send>>;

/// Performs the `grant_type=authorization_code` call against a token endpoint.
///
/// Implementations own timeouts, TLS, and proxies. The returned future must be `Send` so the
/// flow can be driven from multi-threaded executors, and dropping it must abort the request.
pub trait ProviderClient
where
	Self: 'static + Send + Sync,
{
	/// Sends the exchange request and returns the endpoint's raw answer.
	fn exchange<'a>(&'a self, request: TokenExchangeRequest<'a>) -> ProviderFuture<'a>;
}

/// Everything a [`ProviderClient`] needs to redeem one authorization code.
#[derive(Clone, Copy)]
pub struct TokenExchangeRequest<'a> {
	/// Token endpoint URL from the provider descriptor.
	pub token_endpoint: &'a Url,
	/// OAuth client identifier.
	pub client_id: &'a ClientId,
	/// OAuth client secret.
	pub client_secret: &'a str,
	/// Authorization code granted by the callback.
	pub code: &'a str,
	/// Redirect URI used when the code was requested.
	pub redirect_uri: &'a Url,
	/// How the client authenticates itself.
	pub auth_method: ClientAuthMethod,
}
impl TokenExchangeRequest<'_> {
	/// Form fields for the request body under the configured auth method.
	pub fn form(&self) -> Vec<(&'static str, &str)> {
		let mut form = vec![
			("grant_type", "authorization_code"),
			("code", self.code),
			("redirect_uri", self.redirect_uri.as_str()),
		];

		if matches!(self.auth_method, ClientAuthMethod::ClientSecretPost) {
			form.push(("client_id", self.client_id.as_str()));
			form.push(("client_secret", self.client_secret));
		}

		form
	}
}
impl Debug for TokenExchangeRequest<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenExchangeRequest")
			.field("token_endpoint", &self.token_endpoint.as_str())
			.field("client_id", self.client_id)
			.field("client_secret", &"<redacted>")
			.field("code", &"<redacted>")
			.field("redirect_uri", &self.redirect_uri.as_str())
			.field("auth_method", &self.auth_method)
			.finish()
	}
}

/// Raw token endpoint answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenEndpointResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body bytes, expected to be JSON.
	pub body: Vec<u8>,
}
impl TokenEndpointResponse {
	/// Builds a response from a status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Thin wrapper around [`ReqwestClient`] that speaks the token endpoint protocol.
///
/// Token endpoints answer directly, so a client built through
/// [`ReqwestProviderClient::with_timeout`] never follows redirects. Apply the same policy when
/// supplying your own client through [`ReqwestProviderClient::with_client`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestProviderClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestProviderClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client whose requests give up after `timeout`.
	pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder().timeout(timeout).redirect(Policy::none()).build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestProviderClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestProviderClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ProviderClient for ReqwestProviderClient {
	fn exchange<'a>(&'a self, request: TokenExchangeRequest<'a>) -> ProviderFuture<'a> {
		Box::pin(async move {
			let mut builder = self
				.0
				.post(request.token_endpoint.clone())
				.header(ACCEPT, "application/json")
				.form(&request.form());

			if matches!(request.auth_method, ClientAuthMethod::ClientSecretBasic) {
				builder =
					builder.basic_auth(request.client_id.as_str(), Some(request.client_secret));
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(TokenEndpointResponse { status, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Fixture URL should parse.")
	}

	#[test]
	fn post_auth_puts_credentials_in_form() {
		let endpoint = url("https://example.com/token");
		let redirect = url("app://callback");
		let client_id = ClientId::new("client").expect("Client fixture should be valid.");
		let request = TokenExchangeRequest {
			token_endpoint: &endpoint,
			client_id: &client_id,
			client_secret: "secret",
			code: "XYZ",
			redirect_uri: &redirect,
			auth_method: ClientAuthMethod::ClientSecretPost,
		};

		assert_eq!(
			request.form(),
			[
				("grant_type", "authorization_code"),
				("code", "XYZ"),
				("redirect_uri", "app://callback"),
				("client_id", "client"),
				("client_secret", "secret"),
			]
		);

		let basic =
			TokenExchangeRequest { auth_method: ClientAuthMethod::ClientSecretBasic, ..request };

		assert!(basic.form().iter().all(|(name, _)| *name != "client_secret"));
	}

	#[test]
	fn debug_redacts_secret_and_code() {
		let endpoint = url("https://example.com/token");
		let redirect = url("app://callback");
		let client_id = ClientId::new("client").expect("Client fixture should be valid.");
		let request = TokenExchangeRequest {
			token_endpoint: &endpoint,
			client_id: &client_id,
			client_secret: "hunter2",
			code: "single-use",
			redirect_uri: &redirect,
			auth_method: ClientAuthMethod::ClientSecretPost,
		};
		let rendered = format!("{request:?}");

		assert!(!rendered.contains("hunter2"));
		assert!(!rendered.contains("single-use"));
	}

	#[test]
	fn success_covers_2xx_only() {
		assert!(TokenEndpointResponse::new(200, "{}").is_success());
		assert!(!TokenEndpointResponse::new(302, "").is_success());
		assert!(!TokenEndpointResponse::new(400, "{}").is_success());
	}
}

//! Walks a login through start, callback, exchange, and persistence using an in-process
//! provider stub, matching every outcome exhaustively.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
// self
use oauth2_codeflow::{
	auth::{ProviderId, ScopeSet},
	error::TransportError,
	flows::{AuthorizationCodeFlow, AuthorizationOutcome, TokenExchangeOutcome},
	http::{ProviderClient, ProviderFuture, TokenEndpointResponse, TokenExchangeRequest},
	provider::ProviderDescriptor,
	store::{MemoryStore, TokenStore},
	url::Url,
};

const CLIENT_ID: &str = "demo-client";
const CLIENT_SECRET: &str = "demo-secret";

/// Token endpoint stand-in that issues a token for one known code.
struct DemoProvider;
impl ProviderClient for DemoProvider {
	fn exchange<'a>(&'a self, request: TokenExchangeRequest<'a>) -> ProviderFuture<'a> {
		Box::pin(async move {
			let body = if request.code == "demo-code" {
				r#"{"access_token":"demo-access","expires_in":3600}"#
			} else {
				r#"{"error":"invalid_grant","error_description":"Unknown code."}"#
			};

			Ok::<_, TransportError>(TokenEndpointResponse::new(200, body))
		})
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let store: Arc<dyn TokenStore> = Arc::new(MemoryStore::default());
	let descriptor = ProviderDescriptor::builder(ProviderId::new("foursquare")?)
		.authorization_endpoint(Url::parse("foursquareauth://authorize")?)
		.token_endpoint(Url::parse("https://foursquare.com/oauth2/access_token")?)
		.authorize_param("v", "20130509")
		.build()?;
	let flow = <AuthorizationCodeFlow<DemoProvider>>::new(descriptor, DemoProvider);
	let request = flow.start_authorization(CLIENT_ID, "demo-app://callback", ScopeSet::default())?;

	println!("Send the user to: {}", request.authorize_url);

	// The provider redirects back; here we fake the redirect it would send.
	let mut redirect = request.redirect_uri.clone();

	redirect
		.query_pairs_mut()
		.append_pair("state", &request.state)
		.append_pair("code", "demo-code");

	let code = match flow.complete_from_redirect(&request, &redirect)? {
		AuthorizationOutcome::Granted { code } => code,
		AuthorizationOutcome::Canceled => return finish("Canceled"),
		AuthorizationOutcome::Denied => return finish("Denied"),
		AuthorizationOutcome::ProtocolError { message, code } =>
			return finish(&format!("{message} [{code}]")),
		AuthorizationOutcome::UnsupportedVersion =>
			return finish("Provider app version is not supported"),
		AuthorizationOutcome::InvalidRequest => return finish("Invalid request"),
		AuthorizationOutcome::UnknownFailure { detail } =>
			return finish(&format!("Authorization failed: {detail}")),
	};

	match flow.exchange_code(&request, &code, CLIENT_SECRET).await? {
		TokenExchangeOutcome::Issued { credential } => {
			println!("Issued credential: {credential:?}");

			store.set(credential).await?;
		},
		TokenExchangeOutcome::ProtocolError { message, code } => println!("{message} [{code}]"),
		TokenExchangeOutcome::UnknownFailure { detail } => println!("Exchange failed: {detail}"),
	}

	flow.release(&request);

	println!("Authorized: {}", store.get().await?.is_some());

	Ok(())
}

fn finish(message: &str) -> Result<()> {
	println!("{message}");

	Ok(())
}

//! Demonstrates the reqwest-backed provider client against a local mock token endpoint using
//! HTTP Basic client authentication and a hook-persisted token store.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use parking_lot::Mutex;
// self
use oauth2_codeflow::{
	auth::{ProviderId, ScopeSet},
	flows::{AuthorizationCodeFlow, CallbackParams, TokenExchangeOutcome},
	http::ReqwestProviderClient,
	provider::{ClientAuthMethod, ProviderDescriptor},
	reqwest::Client,
	store::{HookStore, PersistenceHooks, StoreFuture, TokenStore},
	url::Url,
};

/// Keeps the persisted bytes in memory; a real app would seal them with a platform keystore.
#[derive(Default)]
struct InMemoryVault(Mutex<Option<Vec<u8>>>);
impl PersistenceHooks for InMemoryVault {
	fn save(&self, bytes: Vec<u8>) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			*self.0.lock() = Some(bytes);

			Ok(())
		})
	}

	fn load(&self) -> StoreFuture<'_, Option<Vec<u8>>> {
		Box::pin(async move { Ok(self.0.lock().clone()) })
	}

	fn erase(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			*self.0.lock() = None;

			Ok(())
		})
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"demo-access","token_type":"bearer","expires_in":900}"#);
		})
		.await;
	let descriptor = ProviderDescriptor::builder(ProviderId::new("demo-provider")?)
		.authorization_endpoint(Url::parse(&server.url("/authorize"))?)
		.token_endpoint(Url::parse(&server.url("/token"))?)
		.client_auth_method(ClientAuthMethod::ClientSecretBasic)
		.build()?;
	let provider_client = ReqwestProviderClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let flow = <AuthorizationCodeFlow<ReqwestProviderClient>>::new(descriptor, provider_client);
	let vault = Arc::new(InMemoryVault::default());
	let store = <HookStore<InMemoryVault>>::open(vault.clone()).await?;
	let request = flow.start_authorization(
		"demo-client",
		"https://app.example.com/callback",
		ScopeSet::new(["profile"])?,
	)?;

	println!("Authorize URL: {}", request.authorize_url);

	let callback = CallbackParams {
		state: Some(request.state.clone()),
		code: Some("demo-code".into()),
		..Default::default()
	};
	let outcome = flow.complete_authorization(&request, callback)?;

	println!("Callback outcome: {outcome:?}");

	match flow.exchange_code(&request, "demo-code", "demo-secret").await? {
		TokenExchangeOutcome::Issued { credential } => {
			println!("Expires at: {:?}", credential.expires_at());

			store.set(credential).await?;
		},
		other => println!("Exchange did not issue a credential: {other:?}"),
	}

	token_mock.assert_async().await;

	println!("Vault holds {} bytes.", vault.0.lock().as_ref().map_or(0, Vec::len));

	Ok(())
}

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	provider::{ClientAuthMethod, ProviderDescriptor, ProviderEndpoints, ProviderQuirks},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderDescriptorError {
	/// Authorization endpoint is required.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is required.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Endpoint uses plain HTTP (or, for the token endpoint, anything but HTTPS).
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Reject scope delimiters that are control characters.
	#[error("Scope delimiter must be a printable character.")]
	InvalidScopeDelimiter {
		/// Invalid delimiter that was supplied.
		delimiter: char,
	},
	/// Extra authorize parameters may not shadow the ones the flow sets itself.
	#[error("Authorize parameter `{name}` is reserved.")]
	ReservedAuthorizeParam {
		/// Offending parameter name.
		name: String,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: ProviderId,
	/// Authorization endpoint.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint used for the code exchange.
	pub token_endpoint: Option<Url>,
	/// Preferred client authentication method for the token endpoint.
	pub client_auth_method: ClientAuthMethod,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
	/// Static parameters appended to the authorize URL.
	pub authorize_params: BTreeMap<String, String>,
}
impl ProviderDescriptorBuilder {
	const RESERVED_PARAMS: [&'static str; 5] =
		["response_type", "client_id", "redirect_uri", "scope", "state"];

	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			authorization_endpoint: None,
			token_endpoint: None,
			client_auth_method: ClientAuthMethod::default(),
			quirks: ProviderQuirks::default(),
			authorize_params: BTreeMap::new(),
		}
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Overrides the client authentication method.
	pub fn client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.client_auth_method = method;

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Appends a static parameter to every authorize URL.
	pub fn authorize_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.authorize_params.insert(name.into(), value.into());

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let authorization = self
			.authorization_endpoint
			.ok_or(ProviderDescriptorError::MissingAuthorizationEndpoint)?;
		let token = self.token_endpoint.ok_or(ProviderDescriptorError::MissingTokenEndpoint)?;
		let descriptor = ProviderDescriptor {
			id: self.id,
			endpoints: ProviderEndpoints { authorization, token },
			client_auth_method: self.client_auth_method,
			quirks: self.quirks,
			authorize_params: self.authorize_params,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor. Run again after deserializing from config.
	pub fn validate(&self) -> Result<(), ProviderDescriptorError> {
		// App-to-app schemes (`provider-app://authorize`) are fine for consent; cleartext is not.
		if self.endpoints.authorization.scheme() == "http" {
			return Err(ProviderDescriptorError::InsecureEndpoint {
				endpoint: "authorization",
				url: self.endpoints.authorization.to_string(),
			});
		}
		if self.endpoints.token.scheme() != "https" {
			return Err(ProviderDescriptorError::InsecureEndpoint {
				endpoint: "token",
				url: self.endpoints.token.to_string(),
			});
		}
		if self.quirks.scope_delimiter.is_control() {
			return Err(ProviderDescriptorError::InvalidScopeDelimiter {
				delimiter: self.quirks.scope_delimiter,
			});
		}
		if let Some(name) = self
			.authorize_params
			.keys()
			.find(|name| ProviderDescriptorBuilder::RESERVED_PARAMS.contains(&name.as_str()))
		{
			return Err(ProviderDescriptorError::ReservedAuthorizeParam { name: name.clone() });
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Descriptor fixture URL should parse.")
	}

	fn builder() -> ProviderDescriptorBuilder {
		ProviderDescriptor::builder(
			ProviderId::new("foursquare").expect("Provider fixture should be valid."),
		)
	}

	#[test]
	fn custom_scheme_authorization_endpoint_is_accepted() {
		let descriptor = builder()
			.authorization_endpoint(url("foursquareauth://authorize"))
			.token_endpoint(url("https://foursquare.com/oauth2/access_token"))
			.authorize_param("v", "20130509")
			.build()
			.expect("Custom app scheme should be accepted for consent.");

		assert_eq!(descriptor.client_auth_method, ClientAuthMethod::ClientSecretPost);
		assert_eq!(descriptor.quirks.scope_delimiter, ' ');
		assert_eq!(descriptor.authorize_params.get("v").map(String::as_str), Some("20130509"));
	}

	#[test]
	fn cleartext_endpoints_are_rejected() {
		let err = builder()
			.authorization_endpoint(url("http://example.com/auth"))
			.token_endpoint(url("https://example.com/token"))
			.build()
			.expect_err("Plain HTTP consent page must be rejected.");

		assert!(matches!(
			err,
			ProviderDescriptorError::InsecureEndpoint { endpoint: "authorization", .. }
		));

		let err = builder()
			.authorization_endpoint(url("https://example.com/auth"))
			.token_endpoint(url("app://token"))
			.build()
			.expect_err("Token endpoint must be HTTPS.");

		assert!(matches!(err, ProviderDescriptorError::InsecureEndpoint { endpoint: "token", .. }));
	}

	#[test]
	fn missing_endpoints_and_bad_quirks_are_reported() {
		assert_eq!(
			builder().token_endpoint(url("https://example.com/token")).build(),
			Err(ProviderDescriptorError::MissingAuthorizationEndpoint)
		);
		assert_eq!(
			builder()
				.authorization_endpoint(url("https://example.com/auth"))
				.token_endpoint(url("https://example.com/token"))
				.quirks(ProviderQuirks { scope_delimiter: '\n' })
				.build(),
			Err(ProviderDescriptorError::InvalidScopeDelimiter { delimiter: '\n' })
		);
		assert!(matches!(
			builder()
				.authorization_endpoint(url("https://example.com/auth"))
				.token_endpoint(url("https://example.com/token"))
				.authorize_param("state", "fixed")
				.build(),
			Err(ProviderDescriptorError::ReservedAuthorizeParam { .. })
		));
	}

	#[test]
	fn descriptor_loads_from_config_json() {
		let descriptor: ProviderDescriptor = serde_json::from_str(
			r#"{
				"id": "demo",
				"endpoints": {
					"authorization": "https://provider.example.com/authorize",
					"token": "https://provider.example.com/token"
				},
				"client_auth_method": "client_secret_basic"
			}"#,
		)
		.expect("Descriptor config should deserialize.");

		assert_eq!(descriptor.client_auth_method, ClientAuthMethod::ClientSecretBasic);
		assert!(descriptor.authorize_params.is_empty());
		assert!(descriptor.validate().is_ok());
	}
}

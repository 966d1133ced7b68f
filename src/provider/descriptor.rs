//! Provider descriptor data structures.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use quirks::*;

// self
use crate::{_prelude::*, auth::ProviderId};

/// How the client authenticates itself at the token endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	/// `client_id`/`client_secret` travel as form parameters.
	#[default]
	ClientSecretPost,
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
}

/// Endpoint pair declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Where the user is sent to grant consent. May use an app-to-app custom scheme.
	pub authorization: Url,
	/// Token endpoint used for the code exchange. Always HTTPS.
	pub token: Url,
}

/// Immutable provider descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Preferred client authentication mechanism.
	#[serde(default)]
	pub client_auth_method: ClientAuthMethod,
	/// Provider-specific quirks.
	#[serde(default)]
	pub quirks: ProviderQuirks,
	/// Static query parameters appended to every authorize URL (e.g. an SDK version marker).
	#[serde(default)]
	pub authorize_params: BTreeMap<String, String>,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}
}

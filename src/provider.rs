//! Validated OAuth endpoint descriptor derived from the client-secret document.
//!
//! The descriptor is the only place that decides which URLs the flow talks to. Endpoints
//! must use HTTPS.

// self
use crate::{_prelude::*, config::ClientSecretConfig, error::ConfigError};

/// Endpoint set declared by the client registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint the user is redirected to.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
}

/// Immutable descriptor consumed by the authorization-code flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Endpoint definitions.
	pub endpoints: ProviderEndpoints,
}
impl ProviderDescriptor {
	/// Builds a descriptor from a parsed client registration.
	pub fn from_client_secret(config: &ClientSecretConfig) -> Result<Self, ConfigError> {
		let descriptor = Self {
			endpoints: ProviderEndpoints {
				authorization: config.auth_uri.clone(),
				token: config.token_uri.clone(),
			},
		};

		descriptor.validate()?;

		Ok(descriptor)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		validate_endpoint("authorization", &self.endpoints.authorization)?;
		validate_endpoint("token", &self.endpoints.token)?;

		Ok(())
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	if url.scheme() != "https" {
		Err(ConfigError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}

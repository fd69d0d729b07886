//! Environment-backed settings and the OAuth client-secret document.
//!
//! [`Settings`] only records raw values. The client-secret document and the redirect URI
//! are validated each time a flow is built, so a broken deployment fails the sign-in
//! requests instead of the process start.
//!
//! | Env Var                     | Required | Default |
//! |-----------------------------|----------|---------|
//! | `REDIRECT_URI`              | sign-in  | --      |
//! | `GOOGLE_CLIENT_SECRET_JSON` | sign-in  | --      |
//! | `GEMINI_API_KEY`            | no       | --      |
//! | `FRONTEND_URL`              | no       | --      |
//! | `PORT`                      | no       | `8000`  |

// std
use std::env;
// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenSecret},
	error::ConfigError,
};

/// OAuth scopes requested for every sign-in.
pub const YOUTUBE_SCOPES: [&str; 2] =
	["https://www.googleapis.com/auth/youtube", "https://www.googleapis.com/auth/youtube.force-ssl"];
/// Model name handed to the comment classifier.
pub const CLASSIFIER_MODEL: &str = "gemini-1.5-flash";
/// Listening port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 8000;

const REDIRECT_URI: &str = "REDIRECT_URI";
const CLIENT_SECRET_JSON: &str = "GOOGLE_CLIENT_SECRET_JSON";
const CLASSIFIER_API_KEY: &str = "GEMINI_API_KEY";
const FRONTEND_URL: &str = "FRONTEND_URL";
const PORT: &str = "PORT";

/// Process configuration read from the environment.
#[derive(Clone)]
pub struct Settings {
	/// Raw `REDIRECT_URI` value.
	pub redirect_uri: Option<String>,
	/// Raw client-secret JSON document.
	pub client_secret_json: Option<TokenSecret>,
	/// API key for the comment classifier.
	pub classifier_api_key: Option<TokenSecret>,
	/// Model name for the comment classifier.
	pub classifier_model: String,
	/// Frontend origin allowed by the route layer.
	pub frontend_url: Option<String>,
	/// Listening port for the route layer.
	pub port: u16,
	/// Scopes requested during sign-in.
	pub scopes: ScopeSet,
}
impl Settings {
	/// Loads `.env` when present, then reads the process environment.
	pub fn from_env() -> Result<Self> {
		// A missing `.env` is the normal production case.
		let _ = dotenvy::dotenv();

		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Builds settings from an arbitrary key lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let port = match lookup(PORT) {
			Some(value) => value
				.trim()
				.parse::<u16>()
				.map_err(|source| ConfigError::InvalidPort { value, source })?,
			None => DEFAULT_PORT,
		};
		let scopes = ScopeSet::new(YOUTUBE_SCOPES).map_err(ConfigError::from)?;

		Ok(Self {
			redirect_uri: lookup(REDIRECT_URI),
			client_secret_json: lookup(CLIENT_SECRET_JSON).map(TokenSecret::from),
			classifier_api_key: lookup(CLASSIFIER_API_KEY).map(TokenSecret::from),
			classifier_model: CLASSIFIER_MODEL.into(),
			frontend_url: lookup(FRONTEND_URL),
			port,
			scopes,
		})
	}

	/// Parses the client-secret document.
	pub fn client_secret(&self) -> Result<ClientSecretConfig, ConfigError> {
		let raw = self.client_secret_json.as_ref().ok_or(ConfigError::MissingClientSecret)?;

		ClientSecretConfig::parse(raw.expose())
	}

	/// Parses the configured redirect URI.
	pub fn redirect_uri(&self) -> Result<Url, ConfigError> {
		let raw = self.redirect_uri.as_deref().ok_or(ConfigError::MissingRedirectUri)?;

		Url::parse(raw).map_err(|source| ConfigError::InvalidRedirect { source })
	}
}
impl Debug for Settings {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Settings")
			.field("redirect_uri", &self.redirect_uri)
			.field("client_secret_set", &self.client_secret_json.is_some())
			.field("classifier_api_key_set", &self.classifier_api_key.is_some())
			.field("classifier_model", &self.classifier_model)
			.field("frontend_url", &self.frontend_url)
			.field("port", &self.port)
			.field("scopes", &self.scopes)
			.finish()
	}
}

/// Application type declared by the client-secret document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientKind {
	/// `web` entry.
	Web,
	/// `installed` entry.
	Installed,
}

/// Validated OAuth client registration.
#[derive(Clone)]
pub struct ClientSecretConfig {
	/// Application type the entry was declared under.
	pub kind: ClientKind,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: TokenSecret,
	/// Authorization endpoint.
	pub auth_uri: Url,
	/// Token endpoint.
	pub token_uri: Url,
	/// Redirect URIs registered for the client.
	pub redirect_uris: Vec<String>,
}
impl ClientSecretConfig {
	/// Parses a client-secret JSON document holding a `web` or `installed` entry.
	pub fn parse(raw: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(raw);
		let document: ClientSecretDocument = serde_path_to_error::deserialize(&mut de)
			.map_err(|source| ConfigError::MalformedClientSecret { source })?;
		let (kind, entry) = match (document.web, document.installed) {
			(Some(entry), _) => (ClientKind::Web, entry),
			(None, Some(entry)) => (ClientKind::Installed, entry),
			(None, None) => return Err(ConfigError::UnsupportedClientType),
		};

		Ok(Self {
			kind,
			client_id: entry.client_id,
			client_secret: TokenSecret::new(entry.client_secret),
			auth_uri: entry.auth_uri,
			token_uri: entry.token_uri,
			redirect_uris: entry.redirect_uris,
		})
	}
}
impl Debug for ClientSecretConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientSecretConfig")
			.field("kind", &self.kind)
			.field("client_id", &self.client_id)
			.field("auth_uri", &self.auth_uri)
			.field("token_uri", &self.token_uri)
			.field("redirect_uris", &self.redirect_uris)
			.finish()
	}
}

#[derive(Deserialize)]
struct ClientSecretDocument {
	web: Option<ClientSecretEntry>,
	installed: Option<ClientSecretEntry>,
}

#[derive(Deserialize)]
struct ClientSecretEntry {
	client_id: String,
	client_secret: String,
	auth_uri: Url,
	token_uri: Url,
	#[serde(default)]
	redirect_uris: Vec<String>,
}

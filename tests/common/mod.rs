//! Shared fixtures for the integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use dehate::{
	auth::{Credentials, ScopeSet, SessionId},
	config::{Settings, YOUTUBE_SCOPES},
	platform::ReqwestYouTubeClient,
	reqwest::Client,
	store::{CredentialStore, MemoryStore},
	url::Url,
};
use httpmock::prelude::*;
use time::OffsetDateTime;

pub const CLIENT_ID: &str = "client-it.apps.googleusercontent.com";
pub const CLIENT_SECRET: &str = "GOCSPX-client-it";
pub const REDIRECT_URI: &str = "https://api.example.com/auth/callback";
pub const API_PATH: &str = "/youtube/v3";

/// Client-secret document whose endpoints point at `server`.
pub fn client_secret_json(server: &MockServer) -> String {
	serde_json::json!({
		"web": {
			"client_id": CLIENT_ID,
			"client_secret": CLIENT_SECRET,
			"auth_uri": server.url("/o/oauth2/auth"),
			"token_uri": server.url("/token"),
			"redirect_uris": [REDIRECT_URI],
		}
	})
	.to_string()
}

/// Settings with a redirect URI and, optionally, a raw client-secret document.
pub fn settings(client_secret: Option<String>) -> Settings {
	Settings::from_lookup(move |key| match key {
		"REDIRECT_URI" => Some(REDIRECT_URI.into()),
		"GOOGLE_CLIENT_SECRET_JSON" => client_secret.clone(),
		_ => None,
	})
	.expect("Test settings should load.")
}

/// Reqwest client that accepts the self-signed certificates served by `httpmock`.
pub fn insecure_reqwest_client() -> Client {
	Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.")
}

/// Adapter wired to `server` for both the token endpoint and the Data API.
pub fn build_client(
	server: &MockServer,
	settings: Settings,
) -> (ReqwestYouTubeClient, Arc<MemoryStore>) {
	let store_backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn CredentialStore> = store_backend.clone();
	let api_base = Url::parse(&server.url(API_PATH)).expect("Mock API base should parse.");
	let client = ReqwestYouTubeClient::with_reqwest_client(
		settings,
		store,
		insecure_reqwest_client(),
		api_base,
	)
	.expect("Adapter should build against the mock server.");

	(client, store_backend)
}

/// Adapter with a valid client secret pointing at `server`.
pub fn configured_client(server: &MockServer) -> (ReqwestYouTubeClient, Arc<MemoryStore>) {
	build_client(server, settings(Some(client_secret_json(server))))
}

pub fn session(value: &str) -> SessionId {
	SessionId::new(value).expect("Session fixture should be valid.")
}

/// State value the redirect must echo for the pending sign-in of `session`.
pub fn pending_state(client: &ReqwestYouTubeClient, session: &SessionId) -> String {
	client
		.pending_authorization(session)
		.map(|pending| pending.state)
		.expect("Sign-in should be pending.")
}

pub fn api_path(resource: &str) -> String {
	format!("{API_PATH}/{resource}")
}

/// Stores an access token for `session` without going through the token endpoint.
pub async fn seed_credentials(store: &MemoryStore, session: &SessionId, access_token: &str) {
	let credentials = Credentials::builder(
		ScopeSet::new(YOUTUBE_SCOPES).expect("Scope fixture should be valid."),
	)
	.access_token(access_token)
	.issued_at(OffsetDateTime::now_utc())
	.build()
	.expect("Credential fixture should build.");

	store.save(session, credentials).await.expect("Seeding the store should succeed.");
}

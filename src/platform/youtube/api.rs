//! Minimal YouTube Data API v3 client: bearer-authenticated GET/POST against one base URL.

// crates.io
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
// self
use super::wire::ApiErrorEnvelope;
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{ConfigError, UpstreamError},
};

/// Production base URL of the YouTube Data API v3.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

const PLATFORM_API: &str = "the platform API";
const BODY_PREVIEW_LEN: usize = 256;

/// HTTP client bound to a Data API base URL.
#[derive(Clone, Debug)]
pub struct DataApi {
	client: ReqwestClient,
	base: Url,
}
impl DataApi {
	/// Binds `client` to `base`; the base must accept path segments.
	pub fn new(client: ReqwestClient, base: Url) -> Result<Self, ConfigError> {
		if base.cannot_be_a_base() {
			return Err(ConfigError::InvalidApiBase { url: base.into() });
		}

		Ok(Self { client, base })
	}

	/// Binds `client` to [`DEFAULT_API_BASE`].
	pub fn with_default_base(client: ReqwestClient) -> Result<Self, ConfigError> {
		let base = Url::parse(DEFAULT_API_BASE)
			.map_err(|_| ConfigError::InvalidApiBase { url: DEFAULT_API_BASE.into() })?;

		Self::new(client, base)
	}

	/// Base URL every resource path is appended to.
	pub fn base(&self) -> &Url {
		&self.base
	}

	pub(crate) async fn get<T>(
		&self,
		token: &TokenSecret,
		resource: &'static str,
		query: &[(&str, &str)],
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let request = self.client.get(self.endpoint(resource)).query(query);
		let body = self.send(token, resource, request).await?;
		let mut de = serde_json::Deserializer::from_slice(&body);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|source| UpstreamError::ApiResponseParse { resource, source }.into())
	}

	pub(crate) async fn post(
		&self,
		token: &TokenSecret,
		resource: &'static str,
		query: &[(&str, &str)],
	) -> Result<()> {
		let request = self.client.post(self.endpoint(resource)).query(query);

		self.send(token, resource, request).await.map(|_| ())
	}

	fn endpoint(&self, resource: &str) -> Url {
		let mut url = self.base.clone();

		if let Ok(mut segments) = url.path_segments_mut() {
			segments.pop_if_empty().extend(resource.split('/'));
		}

		url
	}

	async fn send(
		&self,
		token: &TokenSecret,
		resource: &'static str,
		request: RequestBuilder,
	) -> Result<Vec<u8>> {
		let response = request.bearer_auth(token.expose()).send().await.map_err(map_send_error)?;
		let status = response.status();
		let body = response.bytes().await.map_err(map_send_error)?.to_vec();

		if !status.is_success() {
			return Err(
				UpstreamError::Api { resource, status: status.as_u16(), message: error_message(&body) }
					.into(),
			);
		}

		Ok(body)
	}
}

fn map_send_error(err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}

	UpstreamError::network(PLATFORM_API, err).into()
}

fn error_message(body: &[u8]) -> String {
	if let Ok(envelope) = serde_json::from_slice::<ApiErrorEnvelope>(body) {
		return envelope.into_message();
	}

	let text = String::from_utf8_lossy(body);
	let trimmed = text.trim();

	if trimmed.is_empty() {
		return "empty response body".into();
	}

	trimmed.chars().take(BODY_PREVIEW_LEN).collect()
}

//! Authorization-code facade over the `oauth2` crate.
//!
//! The facade is rebuilt from the client-secret document for every flow, so configuration
//! errors surface before any network traffic. Token-endpoint failures are mapped into
//! [`UpstreamError`] with the HTTP status captured by the transport.

pub mod session;

pub use oauth2;
pub use session::{AuthorizationSession, CODE_CHALLENGE_METHOD};

// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, PkceCodeVerifier, RedirectUrl, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{Credentials, ScopeSet, SessionId},
	config::ClientSecretConfig,
	error::{ConfigError, UpstreamError},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	provider::ProviderDescriptor,
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

const TOKEN_ENDPOINT: &str = "the token endpoint";

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(
		&self,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(meta, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => UpstreamError::Io(inner).into(),
			HttpClientError::Other(message) => UpstreamError::TokenEndpoint {
				message: format!("HTTP client error occurred: {message}"),
				status: meta_status(meta),
			}
			.into(),
			_ => UpstreamError::TokenEndpoint {
				message: "HTTP client error occurred while calling the token endpoint".into(),
				status: meta_status(meta),
			}
			.into(),
		}
	}
}

/// Authorization-code flow bound to one client registration and redirect URI.
pub(crate) struct AuthCodeFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredBasicClient,
	authorization_endpoint: Url,
	client_id: String,
	redirect_uri: Url,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> AuthCodeFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn from_client_secret(
		config: &ClientSecretConfig,
		redirect_uri: Url,
		http_client: impl Into<Arc<C>>,
		error_mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let descriptor = ProviderDescriptor::from_client_secret(config)?;
		let auth_url = AuthUrl::new(descriptor.endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "authorization", source })?;
		let token_url = TokenUrl::new(descriptor.endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "token", source })?;
		let redirect_url = RedirectUrl::new(redirect_uri.to_string())
			.map_err(|source| ConfigError::InvalidRedirect { source })?;
		// Google expects the client credentials in the form body.
		let oauth_client = BasicClient::new(ClientId::new(config.client_id.clone()))
			.set_client_secret(ClientSecret::new(config.client_secret.expose().to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_redirect_uri(redirect_url)
			.set_auth_type(AuthType::RequestBody);

		Ok(Self {
			oauth_client,
			authorization_endpoint: descriptor.endpoints.authorization,
			client_id: config.client_id.clone(),
			redirect_uri,
			http_client: http_client.into(),
			error_mapper: error_mapper.into(),
		})
	}

	/// Starts a pending sign-in for `session`.
	pub(crate) fn start(&self, session: SessionId, scope: ScopeSet) -> AuthorizationSession {
		AuthorizationSession::issue(
			&self.authorization_endpoint,
			&self.client_id,
			&self.redirect_uri,
			session,
			scope,
		)
	}

	/// Exchanges an authorization code for a credential bundle.
	pub(crate) async fn exchange_code(
		&self,
		code: &str,
		pkce_verifier: Option<&str>,
		requested_scope: &ScopeSet,
	) -> Result<Credentials> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let mut request = self.oauth_client.exchange_code(AuthorizationCode::new(code.to_owned()));

		if let Some(verifier) = pkce_verifier {
			request = request.set_pkce_verifier(PkceCodeVerifier::new(verifier.to_owned()));
		}

		let response = request
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err, self.error_mapper.as_ref()))?;

		map_token_response(requested_scope, response)
	}
}

fn map_token_response(
	requested_scope: &ScopeSet,
	response: BasicTokenResponse,
) -> Result<Credentials> {
	let scope = match response.scopes() {
		Some(granted) => ScopeSet::new(
			granted.iter().map(|scope| scope.as_str()).filter(|scope| !scope.is_empty()),
		)
		.map_err(|err| UpstreamError::TokenEndpoint {
			message: format!("token endpoint granted an invalid scope: {err}"),
			status: None,
		})?,
		None => requested_scope.clone(),
	};
	let mut builder = Credentials::builder(scope)
		.access_token(response.access_token().secret().to_owned())
		.issued_at(OffsetDateTime::now_utc());

	if let Some(ttl) = response.expires_in().and_then(|ttl| i64::try_from(ttl.as_secs()).ok()) {
		builder = builder.expires_in(Duration::seconds(ttl));
	}
	if let Some(refresh) = response.refresh_token() {
		builder = builder.refresh_token(refresh.secret().to_owned());
	}

	builder.build().map_err(|err| {
		UpstreamError::TokenEndpoint {
			message: format!("token endpoint returned unusable credentials: {err}"),
			status: None,
		}
		.into()
	})
}

fn map_request_error<E, M>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) => map_server_response_error(response, meta_ref),
		RequestTokenError::Request(error) => mapper.map_transport_error(meta_ref, error),
		RequestTokenError::Parse(source, _body) =>
			UpstreamError::TokenResponseParse { source, status: meta_status(meta_ref) }.into(),
		RequestTokenError::Other(message) => UpstreamError::TokenEndpoint {
			message: format!("unexpected response: {message}"),
			status: meta_status(meta_ref),
		}
		.into(),
	}
}

fn map_server_response_error(
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> Error {
	let code = response.error().as_ref().to_owned();
	let message = match response.error_description() {
		Some(description) => format!("{code}: {description}"),
		None => code,
	};

	UpstreamError::TokenEndpoint { message, status: meta_status(meta) }.into()
}

fn map_reqwest_error(meta: Option<&ResponseMetadata>, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return UpstreamError::TokenEndpoint {
			message: "request timed out".into(),
			status: meta_status(meta).or_else(|| err.status().map(|code| code.as_u16())),
		}
		.into();
	}

	UpstreamError::network(TOKEN_ENDPOINT, err).into()
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::http::ReqwestHttpClient;

	fn config(token_uri: &str) -> ClientSecretConfig {
		let raw = format!(
			"{{\"web\":{{\"client_id\":\"client-id\",\"client_secret\":\"secret\",\"auth_uri\":\"https://accounts.google.com/o/oauth2/auth\",\"token_uri\":\"{token_uri}\"}}}}"
		);

		ClientSecretConfig::parse(&raw).expect("Client secret fixture should parse.")
	}

	fn redirect() -> Url {
		Url::parse("https://api.example.com/auth/callback").expect("Redirect fixture should parse.")
	}

	#[test]
	fn builds_facade_for_secure_endpoints() {
		let result =
			<AuthCodeFacade<ReqwestHttpClient, ReqwestTransportErrorMapper>>::from_client_secret(
				&config("https://oauth2.googleapis.com/token"),
				redirect(),
				Arc::new(ReqwestHttpClient::default()),
				Arc::new(ReqwestTransportErrorMapper),
			);

		assert!(result.is_ok());
	}

	#[test]
	fn rejects_insecure_token_endpoint() {
		let result =
			<AuthCodeFacade<ReqwestHttpClient, ReqwestTransportErrorMapper>>::from_client_secret(
				&config("http://oauth2.googleapis.com/token"),
				redirect(),
				Arc::new(ReqwestHttpClient::default()),
				Arc::new(ReqwestTransportErrorMapper),
			);

		assert!(matches!(result, Err(Error::Config(ConfigError::InsecureEndpoint { .. }))));
	}

	#[test]
	fn start_embeds_the_configured_redirect() {
		let facade =
			<AuthCodeFacade<ReqwestHttpClient, ReqwestTransportErrorMapper>>::from_client_secret(
				&config("https://oauth2.googleapis.com/token"),
				redirect(),
				Arc::new(ReqwestHttpClient::default()),
				Arc::new(ReqwestTransportErrorMapper),
			)
			.expect("Facade fixture should build.");
		let pending = facade.start(
			SessionId::new("browser-1").expect("Session fixture should be valid."),
			ScopeSet::new(["https://www.googleapis.com/auth/youtube"])
				.expect("Scope fixture should be valid."),
		);

		let redirect_param = pending
			.authorize_url
			.query_pairs()
			.find(|(key, _)| key == "redirect_uri")
			.map(|(_, value)| value.into_owned());

		assert_eq!(redirect_param.as_deref(), Some(redirect().as_str()));
		assert_eq!(pending.authorize_url.host_str(), Some("accounts.google.com"));
	}

	#[test]
	fn server_errors_keep_code_and_description() {
		let response: BasicErrorResponse = serde_json::from_str(
			"{\"error\":\"invalid_grant\",\"error_description\":\"Bad Request\"}",
		)
		.expect("Error response fixture should parse.");
		let err = map_server_response_error(response, Some(&ResponseMetadata { status: Some(400) }));

		match err {
			Error::Upstream(UpstreamError::TokenEndpoint { message, status }) => {
				assert_eq!(message, "invalid_grant: Bad Request");
				assert_eq!(status, Some(400));
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn empty_access_tokens_are_reported_as_upstream_failures() {
		let response: BasicTokenResponse =
			serde_json::from_str("{\"access_token\":\"\",\"token_type\":\"bearer\"}")
				.expect("Token response fixture should parse.");
		let scope = ScopeSet::new(["https://www.googleapis.com/auth/youtube"])
			.expect("Scope fixture should be valid.");
		let err = map_token_response(&scope, response).expect_err("Empty tokens must be rejected.");

		assert!(matches!(err, Error::Upstream(UpstreamError::TokenEndpoint { status: None, .. })));
		assert_eq!(err.http_status(), 500);
	}
}

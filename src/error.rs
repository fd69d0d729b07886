//! Error taxonomy shared by the configuration layer, the OAuth flow, and the content adapter.
//!
//! Every public operation returns [`Error`], which has exactly four kinds (see
//! [`ErrorKind`]). The HTTP-facing layer is expected to call [`Error::http_status`] instead
//! of inspecting variants.

// std
use std::num::ParseIntError;
// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;
type JsonPathError = serde_path_to_error::Error<serde_json::Error>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem (client secret, redirect URI, HTTP client).
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The session holds no usable credentials.
	#[error("Session is not authenticated: {reason}.")]
	Unauthenticated {
		/// Why the session was rejected.
		reason: String,
	},
	/// A platform resource the call depends on does not exist.
	#[error("{resource} was not found.")]
	NotFound {
		/// Human-readable resource label.
		resource: String,
	},
	/// The authorization server or the platform API failed the call.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
}
impl Error {
	/// Returns the closed error kind used for status mapping.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Error::Config(_) => ErrorKind::Configuration,
			Error::Unauthenticated { .. } => ErrorKind::Unauthenticated,
			Error::NotFound { .. } => ErrorKind::NotFound,
			Error::Upstream(_) => ErrorKind::Upstream,
		}
	}

	/// HTTP status code the route layer should answer with.
	pub fn http_status(&self) -> u16 {
		self.kind().http_status()
	}

	pub(crate) fn unauthenticated(reason: impl Into<String>) -> Self {
		Self::Unauthenticated { reason: reason.into() }
	}

	pub(crate) fn not_found(resource: impl Into<String>) -> Self {
		Self::NotFound { resource: resource.into() }
	}
}
impl From<crate::store::StoreError> for Error {
	fn from(e: crate::store::StoreError) -> Self {
		UpstreamError::Store(e).into()
	}
}

/// Closed set of error kinds surfaced to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// Missing or malformed local configuration.
	Configuration,
	/// No credentials for the session.
	Unauthenticated,
	/// Missing platform resource.
	NotFound,
	/// Authorization server or platform API failure.
	Upstream,
}
impl ErrorKind {
	/// Maps the kind onto an HTTP status code.
	pub const fn http_status(self) -> u16 {
		match self {
			ErrorKind::Configuration | ErrorKind::Upstream => 500,
			ErrorKind::Unauthenticated => 401,
			ErrorKind::NotFound => 404,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ErrorKind::Configuration => "configuration",
			ErrorKind::Unauthenticated => "unauthenticated",
			ErrorKind::NotFound => "not_found",
			ErrorKind::Upstream => "upstream",
		}
	}
}
impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// `GOOGLE_CLIENT_SECRET_JSON` is not set.
	#[error("GOOGLE_CLIENT_SECRET_JSON is not set.")]
	MissingClientSecret,
	/// The client-secret document is not valid JSON or misses required fields.
	#[error("GOOGLE_CLIENT_SECRET_JSON is invalid (not a valid client secret document).")]
	MalformedClientSecret {
		/// Parsing failure with the offending field path.
		#[source]
		source: JsonPathError,
	},
	/// The client-secret document holds neither a `web` nor an `installed` entry.
	#[error("Client secrets must be for a web or installed app.")]
	UnsupportedClientType,
	/// `REDIRECT_URI` is not set.
	#[error("REDIRECT_URI is not set.")]
	MissingRedirectUri,
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// OAuth endpoint rejected by the `oauth2` URL wrappers.
	#[error("The {endpoint} endpoint is invalid.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// OAuth endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// API base URL cannot carry path segments.
	#[error("API base URL cannot be used as a base: {url}.")]
	InvalidApiBase {
		/// Offending URL.
		url: String,
	},
	/// `PORT` is not a valid port number.
	#[error("PORT must be a valid port number, got `{value}`.")]
	InvalidPort {
		/// Raw environment value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: ParseIntError,
	},
	/// Configured scopes cannot be normalized.
	#[error("Configured scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures reported by the authorization server, the platform API, or the transport.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// Token endpoint rejected the exchange or answered unexpectedly.
	#[error("Token exchange failed: {message}.")]
	TokenEndpoint {
		/// Provider- or adapter-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint responded with malformed JSON.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: JsonPathError,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Platform API answered with a non-success status.
	#[error("Platform API call `{resource}` failed with status {status}: {message}.")]
	Api {
		/// API resource that was called.
		resource: &'static str,
		/// HTTP status code.
		status: u16,
		/// Message extracted from the error envelope, or the raw body.
		message: String,
	},
	/// Platform API responded with a body that does not match the expected shape.
	#[error("Platform API call `{resource}` returned an unexpected payload.")]
	ApiResponseParse {
		/// API resource that was called.
		resource: &'static str,
		/// Structured parsing failure.
		#[source]
		source: JsonPathError,
	},
	/// A publish timestamp does not follow `YYYY-MM-DDTHH:MM:SSZ`.
	#[error("Publish timestamp `{value}` is malformed.")]
	InvalidTimestamp {
		/// Raw timestamp value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: time::error::Parse,
	},
	/// A statistics counter is not a decimal integer.
	#[error("Statistic `{field}` is not an integer: `{value}`.")]
	InvalidStatistic {
		/// Statistic name.
		field: &'static str,
		/// Raw counter value.
		value: String,
	},
	/// Network failure while calling an upstream endpoint.
	#[error("Network error occurred while calling {target}.")]
	Network {
		/// Endpoint label.
		target: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
	/// Credential store backend failure.
	#[error("{0}")]
	Store(#[source] crate::store::StoreError),
}
impl UpstreamError {
	/// Wraps a transport-specific network error.
	pub fn network(
		target: &'static str,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { target, source: Box::new(src) }
	}

	/// HTTP status code attached to the failure, when one was observed.
	pub fn status(&self) -> Option<u16> {
		match self {
			UpstreamError::TokenEndpoint { status, .. }
			| UpstreamError::TokenResponseParse { status, .. } => *status,
			UpstreamError::Api { status, .. } => Some(*status),
			_ => None,
		}
	}
}

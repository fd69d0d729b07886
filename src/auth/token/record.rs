//! Credential bundle stored per session and its builder.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, token::secret::TokenSecret},
};

/// Errors produced by [`CredentialsBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CredentialsBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when the access token is an empty string.
	#[error("Access token cannot be empty.")]
	EmptyAccessToken,
}

/// Access/refresh token pair plus the metadata granted by the authorization server.
///
/// Records are replaced wholesale on every successful callback; nothing refreshes them.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
	/// Access token sent as a bearer credential.
	pub access_token: TokenSecret,
	/// Refresh token, present when offline access was granted.
	pub refresh_token: Option<TokenSecret>,
	/// Scopes granted for this bundle.
	pub scope: ScopeSet,
	/// Instant the bundle was received.
	#[serde(with = "time::serde::rfc3339")]
	pub issued_at: OffsetDateTime,
	/// Expiry reported by the token endpoint, if any.
	#[serde(with = "time::serde::rfc3339::option")]
	pub expires_at: Option<OffsetDateTime>,
}
impl Credentials {
	/// Returns a builder for the provided scope set.
	pub fn builder(scope: ScopeSet) -> CredentialsBuilder {
		CredentialsBuilder::new(scope)
	}

	/// Returns `true` when the reported expiry has passed at `instant`.
	///
	/// Bundles without an expiry never report as expired.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("scope", &self.scope)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Builder for [`Credentials`].
#[derive(Clone, Debug)]
pub struct CredentialsBuilder {
	scope: ScopeSet,
	access_token: Option<TokenSecret>,
	refresh_token: Option<TokenSecret>,
	issued_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl CredentialsBuilder {
	fn new(scope: ScopeSet) -> Self {
		Self {
			scope,
			access_token: None,
			refresh_token: None,
			issued_at: None,
			expires_in: None,
		}
	}

	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets the issued-at instant (defaults to now).
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets a relative expiry measured from the issued-at instant.
	pub fn expires_in(mut self, ttl: Duration) -> Self {
		self.expires_in = Some(ttl);

		self
	}

	/// Consumes the builder and produces [`Credentials`].
	pub fn build(self) -> Result<Credentials, CredentialsBuilderError> {
		let access_token = self.access_token.ok_or(CredentialsBuilderError::MissingAccessToken)?;

		if access_token.expose().is_empty() {
			return Err(CredentialsBuilderError::EmptyAccessToken);
		}

		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = self.expires_in.and_then(|ttl| issued_at.checked_add(ttl));

		Ok(Credentials {
			access_token,
			refresh_token: self.refresh_token,
			scope: self.scope,
			issued_at,
			expires_at,
		})
	}
}

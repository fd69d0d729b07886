//! Pending Google sign-in for one browser session.
//!
//! A sign-in is issued with the consent URL and consumed by the redirect callback. It carries
//! the CSRF `state`, the PKCE S256 verifier, and the instant it was issued so abandoned
//! sign-ins can be expired.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, SessionId},
};

/// PKCE challenge method sent on every consent URL.
pub const CODE_CHALLENGE_METHOD: &str = "S256";

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;

/// Sign-in issued by the login URL and waiting for the redirect.
#[derive(Clone)]
pub struct AuthorizationSession {
	/// Session the sign-in belongs to.
	pub session: SessionId,
	/// Scopes requested on the consent screen.
	pub scope: ScopeSet,
	/// CSRF value Google echoes back on the redirect.
	pub state: String,
	/// Consent URL the user is sent to.
	pub authorize_url: Url,
	/// Instant the consent URL was issued.
	pub issued_at: OffsetDateTime,
	verifier: String,
	challenge: String,
}
impl AuthorizationSession {
	pub(crate) fn issue(
		authorization_endpoint: &Url,
		client_id: &str,
		redirect_uri: &Url,
		session: SessionId,
		scope: ScopeSet,
	) -> Self {
		let state = random_token(STATE_LEN);
		let verifier = random_token(PKCE_VERIFIER_LEN);
		let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
		let scope_param = scope.normalized();
		let mut authorize_url = authorization_endpoint.clone();

		authorize_url.query_pairs_mut().extend_pairs([
			("response_type", "code"),
			("client_id", client_id),
			("redirect_uri", redirect_uri.as_str()),
			("scope", scope_param.as_str()),
			("state", state.as_str()),
			("code_challenge", challenge.as_str()),
			("code_challenge_method", CODE_CHALLENGE_METHOD),
			// Offline access yields a refresh token; previously granted scopes are kept.
			("access_type", "offline"),
			("include_granted_scopes", "true"),
		]);

		Self {
			session,
			scope,
			state,
			authorize_url,
			issued_at: OffsetDateTime::now_utc(),
			verifier,
			challenge,
		}
	}

	/// PKCE code challenge derived from the secret verifier.
	pub fn code_challenge(&self) -> &str {
		&self.challenge
	}

	/// Whether the sign-in is older than `ttl` at `now`.
	pub fn is_expired_at(&self, now: OffsetDateTime, ttl: Duration) -> bool {
		now - self.issued_at >= ttl
	}

	/// Checks the `state` returned on the redirect; a missing value is rejected.
	pub fn check_state(&self, returned: Option<&str>) -> Result<()> {
		match returned {
			Some(returned) if returned == self.state => Ok(()),
			Some(_) => Err(Error::unauthenticated("authorization state mismatch")),
			None => Err(Error::unauthenticated("authorization state missing")),
		}
	}

	pub(crate) fn pkce_verifier(&self) -> &str {
		&self.verifier
	}
}
impl Debug for AuthorizationSession {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationSession")
			.field("session", &self.session)
			.field("scope", &self.scope)
			.field("state", &self.state)
			.field("authorize_url", &self.authorize_url)
			.field("issued_at", &self.issued_at)
			.field("code_challenge", &self.challenge)
			.finish_non_exhaustive()
	}
}

fn random_token(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn pending() -> AuthorizationSession {
		AuthorizationSession::issue(
			&Url::parse("https://accounts.google.com/o/oauth2/auth")
				.expect("Endpoint fixture should parse."),
			"client-id",
			&Url::parse("https://api.example.com/auth/callback")
				.expect("Redirect fixture should parse."),
			SessionId::new("browser-1").expect("Session fixture should be valid."),
			ScopeSet::new([
				"https://www.googleapis.com/auth/youtube.force-ssl",
				"https://www.googleapis.com/auth/youtube",
			])
			.expect("Scope fixture should be valid."),
		)
	}

	#[test]
	fn consent_url_requests_offline_access() {
		let pending = pending();
		let pairs: HashMap<_, _> = pending.authorize_url.query_pairs().into_owned().collect();

		assert_eq!(pending.authorize_url.path(), "/o/oauth2/auth");
		assert_eq!(pairs.get("response_type"), Some(&"code".into()));
		assert_eq!(pairs.get("client_id"), Some(&"client-id".into()));
		assert_eq!(
			pairs.get("redirect_uri"),
			Some(&"https://api.example.com/auth/callback".into())
		);
		assert_eq!(
			pairs.get("scope"),
			Some(
				&"https://www.googleapis.com/auth/youtube https://www.googleapis.com/auth/youtube.force-ssl"
					.into()
			)
		);
		assert_eq!(pairs.get("access_type"), Some(&"offline".into()));
		assert_eq!(pairs.get("include_granted_scopes"), Some(&"true".into()));
		assert_eq!(pairs.get("state"), Some(&pending.state));
		assert_eq!(pairs.get("code_challenge"), Some(&pending.code_challenge().to_owned()));
		assert_eq!(pairs.get("code_challenge_method"), Some(&CODE_CHALLENGE_METHOD.into()));
	}

	#[test]
	fn challenge_is_the_s256_digest_of_the_verifier() {
		let first = pending();
		let expected = URL_SAFE_NO_PAD.encode(Sha256::digest(first.pkce_verifier().as_bytes()));

		assert_eq!(first.pkce_verifier().len(), PKCE_VERIFIER_LEN);
		assert_eq!(first.code_challenge(), expected);
		assert_ne!(first.state, pending().state);
	}

	#[test]
	fn callbacks_must_echo_the_state() {
		let pending = pending();

		assert_eq!(pending.state.len(), STATE_LEN);
		assert!(pending.check_state(Some(&pending.state.clone())).is_ok());

		for returned in [Some("other"), None] {
			let err = pending.check_state(returned).expect_err("Bad state should fail.");

			assert_eq!(err.http_status(), 401);
		}
	}

	#[test]
	fn sign_ins_expire_after_the_ttl() {
		let pending = pending();
		let ttl = Duration::minutes(10);

		assert!(!pending.is_expired_at(pending.issued_at + Duration::minutes(9), ttl));
		assert!(pending.is_expired_at(pending.issued_at + ttl, ttl));
		assert!(pending.is_expired_at(pending.issued_at, Duration::ZERO));
	}
}

// self
use super::{SessionTurn, YouTubeClient};
use crate::{
	_prelude::*,
	auth::SessionId,
	http::TokenHttpClient,
	oauth::{AuthCodeFacade, AuthorizationSession, TransportErrorMapper},
	obs::{self, Operation, OperationSpan, Outcome},
};

impl<C, M> YouTubeClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the Google consent URL for `session` and remembers the pending sign-in.
	///
	/// A second call for the same session replaces the earlier state and PKCE verifier.
	/// Sign-ins of any session older than the configured TTL are dropped here.
	pub fn get_login_url(&self, session: &SessionId) -> Result<Url> {
		let _guard = OperationSpan::new(Operation::LoginUrl, session).entered();

		obs::record_outcome(Operation::LoginUrl, Outcome::Attempt);

		let result = self.start_sign_in(session);

		match &result {
			Ok(_) => obs::record_outcome(Operation::LoginUrl, Outcome::Success),
			Err(err) => {
				obs::trace_failure(Operation::LoginUrl, err);
				obs::record_outcome(Operation::LoginUrl, Outcome::Failure);
			},
		}

		result
	}

	/// Exchanges `code` for credentials and stores them under `session`.
	///
	/// When a pending sign-in exists it must be unexpired, the returned `state` must match it,
	/// and its PKCE verifier is sent. Callbacks and sign-outs for one session are serialized.
	pub async fn handle_callback(
		&self,
		session: &SessionId,
		code: &str,
		state: Option<&str>,
	) -> Result<bool> {
		obs::observe(Operation::Callback, session, async move {
			let flow = self.create_flow()?;
			let _turn = SessionTurn::acquire(&self.session_locks, session).await;
			let pending = self.pending.lock().remove(session);

			if let Some(pending) = &pending {
				if pending.is_expired_at(OffsetDateTime::now_utc(), self.sign_in_ttl) {
					return Err(Error::unauthenticated("authorization request expired"));
				}

				pending.check_state(state)?;
			}

			let scope = match &pending {
				Some(pending) => pending.scope.clone(),
				None => self.settings.scopes.clone(),
			};
			let verifier = pending.as_ref().map(AuthorizationSession::pkce_verifier);
			let credentials = flow.exchange_code(code, verifier, &scope).await?;

			self.store.save(session, credentials).await?;

			Ok(true)
		})
		.await
	}

	fn start_sign_in(&self, session: &SessionId) -> Result<Url> {
		let flow = self.create_flow()?;
		let pending = flow.start(session.clone(), self.settings.scopes.clone());
		let url = pending.authorize_url.clone();
		let now = OffsetDateTime::now_utc();
		let mut pending_map = self.pending.lock();

		pending_map.retain(|_, issued| !issued.is_expired_at(now, self.sign_in_ttl));
		pending_map.insert(session.clone(), pending);

		Ok(url)
	}

	// Rebuilt per call so configuration problems surface before any network traffic.
	fn create_flow(&self) -> Result<AuthCodeFacade<C, M>> {
		let secret = self.settings.client_secret()?;
		let redirect_uri = self.settings.redirect_uri()?;

		AuthCodeFacade::from_client_secret(
			&secret,
			redirect_uri,
			Arc::clone(&self.http_client),
			Arc::clone(&self.transport_mapper),
		)
	}
}

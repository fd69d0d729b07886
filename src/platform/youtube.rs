//! YouTube implementation of [`Authenticator`] and [`ContentSource`].
//!
//! [`YouTubeClient`] keeps no per-user state of its own beyond pending sign-ins: credentials
//! live in the injected [`CredentialStore`] under the caller's [`SessionId`]. Every content
//! call looks the session up first and fails with [`Error::Unauthenticated`] before any
//! network traffic when nothing is stored.

mod api;
mod auth;
mod content;
mod wire;

pub use api::{DEFAULT_API_BASE, DataApi};

// crates.io
use async_lock::MutexGuardArc;
// self
use crate::{
	_prelude::*,
	auth::{CommentId, MediaId, SessionId},
	config::Settings,
	http::{ReqwestHttpClient, TokenHttpClient},
	oauth::{AuthorizationSession, ReqwestTransportErrorMapper, TransportErrorMapper},
	obs::{self, Operation},
	platform::{Authenticator, Comment, ContentSource, Media, PlatformFuture},
	store::CredentialStore,
};

/// [`YouTubeClient`] specialized for the default reqwest transport.
pub type ReqwestYouTubeClient = YouTubeClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

type PendingMap = Arc<Mutex<HashMap<SessionId, AuthorizationSession>>>;
type SessionLocks = Arc<Mutex<HashMap<SessionId, Arc<AsyncMutex<()>>>>>;

/// Default lifetime of a login URL that has not come back through the callback.
pub const PENDING_SIGN_IN_TTL: Duration = Duration::minutes(10);

/// YouTube adapter bound to one configuration and one credential store.
///
/// The token exchange runs over `C`, while Data API calls go through [`DataApi`].
pub struct YouTubeClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Environment-backed configuration; the client secret is re-read for every flow.
	pub settings: Arc<Settings>,
	/// Session-keyed credential store.
	pub store: Arc<dyn CredentialStore>,
	/// Transport used for token exchanges.
	pub http_client: Arc<C>,
	/// Mapper applied to token-exchange transport failures.
	pub transport_mapper: Arc<M>,
	/// Data API client.
	pub api: DataApi,
	pending: PendingMap,
	sign_in_ttl: Duration,
	session_locks: SessionLocks,
}
impl<C, M> YouTubeClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Assembles a client from explicit parts.
	pub fn with_http_client(
		settings: impl Into<Arc<Settings>>,
		store: Arc<dyn CredentialStore>,
		http_client: impl Into<Arc<C>>,
		transport_mapper: impl Into<Arc<M>>,
		api: DataApi,
	) -> Self {
		Self {
			settings: settings.into(),
			store,
			http_client: http_client.into(),
			transport_mapper: transport_mapper.into(),
			api,
			pending: Default::default(),
			sign_in_ttl: PENDING_SIGN_IN_TTL,
			session_locks: Default::default(),
		}
	}

	/// Overrides how long an issued login URL stays redeemable.
	pub fn with_sign_in_ttl(mut self, ttl: Duration) -> Self {
		self.sign_in_ttl = ttl;

		self
	}

	/// Returns the pending sign-in for `session`, if a login URL was issued and not yet used.
	pub fn pending_authorization(&self, session: &SessionId) -> Option<AuthorizationSession> {
		self.pending.lock().get(session).cloned()
	}

	/// Forgets everything held for `session`.
	///
	/// Waits for an in-flight callback on the same session, so credentials it saves are
	/// dropped too. Returns `true` when stored credentials were dropped.
	pub async fn sign_out(&self, session: &SessionId) -> Result<bool> {
		obs::observe(Operation::SignOut, session, async move {
			let _turn = SessionTurn::acquire(&self.session_locks, session).await;

			self.pending.lock().remove(session);

			let removed = self.store.remove(session).await?;

			Ok(removed.is_some())
		})
		.await
	}
}
impl YouTubeClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Builds a client on a default reqwest transport against the production Data API.
	pub fn new(settings: impl Into<Arc<Settings>>, store: Arc<dyn CredentialStore>) -> Result<Self> {
		let http_client = ReqwestHttpClient::default();
		let api = DataApi::with_default_base(http_client.0.clone())?;

		Ok(Self::with_http_client(settings, store, http_client, ReqwestTransportErrorMapper, api))
	}

	/// Builds a client that shares `client` between the token exchange and a Data API at
	/// `api_base`.
	pub fn with_reqwest_client(
		settings: impl Into<Arc<Settings>>,
		store: Arc<dyn CredentialStore>,
		client: ReqwestClient,
		api_base: Url,
	) -> Result<Self> {
		let api = DataApi::new(client.clone(), api_base)?;

		Ok(Self::with_http_client(
			settings,
			store,
			ReqwestHttpClient::with_client(client),
			ReqwestTransportErrorMapper,
			api,
		))
	}
}
impl<C, M> Debug for YouTubeClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("YouTubeClient")
			.field("settings", &self.settings)
			.field("api_base", &self.api.base().as_str())
			.field("pending_sign_ins", &self.pending.lock().len())
			.field("sign_in_ttl", &self.sign_in_ttl)
			.finish()
	}
}
impl<C, M> Authenticator for YouTubeClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn get_login_url(&self, session: &SessionId) -> Result<Url> {
		Self::get_login_url(self, session)
	}

	fn handle_callback<'a>(
		&'a self,
		session: &'a SessionId,
		code: &'a str,
		state: Option<&'a str>,
	) -> PlatformFuture<'a, bool> {
		Box::pin(Self::handle_callback(self, session, code, state))
	}
}
impl<C, M> ContentSource for YouTubeClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fetch_medias<'a>(&'a self, session: &'a SessionId) -> PlatformFuture<'a, Vec<Media>> {
		Box::pin(Self::fetch_medias(self, session))
	}

	fn fetch_comments<'a>(
		&'a self,
		session: &'a SessionId,
		media_id: &'a MediaId,
	) -> PlatformFuture<'a, Vec<Comment>> {
		Box::pin(Self::fetch_comments(self, session, media_id))
	}

	fn delete_comments<'a>(
		&'a self,
		session: &'a SessionId,
		comment_ids: &'a [CommentId],
	) -> PlatformFuture<'a, bool> {
		Box::pin(Self::delete_comments(self, session, comment_ids))
	}
}

/// Exclusive hold on one session's sign-in state.
///
/// Dropping the turn unlocks the session and removes its lock entry once nobody else is
/// waiting on it.
struct SessionTurn {
	locks: SessionLocks,
	session: SessionId,
	held: Option<MutexGuardArc<()>>,
}
impl SessionTurn {
	async fn acquire(locks: &SessionLocks, session: &SessionId) -> Self {
		let mut turn = Self { locks: Arc::clone(locks), session: session.clone(), held: None };
		let lock = locks.lock().entry(session.clone()).or_default().clone();

		turn.held = Some(lock.lock_arc().await);

		turn
	}
}
impl Drop for SessionTurn {
	fn drop(&mut self) {
		drop(self.held.take());

		let mut locks = self.locks.lock();

		// The map holds one reference; any other is a waiter that still needs the entry.
		if locks.get(&self.session).is_some_and(|lock| Arc::strong_count(lock) == 1) {
			locks.remove(&self.session);
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn session() -> SessionId {
		SessionId::new("browser-1").expect("Session fixture should be valid.")
	}

	#[tokio::test]
	async fn released_turns_leave_no_lock_entry() {
		let locks = SessionLocks::default();
		let turn = SessionTurn::acquire(&locks, &session()).await;

		assert_eq!(locks.lock().len(), 1);

		drop(turn);

		assert!(locks.lock().is_empty());
	}

	#[tokio::test]
	async fn waiting_turns_keep_the_lock_entry() {
		let locks = SessionLocks::default();
		let first = SessionTurn::acquire(&locks, &session()).await;
		let waiter = tokio::spawn({
			let locks = Arc::clone(&locks);

			async move {
				let _second = SessionTurn::acquire(&locks, &session()).await;
			}
		});

		// Let the waiter park on the session lock.
		tokio::time::sleep(std::time::Duration::from_millis(20)).await;
		drop(first);

		assert_eq!(locks.lock().len(), 1);

		waiter.await.expect("Waiter should not panic.");

		assert!(locks.lock().is_empty());
	}
}

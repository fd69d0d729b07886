//! Thread-safe in-memory [`CredentialStore`] implementation.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, SessionId},
	store::{CredentialStore, StoreFuture},
};

type StoreMap = Arc<RwLock<HashMap<SessionId, Credentials>>>;

/// Process-local store; every session is lost on restart.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Number of sessions currently holding credentials.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns true when no session is signed in.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl CredentialStore for MemoryStore {
	fn save<'a>(&'a self, session: &'a SessionId, credentials: Credentials) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let session = session.to_owned();

		Box::pin(async move {
			map.write().insert(session, credentials);

			Ok(())
		})
	}

	fn fetch<'a>(&'a self, session: &'a SessionId) -> StoreFuture<'a, Option<Credentials>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(session).cloned()) })
	}

	fn remove<'a>(&'a self, session: &'a SessionId) -> StoreFuture<'a, Option<Credentials>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().remove(session)) })
	}
}

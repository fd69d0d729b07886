//! Session-keyed credential storage.
//!
//! A store holds at most one [`Credentials`] bundle per [`SessionId`]. Nothing here
//! persists across restarts unless a caller plugs in a backend that does.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{Credentials, SessionId},
};

/// Boxed future returned by [`CredentialStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for signed-in sessions.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the credentials for `session`.
	fn save<'a>(&'a self, session: &'a SessionId, credentials: Credentials) -> StoreFuture<'a, ()>;

	/// Fetches the credentials for `session`, if present.
	fn fetch<'a>(&'a self, session: &'a SessionId) -> StoreFuture<'a, Option<Credentials>>;

	/// Drops the credentials for `session`, returning what was stored.
	fn remove<'a>(&'a self, session: &'a SessionId) -> StoreFuture<'a, Option<Credentials>>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as _;
	// self
	use super::*;

	#[test]
	fn store_error_is_kept_as_source() {
		let store_error = StoreError::Backend { message: "database unreachable".into() };
		let err: Error = store_error.clone().into();
		let source = err.source().expect("Upstream error should expose the store error.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}

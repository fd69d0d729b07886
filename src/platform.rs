//! Capability contracts for a video platform plus the YouTube implementation.
//!
//! [`Authenticator`] covers sign-in and [`ContentSource`] covers reading and moderating
//! content. Both take the caller-owned [`SessionId`] on every call; the adapter never keeps
//! a process-wide "current user".

pub mod model;
pub mod youtube;

pub use model::*;
pub use youtube::*;

// self
use crate::{
	_prelude::*,
	auth::{CommentId, MediaId, SessionId},
};

/// Boxed future returned by the capability traits.
pub type PlatformFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Sign-in half of a platform adapter.
pub trait Authenticator
where
	Self: Send + Sync,
{
	/// Builds the authorization URL the end user must visit.
	fn get_login_url(&self, session: &SessionId) -> Result<Url>;

	/// Exchanges the authorization `code` and stores the credentials for `session`.
	///
	/// `state` is checked against the pending sign-in when both are available.
	fn handle_callback<'a>(
		&'a self,
		session: &'a SessionId,
		code: &'a str,
		state: Option<&'a str>,
	) -> PlatformFuture<'a, bool>;
}

/// Content half of a platform adapter. Every call requires a signed-in session.
pub trait ContentSource
where
	Self: Send + Sync,
{
	/// Lists the session owner's uploads.
	fn fetch_medias<'a>(&'a self, session: &'a SessionId) -> PlatformFuture<'a, Vec<Media>>;

	/// Lists top-level comments of one upload.
	fn fetch_comments<'a>(
		&'a self,
		session: &'a SessionId,
		media_id: &'a MediaId,
	) -> PlatformFuture<'a, Vec<Comment>>;

	/// Rejects the given comments one by one; the first failure stops the batch.
	fn delete_comments<'a>(
		&'a self,
		session: &'a SessionId,
		comment_ids: &'a [CommentId],
	) -> PlatformFuture<'a, bool>;
}

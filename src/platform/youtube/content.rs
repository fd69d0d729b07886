// self
use super::{
	YouTubeClient,
	wire::{Channel, CommentThread, ListResponse, PlaylistItem, Video},
};
use crate::{
	_prelude::*,
	auth::{CommentId, Credentials, MediaId, SessionId, TokenSecret},
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, Operation},
	platform::{Comment, Media},
};

const UPLOADS_PAGE_SIZE: &str = "50";
const COMMENTS_PAGE_SIZE: &str = "200";
const REJECTED: &str = "rejected";

impl<C, M> YouTubeClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Lists the first page of the signed-in channel's uploads, newest first.
	///
	/// Uploads whose video lookup comes back empty (private or deleted) are left out.
	pub async fn fetch_medias(&self, session: &SessionId) -> Result<Vec<Media>> {
		obs::observe(Operation::FetchMedias, session, async move {
			let credentials = self.credentials(session).await?;
			let token = &credentials.access_token;
			let playlist_id = self.uploads_playlist_id(token).await?;
			let uploads: ListResponse<PlaylistItem> = self
				.api
				.get(
					token,
					"playlistItems",
					&[
						("part", "snippet"),
						("playlistId", &playlist_id),
						("maxResults", UPLOADS_PAGE_SIZE),
					],
				)
				.await?;
			let mut medias = Vec::with_capacity(uploads.items.len());

			for item in uploads.items {
				let video_id = item.video_id();
				let videos: ListResponse<Video> = self
					.api
					.get(token, "videos", &[("part", "snippet,statistics"), ("id", video_id.as_str())])
					.await?;

				match videos.items.into_iter().next() {
					Some(video) => medias.push(video.into_media(video_id)?),
					None => obs::trace_skipped_media(video_id.as_str()),
				}
			}

			Ok(medias)
		})
		.await
	}

	/// Lists the first page of top-level comments on `media_id` as plain text.
	pub async fn fetch_comments(
		&self,
		session: &SessionId,
		media_id: &MediaId,
	) -> Result<Vec<Comment>> {
		obs::observe(Operation::FetchComments, session, async move {
			let credentials = self.credentials(session).await?;
			let threads: ListResponse<CommentThread> = self
				.api
				.get(
					&credentials.access_token,
					"commentThreads",
					&[
						("part", "snippet"),
						("videoId", media_id.as_str()),
						("textFormat", "plainText"),
						("maxResults", COMMENTS_PAGE_SIZE),
					],
				)
				.await?;

			Ok(threads.items.into_iter().map(|thread| thread.into_comment(media_id)).collect())
		})
		.await
	}

	/// Rejects each comment in order; the first failure aborts the rest and is returned.
	///
	/// Comments rejected before the failure stay rejected. An empty batch still requires a
	/// signed-in session.
	pub async fn delete_comments(
		&self,
		session: &SessionId,
		comment_ids: &[CommentId],
	) -> Result<bool> {
		obs::observe(Operation::DeleteComments, session, async move {
			let credentials = self.credentials(session).await?;

			for (applied, comment_id) in comment_ids.iter().enumerate() {
				let outcome = self
					.api
					.post(
						&credentials.access_token,
						"comments/setModerationStatus",
						&[("id", comment_id.as_str()), ("moderationStatus", REJECTED)],
					)
					.await;

				if let Err(err) = outcome {
					let skipped = comment_ids.len() - applied - 1;

					obs::trace_moderation_aborted(comment_id.as_str(), applied, skipped);

					return Err(err);
				}
			}

			Ok(true)
		})
		.await
	}

	async fn credentials(&self, session: &SessionId) -> Result<Credentials> {
		let credentials = self
			.store
			.fetch(session)
			.await?
			.ok_or_else(|| Error::unauthenticated("no credentials are stored for this session"))?;

		// No refresh happens here; the API call decides whether the token still works.
		match credentials.expires_at {
			Some(expires_at) if credentials.is_expired_at(OffsetDateTime::now_utc()) =>
				obs::trace_expired_credentials(session, expires_at),
			_ => (),
		}

		Ok(credentials)
	}

	async fn uploads_playlist_id(&self, token: &TokenSecret) -> Result<String> {
		let channels: ListResponse<Channel> =
			self.api.get(token, "channels", &[("part", "contentDetails"), ("mine", "true")]).await?;

		channels
			.items
			.into_iter()
			.next()
			.and_then(Channel::uploads)
			.ok_or_else(|| Error::not_found("Uploads playlist of the signed-in channel"))
	}
}

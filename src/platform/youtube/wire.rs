//! Response shapes of the YouTube Data API v3 and their mapping onto crate models.

// crates.io
use time::{PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description};
// self
use crate::{
	_prelude::*,
	auth::{CommentId, MediaId},
	error::UpstreamError,
	platform::{Comment, Media, MediaFormat},
};

const PUBLISHED_AT_FORMAT: &[BorrowedFormatItem<'static>] =
	format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

/// `*ListResponse` envelope; only the first page is ever read.
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse<T> {
	#[serde(default = "Vec::new")]
	pub(crate) items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Channel {
	content_details: Option<ChannelContentDetails>,
}
impl Channel {
	pub(crate) fn uploads(self) -> Option<String> {
		self.content_details?.related_playlists?.uploads.filter(|id| !id.is_empty())
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
	related_playlists: Option<RelatedPlaylists>,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
	uploads: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistItem {
	snippet: PlaylistItemSnippet,
}
impl PlaylistItem {
	pub(crate) fn video_id(self) -> MediaId {
		self.snippet.resource_id.video_id
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemSnippet {
	resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
	video_id: MediaId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Video {
	snippet: VideoSnippet,
	#[serde(default)]
	statistics: VideoStatistics,
}
impl Video {
	pub(crate) fn into_media(self, id: MediaId) -> Result<Media, UpstreamError> {
		let Video { snippet, statistics } = self;

		Ok(Media {
			id,
			format: MediaFormat::classify(&snippet.description),
			image: snippet.thumbnails.default.url,
			title: snippet.title,
			publish_date: parse_published_at(&snippet.published_at)?,
			view_count: parse_counter("viewCount", statistics.view_count)?,
			comment_count: parse_counter("commentCount", statistics.comment_count)?,
			like_count: parse_counter("likeCount", statistics.like_count)?,
		})
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
	title: String,
	#[serde(default)]
	description: String,
	published_at: String,
	thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
	default: Thumbnail,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
	url: Url,
}

// Counters arrive as decimal strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
	view_count: Option<String>,
	comment_count: Option<String>,
	like_count: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentThread {
	id: CommentId,
	snippet: CommentThreadSnippet,
}
impl CommentThread {
	pub(crate) fn into_comment(self, media_id: &MediaId) -> Comment {
		Comment {
			id: self.id,
			media_id: media_id.clone(),
			text: self.snippet.top_level_comment.snippet.text_display,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadSnippet {
	top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
	snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
	text_display: String,
}

/// Google API error envelope (`{"error": {"code": .., "message": ..}}`).
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
	error: ApiErrorBody,
}
impl ApiErrorEnvelope {
	pub(crate) fn into_message(self) -> String {
		let reason = self.error.errors.into_iter().find_map(|detail| detail.reason);

		match (self.error.message.is_empty(), reason) {
			(false, Some(reason)) => format!("{} ({reason})", self.error.message),
			(false, None) => self.error.message,
			(true, Some(reason)) => reason,
			(true, None) => "no error message".into(),
		}
	}
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
	#[serde(default)]
	message: String,
	#[serde(default)]
	errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
	reason: Option<String>,
}

fn parse_published_at(value: &str) -> Result<OffsetDateTime, UpstreamError> {
	PrimitiveDateTime::parse(value, PUBLISHED_AT_FORMAT)
		.map(PrimitiveDateTime::assume_utc)
		.map_err(|source| UpstreamError::InvalidTimestamp { value: value.to_owned(), source })
}

fn parse_counter(field: &'static str, value: Option<String>) -> Result<u64, UpstreamError> {
	match value {
		None => Ok(0),
		Some(raw) => raw
			.trim()
			.parse()
			.map_err(|_| UpstreamError::InvalidStatistic { field, value: raw.clone() }),
	}
}

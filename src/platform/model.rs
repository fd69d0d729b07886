//! Platform-neutral media and comment models returned to callers.

// self
use crate::{
	_prelude::*,
	auth::{CommentId, MediaId},
};

/// Tag that marks a video as short-form when found in its description.
pub const SHORTS_MARKER: &str = "#shorts";

/// Presentation format of an upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaFormat {
	/// Regular landscape video.
	Regular,
	/// Vertical short-form video.
	Vertical,
}
impl MediaFormat {
	/// Classifies a video by looking for [`SHORTS_MARKER`] in its description, ignoring case.
	pub fn classify(description: &str) -> Self {
		if description.to_lowercase().contains(SHORTS_MARKER) {
			MediaFormat::Vertical
		} else {
			MediaFormat::Regular
		}
	}
}

/// One uploaded video.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
	/// Video identifier.
	pub id: MediaId,
	/// Regular or vertical.
	pub format: MediaFormat,
	/// Default thumbnail URL.
	pub image: Url,
	/// Video title.
	pub title: String,
	/// Publish instant (UTC).
	#[serde(with = "time::serde::rfc3339")]
	pub publish_date: OffsetDateTime,
	/// View counter.
	pub view_count: u64,
	/// Comment counter.
	pub comment_count: u64,
	/// Like counter.
	pub like_count: u64,
}

/// One top-level comment on a media item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
	/// Comment identifier.
	pub id: CommentId,
	/// Owning media identifier.
	pub media_id: MediaId,
	/// Plain-text comment body.
	pub text: String,
}

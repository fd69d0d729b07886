//! Typed identifiers: caller-owned session keys and YouTube resource ids.
//!
//! Session keys are opaque to the adapter and only need to be printable. Video and comment
//! ids are checked against the alphabet YouTube issues them in, so a malformed id never
//! reaches a Data API query string.

// std
use std::{hash::Hash, marker::PhantomData};
// crates.io
use serde::{Deserializer, Serializer, de::Error as _};
// self
use crate::_prelude::*;

/// Validation rule carried by an identifier kind.
#[derive(Clone, Copy, Debug)]
pub struct IdRule {
	/// Label used in error messages and `Debug` output.
	pub kind: &'static str,
	/// Maximum length in characters.
	pub max_len: usize,
	accepts: fn(char) -> bool,
}
impl IdRule {
	fn check(&self, value: &str) -> Result<(), IdentifierError> {
		let kind = self.kind;

		if value.is_empty() {
			return Err(IdentifierError::Empty { kind });
		}
		if let Some(character) = value.chars().find(|c| !(self.accepts)(*c)) {
			return Err(IdentifierError::InvalidCharacter { kind, character });
		}
		if value.chars().count() > self.max_len {
			return Err(IdentifierError::TooLong { kind, max: self.max_len });
		}

		Ok(())
	}
}

/// Marker trait tying an [`Id`] to its validation rule.
pub trait IdKind
where
	Self: 'static + Clone + Copy + Debug + PartialEq + Eq + PartialOrd + Ord + Hash + Send + Sync,
{
	/// Rule every value of this kind must satisfy.
	const RULE: IdRule;
}

/// Browser or user session owned by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Session {}
impl IdKind for Session {
	const RULE: IdRule = IdRule { kind: "Session", max_len: 128, accepts: is_printable };
}

/// Uploaded YouTube video.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Video {}
impl IdKind for Video {
	// Video ids are 11 characters of base64url.
	const RULE: IdRule = IdRule { kind: "Media", max_len: 11, accepts: is_base64url };
}

/// Top-level or reply comment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum YouTubeComment {}
impl IdKind for YouTubeComment {
	// Reply ids are `<parent>.<suffix>`.
	const RULE: IdRule = IdRule { kind: "Comment", max_len: 128, accepts: is_comment_char };
}

/// Validated identifier of kind `K`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id<K>
where
	K: IdKind,
{
	value: String,
	kind: PhantomData<K>,
}
impl<K> Id<K>
where
	K: IdKind,
{
	/// Validates `value` against the kind's rule.
	pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
		let value = value.into();

		K::RULE.check(&value)?;

		Ok(Self { value, kind: PhantomData })
	}

	/// Returns the raw identifier.
	pub fn as_str(&self) -> &str {
		&self.value
	}
}
impl<K> AsRef<str> for Id<K>
where
	K: IdKind,
{
	fn as_ref(&self) -> &str {
		&self.value
	}
}
impl<K> From<Id<K>> for String
where
	K: IdKind,
{
	fn from(id: Id<K>) -> Self {
		id.value
	}
}
impl<K> FromStr for Id<K>
where
	K: IdKind,
{
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl<K> Debug for Id<K>
where
	K: IdKind,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}({})", K::RULE.kind, self.value)
	}
}
impl<K> Display for Id<K>
where
	K: IdKind,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.value)
	}
}
impl<K> Serialize for Id<K>
where
	K: IdKind,
{
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.value)
	}
}
impl<'de, K> Deserialize<'de> for Id<K>
where
	K: IdKind,
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		Self::new(raw).map_err(D::Error::custom)
	}
}

/// Caller-owned key that scopes credentials to one signed-in user.
pub type SessionId = Id<Session>;
/// Platform identifier of an uploaded video.
pub type MediaId = Id<Video>;
/// Platform identifier of a comment.
pub type CommentId = Id<YouTubeComment>;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier.
		kind: &'static str,
	},
	/// The identifier holds a character outside the kind's alphabet.
	#[error("{kind} identifier contains {character:?}.")]
	InvalidCharacter {
		/// Kind of identifier.
		kind: &'static str,
		/// First rejected character.
		character: char,
	},
	/// The identifier exceeded the allowed length.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier.
		kind: &'static str,
		/// Maximum permitted length.
		max: usize,
	},
}

fn is_printable(c: char) -> bool {
	!c.is_whitespace() && !c.is_control()
}

fn is_base64url(c: char) -> bool {
	c.is_ascii_alphanumeric() || matches!(c, '-' | '_')
}

fn is_comment_char(c: char) -> bool {
	is_base64url(c) || c == '.'
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn sessions_accept_any_printable_key() {
		let session = SessionId::new("browser:7f3a/é").expect("Printable keys should be accepted.");

		assert_eq!(session.as_str(), "browser:7f3a/é");
		assert_eq!(format!("{session:?}"), "Session(browser:7f3a/é)");
		assert_eq!(
			SessionId::new("browser 1"),
			Err(IdentifierError::InvalidCharacter { kind: "Session", character: ' ' })
		);
		assert!(SessionId::new("tab\u{7}").is_err());
	}

	#[test]
	fn video_ids_follow_the_youtube_alphabet() {
		MediaId::new("dQw4w9WgXcQ").expect("Canonical video ids should be accepted.");

		assert_eq!(
			MediaId::new("dQw4w9WgXcQ?t=1"),
			Err(IdentifierError::InvalidCharacter { kind: "Media", character: '?' })
		);
		assert_eq!(
			MediaId::new("dQw4w9WgXcQx"),
			Err(IdentifierError::TooLong { kind: "Media", max: 11 })
		);
		assert_eq!(MediaId::new(""), Err(IdentifierError::Empty { kind: "Media" }));
	}

	#[test]
	fn comment_ids_allow_reply_separators() {
		CommentId::new("UgzDE2tasfmrYLyNkGt4AaABAg.8rD1K1NzX3N8rD2rXk5Uq_")
			.expect("Reply ids should be accepted.");

		assert!(CommentId::new("Ugz&id=other").is_err());
	}

	#[test]
	fn deserialization_runs_the_same_checks() {
		let media: MediaId =
			serde_json::from_str("\"dQw4w9WgXcQ\"").expect("Media id should deserialize.");

		assert_eq!(
			serde_json::to_string(&media).expect("Media id should serialize."),
			"\"dQw4w9WgXcQ\""
		);
		assert!(serde_json::from_str::<MediaId>("\"../channels\"").is_err());
		assert!(serde_json::from_str::<CommentId>("\"\"").is_err());
	}
}

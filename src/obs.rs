//! Optional observability helpers for adapter operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (default) to run every operation inside a span named `dehate.platform`
//!   with `operation` and `session` fields, plus events for silently skipped media, expired
//!   credentials, and aborted moderation batches.
//! - Enable `metrics` to increment the `dehate_platform_operation_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, auth::SessionId};

/// Adapter operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Authorization URL generation.
	LoginUrl,
	/// Authorization-code callback.
	Callback,
	/// Upload listing.
	FetchMedias,
	/// Comment listing for one media item.
	FetchComments,
	/// Comment rejection batch.
	DeleteComments,
	/// Session sign-out.
	SignOut,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::LoginUrl => "login_url",
			Operation::Callback => "callback",
			Operation::FetchMedias => "fetch_medias",
			Operation::FetchComments => "fetch_comments",
			Operation::DeleteComments => "delete_comments",
			Operation::SignOut => "sign_out",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to an adapter operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside the operation span and records attempt + outcome counters.
pub(crate) async fn observe<T, F>(operation: Operation, session: &SessionId, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	let span = OperationSpan::new(operation, session);

	record_outcome(operation, Outcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_outcome(operation, Outcome::Success),
		Err(err) => {
			trace_failure(operation, err);
			record_outcome(operation, Outcome::Failure);
		},
	}

	result
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn observe_passes_results_through() {
		let session = SessionId::new("browser-1").expect("Session fixture should be valid.");
		let ok = observe(Operation::FetchMedias, &session, async { Ok(7) }).await;

		assert_eq!(ok.ok(), Some(7));

		let err = observe(Operation::DeleteComments, &session, async {
			Err::<(), _>(Error::unauthenticated("no credentials"))
		})
		.await
		.expect_err("Failures must propagate unchanged.");

		assert_eq!(err.http_status(), 401);
	}
}

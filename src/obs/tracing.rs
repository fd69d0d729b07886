// self
use crate::{_prelude::*, auth::SessionId, obs::Operation};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// Span wrapper used by adapter operations.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the operation and session.
	pub fn new(operation: Operation, session: &SessionId) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"dehate.platform",
				operation = operation.as_str(),
				session = %session
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (operation, session);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> OperationSpanGuard {
		#[cfg(feature = "tracing")]
		{
			OperationSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			OperationSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// RAII guard returned by [`OperationSpan::entered`].
pub struct OperationSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for OperationSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("OperationSpanGuard(..)")
	}
}

pub(crate) fn trace_failure(operation: Operation, err: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(
		operation = operation.as_str(),
		kind = %err.kind(),
		error = %err,
		"operation failed"
	);
	#[cfg(not(feature = "tracing"))]
	let _ = (operation, err);
}

pub(crate) fn trace_skipped_media(video_id: &str) {
	#[cfg(feature = "tracing")]
	tracing::debug!(video_id, "video lookup returned no item; skipping");
	#[cfg(not(feature = "tracing"))]
	let _ = video_id;
}

pub(crate) fn trace_expired_credentials(session: &SessionId, expires_at: OffsetDateTime) {
	#[cfg(feature = "tracing")]
	tracing::warn!(session = %session, %expires_at, "credentials are past their reported expiry");
	#[cfg(not(feature = "tracing"))]
	let _ = (session, expires_at);
}

pub(crate) fn trace_moderation_aborted(comment_id: &str, applied: usize, skipped: usize) {
	#[cfg(feature = "tracing")]
	tracing::warn!(comment_id, applied, skipped, "comment moderation aborted");
	#[cfg(not(feature = "tracing"))]
	let _ = (comment_id, applied, skipped);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn span_guard_exists_with_or_without_tracing() {
		let session = SessionId::new("browser-1").expect("Session fixture should be valid.");
		let _guard = OperationSpan::new(Operation::LoginUrl, &session).entered();
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let session = SessionId::new("browser-2").expect("Session fixture should be valid.");
		let span = OperationSpan::new(Operation::FetchComments, &session);

		assert_eq!(span.instrument(async { 42 }).await, 42);
	}
}

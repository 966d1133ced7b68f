// self
use crate::{_prelude::*, obs::FlowStage};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// Span wrapper used by flow entry points.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the stage, the public call, and the session fingerprint.
	pub fn new(stage: FlowStage, call: &'static str, session: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"oauth2_codeflow.flow",
				stage = stage.as_str(),
				call,
				session
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, call, session);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> FlowSpanGuard {
		#[cfg(feature = "tracing")]
		{
			FlowSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			FlowSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
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

/// RAII guard returned by [`FlowSpan::entered`].
pub struct FlowSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for FlowSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FlowSpanGuard(..)")
	}
}

/// Emits a warning event for callbacks whose state did not match the session.
pub fn warn_state_mismatch(session: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(session, "callback state does not match the authorization request");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = session;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn span_guard_exists_with_or_without_tracing() {
		let _guard = FlowSpan::new(FlowStage::Start, "test", "fp").entered();
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::new(FlowStage::Exchange, "instrument_wraps_future", "fp");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}

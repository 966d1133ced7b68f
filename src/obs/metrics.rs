// self
use crate::obs::FlowStage;

/// Records a stage outcome through the enabled recorders.
///
/// `outcome` must be a fixed label such as those returned by
/// [`AuthorizationOutcome::label`](crate::flows::AuthorizationOutcome::label).
pub fn record_outcome(stage: FlowStage, outcome: &'static str) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_codeflow_outcome_total",
			"stage" => stage.as_str(),
			"outcome" => outcome
		)
		.increment(1);
	}
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(stage = stage.as_str(), outcome, "flow outcome recorded");
	}
	#[cfg(not(any(feature = "metrics", feature = "tracing")))]
	{
		let _ = (stage, outcome);
	}
}

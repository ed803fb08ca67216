use std::time::Duration;

use thiserror::Error;

/// The stable error taxonomy for the blueprint-to-span compiler.
///
/// Every stage of the pipeline (interpreter, span builder, orchestrator)
/// surfaces one of these variants; nothing is retried or recovered locally,
/// and a failure at any stage aborts the whole compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TraceSimError {
	// --- Domain-value errors -------------------------------------------
	#[error("absolute duration cannot be negative, got {seconds}s")]
	NegativeAbsoluteDuration { seconds: f64 },

	#[error("relative duration fraction cannot be negative, got {fraction}")]
	NegativeRelativeFraction { fraction: f64 },

	#[error("duration base must be positive to resolve a relative expression")]
	NonPositiveBase,

	#[error("relative duration expression requires a parent context to resolve")]
	MissingParentContext,

	#[error("external id `{id}` does not match the required pattern ^[A-Za-z0-9_-]+$")]
	InvalidExternalIdPattern { id: String },

	// --- Graph-shape errors ----------------------------------------------
	/// Unreachable through the safe `TaskNode::add_child` API, which takes
	/// its argument by value rather than by `Option`, kept for taxonomy
	/// completeness, see DESIGN.md.
	#[error("cannot add a nil child")]
	NilChild,

	#[error("cannot add `{name}` as its own child")]
	SelfAsChild { name: String },

	#[error("child `{name}` already has a parent")]
	AlreadyParented { name: String },

	#[error("adding `{child}` as a child of `{parent}` would create a cycle")]
	CycleDetected { parent: String, child: String },

	#[error("parent task `{external_id}` referenced by childOf was not found")]
	ParentNotFound { external_id: String },

	#[error("duplicate external id detected: {id}")]
	DuplicateExternalId { id: String },

	#[error("linked span with external id `{id}` not found in forest")]
	MissingLinkTarget { id: String },

	// --- Algebra errors ----------------------------------------------------
	#[error("condition result is a vector and must be wrapped with an aggregator")]
	NeedsAggregator,

	#[error("unsupported condition kind: {kind}")]
	UnsupportedCondition { kind: String },

	#[error("unsupported effect kind: {kind}")]
	UnsupportedEffect { kind: String },

	// --- Timing errors -----------------------------------------------------
	#[error("event `{name}` delay {delay:?} exceeds task duration {duration:?}")]
	EventOutOfRange {
		name: String,
		delay: Duration,
		duration: Duration,
	},

	#[error("invalid event delay for `{name}`: {reason}")]
	InvalidEventDelay { name: String, reason: String },
}

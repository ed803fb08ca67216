//! Drives the pipeline end-to-end: interpret the blueprint, build every
//! trace root, link spans across traces, shift timestamps so the forest
//! ends at the caller's deadline, then hand the result to an adapter.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::blueprint::Blueprint;
use crate::error::TraceSimError;
use crate::span::{self, SpanNode, SpanRef, TraceId};

/// Consumes a span forest and transforms it into a concrete output format.
/// The core places no requirement on `T` beyond what the adapter itself
/// needs, and retains no span nodes after `transform` returns.
pub trait Adapter<T> {
	fn transform(&self, roots: &[SpanNode]) -> Result<T, TraceSimError>;
}

/// An adapter that performs no transformation, returning the forest
/// unchanged. Used for tests or as a placeholder.
pub struct NoOpAdapter;

impl Adapter<Vec<SpanNode>> for NoOpAdapter {
	fn transform(&self, roots: &[SpanNode]) -> Result<Vec<SpanNode>, TraceSimError> {
		Ok(roots.to_vec())
	}
}

/// Simulates traces from a blueprint and exports them via an adapter.
///
/// `run` is single-threaded, synchronous, and deterministic given a fixed
/// blueprint, a fixed randomness stream, a fixed id generator, and a fixed
/// deadline: randomness and identifier generation are injected rather than
/// read from a global source, so the whole call has no hidden inputs.
pub struct Simulator<A> {
	adapter: A,
}

impl<A> Simulator<A> {
	pub fn new(adapter: A) -> Self {
		Simulator { adapter }
	}

	pub fn run<T>(
		&self,
		blueprint: &dyn Blueprint,
		deadline: DateTime<Utc>,
		randomness: &mut dyn FnMut() -> f64,
		span_ids: &mut dyn FnMut() -> [u8; 8],
		trace_ids: &mut dyn FnMut() -> [u8; 16],
	) -> Result<T, TraceSimError>
	where
		A: Adapter<T>,
	{
		let trace_root_task_nodes = blueprint.interpret()?;

		let mut root_spans = Vec::with_capacity(trace_root_task_nodes.len());
		let mut external_id_index: HashMap<_, SpanRef> = HashMap::new();
		for task_tree in &trace_root_task_nodes {
			let trace_id = TraceId::new(trace_ids());
			// baseStartTime is the deadline, temporarily, corrected below
			// once the latest end time across the whole forest is known.
			let root_span = span::from_task_tree(task_tree, trace_id, deadline, span_ids, randomness)?;
			span::collect_external_ids(&root_span, &mut external_id_index)?;
			root_spans.push(root_span);
		}

		// Links must be resolved before the global shift, so link identity
		// is unaffected by retiming.
		for root_span in &mut root_spans {
			span::link_spans(root_span, &external_id_index)?;
		}

		let latest_end_time = root_spans
			.iter()
			.map(span::latest_end_time)
			.fold(deadline, |latest, candidate| latest.max(candidate));
		let delta = deadline - latest_end_time;
		for root_span in &mut root_spans {
			span::shift_timestamps(root_span, delta);
		}

		self.adapter.transform(&root_spans)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::blueprint::{ServiceBlueprint, ServiceSpec, TaskSpec};
	use crate::duration::{Delay, DurationExpr, TaskDuration};
	use crate::kind::Kind;
	use std::collections::BTreeMap;
	use std::time::Duration as StdDuration;

	fn absolute_task(name: &str, seconds: u64) -> TaskSpec {
		TaskSpec {
			name: name.to_string(),
			external_id: None,
			delay: Delay::new(DurationExpr::absolute(StdDuration::ZERO)),
			duration: TaskDuration::new(DurationExpr::absolute(StdDuration::from_secs(seconds))),
			kind: Kind::Internal,
			attributes: BTreeMap::new(),
			events: Vec::new(),
			children: Vec::new(),
			child_of: None,
			linked_to: Vec::new(),
			conditional_rules: Vec::new(),
		}
	}

	fn deterministic_ids() -> (impl FnMut() -> [u8; 8], impl FnMut() -> [u8; 16]) {
		let mut span_counter = 0u64;
		let span_ids = move || {
			span_counter += 1;
			let mut bytes = [0u8; 8];
			bytes[..8].copy_from_slice(&span_counter.to_be_bytes());
			bytes
		};
		let mut trace_counter = 0u64;
		let trace_ids = move || {
			trace_counter += 1;
			let mut bytes = [0u8; 16];
			bytes[8..].copy_from_slice(&trace_counter.to_be_bytes());
			bytes
		};
		(span_ids, trace_ids)
	}

	#[test]
	fn minimal_single_trace_ends_at_deadline() {
		let blueprint = ServiceBlueprint::new(vec![ServiceSpec {
			name: "svc".to_string(),
			resource: BTreeMap::new(),
			tasks: vec![absolute_task("t", 1)],
		}]);
		let simulator = Simulator::new(NoOpAdapter);
		let deadline = Utc::now();
		let (mut span_ids, mut trace_ids) = deterministic_ids();
		let forest = simulator
			.run(&blueprint, deadline, &mut || 0.0, &mut span_ids, &mut trace_ids)
			.unwrap();
		assert_eq!(forest.len(), 1);
		let root = &forest[0];
		assert_eq!(root.end_time, deadline);
		assert_eq!(root.end_time - root.start_time, chrono::Duration::seconds(1));
	}

	#[test]
	fn global_shift_aligns_latest_end_time_to_deadline() {
		let mut deep = absolute_task("child", 4);
		let mut root_task = absolute_task("root", 1);
		deep.children = vec![];
		root_task.children = vec![deep];
		let blueprint = ServiceBlueprint::new(vec![ServiceSpec {
			name: "svc".to_string(),
			resource: BTreeMap::new(),
			tasks: vec![root_task],
		}]);
		let simulator = Simulator::new(NoOpAdapter);
		let deadline = Utc::now();
		let (mut span_ids, mut trace_ids) = deterministic_ids();
		let forest = simulator
			.run(&blueprint, deadline, &mut || 0.0, &mut span_ids, &mut trace_ids)
			.unwrap();
		let root = &forest[0];
		assert_eq!(root.children[0].end_time, deadline);
	}
}

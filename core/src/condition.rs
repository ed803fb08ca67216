//! The condition half of the condition/effect algebra. Conditions evaluate
//! against a built span node and yield an [`EvaluationResult`] that is
//! either a single boolean (terminal) or a vector awaiting aggregation.

use crate::error::TraceSimError;
use crate::span::SpanNode;

/// The result of evaluating a condition.
///
/// `Probabilistic`, `HasAttribute`, and `MarkedAsFailed` always produce a
/// singleton (`must_aggregate = false`). `Child` produces a vector that must
/// be collapsed by an aggregator such as `AtLeast` before its satisfaction
/// can be read; this is the invariant that keeps the algebra composable
/// without making every condition accidentally terminal.
#[derive(Debug, Clone)]
pub struct EvaluationResult {
	evaluations: Vec<bool>,
	must_aggregate: bool,
}

impl EvaluationResult {
	fn singleton(value: bool) -> Self {
		EvaluationResult {
			evaluations: vec![value],
			must_aggregate: false,
		}
	}

	fn vector(evaluations: Vec<bool>) -> Self {
		EvaluationResult {
			evaluations,
			must_aggregate: true,
		}
	}

	/// The raw booleans produced by this evaluation.
	pub fn results(&self) -> &[bool] {
		&self.evaluations
	}

	/// Collapses the result to a single boolean, failing with
	/// `NeedsAggregator` if this result is a vector awaiting aggregation.
	pub fn is_satisfied(&self) -> Result<bool, TraceSimError> {
		if self.must_aggregate {
			return Err(TraceSimError::NeedsAggregator);
		}
		Ok(self.evaluations[0])
	}
}

/// A condition in the algebra. Represented as a closed enum rather than a
/// trait object: the algebra is deliberately finite, and additions are
/// schema changes rather than extension points.
#[derive(Debug, Clone)]
pub enum Condition {
	/// Draws one number from the injected randomness stream; satisfied iff
	/// the draw is `< threshold`.
	Probabilistic { threshold: f64 },
	/// Satisfied iff the evaluated node's attribute map contains `key`.
	HasAttribute { key: String },
	/// Satisfied iff the evaluated node's status is `error`.
	MarkedAsFailed,
	/// Evaluates `inner` against each direct child, concatenating their
	/// results. Always produces a vector.
	Child(Box<Condition>),
	/// Evaluates `inner` once and counts the `true`s in the resulting
	/// vector; satisfied iff the count is `>= threshold`. Collapses its
	/// inner result, so it always produces a singleton.
	AtLeast { threshold: usize, inner: Box<Condition> },
}

impl Condition {
	pub fn evaluate(
		&self,
		node: &SpanNode,
		randomness: &mut dyn FnMut() -> f64,
	) -> Result<EvaluationResult, TraceSimError> {
		match self {
			Condition::Probabilistic { threshold } => {
				Ok(EvaluationResult::singleton(randomness() < *threshold))
			}
			Condition::HasAttribute { key } => {
				Ok(EvaluationResult::singleton(node.attributes.contains_key(key)))
			}
			Condition::MarkedAsFailed => Ok(EvaluationResult::singleton(node.status.is_error())),
			Condition::Child(inner) => {
				let mut results = Vec::new();
				for child in &node.children {
					let child_result = inner.evaluate(child, randomness)?;
					results.extend_from_slice(child_result.results());
				}
				Ok(EvaluationResult::vector(results))
			}
			Condition::AtLeast { threshold, inner } => {
				let inner_result = inner.evaluate(node, randomness)?;
				let count = inner_result.results().iter().filter(|satisfied| **satisfied).count();
				Ok(EvaluationResult::singleton(count >= *threshold))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::kind::Kind;
	use crate::resource::Resource;
	use crate::span::{SpanId, Status, TraceId};
	use chrono::Utc;
	use std::collections::BTreeMap;

	fn leaf(attributes: BTreeMap<String, String>) -> SpanNode {
		let now = Utc::now();
		SpanNode {
			id: SpanId::new([0; 8]),
			trace_id: TraceId::new([0; 16]),
			name: "leaf".to_string(),
			is_resource_entry_point: false,
			resource: Resource::new("svc", BTreeMap::new()),
			attributes,
			kind: Kind::Internal,
			start_time: now,
			end_time: now,
			parent_id: None,
			external_id: None,
			children: Vec::new(),
			linked_to: Vec::new(),
			events: Vec::new(),
			linked_to_external_ids: Vec::new(),
			status: Status::ok(),
		}
	}

	#[test]
	fn has_attribute_is_terminal() {
		let mut attrs = BTreeMap::new();
		attrs.insert("flag".to_string(), "ok".to_string());
		let node = leaf(attrs);
		let condition = Condition::HasAttribute { key: "flag".to_string() };
		let result = condition.evaluate(&node, &mut || 0.0).unwrap();
		assert!(result.is_satisfied().unwrap());
	}

	#[test]
	fn child_without_aggregator_needs_aggregator() {
		let mut parent = leaf(BTreeMap::new());
		let mut attrs = BTreeMap::new();
		attrs.insert("flag".to_string(), "ok".to_string());
		parent.children.push(leaf(attrs));
		let condition = Condition::Child(Box::new(Condition::HasAttribute { key: "flag".to_string() }));
		let result = condition.evaluate(&parent, &mut || 0.0).unwrap();
		assert!(matches!(result.is_satisfied(), Err(TraceSimError::NeedsAggregator)));
	}

	#[test]
	fn at_least_aggregates_child_results() {
		let mut parent = leaf(BTreeMap::new());
		for has_flag in [true, true, false] {
			let mut attrs = BTreeMap::new();
			if has_flag {
				attrs.insert("flag".to_string(), "ok".to_string());
			}
			parent.children.push(leaf(attrs));
		}
		let condition = Condition::AtLeast {
			threshold: 2,
			inner: Box::new(Condition::Child(Box::new(Condition::HasAttribute {
				key: "flag".to_string(),
			}))),
		};
		let result = condition.evaluate(&parent, &mut || 0.0).unwrap();
		assert!(result.is_satisfied().unwrap());
	}

	#[test]
	fn at_least_not_satisfied_when_fewer_children_match() {
		let mut parent = leaf(BTreeMap::new());
		let mut attrs = BTreeMap::new();
		attrs.insert("flag".to_string(), "ok".to_string());
		parent.children.push(leaf(attrs));
		parent.children.push(leaf(BTreeMap::new()));
		let condition = Condition::AtLeast {
			threshold: 2,
			inner: Box::new(Condition::Child(Box::new(Condition::HasAttribute {
				key: "flag".to_string(),
			}))),
		};
		let result = condition.evaluate(&parent, &mut || 0.0).unwrap();
		assert!(!result.is_satisfied().unwrap());
	}

	#[test]
	fn probabilistic_uses_injected_randomness() {
		let node = leaf(BTreeMap::new());
		let condition = Condition::Probabilistic { threshold: 1.0 };
		let result = condition.evaluate(&node, &mut || 0.0).unwrap();
		assert!(result.is_satisfied().unwrap());

		let condition = Condition::Probabilistic { threshold: 0.0 };
		let result = condition.evaluate(&node, &mut || 0.0).unwrap();
		assert!(!result.is_satisfied().unwrap());
	}
}

//! The span tree builder: converts a task tree into a span tree, resolving
//! durations, materializing events, and evaluating conditional rules.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration as ChronoDuration, Utc};

use crate::error::TraceSimError;
use crate::external_id::ExternalId;
use crate::kind::Kind;
use crate::resource::Resource;
use crate::task::TaskNode;

/// An 8-byte span identifier with a canonical lowercase hex rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanId([u8; 8]);

impl SpanId {
	pub fn new(bytes: [u8; 8]) -> Self {
		SpanId(bytes)
	}

	pub fn to_hex(&self) -> String {
		hex::encode(self.0)
	}

	pub fn bytes(&self) -> [u8; 8] {
		self.0
	}
}

impl serde::Serialize for SpanId {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.to_hex())
	}
}

/// A 16-byte trace identifier with a canonical lowercase hex rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId([u8; 16]);

impl TraceId {
	pub fn new(bytes: [u8; 16]) -> Self {
		TraceId(bytes)
	}

	pub fn to_hex(&self) -> String {
		hex::encode(self.0)
	}

	pub fn bytes(&self) -> [u8; 16] {
		self.0
	}
}

impl serde::Serialize for TraceId {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.to_hex())
	}
}

/// A non-owning reference to another span, used for cross-tree links.
/// Rust's ownership rules make a direct self-referential pointer between
/// owned tree nodes impractical; identity by (trace id, span id) is
/// sufficient to guarantee every `linkedTo` target points at a real span
/// node, without fighting the borrow checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpanRef {
	pub span_id: SpanId,
	pub trace_id: TraceId,
}

/// The status of a span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "lowercase")]
pub enum Status {
	Unset,
	Ok,
	Error { message: Option<String> },
}

impl Status {
	pub fn unset() -> Self {
		Status::Unset
	}

	pub fn ok() -> Self {
		Status::Ok
	}

	pub fn error(message: Option<String>) -> Self {
		Status::Error { message }
	}

	pub fn is_error(&self) -> bool {
		matches!(self, Status::Error { .. })
	}
}

/// An event that occurred on a span.
#[derive(Debug, Clone, Serialize)]
pub struct SpanEvent {
	pub name: String,
	pub occurred_at: DateTime<Utc>,
	pub attributes: BTreeMap<String, String>,
}

impl SpanEvent {
	pub fn new(name: impl Into<String>, occurred_at: DateTime<Utc>, attributes: BTreeMap<String, String>) -> Self {
		SpanEvent {
			name: name.into(),
			occurred_at,
			attributes,
		}
	}

	fn shift(&mut self, delta: ChronoDuration) {
		self.occurred_at += delta;
	}
}

/// A node in the span tree, the output of the blueprint-to-span compiler.
#[derive(Debug, Clone, Serialize)]
pub struct SpanNode {
	pub id: SpanId,
	pub trace_id: TraceId,
	pub name: String,
	pub is_resource_entry_point: bool,
	pub resource: Resource,
	pub attributes: BTreeMap<String, String>,
	pub kind: Kind,
	pub start_time: DateTime<Utc>,
	pub end_time: DateTime<Utc>,
	pub parent_id: Option<SpanId>,
	pub external_id: Option<ExternalId>,
	pub children: Vec<SpanNode>,
	pub linked_to: Vec<SpanRef>,
	pub events: Vec<SpanEvent>,
	pub linked_to_external_ids: Vec<ExternalId>,
	pub status: Status,
}

/// Converts a task tree into a span tree rooted at `trace_id`.
pub fn from_task_tree(
	task_tree: &TaskNode,
	trace_id: TraceId,
	base_start_time: DateTime<Utc>,
	span_ids: &mut dyn FnMut() -> [u8; 8],
	randomness: &mut dyn FnMut() -> f64,
) -> Result<SpanNode, TraceSimError> {
	let root = from_task_node(task_tree, trace_id, None, None, base_start_time, span_ids, randomness)?;
	validate_unique_external_ids(&root, &mut HashSet::new())?;
	Ok(root)
}

fn from_task_node(
	task_node: &TaskNode,
	trace_id: TraceId,
	parent_id: Option<SpanId>,
	parent_duration: Option<std::time::Duration>,
	base_start_time: DateTime<Utc>,
	span_ids: &mut dyn FnMut() -> [u8; 8],
	randomness: &mut dyn FnMut() -> f64,
) -> Result<SpanNode, TraceSimError> {
	let span_id = SpanId::new(span_ids());
	let definition = task_node.definition();

	let delay = definition.delay.resolve(parent_duration)?;
	let duration = definition.duration.resolve(parent_duration)?;
	let start_time = base_start_time + ChronoDuration::from_std(delay).unwrap();
	let end_time = start_time + ChronoDuration::from_std(duration).unwrap();

	let mut events = Vec::with_capacity(definition.events.len());
	for declared in &definition.events {
		let event_delay = declared.delay.resolve(Some(duration))?;
		if event_delay > duration {
			return Err(TraceSimError::EventOutOfRange {
				name: declared.name.clone(),
				delay: event_delay,
				duration,
			});
		}
		events.push(SpanEvent::new(
			declared.name.clone(),
			start_time + ChronoDuration::from_std(event_delay).unwrap(),
			declared.attributes.clone(),
		));
	}

	let mut node = SpanNode {
		id: span_id,
		trace_id,
		name: definition.name.clone(),
		is_resource_entry_point: definition.is_resource_entry_point,
		resource: definition.resource.clone(),
		attributes: definition.attributes.clone(),
		kind: definition.kind,
		start_time,
		end_time,
		parent_id,
		external_id: definition.external_id.clone(),
		children: Vec::new(),
		linked_to: Vec::new(),
		events,
		linked_to_external_ids: definition.linked_to.clone(),
		status: Status::ok(),
	};

	let conditional_rules = definition.conditional_rules.clone();
	drop(definition);

	for child_task in task_node.children() {
		let child_span = from_task_node(
			&child_task,
			trace_id,
			Some(span_id),
			Some(duration),
			start_time,
			span_ids,
			randomness,
		)?;
		node.children.push(child_span);
	}

	for rule in &conditional_rules {
		let result = rule.condition.evaluate(&node, randomness)?;
		if result.is_satisfied()? {
			for effect in &rule.effects {
				effect.apply(&mut node)?;
			}
		}
	}

	Ok(node)
}

fn validate_unique_external_ids(
	node: &SpanNode,
	seen: &mut HashSet<ExternalId>,
) -> Result<(), TraceSimError> {
	for child in &node.children {
		validate_unique_external_ids(child, seen)?;
	}
	if let Some(id) = &node.external_id {
		if !seen.insert(id.clone()) {
			return Err(TraceSimError::DuplicateExternalId { id: id.to_string() });
		}
	}
	Ok(())
}

/// Shifts the start/end/event timestamps of this span and all descendants
/// by `delta`.
pub fn shift_timestamps(node: &mut SpanNode, delta: ChronoDuration) {
	node.start_time += delta;
	node.end_time += delta;
	for event in &mut node.events {
		event.shift(delta);
	}
	for child in &mut node.children {
		shift_timestamps(child, delta);
	}
}

/// Returns the latest `end_time` across this span and all descendants.
pub fn latest_end_time(node: &SpanNode) -> DateTime<Utc> {
	node.children
		.iter()
		.map(latest_end_time)
		.fold(node.end_time, |latest, candidate| latest.max(candidate))
}

/// Collects a forest-wide `ExternalId -> SpanRef` index, failing on
/// duplicates.
pub fn collect_external_ids(
	node: &SpanNode,
	index: &mut HashMap<ExternalId, SpanRef>,
) -> Result<(), TraceSimError> {
	if let Some(id) = &node.external_id {
		let span_ref = SpanRef {
			span_id: node.id,
			trace_id: node.trace_id,
		};
		if index.insert(id.clone(), span_ref).is_some() {
			return Err(TraceSimError::DuplicateExternalId { id: id.to_string() });
		}
	}
	for child in &node.children {
		collect_external_ids(child, index)?;
	}
	Ok(())
}

/// Resolves every `linkedTo` external id against the forest-wide index,
/// appending the matching `SpanRef` to `linked_to`.
pub fn link_spans(node: &mut SpanNode, index: &HashMap<ExternalId, SpanRef>) -> Result<(), TraceSimError> {
	for external_id in &node.linked_to_external_ids {
		let target = index
			.get(external_id)
			.ok_or_else(|| TraceSimError::MissingLinkTarget {
				id: external_id.to_string(),
			})?;
		node.linked_to.push(*target);
	}
	for child in &mut node.children {
		link_spans(child, index)?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn span_id_hex_is_lowercase() {
		let id = SpanId::new([0xAB, 0, 0, 0, 0, 0, 0, 0xFF]);
		assert_eq!(id.to_hex(), "ab000000000000ff");
	}

	#[test]
	fn trace_id_hex_round_trips_bytes() {
		let bytes = [1u8; 16];
		let id = TraceId::new(bytes);
		assert_eq!(id.bytes(), bytes);
	}
}

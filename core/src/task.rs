//! The declarative intermediate representation: task definitions and the
//! task tree they are organized into.

use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::duration::{Delay, TaskDuration};
use crate::error::TraceSimError;
use crate::external_id::ExternalId;
use crate::kind::Kind;
use crate::resource::Resource;
use crate::rule::ConditionalRule;

/// An event declared on a task, materialized unconditionally when its
/// owning span is built.
#[derive(Debug, Clone)]
pub struct TaskEvent {
	pub name: String,
	pub delay: Delay,
	pub attributes: BTreeMap<String, String>,
}

impl TaskEvent {
	pub fn new(name: impl Into<String>, delay: Delay, attributes: BTreeMap<String, String>) -> Self {
		TaskEvent {
			name: name.into(),
			delay,
			attributes,
		}
	}
}

/// A task definition: everything needed to derive a span node, short of the
/// context (parent duration, base start time) only available once the
/// surrounding tree is being built.
#[derive(Debug, Clone)]
pub struct TaskDefinition {
	pub name: String,
	pub is_resource_entry_point: bool,
	pub resource: Resource,
	pub attributes: BTreeMap<String, String>,
	pub kind: Kind,
	pub external_id: Option<ExternalId>,
	pub delay: Delay,
	pub duration: TaskDuration,
	pub child_of: Option<ExternalId>,
	pub linked_to: Vec<ExternalId>,
	pub events: Vec<TaskEvent>,
	pub conditional_rules: Vec<ConditionalRule>,
}

struct TaskNodeData {
	definition: TaskDefinition,
	parent: Option<Weak<RefCell<TaskNodeData>>>,
	children: Vec<TaskNode>,
}

/// A node in the task tree. Cheap to clone (an `Rc` bump); multiple
/// `TaskNode` values can refer to the same underlying node, which is how
/// the blueprint interpreter keeps an external-id index alongside the
/// owning tree without fighting the borrow checker.
#[derive(Clone)]
pub struct TaskNode(Rc<RefCell<TaskNodeData>>);

impl TaskNode {
	pub fn new(definition: TaskDefinition) -> Self {
		TaskNode(Rc::new(RefCell::new(TaskNodeData {
			definition,
			parent: None,
			children: Vec::new(),
		})))
	}

	pub fn definition(&self) -> Ref<'_, TaskDefinition> {
		Ref::map(self.0.borrow(), |data| &data.definition)
	}

	pub fn parent(&self) -> Option<TaskNode> {
		self.0
			.borrow()
			.parent
			.as_ref()
			.and_then(|weak| weak.upgrade())
			.map(TaskNode)
	}

	pub fn children(&self) -> Vec<TaskNode> {
		self.0.borrow().children.clone()
	}

	/// Adds `child` under this node.
	///
	/// Rejects self-parenting, a child that already has a parent, or a
	/// child that already appears on this node's ancestor chain (cycle
	/// prevention by walking up `parent` pointers). `NilChild` from the
	/// spec's taxonomy has no reachable path here since Rust's type system
	/// already makes a null `TaskNode` argument unrepresentable.
	pub fn add_child(&self, child: TaskNode) -> Result<(), TraceSimError> {
		if Rc::ptr_eq(&self.0, &child.0) {
			return Err(TraceSimError::SelfAsChild {
				name: self.definition().name.clone(),
			});
		}
		if child.0.borrow().parent.is_some() {
			return Err(TraceSimError::AlreadyParented {
				name: child.definition().name.clone(),
			});
		}
		if creates_cycle(self, &child) {
			return Err(TraceSimError::CycleDetected {
				parent: self.definition().name.clone(),
				child: child.definition().name.clone(),
			});
		}
		child.0.borrow_mut().parent = Some(Rc::downgrade(&self.0));
		self.0.borrow_mut().children.push(child);
		Ok(())
	}
}

fn creates_cycle(parent: &TaskNode, child: &TaskNode) -> bool {
	let mut current = Some(parent.clone());
	while let Some(node) = current {
		if Rc::ptr_eq(&node.0, &child.0) {
			return true;
		}
		current = node.parent();
	}
	false
}

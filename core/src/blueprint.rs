//! Flattens a service-oriented declarative blueprint into a task forest and
//! resolves `childOf` rewiring across services.

use std::collections::{BTreeMap, HashMap};

use crate::duration::{Delay, TaskDuration};
use crate::error::TraceSimError;
use crate::external_id::ExternalId;
use crate::kind::Kind;
use crate::resource::Resource;
use crate::rule::ConditionalRule;
use crate::task::{TaskDefinition, TaskEvent, TaskNode};

/// Interprets a blueprint into a forest of trace-root task nodes.
pub trait Blueprint {
	fn interpret(&self) -> Result<Vec<TaskNode>, TraceSimError>;
}

/// A task as declared within a service, before it is attached to a
/// resource and converted into a `TaskNode`.
#[derive(Debug, Clone)]
pub struct TaskSpec {
	pub name: String,
	pub external_id: Option<ExternalId>,
	pub delay: Delay,
	pub duration: TaskDuration,
	pub kind: Kind,
	pub attributes: BTreeMap<String, String>,
	pub events: Vec<TaskEvent>,
	pub children: Vec<TaskSpec>,
	pub child_of: Option<ExternalId>,
	pub linked_to: Vec<ExternalId>,
	pub conditional_rules: Vec<ConditionalRule>,
}

impl TaskSpec {
	fn to_node_with_resource(&self, resource: &Resource, is_resource_entry_point: bool) -> Result<TaskNode, TraceSimError> {
		let node = TaskNode::new(TaskDefinition {
			name: self.name.clone(),
			is_resource_entry_point,
			resource: resource.clone(),
			attributes: self.attributes.clone(),
			kind: self.kind,
			external_id: self.external_id.clone(),
			delay: self.delay,
			duration: self.duration,
			child_of: if is_resource_entry_point {
				self.child_of.clone()
			} else {
				None
			},
			linked_to: self.linked_to.clone(),
			events: self.events.clone(),
			conditional_rules: self.conditional_rules.clone(),
		});
		for child_spec in &self.children {
			let child_node = child_spec.to_node_with_resource(resource, false)?;
			node.add_child(child_node)?;
		}
		Ok(node)
	}
}

/// A service: a named resource and the tasks it performs. Only a service's
/// root tasks are resource entry points.
#[derive(Debug, Clone)]
pub struct ServiceSpec {
	pub name: String,
	pub resource: BTreeMap<String, String>,
	pub tasks: Vec<TaskSpec>,
}

impl ServiceSpec {
	fn to_root_nodes(&self) -> Result<Vec<TaskNode>, TraceSimError> {
		let resource = Resource::new(self.name.clone(), self.resource.clone());
		self.tasks
			.iter()
			.map(|task| task.to_node_with_resource(&resource, true))
			.collect()
	}
}

/// A blueprint built from a list of services, grouped by the resource that
/// performs their tasks.
pub struct ServiceBlueprint {
	services: Vec<ServiceSpec>,
}

impl ServiceBlueprint {
	pub fn new(services: Vec<ServiceSpec>) -> Self {
		ServiceBlueprint { services }
	}
}

impl Blueprint for ServiceBlueprint {
	fn interpret(&self) -> Result<Vec<TaskNode>, TraceSimError> {
		let mut root_task_nodes = Vec::new();
		for service in &self.services {
			root_task_nodes.extend(service.to_root_nodes()?);
		}

		let mut tasks_by_external_id: HashMap<ExternalId, TaskNode> = HashMap::new();
		for root in &root_task_nodes {
			index_by_external_id(root, &mut tasks_by_external_id)?;
		}

		let mut trace_root_task_nodes = Vec::new();
		for root in root_task_nodes {
			let child_of = root.definition().child_of.clone();
			match child_of {
				Some(parent_external_id) => {
					let parent = tasks_by_external_id
						.get(&parent_external_id)
						.ok_or_else(|| TraceSimError::ParentNotFound {
							external_id: parent_external_id.to_string(),
						})?;
					parent.add_child(root)?;
				}
				None => trace_root_task_nodes.push(root),
			}
		}

		Ok(trace_root_task_nodes)
	}
}

fn index_by_external_id(
	node: &TaskNode,
	index: &mut HashMap<ExternalId, TaskNode>,
) -> Result<(), TraceSimError> {
	if let Some(external_id) = node.definition().external_id.clone() {
		if index.insert(external_id.clone(), node.clone()).is_some() {
			return Err(TraceSimError::DuplicateExternalId {
				id: external_id.to_string(),
			});
		}
	}
	for child in node.children() {
		index_by_external_id(&child, index)?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::duration::DurationExpr;
	use std::time::Duration as StdDuration;

	fn task(name: &str, external_id: Option<&str>, child_of: Option<&str>) -> TaskSpec {
		TaskSpec {
			name: name.to_string(),
			external_id: external_id.map(|id| ExternalId::new(id).unwrap()),
			delay: Delay::new(DurationExpr::absolute(StdDuration::ZERO)),
			duration: TaskDuration::new(DurationExpr::absolute(StdDuration::from_secs(1))),
			kind: Kind::Internal,
			attributes: BTreeMap::new(),
			events: Vec::new(),
			children: Vec::new(),
			child_of: child_of.map(|id| ExternalId::new(id).unwrap()),
			linked_to: Vec::new(),
			conditional_rules: Vec::new(),
		}
	}

	#[test]
	fn cross_service_parenting_attaches_under_parent() {
		let blueprint = ServiceBlueprint::new(vec![
			ServiceSpec {
				name: "a".to_string(),
				resource: BTreeMap::new(),
				tasks: vec![task("A1", Some("a1"), None)],
			},
			ServiceSpec {
				name: "b".to_string(),
				resource: BTreeMap::new(),
				tasks: vec![task("B1", Some("b1"), Some("a1"))],
			},
		]);
		let roots = blueprint.interpret().unwrap();
		assert_eq!(roots.len(), 1);
		assert_eq!(roots[0].children().len(), 1);
		assert_eq!(roots[0].children()[0].definition().name, "B1");
	}

	#[test]
	fn missing_parent_is_an_error() {
		let blueprint = ServiceBlueprint::new(vec![ServiceSpec {
			name: "a".to_string(),
			resource: BTreeMap::new(),
			tasks: vec![task("A1", None, Some("nope"))],
		}]);
		assert!(matches!(
			blueprint.interpret(),
			Err(TraceSimError::ParentNotFound { .. })
		));
	}

	#[test]
	fn duplicate_external_id_is_an_error() {
		let blueprint = ServiceBlueprint::new(vec![ServiceSpec {
			name: "a".to_string(),
			resource: BTreeMap::new(),
			tasks: vec![task("A1", Some("dup"), None), task("A2", Some("dup"), None)],
		}]);
		assert!(matches!(
			blueprint.interpret(),
			Err(TraceSimError::DuplicateExternalId { .. })
		));
	}
}

//! The serde-facing blueprint document schema, and its conversion into the
//! validated domain types.
//!
//! Every domain type with an invariant (`ExternalId`'s pattern,
//! `DurationExpr`'s non-negativity) deliberately does not derive
//! `Deserialize` (see their doc comments). A document parsed straight off
//! disk or over the wire is untrusted input, so this module is the single
//! place where raw strings and numbers are turned into validated domain
//! values, via the same constructors any other caller would use.

use std::collections::BTreeMap;

use crate::blueprint::{ServiceSpec, TaskSpec};
use crate::duration::{Delay, DurationExpr, TaskDuration};
use crate::effect::Effect;
use crate::error::TraceSimError;
use crate::external_id::ExternalId;
use crate::kind::Kind;
use crate::rule::ConditionalRule;
use crate::task::TaskEvent;
use crate::condition::Condition;

/// A duration expression as written in a document: either an absolute
/// number of seconds, or a fraction of whatever base it resolves against.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationExprDoc {
	Absolute { seconds: f64 },
	Relative { fraction: f64 },
}

impl DurationExprDoc {
	fn to_domain(&self) -> Result<DurationExpr, TraceSimError> {
		match self {
			DurationExprDoc::Absolute { seconds } => DurationExpr::absolute_seconds(*seconds),
			DurationExprDoc::Relative { fraction } => DurationExpr::relative(*fraction),
		}
	}

	fn to_delay(&self) -> Result<Delay, TraceSimError> {
		Ok(Delay::new(self.to_domain()?))
	}

	fn to_task_duration(&self) -> Result<TaskDuration, TraceSimError> {
		Ok(TaskDuration::new(self.to_domain()?))
	}
}

/// An event as written in a document.
#[derive(Debug, Clone, Deserialize)]
pub struct EventDoc {
	pub name: String,
	pub delay: DurationExprDoc,
	#[serde(default)]
	pub attributes: BTreeMap<String, String>,
}

impl EventDoc {
	fn to_domain(&self) -> Result<TaskEvent, TraceSimError> {
		Ok(TaskEvent::new(self.name.clone(), self.delay.to_delay()?, self.attributes.clone()))
	}
}

/// A condition as written in a document, internally tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionDoc {
	Probabilistic { threshold: f64 },
	HasAttribute { key: String },
	MarkedAsFailed,
	Child { inner: Box<ConditionDoc> },
	AtLeast { threshold: usize, inner: Box<ConditionDoc> },
}

impl ConditionDoc {
	fn to_domain(&self) -> Result<Condition, TraceSimError> {
		Ok(match self {
			ConditionDoc::Probabilistic { threshold } => Condition::Probabilistic { threshold: *threshold },
			ConditionDoc::HasAttribute { key } => Condition::HasAttribute { key: key.clone() },
			ConditionDoc::MarkedAsFailed => Condition::MarkedAsFailed,
			ConditionDoc::Child { inner } => Condition::Child(Box::new(inner.to_domain()?)),
			ConditionDoc::AtLeast { threshold, inner } => Condition::AtLeast {
				threshold: *threshold,
				inner: Box::new(inner.to_domain()?),
			},
		})
	}
}

/// An effect as written in a document, internally tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectDoc {
	MarkAsFailed {
		#[serde(default)]
		message: Option<String>,
	},
	Annotate { attributes: Vec<(String, String)> },
	RecordEvent { event: EventDoc },
	DropChildren,
}

impl EffectDoc {
	fn to_domain(&self) -> Result<Effect, TraceSimError> {
		Ok(match self {
			EffectDoc::MarkAsFailed { message } => Effect::MarkAsFailed { message: message.clone() },
			EffectDoc::Annotate { attributes } => Effect::Annotate {
				attributes: attributes.clone(),
			},
			EffectDoc::RecordEvent { event } => Effect::RecordEvent {
				event: event.to_domain()?,
			},
			EffectDoc::DropChildren => Effect::DropChildren,
		})
	}
}

/// A conditional rule as written in a document.
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionalRuleDoc {
	pub condition: ConditionDoc,
	pub effects: Vec<EffectDoc>,
}

impl ConditionalRuleDoc {
	fn to_domain(&self) -> Result<ConditionalRule, TraceSimError> {
		let effects = self
			.effects
			.iter()
			.map(EffectDoc::to_domain)
			.collect::<Result<Vec<_>, _>>()?;
		Ok(ConditionalRule::new(self.condition.to_domain()?, effects))
	}
}

/// A task as written in a document.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskDoc {
	pub name: String,
	#[serde(default)]
	pub external_id: Option<String>,
	pub delay: DurationExprDoc,
	pub duration: DurationExprDoc,
	#[serde(default)]
	pub kind: String,
	#[serde(default)]
	pub attributes: BTreeMap<String, String>,
	#[serde(default)]
	pub events: Vec<EventDoc>,
	#[serde(default)]
	pub children: Vec<TaskDoc>,
	#[serde(default)]
	pub child_of: Option<String>,
	#[serde(default)]
	pub linked_to: Vec<String>,
	#[serde(default)]
	pub conditional_rules: Vec<ConditionalRuleDoc>,
}

impl TaskDoc {
	fn to_domain(&self) -> Result<TaskSpec, TraceSimError> {
		let external_id = self.external_id.as_deref().map(ExternalId::new).transpose()?;
		let child_of = self.child_of.as_deref().map(ExternalId::new).transpose()?;
		let linked_to = self
			.linked_to
			.iter()
			.map(|id| ExternalId::new(id.clone()))
			.collect::<Result<Vec<_>, _>>()?;
		let events = self.events.iter().map(EventDoc::to_domain).collect::<Result<Vec<_>, _>>()?;
		let children = self.children.iter().map(TaskDoc::to_domain).collect::<Result<Vec<_>, _>>()?;
		let conditional_rules = self
			.conditional_rules
			.iter()
			.map(ConditionalRuleDoc::to_domain)
			.collect::<Result<Vec<_>, _>>()?;

		Ok(TaskSpec {
			name: self.name.clone(),
			external_id,
			delay: self.delay.to_delay()?,
			duration: self.duration.to_task_duration()?,
			kind: Kind::from_str_lossy(&self.kind),
			attributes: self.attributes.clone(),
			events,
			children,
			child_of,
			linked_to,
			conditional_rules,
		})
	}
}

/// A service as written in a document.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceDoc {
	pub name: String,
	#[serde(default)]
	pub resource: BTreeMap<String, String>,
	pub tasks: Vec<TaskDoc>,
}

impl ServiceDoc {
	fn to_domain(&self) -> Result<ServiceSpec, TraceSimError> {
		let tasks = self.tasks.iter().map(TaskDoc::to_domain).collect::<Result<Vec<_>, _>>()?;
		Ok(ServiceSpec {
			name: self.name.clone(),
			resource: self.resource.clone(),
			tasks,
		})
	}
}

/// The top-level blueprint document, as loaded from YAML or JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct BlueprintDoc {
	pub services: Vec<ServiceDoc>,
}

impl BlueprintDoc {
	/// Converts this document into the list of [`ServiceSpec`] values a
	/// [`crate::blueprint::ServiceBlueprint`] is built from, validating
	/// every external id and duration expression along the way.
	pub fn to_domain(&self) -> Result<Vec<ServiceSpec>, TraceSimError> {
		self.services.iter().map(ServiceDoc::to_domain).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_yaml() -> &'static str {
		r#"
services:
  - name: checkout
    resource:
      region: us-east
    tasks:
      - name: handle-request
        external_id: handle-request
        delay:
          type: absolute
          seconds: 0
        duration:
          type: absolute
          seconds: 2
        kind: server
        events:
          - name: validated
            delay:
              type: relative
              fraction: 0.5
        conditional_rules:
          - condition:
              type: probabilistic
              threshold: 0.1
            effects:
              - type: mark_as_failed
                message: timeout
        children:
          - name: charge-card
            delay:
              type: relative
              fraction: 0.0
            duration:
              type: relative
              fraction: 0.5
            kind: client
"#
	}

	#[test]
	fn parses_and_converts_a_full_document() {
		let doc: BlueprintDoc = serde_yaml::from_str(sample_yaml()).unwrap();
		let services = doc.to_domain().unwrap();
		assert_eq!(services.len(), 1);
		let service = &services[0];
		assert_eq!(service.tasks.len(), 1);
		let task = &service.tasks[0];
		assert_eq!(task.children.len(), 1);
		assert_eq!(task.events.len(), 1);
		assert_eq!(task.conditional_rules.len(), 1);
	}

	#[test]
	fn invalid_external_id_is_rejected() {
		let yaml = r#"
services:
  - name: svc
    tasks:
      - name: t
        external_id: "has space"
        delay:
          type: absolute
          seconds: 0
        duration:
          type: absolute
          seconds: 1
"#;
		let doc: BlueprintDoc = serde_yaml::from_str(yaml).unwrap();
		assert!(matches!(
			doc.to_domain(),
			Err(TraceSimError::InvalidExternalIdPattern { .. })
		));
	}

	#[test]
	fn negative_relative_fraction_is_rejected() {
		let yaml = r#"
services:
  - name: svc
    tasks:
      - name: t
        delay:
          type: absolute
          seconds: 0
        duration:
          type: relative
          fraction: -0.5
"#;
		let doc: BlueprintDoc = serde_yaml::from_str(yaml).unwrap();
		assert!(matches!(
			doc.to_domain(),
			Err(TraceSimError::NegativeRelativeFraction { .. })
		));
	}
}

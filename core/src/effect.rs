//! The effect half of the condition/effect algebra. Effects mutate an
//! already-built span node in place; effect failures are hard errors that
//! abort the whole compilation.

use chrono::Duration as ChronoDuration;

use crate::error::TraceSimError;
use crate::span::{SpanEvent, SpanNode, Status};
use crate::task::TaskEvent;

/// An effect applied to a span node when its owning rule's condition is
/// satisfied.
#[derive(Debug, Clone)]
pub enum Effect {
	/// Sets the span's status to `error`, with an optional message.
	MarkAsFailed { message: Option<String> },
	/// Merges attributes into the span's map, later keys overwriting
	/// earlier ones. Kept as an ordered list (rather than a map) so
	/// declaration order, not map iteration order, decides which value
	/// wins when two `Annotate` effects set the same key.
	Annotate { attributes: Vec<(String, String)> },
	/// Resolves the event's delay against the span's own duration (must be
	/// `<= duration`) and appends it to the span's events.
	RecordEvent { event: TaskEvent },
	/// Clears the span's children list.
	DropChildren,
}

impl Effect {
	pub fn apply(&self, node: &mut SpanNode) -> Result<(), TraceSimError> {
		match self {
			Effect::MarkAsFailed { message } => {
				node.status = Status::error(message.clone());
				Ok(())
			}
			Effect::Annotate { attributes } => {
				for (key, value) in attributes {
					node.attributes.insert(key.clone(), value.clone());
				}
				Ok(())
			}
			Effect::RecordEvent { event } => {
				let duration = (node.end_time - node.start_time)
					.to_std()
					.map_err(|_| TraceSimError::InvalidEventDelay {
						name: event.name.clone(),
						reason: "span has a negative duration".to_string(),
					})?;
				let delay = event.delay.resolve(Some(duration)).map_err(|source| {
					TraceSimError::InvalidEventDelay {
						name: event.name.clone(),
						reason: source.to_string(),
					}
				})?;
				if delay > duration {
					return Err(TraceSimError::InvalidEventDelay {
						name: event.name.clone(),
						reason: format!("delay {:?} exceeds span duration {:?}", delay, duration),
					});
				}
				let occurred_at = node.start_time + ChronoDuration::from_std(delay).unwrap();
				node.events.push(SpanEvent::new(
					event.name.clone(),
					occurred_at,
					event.attributes.clone(),
				));
				Ok(())
			}
			Effect::DropChildren => {
				node.children.clear();
				Ok(())
			}
		}
	}
}

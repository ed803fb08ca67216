use std::borrow::Cow;
use std::io;

use ptree::{Style, TreeItem};
use tracesim_core::TaskNode;

/// Adapts a [`TaskNode`] to `ptree`'s display trait so `show-tree` can
/// print the interpreted task forest without flattening it into spans
/// first.
#[derive(Clone)]
pub struct TaskNodeDisplay(pub TaskNode);

impl TreeItem for TaskNodeDisplay {
	type Child = TaskNodeDisplay;

	fn write_self<W: io::Write>(&self, f: &mut W, style: &Style) -> io::Result<()> {
		let definition = self.0.definition();
		write!(f, "{}", style.paint(&definition.name))?;
		if let Some(external_id) = &definition.external_id {
			write!(f, " ({})", external_id)?;
		}
		Ok(())
	}

	fn children(&self) -> Cow<[Self::Child]> {
		Cow::from(
			self.0
				.children()
				.into_iter()
				.map(TaskNodeDisplay)
				.collect::<Vec<_>>(),
		)
	}
}

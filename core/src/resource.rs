use std::collections::BTreeMap;

/// An entity that emits spans (a service instance, a worker, a queue).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
	pub name: String,
	pub attributes: BTreeMap<String, String>,
}

impl Resource {
	pub fn new(name: impl Into<String>, attributes: BTreeMap<String, String>) -> Self {
		Resource {
			name: name.into(),
			attributes,
		}
	}
}

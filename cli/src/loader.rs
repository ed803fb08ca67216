use std::fs;

use anyhow::Context;
use tracesim_core::doc::BlueprintDoc;
use tracesim_core::{ServiceBlueprint, ServiceSpec};

use crate::args::GlobalArgs;

/// Loads and merges every named blueprint file into one [`ServiceBlueprint`].
///
/// Each file contributes its own `services` list; merging is just
/// concatenation, so duplicate external ids across files are caught later,
/// by the interpreter, rather than here.
pub fn load_blueprint(args: &GlobalArgs) -> anyhow::Result<ServiceBlueprint> {
	let mut services: Vec<ServiceSpec> = Vec::new();
	for name in &args.blueprint {
		let path = args.blueprints_path.join(format!("{name}.yaml"));
		let raw = fs::read_to_string(&path).with_context(|| format!("reading blueprint file {}", path.display()))?;
		let doc: BlueprintDoc = serde_yaml::from_str(&raw).with_context(|| format!("parsing blueprint file {}", path.display()))?;
		services.extend(doc.to_domain().with_context(|| format!("validating blueprint file {}", path.display()))?);
	}
	Ok(ServiceBlueprint::new(services))
}

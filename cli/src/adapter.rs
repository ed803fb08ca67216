use tracesim_core::{Adapter, SpanNode, TraceSimError};

/// The only adapter this CLI ships: renders the compiled forest as a JSON
/// array of span trees. `SpanNode`'s `Serialize` impl cannot fail (it has
/// no custom validation), so the `expect` below is not reachable in
/// practice.
pub struct JsonAdapter;

impl Adapter<serde_json::Value> for JsonAdapter {
	fn transform(&self, roots: &[SpanNode]) -> Result<serde_json::Value, TraceSimError> {
		Ok(serde_json::to_value(roots).expect("SpanNode serialization is infallible"))
	}
}

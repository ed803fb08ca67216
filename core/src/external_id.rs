use std::fmt::Display;

use crate::error::TraceSimError;

/// A caller-chosen identifier, unique across the compiled forest, used for
/// cross-service parenting (`childOf`) and cross-trace linking (`linkedTo`).
///
/// Must match `^[A-Za-z0-9_-]+$`. Checked with a hand-rolled char-class scan
/// rather than a `regex` dependency: the pattern is a single anchored
/// character class, narrow enough not to need one.
/// `Deserialize` is deliberately not derived: going through `serde` directly
/// would let a blueprint document construct an `ExternalId` without the
/// pattern check. Blueprint documents go through [`ExternalId::new`] in the
/// doc-conversion layer instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ExternalId(String);

impl ExternalId {
	pub fn new(id: impl Into<String>) -> Result<Self, TraceSimError> {
		let id = id.into();
		let valid = !id.is_empty()
			&& id
				.chars()
				.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
		if !valid {
			return Err(TraceSimError::InvalidExternalIdPattern { id });
		}
		Ok(ExternalId(id))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Display for ExternalId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn accepts_alphanumeric_underscore_and_dash() {
		assert!(ExternalId::new("a1_b-2").is_ok());
	}

	#[test]
	fn rejects_empty_and_invalid_characters() {
		assert!(ExternalId::new("").is_err());
		assert!(ExternalId::new("has space").is_err());
		assert!(ExternalId::new("has.dot").is_err());
	}
}

//! Ambient configuration: a plain data struct with a `Default` impl,
//! meant to be loaded from a file by the CLI rather than threaded
//! explicitly through the core.

/// Configuration shared by the CLI's `run` and `lint` commands.
///
/// Should be stored in a file at `$XDG_CONFIG_HOME/tracesim.toml`.
#[repr(C)]
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
	/// Seed for the pseudo-random stream used to resolve `Probabilistic`
	/// conditions and generate span/trace ids. `None` means "seed from
	/// entropy at startup", left to the CLI, since the core never reads
	/// a clock or an RNG on its own.
	#[serde(default)]
	pub random_seed: Option<u64>,
	/// Name of the adapter the CLI should use when none is given on the
	/// command line.
	#[serde(default = "default_adapter")]
	pub default_adapter: String,
}

fn default_adapter() -> String {
	"json".to_string()
}

impl Default for Config {
	fn default() -> Self {
		Config {
			random_seed: None,
			default_adapter: default_adapter(),
		}
	}
}

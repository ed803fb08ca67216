use std::{ops::Add, path::PathBuf, str::FromStr};

use chrono::{DateTime, Utc};
use tracesim_core::Config;

lazy_static::lazy_static! {
	pub static ref DEFAULT_BLUEPRINTS_PATH: PathBuf = if cfg!(windows) {
		let mut path = PathBuf::from_str(
			&std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default".to_string()),
		)
		.unwrap();
		path.push("\\Documents\\tracesim");
		path
	} else if cfg!(target_os = "macos") {
		let mut path =
			PathBuf::from_str(&std::env::var("HOME").unwrap_or_else(|_| "/Users/Default".to_string()))
				.unwrap();
		path.push("Documents/tracesim");
		path
	} else {
		let mut path =
			PathBuf::from_str(&std::env::var("XDG_DOCUMENTS_DIR").unwrap_or_else(|_| std::env::var("HOME").unwrap_or_else(|_| ".".to_string()) + "/Documents"))
				.unwrap();
		path.push("tracesim");
		path
	};
}

fn parse_and_unwrap_deadline(s: &str) -> DateTime<Utc> {
	let naive = fuzzydate::parse(s).unwrap_or_else(|_| panic!("Could not parse deadline: {}", s));
	DateTime::from_naive_utc_and_offset(naive, Utc)
}

#[derive(StructOpt, Debug)]
pub struct GlobalArgs {
	#[structopt(long = "blueprints-path", short = "B", env = "TRACESIM_BLUEPRINTS_PATH", default_value=DEFAULT_BLUEPRINTS_PATH.to_str().unwrap(), help = "Path to the directory containing blueprint files.\n")]
	pub blueprints_path: PathBuf,
	#[structopt(
		short,
		long,
		env = "TRACESIM_DEFAULT_BLUEPRINT",
		default_value = "default",
		help = "The blueprint to run. Corresponds to a file at $BLUEPRINTS_PATH/$BLUEPRINT.yaml.\n"
	)]
	pub blueprint: Vec<String>,
	#[structopt(
		long = "deadline",
		short = "d",
		env = "TRACESIM_DEADLINE",
		default_value = "now",
		help = "The absolute timestamp the latest span in the forest must end at.\n",
		parse(from_str = parse_and_unwrap_deadline)
	)]
	pub deadline: DateTime<Utc>,
	#[structopt(
		long = "random-seed",
		short = "s",
		env = "TRACESIM_RANDOM_SEED",
		help = "Seed for the probability and identifier streams. Omit to seed from entropy.\n"
	)]
	pub random_seed: Option<u64>,
	#[structopt(
		long = "adapter",
		short = "a",
		env = "TRACESIM_ADAPTER",
		default_value = "json",
		help = "The adapter used to transform the compiled forest (currently only \"json\").\n"
	)]
	pub adapter: String,
	#[structopt(subcommand)]
	pub cmd: TraceSim,
}

impl Add<&GlobalArgs> for Config {
	type Output = Config;

	fn add(self, rhs: &GlobalArgs) -> Self::Output {
		let mut config = self;
		config.random_seed = rhs.random_seed.or(config.random_seed);
		config.default_adapter = rhs.adapter.clone();
		config
	}
}

#[derive(StructOpt, Debug)]
pub enum TraceSim {
	#[structopt(name = "license", about = "Prints the license information.")]
	License,
	#[structopt(
		name = "run",
		about = "Compiles the blueprint into a span forest and prints it via the selected adapter."
	)]
	Run,
	#[structopt(name = "show-tree", about = "Prints the interpreted task tree.")]
	ShowTree,
	#[structopt(name = "lint", about = "Interprets the blueprint without compiling spans, reporting any errors.")]
	Lint,
}

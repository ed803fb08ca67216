use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Context;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use tracesim_core::{Blueprint, Config, Simulator};

use crate::adapter::JsonAdapter;
use crate::args::GlobalArgs;
use crate::loader;
use crate::tree_display::TaskNodeDisplay;

fn make_rng(seed: Option<u64>) -> StdRng {
	match seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_entropy(),
	}
}

pub fn run(args: GlobalArgs, config: Config) -> anyhow::Result<()> {
	let blueprint = loader::load_blueprint(&args)?;
	let rng = Rc::new(RefCell::new(make_rng(config.random_seed)));

	let randomness_rng = rng.clone();
	let mut randomness = move || randomness_rng.borrow_mut().gen::<f64>();

	let span_rng = rng.clone();
	let mut span_ids = move || {
		let mut bytes = [0u8; 8];
		span_rng.borrow_mut().fill(&mut bytes);
		bytes
	};

	let trace_rng = rng;
	let mut trace_ids = move || {
		let mut bytes = [0u8; 16];
		trace_rng.borrow_mut().fill(&mut bytes);
		bytes
	};

	let simulator = Simulator::new(JsonAdapter);
	let forest = simulator.run(&blueprint, args.deadline, &mut randomness, &mut span_ids, &mut trace_ids)?;
	println!("{}", serde_json::to_string_pretty(&forest).context("formatting compiled forest")?);
	Ok(())
}

pub fn lint(args: GlobalArgs) -> anyhow::Result<()> {
	let blueprint = loader::load_blueprint(&args)?;
	match blueprint.interpret() {
		Ok(roots) => {
			println!("no errors found; {} trace root(s) interpreted.", roots.len());
			Ok(())
		}
		Err(error) => {
			println!("{error}");
			Err(error.into())
		}
	}
}

pub fn show_tree(args: GlobalArgs) -> anyhow::Result<()> {
	let blueprint = loader::load_blueprint(&args)?;
	for root in blueprint.interpret()? {
		ptree::print_tree(&TaskNodeDisplay(root))?;
	}
	Ok(())
}

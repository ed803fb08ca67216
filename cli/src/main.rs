use structopt::StructOpt;

pub mod adapter;
pub mod args;
pub mod commands;
pub mod loader;
pub mod tree_display;

#[macro_use]
extern crate structopt;

fn main() -> anyhow::Result<()> {
	let all_opt = args::GlobalArgs::from_args();
	let config = tracesim_core::Config::default() + &all_opt;
	match all_opt.cmd {
		args::TraceSim::License => {
			println!(include_str!("../../LICENSE"));
			Ok(())
		}
		args::TraceSim::Run => commands::run(all_opt, config),
		args::TraceSim::Lint => commands::lint(all_opt),
		args::TraceSim::ShowTree => commands::show_tree(all_opt),
	}
}

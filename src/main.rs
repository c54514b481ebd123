//! cstyle CLI entry point

use clap::Parser;
use cstyle::cli::{Command, args::Cli};
use env_logger::Env;
use std::process;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Command::Check(args) => cstyle::cli::check::run_check(&args, cli.color),
        Command::List(args) => cstyle::cli::list::run_list(&args),
        Command::Init(args) => cstyle::cli::init::run_init(args.force),
    };

    process::exit(exit_code);
}

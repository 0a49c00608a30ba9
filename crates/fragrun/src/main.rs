mod cli;
mod config;
mod run;

use anyhow::Result;
use cli::Command;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Check { shader }) => run::check(&shader),
        Some(Command::Wrap { shader }) => run::wrap(&shader),
        None => run::run(cli.run),
    }
}

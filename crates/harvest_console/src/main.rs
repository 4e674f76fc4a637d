mod console;

use std::process::ExitCode;

use clap::Parser;

fn main() -> anyhow::Result<ExitCode> {
    let cli = console::Cli::parse();
    console::run(cli)
}

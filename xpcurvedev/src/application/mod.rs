pub mod handlers;

use crate::presentation::cli::Cli;
use clap::Parser;
use xpcurve_core::error::Result;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    handlers::handle_update(cli.force)
}

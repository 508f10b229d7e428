mod cli;

use clap::Parser;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    ccdaily::logging::init_logging(cli.verbose());
    cli.run()
}

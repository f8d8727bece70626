mod commands;
mod terminal;

use commands::{CommandLine, Commands, check, probe};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init(commands.verbose, commands.quiet);

    match commands.command {
        Commands::Probe { target, opts } => {
            print::header("getting ready for discovery", commands.quiet);
            probe::probe(target, &opts, commands.quiet).await
        }
        Commands::Check { target, opts } => {
            print::header("checking hosts", commands.quiet);
            check::check(target, &opts, commands.quiet).await
        }
    }
}

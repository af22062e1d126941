use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;

use crate::{generate::GenerateSubcommands, solve::SolveArgs};

mod generate;
mod parsers;
mod report;
mod solve;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a dispatch problem file, optionally simulating part of the day
    Solve {
        #[command(flatten)]
        args: SolveArgs,
    },
    #[command(visible_alias = "g")]
    Generate {
        #[command(subcommand)]
        commands: GenerateSubcommands,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Some(Commands::Solve { args }) => solve::run(args).await?,
        Some(Commands::Generate { commands }) => generate::run(commands)?,
        None => {}
    }

    Ok(())
}

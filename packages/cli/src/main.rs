use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use schemashim_adapter::AdapterConfig;
use schemashim_cli::{describe, read_file, translate, Error, Sources};
use tracing_subscriber::EnvFilter;

/// schemashim - inspect schema mappings and dry-run request translation
#[derive(Parser, Debug)]
#[command(name = "schemashim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Record-type metadata catalog (JSON)
    #[arg(long)]
    metadata: PathBuf,

    /// Name mapping configuration (JSON). Names map to themselves without it.
    #[arg(long)]
    mapping: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the entity map of a record type
    Describe {
        #[command(flatten)]
        sources: SourceArgs,

        /// Record type, by native or external name
        type_name: String,
    },
    /// Rewrite a pipeline message into backing-store vocabulary
    Translate {
        #[command(flatten)]
        sources: SourceArgs,

        /// Message file (JSON)
        request: PathBuf,
    },
}

fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Command::Describe { sources, type_name } => {
            let sources = Sources::load(&sources.metadata, sources.mapping.as_deref())?;
            print!(
                "{}",
                describe(&sources.metadata, sources.mapper.as_ref(), &type_name)?
            );
        }
        Command::Translate { sources, request } => {
            let adapter = Sources::load(&sources.metadata, sources.mapping.as_deref())?
                .into_adapter(AdapterConfig::default());
            println!("{}", translate(&adapter, &read_file(&request)?)?);
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

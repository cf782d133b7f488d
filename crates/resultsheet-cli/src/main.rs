//! resultsheet CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "resultsheet",
    version,
    about = "Vocational assessment scoring and result sheet generator"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a batch and write its result sheet
    Sheet {
        /// Candidate documents (JSON array or {"data": [...]})
        #[arg(long)]
        input: PathBuf,

        /// Batch id; required when the input holds several batches
        #[arg(long)]
        batch: Option<String>,

        /// Override the scheme recorded on the batch
        #[arg(long)]
        scheme: Option<String>,

        /// Output format: csv, json, html, all (comma-separated)
        #[arg(long, default_value = "csv")]
        format: String,

        /// Output directory (defaults to the configured output_dir)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List registered schemes and their units
    Schemes {
        /// Show the units of one scheme
        #[arg(long)]
        scheme: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a scheme file and/or candidate documents
    Validate {
        /// Scheme configuration TOML (defaults to the configured schemes)
        #[arg(long)]
        schemes: Option<PathBuf>,

        /// Candidate documents to check against the schemes
        #[arg(long)]
        input: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Map a bulk upload (JSON or CSV with flattened keys) to candidate documents
    Import {
        /// Upload file
        #[arg(long)]
        input: PathBuf,

        /// Where to write the candidate documents
        #[arg(long)]
        output: PathBuf,
    },

    /// Create starter config and scheme files
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("resultsheet=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sheet {
            input,
            batch,
            scheme,
            format,
            output,
            config,
        } => commands::sheet::execute(input, batch, scheme, format, output, config),
        Commands::Schemes { scheme, config } => commands::schemes::execute(scheme, config),
        Commands::Validate {
            schemes,
            input,
            config,
        } => commands::validate::execute(schemes, input, config),
        Commands::Import { input, output } => commands::import::execute(input, output),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

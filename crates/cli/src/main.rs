use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use likeness_cli::{cmd_run, cmd_validate};

#[derive(Parser)]
#[command(name = "lkns")]
#[command(about = "Probabilistic entity resolution: dedup and record linkage")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run dedup or record linkage from a TOML config file
    #[command(after_help = "\
Examples:
  lkns run people.toml
  lkns run people.toml --json
  lkns run people.toml --output result.json")]
    Run {
        /// Path to the TOML config file
        config: PathBuf,

        /// Output JSON to stdout instead of human summary only
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a config without running
    #[command(after_help = "\
Examples:
  lkns validate people.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { config, json, output } => cmd_run(config, json, output),
        Commands::Validate { config } => cmd_validate(config),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = e.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(e.code)
        }
    }
}

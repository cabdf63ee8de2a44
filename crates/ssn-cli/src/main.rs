use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod input;

#[derive(Parser)]
#[command(name = "ssn")]
#[command(about = "Shadow-default risk correlation & escalation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> overlay ...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Run one analysis cycle and print the report as JSON
    Analyze {
        /// Loan file (.json or .csv)
        #[arg(long)]
        loans: String,

        /// Signal feed (.json)
        #[arg(long)]
        signals: Option<String>,

        /// Layered config paths in merge order (falls back to SSN_CONFIG)
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// rule_based | exposure_weighted (default: from config)
        #[arg(long)]
        assessor: Option<String>,

        /// Decision journal; supplies the prior hedge and records this decision
        #[arg(long)]
        journal: Option<String>,

        /// Analysis instant (RFC 3339). Defaults to the current time.
        #[arg(long)]
        now: Option<String>,

        /// Hand the decision to the logging executor (at most once per decision id)
        #[arg(long, default_value_t = false)]
        dispatch: bool,

        /// Fail on config keys the engine does not read
        #[arg(long, default_value_t = false)]
        strict_config: bool,
    },

    /// Structural classification only
    Classify {
        /// Loan file (.json or .csv)
        #[arg(long)]
        loans: String,

        /// Layered config paths in merge order (falls back to SSN_CONFIG)
        #[arg(long = "config")]
        config_paths: Vec<String>,
    },

    /// Decision journal utilities
    Journal {
        #[command(subcommand)]
        cmd: JournalCmd,
    },
}

#[derive(Subcommand)]
enum JournalCmd {
    /// Verify the hash chain of a decision journal
    Verify {
        /// Journal path (JSONL)
        path: String,
    },
}

fn main() -> Result<()> {
    // Dev convenience only; real deployments set the environment explicitly.
    let _ = dotenvy::from_filename(".env.local");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = ssn_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Analyze {
            loans,
            signals,
            config_paths,
            assessor,
            journal,
            now,
            dispatch,
            strict_config,
        } => {
            commands::analyze::run(commands::analyze::AnalyzeArgs {
                loans,
                signals,
                config_paths,
                assessor,
                journal,
                now,
                dispatch,
                strict_config,
            })?;
        }

        Commands::Classify {
            loans,
            config_paths,
        } => {
            commands::classify::run(&loans, &config_paths)?;
        }

        Commands::Journal { cmd } => match cmd {
            JournalCmd::Verify { path } => commands::journal::verify(&path)?,
        },
    }

    Ok(())
}

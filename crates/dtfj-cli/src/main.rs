use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

#[derive(Parser)]
#[command(name = "dtfj")]
#[command(about = "Cross-provider DTFJ snapshot comparator and monitor deadlock analyzer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a DDR snapshot against a reference snapshot of the same dump.
    /// Exits 1 when any case fails.
    Compare {
        /// Snapshot under test (JSON)
        #[arg(long)]
        ddr: PathBuf,

        /// Baseline snapshot, usually read with jextract (JSON)
        #[arg(long)]
        reference: PathBuf,

        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<PathBuf>,

        /// Reject config keys the command does not read
        #[arg(long, default_value_t = false)]
        strict_config: bool,

        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Classify the monitor wait-for graph of one snapshot.
    /// Exits 2 when a deadlock loop is found, 1 on any error.
    Deadlock {
        snapshot: PathBuf,

        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<PathBuf>,

        #[arg(long, default_value_t = false)]
        strict_config: bool,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> site -> run...)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// List comparator members and default masks
    Members {
        /// Entity name, e.g. JavaThread; all entities when omitted
        entity: Option<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn init_tracing() {
    // stdout carries reports; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Compare {
            ddr,
            reference,
            config_paths,
            strict_config,
            json,
        } => commands::compare::run(&ddr, &reference, &config_paths, strict_config, json),

        Commands::Deadlock {
            snapshot,
            config_paths,
            strict_config,
            json,
        } => commands::deadlock::run(&snapshot, &config_paths, strict_config, json),

        Commands::ConfigHash { paths } => {
            let loaded = dtfj_config::load_layered_yaml(&paths)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Members { entity, json } => commands::members::run(entity.as_deref(), json),
    }
}

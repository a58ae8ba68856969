use anyhow::Result;
use dtfj_config::ConfigUse;
use dtfj_deadlock::{analyze, AnalysisOptions};
use dtfj_model::load_snapshot;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Exit status when at least one deadlock loop is found; errors exit 1.
pub const DEADLOCK_FOUND: u8 = 2;

pub fn run(
    snapshot: &Path,
    config_paths: &[PathBuf],
    strict_config: bool,
    json: bool,
) -> Result<ExitCode> {
    let config = super::load_config(config_paths, ConfigUse::Deadlock, strict_config)?;
    let options = AnalysisOptions::from_config_json(&config.config_json)?;

    let snapshot = load_snapshot(snapshot)?;
    let report = analyze(&snapshot, &options);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    Ok(if report.has_deadlock() {
        ExitCode::from(DEADLOCK_FOUND)
    } else {
        ExitCode::SUCCESS
    })
}

use anyhow::Result;
use dtfj_compare::{run_suite, CompareOptions, CompareReport};
use dtfj_config::ConfigUse;
use dtfj_model::load_snapshot;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Serialize)]
struct CompareOutput<'a> {
    config_hash: &'a str,
    report: &'a CompareReport,
}

pub fn run(
    ddr: &Path,
    reference: &Path,
    config_paths: &[PathBuf],
    strict_config: bool,
    json: bool,
) -> Result<ExitCode> {
    let config = super::load_config(config_paths, ConfigUse::Compare, strict_config)?;
    let options = CompareOptions::from_config_json(&config.config_json)?;

    let ddr = load_snapshot(ddr)?;
    let reference = load_snapshot(reference)?;
    let report = run_suite(&ddr, &reference, &options);

    if json {
        let out = CompareOutput {
            config_hash: &config.config_hash,
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("config_hash={}", config.config_hash);
        println!("{report}");
    }

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

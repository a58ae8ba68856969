use dtfj_model::{DataError, ProviderKind};
use dtfj_testkit::{sample_snapshot, write_pair, MAIN_CLASS};
use predicates::prelude::*;

#[allow(deprecated)]
fn dtfj() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("dtfj").unwrap()
}

#[test]
fn clean_pair_exits_zero() -> anyhow::Result<()> {
    let files = write_pair(
        &sample_snapshot(ProviderKind::Ddr),
        &sample_snapshot(ProviderKind::Jextract),
    )?;

    dtfj()
        .args(["compare", "--ddr"])
        .arg(&files.ddr)
        .arg("--reference")
        .arg(&files.reference)
        .assert()
        .success()
        .stdout(predicate::str::contains("config_hash="))
        .stdout(predicate::str::contains(" 0 failed"));
    Ok(())
}

#[test]
fn mismatch_exits_one_and_names_the_case() -> anyhow::Result<()> {
    let mut ddr = sample_snapshot(ProviderKind::Ddr);
    if let Some(c) = ddr.classes.iter_mut().find(|c| c.id == MAIN_CLASS) {
        c.modifiers = Err(DataError::corrupt("bad romclass"));
    }
    let files = write_pair(&ddr, &sample_snapshot(ProviderKind::Jextract))?;

    dtfj()
        .args(["compare", "--ddr"])
        .arg(&files.ddr)
        .arg("--reference")
        .arg(&files.reference)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAIL JavaClass class@0x300"));
    Ok(())
}

#[test]
fn json_report_is_machine_readable() -> anyhow::Result<()> {
    let files = write_pair(
        &sample_snapshot(ProviderKind::Ddr),
        &sample_snapshot(ProviderKind::Jextract),
    )?;

    let out = dtfj()
        .args(["compare", "--json", "--ddr"])
        .arg(&files.ddr)
        .arg("--reference")
        .arg(&files.reference)
        .output()?;
    assert!(out.status.success());

    let v: serde_json::Value = serde_json::from_slice(&out.stdout)?;
    assert_eq!(v["config_hash"].as_str().map(str::len), Some(64));
    let cases = v["report"]["cases"].as_array().cloned().unwrap_or_default();
    assert!(!cases.is_empty());
    assert!(cases.iter().all(|c| c["outcome"] == "passed"));
    assert!(v["report"]["stats"]["carve_outs"].as_u64() >= Some(1));
    Ok(())
}

#[test]
fn missing_snapshot_is_an_error() {
    dtfj()
        .args([
            "compare",
            "--ddr",
            "/nonexistent/ddr.json",
            "--reference",
            "/nonexistent/ref.json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/nonexistent/ddr.json"));
}

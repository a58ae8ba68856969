use predicates::prelude::*;

#[allow(deprecated)]
fn dtfj() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("dtfj").unwrap()
}

#[test]
fn config_hash_prints_hash_and_canonical_json() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let base = dir.path().join("base.yaml");
    let overlay = dir.path().join("overlay.yaml");
    std::fs::write(&base, "compare:\n  max_depth: 64\n")?;
    std::fs::write(&overlay, "compare:\n  max_depth: 8\n")?;

    dtfj()
        .arg("config-hash")
        .arg(&base)
        .arg(&overlay)
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^config_hash=[0-9a-f]{64}\n")?)
        .stdout(predicate::str::contains(r#"{"compare":{"max_depth":8}}"#));
    Ok(())
}

#[test]
fn members_reports_known_bad_omissions() {
    dtfj()
        .args(["members", "JavaThread"])
        .assert()
        .success()
        .stdout(predicate::str::contains("omitted by default: IMAGE_THREAD"));

    dtfj()
        .args(["members", "JavaLocation"])
        .assert()
        .success()
        .stdout(predicate::str::contains("omitted by default: COMPILATION_LEVEL"));
}

#[test]
fn unknown_entity_fails() {
    dtfj()
        .args(["members", "JavaWidget"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown entity 'JavaWidget'"));
}

#[test]
fn strict_config_rejects_misspelled_keys() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let cfg = dir.path().join("dtfj.yaml");
    std::fs::write(&cfg, "compare:\n  max_dept: 8\n")?;

    dtfj()
        .args(["compare", "--strict-config", "--ddr", "a.json", "--reference", "b.json", "--config"])
        .arg(&cfg)
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_UNUSED_KEYS"));
    Ok(())
}

#[test]
fn unknown_mask_member_is_a_config_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let cfg = dir.path().join("dtfj.yaml");
    std::fs::write(
        &cfg,
        "compare:\n  masks:\n    JavaThread:\n      include: [NOT_A_MEMBER]\n",
    )?;

    dtfj()
        .args(["compare", "--ddr", "a.json", "--reference", "b.json", "--config"])
        .arg(&cfg)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown member 'NOT_A_MEMBER'"));
    Ok(())
}

#[test]
fn oversized_max_depth_is_a_config_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let cfg = dir.path().join("dtfj.yaml");
    std::fs::write(&cfg, "compare:\n  max_depth: 500\n")?;

    dtfj()
        .args(["compare", "--ddr", "a.json", "--reference", "b.json", "--config"])
        .arg(&cfg)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("compare.max_depth 500 exceeds the limit"));
    Ok(())
}

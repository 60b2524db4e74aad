use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn catalog_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "id, name, price_cents, stock").unwrap();
    writeln!(file, "p1, Widget, 500, 10").unwrap();
    writeln!(file, "p2, Gadget, 250, 3").unwrap();
    file
}

#[test]
fn test_cli_end_to_end() {
    let catalog = catalog_file();

    let mut cmd = Command::new(cargo_bin!("orderflow"));
    cmd.arg(catalog.path())
        .arg("--owner")
        .arg("user1")
        .arg("--item")
        .arg("p1:2")
        .arg("--item")
        .arg("p2:1");

    // 2 * 500 + 1 * 250, confirmed within the run.
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "id,owner_id,items,amount_cents,paid,created_at",
        ))
        .stdout(predicate::str::contains("user1"))
        .stdout(predicate::str::contains("1250,true,"));
}

#[test]
fn test_cli_insufficient_stock() {
    let catalog = catalog_file();

    let mut cmd = Command::new(cargo_bin!("orderflow"));
    cmd.arg(catalog.path()).arg("--item").arg("p2:4");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not enough stock for p2"))
        .stdout(predicate::str::contains("true").not());
}

#[test]
fn test_cli_rejects_bad_item_spec() {
    let catalog = catalog_file();

    let mut cmd = Command::new(cargo_bin!("orderflow"));
    cmd.arg(catalog.path()).arg("--item").arg("p1");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid item spec"));
}

#[test]
fn test_cli_skips_malformed_catalog_rows() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "id, name, price_cents, stock").unwrap();
    writeln!(file, "p1, Widget, 500, 10").unwrap();
    writeln!(file, "broken, NoPrice, not-a-number, 1").unwrap();

    let mut cmd = Command::new(cargo_bin!("orderflow"));
    cmd.arg(file.path()).arg("--item").arg("p1:1");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("500,true,"));
}

#[test]
fn test_cli_audit_log_records_the_flow() {
    let catalog = catalog_file();
    let audit_dir = tempfile::tempdir().unwrap();
    let audit_path = audit_dir.path().join("audit.jsonl");

    let mut cmd = Command::new(cargo_bin!("orderflow"));
    cmd.arg(catalog.path())
        .arg("--item")
        .arg("p1:1")
        .arg("--audit-log")
        .arg(&audit_path);

    cmd.assert().success();

    let contents = std::fs::read_to_string(&audit_path).unwrap();
    let names: Vec<String> = contents
        .lines()
        .map(|line| {
            let event: serde_json::Value = serde_json::from_str(line).unwrap();
            event["name"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(
        names,
        vec!["cart_saved", "payment_initiated", "payment_completed"]
    );
}

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SIGNATURE: &str = "Добрый день!\nПрошу выставить счёт.\n\nС уважением,\nИванов Иван Иванович\nДиректор по продажам\nООО «Вектор»\nТел. 8 (383) 212-34-56\n";

fn kontakt(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kontakt").unwrap();
    // keep the user's real config out of the tests
    cmd.arg("--config").arg(dir.path().join("config.json"));
    cmd
}

fn write_default_config(dir: &TempDir) {
    kontakt(dir).args(["config", "init"]).assert().success();
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("kontakt")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("lexicon"));
}

#[test]
fn test_extract_from_file() {
    let dir = TempDir::new().unwrap();
    write_default_config(&dir);
    let body = dir.path().join("body.txt");
    fs::write(&body, SIGNATURE).unwrap();

    kontakt(&dir)
        .arg("extract")
        .arg(&body)
        .args(["--from", "Иван Иванов <ivanov@vector.ru>", "--subject", "КП"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Иванов Иван Иванович"))
        .stdout(predicate::str::contains("+7 (383) 212-34-56"))
        .stdout(predicate::str::contains("ivanov@vector.ru"));
}

#[test]
fn test_extract_from_stdin_as_csv() {
    let dir = TempDir::new().unwrap();
    write_default_config(&dir);

    kontakt(&dir)
        .args(["extract", "-", "--from", "ivanov@vector.ru", "--format", "csv"])
        .write_stdin(SIGNATURE)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("fio,position,company"))
        .stdout(predicate::str::contains("ООО «Вектор»"));
}

#[test]
fn test_extract_internal_only_prints_hint() {
    let dir = TempDir::new().unwrap();
    write_default_config(&dir);

    kontakt(&dir)
        .args(["extract", "-", "--from", "sales@dna-technology.ru"])
        .write_stdin(SIGNATURE)
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"))
        .stderr(predicate::str::contains("No external participant"));
}

#[test]
fn test_extract_missing_file() {
    let dir = TempDir::new().unwrap();
    write_default_config(&dir);

    kontakt(&dir)
        .args(["extract", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_batch_writes_contacts_and_stats() {
    let dir = TempDir::new().unwrap();
    write_default_config(&dir);

    let message = serde_json::json!({
        "id": "1",
        "subject": "RE: КП",
        "date": "29.07.2025 10:10",
        "participants": ["ivanov@vector.ru", "manager@dna-technology.ru"],
        "body": SIGNATURE,
    });
    let inbox = dir.path().join("inbox");
    fs::create_dir(&inbox).unwrap();
    fs::write(
        inbox.join("inbox.json"),
        serde_json::to_string(&vec![message.clone(), message.clone()]).unwrap(),
    )
    .unwrap();
    fs::write(
        inbox.join("more.jsonl"),
        format!("{}\n", serde_json::to_string(&message).unwrap()),
    )
    .unwrap();

    let output = dir.path().join("contacts.csv");
    let stats = dir.path().join("stats.json");
    let pattern = inbox.join("*.json*");

    kontakt(&dir)
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .args(["--format", "csv"])
        .arg("--output")
        .arg(&output)
        .arg("--stats")
        .arg(&stats)
        .assert()
        .success();

    let csv = fs::read_to_string(&output).unwrap();
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains("Иванов Иван Иванович"));

    let stats: serde_json::Value = serde_json::from_str(&fs::read_to_string(&stats).unwrap()).unwrap();
    assert_eq!(stats["processed"], 3);
    assert_eq!(stats["unique_contacts"], 1);
    assert_eq!(stats["duplicates_removed"], 2);
}

#[test]
fn test_batch_continue_on_error() {
    let dir = TempDir::new().unwrap();
    write_default_config(&dir);
    fs::write(dir.path().join("broken.jsonl"), "not json\n").unwrap();
    let pattern = dir.path().join("*.jsonl");

    kontakt(&dir)
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));

    kontakt(&dir)
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("--continue-on-error")
        .assert()
        .success()
        .stderr(predicate::str::contains("Failed files:"));
}

#[test]
fn test_batch_no_matching_files() {
    let dir = TempDir::new().unwrap();
    write_default_config(&dir);
    let pattern = dir.path().join("*.jsonl");

    kontakt(&dir)
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn test_lexicon_export_and_show() {
    let dir = TempDir::new().unwrap();
    write_default_config(&dir);
    let resources = dir.path().join("resources");

    kontakt(&dir)
        .arg("lexicon")
        .arg("export")
        .arg(&resources)
        .assert()
        .success();
    assert!(resources.join("phone_patterns.txt").exists());
    assert!(resources.join("mobile_codes.txt").exists());

    // a second export refuses to overwrite
    kontakt(&dir)
        .arg("lexicon")
        .arg("export")
        .arg(&resources)
        .assert()
        .failure();

    fs::write(resources.join("position_patterns.txt"), "(unclosed\n").unwrap();
    kontakt(&dir)
        .args(["lexicon", "show", "--resources"])
        .arg(&resources)
        .assert()
        .success()
        .stdout(predicate::str::contains("phone_patterns.txt"))
        .stdout(predicate::str::contains("Warnings:"));
}

#[test]
fn test_config_init_get_set() {
    let dir = TempDir::new().unwrap();
    write_default_config(&dir);
    assert!(dir.path().join("config.json").exists());

    kontakt(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    kontakt(&dir)
        .args(["config", "get", "extraction.min_confidence"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.5"));

    kontakt(&dir)
        .args(["config", "set", "extraction.date_offset_hours", "4"])
        .assert()
        .success();

    kontakt(&dir)
        .args(["config", "get", "extraction.date_offset_hours"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4"));

    kontakt(&dir)
        .args(["config", "set", "extraction.no_such_key", "1"])
        .assert()
        .failure();
}

use assert_cmd::Command;
use predicates::prelude::*;

fn astroloji() -> Command {
    let mut cmd = Command::cargo_bin("astroloji").unwrap();
    cmd.env_remove("GEMINI_API_KEY")
        .env_remove("GEMINI_MODEL")
        .env_remove("GEMINI_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    astroloji()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: astroloji [OPTIONS] <COMMAND>"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("read"))
        .stdout(predicate::str::contains("signs"))
        .stdout(predicate::str::contains("--api-key <API_KEY>"))
        .stdout(predicate::str::contains("--version"));
}

#[test]
fn test_cli_serve_help() {
    astroloji()
        .arg("serve")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: astroloji serve"))
        .stdout(predicate::str::contains("--port <PORT>"))
        .stdout(predicate::str::contains("--templates <TEMPLATES>"));
}

#[test]
fn test_cli_signs_lists_all_twelve() {
    let output = astroloji().arg("signs").assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8(output).unwrap();
    assert_eq!(stdout.lines().count(), 12);
    assert!(stdout.lines().next().unwrap().contains("Koç"));
    assert!(stdout.contains("19 Şubat - 20 Mart"));
}

#[test]
fn test_cli_read_without_key_prints_user_message() {
    astroloji()
        .args(["read", "balik"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Üzgünüz, bir hata oluştu."));
}

#[test]
fn test_cli_read_unknown_sign() {
    astroloji()
        .args(["read", "ophiuchus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown sign 'ophiuchus'"));
}

#[test]
fn test_cli_no_command() {
    astroloji()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: astroloji [OPTIONS] <COMMAND>"));
}

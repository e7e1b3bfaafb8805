//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn aimark() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("aimark").unwrap()
}

#[test]
fn help_output() {
    aimark()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("LLM bulk grader"));
}

#[test]
fn version_output() {
    aimark()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("aimark"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    aimark()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created aimark.toml"))
        .stdout(predicate::str::contains("Created rubric.txt"))
        .stdout(predicate::str::contains("Created sheet.tsv"));

    assert!(dir.path().join("aimark.toml").exists());
    assert!(dir.path().join("rubric.txt").exists());
    assert!(dir.path().join("sheet.tsv").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    // First init
    aimark()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    // Second init should skip
    aimark()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn show_renders_sheet() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("sheet.tsv");
    std::fs::write(&sheet, "Name\tAnswer\tscore\nAda\tpackets carry addresses\t?\n").unwrap();

    aimark()
        .arg("show")
        .arg("--sheet")
        .arg(&sheet)
        .assert()
        .success()
        .stdout(predicate::str::contains("Answer"))
        .stdout(predicate::str::contains("packets carry addresses"))
        .stdout(predicate::str::contains("?"))
        .stdout(predicate::str::contains("1 record(s)"));
}

#[test]
fn show_abbreviates_long_values() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("sheet.tsv");
    let long_answer = "z".repeat(80);
    std::fs::write(&sheet, format!("Answer\tscore\n{long_answer}\t?\n")).unwrap();

    aimark()
        .arg("show")
        .arg("--sheet")
        .arg(&sheet)
        .assert()
        .success()
        .stdout(predicate::str::contains("..."))
        .stdout(predicate::str::contains(&long_answer).not());
}

#[test]
fn show_reads_stdin() {
    aimark()
        .arg("show")
        .arg("--sheet")
        .arg("-")
        .write_stdin("Q\tscore\nfrom a pipe\t3\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("from a pipe"))
        .stdout(predicate::str::contains("3"));
}

#[test]
fn validate_clean_sheet() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("sheet.tsv");
    std::fs::write(&sheet, "Q1\tscore\nan answer\t?\n").unwrap();

    aimark()
        .arg("validate")
        .arg("--sheet")
        .arg(&sheet)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 column(s), 1 record(s)"))
        .stdout(predicate::str::contains("No problems found"));
}

#[test]
fn validate_duplicate_headings() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("sheet.tsv");
    std::fs::write(&sheet, "Q\tQ\nfirst\tsecond\n").unwrap();

    aimark()
        .arg("validate")
        .arg("--sheet")
        .arg(&sheet)
        .assert()
        .success()
        .stdout(predicate::str::contains("WARNING"))
        .stdout(predicate::str::contains("duplicate column title"))
        .stdout(predicate::str::contains("1 warning(s) found"));
}

#[test]
fn validate_rubric_too() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("sheet.tsv");
    let rubric = dir.path().join("rubric.txt");
    std::fs::write(&sheet, "Q\tscore\nok\t?\n").unwrap();
    std::fs::write(&rubric, "same criterion\nother\nsame criterion\n").unwrap();

    aimark()
        .arg("validate")
        .arg("--sheet")
        .arg(&sheet)
        .arg("--rubric")
        .arg(&rubric)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 criteria, total weight 3"))
        .stdout(predicate::str::contains("duplicate criterion"));
}

#[test]
fn validate_nonexistent_file() {
    aimark()
        .arg("validate")
        .arg("--sheet")
        .arg("nonexistent.tsv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn endpoints_lists_builtins() {
    // Isolate from any real config on the machine
    let dir = TempDir::new().unwrap();

    aimark()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("AIMARK_OPENAI_KEY")
        .arg("endpoints")
        .assert()
        .success()
        .stdout(predicate::str::contains("custom (default)"))
        .stdout(predicate::str::contains("llama3"))
        .stdout(predicate::str::contains("openai"))
        .stdout(predicate::str::contains("gpt-4o"));
}

#[test]
fn endpoints_never_print_keys() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("aimark.toml"),
        r#"
[endpoints.secret]
url = "https://api.example.com/v1/chat/completions"
key = "sk-very-secret"
model = "secret-model"
"#,
    )
    .unwrap();

    aimark()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("AIMARK_OPENAI_KEY")
        .arg("endpoints")
        .assert()
        .success()
        .stdout(predicate::str::contains("secret"))
        .stdout(predicate::str::contains("key set"))
        .stdout(predicate::str::contains("sk-very-secret").not());
}

#[test]
fn grade_with_empty_rubric_fails() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("sheet.tsv");
    let rubric = dir.path().join("rubric.txt");
    std::fs::write(&sheet, "Q\tscore\nan answer\t?\n").unwrap();
    std::fs::write(&rubric, "\n\n").unwrap();

    aimark()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("grade")
        .arg("--sheet")
        .arg(&sheet)
        .arg("--rubric")
        .arg(&rubric)
        .arg("--column")
        .arg("Q")
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no criteria"));
}

#[test]
fn grade_with_unknown_column_fails() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("sheet.tsv");
    let rubric = dir.path().join("rubric.txt");
    std::fs::write(&sheet, "Q\tscore\nan answer\t?\n").unwrap();
    std::fs::write(&rubric, "a criterion\n").unwrap();

    aimark()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("grade")
        .arg("--sheet")
        .arg(&sheet)
        .arg("--rubric")
        .arg(&rubric)
        .arg("--column")
        .arg("Nope")
        .assert()
        .failure()
        .stderr(predicate::str::contains("column 'Nope' not found"));
}

#[test]
fn grade_with_unknown_endpoint_fails() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("sheet.tsv");
    let rubric = dir.path().join("rubric.txt");
    std::fs::write(&sheet, "Q\tscore\nan answer\t?\n").unwrap();
    std::fs::write(&rubric, "a criterion\n").unwrap();

    aimark()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("grade")
        .arg("--sheet")
        .arg(&sheet)
        .arg("--rubric")
        .arg(&rubric)
        .arg("--column")
        .arg("Q")
        .arg("--endpoint")
        .arg("missing")
        .assert()
        .failure()
        .stderr(predicate::str::contains("endpoint 'missing' not found"));
}

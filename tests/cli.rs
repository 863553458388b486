use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn run_script(script: &str, extra: &[&str]) -> Output {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(script.as_bytes()).unwrap();
    file.flush().unwrap();

    Command::new(env!("CARGO_BIN_EXE_survey-explorer"))
        .arg(fixture("schema.csv"))
        .arg(fixture("responses.csv"))
        .arg("--script")
        .arg(file.path())
        .args(extra)
        .output()
        .unwrap()
}

#[test]
fn missing_responses_file_exits_with_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_survey-explorer"))
        .arg(fixture("schema.csv"))
        .arg(fixture("does_not_exist.csv"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does_not_exist.csv"), "stderr: {stderr}");
}

#[test]
fn script_session() {
    let output = run_script(
        "# warm-up\n\
         structure MC\n\
         dist LanguageHaveWorkedWith 2\n\
         subset MainBranch \"I am a developer by profession\"\n\
         dist Age\n\
         info Salary\n\
         quit\n\
         summary\n",
        &[],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("SURVEY STRUCTURE (MC questions only)"));
    assert!(stdout.contains("Total questions: 3"));
    assert!(stdout.contains("Total Selections: 9"));
    assert!(stdout.contains("Created subset with 3 respondents"));
    assert!(stdout.contains("Filter: MainBranch='I am a developer by profession'"));
    assert!(stdout.contains("Error: unknown column 'Salary'"));
    assert!(stdout.contains("Goodbye!"));
    // Nothing after quit runs.
    assert!(!stdout.contains("SURVEY SUMMARY"));

    let python = stdout.lines().find(|l| l.starts_with("Python")).unwrap();
    assert!(python.contains("75.0%"));
    assert!(!stdout.lines().any(|l| l.starts_with("SQL ")));
}

#[test]
fn json_format_from_command_line() {
    let output = run_script("summary\n", &["--format", "json"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["total_respondents"], 5);
    assert_eq!(value["total_questions"], 10);
    assert_eq!(value["missing_cells"], 7);
    assert_eq!(value["questions_by_type"]["MC"], 3);
    assert_eq!(value["null_markers"][0], "NA");
}

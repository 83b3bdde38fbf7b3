use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

const SESSION: &str = r"1
01-02-2024
100
Food
Lunch with team
1
15-03-2024
50
Travel, long distance
Train
1
20-02-2024
30
Food

3
2
2024
4
5
LUNCH
6
3
bad-date
35.75


7
2
7
2
9
8
";

const EXPECTED_CSV: &str = r"
id,date,amount,category,note
1,01-02-2024,100,Food,Lunch with team
3,20-02-2024,35.75,Food,
";

fn run_binary(file: &Path, input: &str) -> Output {
    let bin_path = env!("CARGO_BIN_EXE_expense_tracker");

    let mut child = Command::new(bin_path)
        .arg("--file")
        .arg(file)
        .arg("--currency")
        .arg("$")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute binary");

    child.stdin.take()
        .expect("Failed to open stdin")
        .write_all(input.as_bytes())
        .expect("Failed to write session to stdin");

    child.wait_with_output().expect("Failed to wait for binary")
}

fn normalize_csv(content: &str) -> Vec<String> {
    content.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect()
}

#[test]
fn test_expense_tracker_session() {
    let dir = tempfile::tempdir().expect("Failed to create temporary directory");
    let file = dir.path().join("expenses.csv");

    let output = run_binary(&file, SESSION);

    assert!(output.status.success(),
        "Binary failed with stderr: {}",
        String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    for expected in [
        "[OK] Expense added with ID 1",
        "[OK] Expense added with ID 2",
        "[OK] Expense added with ID 3",
        "Total expenses for 02-2024: $130.00",
        "Found 1 entries:",
        "Invalid date format 'bad-date'. Use DD-MM-YYYY (e.g., 05-12-2025). Skipping date change.",
        "Entry ID 3 updated.",
        "Deleted entry ID 2",
        "No entry with ID 2",
        "Invalid choice. Try again.",
        "Goodbye!",
    ] {
        assert!(stdout.contains(expected), "Missing {:?} in output:\n{}", expected, stdout);
    }

    let summary_food = stdout.find(&format!("{:20} : $130.00", "Food")).expect("Food summary line");
    let summary_travel = stdout.find(&format!("{:20} : $50.00", "Travel, long distance")).expect("Travel summary line");
    assert!(summary_food < summary_travel);

    let actual_csv = std::fs::read_to_string(&file).expect("Failed to read expense file");
    assert_eq!(normalize_csv(&actual_csv), normalize_csv(EXPECTED_CSV));
}

#[test]
fn test_new_file_gets_header_only() {
    let dir = tempfile::tempdir().expect("Failed to create temporary directory");
    let file = dir.path().join("expenses.csv");

    let output = run_binary(&file, "2\n8\n");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No expenses found."));
    let content = std::fs::read_to_string(&file).expect("Failed to read expense file");
    assert_eq!(normalize_csv(&content), vec!["id,date,amount,category,note"]);
}

#[test]
fn test_quoted_fields_survive_rewrite() {
    let dir = tempfile::tempdir().expect("Failed to create temporary directory");
    let file = dir.path().join("expenses.csv");

    let output = run_binary(&file, "1\n05-12-2025\n99.50\nBills, misc\nsaid \"hi\"\n8\n");
    assert!(output.status.success());

    let content = std::fs::read_to_string(&file).expect("Failed to read expense file");
    assert_eq!(
        normalize_csv(&content),
        vec![
            "id,date,amount,category,note".to_string(),
            r#"1,05-12-2025,99.50,"Bills, misc","said ""hi""""#.to_string(),
        ]
    );
}

#[test]
fn test_unreadable_store_fails() {
    let dir = tempfile::tempdir().expect("Failed to create temporary directory");
    let file = dir.path().join("expenses.csv");
    std::fs::write(&file, "id,date,amount,category,note\nnot-a-number,01-01-2024,5,Food,\n")
        .expect("Failed to seed expense file");

    let output = run_binary(&file, "2\n8\n");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

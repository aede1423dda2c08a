use std::io::Write;
use std::process::{Command, Stdio};

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "delve-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn simulate_writes_json_report() {
    let exe = env!("CARGO_BIN_EXE_delve");
    let output_path = temp_path("sim.json");
    let status = Command::new(exe)
        .args([
            "simulate",
            "--runs",
            "2",
            "--seeds",
            "1,2",
            "--policy",
            "aggressive,cautious",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    let value: serde_json::Value = serde_json::from_str(&content).expect("json report");
    assert_eq!(value["summary"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["runs"].as_array().map(Vec::len), Some(8));
}

#[test]
fn simulate_markdown_is_deterministic() {
    let exe = env!("CARGO_BIN_EXE_delve");
    let run = || {
        let output = Command::new(exe)
            .args(["simulate", "--runs", "3", "--seeds", "99", "--report", "markdown"])
            .output()
            .expect("run cli");
        assert!(output.status.success());
        String::from_utf8_lossy(&output.stdout).into_owned()
    };
    let first = run();
    assert!(first.contains("# Delve Simulation Results"));
    assert!(first.contains("| Coward |"));
    assert_eq!(first, run());
}

#[test]
fn bad_seed_is_reported() {
    let exe = env!("CARGO_BIN_EXE_delve");
    let output = Command::new(exe)
        .args(["simulate", "--seeds", "abc"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid seed"));
}

#[test]
fn interactive_session_exits_cleanly_on_eof() {
    let exe = env!("CARGO_BIN_EXE_delve");
    let save = temp_path("save.json");
    let mut child = Command::new(exe)
        .arg("--save")
        .arg(&save)
        .args(["--seed", "7"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn cli");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all("1\nアレン\n1\nセラ\n2\n".as_bytes())
        .expect("write input");
    let output = child.wait_with_output().expect("wait cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("キャラ作成"));
    assert!(stdout.contains("キャラ3の名前"));
    assert!(!save.exists());
}

#[test]
fn missing_save_falls_back_to_party_creation() {
    let exe = env!("CARGO_BIN_EXE_delve");
    let save = temp_path("absent.json");
    let mut child = Command::new(exe)
        .arg("--save")
        .arg(&save)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn cli");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"2\n")
        .expect("write input");
    let output = child.wait_with_output().expect("wait cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("セーブデータがありません"));
    assert!(stdout.contains("キャラ作成"));
}

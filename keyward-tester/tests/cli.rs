use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "keyward-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_keyward-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("persistence"));
}

#[test]
fn cli_smoke_run_writes_json_report() {
    let exe = env!("CARGO_BIN_EXE_keyward-tester");
    let output_path = temp_path("smoke");
    let output = Command::new(exe)
        .args([
            "--report",
            "json",
            "--scenarios",
            "smoke",
            "--iterations",
            "1",
            "--seeds",
            "1337",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Keyward Automated Tester"));
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_path).expect("read report"))
            .expect("json report");
    assert_eq!(report[0]["scenario_name"], "smoke");
    assert_eq!(report[0]["passed"], true);
}

#[test]
fn cli_unknown_scenario_fails() {
    let exe = env!("CARGO_BIN_EXE_keyward-tester");
    let output = Command::new(exe)
        .args(["--scenarios", "warp"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown scenario"));
}

#[test]
fn cli_replays_command_script() {
    let exe = env!("CARGO_BIN_EXE_keyward-tester");
    let script_path = temp_path("script-in");
    std::fs::write(&script_path, "# day one\nexplore\ngather wood\nend\n").expect("write script");
    let output = Command::new(exe)
        .arg("--script")
        .arg(&script_path)
        .args(["--seeds", "scripted"])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("> gather wood"));
    assert!(stdout.contains("= day 1 (night)"));
    assert!(!stdout.contains("day one"));
}

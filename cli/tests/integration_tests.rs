use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn argspec(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_argspec"))
        .args(args)
        .output()
        .expect("failed to run argspec")
}

fn repl(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_argspec"))
        .arg("repl")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn argspec repl");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("failed to write stdin");
    child.wait_with_output().expect("failed to wait for repl")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_scenarios(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("scenarios.yml");
    std::fs::write(
        &path,
        r#"version: "1.0"
scenarios:
  - command: greet
    description: Prints a greeting
    arguments:
      - ref: name
        names: ["-n", "--name"]
        type: text
        required: true
        help: Who to greet
      - ref: times
        type: integer
        positional: true
        nargs: "?"
        range: { min: 1, max: 3 }
"#,
    )
    .expect("failed to write scenarios");
    path
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

#[test]
fn parse_prints_json_bindings() {
    let output = argspec(&["parse", "--", "ints", "[1 2 3]"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_str(stdout(&output).trim()).unwrap();
    assert_eq!(json, serde_json::json!({ "positional": [1, 2, 3] }));
}

#[test]
fn parse_text_format() {
    let output = argspec(&["parse", "--format", "text", "--", "sub", "--right=2.0"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "left = []\nright = [2.0]\n");
}

#[test]
fn parse_failure_exits_with_error() {
    let output = argspec(&["parse", "--", "sub", "--left=1.0"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing required argument 'right'"), "stderr: {stderr}");
    assert!(stderr.contains("missing_required_argument"));
}

#[test]
fn parse_unknown_command() {
    let output = argspec(&["parse", "--", "calc", "add"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown command: calc"));
}

#[test]
fn parse_with_scenario_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_scenarios(dir.path());
    let path = path.to_str().unwrap();

    let output = argspec(&["parse", "--scenarios", path, "--", "greet", "-n=\"Ada\"", "2"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value = serde_json::from_str(stdout(&output).trim()).unwrap();
    assert_eq!(json, serde_json::json!({ "name": ["Ada"], "times": [2] }));

    let output = argspec(&["parse", "--scenarios", path, "--", "greet", "-n=\"Ada\"", "5"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("out_of_range"));
}

// ---------------------------------------------------------------------------
// repl
// ---------------------------------------------------------------------------

#[test]
fn repl_stops_at_exit() {
    let output = repl(
        &["--format", "json"],
        "add 1 2\nadd 1\n\nexit\nadd 3 4\n",
    );
    assert!(output.status.success());

    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2, "stdout: {out}");
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(lines[0]).unwrap(),
        serde_json::json!({ "left": [1], "right": [2] })
    );
    assert!(lines[1].starts_with("error: missing required argument 'right'"));
}

#[test]
fn repl_reports_lex_errors_and_continues() {
    let output = repl(&[], "string \"open\nstring \"closed\"\n");
    assert!(output.status.success());
    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].starts_with("error: parse error:"), "stdout: {out}");
    assert_eq!(lines[1], "positional = [\"closed\"]");
}

// ---------------------------------------------------------------------------
// describe / check
// ---------------------------------------------------------------------------

#[test]
fn describe_single_scenario() {
    let output = argspec(&["describe", "sub"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.starts_with("usage: sub <--right> <options>\n"), "stdout: {out}");
    assert!(out.contains("Subtracts two decimals"));
}

#[test]
fn describe_all_scenarios() {
    let output = argspec(&["describe"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("usage: string [positional]"));
    assert!(out.contains("usage: sqrt [number]"));
}

#[test]
fn check_valid_and_invalid_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_scenarios(dir.path());

    let output = argspec(&["check", path.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("ok: 1 scenario(s)"));

    let bad = dir.path().join("bad.yml");
    std::fs::write(
        &bad,
        "version: \"1.0\"\nscenarios:\n  - command: x\n    arguments:\n      - { ref: a, names: [\"--a\"], type: float }\n",
    )
    .unwrap();
    let output = argspec(&["check", bad.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported"), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}

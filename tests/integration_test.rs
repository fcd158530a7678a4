use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn run_script(name: &str, script: &str, extra_args: &[&str]) -> Output {
    let script_path: PathBuf = std::env::temp_dir().join(format!(
        "typist_{}_{}.script",
        name,
        std::process::id()
    ));
    fs::write(&script_path, script).expect("Failed to write test script");

    let output = Command::new(env!("CARGO_BIN_EXE_typist"))
        .arg("--script")
        .arg(&script_path)
        .args(extra_args)
        .output()
        .expect("Failed to execute typist");

    let _ = fs::remove_file(&script_path);
    output
}

#[test]
fn test_basic_script_execution() {
    let script = r#"
type "echo test"
wait 10ms
"#;

    let output = run_script("basic", script, &["--speed", "1ms"]);
    assert!(
        output.status.success(),
        "typist failed with stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim_end(), "echo test");
}

#[test]
fn test_trace_prints_every_frame() {
    let script = r#"
type "ab"
left 1
backspace 1
"#;

    let output = run_script("trace", script, &["--speed", "1ms", "--trace"]);
    assert!(
        output.status.success(),
        "typist failed with stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["a|", "ab|", "a|b", "|b", "b"]);
}

#[test]
fn test_invalid_script() {
    let script = r#"
invalid_command "test"
"#;

    let output = run_script("invalid", script, &[]);
    assert!(
        !output.status.success(),
        "typist should fail with invalid command"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown command"),
        "Error should mention unknown command"
    );
}

#[test]
fn test_invalid_speed_flag() {
    let output = run_script("bad_speed", "type \"x\"\n", &["--speed", "fast"]);
    assert!(!output.status.success());
}

#[test]
fn test_speed_flag_uses_script_duration_syntax() {
    let output = run_script("unitless_speed", "type \"x\"\n", &["--speed", "15"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Duration must end with 's' or 'ms'"), "stderr: {stderr}");

    let output = run_script("fractional_speed", "type \"ok\"\n", &["--speed", "0.001s"]);
    assert!(
        output.status.success(),
        "typist failed with stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim_end(), "ok");
}

#[test]
fn test_comment_handling() {
    let script = r#"
# This is a comment
type "hello"  # greet

# Another comment
backspace -1 1ms
type "bye"
"#;

    let output = run_script("comments", script, &["--speed", "1ms"]);
    assert!(
        output.status.success(),
        "typist failed with stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim_end(), "bye");
}

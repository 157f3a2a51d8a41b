use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("command_args_cli_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn path(&self) -> &PathBuf {
        &self.path
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_command-args"))
        .args(args)
        .output()
        .expect("failed to run command-args")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn parse_json(args: &[&str]) -> serde_json::Value {
    let output = run(args);
    assert!(output.status.success(), "parse failed: {}", stderr(&output));
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

/// A `echo` schema with one string positional, written as YAML.
fn write_echo_schema(dir: &TempDir) -> PathBuf {
    let yaml = r#"
name: echo
description: Print a word
positional:
  - name: word
    value_type: string
    required: true
"#;
    let path = dir.join("echo.yaml");
    fs::write(&path, yaml).expect("failed to write schema");
    path
}

// ---------------------------------------------------------------------------
// parse: built-in scenarios
// ---------------------------------------------------------------------------

#[test]
fn parse_add_prints_typed_values() {
    let json = parse_json(&["parse", "add", "1", "2"]);
    assert_eq!(json["command"], "add");
    assert_eq!(json["arguments"]["values"]["left"], 1);
    assert_eq!(json["arguments"]["values"]["right"], 2);
}

#[test]
fn parse_sub_leaves_left_absent() {
    let json = parse_json(&["parse", "sub", "--right", "5.0"]);
    let values = &json["arguments"]["values"];
    assert_eq!(values["right"], 5.0);
    assert!(values.get("left").is_none());
}

#[test]
fn parse_calc_reports_subcommand() {
    let json = parse_json(&["parse", "calc", "div"]);
    assert_eq!(json["arguments"]["values"]["subcommand"], "div");
    assert_eq!(json["arguments"]["subcommand"]["name"], "div");
}

#[test]
fn parse_date_yaml_output() {
    let output = run(&["parse", "--format", "yaml", "date", "2024-01-15"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("command: date"), "unexpected output: {out}");
    assert!(out.contains("2024-01-15"));
}

#[test]
fn parse_text_output() {
    let output = run(&["parse", "--format", "text", "calc", "sqrt"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.starts_with("calc\n"));
    assert!(out.contains("subcommand = sqrt"));
}

// ---------------------------------------------------------------------------
// parse: failures exit non-zero with the error kind
// ---------------------------------------------------------------------------

#[test]
fn parse_failures_print_kind() {
    let cases: [(&[&str], &str); 5] = [
        (&["parse", "sqrt", "-1"], "validation error"),
        (&["parse", "date", "2024/01/15"], "type mismatch"),
        (&["parse", "add", "1"], "missing required argument"),
        (&["parse", "add", "1", "2", "3"], "extraneous argument"),
        (&["parse", "mul", "2", "3"], "unknown command"),
    ];

    for (args, kind) in cases {
        let output = run(args);
        assert!(!output.status.success(), "{args:?} should fail");
        let err = stderr(&output);
        assert!(err.contains(&format!("error: {kind}")), "{args:?}: {err}");
        assert!(output.stdout.is_empty());
    }
}

#[test]
fn parse_date_error_names_format() {
    let output = run(&["parse", "date", "2024-13-01"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("yyyy-mm-dd"));
}

#[test]
fn parse_stdin_lines() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_command-args"))
        .args(["parse", "--stdin"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn command-args");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"add 1 2\n\nsqrt -4\nsqrt 16\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("validation error"));
    assert!(err.contains("1 line(s) failed to parse"));
    let out = stdout(&output);
    assert!(out.contains("\"left\": 1"));
    assert!(out.contains("\"number\": 16"));
}

// ---------------------------------------------------------------------------
// Schema sources and configuration
// ---------------------------------------------------------------------------

#[test]
fn parse_with_extra_schemas_and_quoting() {
    let dir = TempDir::new("quoting");
    let schema = write_echo_schema(&dir);

    let json = parse_json(&[
        "parse",
        "--no-builtin",
        "--quoting",
        "--schemas",
        schema.to_str().unwrap(),
        "echo",
        "hello world",
    ]);
    assert_eq!(json["arguments"]["values"]["word"], "hello world");

    let json = parse_json(&[
        "parse",
        "--no-builtin",
        "--quoting",
        "--schemas",
        schema.to_str().unwrap(),
        "echo",
        "it's",
    ]);
    assert_eq!(json["arguments"]["values"]["word"], "it's");

    let output = run(&[
        "parse",
        "--no-builtin",
        "--schemas",
        schema.to_str().unwrap(),
        "add",
        "1",
        "2",
    ]);
    assert!(stderr(&output).contains("unknown command"));
}

#[test]
fn parse_with_config_file() {
    let schemas = TempDir::new("config_schemas");
    write_echo_schema(&schemas);
    let dir = TempDir::new("config");
    let config = dir.join("command-args.yml");
    fs::write(
        &config,
        format!(
            "builtin_schemas: true\nschema_dirs:\n  - {}\nparser:\n  flag_prefix: \"/\"\n",
            schemas.path().display()
        ),
    )
    .unwrap();

    let json = parse_json(&[
        "parse",
        "--config",
        config.to_str().unwrap(),
        "sub",
        "/right",
        "2.5",
    ]);
    assert_eq!(json["arguments"]["values"]["right"], 2.5);

    let json = parse_json(&["parse", "--config", config.to_str().unwrap(), "echo", "hi"]);
    assert_eq!(json["arguments"]["values"]["word"], "hi");
}

#[test]
fn list_shows_usage() {
    let output = run(&["list"]);
    assert!(output.status.success());
    let out = stdout(&output);
    for usage in [
        "add <left> <right>",
        "sub [--left <decimal>] --right <decimal>",
        "date <date>",
    ] {
        assert!(out.contains(usage), "missing '{usage}' in:\n{out}");
    }
}

#[test]
fn list_json_with_extra_schemas() {
    let dir = TempDir::new("list_json");
    write_echo_schema(&dir);

    let output = run(&[
        "list",
        "--format",
        "json",
        "--no-builtin",
        "--schemas",
        dir.path().to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["command"], "echo");
    assert_eq!(entries[0]["description"], "Print a word");
}

// ---------------------------------------------------------------------------
// validate / bundle
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_good_schemas() {
    let dir = TempDir::new("validate_ok");
    let schema = write_echo_schema(&dir);

    let output = run(&["validate", schema.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("for 1 command(s)"));
}

#[test]
fn validate_rejects_bad_schemas() {
    let dir = TempDir::new("validate_bad");
    let path = dir.join("sub.json");
    let json = serde_json::json!({
        "name": "sub",
        "named": [
            { "name": "right", "kind": "named", "value_type": "decimal", "required": true, "default": 0.0 }
        ]
    });
    fs::write(&path, json.to_string()).unwrap();

    let output = run(&["validate", path.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("1 schema error(s) found"));
}

#[test]
fn bundle_then_parse_from_bundle() {
    let dir = TempDir::new("bundle");
    let schema = write_echo_schema(&dir);
    let bundle = dir.join("out/commands.json");

    let output = run(&[
        "bundle",
        schema.to_str().unwrap(),
        "--output",
        bundle.to_str().unwrap(),
        "--name",
        "demo",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(bundle.exists());

    let package: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&bundle).unwrap()).unwrap();
    assert_eq!(package["name"], "demo");
    assert_eq!(package["schemas"].as_array().unwrap().len(), 1);

    let json = parse_json(&[
        "parse",
        "--no-builtin",
        "--schemas",
        bundle.to_str().unwrap(),
        "echo",
        "bundled",
    ]);
    assert_eq!(json["arguments"]["values"]["word"], "bundled");
}

#[test]
fn bundle_rejects_unknown_output_extension() {
    let dir = TempDir::new("bundle_ext");
    let schema = write_echo_schema(&dir);
    let output = run(&[
        "bundle",
        schema.to_str().unwrap(),
        "--output",
        dir.join("commands.txt").to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unsupported schema file format"));
}

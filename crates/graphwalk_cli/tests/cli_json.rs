#![allow(missing_docs)]

use std::io::Write;
use std::process::{Command, Output, Stdio};

use graphwalk_testkit::{fixture_json, fixture_path, scratch_dir};
use serde_json::{Value, json};

#[test]
fn analyze_envelope_reports_nested_types() {
	let (code, json) = run_envelope(&["run", "analyze", &fixture("nested.json")]);

	assert_eq!(code, 0);
	assert_eq!(json["ok"], true);
	assert_eq!(json["mode"], "analyze");
	assert_eq!(json["result"]["type"], "object");
	assert_eq!(json["result"]["properties"]["children"]["properties"]["0"]["path"], "children.0");
	assert_eq!(json["result"]["properties"]["children"]["properties"]["0"]["properties"]["id"]["type"], "number");
}

#[test]
fn clone_envelope_echoes_payload() {
	let (code, json) = run_envelope(&["run", "clone", &fixture("nested.json")]);

	assert_eq!(code, 0);
	assert_eq!(json["result"], fixture_json("nested.json"));
}

#[test]
fn flatten_selects_request_field() {
	let (code, json) = run_envelope(&["run", "flatten", &fixture("request.json"), "--field", "data"]);

	assert_eq!(code, 0);
	assert_eq!(
		json["result"],
		json!({
			"user.name": "ada",
			"user.roles.0": "admin",
			"user.roles.1": "dev",
			"active": true
		})
	);
}

#[test]
fn stats_summarizes_fixture_numbers() {
	let (code, json) = run_envelope(&["run", "stats", &fixture("numbers.json")]);

	assert_eq!(code, 0);
	assert_eq!(json["result"]["sum"], 14.5);
	assert_eq!(json["result"]["count"], 6);
	assert_eq!(json["result"]["max"], 9.5);
	assert_eq!(json["result"]["min"], -2.0);
}

#[test]
fn depth_failure_exits_two_with_detail() {
	let (code, json) = run_envelope(&["run", "clone", &fixture("nested.json"), "--max-depth", "2"]);

	assert_eq!(code, 2);
	assert_eq!(json["ok"], false);
	assert_eq!(json["errorKind"], "DepthExceeded");
	assert_eq!(json["detail"]["depth"], 3);
	assert_eq!(json["detail"]["path"], "children.0");
	assert_eq!(json["detail"]["message"], "input is nested deeper than the configured limit");
	assert!(json.get("result").is_none());
}

#[test]
fn step_budget_failure_names_the_limit() {
	let (code, json) = run_envelope(&["run", "count", &fixture("nested.json"), "--max-steps", "2"]);

	assert_eq!(code, 2);
	assert_eq!(json["errorKind"], "BudgetExceeded");
	assert_eq!(json["detail"]["limit"], "steps=2");
	assert!(json["detail"].get("path").is_none());
}

#[test]
fn stats_on_object_is_a_type_mismatch() {
	let (code, json) = run_envelope(&["run", "stats", &fixture("nested.json")]);

	assert_eq!(code, 2);
	assert_eq!(json["errorKind"], "TypeMismatch");
	assert_eq!(json["detail"]["path"], "");
}

#[test]
fn unknown_mode_is_reported_in_envelope() {
	let (code, json) = run_envelope(&["run", "transmogrify", &fixture("nested.json")]);

	assert_eq!(code, 2);
	assert_eq!(json["errorKind"], "UnknownMode");
	assert_eq!(json["detail"]["message"], "unknown operation mode");
}

#[test]
fn zstd_payload_is_decompressed() {
	let raw = std::fs::read(fixture_path("nested.json")).expect("fixture reads");
	let compressed = zstd::stream::encode_all(raw.as_slice(), 3).expect("compress");
	let path = scratch_dir("cli_json").join("nested.json.zst");
	std::fs::write(&path, compressed).expect("write compressed payload");

	let (code, json) = run_envelope(&["run", "count", &path.display().to_string()]);

	assert_eq!(code, 0);
	assert_eq!(json["result"], json!({ "count": 5 }));
}

#[test]
fn stdin_payload_and_unflatten() {
	let output = run_with_stdin(&["unflatten", "-"], br#"{"a.b":1,"a.c.0":true,"a.c.1":null}"#);

	assert!(output.status.success(), "unflatten should succeed: {}", String::from_utf8_lossy(&output.stderr));
	let json: Value = serde_json::from_slice(&output.stdout).expect("stdout should be valid json");
	assert_eq!(json, json!({ "a": { "b": 1, "c": [true, null] } }));
}

#[test]
fn unflatten_rejects_non_object_input() {
	let output = run_with_stdin(&["unflatten", "-"], b"[1,2]");

	assert_eq!(output.status.code(), Some(1));
	assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}

#[test]
fn malformed_payload_exits_one() {
	let output = run_with_stdin(&["run", "count", "-"], b"{\"a\":");

	assert_eq!(output.status.code(), Some(1));
	assert!(output.stdout.is_empty());
	assert!(String::from_utf8_lossy(&output.stderr).contains("error: json:"));
}

#[test]
fn deep_payload_reaches_the_depth_check() {
	let output = run_with_stdin(&["run", "count", "-"], &nested_arrays(1001));

	assert_eq!(output.status.code(), Some(2));
	let json: Value = serde_json::from_slice(&output.stdout).expect("stdout should be valid json");
	assert_eq!(json["errorKind"], "DepthExceeded");
	assert_eq!(json["detail"]["depth"], 1001);
}

#[test]
fn deep_describe_output_is_still_an_envelope() {
	let output = run_with_stdin(&["run", "describe", "-"], &nested_arrays(600));

	assert_eq!(output.status.code(), Some(0));
	let text = String::from_utf8_lossy(&output.stdout);
	assert!(text.starts_with(r#"{"ok":true,"mode":"describe","result":{"type":"array""#));
	assert!(text.trim_end().ends_with('}'));
}

#[test]
fn missing_field_exits_one() {
	let output = run_graphwalk(&["run", "count", &fixture("nested.json"), "--field", "data"]);

	assert_eq!(output.status.code(), Some(1));
	assert!(String::from_utf8_lossy(&output.stderr).contains("no top-level field"));
}

#[test]
fn modes_lists_every_mode() {
	let output = run_graphwalk(&["modes"]);

	assert!(output.status.success());
	let listing = String::from_utf8_lossy(&output.stdout);
	let modes: Vec<&str> = listing.lines().collect();
	assert_eq!(modes, ["clone", "analyze", "count", "flatten", "describe", "stats"]);
}

#[test]
fn pretty_output_is_multiline_json() {
	let output = run_graphwalk(&["run", "count", &fixture("nested.json"), "--pretty"]);

	assert!(output.status.success());
	let text = String::from_utf8_lossy(&output.stdout);
	assert!(text.lines().count() > 1);
	let json: Value = serde_json::from_str(&text).expect("stdout should be valid json");
	assert_eq!(json["result"]["count"], 5);
}

fn nested_arrays(depth: usize) -> Vec<u8> {
	format!("{}{}", "[".repeat(depth), "]".repeat(depth)).into_bytes()
}

fn fixture(name: &str) -> String {
	fixture_path(name).display().to_string()
}

fn run_graphwalk(args: &[&str]) -> Output {
	Command::new(env!("CARGO_BIN_EXE_graphwalk")).args(args).output().expect("command executes")
}

fn run_with_stdin(args: &[&str], stdin: &[u8]) -> Output {
	let mut child = Command::new(env!("CARGO_BIN_EXE_graphwalk"))
		.args(args)
		.stdin(Stdio::piped())
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.spawn()
		.expect("command spawns");
	child.stdin.take().expect("stdin piped").write_all(stdin).expect("stdin writes");
	child.wait_with_output().expect("command finishes")
}

fn run_envelope(args: &[&str]) -> (i32, Value) {
	let output = run_graphwalk(args);
	let code = output.status.code().expect("exit code");
	let json = serde_json::from_slice(&output.stdout).expect("stdout should be valid json");
	(code, json)
}

//! Tests for the file-only CLI commands and argument parsing.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use autoclick::CliError;
use autoclick::cli::{Cli, Commands, cmd_check, cmd_normalize, read_document};
use autoclick_core::ConnectionFormat;
use clap::Parser;
use serde_json::{Value, json};
use std::path::PathBuf;

const DRAWING: &str = r#"{"nodes":[
    {"id":"2","action_type":"wait","params":{"duration":1.0},"x":50.4,"y":49.6},
    {"id":"1","action_type":"click","params":{"x":1,"y":1},"x":1,"y":1,
     "connections":[{"target_id":"2","output_slot":0,"input_slot":0}]}
]}"#;

fn write_temp(dir: &tempfile::TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    path
}

// =============================================================================
// NORMALIZE
// =============================================================================

#[test]
fn test_normalize_sorts_and_rounds() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_temp(&dir, "in.json", DRAWING);
    let output = dir.path().join("out.json");

    cmd_normalize(&input, &output, ConnectionFormat::Full).unwrap();

    let value: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(value["nodes"][0]["id"], "1");
    assert_eq!(value["nodes"][1]["pos"], json!([50.0, 50.0]));
    assert_eq!(value["nodes"][1]["x"], json!(50.0));
}

#[test]
fn test_normalize_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_temp(&dir, "in.json", DRAWING);
    let once = dir.path().join("once.json");
    let twice = dir.path().join("twice.json");

    cmd_normalize(&input, &once, ConnectionFormat::Full).unwrap();
    cmd_normalize(&once, &twice, ConnectionFormat::Full).unwrap();

    assert_eq!(
        std::fs::read_to_string(&once).unwrap(),
        std::fs::read_to_string(&twice).unwrap()
    );
}

#[test]
fn test_normalize_legacy_connections() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_temp(&dir, "in.json", DRAWING);
    let output = dir.path().join("out.json");

    cmd_normalize(&input, &output, ConnectionFormat::Legacy).unwrap();

    let value: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(value["nodes"][0]["connections"], json!(["2"]));

    // The legacy file reads back to the same edges.
    let original = read_document(&input).unwrap();
    let legacy = read_document(&output).unwrap();
    assert_eq!(original.edges(), legacy.edges());
}

// =============================================================================
// CHECK
// =============================================================================

#[test]
fn test_check_accepts_partial_drawing() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_temp(
        &dir,
        "partial.json",
        r#"{"nodes":[{"id":"1","action_type":"click","connections":["7"]},
                     {"id":"2","action_type":"teleport"}]}"#,
    );

    cmd_check(&file, true).unwrap();
    cmd_check(&file, false).unwrap();
}

#[test]
fn test_check_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_temp(&dir, "bad.json", "{\"nodes\": [");

    assert!(matches!(cmd_check(&file, false), Err(CliError::Core(_))));
}

#[test]
fn test_check_missing_file() {
    let result = cmd_check(&PathBuf::from("/nonexistent/drawing.json"), false);
    assert!(matches!(result, Err(CliError::Io(_))));
}

// =============================================================================
// ARGUMENT PARSING
// =============================================================================

#[test]
fn test_parse_run_flags() {
    let cli = Cli::try_parse_from([
        "autoclick", "--json-mode", "run", "-d", "d-1", "--loop", "--speed", "0.5", "--follow",
    ])
    .unwrap();

    assert!(cli.json_mode);
    match cli.command {
        Commands::Run {
            drawing,
            repeat,
            speed,
            follow,
        } => {
            assert_eq!(drawing, "d-1");
            assert!(repeat);
            assert_eq!(speed, 0.5);
            assert!(follow);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_parse_global_backend_after_subcommand() {
    let cli = Cli::try_parse_from([
        "autoclick",
        "push",
        "-d",
        "d-1",
        "-f",
        "drawing.json",
        "--legacy-connections",
        "--backend",
        "http://10.0.0.2:5000/api",
    ])
    .unwrap();

    assert_eq!(cli.backend.as_deref(), Some("http://10.0.0.2:5000/api"));
    assert!(matches!(
        cli.command,
        Commands::Push {
            legacy_connections: true,
            ..
        }
    ));
}

#[test]
fn test_subcommand_is_required() {
    assert!(Cli::try_parse_from(["autoclick"]).is_err());
}

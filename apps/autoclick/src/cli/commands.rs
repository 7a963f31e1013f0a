//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::autosave::Debouncer;
use crate::client::DrawingClient;
use crate::config::Config;
use crate::error::CliError;
use crate::types::{DrawingStatus, ExecuteRequest};
use autoclick_core::{
    ConnectionFormat, DrawingMetrics, Exporter, Graph, GraphDocument, ImportReport, Importer,
};
use std::path::Path;
use std::time::Instant;

// =============================================================================
// FILE HELPERS
// =============================================================================

/// Maximum drawing file size (16 MB).
///
/// Drawings hold at most a few thousand nodes; anything larger is not one.
const MAX_DOCUMENT_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path) -> Result<(), CliError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| CliError::Io(format!("Cannot read '{}': {}", path.display(), e)))?;

    if metadata.len() > MAX_DOCUMENT_FILE_SIZE {
        return Err(CliError::Io(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_DOCUMENT_FILE_SIZE
        )));
    }
    Ok(())
}

/// Read and parse a drawing file.
pub fn read_document(path: &Path) -> Result<GraphDocument, CliError> {
    validate_file_size(path)?;
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("Cannot read '{}': {}", path.display(), e)))?;
    Ok(GraphDocument::from_json(&text)?)
}

/// Write a drawing file.
pub fn write_document(
    path: &Path,
    document: &GraphDocument,
    format: ConnectionFormat,
) -> Result<(), CliError> {
    let text = document.to_json_pretty(format)?;
    std::fs::write(path, text + "\n")
        .map_err(|e| CliError::Io(format!("Cannot write '{}': {}", path.display(), e)))
}

/// Run a document through import and export.
///
/// The result holds only what the live graph accepted, in canonical order.
pub fn normalize_document(
    document: &GraphDocument,
) -> Result<(GraphDocument, ImportReport, DrawingMetrics), CliError> {
    let mut graph = Graph::new();
    let report = Importer::import(&mut graph, document)?;
    let metrics = DrawingMetrics::from_graph(&graph);
    Ok((Exporter::export(&graph), report, metrics))
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn report_json(report: &ImportReport) -> serde_json::Value {
    serde_json::json!({
        "created": report.created,
        "skipped": report.skipped.iter().map(|s| serde_json::json!({
            "index": s.index,
            "id": s.id,
            "action_type": s.action_type,
            "reason": s.reason.to_string(),
        })).collect::<Vec<_>>(),
        "connections": {
            "succeeded": report.connections.succeeded,
            "failed": report.connections.failed.iter().map(|f| serde_json::json!({
                "source_id": f.source_id,
                "target_id": f.connection.target_id,
                "output_slot": f.connection.output_slot,
                "input_slot": f.connection.input_slot,
                "reason": f.reason.to_string(),
            })).collect::<Vec<_>>(),
        }
    })
}

fn print_report(report: &ImportReport) {
    println!("Nodes:        {}", report.created);
    println!("Links:        {}", report.connections.succeeded);
    for skipped in &report.skipped {
        println!(
            "  skipped node #{} (id {:?}, type {:?}): {}",
            skipped.index, skipped.id, skipped.action_type, skipped.reason
        );
    }
    for failed in &report.connections.failed {
        println!(
            "  dropped link {} [{}] -> {} [{}]: {}",
            failed.source_id,
            failed.connection.output_slot,
            failed.connection.target_id,
            failed.connection.input_slot,
            failed.reason
        );
    }
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Import a drawing file and report the outcome.
pub fn cmd_check(file: &Path, json_mode: bool) -> Result<(), CliError> {
    let document = read_document(file)?;
    let (_, report, metrics) = normalize_document(&document)?;

    if json_mode {
        print_json(&serde_json::json!({
            "file": file.to_string_lossy(),
            "complete": report.is_complete(),
            "report": report_json(&report),
            "metrics": metrics,
        }));
        return Ok(());
    }

    println!("Drawing Check");
    println!("=============");
    println!("File:   {}", file.display());
    println!("Status: {}", if report.is_complete() { "ok" } else { "partial" });
    println!();
    print_report(&report);
    println!();
    for (tag, count) in &metrics.kinds {
        println!("  {tag:<12} {count}");
    }
    let starts: Vec<String> = metrics.start_nodes.iter().map(ToString::to_string).collect();
    println!("Start nodes:  {}", starts.join(", "));
    println!("Open outputs: {}", metrics.open_outputs.len());

    Ok(())
}

// =============================================================================
// NORMALIZE COMMAND
// =============================================================================

/// Rewrite a drawing file in canonical form.
pub fn cmd_normalize(input: &Path, output: &Path, format: ConnectionFormat) -> Result<(), CliError> {
    let document = read_document(input)?;
    let (normalized, report, _) = normalize_document(&document)?;
    write_document(output, &normalized, format)?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        nodes = report.created,
        links = report.connections.succeeded,
        "normalized drawing"
    );
    Ok(())
}

// =============================================================================
// BACKEND COMMANDS
// =============================================================================

/// Download a drawing's nodes to a file.
pub async fn cmd_pull(
    client: &DrawingClient,
    drawing: &str,
    output: &Path,
    json_mode: bool,
) -> Result<(), CliError> {
    let remote = client.get_drawing(drawing).await?;
    let document = remote.document();
    write_document(output, &document, ConnectionFormat::Full)?;

    let outside = remote.nodes_outside_boundary();
    for id in &outside {
        tracing::warn!(drawing, node = %id, "pointer target outside drawing boundary");
    }

    if json_mode {
        print_json(&serde_json::json!({
            "drawing_id": remote.id,
            "name": remote.name,
            "nodes": document.nodes.len(),
            "output": output.to_string_lossy(),
            "outside_boundary": outside,
        }));
    } else {
        println!(
            "Pulled '{}' ({} nodes) to {}",
            remote.name,
            document.nodes.len(),
            output.display()
        );
        if !outside.is_empty() {
            println!(
                "  {} node(s) target points outside the boundary and will be skipped: {}",
                outside.len(),
                outside.join(", ")
            );
        }
    }
    Ok(())
}

/// Upload a drawing file.
pub async fn cmd_push(
    client: &DrawingClient,
    drawing: &str,
    file: &Path,
    format: ConnectionFormat,
    json_mode: bool,
) -> Result<(), CliError> {
    let document = read_document(file)?;
    let (normalized, report, _) = normalize_document(&document)?;
    let ack = client.save_drawing(drawing, &normalized, format).await?;

    if json_mode {
        print_json(&serde_json::json!({
            "drawing_id": drawing,
            "message": ack.message,
            "report": report_json(&report),
        }));
    } else {
        println!("{}", ack.message);
        if !report.is_complete() {
            print_report(&report);
        }
    }
    Ok(())
}

/// Push `file` whenever it settles after a change. Runs until Ctrl+C.
pub async fn cmd_watch(
    client: &DrawingClient,
    config: &Config,
    drawing: &str,
    file: &Path,
    format: ConnectionFormat,
) -> Result<(), CliError> {
    let mut debouncer = Debouncer::new(config.autosave_debounce());
    debouncer.observe(read_document(file)?, Instant::now());
    debouncer.mark_saved();

    let mut ticker = tokio::time::interval(config.poll_interval());
    tracing::info!(file = %file.display(), drawing, "watching for changes");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("stopping watch");
                return Ok(());
            }
            _ = ticker.tick() => {}
        }

        let now = Instant::now();
        match read_document(file) {
            Ok(document) => {
                if debouncer.observe(document, now) {
                    tracing::debug!(file = %file.display(), "change detected");
                }
            }
            // Half-written files are common mid-save; try again next tick.
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable file");
                continue;
            }
        }

        if !debouncer.due(now) {
            continue;
        }
        let Some(pending) = debouncer.pending() else {
            continue;
        };
        let (normalized, report, _) = normalize_document(pending)?;
        match client.save_drawing(drawing, &normalized, format).await {
            Ok(_) => {
                debouncer.mark_saved();
                tracing::info!(
                    drawing,
                    nodes = report.created,
                    links = report.connections.succeeded,
                    "auto-saved"
                );
            }
            Err(e) => tracing::warn!(drawing, error = %e, "auto-save failed"),
        }
    }
}

/// Start executing a drawing, optionally following it to completion.
pub async fn cmd_run(
    client: &DrawingClient,
    config: &Config,
    drawing: &str,
    repeat: bool,
    speed: f64,
    follow: bool,
    json_mode: bool,
) -> Result<(), CliError> {
    let ack = client
        .start_execution(drawing, ExecuteRequest { repeat, speed })
        .await?;
    if !json_mode {
        println!("{}", ack.message);
    }
    if !follow {
        if json_mode {
            print_json(&serde_json::json!({ "message": ack.message }));
        }
        return Ok(());
    }

    let mut ticker = tokio::time::interval(config.poll_interval());
    let mut last_progress = None;
    loop {
        ticker.tick().await;
        let status = client.status(drawing).await?;
        if !json_mode && last_progress != Some(status.progress) {
            print_status_line(&status);
            last_progress = Some(status.progress);
        }
        if !status.is_running {
            if json_mode {
                print_json(&serde_json::to_value(&status).unwrap_or_default());
            }
            return Ok(());
        }
    }
}

/// Ask a running drawing to stop.
pub async fn cmd_stop(
    client: &DrawingClient,
    drawing: &str,
    json_mode: bool,
) -> Result<(), CliError> {
    let ack = client.stop_execution(drawing).await?;
    if json_mode {
        print_json(&serde_json::json!({ "message": ack.message }));
    } else {
        println!("{}", ack.message);
    }
    Ok(())
}

/// Show a drawing's execution status.
pub async fn cmd_status(
    client: &DrawingClient,
    drawing: &str,
    json_mode: bool,
) -> Result<(), CliError> {
    let status = client.status(drawing).await?;

    if json_mode {
        print_json(&serde_json::to_value(&status).unwrap_or_default());
        return Ok(());
    }

    println!("Drawing Status");
    println!("==============");
    println!("Drawing:  {}", status.name.as_deref().unwrap_or(drawing));
    println!("Running:  {}", status.is_running);
    println!("Status:   {}", status.status.as_deref().unwrap_or("idle"));
    println!("Progress: {}", status.progress);
    if let Some(node) = &status.current_node {
        println!("Node:     {node}");
    }
    if let Some(error) = &status.error {
        println!("Error:    {error}");
    }
    Ok(())
}

fn print_status_line(status: &DrawingStatus) {
    let node = status
        .current_node
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string());
    println!(
        "[{}] progress {} node {}",
        status.status.as_deref().unwrap_or("idle"),
        status.progress,
        node
    );
}

// =============================================================================
// TESTS
// =============================================================================

// src/output/writer.rs
//! The only place CLI output touches the filesystem or stdout.

use super::types::*;
use crate::error::AppError;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Runs every operation in the plan. A failing operation is recorded in
/// the report and does not stop the rest.
pub fn deliver(plan: OutputPlan) -> OutputReport {
    let mut report = OutputReport::default();

    for operation in plan.operations {
        let result = match &operation {
            DeliveryTarget::WriteFile { path, content } => write_file(path, content),
            DeliveryTarget::PrintToStdout { content } => print_to_stdout(content),
        };
        match result {
            Ok(bytes_written) => report.completed.push(Delivered {
                operation,
                bytes_written,
            }),
            Err(e) => {
                log::error!("Output failed: {}", e);
                report.failed.push((operation, e.to_string()));
            }
        }
    }

    log::debug!(
        "Delivered {} outputs ({} bytes), {} failed",
        report.completed.len(),
        report.bytes_written(),
        report.failed.len()
    );
    report
}

fn write_file(path: &Path, content: &str) -> Result<usize, AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    log::info!("Wrote {}", path.display());
    Ok(content.len())
}

fn print_to_stdout(content: &str) -> Result<usize, AppError> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    if !content.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(content.len())
}

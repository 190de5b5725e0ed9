// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::runtime::{RecordSource, write_export};
use anyhow::{Context, Result};
use jobdash_app::{ViewState, derive_view, export_artifact};
use std::path::{Path, PathBuf};
use time::Date;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub row_count: usize,
    pub total_records: usize,
}

/// Fetches once, derives the view for `view_state`, and writes the visible
/// rows as CSV. Without `output` the file lands in `export_dir` under its
/// suggested name.
pub fn run_export(
    source: &RecordSource,
    view_state: &ViewState,
    output: Option<&Path>,
    export_dir: &Path,
    today: Date,
) -> Result<ExportOutcome> {
    let records = source
        .fetch()
        .with_context(|| format!("fetch applications from {}", source.label()))?;
    let view = derive_view(&records, view_state);
    let artifact = export_artifact(view.rows, today);

    let target = match output {
        Some(path) => path.to_path_buf(),
        None => export_dir.join(&artifact.file_name),
    };
    let path = write_export(&target, &artifact)?;
    tracing::info!(
        rows = artifact.row_count,
        total = records.len(),
        path = %path.display(),
        "headless export written"
    );

    Ok(ExportOutcome {
        path,
        row_count: artifact.row_count,
        total_records: records.len(),
    })
}

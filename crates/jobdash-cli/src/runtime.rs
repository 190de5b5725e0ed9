// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use jobdash_app::{ApplicationRecord, ExportArtifact};
use jobdash_client::{Client, decode_applications};
use jobdash_testkit::ApplicationFaker;
use jobdash_tui::InternalEvent;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;

pub const DEMO_SEED: u64 = 7;
pub const DEMO_COUNT: usize = 60;

/// Where application records come from.
#[derive(Debug, Clone)]
pub enum RecordSource {
    Http(Client),
    File(PathBuf),
    Demo { seed: u64, count: usize },
}

impl RecordSource {
    pub fn label(&self) -> String {
        match self {
            Self::Http(client) => client.endpoint().to_owned(),
            Self::File(path) => path.display().to_string(),
            Self::Demo { .. } => "demo data".to_owned(),
        }
    }

    pub fn fetch(&self) -> Result<Vec<ApplicationRecord>> {
        match self {
            Self::Http(client) => Ok(client.fetch_applications()?),
            Self::File(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("read applications file {}", path.display()))?;
                decode_applications(&raw)
                    .with_context(|| format!("decode applications file {}", path.display()))
            }
            Self::Demo { seed, count } => Ok(ApplicationFaker::new(*seed).applications(*count)),
        }
    }
}

pub struct CliRuntime {
    source: RecordSource,
    export_dir: PathBuf,
}

impl CliRuntime {
    pub fn new(source: RecordSource, export_dir: PathBuf) -> Self {
        Self { source, export_dir }
    }
}

impl jobdash_tui::AppRuntime for CliRuntime {
    fn source_label(&self) -> String {
        self.source.label()
    }

    fn fetch_applications(&mut self) -> Result<Vec<ApplicationRecord>> {
        self.source.fetch()
    }

    fn save_export(&mut self, artifact: &ExportArtifact) -> Result<PathBuf> {
        write_export(&self.export_dir.join(&artifact.file_name), artifact)
    }

    fn spawn_retrieval(&mut self, request_id: u64, tx: Sender<InternalEvent>) -> Result<()> {
        let source = self.source.clone();
        thread::Builder::new()
            .name(format!("retrieval-{request_id}"))
            .spawn(move || {
                let result = source.fetch().map_err(|error| format!("{error:#}"));
                if tx
                    .send(InternalEvent::Retrieval { request_id, result })
                    .is_err()
                {
                    tracing::debug!(request_id, "dashboard closed before retrieval finished");
                }
            })
            .map_err(|error| anyhow!("spawn retrieval thread: {error}"))?;
        Ok(())
    }
}

pub fn write_export(path: &Path, artifact: &ExportArtifact) -> Result<PathBuf> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create export directory {}", parent.display()))?;
    }
    fs::write(path, &artifact.bytes)
        .with_context(|| format!("write export {}", path.display()))?;
    Ok(path.to_path_buf())
}

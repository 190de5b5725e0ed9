// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::Date;
use time::macros::format_description;

use crate::model::ApplicationRecord;

pub const CSV_HEADER: [&str; 5] = ["company", "roleTitle", "location", "status", "lastUpdatedAt"];
pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8";
pub const EXPORT_FILE_PREFIX: &str = "applications-export-";

/// Bytes to hand to whatever delivers downloads, with the name and MIME
/// type the user should see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
    pub row_count: usize,
}

/// Serializes rows in the order given. Callers pass the visible rows, not
/// the raw store.
pub fn to_csv<'a, I>(rows: I) -> String
where
    I: IntoIterator<Item = &'a ApplicationRecord>,
{
    let mut lines = vec![CSV_HEADER.join(",")];
    for row in rows {
        let fields = [
            &row.company,
            &row.role_title,
            &row.location,
            &row.status,
            &row.last_updated_at,
        ];
        let line = fields
            .iter()
            .map(|field| quote_field(field.as_deref().unwrap_or("")))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }
    lines.join("\n")
}

fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

pub fn export_file_name(date: Date) -> String {
    let stamp = date
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string());
    format!("{EXPORT_FILE_PREFIX}{stamp}.csv")
}

pub fn export_artifact<'a, I>(rows: I, date: Date) -> ExportArtifact
where
    I: IntoIterator<Item = &'a ApplicationRecord>,
{
    let rows = rows.into_iter().collect::<Vec<_>>();
    let row_count = rows.len();
    ExportArtifact {
        file_name: export_file_name(date),
        mime_type: CSV_MIME_TYPE,
        bytes: to_csv(rows).into_bytes(),
        row_count,
    }
}

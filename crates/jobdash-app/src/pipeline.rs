// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::{Ordering, Reverse};

use crate::model::{ApplicationRecord, SortKey, StatusFilter, ViewState};
use crate::summary::{StatusSummary, summarize};

/// Filtered and sorted rows plus the summary computed over them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedView<'a> {
    pub rows: Vec<&'a ApplicationRecord>,
    pub summary: StatusSummary,
}

impl DerivedView<'_> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Free-text match over company, role and location combined with the
/// status selector.
pub fn matches(record: &ApplicationRecord, query: &str, status_filter: StatusFilter) -> bool {
    matches_normalized(record, &normalize_query(query), status_filter)
}

pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

fn matches_normalized(
    record: &ApplicationRecord,
    normalized_query: &str,
    status_filter: StatusFilter,
) -> bool {
    matches_text(record, normalized_query) && status_filter.accepts(record.canonical_status())
}

fn matches_text(record: &ApplicationRecord, normalized_query: &str) -> bool {
    if normalized_query.is_empty() {
        return true;
    }

    [&record.company, &record.role_title, &record.location]
        .into_iter()
        .flatten()
        .any(|value| value.to_lowercase().contains(normalized_query))
}

pub fn compare(a: &ApplicationRecord, b: &ApplicationRecord, sort_key: SortKey) -> Ordering {
    match sort_key {
        SortKey::Company => collate(
            a.company.as_deref().unwrap_or(""),
            b.company.as_deref().unwrap_or(""),
        ),
        // Raw values on purpose: "Offer" and "offer" order apart here even
        // though they share a bucket everywhere else.
        SortKey::Status => collate(
            a.status.as_deref().unwrap_or(""),
            b.status.as_deref().unwrap_or(""),
        ),
        SortKey::Updated => compare_updated_desc(a.updated_millis(), b.updated_millis()),
    }
}

/// Newest first; rows without a usable timestamp go after every dated row.
fn compare_updated_desc(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Case-folded comparison first; among strings that fold equal, lowercase
/// sorts before uppercase at the first differing character, then raw code
/// points decide.
pub fn collate(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    if folded != Ordering::Equal {
        return folded;
    }

    for (left, right) in a.chars().zip(b.chars()) {
        if left == right {
            continue;
        }
        match (left.is_lowercase(), right.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => break,
        }
    }

    a.cmp(b)
}

/// Indices into `records` of the visible rows, in display order. The sort
/// is stable, so ties keep encounter order.
pub fn visible_indices(records: &[ApplicationRecord], view_state: &ViewState) -> Vec<usize> {
    let query = normalize_query(&view_state.query);
    let mut indices = records
        .iter()
        .enumerate()
        .filter(|(_, record)| matches_normalized(record, &query, view_state.status_filter))
        .map(|(index, _)| index)
        .collect::<Vec<_>>();

    match view_state.sort_key {
        SortKey::Updated => indices.sort_by_cached_key(|index| {
            let millis = records[*index].updated_millis();
            (millis.is_none(), Reverse(millis))
        }),
        sort_key => {
            indices.sort_by(|a, b| compare(&records[*a], &records[*b], sort_key));
        }
    }
    indices
}

pub fn visible_rows<'a>(
    records: &'a [ApplicationRecord],
    view_state: &ViewState,
) -> Vec<&'a ApplicationRecord> {
    visible_indices(records, view_state)
        .into_iter()
        .map(|index| &records[index])
        .collect()
}

pub fn derive_view<'a>(
    records: &'a [ApplicationRecord],
    view_state: &ViewState,
) -> DerivedView<'a> {
    let rows = visible_rows(records, view_state);
    let summary = summarize(rows.iter().copied());
    DerivedView { rows, summary }
}

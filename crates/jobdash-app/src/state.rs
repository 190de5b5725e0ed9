// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::HashSet;

use crate::ids::ApplicationId;
use crate::model::{ApplicationRecord, SortKey, StatusFilter, ViewState};
use crate::pipeline::{DerivedView, visible_indices};
use crate::summary::{StatusSummary, summarize};

/// Records from one successful load. Never mutated after construction; a
/// reload builds a new store with a higher generation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordStore {
    records: Vec<ApplicationRecord>,
    generation: u64,
}

impl RecordStore {
    pub fn new(records: Vec<ApplicationRecord>, generation: u64) -> Self {
        Self {
            records,
            generation,
        }
    }

    pub fn records(&self) -> &[ApplicationRecord] {
        &self.records
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn duplicate_ids(&self) -> Vec<&ApplicationId> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for record in &self.records {
            if !seen.insert(&record.id) && !duplicates.contains(&&record.id) {
                duplicates.push(&record.id);
            }
        }
        duplicates
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// No retrieval has been started yet.
    Idle,
    Loading { request_id: u64 },
    Ready,
    Failed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Nav,
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardCommand {
    SetQuery(String),
    PushQueryChar(char),
    PopQueryChar,
    ClearQuery,
    SetStatusFilter(StatusFilter),
    RotateStatusFilter(isize),
    SetSortKey(SortKey),
    RotateSortKey(isize),
    EnterSearch,
    ExitSearch,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    LoadStarted { request_id: u64 },
    RecordsLoaded { request_id: u64, count: usize },
    LoadFailed { request_id: u64, message: String },
    StaleResultDiscarded { request_id: u64 },
    ViewChanged(ViewState),
    InputModeChanged(InputMode),
    StatusUpdated(String),
    StatusCleared,
}

/// What the table area should show. Loading and an empty match set are
/// separate states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardBody<'a> {
    Loading,
    Failed(&'a str),
    Empty,
    Rows(DerivedView<'a>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ViewMemo {
    generation: u64,
    view: ViewState,
    indices: Vec<usize>,
    summary: StatusSummary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardState {
    pub load: LoadState,
    pub view: ViewState,
    pub input: InputMode,
    pub status_line: Option<String>,
    store: RecordStore,
    last_request_id: u64,
    memo: Option<ViewMemo>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            load: LoadState::Idle,
            view: ViewState::default(),
            input: InputMode::Nav,
            status_line: None,
            store: RecordStore::default(),
            last_request_id: 0,
            memo: None,
        }
    }
}

impl DashboardState {
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn in_flight_request(&self) -> Option<u64> {
        match self.load {
            LoadState::Loading { request_id } => Some(request_id),
            LoadState::Idle | LoadState::Ready | LoadState::Failed { .. } => None,
        }
    }

    /// Starts a new load. Any result still outstanding from an earlier
    /// request becomes stale.
    pub fn begin_load(&mut self) -> DashboardEvent {
        self.last_request_id = self.last_request_id.saturating_add(1);
        let request_id = self.last_request_id;
        self.load = LoadState::Loading { request_id };
        tracing::debug!(request_id, "retrieval started");
        DashboardEvent::LoadStarted { request_id }
    }

    pub fn complete_load(
        &mut self,
        request_id: u64,
        result: Result<Vec<ApplicationRecord>, String>,
    ) -> Vec<DashboardEvent> {
        if self.in_flight_request() != Some(request_id) {
            tracing::debug!(request_id, "discarding stale retrieval result");
            return vec![DashboardEvent::StaleResultDiscarded { request_id }];
        }

        match result {
            Ok(records) => {
                let generation = self.store.generation().saturating_add(1);
                self.store = RecordStore::new(records, generation);
                let duplicates = self.store.duplicate_ids();
                if !duplicates.is_empty() {
                    tracing::warn!(
                        count = duplicates.len(),
                        first = %duplicates[0],
                        "retrieval returned duplicate application ids"
                    );
                }
                self.load = LoadState::Ready;
                self.view = ViewState::default();
                self.memo = None;
                let count = self.store.len();
                tracing::info!(request_id, count, "applications loaded");
                vec![
                    DashboardEvent::RecordsLoaded { request_id, count },
                    DashboardEvent::ViewChanged(self.view.clone()),
                ]
            }
            Err(message) => {
                tracing::warn!(request_id, error = %message, "retrieval failed");
                self.load = LoadState::Failed {
                    message: message.clone(),
                };
                vec![DashboardEvent::LoadFailed {
                    request_id,
                    message,
                }]
            }
        }
    }

    pub fn dispatch(&mut self, command: DashboardCommand) -> Vec<DashboardEvent> {
        match command {
            DashboardCommand::SetQuery(query) => self.update_view(|view| view.query = query),
            DashboardCommand::PushQueryChar(ch) => self.update_view(|view| view.query.push(ch)),
            DashboardCommand::PopQueryChar => self.update_view(|view| {
                view.query.pop();
            }),
            DashboardCommand::ClearQuery => self.update_view(|view| view.query.clear()),
            DashboardCommand::SetStatusFilter(filter) => {
                self.update_view(|view| view.status_filter = filter)
            }
            DashboardCommand::RotateStatusFilter(delta) => {
                self.update_view(|view| view.status_filter = view.status_filter.rotate(delta))
            }
            DashboardCommand::SetSortKey(key) => self.update_view(|view| view.sort_key = key),
            DashboardCommand::RotateSortKey(delta) => {
                self.update_view(|view| view.sort_key = view.sort_key.rotate(delta))
            }
            DashboardCommand::EnterSearch => self.set_input(InputMode::Search),
            DashboardCommand::ExitSearch => self.set_input(InputMode::Nav),
            DashboardCommand::SetStatus(message) => vec![self.set_status(message)],
            DashboardCommand::ClearStatus => {
                self.status_line = None;
                vec![DashboardEvent::StatusCleared]
            }
        }
    }

    /// Filtered, sorted rows for the current store and view. Recomputed only
    /// when either input changed since the last call.
    pub fn derived(&mut self) -> DerivedView<'_> {
        self.refresh_memo();
        self.memoized_view()
    }

    pub fn body(&mut self) -> DashboardBody<'_> {
        if self.load == LoadState::Ready {
            self.refresh_memo();
        }

        match &self.load {
            LoadState::Idle | LoadState::Loading { .. } => DashboardBody::Loading,
            LoadState::Failed { message } => DashboardBody::Failed(message),
            LoadState::Ready => {
                let view = self.memoized_view();
                if view.is_empty() {
                    DashboardBody::Empty
                } else {
                    DashboardBody::Rows(view)
                }
            }
        }
    }

    fn refresh_memo(&mut self) {
        let fresh = self.memo.as_ref().is_some_and(|memo| {
            memo.generation == self.store.generation() && memo.view == self.view
        });
        if fresh {
            return;
        }

        let records = self.store.records();
        let indices = visible_indices(records, &self.view);
        let summary = summarize(indices.iter().map(|index| &records[*index]));
        self.memo = Some(ViewMemo {
            generation: self.store.generation(),
            view: self.view.clone(),
            indices,
            summary,
        });
    }

    fn memoized_view(&self) -> DerivedView<'_> {
        let Some(memo) = &self.memo else {
            return DerivedView {
                rows: Vec::new(),
                summary: StatusSummary::default(),
            };
        };
        let records = self.store.records();
        DerivedView {
            rows: memo.indices.iter().map(|index| &records[*index]).collect(),
            summary: memo.summary,
        }
    }

    fn update_view(&mut self, edit: impl FnOnce(&mut ViewState)) -> Vec<DashboardEvent> {
        let before = self.view.clone();
        edit(&mut self.view);
        if self.view == before {
            return Vec::new();
        }
        vec![DashboardEvent::ViewChanged(self.view.clone())]
    }

    fn set_input(&mut self, mode: InputMode) -> Vec<DashboardEvent> {
        if self.input == mode {
            return Vec::new();
        }
        self.input = mode;
        vec![DashboardEvent::InputModeChanged(mode)]
    }

    fn set_status(&mut self, message: String) -> DashboardEvent {
        self.status_line = Some(message.clone());
        DashboardEvent::StatusUpdated(message)
    }
}

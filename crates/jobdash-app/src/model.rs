// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::ids::ApplicationId;

pub const UNKNOWN_PLACEHOLDER: &str = "(unknown)";
pub const EMPTY_PLACEHOLDER: &str = "—";

const NAIVE_DATE_TIME_FORMATS: [&[BorrowedFormatItem<'static>]; 3] = [
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
];
const CALENDAR_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");
const UPDATED_DISPLAY_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// One tracked job application as returned by retrieval. Every field except
/// the id is optional; absence is a valid state, not a decode failure. Text
/// fields also accept numbers (kept as decimal text) and drop any other JSON
/// type to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub company: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub role_title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated_at: Option<String>,
}

impl ApplicationRecord {
    pub fn new(id: impl Into<ApplicationId>) -> Self {
        Self {
            id: id.into(),
            company: None,
            role_title: None,
            location: None,
            status: None,
            last_updated_at: None,
        }
    }

    pub fn canonical_status(&self) -> CanonicalStatus {
        CanonicalStatus::normalize(self.status.as_deref())
    }

    /// Epoch milliseconds of `last_updated_at`, or `None` when absent or
    /// unparsable.
    pub fn updated_millis(&self) -> Option<i64> {
        self.last_updated_at
            .as_deref()
            .and_then(parse_timestamp)
            .map(epoch_millis)
    }

    pub fn company_label(&self) -> &str {
        self.company.as_deref().unwrap_or(UNKNOWN_PLACEHOLDER)
    }

    pub fn role_label(&self) -> &str {
        self.role_title.as_deref().unwrap_or(UNKNOWN_PLACEHOLDER)
    }

    pub fn location_label(&self) -> &str {
        self.location.as_deref().unwrap_or(EMPTY_PLACEHOLDER)
    }

    /// Badge text shows the raw status; only the badge colour is normalized.
    pub fn status_label(&self) -> &str {
        self.status
            .as_deref()
            .unwrap_or(CanonicalStatus::Other.as_str())
    }

    pub fn updated_label(&self) -> String {
        let Some(raw) = self.last_updated_at.as_deref() else {
            return EMPTY_PLACEHOLDER.to_owned();
        };
        parse_timestamp(raw)
            .and_then(|instant| {
                instant
                    .to_offset(UtcOffset::UTC)
                    .format(UPDATED_DISPLAY_FORMAT)
                    .ok()
            })
            .unwrap_or_else(|| raw.to_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanonicalStatus {
    Applied,
    Assessment,
    Interview,
    Offer,
    Rejected,
    Other,
}

impl CanonicalStatus {
    pub const ALL: [Self; 6] = [
        Self::Applied,
        Self::Assessment,
        Self::Interview,
        Self::Offer,
        Self::Rejected,
        Self::Other,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Assessment => "assessment",
            Self::Interview => "interview",
            Self::Offer => "offer",
            Self::Rejected => "rejected",
            Self::Other => "other",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Applied => "Applied",
            Self::Assessment => "Assessment",
            Self::Interview => "Interview",
            Self::Offer => "Offer",
            Self::Rejected => "Rejected",
            Self::Other => "Other",
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Applied => 0,
            Self::Assessment => 1,
            Self::Interview => 2,
            Self::Offer => 3,
            Self::Rejected => 4,
            Self::Other => 5,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "applied" => Some(Self::Applied),
            "assessment" => Some(Self::Assessment),
            "interview" => Some(Self::Interview),
            "offer" => Some(Self::Offer),
            "rejected" => Some(Self::Rejected),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Lower-cases the raw value; anything outside the canonical set,
    /// including an absent status, lands in `Other`.
    pub fn normalize(raw: Option<&str>) -> Self {
        raw.map(str::to_lowercase)
            .and_then(|value| Self::parse(&value))
            .unwrap_or(Self::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(CanonicalStatus),
}

impl StatusFilter {
    pub const ALL: [Self; 7] = [
        Self::All,
        Self::Only(CanonicalStatus::Applied),
        Self::Only(CanonicalStatus::Assessment),
        Self::Only(CanonicalStatus::Interview),
        Self::Only(CanonicalStatus::Offer),
        Self::Only(CanonicalStatus::Rejected),
        Self::Only(CanonicalStatus::Other),
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(status) => status.as_str(),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            other => CanonicalStatus::parse(other).map(Self::Only),
        }
    }

    pub fn accepts(self, status: CanonicalStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }

    pub fn rotate(self, delta: isize) -> Self {
        rotate_in(&Self::ALL, self, delta)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    #[default]
    Updated,
    Company,
    Status,
}

impl SortKey {
    pub const ALL: [Self; 3] = [Self::Updated, Self::Company, Self::Status];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::Company => "company",
            Self::Status => "status",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Updated => "last updated",
            Self::Company => "company",
            Self::Status => "status",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "updated" => Some(Self::Updated),
            "company" => Some(Self::Company),
            "status" => Some(Self::Status),
            _ => None,
        }
    }

    pub fn rotate(self, delta: isize) -> Self {
        rotate_in(&Self::ALL, self, delta)
    }
}

/// The three user-controlled parameters that drive the derived view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ViewState {
    pub query: String,
    pub status_filter: StatusFilter,
    pub sort_key: SortKey,
}

/// Parses RFC 3339 timestamps, ISO date-times without an offset (read as
/// UTC), bare calendar dates (midnight UTC) and integer epoch milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(parsed);
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(parsed) = PrimitiveDateTime::parse(raw, format) {
            return Some(parsed.assume_utc());
        }
    }

    if let Ok(date) = Date::parse(raw, CALENDAR_DATE_FORMAT) {
        return Some(date.midnight().assume_utc());
    }

    let millis: i64 = raw.parse().ok()?;
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
}

pub fn epoch_millis(instant: OffsetDateTime) -> i64 {
    (instant.unix_timestamp_nanos() / 1_000_000) as i64
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientText {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Other(IgnoredAny),
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LenientText>::deserialize(deserializer)?;
    Ok(match value {
        Some(LenientText::Text(text)) => Some(text),
        Some(LenientText::Integer(number)) => Some(number.to_string()),
        Some(LenientText::Unsigned(number)) => Some(number.to_string()),
        Some(LenientText::Float(number)) => Some(number.to_string()),
        Some(LenientText::Other(_)) | None => None,
    })
}

fn rotate_in<T: Copy + PartialEq>(items: &[T], current: T, delta: isize) -> T {
    let position = items
        .iter()
        .position(|item| *item == current)
        .unwrap_or(0) as isize;
    let len = items.len() as isize;
    let next = (position + delta).rem_euclid(len) as usize;
    items[next]
}

#[cfg(test)]
mod tests {
    use super::{
        ApplicationRecord, CanonicalStatus, EMPTY_PLACEHOLDER, SortKey, StatusFilter,
        UNKNOWN_PLACEHOLDER, ViewState, parse_timestamp,
    };
    use anyhow::Result;

    #[test]
    fn normalize_is_case_insensitive_and_falls_back_to_other() {
        assert_eq!(
            CanonicalStatus::normalize(Some("Applied")),
            CanonicalStatus::Applied
        );
        assert_eq!(
            CanonicalStatus::normalize(Some("OFFER")),
            CanonicalStatus::Offer
        );
        assert_eq!(CanonicalStatus::normalize(Some("")), CanonicalStatus::Other);
        assert_eq!(
            CanonicalStatus::normalize(Some("ghosted")),
            CanonicalStatus::Other
        );
        assert_eq!(CanonicalStatus::normalize(None), CanonicalStatus::Other);
    }

    #[test]
    fn canonical_status_round_trips_through_parse() {
        for status in CanonicalStatus::ALL {
            assert_eq!(CanonicalStatus::parse(status.as_str()), Some(status));
            assert_eq!(CanonicalStatus::ALL[status.index()], status);
        }
    }

    #[test]
    fn status_filter_parse_and_rotate() {
        assert_eq!(StatusFilter::parse("all"), Some(StatusFilter::All));
        assert_eq!(
            StatusFilter::parse("offer"),
            Some(StatusFilter::Only(CanonicalStatus::Offer))
        );
        assert_eq!(StatusFilter::parse("Offer"), None);
        assert_eq!(
            StatusFilter::All.rotate(-1),
            StatusFilter::Only(CanonicalStatus::Other)
        );
        assert_eq!(
            StatusFilter::Only(CanonicalStatus::Other).rotate(1),
            StatusFilter::All
        );
    }

    #[test]
    fn sort_key_rotation_wraps() {
        assert_eq!(SortKey::Updated.rotate(1), SortKey::Company);
        assert_eq!(SortKey::Status.rotate(1), SortKey::Updated);
        assert_eq!(SortKey::parse("status"), Some(SortKey::Status));
        assert_eq!(SortKey::parse("date"), None);
    }

    #[test]
    fn view_state_defaults() {
        let view = ViewState::default();
        assert!(view.query.is_empty());
        assert_eq!(view.status_filter, StatusFilter::All);
        assert_eq!(view.sort_key, SortKey::Updated);
    }

    #[test]
    fn parse_timestamp_accepts_common_iso_forms() -> Result<()> {
        let zulu = parse_timestamp("2024-05-01T10:00:00Z").expect("rfc3339");
        let offset = parse_timestamp("2024-05-01T12:00:00+02:00").expect("offset");
        assert_eq!(zulu, offset);

        let fractional = parse_timestamp("2024-05-01T10:00:00.123456Z").expect("fractional");
        assert_eq!(fractional.millisecond(), 123);

        let naive = parse_timestamp("2024-05-01T10:00:00").expect("naive");
        assert_eq!(naive, zulu);

        let date_only = parse_timestamp("2024-05-01").expect("date");
        assert_eq!(date_only.hour(), 0);

        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("   ").is_none());
        Ok(())
    }

    #[test]
    fn record_decodes_with_missing_and_unknown_fields() -> Result<()> {
        let record: ApplicationRecord = serde_json::from_str(
            r#"{"id":"a1","company":"Acme","status":null,"notes":"ignored","nextStep":"call"}"#,
        )?;
        assert_eq!(record.id.as_str(), "a1");
        assert_eq!(record.company.as_deref(), Some("Acme"));
        assert!(record.role_title.is_none());
        assert!(record.status.is_none());
        Ok(())
    }

    #[test]
    fn record_decodes_camel_case_fields() -> Result<()> {
        let record: ApplicationRecord = serde_json::from_str(
            r#"{"id":3,"roleTitle":"SRE","lastUpdatedAt":"2024-01-02T03:04:05Z"}"#,
        )?;
        assert_eq!(record.role_title.as_deref(), Some("SRE"));
        assert_eq!(record.updated_millis(), Some(1_704_164_645_000));
        Ok(())
    }

    #[test]
    fn record_decodes_mixed_field_types_best_effort() -> Result<()> {
        let records: Vec<ApplicationRecord> = serde_json::from_str(
            r#"[
                {"id":"1","company":"Acme","lastUpdatedAt":"2024-05-01T10:00:00Z"},
                {"id":"2","company":42,"location":{"city":"Oslo"},"status":true,"roleTitle":1.5,"lastUpdatedAt":1714557600000},
                {"id":"3","company":["x"],"lastUpdatedAt":false}
            ]"#,
        )?;
        assert_eq!(records.len(), 3);

        let mixed = &records[1];
        assert_eq!(mixed.company.as_deref(), Some("42"));
        assert_eq!(mixed.role_title.as_deref(), Some("1.5"));
        assert!(mixed.location.is_none());
        assert!(mixed.status.is_none());
        assert_eq!(mixed.last_updated_at.as_deref(), Some("1714557600000"));
        assert_eq!(mixed.updated_millis(), Some(1_714_557_600_000));
        assert_eq!(records[0].updated_millis(), mixed.updated_millis());
        assert_eq!(mixed.updated_label(), "2024-05-01 10:00");

        assert!(records[2].company.is_none());
        assert!(records[2].last_updated_at.is_none());
        Ok(())
    }

    #[test]
    fn presentation_labels_use_placeholders() {
        let record = ApplicationRecord::new("x");
        assert_eq!(record.company_label(), UNKNOWN_PLACEHOLDER);
        assert_eq!(record.role_label(), UNKNOWN_PLACEHOLDER);
        assert_eq!(record.location_label(), EMPTY_PLACEHOLDER);
        assert_eq!(record.status_label(), "other");
        assert_eq!(record.updated_label(), EMPTY_PLACEHOLDER);
    }

    #[test]
    fn updated_label_formats_utc_or_echoes_raw() {
        let mut record = ApplicationRecord::new("x");
        record.last_updated_at = Some("2024-05-01T12:30:00+02:00".to_owned());
        assert_eq!(record.updated_label(), "2024-05-01 10:30");

        record.last_updated_at = Some("soon".to_owned());
        assert_eq!(record.updated_label(), "soon");
    }

    #[test]
    fn status_label_keeps_raw_casing() {
        let mut record = ApplicationRecord::new("x");
        record.status = Some("Interview".to_owned());
        assert_eq!(record.status_label(), "Interview");
        assert_eq!(record.canonical_status(), CanonicalStatus::Interview);
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use jobdash_app::ApplicationRecord;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, Month, OffsetDateTime};

const REFERENCE_YEAR: i32 = 2026;
const HISTORY_DAYS: i64 = 180;

const COMPANIES: [&str; 20] = [
    "Acme Corp",
    "Globex",
    "Initech",
    "Umbrella Labs",
    "Hooli",
    "Vandelay Industries",
    "Stark Systems",
    "Wayne Analytics",
    "Tyrell Robotics",
    "Cyberdyne",
    "Soylent Foods",
    "Massive Dynamic",
    "Aperture Science",
    "Wonka Confections",
    "Gringotts Fintech",
    "Oscorp",
    "Monarch Solutions",
    "Pied Piper",
    "Nakatomi Trading",
    "Blue Sun",
];

const ROLE_LEVELS: [&str; 5] = ["Junior", "", "Senior", "Staff", "Principal"];
const ROLE_TITLES: [&str; 12] = [
    "Software Engineer",
    "Backend Engineer",
    "Frontend Engineer",
    "Platform Engineer",
    "Site Reliability Engineer",
    "Data Engineer",
    "Data Scientist",
    "Product Manager",
    "Security Engineer",
    "Mobile Developer",
    "QA Engineer",
    "Engineering Manager",
];

const LOCATIONS: [&str; 14] = [
    "Remote",
    "Remote, EU",
    "Berlin, DE",
    "London, UK",
    "Amsterdam, NL",
    "New York, NY",
    "Austin, TX",
    "Seattle, WA",
    "Toronto, ON",
    "Lisbon, PT",
    "Zurich, CH",
    "Denver, CO",
    "Dublin, IE",
    "Hybrid - Paris, FR",
];

/// Raw statuses as a backend might send them: canonical values, mixed
/// casing, and values that fall outside the canonical set.
const STATUSES: [&str; 12] = [
    "applied",
    "applied",
    "Applied",
    "assessment",
    "interview",
    "Interview",
    "offer",
    "rejected",
    "rejected",
    "REJECTED",
    "ghosted",
    "on hold",
];

const UNPARSABLE_TIMESTAMPS: [&str; 3] = ["pending", "last week", "n/a"];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    /// True roughly one time in `n`.
    fn one_in(&mut self, n: usize) -> bool {
        self.int_n(n) == 0
    }
}

/// Seeded generator of plausible application records. The same seed always
/// yields the same sequence.
#[derive(Debug, Clone)]
pub struct ApplicationFaker {
    rng: DeterministicRng,
    next_id: u64,
}

impl ApplicationFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn application(&mut self) -> ApplicationRecord {
        let mut record = ApplicationRecord::new(format!("app-{:04}", self.next_id));
        self.next_id += 1;

        record.company = (!self.rng.one_in(25)).then(|| self.pick(&COMPANIES).to_owned());
        record.role_title = (!self.rng.one_in(20)).then(|| self.role_title());
        record.location = (!self.rng.one_in(6)).then(|| self.pick(&LOCATIONS).to_owned());
        record.status = (!self.rng.one_in(12)).then(|| self.pick(&STATUSES).to_owned());
        record.last_updated_at = self.last_updated_at();
        record
    }

    pub fn applications(&mut self, count: usize) -> Vec<ApplicationRecord> {
        (0..count).map(|_| self.application()).collect()
    }

    fn role_title(&mut self) -> String {
        let level = self.pick(&ROLE_LEVELS);
        let title = self.pick(&ROLE_TITLES);
        if level.is_empty() {
            title.to_owned()
        } else {
            format!("{level} {title}")
        }
    }

    fn last_updated_at(&mut self) -> Option<String> {
        if self.rng.one_in(15) {
            return None;
        }
        if self.rng.one_in(20) {
            return Some(self.pick(&UNPARSABLE_TIMESTAMPS).to_owned());
        }

        let now = reference_now();
        let offset_seconds = self.rng.next_u64() % (HISTORY_DAYS as u64 * 86_400);
        let instant = now - Duration::seconds(offset_seconds as i64);
        if self.rng.one_in(8) {
            return Some(instant.date().to_string());
        }
        instant.format(&Rfc3339).ok()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

/// The three-record data set used across the view pipeline scenarios.
pub fn scenario_records() -> Vec<ApplicationRecord> {
    [
        (1_i64, "Applied", "Acme"),
        (2, "offer", "Globex"),
        (3, "", "Initech"),
    ]
    .into_iter()
    .map(|(id, status, company)| {
        let mut record = ApplicationRecord::new(id);
        record.status = Some(status.to_owned());
        record.company = Some(company.to_owned());
        record
    })
    .collect()
}

pub fn write_records_json(path: &Path, records: &[ApplicationRecord]) -> Result<()> {
    let encoded = serde_json::to_string_pretty(records).context("encode records")?;
    std::fs::write(path, encoded).with_context(|| format!("write {}", path.display()))
}

pub fn temp_export_dir() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let export_dir = dir.path().join("exports");
    std::fs::create_dir_all(&export_dir)
        .with_context(|| format!("create {}", export_dir.display()))?;
    Ok((dir, export_dir))
}

pub fn fixture_datetime() -> &'static str {
    "2026-02-19T12:34:56Z"
}

pub fn companies() -> &'static [&'static str] {
    &COMPANIES
}

fn reference_now() -> OffsetDateTime {
    Date::from_calendar_date(REFERENCE_YEAR, Month::January, 1)
        .map(|date| date.midnight().assume_utc())
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::{ApplicationFaker, companies, fixture_datetime, scenario_records};
    use jobdash_app::{CanonicalStatus, parse_timestamp};
    use std::collections::BTreeSet;

    #[test]
    fn same_seed_same_records() {
        let first = ApplicationFaker::new(7).applications(25);
        let second = ApplicationFaker::new(7).applications(25);
        assert_eq!(first, second);
    }

    #[test]
    fn ids_are_unique() {
        let records = ApplicationFaker::new(3).applications(200);
        let ids = records
            .iter()
            .map(|record| record.id.clone())
            .collect::<BTreeSet<_>>();
        assert_eq!(ids.len(), records.len());
    }

    #[test]
    fn variety_covers_absent_fields_and_other_statuses() {
        let records = ApplicationFaker::new(11).applications(400);
        assert!(records.iter().any(|record| record.location.is_none()));
        assert!(records.iter().any(|record| record.status.is_none()));
        assert!(records.iter().any(|record| record.last_updated_at.is_none()));
        assert!(
            records
                .iter()
                .any(|record| record.canonical_status() == CanonicalStatus::Other)
        );
        assert!(
            records
                .iter()
                .any(|record| record.canonical_status() == CanonicalStatus::Offer)
        );
    }

    #[test]
    fn generated_companies_come_from_the_catalog() {
        let records = ApplicationFaker::new(5).applications(100);
        for company in records.iter().filter_map(|record| record.company.as_deref()) {
            assert!(companies().contains(&company), "unexpected {company}");
        }
    }

    #[test]
    fn variety_across_seeds() {
        let mut names = BTreeSet::new();
        for seed in 0_u64..20_u64 {
            let mut faker = ApplicationFaker::new(seed);
            if let Some(company) = faker.application().company {
                names.insert(company);
            }
        }
        assert!(names.len() >= 8, "got {}", names.len());
    }

    #[test]
    fn scenario_records_match_fixture_shape() {
        let records = scenario_records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id.as_str(), "1");
        assert_eq!(records[2].canonical_status(), CanonicalStatus::Other);
    }

    #[test]
    fn fixture_datetime_parses() {
        assert!(parse_timestamp(fixture_datetime()).is_some());
    }

    #[test]
    fn int_n() {
        let mut faker = ApplicationFaker::new(42);
        for _ in 0..100 {
            let value = faker.int_n(5);
            assert!(value < 5);
        }
    }
}

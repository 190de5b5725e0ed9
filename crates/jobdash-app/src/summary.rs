// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{ApplicationRecord, CanonicalStatus};

/// Per-status counts over the visible rows. Every canonical status has a
/// bucket, including `other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSummary {
    pub total: usize,
    counts: [usize; CanonicalStatus::ALL.len()],
}

impl StatusSummary {
    pub fn count(&self, status: CanonicalStatus) -> usize {
        self.counts[status.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalStatus, usize)> + '_ {
        CanonicalStatus::ALL
            .into_iter()
            .map(|status| (status, self.count(status)))
    }

    pub fn bucket_sum(&self) -> usize {
        self.counts.iter().sum()
    }
}

pub fn summarize<'a, I>(rows: I) -> StatusSummary
where
    I: IntoIterator<Item = &'a ApplicationRecord>,
{
    let mut summary = StatusSummary::default();
    for row in rows {
        summary.counts[row.canonical_status().index()] += 1;
        summary.total += 1;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::summarize;
    use crate::{ApplicationRecord, CanonicalStatus};
    use proptest::prelude::*;

    fn with_status(id: i64, status: Option<&str>) -> ApplicationRecord {
        let mut record = ApplicationRecord::new(id);
        record.status = status.map(str::to_owned);
        record
    }

    #[test]
    fn empty_input_has_zeroed_buckets() {
        let summary = summarize(std::iter::empty());
        assert_eq!(summary.total, 0);
        assert!(summary.iter().all(|(_, count)| count == 0));
        assert_eq!(summary.iter().count(), CanonicalStatus::ALL.len());
    }

    #[test]
    fn mixed_case_and_unknown_statuses_bucket_correctly() {
        let rows = vec![
            with_status(1, Some("Interview")),
            with_status(2, Some("interview")),
            with_status(3, Some("Ghosted")),
            with_status(4, None),
            with_status(5, Some("REJECTED")),
        ];
        let summary = summarize(&rows);
        assert_eq!(summary.count(CanonicalStatus::Interview), 2);
        assert_eq!(summary.count(CanonicalStatus::Rejected), 1);
        assert_eq!(summary.count(CanonicalStatus::Other), 2);
        assert_eq!(summary.count(CanonicalStatus::Applied), 0);
        assert_eq!(summary.total, 5);
    }

    proptest! {
        #[test]
        fn total_and_bucket_sum_equal_row_count(
            statuses in proptest::collection::vec(proptest::option::of("[A-Za-z]{0,10}"), 0..64),
        ) {
            let rows = statuses
                .into_iter()
                .enumerate()
                .map(|(index, status)| {
                    let mut record = ApplicationRecord::new(index as i64);
                    record.status = status;
                    record
                })
                .collect::<Vec<_>>();
            let summary = summarize(&rows);
            prop_assert_eq!(summary.total, rows.len());
            prop_assert_eq!(summary.bucket_sum(), rows.len());
        }
    }
}

/*
 *  Podio - Discord bot maintaining a point-based ranking for a guild.
 *  Copyright (C) 2025  Podio contributors
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */
use crate::store::{ScoreRecord, Store};

/**
 * One entry of the sorted leaderboard view. Derived from the store on demand,
 * never persisted.
 */
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Clone, PartialEq, Eq)]
pub struct SortedEntry {
    pub user_id: String,
    pub points: i64,
}

/**
 * The canonical leaderboard ordering consumed by both renderers: descending by
 * points, ties broken by ascending creation time (records without a creation
 * time sort after those with one), then by user id.
 *
 * The last tie-break exists so that repeated calls over the same store
 * snapshot always produce an identical ordering; pagination slices this list,
 * and two pages rendered moments apart must not duplicate or skip users.
 */
pub fn sorted_entries(
    mut records: Vec<(String, ScoreRecord)>,
    limit: Option<usize>,
) -> Vec<SortedEntry> {
    records.sort_by(|(id_a, rec_a), (id_b, rec_b)| {
        rec_b
            .points()
            .cmp(rec_a.points())
            .then_with(|| {
                let at_a = rec_a.created_at().unwrap_or(i64::MAX);
                let at_b = rec_b.created_at().unwrap_or(i64::MAX);
                at_a.cmp(&at_b)
            })
            .then_with(|| id_a.cmp(id_b))
    });

    let mut entries: Vec<SortedEntry> = records
        .into_iter()
        .map(|(user_id, record)| SortedEntry {
            user_id,
            points: *record.points(),
        })
        .collect();
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    entries
}

/**
 * Reads the store and returns the sorted leaderboard view, optionally
 * truncated to `limit` entries.
 */
pub async fn get_sorted(store: &Store, limit: Option<usize>) -> Vec<SortedEntry> {
    sorted_entries(store.get_all().await, limit)
}

/**
 * The slice of the leaderboard shown on a 1-based page, along with the global
 * index of its first entry. An out-of-range page yields an empty slice.
 */
pub fn page_slice(entries: &[SortedEntry], page: usize, per_page: usize) -> (usize, &[SortedEntry]) {
    let per_page = per_page.max(1);
    let start = page.saturating_sub(1).saturating_mul(per_page);
    let end = start.saturating_add(per_page).min(entries.len());
    if start >= entries.len() {
        (start, &[])
    } else {
        (start, &entries[start..end])
    }
}

/// Total number of pages for a leaderboard of `total` entries (at least 1).
pub fn page_count(total: usize, per_page: usize) -> usize {
    total.div_ceil(per_page.max(1)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(points: i64, created_at: Option<i64>) -> ScoreRecord {
        serde_json::from_str(&match created_at {
            Some(at) => format!(r#"{{ "points": {points}, "createdAt": {at} }}"#),
            None => format!(r#"{{ "points": {points} }}"#),
        })
        .unwrap()
    }

    #[test]
    fn sorts_descending_by_points() {
        let entries = sorted_entries(
            vec![
                ("C".into(), record(10, None)),
                ("A".into(), record(50, Some(1))),
                ("B".into(), record(30, Some(2))),
            ],
            None,
        );
        let points: Vec<i64> = entries.iter().map(|e| e.points).collect();
        assert_eq!(points, vec![50, 30, 10]);
    }

    #[test]
    fn ties_break_by_earliest_creation() {
        // A and B tied on 50 points; A was created first.
        let entries = sorted_entries(
            vec![
                ("B".into(), record(50, Some(200))),
                ("C".into(), record(10, Some(50))),
                ("A".into(), record(50, Some(100))),
            ],
            None,
        );
        let ids: Vec<&str> = entries.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn entries_without_creation_time_sort_after_their_tie() {
        let entries = sorted_entries(
            vec![
                ("B".into(), record(50, None)),
                ("A".into(), record(50, Some(100))),
            ],
            None,
        );
        let ids: Vec<&str> = entries.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn ordering_is_deterministic_for_a_fixed_snapshot() {
        let records = vec![
            ("B".into(), record(5, None)),
            ("A".into(), record(5, None)),
            ("C".into(), record(5, None)),
        ];
        let first = sorted_entries(records.clone(), None);
        let second = sorted_entries(records, None);
        assert_eq!(first, second);
    }

    #[test]
    fn limit_truncates_the_view() {
        let entries = sorted_entries(
            vec![
                ("A".into(), record(3, Some(1))),
                ("B".into(), record(2, Some(2))),
                ("C".into(), record(1, Some(3))),
            ],
            Some(2),
        );
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].user_id, "A");
    }

    #[test]
    fn empty_store_yields_an_empty_view() {
        assert!(sorted_entries(Vec::new(), None).is_empty());
    }

    #[test]
    fn page_slice_is_one_based_and_tolerates_overflow() {
        let entries = sorted_entries(
            vec![
                ("A".into(), record(5, Some(1))),
                ("B".into(), record(4, Some(2))),
                ("C".into(), record(3, Some(3))),
            ],
            None,
        );

        let (start, slice) = page_slice(&entries, 1, 2);
        assert_eq!(start, 0);
        assert_eq!(slice.len(), 2);

        let (start, slice) = page_slice(&entries, 2, 2);
        assert_eq!(start, 2);
        assert_eq!(slice.len(), 1);

        let (_, slice) = page_slice(&entries, 3, 2);
        assert!(slice.is_empty());
    }

    #[test]
    fn page_count_rounds_up_and_never_reports_zero_pages() {
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
    }
}

//! Keyed upsert into the curated tier.
//!
//! The merge matches on the composite key (id, published_at): a matched
//! target row has every column updated from the source (last write wins), an
//! unmatched source row is inserted. Replaying the same source batch is a
//! no-op on the second pass, which is what makes the silver stage idempotent.

use super::batch::{row_key, SilverRow};
use std::collections::HashMap;

/// Merge source rows into target rows by (id, published_at).
///
/// Source rows without a complete key cannot match anything and are
/// inserted as-is. Returns the merged row set; target order is preserved,
/// inserts append in source order.
///
/// Duplicate keys already present in the target collapse to their last
/// copy. A rewrite interrupted between its write and delete phases leaves
/// the same rows in two files, so the merge cannot assume the target is
/// clean.
pub fn merge_rows(target: Vec<SilverRow>, source: &[SilverRow]) -> Vec<SilverRow> {
    let mut merged: Vec<SilverRow> = Vec::with_capacity(target.len() + source.len());
    let mut index: HashMap<(i64, i64), usize> = HashMap::with_capacity(target.len());

    for row in target {
        match row_key(&row).and_then(|key| index.get(&key).copied()) {
            Some(position) => merged[position] = row,
            None => {
                if let Some(key) = row_key(&row) {
                    index.insert(key, merged.len());
                }
                merged.push(row);
            }
        }
    }

    for row in source {
        match row_key(row).and_then(|key| index.get(&key).copied()) {
            Some(position) => merged[position] = row.clone(),
            None => {
                if let Some(key) = row_key(row) {
                    index.insert(key, merged.len());
                }
                merged.push(row.clone());
            }
        }
    }

    merged
}

/// Maximum `published_at` across rows, the curated tier's high-water mark.
pub fn max_published_at_micros(rows: &[SilverRow]) -> Option<i64> {
    rows.iter().filter_map(super::batch::row_published_at).max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::silver::batch::tests::test_row;
    use crate::silver::batch::Scalar;
    use crate::schema::COLUMNS;

    fn price_of(row: &SilverRow) -> Option<f64> {
        let index = COLUMNS.iter().position(|c| c.name == "pricing_price")?;
        match row[index] {
            Scalar::Float(v) => Some(v),
            _ => None,
        }
    }

    #[test]
    fn test_merge_updates_match_and_inserts_rest() {
        let target = vec![test_row(1, "2024-03-15T10:00:00", 100.0)];
        let source = vec![
            test_row(1, "2024-03-15T10:00:00", 150.0),
            test_row(2, "2024-03-16T09:00:00", 200.0),
        ];

        let merged = merge_rows(target, &source);

        assert_eq!(merged.len(), 2);
        assert_eq!(price_of(&merged[0]), Some(150.0));
        assert_eq!(price_of(&merged[1]), Some(200.0));
    }

    #[test]
    fn test_merge_key_needs_both_halves() {
        // Same id, different published_at: distinct keys, both rows kept.
        let target = vec![test_row(1, "2024-03-15T10:00:00", 100.0)];
        let source = vec![test_row(1, "2024-03-17T10:00:00", 130.0)];

        let merged = merge_rows(target, &source);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let target = vec![test_row(1, "2024-03-15T10:00:00", 100.0)];
        let source = vec![
            test_row(1, "2024-03-15T10:00:00", 150.0),
            test_row(2, "2024-03-16T09:00:00", 200.0),
        ];

        let once = merge_rows(target.clone(), &source);
        let twice = merge_rows(once.clone(), &source);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_collapses_duplicate_target_keys() {
        // An interrupted rewrite can leave the same key in two files; the
        // next merge must restore one row per key, keeping the last copy.
        let target = vec![
            test_row(1, "2024-03-15T10:00:00", 100.0),
            test_row(1, "2024-03-15T10:00:00", 120.0),
        ];
        let source = vec![test_row(2, "2024-03-16T09:00:00", 200.0)];

        let merged = merge_rows(target, &source);
        assert_eq!(merged.len(), 2);
        assert_eq!(price_of(&merged[0]), Some(120.0));
        assert_eq!(price_of(&merged[1]), Some(200.0));
    }

    #[test]
    fn test_merge_deduplicates_within_source() {
        // Two source rows with the same key: the later one wins.
        let source = vec![
            test_row(5, "2024-03-15T10:00:00", 100.0),
            test_row(5, "2024-03-15T10:00:00", 110.0),
        ];

        let merged = merge_rows(Vec::new(), &source);
        assert_eq!(merged.len(), 1);
        assert_eq!(price_of(&merged[0]), Some(110.0));
    }

    #[test]
    fn test_max_published_at() {
        let rows = vec![
            test_row(1, "2024-03-15T10:00:00", 1.0),
            test_row(2, "2024-03-16T09:00:00", 2.0),
        ];
        let max = max_published_at_micros(&rows).unwrap();
        assert_eq!(
            crate::coerce::micros_to_datetime(max).unwrap().to_string(),
            "2024-03-16 09:00:00"
        );
    }
}

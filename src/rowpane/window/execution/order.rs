//! Ordering: sorts partition rows by ORDER BY keys and tracks peer groups.
//!
//! A peer group is a maximal run of rows that compare equal under every
//! order key. Ranking functions are defined entirely in terms of peer
//! metadata, and RANGE CURRENT ROW bounds expand to the current row's peer
//! group, so both bounds and dense group ids are precomputed here in one
//! O(n) pass over the sorted partition.
//!
//! The sort is stable, which keeps runs repeatable, but the relative order
//! of rows inside a peer group is not part of the engine contract.

use crate::rowpane::window::execution::partition::Partition;
use crate::rowpane::window::execution::types::{compare_field_values, FieldValue, Row};
use crate::rowpane::window::spec::{NullOrdering, OrderKey, SortDirection};
use std::cmp::Ordering;

/// A partition sorted by its ORDER BY keys, with peer-group metadata
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedPartition {
    /// Original row indices in sorted order
    pub rows: Vec<usize>,
    /// Per-position peer bounds (start inclusive, end exclusive)
    pub peers: Vec<(usize, usize)>,
    /// Per-position dense peer-group id, 0-based
    pub group_ids: Vec<usize>,
    /// Number of distinct peer groups
    pub group_count: usize,
}

impl OrderedPartition {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Peer bounds (start inclusive, end exclusive) for a sorted position
    pub fn peer_bounds(&self, position: usize) -> (usize, usize) {
        self.peers[position]
    }
}

/// Compare two values under one order key: null placement first, then the
/// value comparison with the key's direction applied.
fn compare_with_key(a: &FieldValue, b: &FieldValue, key: &OrderKey) -> Ordering {
    let a_null = matches!(a, FieldValue::Null);
    let b_null = matches!(b, FieldValue::Null);

    match (a_null, b_null) {
        (true, true) => Ordering::Equal,
        (true, false) => match key.effective_nulls() {
            NullOrdering::First => Ordering::Less,
            NullOrdering::Last => Ordering::Greater,
        },
        (false, true) => match key.effective_nulls() {
            NullOrdering::First => Ordering::Greater,
            NullOrdering::Last => Ordering::Less,
        },
        (false, false) => {
            let cmp = compare_field_values(a, b);
            match key.direction {
                SortDirection::Asc => cmp,
                SortDirection::Desc => cmp.reverse(),
            }
        }
    }
}

/// Compare two rows under the full order spec, left to right
pub(crate) fn compare_rows(a: &Row, b: &Row, order_by: &[OrderKey]) -> Ordering {
    for key in order_by {
        let result = compare_with_key(&a.column(&key.column), &b.column(&key.column), key);
        if result != Ordering::Equal {
            return result;
        }
    }
    Ordering::Equal
}

/// Sort one partition by the order spec and compute its peer metadata.
///
/// With an empty order spec the partition keeps input order and forms a
/// single peer group.
pub fn order_partition(
    rows: &[Row],
    partition: &Partition,
    order_by: &[OrderKey],
) -> OrderedPartition {
    let mut sorted = partition.rows.clone();
    let n = sorted.len();

    if order_by.is_empty() {
        let peers = vec![(0, n); n];
        let group_ids = vec![0; n];
        return OrderedPartition {
            rows: sorted,
            peers,
            group_ids,
            group_count: if n == 0 { 0 } else { 1 },
        };
    }

    // Stable sort so repeated runs produce the same layout for tied rows
    sorted.sort_by(|&ia, &ib| compare_rows(&rows[ia], &rows[ib], order_by));

    // Walk maximal runs of equal rows to assign peer bounds and group ids
    let mut peers = Vec::with_capacity(n);
    let mut group_ids = Vec::with_capacity(n);
    let mut group_count = 0;
    let mut start = 0;

    while start < n {
        let mut end = start + 1;
        while end < n
            && compare_rows(&rows[sorted[start]], &rows[sorted[end]], order_by) == Ordering::Equal
        {
            end += 1;
        }
        for _ in start..end {
            peers.push((start, end));
            group_ids.push(group_count);
        }
        group_count += 1;
        start = end;
    }

    OrderedPartition {
        rows: sorted,
        peers,
        group_ids,
        group_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(amount: FieldValue) -> Row {
        let mut fields = HashMap::new();
        fields.insert("amount".to_string(), amount);
        Row::new(fields)
    }

    fn whole_partition(rows: &[Row]) -> Partition {
        Partition {
            key: Vec::new(),
            rows: (0..rows.len()).collect(),
        }
    }

    fn sorted_amounts(rows: &[Row], ordered: &OrderedPartition) -> Vec<FieldValue> {
        ordered.rows.iter().map(|&i| rows[i].column("amount")).collect()
    }

    #[test]
    fn test_desc_sort_with_ties() {
        let rows: Vec<Row> = [60, 30, 40, 40, 20]
            .iter()
            .map(|&n| row(FieldValue::Integer(n)))
            .collect();
        let ordered = order_partition(&rows, &whole_partition(&rows), &[OrderKey::desc("amount")]);

        assert_eq!(
            sorted_amounts(&rows, &ordered),
            vec![
                FieldValue::Integer(60),
                FieldValue::Integer(40),
                FieldValue::Integer(40),
                FieldValue::Integer(30),
                FieldValue::Integer(20),
            ]
        );
        assert_eq!(ordered.peers, vec![(0, 1), (1, 3), (1, 3), (3, 4), (4, 5)]);
        assert_eq!(ordered.group_ids, vec![0, 1, 1, 2, 3]);
        assert_eq!(ordered.group_count, 4);
    }

    #[test]
    fn test_null_placement_default_asc_first_desc_last() {
        let rows = vec![
            row(FieldValue::Integer(5)),
            row(FieldValue::Null),
            row(FieldValue::Integer(1)),
        ];

        let asc = order_partition(&rows, &whole_partition(&rows), &[OrderKey::asc("amount")]);
        assert_eq!(
            sorted_amounts(&rows, &asc),
            vec![FieldValue::Null, FieldValue::Integer(1), FieldValue::Integer(5)]
        );

        let desc = order_partition(&rows, &whole_partition(&rows), &[OrderKey::desc("amount")]);
        assert_eq!(
            sorted_amounts(&rows, &desc),
            vec![FieldValue::Integer(5), FieldValue::Integer(1), FieldValue::Null]
        );
    }

    #[test]
    fn test_explicit_nulls_placement_overrides_default() {
        let rows = vec![
            row(FieldValue::Integer(5)),
            row(FieldValue::Null),
            row(FieldValue::Integer(1)),
        ];
        let ordered = order_partition(
            &rows,
            &whole_partition(&rows),
            &[OrderKey::asc("amount").nulls_last()],
        );
        assert_eq!(
            sorted_amounts(&rows, &ordered),
            vec![FieldValue::Integer(1), FieldValue::Integer(5), FieldValue::Null]
        );
    }

    #[test]
    fn test_nulls_form_one_peer_group() {
        let rows = vec![
            row(FieldValue::Null),
            row(FieldValue::Integer(1)),
            row(FieldValue::Null),
        ];
        let ordered = order_partition(&rows, &whole_partition(&rows), &[OrderKey::asc("amount")]);

        assert_eq!(ordered.peers[0], (0, 2), "both NULL rows share one peer group");
        assert_eq!(ordered.peers[1], (0, 2));
        assert_eq!(ordered.peers[2], (2, 3));
        assert_eq!(ordered.group_count, 2);
    }

    #[test]
    fn test_empty_order_by_is_single_peer_group() {
        let rows: Vec<Row> = [3, 1, 2].iter().map(|&n| row(FieldValue::Integer(n))).collect();
        let ordered = order_partition(&rows, &whole_partition(&rows), &[]);

        assert_eq!(ordered.rows, vec![0, 1, 2], "input order preserved");
        assert_eq!(ordered.peers, vec![(0, 3); 3]);
        assert_eq!(ordered.group_count, 1);
    }

    #[test]
    fn test_multi_key_ordering() {
        let mk = |region: &str, amount: i64| {
            let mut fields = HashMap::new();
            fields.insert(
                "region".to_string(),
                FieldValue::String(region.to_string()),
            );
            fields.insert("amount".to_string(), FieldValue::Integer(amount));
            Row::new(fields)
        };
        let rows = vec![mk("b", 1), mk("a", 2), mk("a", 1)];
        let ordered = order_partition(
            &rows,
            &whole_partition(&rows),
            &[OrderKey::asc("region"), OrderKey::desc("amount")],
        );

        assert_eq!(ordered.rows, vec![1, 2, 0]);
        assert_eq!(ordered.group_count, 3);
    }
}

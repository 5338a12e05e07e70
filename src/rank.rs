//! Rank reconciliation.
//!
//! Produces a complete rank assignment from records whose rank column may be
//! missing entirely, partially blank, or authored by hand. Authored ranks are
//! kept as given; unset ranks fill the next available slot after the ranked
//! records that precede them. Duplicated or decreasing authored ranks are
//! left as authored rather than renumbered.

use std::cmp::Ordering;

use crate::normalize::{Record, Refresh};

/// A record whose rank is defined.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRecord {
    pub rank: i64,
    pub name: String,
    pub value: f64,
    pub refresh: Option<Refresh>,
    pub group: Option<String>,
}

impl RankedRecord {
    fn assign(record: Record, rank: i64) -> Self {
        Self {
            rank,
            name: record.name,
            value: record.value,
            refresh: record.refresh,
            group: record.group,
        }
    }
}

impl From<RankedRecord> for Record {
    fn from(ranked: RankedRecord) -> Self {
        Record {
            rank: Some(ranked.rank),
            name: ranked.name,
            value: ranked.value,
            refresh: ranked.refresh,
            group: ranked.group,
        }
    }
}

fn by_value_desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// Assigns every record a rank and returns them in rank order.
pub fn reconcile(records: Vec<Record>) -> Vec<RankedRecord> {
    let mut records = records;
    if records.iter().all(|record| record.rank.is_none()) {
        records.sort_by(|a, b| by_value_desc(a.value, b.value));
        return records
            .into_iter()
            .zip(1..)
            .map(|(record, rank)| RankedRecord::assign(record, rank))
            .collect();
    }

    records.sort_by(|a, b| match (a.rank, b.rank) {
        (Some(left), Some(right)) => left
            .cmp(&right)
            .then_with(|| by_value_desc(a.value, b.value)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => by_value_desc(a.value, b.value),
    });

    let mut next = 1i64;
    records
        .into_iter()
        .map(|record| match record.rank {
            Some(authored) => {
                next = next.max(authored.saturating_add(1));
                RankedRecord::assign(record, authored)
            }
            None => {
                let rank = next;
                next = next.saturating_add(1);
                RankedRecord::assign(record, rank)
            }
        })
        .collect()
}

/// A record placed in the combined cross-group ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct Standing<'a> {
    pub overall_rank: i64,
    pub record: &'a RankedRecord,
}

/// Ranks the union of several groups by descending value, ties kept in
/// group order then in-group order. The per-group ranks are untouched.
pub fn overall_standings<'a, I>(groups: I) -> Vec<Standing<'a>>
where
    I: IntoIterator<Item = &'a [RankedRecord]>,
{
    let mut union = groups.into_iter().flatten().collect::<Vec<_>>();
    union.sort_by(|a, b| by_value_desc(a.value, b.value));
    union
        .into_iter()
        .zip(1..)
        .map(|(record, overall_rank)| Standing {
            overall_rank,
            record,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranks(ranked: &[RankedRecord]) -> Vec<(&str, i64)> {
        ranked.iter().map(|r| (r.name.as_str(), r.rank)).collect()
    }

    #[test]
    fn unranked_input_is_ranked_by_value() {
        let ranked = reconcile(vec![
            Record::new("low", 10.0),
            Record::new("high", 300.0),
            Record::new("mid", 50.0),
        ]);
        assert_eq!(ranks(&ranked), vec![("high", 1), ("mid", 2), ("low", 3)]);
    }

    #[test]
    fn value_ties_keep_encounter_order() {
        let ranked = reconcile(vec![
            Record::new("first", 5.0),
            Record::new("second", 5.0),
            Record::new("top", 9.0),
        ]);
        assert_eq!(ranks(&ranked), vec![("top", 1), ("first", 2), ("second", 3)]);
    }

    #[test]
    fn unset_rank_fills_next_slot_after_authored_ranks() {
        let ranked = reconcile(vec![
            Record::new("A", 500.0),
            Record::new("B", 900.0).with_rank(1),
        ]);
        assert_eq!(ranks(&ranked), vec![("B", 1), ("A", 2)]);
    }

    #[test]
    fn gaps_after_authored_ranks_are_not_reused() {
        let ranked = reconcile(vec![
            Record::new("x", 1.0).with_rank(1),
            Record::new("y", 2.0).with_rank(4),
            Record::new("u1", 70.0),
            Record::new("u2", 80.0),
        ]);
        assert_eq!(
            ranks(&ranked),
            vec![("x", 1), ("y", 4), ("u2", 5), ("u1", 6)]
        );
    }

    #[test]
    fn duplicated_authored_ranks_are_kept_as_authored() {
        let ranked = reconcile(vec![
            Record::new("a", 10.0).with_rank(2),
            Record::new("b", 20.0).with_rank(2),
            Record::new("c", 5.0),
        ]);
        assert_eq!(ranks(&ranked), vec![("b", 2), ("a", 2), ("c", 3)]);
    }

    #[test]
    fn non_positive_authored_ranks_sort_first() {
        let ranked = reconcile(vec![
            Record::new("a", 10.0).with_rank(1),
            Record::new("zero", 20.0).with_rank(0),
            Record::new("u", 1.0),
        ]);
        assert_eq!(ranks(&ranked), vec![("zero", 0), ("a", 1), ("u", 2)]);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(reconcile(Vec::new()).is_empty());
    }

    #[test]
    fn overall_standings_rank_across_groups_without_touching_group_ranks() {
        let male = reconcile(vec![Record::new("m1", 100.0), Record::new("m2", 10.0)]);
        let female = reconcile(vec![Record::new("f1", 50.0)]);
        let standings = overall_standings([male.as_slice(), female.as_slice()]);
        let combined = standings
            .iter()
            .map(|s| (s.record.name.as_str(), s.overall_rank, s.record.rank))
            .collect::<Vec<_>>();
        assert_eq!(
            combined,
            vec![("m1", 1, 1), ("f1", 2, 1), ("m2", 3, 2)]
        );
    }
}

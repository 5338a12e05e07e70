use crate::{normalize::Refresh, rank::RankedRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub total: f64,
    pub average: f64,
    pub refresh: Option<Refresh>,
    /// First encountered on ties.
    pub leader: Option<(String, f64)>,
}

pub fn summarize(records: &[RankedRecord]) -> Summary {
    let count = records.len();
    let total = records.iter().map(|r| r.value).sum::<f64>();
    let average = if count == 0 {
        0.0
    } else {
        (total / count as f64).round()
    };
    let refresh = records.iter().find_map(|r| r.refresh.clone());
    let leader = records
        .iter()
        .reduce(|best, r| if r.value > best.value { r } else { best })
        .map(|r| (r.name.clone(), r.value));
    Summary {
        count,
        total,
        average,
        refresh,
        leader,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, value: f64, refresh: Option<&str>) -> RankedRecord {
        RankedRecord {
            rank: 0,
            name: name.to_string(),
            value,
            refresh: refresh.map(|r| Refresh::Text(r.to_string())),
            group: None,
        }
    }

    #[test]
    fn summary_reports_totals_average_and_leader() {
        let summary = summarize(&[
            record("a", 10.0, None),
            record("b", 25.0, Some("2024-01-01 10:00")),
            record("c", 25.0, Some("later")),
        ]);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.total, 60.0);
        assert_eq!(summary.average, 20.0);
        assert_eq!(summary.refresh, Some(Refresh::Text("2024-01-01 10:00".to_string())));
        assert_eq!(summary.leader, Some(("b".to_string(), 25.0)));
    }

    #[test]
    fn empty_summary_is_zeroed() {
        let summary = summarize(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average, 0.0);
        assert!(summary.leader.is_none());
        assert!(summary.refresh.is_none());
    }
}

//! Frequency ranking over parsed field records.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexSet;
use logsentry_core::{AnalyzeError, FieldRecord, RankedGroup};

/// Groups record values by frequency and assigns dense ranks.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankAggregator;

impl RankAggregator {
    /// Create a new aggregator.
    pub fn new() -> Self {
        Self
    }

    /// Rank the values of every record whose key is `filter_key`.
    ///
    /// Values with the same hit count share a rank; ranks are dense and
    /// start at 1. At most `limit` rank tiers are returned, so a tier may
    /// hold any number of values. Within a tier, values are sorted ascending
    /// with absent values first.
    ///
    /// Fails with [`AnalyzeError::EmptyInput`] only when `records` itself is
    /// empty. No record matching `filter_key` gives an empty result.
    pub fn rank(
        &self,
        records: &[FieldRecord],
        filter_key: &str,
        limit: usize,
    ) -> Result<Vec<RankedGroup>, AnalyzeError> {
        if records.is_empty() {
            return Err(AnalyzeError::EmptyInput);
        }

        let mut frequencies: HashMap<Option<&str>, usize> = HashMap::new();
        for record in records.iter().filter(|r| r.key == filter_key) {
            *frequencies.entry(record.value_str()).or_default() += 1;
        }

        // Hit count -> values with that count.
        let mut tiers: BTreeMap<usize, Vec<Option<&str>>> = BTreeMap::new();
        for (value, count) in frequencies {
            tiers.entry(count).or_default().push(value);
        }

        let groups = tiers
            .into_iter()
            .rev()
            .take(limit)
            .enumerate()
            .map(|(index, (hit_count, mut items))| {
                items.sort_unstable();
                RankedGroup::new(
                    index + 1,
                    hit_count,
                    items.into_iter().map(|v| v.map(str::to_owned)).collect(),
                )
            })
            .collect();

        Ok(groups)
    }

    /// Distinct values of records keyed `filter_key`, in first-seen order.
    ///
    /// Fails with [`AnalyzeError::EmptyInput`] when `records` is empty.
    pub fn distinct_values(
        &self,
        records: &[FieldRecord],
        filter_key: &str,
    ) -> Result<Vec<Option<String>>, AnalyzeError> {
        if records.is_empty() {
            return Err(AnalyzeError::EmptyInput);
        }

        let distinct: IndexSet<Option<&str>> = records
            .iter()
            .filter(|r| r.key == filter_key)
            .map(FieldRecord::value_str)
            .collect();

        Ok(distinct
            .into_iter()
            .map(|v| v.map(str::to_owned))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ips(values: &[&str]) -> Vec<FieldRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| FieldRecord::new(i + 1, "ip", Some(v.to_string())))
            .collect()
    }

    #[test]
    fn test_rank_example() {
        let records = ips(&[
            "1.1.1.1", "2.2.2.2", "1.1.1.1", "3.3.3.3", "2.2.2.2", "1.1.1.1",
        ]);
        let groups = RankAggregator::new().rank(&records, "ip", 2).unwrap();

        assert_eq!(
            groups,
            vec![
                RankedGroup::new(1, 3, vec![Some("1.1.1.1".to_string())]),
                RankedGroup::new(2, 2, vec![Some("2.2.2.2".to_string())]),
            ]
        );
    }

    #[test]
    fn test_all_tied_is_one_tier() {
        let records = ips(&["e", "d", "c", "b", "a"]);
        let groups = RankAggregator::new().rank(&records, "ip", 3).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].rank, 1);
        assert_eq!(groups[0].hit_count, 1);
        let items: Vec<&str> = groups[0].items.iter().flatten().map(String::as_str).collect();
        assert_eq!(items, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_absent_and_empty_are_distinct_keys() {
        let records = vec![
            FieldRecord::new(1, "path", None),
            FieldRecord::new(2, "path", Some(String::new())),
            FieldRecord::new(3, "path", None),
        ];
        let groups = RankAggregator::new().rank(&records, "path", 5).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].items, vec![None]);
        assert_eq!(groups[0].hit_count, 2);
        assert_eq!(groups[1].items, vec![Some(String::new())]);
    }

    #[test]
    fn test_distinct_preserves_first_seen_order() {
        let records = ips(&["9.9.9.9", "1.1.1.1", "9.9.9.9", "5.5.5.5", "1.1.1.1"]);
        let values = RankAggregator::new().distinct_values(&records, "ip").unwrap();
        assert_eq!(
            values,
            vec![
                Some("9.9.9.9".to_string()),
                Some("1.1.1.1".to_string()),
                Some("5.5.5.5".to_string()),
            ]
        );
    }

    #[test]
    fn test_zero_limit_is_empty() {
        let records = ips(&["1.1.1.1"]);
        assert!(RankAggregator::new().rank(&records, "ip", 0).unwrap().is_empty());
    }
}

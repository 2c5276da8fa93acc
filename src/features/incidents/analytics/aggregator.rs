//! Counting, rates, means and distributions over incident reports.
//!
//! Averages and rates are returned as [`Decimal`]s with exactly two
//! fractional digits; counts stay integers.

use chrono::Weekday;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::normalizer::Dated;
use crate::features::incidents::models::IncidentReport;

/// Round to two decimal places, half to even, keeping a scale of 2.
///
/// The exact binary value is rounded, so `2.675` (stored just below the
/// midpoint) becomes `2.67`.
pub fn round2(value: f64) -> Decimal {
    let mut rounded = Decimal::from_f64_retain(value)
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(2);
    rounded
}

/// `matching / total * 100`, or 0 when there is nothing to divide by
pub fn rate(matching: u64, total: u64) -> Decimal {
    if total == 0 {
        return round2(0.0);
    }
    round2(matching.min(total) as f64 / total as f64 * 100.0)
}

/// Arithmetic mean of the present values, or 0 when there are none
pub fn mean<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0_f64, 0_u64), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        return round2(0.0);
    }
    round2(sum / count as f64)
}

pub fn count_matching<'a, I, P>(reports: I, predicate: P) -> u64
where
    I: IntoIterator<Item = &'a IncidentReport>,
    P: Fn(&IncidentReport) -> bool,
{
    reports.into_iter().filter(|r| predicate(*r)).count() as u64
}

/// Distinct values in first-seen order
pub fn distinct<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// Map that serializes its entries in insertion order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

#[cfg(test)]
impl<V> OrderedMap<V> {
    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Occurrences per value, most frequent first; ties keep first-seen order
pub fn value_counts<'a, I>(values: I) -> OrderedMap<u64>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for value in values {
        let count = counts.entry(value).or_insert_with(|| {
            order.push(value);
            0
        });
        *count += 1;
    }

    let mut entries: Vec<(String, u64)> = order
        .into_iter()
        .map(|v| (v.to_string(), counts[v]))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    OrderedMap(entries)
}

/// Count per (row key, column label).
///
/// Every row carries every column label seen anywhere, zero-filled.
pub fn cross_tab<'a, K, I>(pairs: I) -> BTreeMap<K, BTreeMap<String, u64>>
where
    K: Ord,
    I: IntoIterator<Item = (K, &'a str)>,
{
    let mut columns: BTreeSet<&str> = BTreeSet::new();
    let mut table: BTreeMap<K, BTreeMap<String, u64>> = BTreeMap::new();

    for (key, label) in pairs {
        columns.insert(label);
        *table
            .entry(key)
            .or_default()
            .entry(label.to_string())
            .or_insert(0) += 1;
    }

    for row in table.values_mut() {
        for column in &columns {
            row.entry(column.to_string()).or_insert(0);
        }
    }
    table
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// [`cross_tab`] by weekday, reindexed Monday to Sunday.
///
/// Days without reports get every column label with a zero count.
pub fn weekday_cross_tab<'a, I>(pairs: I) -> OrderedMap<BTreeMap<String, u64>>
where
    I: IntoIterator<Item = (Weekday, &'a str)>,
{
    let mut table = cross_tab(
        pairs
            .into_iter()
            .map(|(day, label)| (day.num_days_from_monday(), label)),
    );

    let columns: BTreeSet<String> = table
        .values()
        .flat_map(|row| row.keys().cloned())
        .collect();

    let days = WEEK
        .iter()
        .map(|day| {
            let row = table
                .remove(&day.num_days_from_monday())
                .unwrap_or_else(|| columns.iter().map(|c| (c.clone(), 0)).collect());
            (weekday_name(*day).to_string(), row)
        })
        .collect();

    OrderedMap(days)
}

/// Mean and count of a numeric value per group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    pub key: String,
    pub mean: Decimal,
    pub count: u64,
}

/// Per-group mean and count, ordered by group key
pub fn group_mean_count<'a, I>(pairs: I) -> Vec<GroupStats>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for (key, value) in pairs {
        groups.entry(key).or_default().push(value);
    }

    groups
        .into_iter()
        .map(|(key, values)| GroupStats {
            key: key.to_string(),
            count: values.len() as u64,
            mean: mean(values),
        })
        .collect()
}

/// The `n` most recent reports, newest first; equal dates keep fetch order
pub fn top_n_by_date<'a>(mut dated: Vec<Dated<'a>>, n: usize) -> Vec<&'a IncidentReport> {
    dated.sort_by(|a, b| b.date.cmp(&a.date));
    dated.into_iter().take(n).map(|d| d.report).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::incidents::analytics::normalizer::dated_reports;
    use crate::shared::test_helpers::report_on;
    use fake::Fake;

    #[test]
    fn test_round2_keeps_two_digits() {
        assert_eq!(round2(12.5).to_string(), "12.50");
        assert_eq!(round2(0.0).to_string(), "0.00");
        assert_eq!(round2(33.333333).to_string(), "33.33");
        assert_eq!(round2(2.0 / 3.0 * 100.0).to_string(), "66.67");
        assert_eq!(round2(f64::NAN).to_string(), "0.00");
    }

    #[test]
    fn test_round2_uses_exact_binary_value() {
        assert_eq!(round2(2.675).to_string(), "2.67");
        assert_eq!(round2(1.005).to_string(), "1.00");
        assert_eq!(round2(0.125).to_string(), "0.12");
        assert_eq!(mean([2.675]).to_string(), "2.67");
    }

    #[test]
    fn test_rate_zero_total() {
        assert_eq!(rate(0, 0), Decimal::ZERO);
        assert_eq!(rate(0, 0).scale(), 2);
    }

    #[test]
    fn test_rate_bounds() {
        for _ in 0..500 {
            let total: u64 = (0..1_000).fake();
            let matching: u64 = (0..=total).fake();
            let r = rate(matching, total);
            assert!(r >= Decimal::ZERO && r <= Decimal::from(100), "rate {} out of bounds", r);
            assert_eq!(r.scale(), 2);
        }
        assert_eq!(rate(1, 4).to_string(), "25.00");
        assert_eq!(rate(1, 3).to_string(), "33.33");
    }

    #[test]
    fn test_mean_ignores_missing_values() {
        let values = [Some(10.0), None, Some(20.0), None];
        assert_eq!(mean(values.iter().flatten().copied()).to_string(), "15.00");
        assert_eq!(mean(std::iter::empty()).to_string(), "0.00");
        let all_missing: [Option<f64>; 2] = [None, None];
        assert_eq!(mean(all_missing.iter().flatten().copied()), Decimal::ZERO);
    }

    #[test]
    fn test_distinct_keeps_first_seen_order() {
        assert_eq!(
            distinct(["solved", "Active", "solved", "Pending", "Active"]),
            vec!["solved", "Active", "Pending"]
        );
    }

    #[test]
    fn test_value_counts_ordering() {
        let counts = value_counts(["Fire", "Flood", "Theft", "Flood", "Fire", "Flood"]);
        assert_eq!(
            counts.0,
            vec![
                ("Flood".to_string(), 3),
                ("Fire".to_string(), 2),
                ("Theft".to_string(), 1)
            ]
        );
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"Flood":3,"Fire":2,"Theft":1}"#);
    }

    #[test]
    fn test_cross_tab_zero_fills_columns() {
        let table = cross_tab([(9_u32, "Emergency"), (9, "Emergency"), (14, "Minor")]);
        assert_eq!(table[&9]["Emergency"], 2);
        assert_eq!(table[&9]["Minor"], 0);
        assert_eq!(table[&14]["Emergency"], 0);
        assert_eq!(table[&14]["Minor"], 1);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_weekday_cross_tab_reindexes_week() {
        let pattern = weekday_cross_tab([
            (Weekday::Fri, "Emergency"),
            (Weekday::Mon, "Minor"),
            (Weekday::Fri, "Minor"),
        ]);

        assert_eq!(
            pattern.keys().collect::<Vec<_>>(),
            vec!["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]
        );
        assert_eq!(pattern.get("Monday").unwrap()["Minor"], 1);
        assert_eq!(pattern.get("Monday").unwrap()["Emergency"], 0);
        assert_eq!(pattern.get("Friday").unwrap()["Emergency"], 1);
        for day in ["Tuesday", "Wednesday", "Thursday", "Saturday", "Sunday"] {
            let row = pattern.get(day).unwrap();
            assert_eq!(row.len(), 2);
            assert!(row.values().all(|c| *c == 0));
        }
    }

    #[test]
    fn test_group_mean_count() {
        let stats = group_mean_count([("Minor", 10.0), ("Emergency", 5.0), ("Emergency", 6.0)]);
        assert_eq!(
            stats,
            vec![
                GroupStats {
                    key: "Emergency".to_string(),
                    mean: round2(5.5),
                    count: 2
                },
                GroupStats {
                    key: "Minor".to_string(),
                    mean: round2(10.0),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_top_n_by_date_is_stable() {
        let reports = vec![
            report_on("1/3/2024"),
            report_on("5/3/2024"),
            report_on("1/3/2024"),
            report_on("2/1/2024"),
        ];
        let top = top_n_by_date(dated_reports(&reports), 3);
        assert_eq!(top.len(), 3);
        assert!(std::ptr::eq(top[0], &reports[1]));
        assert!(std::ptr::eq(top[1], &reports[0]));
        assert!(std::ptr::eq(top[2], &reports[2]));
    }
}

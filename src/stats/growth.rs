//! Growth Ranking Module
//! Per-company growth over the active date range and volume share.

use super::calculator::StatsCalculator;
use crate::data::{DataProcessor, PriceRecord, SeriesKey};
use rayon::prelude::*;

/// Growth of one company between its first and latest close in range.
#[derive(Debug, Clone, PartialEq)]
pub struct Growth {
    pub company: String,
    pub market: String,
    pub first_close: f64,
    pub latest_close: f64,
    pub percent_change: f64,
}

/// Rank series by percent change, best first.
///
/// `subset` is the market-filtered, date-narrowed table (not narrowed by
/// company). Each (market, company) series is ranked on its own closes, so
/// a ticker listed in two markets gets two entries. Series with a zero
/// starting price have no defined growth and are left out. Equal growth
/// keeps first-occurrence order.
pub fn rank_growth(subset: &[&PriceRecord]) -> Vec<Growth> {
    let groups = DataProcessor::group_by_series(subset);

    let mut ranking: Vec<Growth> = groups
        .par_iter()
        .filter_map(|(key, rows)| {
            let mut rows = rows.clone();
            rows.sort_by_key(|r| r.date);
            let (first, last) = (rows.first()?, rows.last()?);

            match StatsCalculator::percent_change(first.close, last.close) {
                Ok(percent_change) => Some(Growth {
                    company: key.company.clone(),
                    market: key.market.clone(),
                    first_close: first.close,
                    latest_close: last.close,
                    percent_change,
                }),
                Err(err) => {
                    tracing::debug!("Skipping {} in growth ranking: {}", key.qualified(), err);
                    None
                }
            }
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.percent_change
            .partial_cmp(&a.percent_change)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranking
}

/// Total traded volume per series, in first-occurrence order, labelled
/// with [`DataProcessor::series_labels`].
pub fn volume_share(subset: &[&PriceRecord]) -> Vec<(String, u64)> {
    let groups = DataProcessor::group_by_series(subset);
    let keys: Vec<SeriesKey> = groups.iter().map(|(key, _)| key.clone()).collect();

    DataProcessor::series_labels(&keys)
        .into_iter()
        .zip(groups)
        .map(|(label, (_, rows))| {
            let total = rows.iter().fold(0u64, |acc, r| acc.saturating_add(r.volume));
            (label, total)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(company: &str, d: u32, close: f64, volume: u64) -> PriceRecord {
        listed("USA", company, d, close, volume)
    }

    fn listed(market: &str, company: &str, d: u32, close: f64, volume: u64) -> PriceRecord {
        PriceRecord {
            market: market.to_string(),
            company: company.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, d).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }

    #[test]
    fn test_rank_growth_descending() {
        let records = vec![
            record("A", 1, 100.0, 5),
            record("B", 1, 40.0, 7),
            record("A", 2, 110.0, 5),
            record("B", 2, 50.0, 7),
        ];
        let subset: Vec<&PriceRecord> = records.iter().collect();

        let ranking = rank_growth(&subset);
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].company, "B");
        assert!((ranking[0].percent_change - 25.0).abs() < 1e-12);
        assert!((ranking[1].percent_change - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_same_ticker_in_two_markets_ranked_separately() {
        let records = vec![
            listed("London", "RIO", 1, 100.0, 4),
            listed("Australia", "RIO", 1, 10.0, 6),
            listed("London", "RIO", 2, 101.0, 4),
            listed("Australia", "RIO", 2, 11.0, 6),
        ];
        let subset: Vec<&PriceRecord> = records.iter().collect();

        let ranking = rank_growth(&subset);
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].market, "Australia");
        assert_eq!(ranking[0].first_close, 10.0);
        assert_eq!(ranking[0].latest_close, 11.0);
        assert!((ranking[0].percent_change - 10.0).abs() < 1e-12);
        assert_eq!(ranking[1].market, "London");
        assert!((ranking[1].percent_change - 1.0).abs() < 1e-12);

        assert_eq!(
            volume_share(&subset),
            vec![
                ("RIO (London)".to_string(), 8),
                ("RIO (Australia)".to_string(), 12)
            ]
        );
    }

    #[test]
    fn test_ties_keep_first_occurrence() {
        let records = vec![
            record("X", 1, 10.0, 1),
            record("Y", 1, 20.0, 1),
            record("X", 2, 12.0, 1),
            record("Y", 2, 24.0, 1),
        ];
        let subset: Vec<&PriceRecord> = records.iter().collect();
        let names: Vec<String> = rank_growth(&subset).into_iter().map(|g| g.company).collect();
        assert_eq!(names, vec!["X", "Y"]);
    }

    #[test]
    fn test_zero_baseline_is_excluded() {
        let records = vec![
            record("Z", 1, 0.0, 1),
            record("Z", 2, 3.0, 1),
            record("A", 1, 1.0, 1),
            record("A", 2, 2.0, 1),
        ];
        let subset: Vec<&PriceRecord> = records.iter().collect();
        let ranking = rank_growth(&subset);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].company, "A");
        assert!(rank_growth(&[]).is_empty());
    }

    #[test]
    fn test_volume_share() {
        let records = vec![
            record("A", 1, 1.0, 10),
            record("B", 1, 1.0, 3),
            record("A", 2, 1.0, 15),
        ];
        let subset: Vec<&PriceRecord> = records.iter().collect();
        assert_eq!(
            volume_share(&subset),
            vec![("A".to_string(), 25), ("B".to_string(), 3)]
        );
    }
}

//! Price Record Module
//! Row type and the immutable in-memory price table.

use chrono::NaiveDate;
use std::collections::HashSet;

/// One trading day of one company in one market.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub market: String,
    pub company: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceRecord {
    /// True when both records belong to the same (market, company) series.
    pub fn same_series(&self, other: &PriceRecord) -> bool {
        self.market == other.market && self.company == other.company
    }

    pub fn series_key(&self) -> SeriesKey {
        SeriesKey::new(&self.market, &self.company)
    }
}

/// A company as listed in one market. The same ticker in two markets is
/// two different series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey {
    pub market: String,
    pub company: String,
}

impl SeriesKey {
    pub fn new(market: &str, company: &str) -> Self {
        Self {
            market: market.to_string(),
            company: company.to_string(),
        }
    }

    pub fn matches(&self, record: &PriceRecord) -> bool {
        self.market == record.market && self.company == record.company
    }

    /// `Company (Market)`, for names listed in more than one market.
    pub fn qualified(&self) -> String {
        format!("{} ({})", self.company, self.market)
    }
}

/// Loaded price data, ordered by insertion and never mutated after load.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    records: Vec<PriceRecord>,
}

impl PriceTable {
    pub fn new(records: Vec<PriceRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct markets in first-occurrence order.
    pub fn markets(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.market.as_str()))
            .map(|r| r.market.clone())
            .collect()
    }

    /// Earliest and latest date in the table.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?.date;
        Some(self.records.iter().fold((first, first), |(lo, hi), r| {
            (lo.min(r.date), hi.max(r.date))
        }))
    }

    /// Number of rows whose (market, company, date) key was already seen.
    pub fn duplicate_keys(&self) -> usize {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| !seen.insert((r.market.as_str(), r.company.as_str(), r.date)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(market: &str, company: &str, day: u32) -> PriceRecord {
        PriceRecord {
            market: market.to_string(),
            company: company.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            volume: 1,
        }
    }

    #[test]
    fn test_markets_first_occurrence_order() {
        let table = PriceTable::new(vec![
            record("USA", "AAPL", 1),
            record("India", "TCS", 1),
            record("USA", "MSFT", 1),
        ]);
        assert_eq!(table.markets(), vec!["USA", "India"]);
    }

    #[test]
    fn test_date_bounds() {
        let table = PriceTable::new(vec![
            record("USA", "AAPL", 5),
            record("USA", "AAPL", 2),
            record("USA", "AAPL", 9),
        ]);
        let (lo, hi) = table.date_bounds().unwrap();
        assert_eq!(lo, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(hi, NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
        assert!(PriceTable::default().date_bounds().is_none());
    }

    #[test]
    fn test_duplicate_keys() {
        let table = PriceTable::new(vec![
            record("USA", "AAPL", 1),
            record("USA", "AAPL", 1),
            record("India", "AAPL", 1),
            record("USA", "AAPL", 2),
        ]);
        assert_eq!(table.duplicate_keys(), 1);
    }
}

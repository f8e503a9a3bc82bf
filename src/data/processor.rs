//! Data Processor Module
//! Cascading market/company/date narrowing over the price table.

use super::record::{PriceRecord, PriceTable, SeriesKey};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap, HashSet};

/// User-chosen selection criteria, rebuilt on every interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionFilter {
    pub markets: BTreeSet<String>,
    pub companies: BTreeSet<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Series overlaid on the comparison chart; empty means all selected.
    pub comparison: BTreeSet<SeriesKey>,
    /// Series used for the single-series views.
    pub focus: Option<SeriesKey>,
}

impl SelectionFilter {
    /// Resolve the date range against the available bounds.
    ///
    /// Missing endpoints take the bound; an inverted range resets to the
    /// full bounds.
    pub fn resolve_range(&self, bounds: (NaiveDate, NaiveDate)) -> (NaiveDate, NaiveDate) {
        let start = self.start.unwrap_or(bounds.0);
        let end = self.end.unwrap_or(bounds.1);
        if start > end {
            tracing::debug!("Inverted date range {} > {}, resetting", start, end);
            bounds
        } else {
            (start, end)
        }
    }
}

/// Handles the narrowing operations. Every operation returns a new view and
/// never touches the table.
pub struct DataProcessor;

impl DataProcessor {
    /// Distinct markets offered to the user.
    pub fn market_candidates(table: &PriceTable) -> Vec<String> {
        table.markets()
    }

    /// Keep rows whose market is selected. No selection means no rows.
    pub fn narrow_by_market<'a>(
        table: &'a PriceTable,
        markets: &BTreeSet<String>,
    ) -> Vec<&'a PriceRecord> {
        table
            .records()
            .iter()
            .filter(|r| markets.contains(&r.market))
            .collect()
    }

    /// Companies selectable after market narrowing, in first-occurrence order.
    pub fn company_candidates(subset: &[&PriceRecord]) -> Vec<String> {
        let mut seen = HashSet::new();
        subset
            .iter()
            .filter(|r| seen.insert(r.company.as_str()))
            .map(|r| r.company.clone())
            .collect()
    }

    /// Keep rows whose company is selected. No selection means no rows.
    pub fn narrow_by_company<'a>(
        subset: &[&'a PriceRecord],
        companies: &BTreeSet<String>,
    ) -> Vec<&'a PriceRecord> {
        subset
            .iter()
            .copied()
            .filter(|r| companies.contains(&r.company))
            .collect()
    }

    /// Keep rows with `start <= date <= end`, sorted by date.
    /// Rows sharing a date keep their input order.
    pub fn narrow_by_date<'a>(
        subset: &[&'a PriceRecord],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<&'a PriceRecord> {
        let mut rows: Vec<&PriceRecord> = subset
            .iter()
            .copied()
            .filter(|r| r.date >= start && r.date <= end)
            .collect();
        rows.sort_by_key(|r| r.date);
        rows
    }

    /// Earliest and latest date of a subset.
    pub fn date_bounds(subset: &[&PriceRecord]) -> Option<(NaiveDate, NaiveDate)> {
        let first = subset.first()?.date;
        Some(subset.iter().fold((first, first), |(lo, hi), r| {
            (lo.min(r.date), hi.max(r.date))
        }))
    }

    /// Rows of one (market, company) series.
    pub fn series_for<'a>(subset: &[&'a PriceRecord], key: &SeriesKey) -> Vec<&'a PriceRecord> {
        subset.iter().copied().filter(|r| key.matches(r)).collect()
    }

    /// Split a subset into per-series groups in first-occurrence order.
    pub fn group_by_series<'a>(
        subset: &[&'a PriceRecord],
    ) -> Vec<(SeriesKey, Vec<&'a PriceRecord>)> {
        let mut groups: Vec<(SeriesKey, Vec<&PriceRecord>)> = Vec::new();
        for &record in subset {
            match groups.iter_mut().find(|(key, _)| key.matches(record)) {
                Some((_, rows)) => rows.push(record),
                None => groups.push((record.series_key(), vec![record])),
            }
        }
        groups
    }

    /// Display names for `keys`: the company alone, or `Company (Market)`
    /// when the company is listed in more than one of them.
    pub fn series_labels(keys: &[SeriesKey]) -> Vec<String> {
        let mut listings: HashMap<&str, usize> = HashMap::new();
        for key in keys {
            *listings.entry(key.company.as_str()).or_default() += 1;
        }
        keys.iter()
            .map(|key| {
                if listings[key.company.as_str()] > 1 {
                    key.qualified()
                } else {
                    key.company.clone()
                }
            })
            .collect()
    }
}

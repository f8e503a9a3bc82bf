//! Analysis Module
//! One pure pass from (table, selection) to everything the dashboard shows.

use crate::data::{DataProcessor, PriceRecord, PriceTable, SelectionFilter, SeriesKey};
use crate::stats::{
    rank_growth, rolling_mean, volume_share, DeriveError, DerivedStats, Growth, PriceLevels,
    StatsCalculator, MA_LONG, MA_SHORT,
};
use chrono::NaiveDate;

/// Close prices of one series for the comparison chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSeries {
    pub key: SeriesKey,
    pub label: String,
    pub points: Vec<(NaiveDate, f64)>,
}

/// Single-series rows with their moving averages.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusSeries {
    pub key: SeriesKey,
    pub label: String,
    pub rows: Vec<PriceRecord>,
    pub ma_short: Vec<Option<f64>>,
    pub ma_long: Vec<Option<f64>>,
}

/// Result of one recomputation pass.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub market_candidates: Vec<String>,
    /// Companies offered after market narrowing.
    pub company_candidates: Vec<String>,
    /// Date bounds of the market+company selection.
    pub bounds: Option<(NaiveDate, NaiveDate)>,
    /// Active, normalized date range.
    pub range: Option<(NaiveDate, NaiveDate)>,
    /// Filtered rows in date order.
    pub rows: Vec<PriceRecord>,
    /// Distinct series in `rows` with their display labels.
    pub series: Vec<(SeriesKey, String)>,
    pub stats: Result<DerivedStats, DeriveError>,
    pub levels: Option<PriceLevels>,
    pub comparison: Vec<ComparisonSeries>,
    pub focus: Option<FocusSeries>,
    /// Growth of every company in the selected markets over the active range.
    pub ranking: Vec<Growth>,
    pub volume_share: Vec<(String, u64)>,
}

/// One labelled headline figure.
#[derive(Debug, Clone, PartialEq)]
pub struct Kpi {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Headline {
    /// Nothing matched; show the message instead of charts.
    NoData(String),
    Kpis {
        kpis: Vec<Kpi>,
        notice: Option<String>,
    },
}

/// Run market, company and date narrowing and derive every output.
pub fn analyze(table: &PriceTable, filter: &SelectionFilter) -> Analysis {
    let by_market = DataProcessor::narrow_by_market(table, &filter.markets);
    let company_candidates = DataProcessor::company_candidates(&by_market);
    let by_company = DataProcessor::narrow_by_company(&by_market, &filter.companies);

    let bounds = DataProcessor::date_bounds(&by_company);
    let range = bounds
        .or_else(|| DataProcessor::date_bounds(&by_market))
        .map(|b| filter.resolve_range(b));

    let (rows, in_range_market) = match range {
        Some((start, end)) => (
            DataProcessor::narrow_by_date(&by_company, start, end),
            DataProcessor::narrow_by_date(&by_market, start, end),
        ),
        None => (Vec::new(), Vec::new()),
    };

    let stats = StatsCalculator::derive_stats(&rows);
    let levels = StatsCalculator::price_levels(&rows).ok();

    let groups = DataProcessor::group_by_series(&rows);
    let keys: Vec<SeriesKey> = groups.iter().map(|(key, _)| key.clone()).collect();
    let series: Vec<(SeriesKey, String)> = keys
        .iter()
        .cloned()
        .zip(DataProcessor::series_labels(&keys))
        .collect();

    let comparison = groups
        .into_iter()
        .zip(&series)
        .filter(|((key, _), _)| filter.comparison.is_empty() || filter.comparison.contains(key))
        .map(|((key, group), (_, label))| ComparisonSeries {
            key,
            label: label.clone(),
            points: group.iter().map(|r| (r.date, r.close)).collect(),
        })
        .collect();

    let focus = focus_series(&rows, filter.focus.as_ref(), &series);
    let ranking = rank_growth(&in_range_market);
    let volume_share = volume_share(&rows);

    tracing::debug!(
        "Analysis: {} market rows, {} selected rows, {} ranked companies",
        by_market.len(),
        rows.len(),
        ranking.len()
    );

    Analysis {
        market_candidates: DataProcessor::market_candidates(table),
        company_candidates,
        bounds,
        range,
        rows: rows.into_iter().cloned().collect(),
        series,
        stats,
        levels,
        comparison,
        focus,
        ranking,
        volume_share,
    }
}

/// The requested series if it is in the rows, otherwise the first one present.
fn focus_series(
    rows: &[&PriceRecord],
    requested: Option<&SeriesKey>,
    series: &[(SeriesKey, String)],
) -> Option<FocusSeries> {
    let (key, label) = requested
        .and_then(|wanted| series.iter().find(|(key, _)| key == wanted))
        .or_else(|| series.first())?
        .clone();

    let focus_rows = DataProcessor::series_for(rows, &key);
    Some(FocusSeries {
        ma_short: rolling_mean(&focus_rows, MA_SHORT).collect(),
        ma_long: rolling_mean(&focus_rows, MA_LONG).collect(),
        rows: focus_rows.into_iter().cloned().collect(),
        key,
        label,
    })
}

impl Analysis {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Leading company over the active range.
    pub fn leader(&self) -> Option<&Growth> {
        self.ranking.first()
    }

    /// Headline figures with the recoverable failures turned into messages.
    pub fn headline(&self) -> Headline {
        match (&self.stats, &self.levels) {
            (Err(DeriveError::EmptyResult), _) | (_, None) => {
                Headline::NoData("No data for the current selection".to_string())
            }
            (Ok(stats), Some(levels)) => Headline::Kpis {
                kpis: self.kpis(levels, Some(stats.percent_change), stats.volatility),
                notice: None,
            },
            (Err(err @ DeriveError::DivisionByZero), Some(levels)) => {
                let rows: Vec<&PriceRecord> = self.rows.iter().collect();
                Headline::Kpis {
                    kpis: self.kpis(levels, None, StatsCalculator::volatility(&rows)),
                    notice: Some(err.to_string()),
                }
            }
        }
    }

    fn kpis(&self, levels: &PriceLevels, change: Option<f64>, volatility: Option<f64>) -> Vec<Kpi> {
        let kpi = |label, value| Kpi { label, value };
        vec![
            kpi("Latest Price", format!("{:.2}", levels.latest_close)),
            kpi("Highest Price", format!("{:.2}", levels.high_max)),
            kpi("Lowest Price", format!("{:.2}", levels.low_min)),
            kpi(
                "Change %",
                change
                    .map(|c| format!("{c:.2}%"))
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
            kpi("Mean Close", format!("{:.2}", levels.mean_close)),
            kpi("Total Volume", group_thousands(levels.total_volume)),
            kpi(
                "Volatility",
                volatility
                    .map(|v| format!("{v:.2}"))
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
            kpi(
                "Top Performer",
                self.leader()
                    .map(|g| format!("{} ({:+.2}%)", g.company, g.percent_change))
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
        ]
    }
}

/// `1234567` -> `"1,234,567"`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn record(market: &str, company: &str, d: u32, close: f64) -> PriceRecord {
        PriceRecord {
            market: market.to_string(),
            company: company.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 7, d).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 100,
        }
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn table() -> PriceTable {
        PriceTable::new(vec![
            record("USA", "A", 1, 100.0),
            record("USA", "B", 1, 40.0),
            record("Japan", "T", 1, 10.0),
            record("USA", "A", 2, 105.0),
            record("USA", "B", 2, 50.0),
            record("Japan", "T", 2, 30.0),
            record("USA", "A", 3, 110.0),
            record("USA", "B", 3, 48.0),
        ])
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_ranking_ignores_company_filter() {
        let filter = SelectionFilter {
            markets: set(&["USA"]),
            companies: set(&["A"]),
            ..Default::default()
        };
        let analysis = analyze(&table(), &filter);
        assert_eq!(analysis.company_candidates, vec!["A", "B"]);
        assert_eq!(analysis.rows.len(), 3);
        assert_eq!(analysis.ranking.len(), 2);
        assert_eq!(analysis.leader().unwrap().company, "B");
    }

    #[test]
    fn test_ranking_follows_active_range() {
        let filter = SelectionFilter {
            markets: set(&["USA"]),
            companies: set(&["A", "B"]),
            start: NaiveDate::from_ymd_opt(2024, 7, 2),
            ..Default::default()
        };
        let analysis = analyze(&table(), &filter);
        // B falls from 50 to 48 after day 2 while A keeps rising.
        assert_eq!(analysis.leader().unwrap().company, "A");
        assert_eq!(analysis.rows.len(), 4);
    }

    #[test]
    fn test_empty_selection_has_no_data_headline() {
        let analysis = analyze(&table(), &SelectionFilter::default());
        assert!(analysis.is_empty());
        assert_eq!(analysis.stats, Err(DeriveError::EmptyResult));
        assert!(matches!(analysis.headline(), Headline::NoData(_)));
        assert!(analysis.focus.is_none());
    }

    #[test]
    fn test_zero_baseline_headline_shows_na() {
        let table = PriceTable::new(vec![
            record("USA", "Z", 1, 0.0),
            record("USA", "Z", 2, 4.0),
        ]);
        let filter = SelectionFilter {
            markets: set(&["USA"]),
            companies: set(&["Z"]),
            ..Default::default()
        };
        let analysis = analyze(&table, &filter);
        assert_eq!(analysis.stats, Err(DeriveError::DivisionByZero));
        match analysis.headline() {
            Headline::Kpis { kpis, notice } => {
                let change = kpis.iter().find(|k| k.label == "Change %").unwrap();
                assert_eq!(change.value, "N/A");
                let latest = kpis.iter().find(|k| k.label == "Latest Price").unwrap();
                assert_eq!(latest.value, "4.00");
                assert!(notice.is_some());
            }
            other => panic!("unexpected headline {other:?}"),
        }
    }

    #[test]
    fn test_focus_and_comparison() {
        let filter = SelectionFilter {
            markets: set(&["USA"]),
            companies: set(&["A", "B"]),
            comparison: [SeriesKey::new("USA", "B")].into_iter().collect(),
            focus: Some(SeriesKey::new("USA", "B")),
            ..Default::default()
        };
        let analysis = analyze(&table(), &filter);
        let focus = analysis.focus.as_ref().unwrap();
        assert_eq!(focus.label, "B");
        assert_eq!(focus.rows.len(), 3);
        assert_eq!(focus.ma_short.len(), 3);
        assert_eq!(analysis.comparison.len(), 1);
        assert_eq!(analysis.comparison[0].label, "B");
        assert_eq!(analysis.series.len(), 2);

        // Unknown focus falls back to the first series in the rows.
        let fallback = SelectionFilter {
            focus: Some(SeriesKey::new("Japan", "B")),
            ..filter
        };
        assert_eq!(
            analyze(&table(), &fallback).focus.unwrap().key,
            SeriesKey::new("USA", "A")
        );
    }

    #[test]
    fn test_ticker_listed_in_two_markets() {
        let table = PriceTable::new(vec![
            record("London", "RIO", 1, 100.0),
            record("Australia", "RIO", 1, 10.0),
            record("London", "RIO", 2, 101.0),
            record("Australia", "RIO", 2, 11.0),
        ]);
        let filter = SelectionFilter {
            markets: set(&["London", "Australia"]),
            companies: set(&["RIO"]),
            focus: Some(SeriesKey::new("Australia", "RIO")),
            ..Default::default()
        };
        let analysis = analyze(&table, &filter);

        assert_eq!(analysis.company_candidates, vec!["RIO"]);
        assert_eq!(analysis.ranking.len(), 2);
        assert_eq!(analysis.leader().unwrap().market, "Australia");

        let focus = analysis.focus.as_ref().unwrap();
        assert_eq!(focus.label, "RIO (Australia)");
        let closes: Vec<f64> = focus.rows.iter().map(|r| r.close).collect();
        assert_eq!(closes, vec![10.0, 11.0]);

        let labels: Vec<&str> = analysis.comparison.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["RIO (London)", "RIO (Australia)"]);
        assert_eq!(analysis.comparison[0].points.len(), 2);
    }
}

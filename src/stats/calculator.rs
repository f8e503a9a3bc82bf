//! Statistics Calculator Module
//! Summary statistics over a filtered, date-sorted subset.

use super::rolling::rolling_mean;
use crate::data::PriceRecord;
use chrono::NaiveDate;
use statrs::statistics::Statistics;
use thiserror::Error;

/// Short moving-average window (trading days).
pub const MA_SHORT: usize = 50;
/// Long moving-average window (trading days).
pub const MA_LONG: usize = 200;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeriveError {
    #[error("No rows match the current selection")]
    EmptyResult,
    #[error("Percent change is undefined for a zero starting price")]
    DivisionByZero,
}

/// Figures that do not depend on the percent-change baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceLevels {
    pub rows: usize,
    pub first_date: NaiveDate,
    pub latest_date: NaiveDate,
    pub first_close: f64,
    pub latest_close: f64,
    pub high_max: f64,
    pub low_min: f64,
    pub mean_close: f64,
    pub total_volume: u64,
}

/// Snapshot of the statistics shown for the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedStats {
    pub rows: usize,
    pub first_date: NaiveDate,
    pub latest_date: NaiveDate,
    pub first_close: f64,
    pub latest_close: f64,
    pub high_max: f64,
    pub low_min: f64,
    pub mean_close: f64,
    pub total_volume: u64,
    pub percent_change: f64,
    /// Sample standard deviation of close; needs at least two rows.
    pub volatility: Option<f64>,
    /// Latest 50-day mean; single-series subsets only.
    pub rolling_mean_50: Option<f64>,
    /// Latest 200-day mean; single-series subsets only.
    pub rolling_mean_200: Option<f64>,
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute the baseline-independent figures.
    pub fn price_levels(subset: &[&PriceRecord]) -> Result<PriceLevels, DeriveError> {
        let (first, last) = match (subset.first(), subset.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(DeriveError::EmptyResult),
        };

        let high_max = subset
            .iter()
            .map(|r| r.high)
            .fold(f64::NEG_INFINITY, f64::max);
        let low_min = subset.iter().map(|r| r.low).fold(f64::INFINITY, f64::min);
        let total_volume = subset
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.volume));

        Ok(PriceLevels {
            rows: subset.len(),
            first_date: first.date,
            latest_date: last.date,
            first_close: first.close,
            latest_close: last.close,
            high_max,
            low_min,
            mean_close: Self::closes(subset).iter().mean(),
            total_volume,
        })
    }

    /// Derive the full statistics snapshot.
    ///
    /// Expects the date-sorted output of `narrow_by_date`; first and latest
    /// close are taken positionally.
    pub fn derive_stats(subset: &[&PriceRecord]) -> Result<DerivedStats, DeriveError> {
        let levels = Self::price_levels(subset)?;
        let percent_change = Self::percent_change(levels.first_close, levels.latest_close)?;

        let (rolling_mean_50, rolling_mean_200) = if Self::is_single_series(subset) {
            (
                Self::latest_rolling_mean(subset, MA_SHORT),
                Self::latest_rolling_mean(subset, MA_LONG),
            )
        } else {
            (None, None)
        };

        Ok(DerivedStats {
            rows: levels.rows,
            first_date: levels.first_date,
            latest_date: levels.latest_date,
            first_close: levels.first_close,
            latest_close: levels.latest_close,
            high_max: levels.high_max,
            low_min: levels.low_min,
            mean_close: levels.mean_close,
            total_volume: levels.total_volume,
            percent_change,
            volatility: Self::volatility(subset),
            rolling_mean_50,
            rolling_mean_200,
        })
    }

    /// `(latest - first) / first * 100`, refusing a zero baseline.
    pub fn percent_change(first_close: f64, latest_close: f64) -> Result<f64, DeriveError> {
        if first_close == 0.0 {
            return Err(DeriveError::DivisionByZero);
        }
        Ok((latest_close - first_close) / first_close * 100.0)
    }

    /// Sample standard deviation (N-1) of close.
    pub fn volatility(subset: &[&PriceRecord]) -> Option<f64> {
        if subset.len() < 2 {
            return None;
        }
        Some(Self::closes(subset).iter().std_dev())
    }

    /// True when every row belongs to one (market, company) series.
    pub fn is_single_series(subset: &[&PriceRecord]) -> bool {
        subset.windows(2).all(|pair| pair[0].same_series(pair[1]))
    }

    fn latest_rolling_mean(subset: &[&PriceRecord], window: usize) -> Option<f64> {
        rolling_mean(subset, window).last().flatten()
    }

    fn closes(subset: &[&PriceRecord]) -> Vec<f64> {
        subset.iter().map(|r| r.close).collect()
    }
}

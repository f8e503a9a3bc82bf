//! Rolling mean over close prices.

use crate::data::PriceRecord;
use std::collections::{HashMap, VecDeque};

/// Lazy rolling mean aligned one-to-one with its input rows.
///
/// Each (market, company) series keeps its own window, so a window never
/// spans two companies. A position yields `None` until its series has
/// produced `window` closes.
pub struct RollingMean<'s, 'a> {
    rows: std::slice::Iter<'s, &'a PriceRecord>,
    window: usize,
    buffers: HashMap<(&'a str, &'a str), VecDeque<f64>>,
}

impl<'s, 'a> Iterator for RollingMean<'s, 'a> {
    type Item = Option<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        let record: &'a PriceRecord = *self.rows.next()?;
        if self.window == 0 {
            return Some(None);
        }

        let buffer = self
            .buffers
            .entry((record.market.as_str(), record.company.as_str()))
            .or_default();
        buffer.push_back(record.close);
        if buffer.len() > self.window {
            buffer.pop_front();
        }

        if buffer.len() < self.window {
            Some(None)
        } else {
            Some(Some(buffer.iter().sum::<f64>() / self.window as f64))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for RollingMean<'_, '_> {}

/// Rolling mean of `close` over the last `window` rows of each series.
pub fn rolling_mean<'s, 'a>(subset: &'s [&'a PriceRecord], window: usize) -> RollingMean<'s, 'a> {
    RollingMean {
        rows: subset.iter(),
        window,
        buffers: HashMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(company: &str, closes: &[f64]) -> Vec<PriceRecord> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceRecord {
                market: "USA".to_string(),
                company: company.to_string(),
                date: NaiveDate::from_ymd_opt(2024, 5, 1 + i as u32).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 0,
            })
            .collect()
    }

    #[test]
    fn test_matches_window_definition() {
        let closes = [3.0, 1.5, 4.0, 1.0, 5.5, 9.0, 2.0, 6.0];
        let records = series("ACME", &closes);
        let subset: Vec<&PriceRecord> = records.iter().collect();
        let k = 3;

        let means: Vec<Option<f64>> = rolling_mean(&subset, k).collect();
        assert_eq!(means.len(), subset.len());
        for (i, mean) in means.iter().enumerate() {
            if i + 1 < k {
                assert_eq!(*mean, None, "position {i}");
            } else {
                let expected = closes[i + 1 - k..=i].iter().sum::<f64>() / k as f64;
                assert!((mean.unwrap() - expected).abs() < 1e-12, "position {i}");
            }
        }
    }

    #[test]
    fn test_windows_do_not_cross_companies() {
        let a = series("A", &[1.0, 2.0, 3.0]);
        let b = series("B", &[100.0, 200.0, 300.0]);
        // Interleaved as a date sort would leave them.
        let subset: Vec<&PriceRecord> = vec![&a[0], &b[0], &a[1], &b[1], &a[2], &b[2]];

        let means: Vec<Option<f64>> = rolling_mean(&subset, 2).collect();
        assert_eq!(
            means,
            vec![None, None, Some(1.5), Some(150.0), Some(2.5), Some(250.0)]
        );
    }

    #[test]
    fn test_zero_window_and_empty_input() {
        let records = series("ACME", &[1.0, 2.0]);
        let subset: Vec<&PriceRecord> = records.iter().collect();
        assert!(rolling_mean(&subset, 0).all(|m| m.is_none()));
        assert_eq!(rolling_mean(&[], 5).count(), 0);
    }

    #[test]
    fn test_is_lazy_and_sized() {
        let records = series("ACME", &[1.0, 2.0, 3.0, 4.0]);
        let subset: Vec<&PriceRecord> = records.iter().collect();
        let mut iter = rolling_mean(&subset, 2);
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.next(), Some(None));
        assert_eq!(iter.next(), Some(Some(1.5)));
        assert_eq!(iter.len(), 2);
    }
}

//! CSV Data Loader Module
//! Reads per-market or combined price files with Polars and builds the shared price table.

use super::record::{PriceRecord, PriceTable};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub const DATE_COL: &str = "Date";
pub const MARKET_COL: &str = "Market";
pub const MARKET_ALIASES: [&str; 2] = ["Market", "Country"];
pub const COMPANY_ALIASES: [&str; 2] = ["Company", "Stock"];

#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("Data file not found: {0}")]
    MissingFile(PathBuf),
    #[error("Failed to read CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("{path}: missing required column {column}")]
    MissingColumn { path: PathBuf, column: String },
    #[error("{path}: invalid row {row}: {reason}")]
    InvalidRow {
        path: PathBuf,
        row: usize,
        reason: String,
    },
    #[error("No price data loaded")]
    NoData,
}

/// One input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataSource {
    /// One file per market; the market label is injected by the loader.
    PerMarket { market: String, path: PathBuf },
    /// A single file that already carries a Market/Country column.
    Combined { path: PathBuf },
}

impl DataSource {
    pub fn path(&self) -> &Path {
        match self {
            DataSource::PerMarket { path, .. } | DataSource::Combined { path } => path,
        }
    }
}

/// What to do with rows whose date or prices cannot be parsed.
/// Applied uniformly to every input file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePolicy {
    /// Skip the row and keep loading.
    #[default]
    Drop,
    /// Fail the whole load.
    Reject,
}

/// Loads a fixed set of price files once and keeps the table for the
/// process lifetime.
pub struct DataLoader {
    sources: Vec<DataSource>,
    policy: DatePolicy,
    table: Option<Arc<PriceTable>>,
}

impl DataLoader {
    pub fn new(sources: Vec<DataSource>) -> Self {
        Self {
            sources,
            policy: DatePolicy::default(),
            table: None,
        }
    }

    pub fn with_policy(mut self, policy: DatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Load and concatenate all sources. Later calls return the cached table;
    /// input files are assumed not to change during a session.
    pub fn load(&mut self) -> Result<Arc<PriceTable>, DataSourceError> {
        if let Some(table) = &self.table {
            return Ok(Arc::clone(table));
        }

        let mut records = Vec::new();
        let mut dropped = 0usize;
        for source in &self.sources {
            dropped += load_source(source, self.policy, &mut records)?;
        }

        let table = PriceTable::new(records);
        if table.is_empty() {
            return Err(DataSourceError::NoData);
        }

        if dropped > 0 {
            tracing::warn!(
                "Dropped {} malformed rows across {} files",
                dropped,
                self.sources.len()
            );
        }
        let duplicates = table.duplicate_keys();
        if duplicates > 0 {
            tracing::warn!(
                "{} rows repeat an existing (market, company, date) key; aggregates include them",
                duplicates
            );
        }
        tracing::info!(
            "Loaded {} rows from {} files ({} markets)",
            table.len(),
            self.sources.len(),
            table.markets().len()
        );

        let table = Arc::new(table);
        self.table = Some(Arc::clone(&table));
        Ok(table)
    }
}

/// Read one source into `out`; returns the number of rows dropped.
fn load_source(
    source: &DataSource,
    policy: DatePolicy,
    out: &mut Vec<PriceRecord>,
) -> Result<usize, DataSourceError> {
    let path = source.path();
    if !path.is_file() {
        return Err(DataSourceError::MissingFile(path.to_path_buf()));
    }
    let csv_err = |source: PolarsError| DataSourceError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut lazy = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(10000))
        .with_ignore_errors(true)
        .finish()
        .map_err(csv_err)?;

    if let DataSource::PerMarket { market, .. } = source {
        lazy = lazy.with_column(lit(market.as_str()).alias(MARKET_COL));
    }

    let df = lazy.collect().map_err(csv_err)?;
    let columns = PriceColumns::resolve(&df, path)?;

    let mut dropped = 0usize;
    for row in 0..df.height() {
        match columns.record(row) {
            Ok(record) => out.push(record),
            Err(reason) => match policy {
                DatePolicy::Drop => {
                    tracing::debug!("{}: dropping row {}: {}", path.display(), row + 1, reason);
                    dropped += 1;
                }
                DatePolicy::Reject => {
                    return Err(DataSourceError::InvalidRow {
                        path: path.to_path_buf(),
                        row: row + 1,
                        reason,
                    })
                }
            },
        }
    }

    tracing::debug!(
        "{}: {} rows read, {} dropped",
        path.display(),
        df.height(),
        dropped
    );
    Ok(dropped)
}

/// First column present under any of `aliases`.
fn find_column(df: &DataFrame, path: &Path, aliases: &[&str]) -> Result<Column, DataSourceError> {
    aliases
        .iter()
        .find_map(|name| df.column(name).ok().cloned())
        .ok_or_else(|| DataSourceError::MissingColumn {
            path: path.to_path_buf(),
            column: aliases.join("/"),
        })
}

/// Typed views over the required columns of one file.
struct PriceColumns {
    market: StringChunked,
    company: StringChunked,
    date: StringChunked,
    open: Float64Chunked,
    high: Float64Chunked,
    low: Float64Chunked,
    close: Float64Chunked,
    volume: Int64Chunked,
}

impl PriceColumns {
    fn resolve(df: &DataFrame, path: &Path) -> Result<Self, DataSourceError> {
        let csv_err = |source: PolarsError| DataSourceError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let text = |column: Column| -> Result<StringChunked, DataSourceError> {
            let cast = column.cast(&DataType::String).map_err(csv_err)?;
            Ok(cast.str().map_err(csv_err)?.clone())
        };
        let float = |name: &str| -> Result<Float64Chunked, DataSourceError> {
            let cast = find_column(df, path, &[name])?
                .cast(&DataType::Float64)
                .map_err(csv_err)?;
            Ok(cast.f64().map_err(csv_err)?.clone())
        };

        let volume = find_column(df, path, &["Volume"])?
            .cast(&DataType::Int64)
            .map_err(csv_err)?;

        Ok(Self {
            market: text(find_column(df, path, &MARKET_ALIASES)?)?,
            company: text(find_column(df, path, &COMPANY_ALIASES)?)?,
            date: text(find_column(df, path, &[DATE_COL])?)?,
            open: float("Open")?,
            high: float("High")?,
            low: float("Low")?,
            close: float("Close")?,
            volume: volume.i64().map_err(csv_err)?.clone(),
        })
    }

    fn record(&self, row: usize) -> Result<PriceRecord, String> {
        let market = self.market.get(row).ok_or("missing market")?.trim();
        let company = self.company.get(row).ok_or("missing company")?.trim();
        if market.is_empty() || company.is_empty() {
            return Err("empty market or company".to_string());
        }

        let raw_date = self.date.get(row).ok_or("missing date")?;
        let date = parse_date(raw_date).ok_or_else(|| format!("unparseable date {raw_date:?}"))?;

        let price = |ca: &Float64Chunked, name: &str| -> Result<f64, String> {
            match ca.get(row) {
                Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
                Some(v) => Err(format!("invalid {name} {v}")),
                None => Err(format!("missing {name}")),
            }
        };

        let volume = match self.volume.get(row) {
            Some(v) => u64::try_from(v).map_err(|_| format!("negative volume {v}"))?,
            None => return Err("missing volume".to_string()),
        };

        Ok(PriceRecord {
            market: market.to_string(),
            company: company.to_string(),
            date,
            open: price(&self.open, "open")?,
            high: price(&self.high, "high")?,
            low: price(&self.low, "low")?,
            close: price(&self.close, "close")?,
            volume,
        })
    }
}

/// Parse the date formats seen in exported price files.
/// Timestamps keep only their calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim().trim_matches('"');

    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.date_naive());
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    None
}

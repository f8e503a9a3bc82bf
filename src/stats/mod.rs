//! Stats module - summary statistics, moving averages and growth ranking

mod calculator;
mod growth;
mod rolling;

pub use calculator::{DeriveError, DerivedStats, PriceLevels, StatsCalculator, MA_LONG, MA_SHORT};
pub use growth::{rank_growth, volume_share, Growth};
pub use rolling::{rolling_mean, RollingMean};

//! Charts module - Chart rendering

mod plotter;

pub use plotter::{date_to_x, x_to_date, ChartMode, ChartPlotter};

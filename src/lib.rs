//! Global Stock Trading Dashboard
//!
//! Loads daily price files for several markets, narrows them by market,
//! company and date range, and derives the figures and series the dashboard
//! draws.

pub mod analysis;
pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod stats;

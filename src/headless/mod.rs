//! Headless mode: unattended AI-vs-AI series with no window, used for
//! balance runs and integration tests.

pub mod config;
pub mod runner;

pub use config::HeadlessSeriesConfig;
pub use runner::{run_headless_series, SeriesReport};

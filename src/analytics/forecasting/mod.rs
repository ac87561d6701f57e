//! Forecasting Module
//!
//! 差分化自己回帰モデルによる時系列予測

pub mod engine;
pub mod types;

pub use engine::{difference, inverse_difference, ForecastingEngine};
pub use types::{ForecastModel, ForecastResult, TrendDirection};

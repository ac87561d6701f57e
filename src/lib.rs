//! # procsight-rs
//!
//! Process analytics and model monitoring core.
//!
//! This crate implements the statistical layer of a process risk platform:
//! anomaly detection, k-means clustering and differenced autoregressive
//! forecasting over numeric feature data, plus the feedback-driven drift
//! detection, alert pattern analysis and retraining advice that decide
//! whether those models are still trustworthy.
//!
//! The crate is a pure library: it receives feature matrices, time series
//! and feedback records from the caller and returns structured results.
//! Persistence and delivery of its outputs belong to the host service.

pub mod analytics;
pub mod config;
pub mod error;
pub mod monitoring;
pub mod stats;

pub use analytics::anomaly::AnomalyDetector;
pub use analytics::clustering::ClusteringEngine;
pub use analytics::forecasting::ForecastingEngine;
pub use error::{Error, Result};
pub use monitoring::{DriftDetector, FeedbackLedger};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidConfiguration("k must be positive".to_string());
        assert!(err.to_string().contains("k must be positive"));
    }
}

//! Anomaly Detection Module
//!
//! 特徴量ベクトルの異常検知

pub mod detector;
pub mod realtime;
pub mod seasonal;
pub mod types;

pub use detector::AnomalyDetector;
pub use realtime::RealtimeAnomalyMonitor;
pub use seasonal::{seasonal_decomposition, SeasonalDecomposition};
pub use types::{
    AnomalyModel, AnomalyPoint, AnomalySeverity, DetectionResult, FeatureStats, RealtimeDetection,
};

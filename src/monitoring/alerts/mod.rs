//! Alert Module
//!
//! アラートの型・保管・パターン分析

pub mod alert;
pub mod manager;
pub mod patterns;

pub use alert::{Alert, AlertSeverity, AlertSource};
pub use manager::AlertManager;
pub use patterns::{
    AlertBucket, AlertPattern, AlertPatternAnalyzer, BucketInterval, PatternSeverity, PatternType,
};

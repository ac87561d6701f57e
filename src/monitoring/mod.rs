//! Model Monitoring Module
//!
//! フィードバック駆動のモデル監視（ドリフト検知・アラート分析・
//! 再学習推奨・サマリー生成）

pub mod alerts;
pub mod drift;
pub mod feedback;
pub mod retraining;
pub mod summary;

pub use alerts::{Alert, AlertManager, AlertPatternAnalyzer, AlertSeverity, AlertSource};
pub use drift::{DriftCheck, DriftDetector, DriftEvent, DriftStatus};
pub use feedback::{FeedbackLedger, FeedbackRecord, OutcomeLabel};
pub use retraining::{RetrainingAdvisor, RetrainingRecommendation, RetrainingUrgency};
pub use summary::{HealthStatus, SummaryGenerator, SummaryInput, SummaryReport};

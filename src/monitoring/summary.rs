//! Intelligent Summary Generation
//!
//! 監視状態を人間可読なステータスレポートへ合成

use crate::monitoring::alerts::AlertPattern;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 致命的と判定する高深刻度アラート件数
const CRITICAL_ALERTS: usize = 10;

/// 警告と判定する高深刻度アラート件数
const WARNING_ALERTS: usize = 5;

/// 致命的と判定するドリフトイベント件数
const CRITICAL_DRIFT_EVENTS: usize = 3;

/// 警告と判定するドリフトイベント件数
const WARNING_DRIFT_EVENTS: usize = 1;

/// 致命的と判定する的中率の下限
const CRITICAL_ACCURACY: f64 = 0.70;

/// 警告と判定する的中率の下限
const WARNING_ACCURACY: f64 = 0.80;

/// システム全体の健全性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// 健全
    Healthy,
    /// 警告
    Warning,
    /// 致命的
    Critical,
}

/// サマリー生成の入力
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryInput {
    /// 対象期間内の高深刻度アラート件数
    pub high_severity_alerts: usize,
    /// 対象期間内のドリフト検出件数
    pub drift_events: usize,
    /// 直近の予測的中率
    pub accuracy: Option<f64>,
    /// 分析対象のフィードバック件数
    pub feedback_count: usize,
    /// 検出済みアラートパターン
    pub patterns: Vec<AlertPattern>,
}

/// ステータスレポート
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    /// 健全性ステータス
    pub status: HealthStatus,
    /// 自然言語サマリー
    pub summary: String,
    /// 主要な所見
    pub key_findings: Vec<String>,
    /// 優先度順の対応項目（緊急項目が先頭）
    pub action_items: Vec<String>,
    /// 生成時刻
    pub generated_at: DateTime<Utc>,
}

/// サマリー生成器
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryGenerator;

impl SummaryGenerator {
    /// 新しいサマリー生成器を作成
    pub fn new() -> Self {
        Self
    }

    /// 監視入力から健全性ステータスと所見・対応項目を生成
    pub fn generate(&self, input: &SummaryInput) -> SummaryReport {
        let status = Self::classify(input);
        SummaryReport {
            status,
            summary: Self::compose(input, status),
            key_findings: Self::findings(input),
            action_items: Self::actions(input, status),
            generated_at: Utc::now(),
        }
    }

    fn classify(input: &SummaryInput) -> HealthStatus {
        let accuracy = input.accuracy.unwrap_or(1.0);
        if input.high_severity_alerts > CRITICAL_ALERTS
            || input.drift_events > CRITICAL_DRIFT_EVENTS
            || accuracy < CRITICAL_ACCURACY
        {
            HealthStatus::Critical
        } else if input.high_severity_alerts > WARNING_ALERTS
            || input.drift_events > WARNING_DRIFT_EVENTS
            || accuracy < WARNING_ACCURACY
        {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }

    fn findings(input: &SummaryInput) -> Vec<String> {
        let mut findings = Vec::new();
        if input.high_severity_alerts > 0 {
            findings.push(format!(
                "{} high-severity alerts in the review window",
                input.high_severity_alerts
            ));
        }
        if input.drift_events > 0 {
            findings.push(format!("{} drift events recorded", input.drift_events));
        }
        if let Some(accuracy) = input.accuracy {
            findings.push(format!(
                "Recent prediction accuracy is {:.1}%",
                accuracy * 100.0
            ));
        }
        for pattern in &input.patterns {
            findings.push(pattern.description.clone());
        }
        if findings.is_empty() {
            findings.push("No notable alert or drift activity".to_string());
        }
        findings
    }

    /// 緊急項目を先頭に並べた対応項目
    fn actions(input: &SummaryInput, status: HealthStatus) -> Vec<String> {
        let mut urgent = Vec::new();
        let mut routine = Vec::new();

        if status == HealthStatus::Critical {
            urgent.push("Escalate to the on-call analyst: monitoring status is critical".to_string());
        }
        if input.drift_events > 0 {
            urgent.push("Schedule model retraining to address detected drift".to_string());
        }
        if input.high_severity_alerts > 0 {
            routine.push("Triage unread high-severity alerts".to_string());
        }
        if let Some(accuracy) = input.accuracy {
            if accuracy < WARNING_ACCURACY {
                routine.push("Review recent feedback records for labeling issues".to_string());
            }
        }
        for pattern in &input.patterns {
            routine.push(pattern.recommendation.clone());
        }
        if urgent.is_empty() && routine.is_empty() {
            routine.push("Continue routine monitoring".to_string());
        }

        urgent.extend(routine);
        urgent
    }

    fn compose(input: &SummaryInput, status: HealthStatus) -> String {
        let label = match status {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Warning => "degraded",
            HealthStatus::Critical => "critical",
        };
        format!(
            "Model monitoring status is {}: {} feedback records analyzed, {} high-severity alerts and {} drift events observed.",
            label, input.feedback_count, input.high_severity_alerts, input.drift_events
        )
    }
}

//! Alert Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// アラートの深刻度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// 低
    Low,
    /// 中
    Medium,
    /// 高
    High,
}

impl AlertSeverity {
    /// バケット集計キーとしての名前
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// アラートの発生源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertSource {
    /// フィードバックの予測外れ
    FeedbackMismatch,
    /// モデルドリフト検知
    Drift,
    /// 異常検知
    Anomaly,
    /// システム内部
    System,
}

impl AlertSource {
    /// バケット集計キーとしての名前
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FeedbackMismatch => "feedback-mismatch",
            Self::Drift => "drift",
            Self::Anomaly => "anomaly",
            Self::System => "system",
        }
    }
}

/// アラート
///
/// 作成後に変更できるのは read / read_at のみ。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// アラートID
    pub id: Uuid,
    /// 深刻度
    pub severity: AlertSeverity,
    /// メッセージ
    pub message: String,
    /// 発生源
    pub source: AlertSource,
    /// 関連プロセスID
    pub process_id: Option<String>,
    /// 既読フラグ
    pub read: bool,
    /// 作成時刻
    pub created_at: DateTime<Utc>,
    /// 既読時刻
    pub read_at: Option<DateTime<Utc>>,
}

impl Alert {
    /// 新しいアラートを作成
    pub fn new(
        severity: AlertSeverity,
        message: impl Into<String>,
        source: AlertSource,
        process_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity,
            message: message.into(),
            source,
            process_id,
            read: false,
            created_at: Utc::now(),
            read_at: None,
        }
    }

    /// バックフィルやテストのためにタイムスタンプを指定
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// アラートを既読にする
    pub fn mark_read(&mut self) {
        if !self.read {
            self.read = true;
            self.read_at = Some(Utc::now());
        }
    }
}

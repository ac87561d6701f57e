//! Alert Manager Implementation

use super::alert::{Alert, AlertSeverity};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// アラートマネージャー
///
/// 発行済みアラートの保持と既読管理。配信は呼び出し側の責務。
#[derive(Debug, Clone, Default)]
pub struct AlertManager {
    alerts: Arc<RwLock<Vec<Alert>>>,
}

impl AlertManager {
    /// 新しいアラートマネージャーを作成
    pub fn new() -> Self {
        Self {
            alerts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// アラートを追加
    pub async fn add(&self, alert: Alert) {
        let mut alerts = self.alerts.write().await;
        alerts.push(alert);
    }

    /// 全アラートを取得
    pub async fn all(&self) -> Vec<Alert> {
        self.alerts.read().await.clone()
    }

    /// 未読アラートを取得
    pub async fn unread(&self) -> Vec<Alert> {
        let alerts = self.alerts.read().await;
        alerts.iter().filter(|a| !a.read).cloned().collect()
    }

    /// 深刻度で絞り込み
    pub async fn by_severity(&self, severity: AlertSeverity) -> Vec<Alert> {
        let alerts = self.alerts.read().await;
        alerts
            .iter()
            .filter(|a| a.severity == severity)
            .cloned()
            .collect()
    }

    /// 期間 [start, end) のアラートを取得
    pub async fn in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Alert> {
        let alerts = self.alerts.read().await;
        alerts
            .iter()
            .filter(|a| a.created_at >= start && a.created_at < end)
            .cloned()
            .collect()
    }

    /// アラートを既読にする
    pub async fn mark_read(&self, alert_id: Uuid) -> bool {
        let mut alerts = self.alerts.write().await;
        if let Some(alert) = alerts.iter_mut().find(|a| a.id == alert_id) {
            alert.mark_read();
            true
        } else {
            false
        }
    }

    /// 件数
    pub async fn len(&self) -> usize {
        self.alerts.read().await.len()
    }

    /// アラートが空か
    pub async fn is_empty(&self) -> bool {
        self.alerts.read().await.is_empty()
    }
}

//! Drift Detection
//!
//! 直近ウィンドウとベースラインウィンドウの性能比較によるモデル
//! ドリフト検知

use crate::config::DriftConfig;
use crate::monitoring::alerts::{Alert, AlertSeverity, AlertSource};
use crate::monitoring::feedback::{FeedbackLedger, FeedbackRecord, OutcomeLabel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

/// ドリフト検査を実行できる最小の直近ウィンドウ件数
const MIN_RECENT: usize = 20;

/// ドリフト検査を実行できる最小のベースライン件数
const MIN_BASELINE: usize = 50;

/// ドリフト判定の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DriftStatus {
    /// 安定
    Stable,
    /// ドリフト検出
    DriftDetected,
    /// フィードバック不足
    InsufficientData,
}

/// ウィンドウごとの性能指標
///
/// F1 は「high」を正例として計算する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowMetrics {
    /// ウィンドウ内の件数
    pub size: usize,
    /// 的中率
    pub accuracy: f64,
    /// 適合率
    pub precision: f64,
    /// 再現率
    pub recall: f64,
    /// F1スコア
    pub f1: f64,
}

impl WindowMetrics {
    /// フィードバックレコードから性能指標を計算
    pub fn from_records(records: &[FeedbackRecord]) -> Self {
        let size = records.len();
        if size == 0 {
            return Self {
                size: 0,
                accuracy: 0.0,
                precision: 0.0,
                recall: 0.0,
                f1: 0.0,
            };
        }

        let matched = records.iter().filter(|r| r.matched).count();
        let accuracy = matched as f64 / size as f64;

        let true_positive = records
            .iter()
            .filter(|r| r.predicted == OutcomeLabel::High && r.actual == OutcomeLabel::High)
            .count() as f64;
        let false_positive = records
            .iter()
            .filter(|r| r.predicted == OutcomeLabel::High && r.actual != OutcomeLabel::High)
            .count() as f64;
        let false_negative = records
            .iter()
            .filter(|r| r.predicted != OutcomeLabel::High && r.actual == OutcomeLabel::High)
            .count() as f64;

        let precision = if true_positive + false_positive > 0.0 {
            true_positive / (true_positive + false_positive)
        } else {
            0.0
        };
        let recall = if true_positive + false_negative > 0.0 {
            true_positive / (true_positive + false_negative)
        } else {
            0.0
        };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            size,
            accuracy,
            precision,
            recall,
            f1,
        }
    }
}

/// ドリフト判定の閾値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftThresholds {
    /// 的中率低下の閾値
    pub accuracy_drop: f64,
    /// F1低下の閾値
    pub f1_drop: f64,
}

/// ドリフトイベント
///
/// 検査1回につき1件生成され、履歴として保持される。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftEvent {
    /// イベントID
    pub id: Uuid,
    /// 判定結果
    pub status: DriftStatus,
    /// 直近ウィンドウの件数
    pub window_size: usize,
    /// ベースラインウィンドウの件数
    pub baseline_size: usize,
    /// 的中率の低下量
    pub accuracy_drop: f64,
    /// F1の低下量
    pub f1_drop: f64,
    /// 直近ウィンドウの指標
    pub recent_metrics: WindowMetrics,
    /// ベースラインウィンドウの指標
    pub baseline_metrics: WindowMetrics,
    /// 判定に使用した閾値
    pub thresholds: DriftThresholds,
    /// 作成時刻
    pub created_at: DateTime<Utc>,
}

/// ドリフト検査の結果
///
/// アラートは値として返すだけで、配信は呼び出し側が決める。
#[derive(Debug, Clone)]
pub struct DriftCheck {
    /// 生成されたドリフトイベント
    pub event: DriftEvent,
    /// ドリフト検出時のみ生成される高深刻度アラート
    pub alert: Option<Alert>,
}

/// ドリフト検知器
///
/// 各検査は履歴の読み取りと新規イベントの追記のみを行うため、
/// 複数の検査を並行に実行しても調整は不要。
#[derive(Debug, Clone)]
pub struct DriftDetector {
    config: DriftConfig,
    history: Arc<RwLock<Vec<DriftEvent>>>,
}

impl DriftDetector {
    /// 新しいドリフト検知器を作成
    pub fn new(config: DriftConfig) -> Self {
        Self {
            config,
            history: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// 設定を取得
    pub fn config(&self) -> &DriftConfig {
        &self.config
    }

    /// 台帳の先頭を直近 / ベースラインに分割して性能低下を検査
    ///
    /// フィードバック不足は想定内の状態として insufficient-data を
    /// 返し、エラーにはしない。検査ごとに必ずイベントを履歴へ残す。
    pub async fn check(&self, ledger: &FeedbackLedger) -> DriftCheck {
        let recent = ledger.recent(0, self.config.window_size).await;
        let baseline = ledger
            .recent(self.config.window_size, self.config.baseline_size)
            .await;

        let thresholds = DriftThresholds {
            accuracy_drop: self.config.accuracy_drop_threshold,
            f1_drop: self.config.f1_drop_threshold,
        };
        let recent_metrics = WindowMetrics::from_records(&recent);
        let baseline_metrics = WindowMetrics::from_records(&baseline);

        let (status, accuracy_drop, f1_drop) =
            if recent.len() < MIN_RECENT || baseline.len() < MIN_BASELINE {
                (DriftStatus::InsufficientData, 0.0, 0.0)
            } else {
                let accuracy_drop = baseline_metrics.accuracy - recent_metrics.accuracy;
                let f1_drop = baseline_metrics.f1 - recent_metrics.f1;
                let drifted = accuracy_drop > thresholds.accuracy_drop
                    || f1_drop > thresholds.f1_drop;
                let status = if drifted {
                    DriftStatus::DriftDetected
                } else {
                    DriftStatus::Stable
                };
                (status, accuracy_drop, f1_drop)
            };

        let event = DriftEvent {
            id: Uuid::new_v4(),
            status,
            window_size: recent.len(),
            baseline_size: baseline.len(),
            accuracy_drop,
            f1_drop,
            recent_metrics,
            baseline_metrics,
            thresholds,
            created_at: Utc::now(),
        };

        let alert = if status == DriftStatus::DriftDetected {
            warn!(
                "Model drift detected: accuracy drop {:.3}, f1 drop {:.3}",
                accuracy_drop, f1_drop
            );
            Some(Alert::new(
                AlertSeverity::High,
                format!(
                    "Model drift detected: accuracy dropped by {:.1}%, F1 by {:.1}%",
                    accuracy_drop * 100.0,
                    f1_drop * 100.0
                ),
                AlertSource::Drift,
                None,
            ))
        } else {
            debug!("Drift check completed: {:?}", status);
            None
        };

        {
            let mut history = self.history.write().await;
            history.push(event.clone());
        }

        DriftCheck { event, alert }
    }

    /// これまでのドリフトイベント履歴
    pub async fn history(&self) -> Vec<DriftEvent> {
        self.history.read().await.clone()
    }

    /// 直近 n 件のイベント（新しい順）
    pub async fn recent_events(&self, n: usize) -> Vec<DriftEvent> {
        let history = self.history.read().await;
        history.iter().rev().take(n).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    /// 指定した的中数のレコード列を降順時刻で生成して追記
    async fn fill_window(
        ledger: &FeedbackLedger,
        count: usize,
        matched: usize,
        start: DateTime<Utc>,
    ) {
        for i in 0..count {
            let actual = if i < matched {
                OutcomeLabel::Low
            } else {
                OutcomeLabel::Medium
            };
            let record = FeedbackRecord::new(
                format!("proc-{}", i),
                OutcomeLabel::Low,
                actual,
                "v1",
                "review",
            )
            .with_created_at(start + Duration::seconds(i as i64));
            ledger.append(record).await;
        }
    }

    fn test_config() -> DriftConfig {
        DriftConfig {
            window_size: 20,
            baseline_size: 50,
            ..DriftConfig::default()
        }
    }

    #[tokio::test]
    async fn test_drift_detected_on_accuracy_drop() {
        let ledger = FeedbackLedger::new();
        let base = Utc::now();
        // ベースライン50件: 的中率0.80（古い側）
        fill_window(&ledger, 50, 40, base).await;
        // 直近20件: 的中率0.70
        fill_window(&ledger, 20, 14, base + Duration::hours(1)).await;

        let detector = DriftDetector::new(test_config());
        let check = detector.check(&ledger).await;

        assert_eq!(check.event.status, DriftStatus::DriftDetected);
        assert!((check.event.accuracy_drop - 0.10).abs() < 1e-9);

        let alert = check.alert.expect("drift must raise an alert");
        assert_eq!(alert.severity, AlertSeverity::High);
        assert_eq!(alert.source, AlertSource::Drift);
    }

    #[tokio::test]
    async fn test_stable_below_threshold() {
        let ledger = FeedbackLedger::new();
        let base = Utc::now();
        // ベースライン的中率0.76、直近0.70: 低下0.06は閾値以下
        fill_window(&ledger, 50, 38, base).await;
        fill_window(&ledger, 20, 14, base + Duration::hours(1)).await;

        let detector = DriftDetector::new(test_config());
        let check = detector.check(&ledger).await;

        assert_eq!(check.event.status, DriftStatus::Stable);
        assert!(check.alert.is_none());
    }

    #[tokio::test]
    async fn test_insufficient_data_is_soft() {
        let ledger = FeedbackLedger::new();
        let base = Utc::now();
        fill_window(&ledger, 30, 30, base).await;

        let detector = DriftDetector::new(test_config());
        let check = detector.check(&ledger).await;

        assert_eq!(check.event.status, DriftStatus::InsufficientData);
        assert!(check.alert.is_none());
        assert_eq!(check.event.accuracy_drop, 0.0);

        // イベント自体は履歴に残る
        let history = detector.history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, DriftStatus::InsufficientData);
    }

    #[tokio::test]
    async fn test_f1_drop_triggers_drift() {
        let ledger = FeedbackLedger::new();
        let base = Utc::now();

        // ベースライン50件: high予測が全て的中 (F1 = 1.0)
        for i in 0..50 {
            let record = FeedbackRecord::new(
                format!("base-{}", i),
                OutcomeLabel::High,
                OutcomeLabel::High,
                "v1",
                "review",
            )
            .with_created_at(base + Duration::seconds(i));
            ledger.append(record).await;
        }
        // 直近20件: high予測の半分が外れ、的中率0.50・F1 ≈ 0.67
        for i in 0..20 {
            let actual = if i % 2 == 0 {
                OutcomeLabel::High
            } else {
                OutcomeLabel::Low
            };
            let record = FeedbackRecord::new(
                format!("recent-{}", i),
                OutcomeLabel::High,
                actual,
                "v2",
                "review",
            )
            .with_created_at(base + Duration::hours(1) + Duration::seconds(i));
            ledger.append(record).await;
        }

        let detector = DriftDetector::new(test_config());
        let check = detector.check(&ledger).await;

        assert_eq!(check.event.status, DriftStatus::DriftDetected);
        assert!(check.event.f1_drop > 0.08);
    }

    #[tokio::test]
    async fn test_recent_events_order() {
        let ledger = FeedbackLedger::new();
        let detector = DriftDetector::new(test_config());

        detector.check(&ledger).await;
        detector.check(&ledger).await;
        detector.check(&ledger).await;

        let events = detector.recent_events(2).await;
        assert_eq!(events.len(), 2);
        let history = detector.history().await;
        assert_eq!(history.len(), 3);
        assert_eq!(events[0].id, history[2].id);
    }
}

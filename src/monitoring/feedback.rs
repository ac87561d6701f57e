//! Feedback Ledger
//!
//! 予測と実績の対を記録する追記専用台帳

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// リスク水準ラベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeLabel {
    /// 低リスク
    Low,
    /// 中リスク
    Medium,
    /// 高リスク
    High,
}

/// フィードバックレコード
///
/// 作成後は不変。predicted と actual の一致は作成時に計算する。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// レコードID
    pub id: Uuid,
    /// 対象プロセスID
    pub process_id: String,
    /// 予測されたリスク水準
    pub predicted: OutcomeLabel,
    /// 実際のリスク水準
    pub actual: OutcomeLabel,
    /// 予測を生成したモデルのバージョン
    pub model_version: String,
    /// レコードの発生源
    pub source: String,
    /// 予測が的中したか
    pub matched: bool,
    /// 作成時刻
    pub created_at: DateTime<Utc>,
}

impl FeedbackRecord {
    /// 新しいフィードバックレコードを作成
    pub fn new(
        process_id: impl Into<String>,
        predicted: OutcomeLabel,
        actual: OutcomeLabel,
        model_version: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            process_id: process_id.into(),
            predicted,
            actual,
            model_version: model_version.into(),
            source: source.into(),
            matched: predicted == actual,
            created_at: Utc::now(),
        }
    }

    /// バックフィルやテストのためにタイムスタンプを指定
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// フィードバック台帳
///
/// 追記専用。読み取りは並行に安全で、ハンドルは安価に複製できる。
#[derive(Debug, Clone, Default)]
pub struct FeedbackLedger {
    records: Arc<RwLock<Vec<FeedbackRecord>>>,
}

impl FeedbackLedger {
    /// 新しい台帳を作成
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// レコードを追記
    pub async fn append(&self, record: FeedbackRecord) {
        let mut records = self.records.write().await;
        records.push(record);
    }

    /// 予測と実績の対から新しいレコードを作成して追記
    pub async fn record(
        &self,
        process_id: impl Into<String>,
        predicted: OutcomeLabel,
        actual: OutcomeLabel,
        model_version: impl Into<String>,
        source: impl Into<String>,
    ) -> FeedbackRecord {
        let record = FeedbackRecord::new(process_id, predicted, actual, model_version, source);
        self.append(record.clone()).await;
        record
    }

    /// 作成時刻の降順で offset / limit 取得
    pub async fn recent(&self, offset: usize, limit: usize) -> Vec<FeedbackRecord> {
        let records = self.records.read().await;
        let mut sorted: Vec<FeedbackRecord> = records.clone();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted.into_iter().skip(offset).take(limit).collect()
    }

    /// 期間 [start, end) のレコードを取得
    pub async fn in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<FeedbackRecord> {
        let records = self.records.read().await;
        records
            .iter()
            .filter(|r| r.created_at >= start && r.created_at < end)
            .cloned()
            .collect()
    }

    /// 件数
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// 台帳が空か
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// 直近 n 件の的中率
    pub async fn accuracy_over_last(&self, n: usize) -> Option<f64> {
        let recent = self.recent(0, n).await;
        if recent.is_empty() {
            return None;
        }
        let matched = recent.iter().filter(|r| r.matched).count();
        Some(matched as f64 / recent.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_record_computes_match() {
        let ledger = FeedbackLedger::new();
        let hit = ledger
            .record("proc-1", OutcomeLabel::High, OutcomeLabel::High, "v1", "review")
            .await;
        let miss = ledger
            .record("proc-2", OutcomeLabel::Low, OutcomeLabel::High, "v1", "review")
            .await;

        assert!(hit.matched);
        assert!(!miss.matched);
        assert_eq!(ledger.len().await, 2);
    }

    #[tokio::test]
    async fn test_recent_is_descending_with_offset() {
        let ledger = FeedbackLedger::new();
        let base = Utc::now();
        for i in 0..5 {
            let record = FeedbackRecord::new(
                format!("proc-{}", i),
                OutcomeLabel::Low,
                OutcomeLabel::Low,
                "v1",
                "batch",
            )
            .with_created_at(base + Duration::seconds(i));
            ledger.append(record).await;
        }

        let latest = ledger.recent(0, 2).await;
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].process_id, "proc-4");
        assert_eq!(latest[1].process_id, "proc-3");

        let older = ledger.recent(2, 2).await;
        assert_eq!(older[0].process_id, "proc-2");
        assert_eq!(older[1].process_id, "proc-1");
    }

    #[tokio::test]
    async fn test_in_range_is_half_open() {
        let ledger = FeedbackLedger::new();
        let base = Utc::now();
        for i in 0..3 {
            let record = FeedbackRecord::new(
                format!("proc-{}", i),
                OutcomeLabel::Medium,
                OutcomeLabel::Medium,
                "v1",
                "batch",
            )
            .with_created_at(base + Duration::minutes(i));
            ledger.append(record).await;
        }

        let window = ledger
            .in_range(base, base + Duration::minutes(2))
            .await;
        assert_eq!(window.len(), 2);
    }

    #[tokio::test]
    async fn test_accuracy_over_last() {
        let ledger = FeedbackLedger::new();
        let base = Utc::now();
        for i in 0..4 {
            let actual = if i < 3 {
                OutcomeLabel::High
            } else {
                OutcomeLabel::Low
            };
            let record = FeedbackRecord::new(
                "proc-1",
                OutcomeLabel::High,
                actual,
                "v1",
                "review",
            )
            .with_created_at(base + Duration::seconds(i));
            ledger.append(record).await;
        }

        let accuracy = ledger.accuracy_over_last(4).await.unwrap();
        assert!((accuracy - 0.75).abs() < 1e-9);
        assert!(ledger.accuracy_over_last(0).await.is_none());
    }
}

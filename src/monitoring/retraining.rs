//! Retraining Advisor
//!
//! ドリフト状態とデータ量からの再学習推奨

use crate::config::RetrainingConfig;
use crate::monitoring::drift::{DriftEvent, DriftStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// 再学習の緊急度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrainingUrgency {
    /// 不要
    None,
    /// 低
    Low,
    /// 高
    High,
}

/// 再学習の推奨結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrainingRecommendation {
    /// 再学習すべきか
    pub should_retrain: bool,
    /// 緊急度
    pub urgency: RetrainingUrgency,
    /// 判定理由
    pub reasons: Vec<String>,
    /// 生成時刻
    pub generated_at: DateTime<Utc>,
}

/// 再学習アドバイザー
#[derive(Debug, Clone)]
pub struct RetrainingAdvisor {
    config: RetrainingConfig,
}

impl RetrainingAdvisor {
    /// 新しいアドバイザーを作成
    pub fn new(config: RetrainingConfig) -> Self {
        Self { config }
    }

    /// ドリフト履歴・フィードバック量・モデル年齢から再学習可否を判定
    ///
    /// drift_events は古い順に並んだ履歴を受け取り、末尾の
    /// drift_lookback 件だけを参照する。
    pub fn advise(
        &self,
        drift_events: &[DriftEvent],
        feedback_count: usize,
        last_trained_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> RetrainingRecommendation {
        let mut reasons = Vec::new();
        let mut urgency = RetrainingUrgency::None;

        let drifted = drift_events
            .iter()
            .rev()
            .take(self.config.drift_lookback)
            .filter(|event| event.status == DriftStatus::DriftDetected)
            .count();
        if drifted > 0 {
            reasons.push(format!(
                "{} of the last {} drift checks detected drift",
                drifted, self.config.drift_lookback
            ));
            urgency = RetrainingUrgency::High;
        }

        if feedback_count >= self.config.min_feedback_records {
            reasons.push(format!(
                "{} feedback records accumulated since last training (threshold {})",
                feedback_count, self.config.min_feedback_records
            ));
            if urgency == RetrainingUrgency::None {
                urgency = RetrainingUrgency::Low;
            }
        }

        if let Some(trained_at) = last_trained_at {
            let age_days = (now - trained_at).num_days();
            if age_days > self.config.max_model_age_days {
                reasons.push(format!(
                    "model is {} days old (threshold {})",
                    age_days, self.config.max_model_age_days
                ));
                if urgency == RetrainingUrgency::None {
                    urgency = RetrainingUrgency::Low;
                }
            }
        }

        let should_retrain = !reasons.is_empty();
        if should_retrain {
            info!("Retraining recommended: {}", reasons.join("; "));
        }

        RetrainingRecommendation {
            should_retrain,
            urgency,
            reasons,
            generated_at: now,
        }
    }
}

//! Configuration Types
//!
//! 分析エンジンと監視パイプラインの設定型定義

use serde::{Deserialize, Serialize};

/// 異常検知の手法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnomalyMethod {
    /// Z-スコア法
    #[serde(rename = "zscore")]
    ZScore,
    /// IQR法（四分位範囲）
    Iqr,
    /// 簡易Isolation Forest（近傍距離による近似）
    IsolationForest,
    /// マハラノビス距離（対角共分散近似）
    Mahalanobis,
}

/// 異常検知の設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyConfig {
    /// 検知手法
    pub method: AnomalyMethod,
    /// 異常判定の閾値
    pub threshold: f64,
    /// リアルタイム監視の履歴ウィンドウサイズ
    pub window_size: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            method: AnomalyMethod::ZScore,
            threshold: 2.5,
            window_size: 10,
        }
    }
}

/// クラスタリングの設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// クラスタ数
    pub k: usize,
    /// 最大反復回数
    pub max_iterations: usize,
    /// 収束判定の許容誤差
    pub tolerance: f64,
    /// 乱数シード（テスト用の決定的実行）
    pub seed: Option<u64>,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            k: 3,
            max_iterations: 100,
            tolerance: 1e-4,
            seed: None,
        }
    }
}

/// 予測モデルの設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// AR次数
    pub p: usize,
    /// 差分化の階数
    pub d: usize,
    /// MA次数
    pub q: usize,
    /// 季節周期
    pub seasonal_period: usize,
    /// 予測ステップ数
    pub forecast_steps: usize,
    /// 乱数シード（テスト用の決定的実行）
    pub seed: Option<u64>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            p: 2,
            d: 1,
            q: 1,
            seasonal_period: 12,
            forecast_steps: 12,
            seed: None,
        }
    }
}

/// ドリフト検知の設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftConfig {
    /// 直近ウィンドウの件数
    pub window_size: usize,
    /// ベースラインウィンドウの件数
    pub baseline_size: usize,
    /// 的中率低下の閾値
    pub accuracy_drop_threshold: f64,
    /// F1低下の閾値
    pub f1_drop_threshold: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            window_size: 200,
            baseline_size: 1000,
            accuracy_drop_threshold: 0.08,
            f1_drop_threshold: 0.08,
        }
    }
}

/// 再学習推奨の設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrainingConfig {
    /// 再学習を推奨するフィードバック蓄積件数
    pub min_feedback_records: usize,
    /// モデルの最大許容日齢
    pub max_model_age_days: i64,
    /// 参照する直近ドリフト検査の件数
    pub drift_lookback: usize,
}

impl Default for RetrainingConfig {
    fn default() -> Self {
        Self {
            min_feedback_records: 500,
            max_model_age_days: 30,
            drift_lookback: 5,
        }
    }
}

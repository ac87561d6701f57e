//! Anomaly Detection Types
//!
//! 異常検知用の型定義

use crate::config::AnomalyMethod;
use serde::{Deserialize, Serialize};

/// 異常の深刻度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    /// 正常
    Normal,
    /// 低
    Low,
    /// 中
    Medium,
    /// 高
    High,
    /// 致命的
    Critical,
}

impl AnomalySeverity {
    /// バッチ内最大スコアで正規化した比率から深刻度を判定
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 0.9 {
            Self::Critical
        } else if ratio > 0.7 {
            Self::High
        } else if ratio > 0.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// 学習済み異常検知モデル
///
/// fit() が生成する不変の状態値。検知は共有参照のみで行えるため
/// 並行読み取りに安全。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyModel {
    /// 異常判定の閾値
    pub threshold: f64,
    /// 特徴量ごとの平均
    pub means: Vec<f64>,
    /// 特徴量ごとの標準偏差
    pub std_devs: Vec<f64>,
    /// 特徴量ごとの第1四分位数
    pub q1: Vec<f64>,
    /// 特徴量ごとの第3四分位数
    pub q3: Vec<f64>,
}

impl AnomalyModel {
    /// 特徴量の次元数
    pub fn dimensions(&self) -> usize {
        self.means.len()
    }
}

/// 異常と判定されたポイント
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyPoint {
    /// 入力バッチ内の添字
    pub index: usize,
    /// 異常スコア
    pub score: f64,
    /// 深刻度
    pub severity: AnomalySeverity,
}

/// バッチ検知の結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    /// 異常と判定されたポイント
    pub anomalies: Vec<AnomalyPoint>,
    /// 全ポイントのスコア
    pub scores: Vec<f64>,
    /// 使用した手法
    pub method: AnomalyMethod,
    /// 使用した閾値
    pub threshold: f64,
}

/// リアルタイム検知の結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeDetection {
    /// 異常フラグ
    pub is_anomaly: bool,
    /// 異常スコア
    pub score: f64,
    /// 深刻度（正常時は normal）
    pub severity: AnomalySeverity,
}

/// 学習済みモデルの統計サマリー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    /// 特徴量の次元数
    pub dimensions: usize,
    /// 異常判定の閾値
    pub threshold: f64,
    /// 特徴量ごとの平均
    pub means: Vec<f64>,
    /// 特徴量ごとの標準偏差
    pub std_devs: Vec<f64>,
    /// 特徴量ごとの第1四分位数
    pub q1: Vec<f64>,
    /// 特徴量ごとの第3四分位数
    pub q3: Vec<f64>,
}

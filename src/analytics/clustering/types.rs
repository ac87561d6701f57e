//! Clustering Types
//!
//! クラスタリング用の型定義

use serde::{Deserialize, Serialize};

/// 学習済みクラスタモデル
///
/// fit() が生成する不変の状態値。predict() は共有参照のみで行える。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterModel {
    /// クラスタ数
    pub k: usize,
    /// セントロイド座標
    pub centroids: Vec<Vec<f64>>,
}

impl ClusterModel {
    /// 特徴量の次元数
    pub fn dimensions(&self) -> usize {
        self.centroids.first().map(|c| c.len()).unwrap_or(0)
    }
}

/// クラスタリングの結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringResult {
    /// クラスタごとのポイント添字
    pub clusters: Vec<Vec<usize>>,
    /// セントロイド座標
    pub centroids: Vec<Vec<f64>>,
    /// ポイントごとの割り当てラベル
    pub labels: Vec<usize>,
    /// 実行した反復回数
    pub iterations: usize,
    /// 慣性（割り当てセントロイドへの二乗距離の総和）
    pub inertia: f64,
    /// 反復ごとの慣性の推移
    pub inertia_history: Vec<f64>,
    /// シルエットスコア
    pub silhouette: f64,
}

/// エルボー法の結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElbowResult {
    /// 推定された最適クラスタ数
    pub optimal_k: usize,
    /// k = 1..=max_k の慣性曲線
    pub inertias: Vec<f64>,
}

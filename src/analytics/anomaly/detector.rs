//! Anomaly Detector Implementation
//!
//! 異常検知器の実装

use super::types::{
    AnomalyModel, AnomalyPoint, AnomalySeverity, DetectionResult, FeatureStats, RealtimeDetection,
};
use crate::config::{AnomalyConfig, AnomalyMethod};
use crate::error::{Error, Result};
use crate::stats;

/// ゼロ分散・ゼロIQRでの除算を避ける微小値
const EPSILON: f64 = 1e-10;

/// 簡易Isolation Forestで参照する近傍数
const NEIGHBOR_COUNT: usize = 5;

impl AnomalyModel {
    /// データからベースライン統計を学習
    pub fn fit(data: &[Vec<f64>], threshold: f64) -> Result<Self> {
        if data.is_empty() || data[0].is_empty() {
            return Err(Error::EmptyInput);
        }
        let dimensions = data[0].len();
        for row in data {
            if row.len() != dimensions {
                return Err(Error::DimensionMismatch {
                    expected: dimensions,
                    actual: row.len(),
                });
            }
        }

        let mut means = Vec::with_capacity(dimensions);
        let mut std_devs = Vec::with_capacity(dimensions);
        let mut q1 = Vec::with_capacity(dimensions);
        let mut q3 = Vec::with_capacity(dimensions);

        for j in 0..dimensions {
            let column: Vec<f64> = data.iter().map(|row| row[j]).collect();
            means.push(stats::mean(&column));
            std_devs.push(stats::std_dev(&column));
            let (lo, hi) = stats::quartiles(&column);
            q1.push(lo);
            q3.push(hi);
        }

        Ok(Self {
            threshold,
            means,
            std_devs,
            q1,
            q3,
        })
    }

    /// 学習時と同じベースライン統計でバッチを検知
    ///
    /// 手法は学習とは独立に選択できる。
    pub fn detect(&self, data: &[Vec<f64>], method: AnomalyMethod) -> Result<DetectionResult> {
        for row in data {
            self.check_dimensions(row)?;
        }

        let scored: Vec<(f64, bool)> = match method {
            AnomalyMethod::ZScore => data
                .iter()
                .map(|point| {
                    let score = self.zscore(point);
                    (score, score > self.threshold)
                })
                .collect(),
            AnomalyMethod::Iqr => data.iter().map(|point| self.iqr(point)).collect(),
            AnomalyMethod::IsolationForest => self.isolation(data),
            AnomalyMethod::Mahalanobis => data
                .iter()
                .map(|point| {
                    let score = self.mahalanobis(point);
                    (score, score > self.threshold)
                })
                .collect(),
        };

        let max_score = scored.iter().map(|(s, _)| *s).fold(0.0_f64, f64::max);
        let anomalies = scored
            .iter()
            .enumerate()
            .filter(|(_, (_, flagged))| *flagged)
            .map(|(index, (score, _))| {
                let ratio = if max_score > 0.0 { score / max_score } else { 0.0 };
                AnomalyPoint {
                    index,
                    score: *score,
                    severity: AnomalySeverity::from_ratio(ratio),
                }
            })
            .collect();

        Ok(DetectionResult {
            anomalies,
            scores: scored.into_iter().map(|(s, _)| s).collect(),
            method,
            threshold: self.threshold,
        })
    }

    /// 単一ポイントの検知
    pub fn detect_realtime(
        &self,
        point: &[f64],
        method: AnomalyMethod,
    ) -> Result<RealtimeDetection> {
        let batch = vec![point.to_vec()];
        let result = self.detect(&batch, method)?;
        let score = result.scores[0];
        match result.anomalies.first() {
            Some(anomaly) => Ok(RealtimeDetection {
                is_anomaly: true,
                score,
                severity: anomaly.severity,
            }),
            None => Ok(RealtimeDetection {
                is_anomaly: false,
                score,
                severity: AnomalySeverity::Normal,
            }),
        }
    }

    /// 学習済み統計のスナップショット
    pub fn stats(&self) -> FeatureStats {
        FeatureStats {
            dimensions: self.dimensions(),
            threshold: self.threshold,
            means: self.means.clone(),
            std_devs: self.std_devs.clone(),
            q1: self.q1.clone(),
            q3: self.q3.clone(),
        }
    }

    fn check_dimensions(&self, point: &[f64]) -> Result<()> {
        if point.len() != self.dimensions() {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions(),
                actual: point.len(),
            });
        }
        Ok(())
    }

    /// 特徴量ごとのZスコアの最大値
    fn zscore(&self, point: &[f64]) -> f64 {
        point
            .iter()
            .enumerate()
            .map(|(j, value)| (value - self.means[j]).abs() / (self.std_devs[j] + EPSILON))
            .fold(0.0_f64, f64::max)
    }

    /// IQR境界の外に出た特徴量のスコアを累積
    fn iqr(&self, point: &[f64]) -> (f64, bool) {
        let mut score = 0.0;
        let mut flagged = false;
        for (j, value) in point.iter().enumerate() {
            let iqr = self.q3[j] - self.q1[j];
            let lower = self.q1[j] - 1.5 * iqr;
            let upper = self.q3[j] + 1.5 * iqr;
            if *value < lower || *value > upper {
                flagged = true;
                score += (value - self.q1[j]).abs() / (iqr + EPSILON);
            }
        }
        (score, flagged)
    }

    /// バッチ内近傍距離をシグモイドに通した簡易Isolation Forestスコア
    ///
    /// 木を構築しない近似。閾値は他手法の1/3で判定する。
    fn isolation(&self, data: &[Vec<f64>]) -> Vec<(f64, bool)> {
        let cutoff = self.threshold / 3.0;
        data.iter()
            .enumerate()
            .map(|(i, point)| {
                let mut distances: Vec<f64> = data
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, other)| stats::euclidean_distance(point, other))
                    .collect();
                distances.sort_by(|a, b| a.partial_cmp(b).unwrap());
                let neighbors = &distances[..distances.len().min(NEIGHBOR_COUNT)];
                let avg_dist = stats::mean(neighbors);
                let score = 1.0 / (1.0 + (-(avg_dist - 1.0)).exp());
                (score, score > cutoff)
            })
            .collect()
    }

    /// 対角共分散のみを使うマハラノビス距離の近似
    fn mahalanobis(&self, point: &[f64]) -> f64 {
        point
            .iter()
            .enumerate()
            .map(|(j, value)| {
                let variance = self.std_devs[j] * self.std_devs[j];
                (value - self.means[j]).powi(2) / (variance + EPSILON)
            })
            .sum::<f64>()
            .sqrt()
    }
}

/// 異常検知器
///
/// fit() で不変の AnomalyModel を生成し、以後の検知はモデルへの
/// 共有参照で行う。
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
    model: Option<AnomalyModel>,
}

impl AnomalyDetector {
    /// 新しい異常検知器を作成
    pub fn new(config: AnomalyConfig) -> Self {
        Self {
            config,
            model: None,
        }
    }

    /// 設定を取得
    pub fn config(&self) -> &AnomalyConfig {
        &self.config
    }

    /// 学習済みモデルを取得
    pub fn model(&self) -> Option<&AnomalyModel> {
        self.model.as_ref()
    }

    /// ベースライン統計を学習
    pub fn fit(&mut self, data: &[Vec<f64>]) -> Result<()> {
        self.model = Some(AnomalyModel::fit(data, self.config.threshold)?);
        Ok(())
    }

    /// バッチ検知
    pub fn detect(&self, data: &[Vec<f64>], method: AnomalyMethod) -> Result<DetectionResult> {
        self.fitted("detect")?.detect(data, method)
    }

    /// 設定された手法による単一ポイントのリアルタイム検知
    pub fn detect_realtime(&self, point: &[f64]) -> Result<RealtimeDetection> {
        self.fitted("detect_realtime")?
            .detect_realtime(point, self.config.method)
    }

    /// 学習済み統計のスナップショット
    pub fn stats(&self) -> Result<FeatureStats> {
        Ok(self.fitted("stats")?.stats())
    }

    fn fitted(&self, operation: &str) -> Result<&AnomalyModel> {
        self.model
            .as_ref()
            .ok_or_else(|| Error::ModelNotFitted(operation.to_string()))
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(AnomalyConfig::default())
    }
}

//! K-Means Clustering Engine
//!
//! k-means++ 初期化と Lloyd 法によるクラスタリングエンジン

use super::types::{ClusterModel, ClusteringResult, ElbowResult};
use crate::config::ClusteringConfig;
use crate::error::{Error, Result};
use crate::stats;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// クラスタリングエンジン
///
/// fit() で不変の ClusterModel を生成し、predict() は共有参照で行う。
#[derive(Debug, Clone)]
pub struct ClusteringEngine {
    config: ClusteringConfig,
    model: Option<ClusterModel>,
}

impl ClusteringEngine {
    /// 新しいクラスタリングエンジンを作成
    pub fn new(config: ClusteringConfig) -> Self {
        Self {
            config,
            model: None,
        }
    }

    /// 設定を取得
    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// 学習済みモデルを取得
    pub fn model(&self) -> Option<&ClusterModel> {
        self.model.as_ref()
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// k-means クラスタリングを実行してモデルを学習
    pub fn fit(&mut self, data: &[Vec<f64>]) -> Result<ClusteringResult> {
        let mut rng = self.rng();
        let result = Self::run_kmeans(data, &self.config, &mut rng)?;
        self.model = Some(ClusterModel {
            k: self.config.k,
            centroids: result.centroids.clone(),
        });
        Ok(result)
    }

    /// 学習済みセントロイドへ新規ポイントを割り当て
    pub fn predict(&self, data: &[Vec<f64>]) -> Result<Vec<usize>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| Error::ModelNotFitted("predict".to_string()))?;
        let dimensions = model.dimensions();
        data.iter()
            .map(|point| {
                if point.len() != dimensions {
                    return Err(Error::DimensionMismatch {
                        expected: dimensions,
                        actual: point.len(),
                    });
                }
                Ok(Self::nearest_centroid(point, &model.centroids))
            })
            .collect()
    }

    /// エルボー法による最適クラスタ数の推定
    ///
    /// k = 1..=max_k を独立に学習し、慣性曲線の二階差分が最大となる
    /// k を肘として選ぶ。
    pub fn elbow(&self, data: &[Vec<f64>], max_k: usize) -> Result<ElbowResult> {
        if data.is_empty() {
            return Err(Error::EmptyInput);
        }
        if max_k == 0 {
            return Err(Error::InvalidConfiguration(
                "max_k must be positive".to_string(),
            ));
        }

        let upper = max_k.min(data.len());
        let mut inertias = Vec::with_capacity(upper);
        for k in 1..=upper {
            let config = ClusteringConfig {
                k,
                ..self.config.clone()
            };
            let mut rng = self.rng();
            let result = Self::run_kmeans(data, &config, &mut rng)?;
            inertias.push(result.inertia);
        }

        let mut optimal_k = 1;
        let mut best_curvature = f64::NEG_INFINITY;
        for i in 1..inertias.len().saturating_sub(1) {
            let curvature = inertias[i - 1] - 2.0 * inertias[i] + inertias[i + 1];
            if curvature > best_curvature {
                best_curvature = curvature;
                optimal_k = i + 1;
            }
        }

        Ok(ElbowResult {
            optimal_k,
            inertias,
        })
    }

    fn run_kmeans(
        data: &[Vec<f64>],
        config: &ClusteringConfig,
        rng: &mut StdRng,
    ) -> Result<ClusteringResult> {
        if data.is_empty() {
            return Err(Error::EmptyInput);
        }
        let n = data.len();
        let k = config.k;
        if k == 0 || k > n {
            return Err(Error::InvalidConfiguration(format!(
                "k must be in 1..={}, got {}",
                n, k
            )));
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

        let mut centroids = Self::seed_centroids(data, k, rng);
        let mut labels = vec![0usize; n];
        let mut inertia = f64::INFINITY;
        let mut inertia_history = Vec::new();
        let mut iterations = 0;

        for iteration in 0..config.max_iterations {
            iterations = iteration + 1;

            for (i, point) in data.iter().enumerate() {
                labels[i] = Self::nearest_centroid(point, &centroids);
            }

            // クラスタ平均でセントロイドを更新（空クラスタは前回位置を維持）
            let mut max_shift = 0.0_f64;
            for c in 0..k {
                let members: Vec<&Vec<f64>> = data
                    .iter()
                    .zip(&labels)
                    .filter(|(_, label)| **label == c)
                    .map(|(point, _)| point)
                    .collect();
                if members.is_empty() {
                    continue;
                }

                let mut updated = vec![0.0; dimensions];
                for point in &members {
                    for j in 0..dimensions {
                        updated[j] += point[j];
                    }
                }
                for value in updated.iter_mut() {
                    *value /= members.len() as f64;
                }

                let shift = stats::euclidean_distance(&centroids[c], &updated);
                if shift > max_shift {
                    max_shift = shift;
                }
                centroids[c] = updated;
            }

            let updated_inertia = Self::inertia(data, &labels, &centroids);
            inertia_history.push(updated_inertia);
            let converged = (inertia - updated_inertia).abs() < config.tolerance
                || max_shift <= config.tolerance;
            inertia = updated_inertia;
            if converged {
                break;
            }
        }

        let mut clusters = vec![Vec::new(); k];
        for (i, label) in labels.iter().enumerate() {
            clusters[*label].push(i);
        }
        let silhouette = Self::silhouette(data, &labels, k);

        Ok(ClusteringResult {
            clusters,
            centroids,
            labels,
            iterations,
            inertia,
            inertia_history,
            silhouette,
        })
    }

    /// k-means++ 初期化
    ///
    /// 最初のセントロイドは一様ランダム、以降は最近傍セントロイドへの
    /// 二乗距離に比例した確率で選ぶ。
    fn seed_centroids(data: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
        let mut centroids: Vec<Vec<f64>> = Vec::with_capacity(k);
        centroids.push(data[rng.gen_range(0..data.len())].clone());

        while centroids.len() < k {
            let weights: Vec<f64> = data
                .iter()
                .map(|point| {
                    centroids
                        .iter()
                        .map(|centroid| stats::euclidean_distance(point, centroid).powi(2))
                        .fold(f64::INFINITY, f64::min)
                })
                .collect();
            let total: f64 = weights.iter().sum();
            if total <= 0.0 {
                // 全ポイントが既存セントロイドと一致する場合は一様に選ぶ
                centroids.push(data[rng.gen_range(0..data.len())].clone());
                continue;
            }

            let mut target = rng.gen::<f64>() * total;
            let mut chosen = data.len() - 1;
            for (i, weight) in weights.iter().enumerate() {
                target -= weight;
                if target <= 0.0 {
                    chosen = i;
                    break;
                }
            }
            centroids.push(data[chosen].clone());
        }

        centroids
    }

    /// 最近傍セントロイドの添字（同距離は小さい添字を優先）
    fn nearest_centroid(point: &[f64], centroids: &[Vec<f64>]) -> usize {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (i, centroid) in centroids.iter().enumerate() {
            let distance = stats::euclidean_distance(point, centroid);
            if distance < best_distance {
                best = i;
                best_distance = distance;
            }
        }
        best
    }

    fn inertia(data: &[Vec<f64>], labels: &[usize], centroids: &[Vec<f64>]) -> f64 {
        data.iter()
            .zip(labels)
            .map(|(point, label)| stats::euclidean_distance(point, &centroids[*label]).powi(2))
            .sum()
    }

    /// 平均シルエットスコア
    ///
    /// 単一クラスタや孤立ポイントで生じる NaN は 0 として扱う。
    fn silhouette(data: &[Vec<f64>], labels: &[usize], k: usize) -> f64 {
        if k < 2 || data.len() < 2 {
            return 0.0;
        }
        let n = data.len();
        let mut total = 0.0;

        for i in 0..n {
            let own = labels[i];
            let mut sums = vec![0.0; k];
            let mut counts = vec![0usize; k];
            for j in 0..n {
                if i == j {
                    continue;
                }
                let distance = stats::euclidean_distance(&data[i], &data[j]);
                sums[labels[j]] += distance;
                counts[labels[j]] += 1;
            }

            let a = if counts[own] > 0 {
                sums[own] / counts[own] as f64
            } else {
                0.0
            };
            let b = (0..k)
                .filter(|c| *c != own && counts[*c] > 0)
                .map(|c| sums[c] / counts[c] as f64)
                .fold(f64::INFINITY, f64::min);

            let score = if b.is_finite() {
                let denominator = a.max(b);
                if denominator > 0.0 {
                    (b - a) / denominator
                } else {
                    0.0
                }
            } else {
                0.0
            };
            total += if score.is_nan() { 0.0 } else { score };
        }

        total / n as f64
    }
}

impl Default for ClusteringEngine {
    fn default() -> Self {
        Self::new(ClusteringConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2つの離れたブロブを決定的に生成
    fn two_blobs() -> Vec<Vec<f64>> {
        let mut data = Vec::new();
        for i in 0..20 {
            let dx = (i % 5) as f64 * 0.1;
            let dy = (i / 5) as f64 * 0.1;
            data.push(vec![dx, dy]);
            data.push(vec![10.0 + dx, 10.0 + dy]);
        }
        data
    }

    fn seeded_engine(k: usize) -> ClusteringEngine {
        ClusteringEngine::new(ClusteringConfig {
            k,
            seed: Some(42),
            ..ClusteringConfig::default()
        })
    }

    #[test]
    fn test_fit_empty_input() {
        let mut engine = seeded_engine(2);
        assert!(matches!(engine.fit(&[]), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_k_larger_than_n() {
        let mut engine = seeded_engine(5);
        let data = vec![vec![1.0], vec![2.0]];
        assert!(matches!(
            engine.fit(&data),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_k_zero() {
        let mut engine = seeded_engine(0);
        let data = vec![vec![1.0], vec![2.0]];
        assert!(matches!(
            engine.fit(&data),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_predict_before_fit() {
        let engine = seeded_engine(2);
        assert!(matches!(
            engine.predict(&[vec![1.0]]),
            Err(Error::ModelNotFitted(_))
        ));
    }

    #[test]
    fn test_two_blob_convergence() {
        let data = two_blobs();
        let mut engine = seeded_engine(2);
        let result = engine.fit(&data).unwrap();

        // 各セントロイドは真の中心 (0.2, 0.15) / (10.2, 10.15) の近傍に収束する
        let near_origin = result
            .centroids
            .iter()
            .any(|c| stats::euclidean_distance(c, &[0.2, 0.15]) < 1.0);
        let near_far = result
            .centroids
            .iter()
            .any(|c| stats::euclidean_distance(c, &[10.2, 10.15]) < 1.0);
        assert!(near_origin && near_far);

        // よく分離したブロブはシルエットが高い
        assert!(result.silhouette > 0.8);
        assert_eq!(result.labels.len(), data.len());
        assert_eq!(result.clusters.iter().map(|c| c.len()).sum::<usize>(), 40);

        // 慣性は反復を通して単調非増加
        assert_eq!(result.inertia_history.len(), result.iterations);
        for window in result.inertia_history.windows(2) {
            assert!(window[1] <= window[0] + 1e-9);
        }
    }

    #[test]
    fn test_inertia_non_increasing_with_k() {
        let data = two_blobs();
        let inertia_k1 = seeded_engine(1).fit(&data).unwrap().inertia;
        let inertia_k2 = seeded_engine(2).fit(&data).unwrap().inertia;
        assert!(inertia_k2 <= inertia_k1);
    }

    #[test]
    fn test_predict_assigns_nearest() {
        let data = two_blobs();
        let mut engine = seeded_engine(2);
        engine.fit(&data).unwrap();

        let labels = engine.predict(&[vec![0.0, 0.0], vec![10.0, 10.0]]).unwrap();
        assert_ne!(labels[0], labels[1]);
    }

    #[test]
    fn test_predict_dimension_mismatch() {
        let data = two_blobs();
        let mut engine = seeded_engine(2);
        engine.fit(&data).unwrap();

        assert!(matches!(
            engine.predict(&[vec![1.0]]),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_seeded_fit_is_deterministic() {
        let data = two_blobs();
        let first = seeded_engine(2).fit(&data).unwrap();
        let second = seeded_engine(2).fit(&data).unwrap();
        assert_eq!(first.labels, second.labels);
        assert_eq!(first.centroids, second.centroids);
    }

    #[test]
    fn test_elbow_finds_two_clusters() {
        let data = two_blobs();
        let engine = seeded_engine(2);
        let result = engine.elbow(&data, 5).unwrap();
        assert_eq!(result.inertias.len(), 5);
        assert_eq!(result.optimal_k, 2);
    }

    #[test]
    fn test_elbow_short_curve() {
        let data = vec![vec![0.0], vec![1.0]];
        let engine = seeded_engine(1);
        let result = engine.elbow(&data, 2).unwrap();
        assert_eq!(result.optimal_k, 1);
    }

    #[test]
    fn test_single_cluster_silhouette_is_zero() {
        let data = vec![vec![0.0], vec![1.0], vec![2.0]];
        let mut engine = seeded_engine(1);
        let result = engine.fit(&data).unwrap();
        assert_eq!(result.silhouette, 0.0);
    }
}

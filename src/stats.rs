//! Feature Math Primitives
//!
//! 特徴量統計の共有プリミティブ

/// 平均値
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// 分散（母分散）
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// 標準偏差
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// 中央値
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    sorted[sorted.len() / 2]
}

/// 四分位数（Q1, Q3）
///
/// ソート済み添字の切り捨てで求める。補間は行わない。
pub fn quartiles(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = sorted.len();
    let q1 = sorted[(n as f64 * 0.25) as usize];
    let q3 = sorted[(n as f64 * 0.75) as usize];
    (q1, q3)
}

/// ユークリッド距離
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// マンハッタン距離
pub fn manhattan_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}

/// 自己相関係数（ラグ lag の正規化自己共分散）
///
/// 分散がゼロの系列やラグが系列長以上の場合は 0.0 を返す。
pub fn autocorrelation(series: &[f64], lag: usize) -> f64 {
    let n = series.len();
    if lag >= n {
        return 0.0;
    }
    let m = mean(series);
    let denominator: f64 = series.iter().map(|v| (v - m).powi(2)).sum();
    if denominator.abs() < f64::EPSILON {
        return 0.0;
    }
    let numerator: f64 = (0..n - lag)
        .map(|i| (series[i] - m) * (series[i + lag] - m))
        .sum();
    numerator / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_variance() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values), 5.0);
        assert_eq!(variance(&values), 4.0);
        assert_eq!(std_dev(&values), 2.0);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(variance(&[]), 0.0);
        assert_eq!(median(&[]), 0.0);
        assert_eq!(quartiles(&[]), (0.0, 0.0));
    }

    #[test]
    fn test_quartiles_truncation() {
        // n=5: Q1は添字1、Q3は添字3
        let values = vec![100.0, 1.0, 3.0, 2.0, 4.0];
        let (q1, q3) = quartiles(&values);
        assert_eq!(q1, 2.0);
        assert_eq!(q3, 4.0);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), 3.0);
    }

    #[test]
    fn test_distances() {
        let a = vec![0.0, 0.0];
        let b = vec![3.0, 4.0];
        assert_eq!(euclidean_distance(&a, &b), 5.0);
        assert_eq!(manhattan_distance(&a, &b), 7.0);
    }

    #[test]
    fn test_autocorrelation_lag_zero() {
        let series = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((autocorrelation(&series, 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_autocorrelation_constant_series() {
        let series = vec![5.0; 10];
        assert_eq!(autocorrelation(&series, 1), 0.0);
    }

    #[test]
    fn test_autocorrelation_trending_series() {
        // 単調増加系列はラグ1で強い正の自己相関を持つ
        let series: Vec<f64> = (0..20).map(|i| i as f64).collect();
        assert!(autocorrelation(&series, 1) > 0.8);
    }
}

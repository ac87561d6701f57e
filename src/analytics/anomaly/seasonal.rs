//! Seasonal Decomposition
//!
//! 時系列の季節性分解（トレンド・季節成分・残差）

use crate::error::{Error, Result};
use crate::stats;
use serde::{Deserialize, Serialize};

/// 季節性分解の結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalDecomposition {
    /// トレンド成分（中心移動平均）
    pub trend: Vec<f64>,
    /// 季節成分（位相ごとの平均）
    pub seasonal: Vec<f64>,
    /// 残差
    pub residual: Vec<f64>,
}

/// 時系列をトレンド・季節・残差に分解
///
/// トレンドは窓幅 `min(season_length, len/3)` の中心移動平均。
/// 季節成分はトレンド除去後の値を位相ごとに平均して求める。
pub fn seasonal_decomposition(
    series: &[f64],
    season_length: usize,
) -> Result<SeasonalDecomposition> {
    if series.is_empty() {
        return Err(Error::EmptyInput);
    }
    if season_length == 0 {
        return Err(Error::InvalidConfiguration(
            "season length must be positive".to_string(),
        ));
    }

    let n = series.len();
    let window = season_length.min((n / 3).max(1));
    let half = window / 2;

    let mut trend = Vec::with_capacity(n);
    for i in 0..n {
        let start = i.saturating_sub(half);
        let end = (i + half + 1).min(n);
        trend.push(stats::mean(&series[start..end]));
    }

    let mut phase_sums = vec![0.0; season_length];
    let mut phase_counts = vec![0usize; season_length];
    for i in 0..n {
        let phase = i % season_length;
        phase_sums[phase] += series[i] - trend[i];
        phase_counts[phase] += 1;
    }
    let phase_means: Vec<f64> = phase_sums
        .iter()
        .zip(&phase_counts)
        .map(|(sum, count)| {
            if *count > 0 {
                sum / *count as f64
            } else {
                0.0
            }
        })
        .collect();

    let seasonal: Vec<f64> = (0..n).map(|i| phase_means[i % season_length]).collect();
    let residual: Vec<f64> = (0..n)
        .map(|i| series[i] - trend[i] - seasonal[i])
        .collect();

    Ok(SeasonalDecomposition {
        trend,
        seasonal,
        residual,
    })
}

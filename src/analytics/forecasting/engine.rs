//! Forecasting Engine Implementation
//!
//! 差分化・AR係数近似・逆差分化による予測エンジン

use super::types::{ForecastModel, ForecastResult, TrendDirection};
use crate::config::ForecastConfig;
use crate::error::{Error, Result};
use crate::stats;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 予測ジッタの振幅（学習系列の標準偏差に対する比率）
const JITTER_SCALE: f64 = 0.1;

/// トレンド分類の安定判定幅
const TREND_BAND: f64 = 0.05;

/// d階差分を適用
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut current = series.to_vec();
    for _ in 0..d {
        if current.len() < 2 {
            return Vec::new();
        }
        current = current.windows(2).map(|w| w[1] - w[0]).collect();
    }
    current
}

/// 差分化を逆変換して元のスケールへ戻す
///
/// original は各階の初期値の復元に使う。differenced が学習履歴より
/// 長い場合は超過分が予測ホライズンとして再構築される。
pub fn inverse_difference(original: &[f64], differenced: &[f64], d: usize) -> Vec<f64> {
    if d == 0 {
        return differenced.to_vec();
    }
    let mut current = differenced.to_vec();
    for level in (0..d).rev() {
        let base = difference(original, level);
        let first = match base.first() {
            Some(value) => *value,
            None => return current,
        };
        let mut rebuilt = Vec::with_capacity(current.len() + 1);
        let mut acc = first;
        rebuilt.push(acc);
        for delta in &current {
            acc += delta;
            rebuilt.push(acc);
        }
        current = rebuilt;
    }
    current
}

/// 予測エンジン
///
/// fit() で不変の ForecastModel を生成し、予測は共有参照で行う。
#[derive(Debug, Clone)]
pub struct ForecastingEngine {
    config: ForecastConfig,
    model: Option<ForecastModel>,
}

impl ForecastingEngine {
    /// 新しい予測エンジンを作成
    pub fn new(config: ForecastConfig) -> Self {
        Self {
            config,
            model: None,
        }
    }

    /// 設定を取得
    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// 学習済みモデルを取得
    pub fn model(&self) -> Option<&ForecastModel> {
        self.model.as_ref()
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// 時系列からモデルを学習
    ///
    /// AR係数は差分系列の自己相関の先頭 p ラグをそのまま採用する近似。
    /// MA係数は推定せず固定プレースホルダを保持する。
    pub fn fit(&mut self, series: &[f64]) -> Result<()> {
        let config = &self.config;
        let min_len = config.p.max(config.seasonal_period) + 1;
        if series.len() < min_len {
            return Err(Error::InsufficientData(format!(
                "forecasting requires at least {} points, got {}",
                min_len,
                series.len()
            )));
        }

        let differenced = difference(series, config.d);
        let ar_coefficients: Vec<f64> = (1..=config.p)
            .map(|lag| stats::autocorrelation(&differenced, lag))
            .collect();
        let ma_coefficients = vec![0.1; config.q];

        self.model = Some(ForecastModel {
            p: config.p,
            d: config.d,
            q: config.q,
            seasonal_period: config.seasonal_period,
            mean: stats::mean(series),
            std: stats::std_dev(series),
            ar_coefficients,
            ma_coefficients,
        });
        Ok(())
    }

    /// 設定されたホライズンで予測
    pub fn forecast(&self, series: &[f64]) -> Result<ForecastResult> {
        self.forecast_with_horizon(series, self.config.forecast_steps)
    }

    /// ホライズンを一時的に上書きして予測
    pub fn multi_step_forecast(&self, series: &[f64], steps: usize) -> Result<ForecastResult> {
        self.forecast_with_horizon(series, steps)
    }

    /// 季節指数を掛け合わせた予測
    ///
    /// 位相ごとの平均をグローバル平均で正規化した指数で予測値と
    /// 信頼区間をスケールする。
    pub fn seasonal_forecast(&self, series: &[f64]) -> Result<ForecastResult> {
        let period = self
            .model
            .as_ref()
            .ok_or_else(|| Error::ModelNotFitted("seasonal_forecast".to_string()))?
            .seasonal_period;
        let mut result = self.forecast(series)?;
        if period == 0 {
            return Ok(result);
        }

        let indices = Self::seasonal_indices(series, period);
        for (i, value) in result.forecast.iter_mut().enumerate() {
            *value *= indices[(series.len() + i) % period];
        }
        for (i, value) in result.lower_bound.iter_mut().enumerate() {
            *value *= indices[(series.len() + i) % period];
        }
        for (i, value) in result.upper_bound.iter_mut().enumerate() {
            *value *= indices[(series.len() + i) % period];
        }
        Ok(result)
    }

    fn forecast_with_horizon(&self, series: &[f64], steps: usize) -> Result<ForecastResult> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| Error::ModelNotFitted("forecast".to_string()))?;
        if series.len() < model.d + 1 {
            return Err(Error::InsufficientData(format!(
                "series of length {} cannot be differenced {} times",
                series.len(),
                model.d
            )));
        }

        let differenced = difference(series, model.d);
        let mut rng = self.rng();

        // AR係数で差分系列を再帰的に延長（小さなジッタを付与）
        let mut extended = differenced.clone();
        for _ in 0..steps {
            let mut next = 0.0;
            for (lag, coefficient) in model.ar_coefficients.iter().enumerate() {
                if lag + 1 <= extended.len() {
                    next += coefficient * extended[extended.len() - lag - 1];
                }
            }
            next += (rng.gen::<f64>() - 0.5) * JITTER_SCALE * model.std;
            extended.push(next);
        }

        let rebuilt = inverse_difference(series, &extended, model.d);
        let forecast: Vec<f64> = rebuilt[rebuilt.len() - steps..].to_vec();

        let residual_std = Self::residual_std(&differenced, &model.ar_coefficients);
        let mut lower_bound = Vec::with_capacity(steps);
        let mut upper_bound = Vec::with_capacity(steps);
        for (i, value) in forecast.iter().enumerate() {
            let margin = 1.96 * residual_std * ((i + 1) as f64).sqrt();
            lower_bound.push(value - margin);
            upper_bound.push(value + margin);
        }

        let (mape, rmse) = Self::holdout_accuracy(series, &forecast);
        let trend = Self::classify_trend(&forecast);

        Ok(ForecastResult {
            forecast,
            lower_bound,
            upper_bound,
            trend,
            residual_std,
            mape,
            rmse,
        })
    }

    /// 差分履歴に対してARモデルを再生した残差の標準偏差
    fn residual_std(differenced: &[f64], ar_coefficients: &[f64]) -> f64 {
        let p = ar_coefficients.len();
        if differenced.len() <= p {
            return 0.0;
        }
        let residuals: Vec<f64> = (p..differenced.len())
            .map(|t| {
                let predicted: f64 = ar_coefficients
                    .iter()
                    .enumerate()
                    .map(|(lag, coefficient)| coefficient * differenced[t - lag - 1])
                    .sum();
                differenced[t] - predicted
            })
            .collect();
        stats::std_dev(&residuals)
    }

    /// 末尾 steps 点の実測値に対する素朴なホールドアウト精度
    fn holdout_accuracy(series: &[f64], forecast: &[f64]) -> (Option<f64>, Option<f64>) {
        let steps = forecast.len();
        if steps == 0 || series.len() < steps {
            return (None, None);
        }
        let actual = &series[series.len() - steps..];

        let mut absolute_pct = Vec::new();
        let mut squared_error = 0.0;
        for (a, f) in actual.iter().zip(forecast) {
            squared_error += (a - f).powi(2);
            if a.abs() > f64::EPSILON {
                absolute_pct.push(((a - f) / a).abs() * 100.0);
            }
        }

        let mape = if absolute_pct.is_empty() {
            None
        } else {
            Some(stats::mean(&absolute_pct))
        };
        let rmse = Some((squared_error / steps as f64).sqrt());
        (mape, rmse)
    }

    /// 予測区間の前半と後半の相対変化からトレンドを分類
    fn classify_trend(forecast: &[f64]) -> TrendDirection {
        if forecast.len() < 2 {
            return TrendDirection::Stable;
        }
        let mid = forecast.len() / 2;
        let first = stats::mean(&forecast[..mid]);
        let second = stats::mean(&forecast[mid..]);

        if first.abs() < f64::EPSILON {
            return if second > TREND_BAND {
                TrendDirection::Increasing
            } else if second < -TREND_BAND {
                TrendDirection::Decreasing
            } else {
                TrendDirection::Stable
            };
        }

        let change = (second - first) / first.abs();
        if change > TREND_BAND {
            TrendDirection::Increasing
        } else if change < -TREND_BAND {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }

    /// 位相ごとの平均をグローバル平均で正規化した季節指数
    fn seasonal_indices(series: &[f64], period: usize) -> Vec<f64> {
        let global_mean = stats::mean(series);
        let mut sums = vec![0.0; period];
        let mut counts = vec![0usize; period];
        for (i, value) in series.iter().enumerate() {
            sums[i % period] += value;
            counts[i % period] += 1;
        }
        (0..period)
            .map(|phase| {
                if counts[phase] == 0 || global_mean.abs() < f64::EPSILON {
                    1.0
                } else {
                    (sums[phase] / counts[phase] as f64) / global_mean
                }
            })
            .collect()
    }
}

impl Default for ForecastingEngine {
    fn default() -> Self {
        Self::new(ForecastConfig::default())
    }
}

//! Forecasting Types
//!
//! 時系列予測用の型定義

use serde::{Deserialize, Serialize};

/// トレンド方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// 上昇トレンド
    Increasing,
    /// 下降トレンド
    Decreasing,
    /// 安定
    Stable,
}

/// 学習済み予測モデル
///
/// fit() が生成する不変の状態値。AR係数は差分系列の自己相関から
/// 導出した近似で、MA係数は推定しない固定値を保持する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastModel {
    /// AR次数
    pub p: usize,
    /// 差分化の階数
    pub d: usize,
    /// MA次数
    pub q: usize,
    /// 季節周期
    pub seasonal_period: usize,
    /// 学習系列の平均
    pub mean: f64,
    /// 学習系列の標準偏差
    pub std: f64,
    /// AR係数
    pub ar_coefficients: Vec<f64>,
    /// MA係数（固定プレースホルダ）
    pub ma_coefficients: Vec<f64>,
}

/// 予測結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    /// 予測値
    pub forecast: Vec<f64>,
    /// 信頼区間の下限
    pub lower_bound: Vec<f64>,
    /// 信頼区間の上限
    pub upper_bound: Vec<f64>,
    /// 予測区間のトレンド分類
    pub trend: TrendDirection,
    /// AR残差の標準偏差
    pub residual_std: f64,
    /// 末尾実測値に対するMAPE（%、計算可能な場合のみ）
    pub mape: Option<f64>,
    /// 末尾実測値に対するRMSE（計算可能な場合のみ）
    pub rmse: Option<f64>,
}

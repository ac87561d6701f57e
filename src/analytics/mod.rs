//! Analytics Engines
//!
//! プロセスデータ分析エンジン（異常検知・クラスタリング・予測）

pub mod anomaly;
pub mod clustering;
pub mod forecasting;

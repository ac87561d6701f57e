//! Realtime Anomaly Monitoring
//!
//! プロセスごとの観測値を保持するリアルタイム異常監視

use super::detector::AnomalyDetector;
use super::types::RealtimeDetection;
use crate::config::AnomalyConfig;
use crate::error::Result;
use std::collections::{HashMap, VecDeque};

/// リアルタイム異常監視
///
/// プロセスごとに直近 window_size 件の観測値を保持し、蓄積した
/// ウィンドウから検知器を再学習できる。
pub struct RealtimeAnomalyMonitor {
    config: AnomalyConfig,
    detector: AnomalyDetector,
    /// プロセスごとの観測値バッファ
    windows: HashMap<String, VecDeque<Vec<f64>>>,
}

impl RealtimeAnomalyMonitor {
    /// 新しいリアルタイム監視を作成
    pub fn new(config: AnomalyConfig) -> Self {
        let detector = AnomalyDetector::new(config.clone());
        Self {
            config,
            detector,
            windows: HashMap::new(),
        }
    }

    /// 観測値を評価してからバッファへ追加
    pub fn observe(
        &mut self,
        process_id: impl Into<String>,
        point: Vec<f64>,
    ) -> Result<RealtimeDetection> {
        let detection = self.detector.detect_realtime(&point)?;

        let window = self.windows.entry(process_id.into()).or_default();
        if window.len() >= self.config.window_size {
            window.pop_front();
        }
        window.push_back(point);

        Ok(detection)
    }

    /// 指定プロセスの蓄積ウィンドウで検知器を再学習
    pub fn refit(&mut self, process_id: &str) -> Result<()> {
        let window = self
            .windows
            .get(process_id)
            .map(|w| w.iter().cloned().collect::<Vec<Vec<f64>>>())
            .unwrap_or_default();
        self.detector.fit(&window)
    }

    /// ベースラインを外部データで学習
    pub fn fit_baseline(&mut self, data: &[Vec<f64>]) -> Result<()> {
        self.detector.fit(data)
    }

    /// 指定プロセスの保持件数
    pub fn window_len(&self, process_id: &str) -> usize {
        self.windows.get(process_id).map(|w| w.len()).unwrap_or(0)
    }
}

impl Default for RealtimeAnomalyMonitor {
    fn default() -> Self {
        Self::new(AnomalyConfig::default())
    }
}

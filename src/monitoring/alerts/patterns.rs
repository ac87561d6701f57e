//! Alert Pattern Analysis
//!
//! アラート履歴の時間バケット集計とパターン検出

use super::alert::Alert;
use crate::stats;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 急増判定の標準偏差係数
const SPIKE_SIGMA: f64 = 2.0;

/// トレンド判定の変化率閾値（%）
const TREND_THRESHOLD_PCT: f64 = 20.0;

/// トレンドを critical に格上げする変化率（%）
const TREND_CRITICAL_PCT: f64 = 50.0;

/// 高深刻度比率の日次閾値
const HIGH_RATIO_THRESHOLD: f64 = 0.3;

/// 再発判定に必要な該当日の比率
const RECURRING_DAY_RATIO: f64 = 0.2;

/// バケット間隔
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketInterval {
    /// 1時間
    Hour,
    /// 1日
    Day,
    /// 1週間
    Week,
    /// 30日
    Month,
}

impl BucketInterval {
    fn step(&self) -> Duration {
        match self {
            Self::Hour => Duration::hours(1),
            Self::Day => Duration::days(1),
            Self::Week => Duration::weeks(1),
            Self::Month => Duration::days(30),
        }
    }
}

/// 時間バケットの集計
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertBucket {
    /// バケット開始時刻（含む）
    pub start: DateTime<Utc>,
    /// バケット終了時刻（含まない）
    pub end: DateTime<Utc>,
    /// 総件数
    pub total: usize,
    /// 深刻度ごとの件数
    pub by_severity: HashMap<String, usize>,
    /// 発生源ごとの件数
    pub by_source: HashMap<String, usize>,
    /// 既読までの平均応答秒（read_at を持つアラートのみ）
    pub avg_response_secs: Option<f64>,
}

/// 検出パターンの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    /// 急増
    Spike,
    /// 週次トレンド変化
    Trend,
    /// 高深刻度の再発
    Recurring,
}

/// パターンの深刻度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternSeverity {
    /// 情報
    Info,
    /// 警告
    Warning,
    /// 致命的
    Critical,
}

/// 検出されたアラートパターン
///
/// 永続化されない導出値。クエリごとに再計算される。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertPattern {
    /// パターンの種類
    pub pattern_type: PatternType,
    /// 説明
    pub description: String,
    /// 深刻度
    pub severity: PatternSeverity,
    /// 影響のあった日付（ISO 8601）
    pub affected_periods: Vec<String>,
    /// 推奨される対応
    pub recommendation: String,
}

/// アラートパターン分析器
#[derive(Debug, Clone)]
pub struct AlertPatternAnalyzer {
    /// 振り返り日数
    lookback_days: usize,
}

impl Default for AlertPatternAnalyzer {
    fn default() -> Self {
        Self { lookback_days: 14 }
    }
}

impl AlertPatternAnalyzer {
    /// 振り返り日数を指定して分析器を作成
    pub fn new(lookback_days: usize) -> Self {
        Self { lookback_days }
    }

    /// [start, end) を固定幅の時間バケットに分けて集計
    pub fn bucket(
        &self,
        alerts: &[Alert],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: BucketInterval,
    ) -> Vec<AlertBucket> {
        let step = interval.step();
        let mut buckets = Vec::new();
        let mut cursor = start;

        while cursor < end {
            let bucket_end = (cursor + step).min(end);
            let members: Vec<&Alert> = alerts
                .iter()
                .filter(|a| a.created_at >= cursor && a.created_at < bucket_end)
                .collect();

            let mut by_severity = HashMap::new();
            let mut by_source = HashMap::new();
            let mut response_secs = Vec::new();
            for alert in &members {
                *by_severity
                    .entry(alert.severity.as_str().to_string())
                    .or_insert(0) += 1;
                *by_source
                    .entry(alert.source.as_str().to_string())
                    .or_insert(0) += 1;
                if let Some(read_at) = alert.read_at {
                    response_secs
                        .push((read_at - alert.created_at).num_milliseconds() as f64 / 1000.0);
                }
            }
            let avg_response_secs = if response_secs.is_empty() {
                None
            } else {
                Some(stats::mean(&response_secs))
            };

            buckets.push(AlertBucket {
                start: cursor,
                end: bucket_end,
                total: members.len(),
                by_severity,
                by_source,
                avg_response_secs,
            });
            cursor = cursor + step;
        }

        buckets
    }

    /// 直近 lookback_days 日の日次系列からパターンを検出
    pub fn analyze(&self, alerts: &[Alert], now: DateTime<Utc>) -> Vec<AlertPattern> {
        if self.lookback_days == 0 {
            return Vec::new();
        }
        let start = now - Duration::days(self.lookback_days as i64);
        let daily = self.bucket(alerts, start, now, BucketInterval::Day);
        let totals: Vec<f64> = daily.iter().map(|b| b.total as f64).collect();

        let mut patterns = Vec::new();
        Self::detect_spike(&daily, &totals, &mut patterns);
        Self::detect_trend(&daily, &totals, &mut patterns);
        Self::detect_recurring(&daily, &mut patterns);
        patterns
    }

    /// 日次件数が平均 + 2σ を超えた日を急増として検出
    fn detect_spike(daily: &[AlertBucket], totals: &[f64], patterns: &mut Vec<AlertPattern>) {
        if totals.len() < 2 {
            return;
        }
        let mean = stats::mean(totals);
        let sd = stats::std_dev(totals);
        if sd <= 0.0 {
            return;
        }

        let spikes: Vec<String> = daily
            .iter()
            .zip(totals)
            .filter(|(_, total)| **total > mean + SPIKE_SIGMA * sd)
            .map(|(bucket, _)| bucket.start.date_naive().to_string())
            .collect();
        if spikes.is_empty() {
            return;
        }

        patterns.push(AlertPattern {
            pattern_type: PatternType::Spike,
            description: format!(
                "Alert volume spiked on {} day(s), exceeding the daily mean of {:.1} by more than 2 standard deviations",
                spikes.len(),
                mean
            ),
            severity: if spikes.len() > 1 {
                PatternSeverity::Critical
            } else {
                PatternSeverity::Warning
            },
            affected_periods: spikes,
            recommendation:
                "Investigate the processes that triggered the spike and check for upstream incidents"
                    .to_string(),
        });
    }

    /// 直近7日平均と前7日平均の変化率をトレンドとして検出
    fn detect_trend(daily: &[AlertBucket], totals: &[f64], patterns: &mut Vec<AlertPattern>) {
        if totals.len() < 14 {
            return;
        }
        let recent = stats::mean(&totals[totals.len() - 7..]);
        let prior = stats::mean(&totals[totals.len() - 14..totals.len() - 7]);
        if prior.abs() < f64::EPSILON {
            return;
        }

        let change_pct = (recent - prior) / prior * 100.0;
        if change_pct.abs() <= TREND_THRESHOLD_PCT {
            return;
        }

        let direction = if change_pct > 0.0 {
            "increased"
        } else {
            "decreased"
        };
        patterns.push(AlertPattern {
            pattern_type: PatternType::Trend,
            description: format!(
                "Week-over-week alert volume {} by {:.0}%",
                direction,
                change_pct.abs()
            ),
            severity: if change_pct.abs() > TREND_CRITICAL_PCT {
                PatternSeverity::Critical
            } else {
                PatternSeverity::Warning
            },
            affected_periods: daily[daily.len() - 7..]
                .iter()
                .map(|b| b.start.date_naive().to_string())
                .collect(),
            recommendation: if change_pct > 0.0 {
                "Review recent model or process changes that may be driving the increase"
                    .to_string()
            } else {
                "Confirm that alert sources are still reporting correctly".to_string()
            },
        });
    }

    /// 高深刻度比率の高い日が繰り返し発生していないかを検出
    fn detect_recurring(daily: &[AlertBucket], patterns: &mut Vec<AlertPattern>) {
        if daily.is_empty() {
            return;
        }
        let heavy: Vec<String> = daily
            .iter()
            .filter(|bucket| {
                let high = bucket.by_severity.get("high").copied().unwrap_or(0);
                bucket.total > 0 && high as f64 / bucket.total as f64 > HIGH_RATIO_THRESHOLD
            })
            .map(|bucket| bucket.start.date_naive().to_string())
            .collect();
        if heavy.len() as f64 <= daily.len() as f64 * RECURRING_DAY_RATIO {
            return;
        }

        patterns.push(AlertPattern {
            pattern_type: PatternType::Recurring,
            description: format!(
                "High-severity alerts exceeded 30% of daily volume on {} of {} days",
                heavy.len(),
                daily.len()
            ),
            severity: PatternSeverity::Warning,
            affected_periods: heavy,
            recommendation:
                "Review the recurring high-severity sources; the underlying cause is likely persistent"
                    .to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::alerts::alert::{AlertSeverity, AlertSource};
    use chrono::TimeZone;

    fn day_start(day: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::days(day)
    }

    /// 日ごとの件数指定でアラート履歴を生成
    fn alerts_per_day(counts: &[usize]) -> Vec<Alert> {
        let mut alerts = Vec::new();
        for (day, count) in counts.iter().enumerate() {
            for i in 0..*count {
                let alert = Alert::new(
                    AlertSeverity::Medium,
                    format!("alert {} on day {}", i, day),
                    AlertSource::System,
                    None,
                )
                .with_created_at(day_start(day as i64) + Duration::hours(1));
                alerts.push(alert);
            }
        }
        alerts
    }

    #[test]
    fn test_bucket_counts_and_boundaries() {
        let alerts = alerts_per_day(&[2, 3, 0, 1]);
        let analyzer = AlertPatternAnalyzer::default();
        let buckets = analyzer.bucket(&alerts, day_start(0), day_start(4), BucketInterval::Day);

        assert_eq!(buckets.len(), 4);
        let totals: Vec<usize> = buckets.iter().map(|b| b.total).collect();
        assert_eq!(totals, vec![2, 3, 0, 1]);
        assert_eq!(buckets[1].by_severity.get("medium"), Some(&3));
        assert_eq!(buckets[1].by_source.get("system"), Some(&3));
    }

    #[test]
    fn test_hour_bucketing() {
        let alerts = vec![
            Alert::new(
                AlertSeverity::Low,
                "first",
                AlertSource::System,
                None,
            )
            .with_created_at(day_start(0) + Duration::minutes(10)),
            Alert::new(
                AlertSeverity::Low,
                "second",
                AlertSource::System,
                None,
            )
            .with_created_at(day_start(0) + Duration::minutes(70)),
        ];

        let analyzer = AlertPatternAnalyzer::default();
        let buckets = analyzer.bucket(
            &alerts,
            day_start(0),
            day_start(0) + Duration::hours(3),
            BucketInterval::Hour,
        );
        assert_eq!(buckets.len(), 3);
        let totals: Vec<usize> = buckets.iter().map(|b| b.total).collect();
        assert_eq!(totals, vec![1, 1, 0]);
    }

    #[test]
    fn test_bucket_response_latency() {
        let mut alert = Alert::new(
            AlertSeverity::High,
            "needs triage",
            AlertSource::Drift,
            None,
        )
        .with_created_at(day_start(0));
        alert.read = true;
        alert.read_at = Some(day_start(0) + Duration::seconds(90));

        let analyzer = AlertPatternAnalyzer::default();
        let buckets = analyzer.bucket(&[alert], day_start(0), day_start(1), BucketInterval::Day);
        assert_eq!(buckets[0].avg_response_secs, Some(90.0));
    }

    #[test]
    fn test_spike_detection_flags_last_day() {
        // 13日間5件、最終日に50件の急増
        let mut counts = vec![5usize; 13];
        counts.push(50);
        let alerts = alerts_per_day(&counts);

        let analyzer = AlertPatternAnalyzer::new(14);
        let patterns = analyzer.analyze(&alerts, day_start(14));

        let spike = patterns
            .iter()
            .find(|p| p.pattern_type == PatternType::Spike)
            .expect("spike pattern not detected");
        assert_eq!(spike.affected_periods.len(), 1);
        assert_eq!(spike.affected_periods[0], day_start(13).date_naive().to_string());
    }

    #[test]
    fn test_trend_detection_escalates() {
        // 前半7日は5件、後半7日は12件: +140%
        let mut counts = vec![5usize; 7];
        counts.extend(vec![12usize; 7]);
        let alerts = alerts_per_day(&counts);

        let analyzer = AlertPatternAnalyzer::new(14);
        let patterns = analyzer.analyze(&alerts, day_start(14));

        let trend = patterns
            .iter()
            .find(|p| p.pattern_type == PatternType::Trend)
            .expect("trend pattern not detected");
        assert_eq!(trend.severity, PatternSeverity::Critical);
        assert_eq!(trend.affected_periods.len(), 7);
    }

    #[test]
    fn test_flat_series_has_no_patterns() {
        let alerts = alerts_per_day(&[5; 14]);
        let analyzer = AlertPatternAnalyzer::new(14);
        let patterns = analyzer.analyze(&alerts, day_start(14));
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_recurring_high_severity_days() {
        // 14日中4日で高深刻度がその日の全件を占める
        let mut alerts = alerts_per_day(&[4; 14]);
        for day in [2i64, 5, 8, 11] {
            for i in 0..4 {
                alerts.push(
                    Alert::new(
                        AlertSeverity::High,
                        format!("critical issue {}", i),
                        AlertSource::Drift,
                        None,
                    )
                    .with_created_at(day_start(day) + Duration::hours(2)),
                );
            }
        }

        let analyzer = AlertPatternAnalyzer::new(14);
        let patterns = analyzer.analyze(&alerts, day_start(14));

        let recurring = patterns
            .iter()
            .find(|p| p.pattern_type == PatternType::Recurring)
            .expect("recurring pattern not detected");
        assert_eq!(recurring.affected_periods.len(), 4);
    }
}

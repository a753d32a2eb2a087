//! Channel efficiency scored against fixed industry benchmarks.

use std::collections::BTreeMap;
use std::fmt;

use marketpulse_core::Channel;
use serde::{Deserialize, Serialize};

use crate::engine::MarketingAnalytics;
use crate::performance::ChannelPerformanceSummary;

pub const ROAS_BENCHMARK: f64 = 3.0;
pub const CTR_BENCHMARK: f64 = 0.02;
pub const CPC_BENCHMARK: f64 = 2.0;

/// CPC is floored here before dividing so near-free clicks don't explode the
/// cost ratio.
pub const CPC_FLOOR: f64 = 0.1;

const ROAS_WEIGHT: f64 = 0.5;
const CTR_WEIGHT: f64 = 0.3;
const CPC_WEIGHT: f64 = 0.2;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Letter grade for a 0-100 efficiency score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PerformanceGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    C,
    D,
}

impl PerformanceGrade {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::APlus
        } else if score >= 80.0 {
            Self::A
        } else if score >= 70.0 {
            Self::BPlus
        } else if score >= 60.0 {
            Self::B
        } else if score >= 50.0 {
            Self::C
        } else {
            Self::D
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

impl fmt::Display for PerformanceGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Benchmark comparison for one channel. Ratios are uncapped; only the
/// component scores feeding `efficiency_score` are capped at 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyBenchmark {
    pub efficiency_score: f64,
    pub roas_vs_benchmark: f64,
    pub ctr_vs_benchmark: f64,
    pub cpc_vs_benchmark: f64,
    pub performance_grade: PerformanceGrade,
}

impl EfficiencyBenchmark {
    pub fn score(summary: &ChannelPerformanceSummary) -> Self {
        let roas_vs_benchmark = summary.roas / ROAS_BENCHMARK;
        let ctr_vs_benchmark = summary.ctr / CTR_BENCHMARK;
        let cpc_vs_benchmark = CPC_BENCHMARK / summary.cpc.max(CPC_FLOOR);

        let efficiency_score = (roas_vs_benchmark * 100.0).min(100.0) * ROAS_WEIGHT
            + (ctr_vs_benchmark * 100.0).min(100.0) * CTR_WEIGHT
            + (cpc_vs_benchmark * 100.0).min(100.0) * CPC_WEIGHT;

        Self {
            efficiency_score,
            roas_vs_benchmark,
            ctr_vs_benchmark,
            cpc_vs_benchmark,
            performance_grade: PerformanceGrade::from_score(efficiency_score),
        }
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

impl MarketingAnalytics<'_> {
    pub fn efficiency_benchmarks(&self) -> BTreeMap<Channel, EfficiencyBenchmark> {
        self.channel_performance()
            .iter()
            .map(|summary| (summary.channel, EfficiencyBenchmark::score(summary)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::channel_row;

    // 1. Grades ---------------------------------------------------------------

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(PerformanceGrade::from_score(100.0), PerformanceGrade::APlus);
        assert_eq!(PerformanceGrade::from_score(90.0), PerformanceGrade::APlus);
        assert_eq!(PerformanceGrade::from_score(89.9), PerformanceGrade::A);
        assert_eq!(PerformanceGrade::from_score(80.0), PerformanceGrade::A);
        assert_eq!(PerformanceGrade::from_score(70.0), PerformanceGrade::BPlus);
        assert_eq!(PerformanceGrade::from_score(60.0), PerformanceGrade::B);
        assert_eq!(PerformanceGrade::from_score(50.0), PerformanceGrade::C);
        assert_eq!(PerformanceGrade::from_score(49.99), PerformanceGrade::D);
        assert_eq!(PerformanceGrade::from_score(0.0), PerformanceGrade::D);
    }

    #[test]
    fn test_grade_serializes_as_label() {
        let json = serde_json::to_string(&PerformanceGrade::BPlus).unwrap();
        assert_eq!(json, "\"B+\"");
        assert_eq!(PerformanceGrade::APlus.to_string(), "A+");
    }

    // 2. Scoring --------------------------------------------------------------

    #[test]
    fn test_channel_at_benchmark_scores_full_marks() {
        // roas 3.0, ctr 0.02, cpc 2.0
        let rows = vec![channel_row(0, Channel::Google, 10_000.0, 200.0, 400.0, 1_200.0)];
        let benchmarks = MarketingAnalytics::from_records(&rows).efficiency_benchmarks();
        let google = &benchmarks[&Channel::Google];

        assert!((google.efficiency_score - 100.0).abs() < 1e-9);
        assert!((google.roas_vs_benchmark - 1.0).abs() < 1e-12);
        assert!((google.ctr_vs_benchmark - 1.0).abs() < 1e-12);
        assert!((google.cpc_vs_benchmark - 1.0).abs() < 1e-12);
        assert_eq!(google.performance_grade, PerformanceGrade::APlus);
    }

    #[test]
    fn test_ratios_uncapped_but_score_capped() {
        // roas 6.0, ctr 0.04, cpc 1.0
        let rows = vec![channel_row(0, Channel::Facebook, 10_000.0, 400.0, 400.0, 2_400.0)];
        let benchmarks = MarketingAnalytics::from_records(&rows).efficiency_benchmarks();
        let fb = &benchmarks[&Channel::Facebook];

        assert!((fb.roas_vs_benchmark - 2.0).abs() < 1e-12);
        assert!((fb.ctr_vs_benchmark - 2.0).abs() < 1e-12);
        assert!((fb.cpc_vs_benchmark - 2.0).abs() < 1e-12);
        assert!((fb.efficiency_score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_weak_channel_gets_low_grade() {
        // roas 1.5 -> 50, ctr 0.005 -> 25, cpc 8.0 -> 25; weighted 37.5
        let rows = vec![channel_row(0, Channel::TikTok, 10_000.0, 50.0, 400.0, 600.0)];
        let benchmarks = MarketingAnalytics::from_records(&rows).efficiency_benchmarks();
        let tt = &benchmarks[&Channel::TikTok];
        assert!((tt.efficiency_score - 37.5).abs() < 1e-9);
        assert_eq!(tt.performance_grade, PerformanceGrade::D);
    }

    #[test]
    fn test_zero_cpc_is_floored() {
        // no spend: roas 0, cpc 0 -> floored to 0.1 -> ratio 20
        let rows = vec![channel_row(0, Channel::Google, 10_000.0, 100.0, 0.0, 0.0)];
        let benchmarks = MarketingAnalytics::from_records(&rows).efficiency_benchmarks();
        let google = &benchmarks[&Channel::Google];
        assert!((google.cpc_vs_benchmark - 20.0).abs() < 1e-9);
        // 0 * 0.5 + 50 * 0.3 + 100 * 0.2
        assert!((google.efficiency_score - 35.0).abs() < 1e-9);
        assert_eq!(google.performance_grade, PerformanceGrade::D);
    }

    #[test]
    fn test_one_entry_per_channel() {
        let rows = vec![
            channel_row(0, Channel::Google, 100.0, 1.0, 1.0, 1.0),
            channel_row(1, Channel::Google, 100.0, 1.0, 1.0, 1.0),
            channel_row(0, Channel::TikTok, 100.0, 1.0, 1.0, 1.0),
        ];
        let benchmarks = MarketingAnalytics::from_records(&rows).efficiency_benchmarks();
        let keys: Vec<Channel> = benchmarks.keys().copied().collect();
        assert_eq!(keys, vec![Channel::Google, Channel::TikTok]);
    }
}

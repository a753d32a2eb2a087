//! Marketing analytics over the canonical dataset. Covers channel performance,
//! trends, business impact, benchmarking, seasonality, budget reallocation
//! and a rule-based insight list.
//!
//! Every operation is a pure function of the records handed to
//! [`MarketingAnalytics`]; filtering happens before the engine is built.

pub mod attribution;
pub mod benchmarks;
pub mod budget;
pub mod dashboard;
pub mod engine;
pub mod insights;
pub mod performance;
pub mod seasonal;
pub mod trends;

#[cfg(test)]
pub(crate) mod fixtures;

pub use attribution::BusinessImpact;
pub use benchmarks::{EfficiencyBenchmark, PerformanceGrade};
pub use budget::{BudgetOpportunities, ChannelSnapshot, Reallocation};
pub use dashboard::{ExecutiveSummary, PerformanceStatus};
pub use engine::MarketingAnalytics;
pub use insights::{Insight, InsightType, Priority};
pub use performance::{ChannelPerformanceSummary, RankMetric};
pub use seasonal::{DayPerformance, SeasonalPatterns, WeekdayPerformance};
pub use trends::DailyTrend;

//! Ratio math shared by the deriver, the aggregator and the analytics engine.
//! Every ratio is zero when its denominator is zero.

use serde::{Deserialize, Serialize};

/// `numerator / denominator`, or 0.0 unless the denominator is positive.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// CTR / CPC / ROAS / CPM computed from raw counts.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub ctr: f64,
    pub cpc: f64,
    pub roas: f64,
    pub cpm: f64,
}

impl DerivedMetrics {
    pub fn from_counts(impressions: f64, clicks: f64, spend: f64, revenue: f64) -> Self {
        Self {
            ctr: safe_div(clicks, impressions),
            cpc: safe_div(spend, clicks),
            roas: safe_div(revenue, spend),
            cpm: safe_div(spend, impressions) * 1000.0,
        }
    }
}

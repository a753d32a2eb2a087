//! Business impact: how much business revenue marketing is credited with.

use marketpulse_core::safe_div;
use serde::{Deserialize, Serialize};

use crate::engine::MarketingAnalytics;

/// Portfolio-level scalars computed from the `Total` rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BusinessImpact {
    pub total_marketing_spend: f64,
    pub total_attributed_revenue: f64,
    pub total_business_revenue: f64,
    /// Attributed over business revenue, in percent. Not clamped to 100.
    pub attribution_rate: f64,
    pub overall_roas: f64,
    pub avg_daily_spend: f64,
    pub avg_daily_revenue: f64,
    pub data_period_days: usize,
}

impl MarketingAnalytics<'_> {
    pub fn business_impact(&self) -> BusinessImpact {
        let mut spend = 0.0;
        let mut attributed = 0.0;
        let mut business = 0.0;
        let mut days = 0usize;
        for r in self.total_rows() {
            spend += r.spend;
            attributed += r.revenue;
            business += r.total_revenue;
            days += 1;
        }

        BusinessImpact {
            total_marketing_spend: spend,
            total_attributed_revenue: attributed,
            total_business_revenue: business,
            attribution_rate: safe_div(attributed, business) * 100.0,
            overall_roas: safe_div(attributed, spend),
            avg_daily_spend: safe_div(spend, days as f64),
            avg_daily_revenue: safe_div(attributed, days as f64),
            data_period_days: days,
        }
    }
}

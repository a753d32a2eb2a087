//! Executive summary composed from the other analyses.

use std::fmt;

use marketpulse_core::Channel;
use serde::{Deserialize, Serialize};

use crate::engine::MarketingAnalytics;
use crate::insights::{Insight, Priority};

const EXCELLENT_ROAS: f64 = 4.0;
const GOOD_ROAS: f64 = 2.5;
const SUMMARY_ITEMS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceStatus {
    Excellent,
    Good,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl PerformanceStatus {
    pub fn from_roas(roas: f64) -> Self {
        if roas > EXCELLENT_ROAS {
            Self::Excellent
        } else if roas > GOOD_ROAS {
            Self::Good
        } else {
            Self::NeedsImprovement
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl fmt::Display for PerformanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub performance_status: PerformanceStatus,
    pub overall_roas: f64,
    pub attribution_rate: f64,
    pub total_spend: f64,
    pub total_revenue: f64,
    /// Highest-spend channel, `None` without channel rows.
    pub top_channel: Option<Channel>,
    pub top_recommendations: Vec<String>,
    pub key_insights: Vec<Insight>,
}

impl MarketingAnalytics<'_> {
    pub fn executive_summary(&self) -> ExecutiveSummary {
        let impact = self.business_impact();
        let top_channel = self.channel_performance().first().map(|p| p.channel);
        let insights = self.performance_insights();

        let top_recommendations = insights
            .iter()
            .filter(|i| i.priority == Priority::High)
            .take(SUMMARY_ITEMS)
            .map(|i| i.recommendation.clone())
            .collect();

        ExecutiveSummary {
            performance_status: PerformanceStatus::from_roas(impact.overall_roas),
            overall_roas: impact.overall_roas,
            attribution_rate: impact.attribution_rate,
            total_spend: impact.total_marketing_spend,
            total_revenue: impact.total_attributed_revenue,
            top_channel,
            top_recommendations,
            key_insights: insights.into_iter().take(SUMMARY_ITEMS).collect(),
        }
    }
}

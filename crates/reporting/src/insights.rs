//! Rule-based performance insights.
//!
//! Rules are an ordered list of independent evaluators. Each sees the same
//! channel summaries and business impact, may emit one insight, and the list
//! is cut to [`MAX_INSIGHTS`] in rule order.

use marketpulse_core::format::format_currency;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attribution::BusinessImpact;
use crate::engine::MarketingAnalytics;
use crate::performance::ChannelPerformanceSummary;

pub const MAX_INSIGHTS: usize = 5;

/// Channels under this ROAS are flagged for optimization.
pub const LOW_ROAS_THRESHOLD: f64 = 2.0;
/// Attribution below this percentage suggests missing conversions.
pub const ATTRIBUTION_GAP_THRESHOLD: f64 = 15.0;
/// Spend share above which the portfolio counts as concentrated.
pub const CONCENTRATION_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsightType {
    #[serde(rename = "Top Performer")]
    TopPerformer,
    #[serde(rename = "Optimization Opportunity")]
    OptimizationOpportunity,
    #[serde(rename = "Conversion Optimization")]
    ConversionOptimization,
    #[serde(rename = "Attribution Gap")]
    AttributionGap,
    #[serde(rename = "Portfolio Risk")]
    PortfolioRisk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightType,
    pub priority: Priority,
    pub insight: String,
    pub recommendation: String,
    pub impact: String,
}

/// Inputs every rule evaluates against.
pub struct InsightContext<'a> {
    pub performance: &'a [ChannelPerformanceSummary],
    pub impact: &'a BusinessImpact,
}

type Rule = fn(&InsightContext<'_>) -> Option<Insight>;

/// Evaluation order is part of the contract.
const RULES: [Rule; 5] = [
    top_performer,
    optimization_opportunity,
    conversion_optimization,
    attribution_gap,
    portfolio_risk,
];

/// Median with the two middle values averaged for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

fn top_performer(ctx: &InsightContext<'_>) -> Option<Insight> {
    let mut best = ctx.performance.first()?;
    for p in ctx.performance {
        if p.roas > best.roas {
            best = p;
        }
    }
    Some(Insight {
        kind: InsightType::TopPerformer,
        priority: Priority::High,
        insight: format!(
            "{} delivers the highest ROAS at {:.2}x with {} spend",
            best.channel,
            best.roas,
            format_currency(best.spend)
        ),
        recommendation: format!(
            "Consider scaling {} budget by 15-20% to maximize returns",
            best.channel
        ),
        impact: format!(
            "Potential revenue increase: {}",
            format_currency(best.spend * 0.2 * best.roas)
        ),
    })
}

fn optimization_opportunity(ctx: &InsightContext<'_>) -> Option<Insight> {
    let low: Vec<&ChannelPerformanceSummary> = ctx
        .performance
        .iter()
        .filter(|p| p.roas < LOW_ROAS_THRESHOLD)
        .collect();
    if low.is_empty() {
        return None;
    }
    let names: Vec<&str> = low.iter().map(|p| p.channel.as_str()).collect();
    let savings = low.iter().map(|p| p.spend).sum::<f64>() * 0.15;
    Some(Insight {
        kind: InsightType::OptimizationOpportunity,
        priority: Priority::High,
        insight: format!(
            "{} showing ROAS below {:.1}x benchmark",
            names.join(", "),
            LOW_ROAS_THRESHOLD
        ),
        recommendation: "Review targeting, creative assets, or consider reducing spend by 15%"
            .to_string(),
        impact: format!("Potential cost savings: {}", format_currency(savings)),
    })
}

fn conversion_optimization(ctx: &InsightContext<'_>) -> Option<Insight> {
    let ctrs: Vec<f64> = ctx.performance.iter().map(|p| p.ctr).collect();
    let roases: Vec<f64> = ctx.performance.iter().map(|p| p.roas).collect();
    let ctr_median = median(&ctrs)?;
    let roas_median = median(&roases)?;

    let channel = ctx
        .performance
        .iter()
        .find(|p| p.ctr > ctr_median && p.roas < roas_median)?;
    Some(Insight {
        kind: InsightType::ConversionOptimization,
        priority: Priority::Medium,
        insight: format!(
            "{} has good engagement (CTR: {:.2}%) but low conversion",
            channel.channel,
            channel.ctr * 100.0
        ),
        recommendation:
            "Optimize landing pages, improve offer relevance, or adjust attribution windows"
                .to_string(),
        impact: "Could improve ROAS by 25-40% with better conversion rates".to_string(),
    })
}

fn attribution_gap(ctx: &InsightContext<'_>) -> Option<Insight> {
    let rate = ctx.impact.attribution_rate;
    if rate >= ATTRIBUTION_GAP_THRESHOLD {
        return None;
    }
    Some(Insight {
        kind: InsightType::AttributionGap,
        priority: Priority::Medium,
        insight: format!(
            "Marketing attribution rate is {rate:.1}% - potentially missing conversions"
        ),
        recommendation:
            "Implement view-through conversions, extend attribution windows, or improve tracking"
                .to_string(),
        impact: "Better attribution could reveal 20-30% more marketing value".to_string(),
    })
}

fn portfolio_risk(ctx: &InsightContext<'_>) -> Option<Insight> {
    // channel summaries arrive sorted by spend, so the first is the largest
    let top = ctx.performance.first()?;
    let total_spend: f64 = ctx.performance.iter().map(|p| p.spend).sum();
    let share = top.spend_share(total_spend);
    if share <= CONCENTRATION_THRESHOLD {
        return None;
    }
    Some(Insight {
        kind: InsightType::PortfolioRisk,
        priority: Priority::Medium,
        insight: format!(
            "Marketing spend heavily concentrated in {} ({:.0}%)",
            top.channel,
            share * 100.0
        ),
        recommendation:
            "Diversify marketing mix to reduce platform dependency and discover new growth channels"
                .to_string(),
        impact: "Risk mitigation and potential new revenue streams".to_string(),
    })
}

/// Run every rule in order and keep the first [`MAX_INSIGHTS`] that fire.
pub fn evaluate_rules(ctx: &InsightContext<'_>) -> Vec<Insight> {
    let insights: Vec<Insight> = RULES
        .iter()
        .filter_map(|rule| rule(ctx))
        .take(MAX_INSIGHTS)
        .collect();
    debug!(fired = insights.len(), "Evaluated insight rules");
    insights
}

impl MarketingAnalytics<'_> {
    pub fn performance_insights(&self) -> Vec<Insight> {
        let performance = self.channel_performance();
        let impact = self.business_impact();
        evaluate_rules(&InsightContext {
            performance: &performance,
            impact: &impact,
        })
    }
}

//! Budget reallocation modelling across channels.

use marketpulse_core::{safe_div, Channel};
use serde::{Deserialize, Serialize};

use crate::engine::MarketingAnalytics;
use crate::performance::{sort_desc_by, ChannelPerformanceSummary, RankMetric};

/// Share of the weakest channel's spend modelled as moving to the strongest.
pub const REALLOCATION_SHARE: f64 = 0.2;
pub const SCALE_UP_ROAS: f64 = 3.0;
pub const OPTIMIZE_ROAS: f64 = 2.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A hypothetical spend move from the lowest-ROAS to the highest-ROAS channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reallocation {
    pub from_channel: Channel,
    pub to_channel: Channel,
    pub amount: f64,
    /// `amount * (to_roas - from_roas)`
    pub projected_net_gain: f64,
    pub roi_improvement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    pub channel: Channel,
    pub roas: f64,
    pub spend: f64,
}

impl From<&ChannelPerformanceSummary> for ChannelSnapshot {
    fn from(p: &ChannelPerformanceSummary) -> Self {
        Self {
            channel: p.channel,
            roas: p.roas,
            spend: p.spend,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetOpportunities {
    pub reallocation: Reallocation,
    /// Channels above [`SCALE_UP_ROAS`], in spend order.
    pub scale_up: Vec<ChannelSnapshot>,
    /// Channels below [`OPTIMIZE_ROAS`], in spend order.
    pub optimize: Vec<ChannelSnapshot>,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

impl MarketingAnalytics<'_> {
    /// `None` with fewer than two channels since there is nothing to move
    /// budget between.
    pub fn budget_optimization_opportunities(&self) -> Option<BudgetOpportunities> {
        let performance = self.channel_performance();
        if performance.len() < 2 {
            return None;
        }

        let mut by_roas = performance.clone();
        sort_desc_by(&mut by_roas, RankMetric::Roas);
        let top = by_roas.first()?;
        let bottom = by_roas.last()?;

        let amount = bottom.spend * REALLOCATION_SHARE;
        let projected_net_gain = amount * top.roas - amount * bottom.roas;
        let reallocation = Reallocation {
            from_channel: bottom.channel,
            to_channel: top.channel,
            amount,
            projected_net_gain,
            roi_improvement: safe_div(projected_net_gain, amount),
        };

        let bucket = |keep: fn(f64) -> bool| -> Vec<ChannelSnapshot> {
            performance
                .iter()
                .filter(|p| keep(p.roas))
                .map(ChannelSnapshot::from)
                .collect()
        };

        Some(BudgetOpportunities {
            reallocation,
            scale_up: bucket(|roas| roas > SCALE_UP_ROAS),
            optimize: bucket(|roas| roas < OPTIMIZE_ROAS),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::channel_row;

    fn three_channels() -> Vec<marketpulse_core::FinalRecord> {
        vec![
            channel_row(0, Channel::Facebook, 1_000.0, 10.0, 5_000.0, 7_500.0),
            channel_row(0, Channel::Google, 1_000.0, 10.0, 2_000.0, 8_000.0),
            channel_row(0, Channel::TikTok, 1_000.0, 10.0, 1_000.0, 2_500.0),
        ]
    }

    // 1. Reallocation ---------------------------------------------------------

    #[test]
    fn test_moves_twenty_percent_from_worst_to_best() {
        let rows = three_channels();
        let opp = MarketingAnalytics::from_records(&rows)
            .budget_optimization_opportunities()
            .unwrap();
        let r = &opp.reallocation;

        // Facebook roas 1.5, Google 4.0, TikTok 2.5
        assert_eq!(r.from_channel, Channel::Facebook);
        assert_eq!(r.to_channel, Channel::Google);
        assert!((r.amount - 1_000.0).abs() < 1e-9);
        assert!((r.projected_net_gain - 2_500.0).abs() < 1e-9);
        assert!((r.roi_improvement - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_spend_bottom_channel_has_zero_roi() {
        let rows = vec![
            channel_row(0, Channel::Google, 1_000.0, 10.0, 100.0, 500.0),
            channel_row(0, Channel::TikTok, 1_000.0, 10.0, 0.0, 0.0),
        ];
        let opp = MarketingAnalytics::from_records(&rows)
            .budget_optimization_opportunities()
            .unwrap();
        assert_eq!(opp.reallocation.from_channel, Channel::TikTok);
        assert_eq!(opp.reallocation.amount, 0.0);
        assert_eq!(opp.reallocation.roi_improvement, 0.0);
    }

    #[test]
    fn test_needs_two_channels() {
        let rows = vec![channel_row(0, Channel::Google, 1_000.0, 10.0, 100.0, 500.0)];
        assert!(MarketingAnalytics::from_records(&rows)
            .budget_optimization_opportunities()
            .is_none());
        assert!(MarketingAnalytics::from_records(&[])
            .budget_optimization_opportunities()
            .is_none());
    }

    // 2. Buckets --------------------------------------------------------------

    #[test]
    fn test_scale_up_and_optimize_buckets() {
        let rows = three_channels();
        let opp = MarketingAnalytics::from_records(&rows)
            .budget_optimization_opportunities()
            .unwrap();

        assert_eq!(opp.scale_up.len(), 1);
        assert_eq!(opp.scale_up[0].channel, Channel::Google);
        assert_eq!(opp.scale_up[0].spend, 2_000.0);

        assert_eq!(opp.optimize.len(), 1);
        assert_eq!(opp.optimize[0].channel, Channel::Facebook);
        assert!((opp.optimize[0].roas - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let rows = vec![
            channel_row(0, Channel::Google, 1_000.0, 10.0, 100.0, 300.0),
            channel_row(0, Channel::TikTok, 1_000.0, 10.0, 100.0, 200.0),
        ];
        let opp = MarketingAnalytics::from_records(&rows)
            .budget_optimization_opportunities()
            .unwrap();
        assert!(opp.scale_up.is_empty());
        assert!(opp.optimize.is_empty());
    }
}

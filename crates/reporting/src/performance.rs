//! Per-channel performance summaries over the whole (filtered) date range.

use std::collections::BTreeMap;

use marketpulse_core::{safe_div, Channel, DerivedMetrics};
use serde::{Deserialize, Serialize};

use crate::engine::MarketingAnalytics;

/// Totals for one real channel with ratio-of-sums metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelPerformanceSummary {
    pub channel: Channel,
    pub spend: f64,
    pub revenue: f64,
    pub impressions: f64,
    pub clicks: f64,
    pub roas: f64,
    pub ctr: f64,
    pub cpc: f64,
    pub cpm: f64,
}

impl ChannelPerformanceSummary {
    fn from_totals(channel: Channel, impressions: f64, clicks: f64, spend: f64, revenue: f64) -> Self {
        let m = DerivedMetrics::from_counts(impressions, clicks, spend, revenue);
        Self {
            channel,
            spend,
            revenue,
            impressions,
            clicks,
            roas: m.roas,
            ctr: m.ctr,
            cpc: m.cpc,
            cpm: m.cpm,
        }
    }

    pub fn metric(&self, metric: RankMetric) -> f64 {
        match metric {
            RankMetric::Spend => self.spend,
            RankMetric::Revenue => self.revenue,
            RankMetric::Roas => self.roas,
            RankMetric::Ctr => self.ctr,
            RankMetric::Cpc => self.cpc,
            RankMetric::Cpm => self.cpm,
        }
    }

    /// This channel's share of `total_spend`, 0 when nothing was spent.
    pub fn spend_share(&self, total_spend: f64) -> f64 {
        safe_div(self.spend, total_spend)
    }
}

/// Metric used to rank channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankMetric {
    Spend,
    Revenue,
    Roas,
    Ctr,
    Cpc,
    Cpm,
}

/// Stable descending sort by one metric.
pub(crate) fn sort_desc_by(rows: &mut [ChannelPerformanceSummary], metric: RankMetric) {
    rows.sort_by(|a, b| b.metric(metric).total_cmp(&a.metric(metric)));
}

impl MarketingAnalytics<'_> {
    /// One summary per real channel, sorted by spend descending. Ties keep
    /// channel-name order.
    pub fn channel_performance(&self) -> Vec<ChannelPerformanceSummary> {
        let mut totals: BTreeMap<Channel, [f64; 4]> = BTreeMap::new();
        for r in self.records() {
            let Some(channel) = r.channel.filter(|c| !c.is_total()) else {
                continue;
            };
            let t = totals.entry(channel).or_insert([0.0; 4]);
            t[0] += r.impressions;
            t[1] += r.clicks;
            t[2] += r.spend;
            t[3] += r.revenue;
        }

        let mut rows: Vec<ChannelPerformanceSummary> = totals
            .into_iter()
            .map(|(channel, [impressions, clicks, spend, revenue])| {
                ChannelPerformanceSummary::from_totals(channel, impressions, clicks, spend, revenue)
            })
            .collect();
        sort_desc_by(&mut rows, RankMetric::Spend);
        rows
    }

    /// The `n` channels with the largest value of `metric`.
    pub fn top_performers(&self, metric: RankMetric, n: usize) -> Vec<ChannelPerformanceSummary> {
        let mut rows = self.channel_performance();
        sort_desc_by(&mut rows, metric);
        rows.truncate(n);
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{business_only_row, channel_row, total_row};

    fn analytics_rows() -> Vec<marketpulse_core::FinalRecord> {
        vec![
            channel_row(0, Channel::Facebook, 10_000.0, 200.0, 500.0, 1_000.0),
            channel_row(0, Channel::Google, 20_000.0, 300.0, 800.0, 4_000.0),
            channel_row(0, Channel::TikTok, 5_000.0, 150.0, 100.0, 150.0),
            total_row(0, 1_400.0, 5_150.0, 20_000.0),
            channel_row(1, Channel::Facebook, 10_000.0, 100.0, 500.0, 2_000.0),
            total_row(1, 500.0, 2_000.0, 9_000.0),
            business_only_row(2, 3_000.0),
        ]
    }

    // 1. Channel summaries ----------------------------------------------------

    #[test]
    fn test_channel_performance_totals_and_ratios() {
        let rows = analytics_rows();
        let perf = MarketingAnalytics::from_records(&rows).channel_performance();

        assert_eq!(perf.len(), 3);
        let fb = perf.iter().find(|p| p.channel == Channel::Facebook).unwrap();
        assert_eq!(fb.spend, 1_000.0);
        assert_eq!(fb.revenue, 3_000.0);
        assert_eq!(fb.impressions, 20_000.0);
        assert!((fb.roas - 3.0).abs() < f64::EPSILON);
        assert!((fb.ctr - 300.0 / 20_000.0).abs() < f64::EPSILON);
        assert!((fb.cpc - 1_000.0 / 300.0).abs() < 1e-12);
        assert!((fb.cpm - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_channel_performance_sorted_by_spend_desc() {
        let rows = analytics_rows();
        let perf = MarketingAnalytics::from_records(&rows).channel_performance();
        let channels: Vec<Channel> = perf.iter().map(|p| p.channel).collect();
        assert_eq!(channels, vec![Channel::Facebook, Channel::Google, Channel::TikTok]);
        assert!(perf.windows(2).all(|w| w[0].spend >= w[1].spend));
    }

    #[test]
    fn test_ties_keep_channel_name_order() {
        let rows = vec![
            channel_row(0, Channel::TikTok, 100.0, 1.0, 50.0, 10.0),
            channel_row(0, Channel::Google, 100.0, 1.0, 50.0, 10.0),
        ];
        let perf = MarketingAnalytics::from_records(&rows).channel_performance();
        assert_eq!(perf[0].channel, Channel::Google);
        assert_eq!(perf[1].channel, Channel::TikTok);
    }

    #[test]
    fn test_empty_input_gives_empty_summary() {
        let perf = MarketingAnalytics::from_records(&[]).channel_performance();
        assert!(perf.is_empty());
    }

    // 2. Ranking --------------------------------------------------------------

    #[test]
    fn test_top_performers_by_roas() {
        let rows = analytics_rows();
        let top = MarketingAnalytics::from_records(&rows).top_performers(RankMetric::Roas, 2);
        let channels: Vec<Channel> = top.iter().map(|p| p.channel).collect();
        assert_eq!(channels, vec![Channel::Google, Channel::Facebook]);
    }

    #[test]
    fn test_spend_share() {
        let rows = analytics_rows();
        let perf = MarketingAnalytics::from_records(&rows).channel_performance();
        assert!((perf[0].spend_share(2_000.0) - 0.5).abs() < f64::EPSILON);
        assert_eq!(perf[0].spend_share(0.0), 0.0);
    }
}

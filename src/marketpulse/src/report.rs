//! Assembles every analysis into one report and renders it.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use marketpulse_core::format::{format_currency, format_number, format_percentage};
use marketpulse_core::{Channel, Dataset, FinalRecord, SourceKind};
use marketpulse_pipeline::{DateRange, PipelineRun};
use marketpulse_reporting::{
    BudgetOpportunities, BusinessImpact, ChannelPerformanceSummary, DailyTrend,
    EfficiencyBenchmark, ExecutiveSummary, Insight, MarketingAnalytics, SeasonalPatterns,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Report {
    /// Bounds of the filtered data, `None` when the filter removed every row.
    pub date_range: Option<DateRange>,
    pub total_days: usize,
    pub rows: usize,
    pub dropped_rows: BTreeMap<SourceKind, usize>,
    pub executive_summary: ExecutiveSummary,
    pub business_impact: BusinessImpact,
    pub channel_performance: Vec<ChannelPerformanceSummary>,
    pub efficiency_benchmarks: BTreeMap<Channel, EfficiencyBenchmark>,
    pub insights: Vec<Insight>,
    pub seasonal_patterns: Option<SeasonalPatterns>,
    pub budget_opportunities: Option<BudgetOpportunities>,
    pub daily_trends: Vec<DailyTrend>,
}

impl Report {
    pub fn build(run: &PipelineRun, dataset: &Dataset) -> Self {
        let analytics = MarketingAnalytics::new(dataset);
        Self {
            date_range: dataset
                .date_bounds()
                .map(|(start, end)| DateRange { start, end }),
            total_days: dataset.distinct_days(),
            rows: dataset.len(),
            dropped_rows: run.dropped_rows.clone(),
            executive_summary: analytics.executive_summary(),
            business_impact: analytics.business_impact(),
            channel_performance: analytics.channel_performance(),
            efficiency_benchmarks: analytics.efficiency_benchmarks(),
            insights: analytics.performance_insights(),
            seasonal_patterns: analytics.seasonal_patterns(),
            budget_opportunities: analytics.budget_optimization_opportunities(),
            daily_trends: analytics.daily_trends(),
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("serializing report")
    }

    /// Human-readable summary. Daily trends are left to the JSON output.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        let s = &self.executive_summary;
        writeln!(out, "MarketPulse report")?;
        match &self.date_range {
            Some(r) => writeln!(out, "Period: {} to {} ({} days)", r.start, r.end, self.total_days)?,
            None => writeln!(out, "Period: no data")?,
        }
        writeln!(out)?;

        writeln!(out, "Status:            {}", s.performance_status)?;
        writeln!(out, "Overall ROAS:      {}x", format_number(s.overall_roas, 2))?;
        writeln!(out, "Attribution rate:  {}", format_percentage(s.attribution_rate))?;
        writeln!(out, "Marketing spend:   {}", format_currency(s.total_spend))?;
        writeln!(out, "Attributed rev.:   {}", format_currency(s.total_revenue))?;
        writeln!(
            out,
            "Business revenue:  {}",
            format_currency(self.business_impact.total_business_revenue)
        )?;
        if let Some(top) = s.top_channel {
            writeln!(out, "Top channel:       {top}")?;
        }

        if !self.channel_performance.is_empty() {
            writeln!(out)?;
            writeln!(
                out,
                "{:<10} {:>12} {:>12} {:>7} {:>7} {:>8} {:>6}",
                "Channel", "Spend", "Revenue", "ROAS", "CTR", "CPC", "Grade"
            )?;
            for p in &self.channel_performance {
                let grade = self
                    .efficiency_benchmarks
                    .get(&p.channel)
                    .map_or("-", |b| b.performance_grade.as_str());
                writeln!(
                    out,
                    "{:<10} {:>12} {:>12} {:>7} {:>7} {:>8} {:>6}",
                    p.channel.as_str(),
                    format_currency(p.spend),
                    format_currency(p.revenue),
                    format!("{:.2}x", p.roas),
                    format_percentage(p.ctr * 100.0),
                    format!("${:.2}", p.cpc),
                    grade
                )?;
            }
        }

        if !self.insights.is_empty() {
            writeln!(out)?;
            writeln!(out, "Insights")?;
            for (i, insight) in self.insights.iter().enumerate() {
                writeln!(out, "{}. [{:?}] {}", i + 1, insight.priority, insight.insight)?;
                writeln!(out, "   -> {}", insight.recommendation)?;
                writeln!(out, "   {}", insight.impact)?;
            }
        }

        if let Some(budget) = &self.budget_opportunities {
            let r = &budget.reallocation;
            writeln!(out)?;
            writeln!(
                out,
                "Budget: move {} from {} to {} for a projected net gain of {}",
                format_currency(r.amount),
                r.from_channel,
                r.to_channel,
                format_currency(r.projected_net_gain)
            )?;
        }

        if let Some(seasonal) = &self.seasonal_patterns {
            writeln!(out)?;
            writeln!(
                out,
                "Best day: {} ({:.2}x), worst day: {} ({:.2}x)",
                seasonal.best_day.day,
                seasonal.best_day.avg_roas,
                seasonal.worst_day.day,
                seasonal.worst_day.avg_roas
            )?;
        }

        let dropped: usize = self.dropped_rows.values().sum();
        if dropped > 0 {
            writeln!(out)?;
            writeln!(out, "Rows dropped for missing dates: {dropped}")?;
        }
        Ok(())
    }
}

/// Write the dataset in canonical column order.
pub fn export_csv(dataset: &Dataset, path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(FinalRecord::COLUMNS)?;
    for record in dataset.records() {
        writer.write_record(record.to_cells())?;
    }
    writer.flush()?;
    Ok(())
}

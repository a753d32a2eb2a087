//! Day-of-week patterns over the `Total` series.

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::MarketingAnalytics;

/// Fewer `Total` rows than this and seasonality is not reported.
pub const MIN_SEASONAL_ROWS: usize = 30;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Mean spend, revenue and ROAS of all `Total` rows falling on one weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayPerformance {
    pub day: String,
    pub avg_spend: f64,
    pub avg_revenue: f64,
    pub avg_roas: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPerformance {
    pub day: String,
    pub avg_roas: f64,
    pub avg_spend: f64,
}

impl From<&WeekdayPerformance> for DayPerformance {
    fn from(w: &WeekdayPerformance) -> Self {
        Self {
            day: w.day.clone(),
            avg_roas: w.avg_roas,
            avg_spend: w.avg_spend,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalPatterns {
    pub best_day: DayPerformance,
    pub worst_day: DayPerformance,
    /// Only weekdays that occur in the data, Monday first.
    pub dow_performance: Vec<WeekdayPerformance>,
}

impl MarketingAnalytics<'_> {
    /// `None` when the series is too short to say anything about weekdays.
    /// The weekday table runs Monday first, while best/worst ties resolve to
    /// the alphabetically first day name.
    pub fn seasonal_patterns(&self) -> Option<SeasonalPatterns> {
        let rows = self.total_rows().count();
        if rows < MIN_SEASONAL_ROWS {
            debug!(rows, min = MIN_SEASONAL_ROWS, "Not enough days for seasonal patterns");
            return None;
        }

        // [spend, revenue, roas, count] per weekday, Monday = 0
        let mut sums = [[0.0f64; 4]; 7];
        for r in self.total_rows() {
            let slot = &mut sums[r.date.weekday().num_days_from_monday() as usize];
            slot[0] += r.spend;
            slot[1] += r.revenue;
            slot[2] += r.roas;
            slot[3] += 1.0;
        }

        let dow_performance: Vec<WeekdayPerformance> = WEEK
            .iter()
            .zip(sums.iter())
            .filter(|(_, s)| s[3] > 0.0)
            .map(|(day, [spend, revenue, roas, n])| WeekdayPerformance {
                day: day_name(*day).to_string(),
                avg_spend: spend / n,
                avg_revenue: revenue / n,
                avg_roas: roas / n,
            })
            .collect();

        // Ties go to the alphabetically first day name in both directions.
        let mut best = dow_performance.first()?;
        let mut worst = best;
        for w in &dow_performance {
            if w.avg_roas > best.avg_roas || (w.avg_roas == best.avg_roas && w.day < best.day) {
                best = w;
            }
            if w.avg_roas < worst.avg_roas || (w.avg_roas == worst.avg_roas && w.day < worst.day)
            {
                worst = w;
            }
        }

        Some(SeasonalPatterns {
            best_day: best.into(),
            worst_day: worst.into(),
            dow_performance,
        })
    }
}

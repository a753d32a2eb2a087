use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Channels & sources ─────────────────────────────────────────────────────

/// Advertising channel a marketing row belongs to. `Total` is the synthetic
/// per-date rollup across every real channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    Facebook,
    Google,
    TikTok,
    Total,
}

impl Channel {
    /// Channels that come from an ad-platform export.
    pub const PLATFORMS: [Channel; 3] = [Channel::Facebook, Channel::Google, Channel::TikTok];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Facebook => "Facebook",
            Self::Google => "Google",
            Self::TikTok => "TikTok",
            Self::Total => "Total",
        }
    }

    pub fn is_total(&self) -> bool {
        matches!(self, Self::Total)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "facebook" => Ok(Self::Facebook),
            "google" => Ok(Self::Google),
            "tiktok" => Ok(Self::TikTok),
            "total" => Ok(Self::Total),
            other => Err(format!("unknown channel '{other}'")),
        }
    }
}

/// One of the four required input feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Facebook,
    Google,
    TikTok,
    Business,
}

impl SourceKind {
    /// Matching precedence when a file name contains several tokens.
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Facebook,
        SourceKind::Google,
        SourceKind::TikTok,
        SourceKind::Business,
    ];

    /// Lowercase token searched for in file names.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Google => "google",
            Self::TikTok => "tiktok",
            Self::Business => "business",
        }
    }

    /// Canonical file name shown to users.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Facebook => "Facebook.csv",
            Self::Google => "Google.csv",
            Self::TikTok => "TikTok.csv",
            Self::Business => "Business.csv",
        }
    }

    /// Channel label stamped on rows from this source, `None` for business data.
    pub fn channel(&self) -> Option<Channel> {
        match self {
            Self::Facebook => Some(Channel::Facebook),
            Self::Google => Some(Channel::Google),
            Self::TikTok => Some(Channel::TikTok),
            Self::Business => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Facebook => "Facebook",
            Self::Google => "Google",
            Self::TikTok => "TikTok",
            Self::Business => "Business",
        };
        f.write_str(name)
    }
}

// ─── Raw input ──────────────────────────────────────────────────────────────

/// A parsed delimited file: header row plus string cells, untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ─── Cleaned records ────────────────────────────────────────────────────────

/// A cleaned ad-platform row. The ratio fields stay zero until the metric
/// deriver fills them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingRecord {
    pub date: NaiveDate,
    pub channel: Channel,
    pub impressions: f64,
    pub clicks: f64,
    pub spend: f64,
    pub revenue: f64,
    #[serde(default)]
    pub ctr: f64,
    #[serde(default)]
    pub cpc: f64,
    #[serde(default)]
    pub roas: f64,
    #[serde(default)]
    pub cpm: f64,
}

impl MarketingRecord {
    pub fn new(
        date: NaiveDate,
        channel: Channel,
        impressions: f64,
        clicks: f64,
        spend: f64,
        revenue: f64,
    ) -> Self {
        Self {
            date,
            channel,
            impressions,
            clicks,
            spend,
            revenue,
            ctr: 0.0,
            cpc: 0.0,
            roas: 0.0,
            cpm: 0.0,
        }
    }
}

/// One (date, channel) row of the daily marketing series. Same shape as a
/// metric-enriched [`MarketingRecord`]; the aggregator decides how the ratios
/// were produced.
pub type DailyAggregate = MarketingRecord;

/// A cleaned business-results row, one per calendar date.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub date: NaiveDate,
    pub orders: f64,
    pub new_orders: f64,
    pub new_customers: f64,
    pub total_revenue: f64,
    pub gross_profit: f64,
    pub cogs: f64,
}

/// A row of the canonical dataset: daily marketing joined with business
/// results on date. `channel` is `None` for dates that only appear in the
/// business feed; every numeric gap is zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalRecord {
    pub date: NaiveDate,
    pub channel: Option<Channel>,
    pub impressions: f64,
    pub clicks: f64,
    pub spend: f64,
    pub revenue: f64,
    pub ctr: f64,
    pub cpc: f64,
    pub roas: f64,
    pub cpm: f64,
    pub orders: f64,
    pub new_orders: f64,
    pub new_customers: f64,
    pub total_revenue: f64,
    pub gross_profit: f64,
    pub cogs: f64,
}

impl FinalRecord {
    /// Column order used by exports.
    pub const COLUMNS: [&'static str; 16] = [
        "date",
        "channel",
        "impressions",
        "clicks",
        "spend",
        "revenue",
        "ctr",
        "cpc",
        "roas",
        "cpm",
        "orders",
        "new_orders",
        "new_customers",
        "total_revenue",
        "gross_profit",
        "cogs",
    ];

    pub fn join(marketing: Option<&DailyAggregate>, business: Option<&BusinessRecord>) -> Option<Self> {
        let date = marketing.map(|m| m.date).or(business.map(|b| b.date))?;
        let m = marketing;
        let b = business;
        Some(Self {
            date,
            channel: m.map(|m| m.channel),
            impressions: m.map_or(0.0, |m| m.impressions),
            clicks: m.map_or(0.0, |m| m.clicks),
            spend: m.map_or(0.0, |m| m.spend),
            revenue: m.map_or(0.0, |m| m.revenue),
            ctr: m.map_or(0.0, |m| m.ctr),
            cpc: m.map_or(0.0, |m| m.cpc),
            roas: m.map_or(0.0, |m| m.roas),
            cpm: m.map_or(0.0, |m| m.cpm),
            orders: b.map_or(0.0, |b| b.orders),
            new_orders: b.map_or(0.0, |b| b.new_orders),
            new_customers: b.map_or(0.0, |b| b.new_customers),
            total_revenue: b.map_or(0.0, |b| b.total_revenue),
            gross_profit: b.map_or(0.0, |b| b.gross_profit),
            cogs: b.map_or(0.0, |b| b.cogs),
        })
    }

    pub fn is_total(&self) -> bool {
        self.channel == Some(Channel::Total)
    }

    /// Channel label as written to exports; empty for business-only dates.
    pub fn channel_label(&self) -> &'static str {
        self.channel.map_or("", |c| c.as_str())
    }

    /// Cells in [`FinalRecord::COLUMNS`] order.
    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.date.format("%Y-%m-%d").to_string(),
            self.channel_label().to_string(),
            self.impressions.to_string(),
            self.clicks.to_string(),
            self.spend.to_string(),
            self.revenue.to_string(),
            self.ctr.to_string(),
            self.cpc.to_string(),
            self.roas.to_string(),
            self.cpm.to_string(),
            self.orders.to_string(),
            self.new_orders.to_string(),
            self.new_customers.to_string(),
            self.total_revenue.to_string(),
            self.gross_profit.to_string(),
            self.cogs.to_string(),
        ]
    }
}

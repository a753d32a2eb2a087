//! Per-source cleaning: column normalization, date detection and parsing,
//! numeric coercion and schema convergence.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use marketpulse_core::{BusinessRecord, MarketingRecord, PulseError, PulseResult, RawTable, SourceKind};
use tracing::warn;

/// Year-first layouts, only tried when the value opens with a 4-digit year.
const YEAR_FIRST_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Remaining date-only layouts, tried in order. Month-first wins for
/// ambiguous slashes.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Month-first date-time layouts whose time part is discarded.
const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Rows kept after cleaning plus how many were dropped for a bad date.
#[derive(Debug, Clone, PartialEq)]
pub struct Cleaned<T> {
    pub records: Vec<T>,
    pub dropped_rows: usize,
}

/// `Spend Amount` → `spend_amount`.
pub fn normalize_column(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Parse a calendar date, ignoring any time component. `None` when empty or
/// in no recognised layout.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let year_first = value.len() >= 4 && value.as_bytes()[..4].iter().all(u8::is_ascii_digit);
    if year_first {
        let parsed = YEAR_FIRST_FORMATS.iter().find_map(|fmt| {
            NaiveDate::parse_from_str(value, fmt)
                .ok()
                .or_else(|| NaiveDateTime::parse_from_str(value, fmt).ok().map(|dt| dt.date()))
        });
        if parsed.is_some() {
            return parsed;
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

/// Numeric coercion: anything unparseable (or NaN) becomes 0.
pub fn coerce_number(value: &str) -> f64 {
    match value.trim().parse::<f64>() {
        Ok(v) if !v.is_nan() => v,
        _ => 0.0,
    }
}

/// Normalized header names with first-match lookup.
struct Columns {
    names: Vec<String>,
}

impl Columns {
    fn new(table: &RawTable) -> Self {
        Self {
            names: table.headers.iter().map(|h| normalize_column(h)).collect(),
        }
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// First of `aliases` present, in alias order.
    fn find_any(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|a| self.find(a))
    }

    /// First column whose normalized name contains `date`.
    fn date_column(&self, source: SourceKind) -> PulseResult<usize> {
        self.names
            .iter()
            .position(|n| n.contains("date"))
            .ok_or(PulseError::NoDateColumn(source))
    }
}

fn cell(row: &[String], index: Option<usize>) -> f64 {
    index
        .and_then(|i| row.get(i))
        .map_or(0.0, |v| coerce_number(v))
}

fn log_dropped(source: SourceKind, dropped: usize, total: usize) {
    if dropped > 0 {
        warn!(
            source = %source,
            dropped_rows = dropped,
            total_rows = total,
            "Dropped rows with missing or unparseable dates"
        );
    }
}

/// Clean one ad-platform export and tag its rows with the source's channel.
pub fn clean_marketing_data(
    table: &RawTable,
    source: SourceKind,
) -> PulseResult<Cleaned<MarketingRecord>> {
    let channel = source.channel().ok_or_else(|| {
        PulseError::Processing(format!("{source} is not a marketing source"))
    })?;

    let columns = Columns::new(table);
    let date_idx = columns.date_column(source)?;
    let impressions_idx = columns.find_any(&["impressions", "impression"]);
    let clicks_idx = columns.find("clicks");
    let spend_idx = columns.find("spend");
    let revenue_idx = columns.find_any(&["attributed_revenue", "revenue"]);

    let mut records = Vec::with_capacity(table.len());
    let mut dropped = 0usize;
    for row in &table.rows {
        let Some(date) = row.get(date_idx).and_then(|v| parse_date(v)) else {
            dropped += 1;
            continue;
        };
        records.push(MarketingRecord::new(
            date,
            channel,
            cell(row, impressions_idx),
            cell(row, clicks_idx),
            cell(row, spend_idx),
            cell(row, revenue_idx),
        ));
    }

    log_dropped(source, dropped, table.len());
    Ok(Cleaned {
        records,
        dropped_rows: dropped,
    })
}

/// Clean the business-results export.
pub fn clean_business_data(table: &RawTable) -> PulseResult<Cleaned<BusinessRecord>> {
    let source = SourceKind::Business;
    let columns = Columns::new(table);
    let date_idx = columns.date_column(source)?;
    let orders_idx = columns.find("orders");
    let new_orders_idx = columns.find("new_orders");
    let new_customers_idx = columns.find("new_customers");
    let total_revenue_idx = columns.find("total_revenue");
    let gross_profit_idx = columns.find("gross_profit");
    let cogs_idx = columns.find("cogs");

    let mut records = Vec::with_capacity(table.len());
    let mut dropped = 0usize;
    for row in &table.rows {
        let Some(date) = row.get(date_idx).and_then(|v| parse_date(v)) else {
            dropped += 1;
            continue;
        };
        records.push(BusinessRecord {
            date,
            orders: cell(row, orders_idx),
            new_orders: cell(row, new_orders_idx),
            new_customers: cell(row, new_customers_idx),
            total_revenue: cell(row, total_revenue_idx),
            gross_profit: cell(row, gross_profit_idx),
            cogs: cell(row, cogs_idx),
        });
    }

    log_dropped(source, dropped, table.len());
    Ok(Cleaned {
        records,
        dropped_rows: dropped,
    })
}

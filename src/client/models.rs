//! Wire payloads returned by the stats API

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A registered website the server holds stats for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Website {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebsiteList {
    #[serde(default)]
    pub websites: Vec<Website>,
}

/// The time range every widget's fetch is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    Today,
    Yesterday,
    Last7Days,
    Last30Days,
}

impl TimeRange {
    /// Wire value used in query strings
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::Today => "today",
            TimeRange::Yesterday => "yesterday",
            TimeRange::Last7Days => "7d",
            TimeRange::Last30Days => "30d",
        }
    }

    /// Single-day ranges only ever bucket by hour
    pub fn is_single_day(self) -> bool {
        matches!(self, TimeRange::Today | TimeRange::Yesterday)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(TimeRange::Today),
            "yesterday" => Ok(TimeRange::Yesterday),
            "7d" => Ok(TimeRange::Last7Days),
            "30d" => Ok(TimeRange::Last30Days),
            other => Err(format!("unknown time range '{other}'")),
        }
    }
}

/// Time bucket size for the time-series chart (`viewType` on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    Hourly,
    Daily,
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Hourly => "hourly",
            Granularity::Daily => "daily",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location stat scope (`locationType` on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeoMode {
    Domestic,
    Global,
}

impl GeoMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GeoMode::Domestic => "domestic",
            GeoMode::Global => "global",
        }
    }
}

impl fmt::Display for GeoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeoMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "domestic" => Ok(GeoMode::Domestic),
            "global" => Ok(GeoMode::Global),
            other => Err(format!("unknown location type '{other}'")),
        }
    }
}

/// Raw time-series payload; lengths are validated by the chart engine,
/// not at deserialization time
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeSeriesStats {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub visitors: Vec<u64>,
    #[serde(default)]
    pub pageviews: Vec<u64>,
}

/// Totals for the overview card
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct OverallStats {
    pub uv: u64,
    pub pv: u64,
    /// Bytes served over the range
    pub traffic: u64,
}

/// Generic top-N ranking payload shared by url/referer/browser/os/device
/// and location stats. The arrays are parallel; the secondary pv arrays
/// are only present for kinds that report pageviews.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankingStats {
    #[serde(default)]
    pub key: Vec<String>,
    #[serde(default)]
    pub uv: Vec<u64>,
    #[serde(default)]
    pub uv_percent: Vec<f64>,
    #[serde(default)]
    pub pv: Option<Vec<u64>>,
    #[serde(default)]
    pub pv_percent: Option<Vec<f64>>,
}

/// One raw access-log record, exactly as the server returns it
#[derive(Debug, Clone, Deserialize)]
pub struct LogEntry {
    pub time: String,
    pub ip: String,
    pub method: String,
    pub url: String,
    pub status_code: u16,
    pub bytes_sent: u64,
    #[serde(default)]
    pub referer: String,
    #[serde(default)]
    pub user_browser: String,
    #[serde(default)]
    pub user_os: String,
    #[serde(default)]
    pub user_device: String,
    #[serde(default)]
    pub domestic_location: String,
    #[serde(default)]
    pub global_location: String,
    #[serde(default)]
    pub pageview_flag: bool,
}

/// Server-authoritative pagination state
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total: u64,
    pub page: u32,
    #[serde(rename = "pageSize")]
    pub page_size: u32,
    pub pages: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogsPage {
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    pub pagination: Pagination,
}

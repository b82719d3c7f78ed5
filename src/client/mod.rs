//! Typed fetchers for the stats API
//!
//! One `StatsClient` wraps a shared `reqwest::Client`; every stat kind has
//! its own fetch function so call sites stay typed. Transport failures and
//! non-2xx statuses are normalized into a single [`FetchError`]; the
//! dashboard never distinguishes them beyond logging.

pub mod models;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;
pub use models::{
    GeoMode, Granularity, LogEntry, LogsPage, OverallStats, Pagination, RankingStats,
    TimeRange, TimeSeriesStats, Website, WebsiteList,
};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned HTTP {0}")]
    Status(StatusCode),

    #[error("invalid API base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Dimension of a top-N ranking fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingKind {
    Url,
    Referer,
    Browser,
    Os,
    Device,
}

impl RankingKind {
    fn endpoint(self) -> &'static str {
        match self {
            RankingKind::Url => "url",
            RankingKind::Referer => "referer",
            RankingKind::Browser => "browser",
            RankingKind::Os => "os",
            RankingKind::Device => "device",
        }
    }
}

/// Sort and filter parameters for a log page fetch
#[derive(Debug, Clone)]
pub struct LogQuery {
    pub page: u32,
    pub page_size: u32,
    pub sort_field: String,
    pub sort_order: String,
    pub filter: String,
}

pub struct StatsClient {
    http: reqwest::Client,
    base: Url,
}

impl StatsClient {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        use anyhow::Context;

        let http = reqwest::Client::builder()
            .user_agent(concat!("vantage/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout())
            .build()
            .context("failed to build HTTP client for the stats API")?;

        let base = Url::parse(&config.base_url)
            .with_context(|| format!("invalid API base URL '{}'", config.base_url))?;

        Ok(Self { http, base })
    }

    /// Build a client against an explicit base URL. Used by tests to point
    /// at a mock server.
    pub fn with_base_url(base: &str) -> anyhow::Result<Self> {
        Self::new(&ApiConfig {
            base_url: base.to_string(),
            request_timeout_secs: 10,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> FetchResult<T> {
        let mut url = self.base.join(path).map_err(FetchError::BaseUrl)?;
        url.query_pairs_mut().extend_pairs(query);

        debug!("GET {}", url);
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        Ok(response.json::<T>().await?)
    }

    /// Fetch the list of registered websites
    pub async fn websites(&self) -> FetchResult<Vec<Website>> {
        let list: WebsiteList = self.get_json("/api/websites", &[]).await?;
        Ok(list.websites)
    }

    /// Fetch the visitors/pageviews series for the chart
    pub async fn timeseries(
        &self,
        website_id: &str,
        range: TimeRange,
        granularity: Granularity,
    ) -> FetchResult<TimeSeriesStats> {
        self.get_json(
            "/api/stats/timeseries",
            &[
                ("id", website_id.to_string()),
                ("timeRange", range.as_str().to_string()),
                ("viewType", granularity.as_str().to_string()),
            ],
        )
        .await
    }

    /// Fetch the UV/PV/traffic totals for the overview card
    pub async fn overall(&self, website_id: &str, range: TimeRange) -> FetchResult<OverallStats> {
        self.get_json(
            "/api/stats/overall",
            &[
                ("id", website_id.to_string()),
                ("timeRange", range.as_str().to_string()),
            ],
        )
        .await
    }

    /// Fetch a top-N ranking for one dimension
    pub async fn ranking(
        &self,
        kind: RankingKind,
        website_id: &str,
        range: TimeRange,
        limit: u32,
    ) -> FetchResult<RankingStats> {
        self.get_json(
            &format!("/api/stats/{}", kind.endpoint()),
            &[
                ("id", website_id.to_string()),
                ("timeRange", range.as_str().to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    /// Fetch location stats for the geo map. Callers pass a high limit to
    /// get effectively all entries; the server returns them sorted by UV
    /// descending, which the ranking slice relies on.
    pub async fn location(
        &self,
        website_id: &str,
        range: TimeRange,
        mode: GeoMode,
        limit: u32,
    ) -> FetchResult<RankingStats> {
        self.get_json(
            "/api/stats/location",
            &[
                ("id", website_id.to_string()),
                ("timeRange", range.as_str().to_string()),
                ("locationType", mode.as_str().to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    /// Fetch one page of raw access logs
    pub async fn logs(&self, website_id: &str, query: &LogQuery) -> FetchResult<LogsPage> {
        let mut params = vec![
            ("id", website_id.to_string()),
            ("page", query.page.to_string()),
            ("pageSize", query.page_size.to_string()),
            ("sortField", query.sort_field.clone()),
            ("sortOrder", query.sort_order.clone()),
        ];
        if !query.filter.is_empty() {
            params.push(("filter", query.filter.clone()));
        }

        self.get_json("/api/stats/logs", &params).await
    }
}

//! Stats client contract tests against a mock HTTP server

use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vantage::client::models::{GeoMode, Granularity, TimeRange};
use vantage::client::{FetchError, LogQuery, RankingKind, StatsClient};

fn log_query(page: u32, filter: &str) -> LogQuery {
    LogQuery {
        page,
        page_size: 50,
        sort_field: "timestamp".to_string(),
        sort_order: "desc".to_string(),
        filter: filter.to_string(),
    }
}

#[tokio::test]
async fn websites_list_deserializes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/websites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "websites": [
                {"id": "a", "name": "Site A"},
                {"id": "b", "name": "Site B"},
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = StatsClient::with_base_url(&server.uri()).unwrap();
    let websites = client.websites().await.unwrap();
    assert_eq!(websites.len(), 2);
    assert_eq!(websites[0].id, "a");
    assert_eq!(websites[1].name, "Site B");
}

#[tokio::test]
async fn timeseries_sends_range_and_granularity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats/timeseries"))
        .and(query_param("id", "a"))
        .and(query_param("timeRange", "30d"))
        .and(query_param("viewType", "daily"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "labels": ["07-01", "07-02"],
            "visitors": [3, 5],
            "pageviews": [9, 11],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = StatsClient::with_base_url(&server.uri()).unwrap();
    let stats = client
        .timeseries("a", TimeRange::Last30Days, Granularity::Daily)
        .await
        .unwrap();
    assert_eq!(stats.labels, vec!["07-01", "07-02"]);
    assert_eq!(stats.visitors, vec![3, 5]);
    assert_eq!(stats.pageviews, vec![9, 11]);
}

#[tokio::test]
async fn overall_stats_roundtrip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats/overall"))
        .and(query_param("id", "a"))
        .and(query_param("timeRange", "today"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uv": 120, "pv": 560, "traffic": 1048576,
        })))
        .mount(&server)
        .await;

    let client = StatsClient::with_base_url(&server.uri()).unwrap();
    let stats = client.overall("a", TimeRange::Today).await.unwrap();
    assert_eq!(stats.uv, 120);
    assert_eq!(stats.pv, 560);
    assert_eq!(stats.traffic, 1_048_576);
}

#[tokio::test]
async fn ranking_kinds_hit_their_endpoints() {
    let server = MockServer::start().await;
    for endpoint in ["url", "referer", "browser", "os", "device"] {
        Mock::given(method("GET"))
            .and(path(format!("/api/stats/{endpoint}")))
            .and(query_param("id", "a"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "key": [endpoint],
                "uv": [7],
                "uv_percent": [100.0],
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = StatsClient::with_base_url(&server.uri()).unwrap();
    for kind in [
        RankingKind::Url,
        RankingKind::Referer,
        RankingKind::Browser,
        RankingKind::Os,
        RankingKind::Device,
    ] {
        let stats = client.ranking(kind, "a", TimeRange::Today, 10).await.unwrap();
        assert_eq!(stats.key.len(), 1);
        assert_eq!(stats.uv, vec![7]);
    }
}

#[tokio::test]
async fn ranking_secondary_arrays_are_optional() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats/url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": ["/a", "/b"],
            "uv": [10, 5],
            "uv_percent": [66.7, 33.3],
            "pv": [20, 5],
            "pv_percent": [80.0, 20.0],
        })))
        .mount(&server)
        .await;

    let client = StatsClient::with_base_url(&server.uri()).unwrap();
    let stats = client
        .ranking(RankingKind::Url, "a", TimeRange::Today, 10)
        .await
        .unwrap();
    assert_eq!(stats.pv.as_deref(), Some(&[20, 5][..]));
    assert_eq!(stats.pv_percent.as_deref(), Some(&[80.0, 20.0][..]));
}

#[tokio::test]
async fn location_sends_mode_and_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats/location"))
        .and(query_param("locationType", "global"))
        .and(query_param("limit", "99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": ["Germany"],
            "uv": [12],
            "uv_percent": [100.0],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = StatsClient::with_base_url(&server.uri()).unwrap();
    let stats = client
        .location("a", TimeRange::Last7Days, GeoMode::Global, 99)
        .await
        .unwrap();
    assert_eq!(stats.key, vec!["Germany"]);
}

#[tokio::test]
async fn logs_sends_paging_and_sort_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats/logs"))
        .and(query_param("id", "a"))
        .and(query_param("page", "2"))
        .and(query_param("pageSize", "50"))
        .and(query_param("sortField", "timestamp"))
        .and(query_param("sortOrder", "desc"))
        .and(query_param("filter", "bot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logs": [],
            "pagination": {"total": 120, "page": 2, "pageSize": 50, "pages": 3},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = StatsClient::with_base_url(&server.uri()).unwrap();
    let page = client.logs("a", &log_query(2, "bot")).await.unwrap();
    assert_eq!(page.pagination.page, 2);
    assert_eq!(page.pagination.pages, 3);
}

#[tokio::test]
async fn empty_filter_is_omitted_from_the_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats/logs"))
        .and(query_param_is_missing("filter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logs": [],
            "pagination": {"total": 0, "page": 1, "pageSize": 50, "pages": 0},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = StatsClient::with_base_url(&server.uri()).unwrap();
    client.logs("a", &log_query(1, "")).await.unwrap();
}

#[tokio::test]
async fn log_entries_deserialize_with_optional_fields_defaulted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logs": [{
                "time": "2026-08-04 12:00:00",
                "ip": "203.0.113.9",
                "method": "GET",
                "url": "/index.html",
                "status_code": 200,
                "bytes_sent": 4096,
                "global_location": "Germany",
                "pageview_flag": true,
            }],
            "pagination": {"total": 1, "page": 1, "pageSize": 50, "pages": 1},
        })))
        .mount(&server)
        .await;

    let client = StatsClient::with_base_url(&server.uri()).unwrap();
    let page = client.logs("a", &log_query(1, "")).await.unwrap();
    let entry = &page.logs[0];
    assert_eq!(entry.global_location, "Germany");
    assert_eq!(entry.domestic_location, "");
    assert_eq!(entry.referer, "");
    assert!(entry.pageview_flag);
}

#[tokio::test]
async fn non_2xx_is_a_status_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats/overall"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = StatsClient::with_base_url(&server.uri()).unwrap();
    let err = client.overall("a", TimeRange::Today).await.unwrap_err();
    assert!(matches!(err, FetchError::Status(code) if code.as_u16() == 500));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_failure() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = StatsClient::with_base_url(&uri).unwrap();
    let err = client.websites().await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
}

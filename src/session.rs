//! Selection synchronization controller
//!
//! Owns the shared (website, time range) selection and fans each change
//! out to every widget. Every fan-out is stamped with a fetch epoch; a
//! snapshot that resolves after the selection has moved on is discarded
//! wholesale, so rapid selection changes can never interleave two
//! websites' widgets. Widget failures stay widget-local: a failed fetch
//! renders an error placeholder while its siblings render normally.

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use url::Url;

use crate::chart::{ChartAction, ChartEvent, ChartWidget};
use crate::client::models::{
    GeoMode, Granularity, LogsPage, OverallStats, RankingStats, TimeRange, TimeSeriesStats,
    Website,
};
use crate::client::{FetchResult, RankingKind, StatsClient};
use crate::geo::{GeoWidget, GEO_FETCH_LIMIT};
use crate::logs::{LogBrowser, LogsError, LogsEvent, Transition};
use crate::overview::OverviewWidget;
use crate::prefs::{PreferenceStore, PREF_SELECTED_WEBSITE};
use crate::ranking::RankingWidget;
use crate::render::SurfaceFactory;
use crate::theme::ThemeOverlay;

/// Top-N rankings fetch this many entries
pub const RANKING_LIMIT: u32 = 10;

const EMPTY_MESSAGE: &str = "No websites registered";
const CHART_ERROR_MESSAGE: &str = "Failed to load visits data";

/// The shared selection every widget's fetch is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub website_id: String,
    pub time_range: TimeRange,
}

/// Page links carrying the selected website, recomputed synchronously on
/// every selection change so they stay correct even when fetches later
/// fail
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavLinks {
    pub logs_href: String,
    pub spiders_href: String,
}

impl NavLinks {
    fn for_website(website_id: &str) -> Self {
        Self {
            logs_href: format!("/logs?id={website_id}"),
            spiders_href: format!("/spiders?id={website_id}"),
        }
    }
}

/// Initial website resolution: the query-string id when it names a
/// registered website, else the stored preference under the same check,
/// else the first registered website, else none.
pub fn resolve_website_id(
    websites: &[Website],
    query_id: Option<&str>,
    stored_id: Option<&str>,
) -> Option<String> {
    let known = |id: &str| websites.iter().any(|w| w.id == id);

    if let Some(id) = query_id {
        if known(id) {
            return Some(id.to_string());
        }
    }
    if let Some(id) = stored_id {
        if known(id) {
            return Some(id.to_string());
        }
    }
    websites.first().map(|w| w.id.clone())
}

/// One fan-out's worth of fetch results, stamped with the epoch it was
/// issued under. Each field is an independent `Result`: one failure never
/// blocks or corrupts the others.
pub struct DashboardSnapshot {
    epoch: u64,
    pub overall: FetchResult<OverallStats>,
    pub timeseries: FetchResult<TimeSeriesStats>,
    pub urls: FetchResult<RankingStats>,
    pub referers: FetchResult<RankingStats>,
    pub browsers: FetchResult<RankingStats>,
    pub oses: FetchResult<RankingStats>,
    pub devices: FetchResult<RankingStats>,
    pub location: FetchResult<RankingStats>,
    pub logs: FetchResult<LogsPage>,
}

impl DashboardSnapshot {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// The dashboard session: shared selection, fetch epoch, and all widgets.
pub struct Dashboard {
    prefs: Arc<dyn PreferenceStore>,
    page_url: Url,
    nav: NavLinks,
    epoch: u64,
    selection: Option<Selection>,
    pub overview: OverviewWidget,
    pub chart: ChartWidget,
    pub geo: GeoWidget,
    pub urls: RankingWidget,
    pub referers: RankingWidget,
    pub browsers: RankingWidget,
    pub oses: RankingWidget,
    pub devices: RankingWidget,
    pub logs: LogBrowser,
}

impl Dashboard {
    pub fn new(prefs: Arc<dyn PreferenceStore>, page_url: Url, initial_range: TimeRange) -> Self {
        Self {
            nav: NavLinks::default(),
            epoch: 0,
            selection: None,
            overview: OverviewWidget::new(),
            chart: ChartWidget::new(initial_range),
            geo: GeoWidget::new(),
            urls: RankingWidget::new("url-ranking-table", true),
            referers: RankingWidget::new("referer-ranking-table", false),
            browsers: RankingWidget::new("browser-ranking-table", false),
            oses: RankingWidget::new("os-ranking-table", false),
            devices: RankingWidget::new("device-ranking-table", false),
            logs: LogBrowser::from_prefs(prefs.as_ref()),
            prefs,
            page_url,
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn nav(&self) -> &NavLinks {
        &self.nav
    }

    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    fn query_id(&self) -> Option<String> {
        self.page_url
            .query_pairs()
            .find(|(k, _)| k == "id")
            .map(|(_, v)| v.into_owned())
    }

    /// Resolve the initial website through the fallback chain and make it
    /// the live selection. `None` means no websites are registered; the
    /// caller renders the explicit empty state.
    pub fn resolve_initial(&mut self, websites: &[Website], range: TimeRange) -> Option<Selection> {
        let query_id = self.query_id();
        let stored = self.prefs.get(PREF_SELECTED_WEBSITE);
        let id = resolve_website_id(websites, query_id.as_deref(), stored.as_deref())?;
        info!("Resolved initial website '{}'", id);
        self.set_selection(&id, range);
        self.selection.clone()
    }

    /// Change the live selection: bump the fetch epoch, recompute nav
    /// links, persist the id, and mirror it into the page URL, all
    /// synchronously. The caller follows up with one fetch fan-out;
    /// anything still in flight is already stale by epoch.
    pub fn set_selection(&mut self, website_id: &str, time_range: TimeRange) {
        let website_changed = self
            .selection
            .as_ref()
            .map_or(true, |s| s.website_id != website_id);

        self.epoch += 1;
        self.nav = NavLinks::for_website(website_id);
        self.prefs.set(PREF_SELECTED_WEBSITE, website_id);
        self.write_query_id(website_id);

        if website_changed {
            self.logs.reset_for_website(self.prefs.as_ref());
        }
        self.chart.revalidate_range(time_range);

        self.selection = Some(Selection {
            website_id: website_id.to_string(),
            time_range,
        });
        debug!(
            "Selection set to '{}' over {} (epoch {})",
            website_id, time_range, self.epoch
        );
    }

    /// Keep the website, change the range. Returns false when no website
    /// is selected yet.
    pub fn set_time_range(&mut self, range: TimeRange) -> bool {
        let Some(selection) = self.selection.clone() else {
            return false;
        };
        self.set_selection(&selection.website_id, range);
        true
    }

    fn write_query_id(&mut self, website_id: &str) {
        let retained: Vec<(String, String)> = self
            .page_url
            .query_pairs()
            .filter(|(k, _)| k != "id")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let mut pairs = self.page_url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &retained {
            pairs.append_pair(k, v);
        }
        pairs.append_pair("id", website_id);
    }

    /// Issue every widget fetch concurrently and collect the results into
    /// an epoch-stamped snapshot. Returns `None` without fetching when no
    /// selection is resolved.
    pub async fn fetch_snapshot(&mut self, client: &StatsClient) -> Option<DashboardSnapshot> {
        let selection = self.selection.clone()?;
        let epoch = self.epoch;
        let granularity = self.chart.granularity();
        let mode = self.geo.mode();
        let log_query = self.logs.begin_fetch();

        let id = selection.website_id.as_str();
        let range = selection.time_range;
        debug!("Fan-out for '{}' over {} (epoch {})", id, range, epoch);

        let (overall, timeseries, urls, referers, browsers, oses, devices, location, logs) = tokio::join!(
            client.overall(id, range),
            client.timeseries(id, range, granularity),
            client.ranking(RankingKind::Url, id, range, RANKING_LIMIT),
            client.ranking(RankingKind::Referer, id, range, RANKING_LIMIT),
            client.ranking(RankingKind::Browser, id, range, RANKING_LIMIT),
            client.ranking(RankingKind::Os, id, range, RANKING_LIMIT),
            client.ranking(RankingKind::Device, id, range, RANKING_LIMIT),
            client.location(id, range, mode, GEO_FETCH_LIMIT),
            client.logs(id, &log_query),
        );

        Some(DashboardSnapshot {
            epoch,
            overall,
            timeseries,
            urls,
            referers,
            browsers,
            oses,
            devices,
            location,
            logs,
        })
    }

    /// Apply a snapshot to the widgets, each independently. A snapshot
    /// from a superseded epoch is discarded wholesale and the method
    /// reports false.
    pub fn apply_snapshot(
        &mut self,
        snapshot: DashboardSnapshot,
        theme: &ThemeOverlay,
        factory: &dyn SurfaceFactory,
    ) -> bool {
        if snapshot.epoch != self.epoch {
            debug!(
                "Discarding stale snapshot (epoch {}, live {})",
                snapshot.epoch, self.epoch
            );
            return false;
        }

        match snapshot.overall {
            Ok(stats) => {
                if let Err(e) = self.overview.apply(&stats, factory) {
                    error!("Overview render failed: {}", e);
                }
            }
            Err(e) => self.overview.show_error(&e, factory),
        }

        self.apply_timeseries(snapshot.timeseries, factory);

        apply_ranking(&mut self.urls, snapshot.urls, factory);
        apply_ranking(&mut self.referers, snapshot.referers, factory);
        apply_ranking(&mut self.browsers, snapshot.browsers, factory);
        apply_ranking(&mut self.oses, snapshot.oses, factory);
        apply_ranking(&mut self.devices, snapshot.devices, factory);

        match snapshot.location {
            Ok(stats) => {
                if let Err(e) = self.geo.apply_stats(&stats, theme, factory) {
                    error!("Geo map render failed: {}", e);
                }
            }
            Err(e) => self.geo.show_error(&e, factory),
        }

        match snapshot.logs {
            Ok(page) => {
                if let Err(e) = self.logs.apply_page(&page, factory) {
                    error!("Log table render failed: {}", e);
                }
            }
            Err(e) => self.logs.show_error(&e, factory),
        }

        true
    }

    fn apply_timeseries(
        &mut self,
        result: FetchResult<TimeSeriesStats>,
        factory: &dyn SurfaceFactory,
    ) {
        match result {
            Ok(stats) => {
                if let Err(e) = self.chart.apply_stats(stats, factory) {
                    error!("Visits chart rejected payload: {}", e);
                    self.chart.show_error(CHART_ERROR_MESSAGE, factory);
                }
            }
            Err(e) => {
                error!("Timeseries fetch failed: {}", e);
                self.chart.show_error(CHART_ERROR_MESSAGE, factory);
            }
        }
    }

    /// Full refresh: fan-out, then apply. Renders the shared empty state
    /// when no selection could be resolved.
    pub async fn refresh(
        &mut self,
        client: &StatsClient,
        theme: &ThemeOverlay,
        factory: &dyn SurfaceFactory,
    ) {
        match self.fetch_snapshot(client).await {
            Some(snapshot) => {
                self.apply_snapshot(snapshot, theme, factory);
            }
            None => self.show_empty_all(factory),
        }
    }

    /// Explicit empty state across every widget, never a silent blank
    pub fn show_empty_all(&mut self, factory: &dyn SurfaceFactory) {
        warn!("{}", EMPTY_MESSAGE);
        self.overview.show_empty(EMPTY_MESSAGE, factory);
        self.chart.show_empty(EMPTY_MESSAGE, factory);
        self.geo.show_empty(EMPTY_MESSAGE, factory);
        self.urls.show_empty(EMPTY_MESSAGE, factory);
        self.referers.show_empty(EMPTY_MESSAGE, factory);
        self.browsers.show_empty(EMPTY_MESSAGE, factory);
        self.oses.show_empty(EMPTY_MESSAGE, factory);
        self.devices.show_empty(EMPTY_MESSAGE, factory);
        self.logs.show_empty(EMPTY_MESSAGE, factory);
    }

    /// A granularity pick from the chart controls; refetches only the
    /// chart, and only when the selection takes effect.
    pub async fn select_granularity(
        &mut self,
        granularity: Granularity,
        client: &StatsClient,
        factory: &dyn SurfaceFactory,
    ) {
        match self.chart.handle(ChartEvent::GranularitySelected(granularity)) {
            Ok(ChartAction::Refetch) => self.refresh_chart(client, factory).await,
            Ok(ChartAction::Handled) => {}
            Err(e) => error!("Chart event failed: {}", e),
        }
    }

    /// Refetch the chart alone, under the epoch guard.
    pub async fn refresh_chart(&mut self, client: &StatsClient, factory: &dyn SurfaceFactory) {
        let Some(selection) = self.selection.clone() else {
            return;
        };
        let epoch = self.epoch;
        let result = client
            .timeseries(
                &selection.website_id,
                selection.time_range,
                self.chart.granularity(),
            )
            .await;
        if epoch != self.epoch {
            debug!(
                "Discarding stale chart response (epoch {}, live {})",
                epoch, self.epoch
            );
            return;
        }
        self.apply_timeseries(result, factory);
    }

    /// Switch the geo map mode. A mode change always re-fetches; cached
    /// data is never reused across modes.
    pub async fn set_geo_mode(
        &mut self,
        mode: GeoMode,
        client: &StatsClient,
        theme: &ThemeOverlay,
        factory: &dyn SurfaceFactory,
    ) {
        if !self.geo.set_mode(mode) {
            return;
        }
        self.refresh_geo(client, theme, factory).await;
    }

    /// Refetch location stats alone, under the epoch guard.
    pub async fn refresh_geo(
        &mut self,
        client: &StatsClient,
        theme: &ThemeOverlay,
        factory: &dyn SurfaceFactory,
    ) {
        let Some(selection) = self.selection.clone() else {
            return;
        };
        let epoch = self.epoch;
        let result = client
            .location(
                &selection.website_id,
                selection.time_range,
                self.geo.mode(),
                GEO_FETCH_LIMIT,
            )
            .await;
        if epoch != self.epoch {
            debug!(
                "Discarding stale location response (epoch {}, live {})",
                epoch, self.epoch
            );
            return;
        }
        match result {
            Ok(stats) => {
                if let Err(e) = self.geo.apply_stats(&stats, theme, factory) {
                    error!("Geo map render failed: {}", e);
                }
            }
            Err(e) => self.geo.show_error(&e, factory),
        }
    }

    /// Feed one log-browser event through its state machine; a fetch
    /// transition loads the page under the epoch guard. Validation errors
    /// surface to the caller with no fetch issued and no side effects.
    pub async fn handle_logs_event(
        &mut self,
        event: LogsEvent,
        client: &StatsClient,
        factory: &dyn SurfaceFactory,
    ) -> Result<(), LogsError> {
        let Some(selection) = self.selection.clone() else {
            return Ok(());
        };
        match self.logs.handle(event, self.prefs.as_ref())? {
            Transition::Fetch => {
                let epoch = self.epoch;
                let query = self.logs.begin_fetch();
                let result = client.logs(&selection.website_id, &query).await;
                if epoch != self.epoch {
                    debug!(
                        "Discarding stale logs response (epoch {}, live {})",
                        epoch, self.epoch
                    );
                    return Ok(());
                }
                match result {
                    Ok(page) => {
                        if let Err(e) = self.logs.apply_page(&page, factory) {
                            error!("Log table render failed: {}", e);
                        }
                    }
                    Err(e) => self.logs.show_error(&e, factory),
                }
            }
            Transition::None => {}
        }
        Ok(())
    }
}

fn apply_ranking(
    widget: &mut RankingWidget,
    result: FetchResult<RankingStats>,
    factory: &dyn SurfaceFactory,
) {
    match result {
        Ok(stats) => {
            if let Err(e) = widget.apply(&stats, factory) {
                error!("Ranking table render failed: {}", e);
            }
        }
        Err(e) => widget.show_error(&e, factory),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use reqwest::StatusCode;

    use super::*;
    use crate::client::models::Pagination;
    use crate::client::FetchError;
    use crate::prefs::MemoryPreferenceStore;
    use crate::render::text::TextSurfaceFactory;
    use crate::theme::Theme;

    fn website(id: &str) -> Website {
        Website {
            id: id.to_string(),
            name: format!("Site {id}"),
        }
    }

    fn capture() -> (TextSurfaceFactory, Arc<Mutex<Vec<u8>>>) {
        let buffer: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        let sink: Arc<Mutex<dyn Write + Send>> = buffer.clone();
        (TextSurfaceFactory::with_sink(sink), buffer)
    }

    fn rendered(buffer: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
    }

    fn dashboard(prefs: Arc<dyn PreferenceStore>, page_url: &str) -> Dashboard {
        Dashboard::new(prefs, Url::parse(page_url).unwrap(), TimeRange::Last7Days)
    }

    fn ok_snapshot(epoch: u64) -> DashboardSnapshot {
        let ranking = RankingStats {
            key: vec!["x".into()],
            uv: vec![1],
            uv_percent: vec![100.0],
            pv: None,
            pv_percent: None,
        };
        DashboardSnapshot {
            epoch,
            overall: Ok(OverallStats {
                uv: 10,
                pv: 20,
                traffic: 512,
            }),
            timeseries: Ok(TimeSeriesStats {
                labels: vec!["00:00".into()],
                visitors: vec![3],
                pageviews: vec![10],
            }),
            urls: Ok(ranking.clone()),
            referers: Ok(ranking.clone()),
            browsers: Ok(ranking.clone()),
            oses: Ok(ranking.clone()),
            devices: Ok(ranking.clone()),
            location: Ok(ranking),
            logs: Ok(LogsPage {
                logs: Vec::new(),
                pagination: Pagination {
                    total: 0,
                    page: 1,
                    page_size: 100,
                    pages: 1,
                },
            }),
        }
    }

    #[test]
    fn resolution_fallback_chain() {
        let sites = vec![website("a"), website("b")];

        assert_eq!(
            resolve_website_id(&sites, Some("b"), Some("a")),
            Some("b".to_string())
        );
        // Unregistered query id falls through to the preference.
        assert_eq!(
            resolve_website_id(&sites, Some("zzz"), Some("b")),
            Some("b".to_string())
        );
        // Unregistered preference falls through to the first entry.
        assert_eq!(
            resolve_website_id(&sites, None, Some("gone")),
            Some("a".to_string())
        );
        assert_eq!(resolve_website_id(&sites, None, None), Some("a".to_string()));
        assert_eq!(resolve_website_id(&[], Some("a"), Some("a")), None);
    }

    #[test]
    fn selection_updates_nav_prefs_and_url_synchronously() {
        let prefs = Arc::new(MemoryPreferenceStore::new());
        let mut dash = dashboard(
            prefs.clone(),
            "https://dash.example/analytics?theme=light&id=old",
        );

        dash.set_selection("site-a", TimeRange::Today);

        assert_eq!(dash.epoch(), 1);
        assert_eq!(dash.nav().logs_href, "/logs?id=site-a");
        assert_eq!(dash.nav().spiders_href, "/spiders?id=site-a");
        assert_eq!(prefs.get(PREF_SELECTED_WEBSITE).as_deref(), Some("site-a"));

        let query: Vec<(String, String)> = dash
            .page_url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(query.contains(&("theme".to_string(), "light".to_string())));
        assert!(query.contains(&("id".to_string(), "site-a".to_string())));
        assert!(!query.contains(&("id".to_string(), "old".to_string())));

        // The chart granularity coupling re-validates with the range.
        assert_eq!(dash.chart.granularity(), Granularity::Hourly);
        assert!(dash.set_time_range(TimeRange::Last30Days));
        assert_eq!(dash.epoch(), 2);
        assert_eq!(dash.chart.granularity(), Granularity::Daily);
    }

    #[test]
    fn resolve_initial_prefers_page_url_query() {
        let prefs = Arc::new(MemoryPreferenceStore::new());
        prefs.set(PREF_SELECTED_WEBSITE, "a");
        let mut dash = dashboard(prefs, "https://dash.example/analytics?id=b");

        let selection = dash
            .resolve_initial(&[website("a"), website("b")], TimeRange::Last7Days)
            .unwrap();
        assert_eq!(selection.website_id, "b");
        assert_eq!(selection.time_range, TimeRange::Last7Days);
    }

    #[test]
    fn website_change_resets_logs_page_but_range_change_does_not() {
        let prefs = Arc::new(MemoryPreferenceStore::new());
        let (factory, _buffer) = capture();
        let mut dash = dashboard(prefs, "https://dash.example/analytics");
        dash.set_selection("a", TimeRange::Last7Days);

        let page = LogsPage {
            logs: Vec::new(),
            pagination: Pagination {
                total: 500,
                page: 3,
                page_size: 100,
                pages: 5,
            },
        };
        dash.logs.apply_page(&page, &factory).unwrap();
        assert_eq!(dash.logs.state().page, 3);

        dash.set_selection("a", TimeRange::Last30Days);
        assert_eq!(dash.logs.state().page, 3);

        dash.set_selection("b", TimeRange::Last30Days);
        assert_eq!(dash.logs.state().page, 1);
    }

    #[test]
    fn stale_snapshot_is_discarded_wholesale() {
        let prefs = Arc::new(MemoryPreferenceStore::new());
        let (factory, _buffer) = capture();
        let overlay = Theme::Light.overlay();
        let mut dash = dashboard(prefs, "https://dash.example/analytics");
        dash.set_selection("a", TimeRange::Last7Days);

        let stale = ok_snapshot(dash.epoch());
        dash.set_selection("b", TimeRange::Last7Days);

        assert!(!dash.apply_snapshot(stale, &overlay, &factory));
        assert!(dash.overview.view().is_none());
        assert!(dash.chart.view().is_none());
        assert!(dash.geo.view().is_none());

        let fresh = ok_snapshot(dash.epoch());
        assert!(dash.apply_snapshot(fresh, &overlay, &factory));
        assert!(dash.overview.view().is_some());
        assert_eq!(dash.chart.view().unwrap().len(), 1);
    }

    #[test]
    fn one_widget_failure_leaves_siblings_rendered() {
        let prefs = Arc::new(MemoryPreferenceStore::new());
        let (factory, buffer) = capture();
        let overlay = Theme::Light.overlay();
        let mut dash = dashboard(prefs, "https://dash.example/analytics");
        dash.set_selection("a", TimeRange::Last7Days);

        let mut snapshot = ok_snapshot(dash.epoch());
        snapshot.referers = Err(FetchError::Status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(dash.apply_snapshot(snapshot, &overlay, &factory));

        assert!(dash.referers.view().is_none());
        assert!(dash.urls.view().is_some());
        assert!(dash.overview.view().is_some());
        assert!(rendered(&buffer).contains("Failed to load referer-ranking-table ranking"));
    }

    #[test]
    fn empty_website_list_renders_explicit_empty_state() {
        let prefs = Arc::new(MemoryPreferenceStore::new());
        let (factory, buffer) = capture();
        let mut dash = dashboard(prefs, "https://dash.example/analytics");

        assert!(dash.resolve_initial(&[], TimeRange::Today).is_none());
        dash.show_empty_all(&factory);

        let text = rendered(&buffer);
        assert!(text.contains("(No websites registered)"));
        for container in [
            "overview",
            "visits-chart",
            "geo-map",
            "url-ranking-table",
            "logs-table",
        ] {
            assert!(text.contains(container), "missing section for {container}");
        }
    }
}

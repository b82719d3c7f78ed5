//! Geographic distribution engine
//!
//! Transforms location stats into a choropleth dataset plus a top-10
//! ranking table that is always a prefix of the map data. Two modes:
//! `domestic` renders administrative subdivisions of one country,
//! `global` renders the world map with localized region names. Switching
//! modes re-fetches; theme changes overlay the live map without touching
//! data.

pub mod names;

use serde::Serialize;
use tracing::error;

use crate::client::models::{GeoMode, RankingStats};
use crate::client::FetchError;
use crate::ranking::{RankingRow, RankingTableView};
use crate::render::{RenderPayload, SurfaceFactory, SurfaceSlot};
use crate::theme::ThemeOverlay;

pub use names::localized_name;

/// Server-side placeholder for traffic outside the domestic country
pub const FOREIGN_PLACEHOLDER: &str = "国外";

/// Server-side placeholder for unresolvable locations
pub const UNKNOWN_PLACEHOLDER: &str = "未知";

/// Location fetches use a high limit to get effectively all entries
pub const GEO_FETCH_LIMIT: u32 = 99;

/// The ranking table shows the top slice of the map dataset
pub const GEO_RANKING_TOP_N: usize = 10;

/// Color-scale minimum sits below zero so regions with zero visits are
/// visually distinct from regions with no data at all
pub const SCALE_MIN: i64 = -5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoDatum {
    pub name: String,
    pub value: u64,
    pub percentage: f64,
}

/// Zip the parallel location arrays into map entries, dropping the
/// foreign/unknown placeholders that have no region on either map.
pub fn build_geo_data(stats: &RankingStats) -> Vec<GeoDatum> {
    stats
        .key
        .iter()
        .enumerate()
        .filter(|(_, name)| {
            name.as_str() != FOREIGN_PLACEHOLDER && name.as_str() != UNKNOWN_PLACEHOLDER
        })
        .map(|(i, name)| GeoDatum {
            name: name.clone(),
            value: stats.uv.get(i).copied().unwrap_or(0),
            percentage: stats.uv_percent.get(i).copied().unwrap_or(0.0),
        })
        .collect()
}

/// Renderable choropleth dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethView {
    pub mode: GeoMode,
    pub data: Vec<GeoDatum>,
    pub scale_min: i64,
    pub scale_max: u64,
}

impl ChoroplethView {
    /// Build the view for one mode. World-map names are localized here,
    /// so the ranking slice below shows the same labels as the map.
    ///
    /// The payload arrives sorted by value descending (a documented
    /// server contract the ranking order relies on), but the color-scale
    /// maximum is recomputed rather than read from the first entry so an
    /// unsorted payload cannot mis-scale the map.
    pub fn build(mode: GeoMode, stats: &RankingStats) -> Self {
        let mut data = build_geo_data(stats);
        if mode == GeoMode::Global {
            for datum in &mut data {
                let localized = localized_name(&datum.name);
                if localized != datum.name {
                    datum.name = localized.to_string();
                }
            }
        }

        let scale_max = data.iter().map(|d| d.value).max().unwrap_or(10);

        Self {
            mode,
            data,
            scale_min: SCALE_MIN,
            scale_max,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The top slice of the map dataset, in map order, as a primary-only
    /// ranking table.
    pub fn ranking_view(&self) -> RankingTableView {
        RankingTableView {
            rows: self
                .data
                .iter()
                .take(GEO_RANKING_TOP_N)
                .map(|datum| RankingRow {
                    key: datum.name.clone(),
                    uv: datum.value,
                    uv_percent: datum.percentage,
                    pv: None,
                    pv_percent: None,
                })
                .collect(),
            show_secondary: false,
        }
    }

    /// Tooltip line for one region
    pub fn tooltip_line(&self, index: usize) -> Option<String> {
        let datum = self.data.get(index)?;
        Some(format!(
            "{}: {} visitors",
            datum.name,
            crate::render::group_thousands(datum.value)
        ))
    }
}

/// The geo widget: mode toggle state, the live map surface, and the
/// companion ranking-table surface fed from the same dataset.
pub struct GeoWidget {
    mode: GeoMode,
    map_slot: SurfaceSlot,
    table_slot: SurfaceSlot,
    view: Option<ChoroplethView>,
}

impl Default for GeoWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoWidget {
    pub fn new() -> Self {
        Self {
            mode: GeoMode::Domestic,
            map_slot: SurfaceSlot::new("geo-map"),
            table_slot: SurfaceSlot::new("geo-ranking-table"),
            view: None,
        }
    }

    pub fn mode(&self) -> GeoMode {
        self.mode
    }

    pub fn view(&self) -> Option<&ChoroplethView> {
        self.view.as_ref()
    }

    /// Switch modes. Returns true when the mode changed, in which case
    /// the caller must re-fetch; cached data is never reused across modes.
    pub fn set_mode(&mut self, mode: GeoMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        true
    }

    /// Render a fetched location payload into the map and the derived
    /// top-10 table, then re-assert the current theme on the map.
    pub fn apply_stats(
        &mut self,
        stats: &RankingStats,
        overlay: &ThemeOverlay,
        factory: &dyn SurfaceFactory,
    ) -> anyhow::Result<()> {
        let view = ChoroplethView::build(self.mode, stats);

        let map = self.map_slot.acquire(factory)?;
        if view.is_empty() {
            map.render(RenderPayload::EmptyState("No location data"))?;
        } else {
            map.render(RenderPayload::Choropleth(&view))?;
            map.apply_theme(overlay)?;
        }

        let ranking = view.ranking_view();
        let table = self.table_slot.acquire(factory)?;
        table.render(RenderPayload::RankingTable(&ranking))?;

        self.view = Some(view);
        Ok(())
    }

    /// Merge a theme overlay into the live map instance. Pure visual
    /// update: no fetch, the current dataset is untouched.
    pub fn apply_theme(&mut self, overlay: &ThemeOverlay) -> anyhow::Result<()> {
        if let Some(map) = self.map_slot.live() {
            map.apply_theme(overlay)?;
        }
        Ok(())
    }

    pub fn show_error(&mut self, err: &FetchError, factory: &dyn SurfaceFactory) {
        error!("Location fetch failed: {}", err);
        self.view = None;
        let message = "Failed to load location stats";
        self.render_placeholder(RenderPayload::ErrorMessage(message), factory);
    }

    pub fn show_empty(&mut self, message: &str, factory: &dyn SurfaceFactory) {
        self.view = None;
        self.render_placeholder(RenderPayload::EmptyState(message), factory);
    }

    fn render_placeholder(&mut self, payload: RenderPayload<'_>, factory: &dyn SurfaceFactory) {
        let outcome = self
            .map_slot
            .acquire(factory)
            .and_then(|map| map.render(payload));
        if let Err(e) = outcome {
            error!("Geo map placeholder render failed: {}", e);
        }

        let empty = RankingTableView {
            rows: Vec::new(),
            show_secondary: false,
        };
        let outcome = self
            .table_slot
            .acquire(factory)
            .and_then(|table| table.render(RenderPayload::RankingTable(&empty)));
        if let Err(e) = outcome {
            error!("Geo ranking placeholder render failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location_stats(entries: &[(&str, u64, f64)]) -> RankingStats {
        RankingStats {
            key: entries.iter().map(|(k, _, _)| k.to_string()).collect(),
            uv: entries.iter().map(|(_, v, _)| *v).collect(),
            uv_percent: entries.iter().map(|(_, _, p)| *p).collect(),
            pv: None,
            pv_percent: None,
        }
    }

    #[test]
    fn placeholders_are_filtered() {
        let stats = location_stats(&[
            ("广东省", 50, 42.0),
            ("国外", 30, 25.0),
            ("北京市", 20, 17.0),
            ("未知", 19, 16.0),
        ]);
        let data = build_geo_data(&stats);
        assert_eq!(data.len(), 2);
        assert!(data.iter().all(|d| d.name != "国外" && d.name != "未知"));
        assert_eq!(data[0].name, "广东省");
        assert_eq!(data[1].name, "北京市");
    }

    #[test]
    fn world_names_localize_with_passthrough() {
        let stats = location_stats(&[("United States", 9, 60.0), ("Atlantis", 6, 40.0)]);
        let view = ChoroplethView::build(GeoMode::Global, &stats);
        assert_eq!(view.data[0].name, "美国");
        assert_eq!(view.data[1].name, "Atlantis");
    }

    #[test]
    fn domestic_names_stay_raw() {
        let stats = location_stats(&[("广东省", 9, 60.0)]);
        let view = ChoroplethView::build(GeoMode::Domestic, &stats);
        assert_eq!(view.data[0].name, "广东省");
    }

    #[test]
    fn scale_max_survives_unsorted_payloads() {
        let stats = location_stats(&[("a", 5, 10.0), ("b", 90, 80.0), ("c", 12, 10.0)]);
        let view = ChoroplethView::build(GeoMode::Domestic, &stats);
        assert_eq!(view.scale_max, 90);
        assert_eq!(view.scale_min, SCALE_MIN);
    }

    #[test]
    fn ranking_is_a_prefix_of_the_map_data() {
        let entries: Vec<(String, u64, f64)> = (0..15)
            .map(|i| (format!("region-{i}"), 100 - i as u64, 5.0))
            .collect();
        let stats = RankingStats {
            key: entries.iter().map(|(k, _, _)| k.clone()).collect(),
            uv: entries.iter().map(|(_, v, _)| *v).collect(),
            uv_percent: entries.iter().map(|(_, _, p)| *p).collect(),
            pv: None,
            pv_percent: None,
        };
        let view = ChoroplethView::build(GeoMode::Domestic, &stats);
        let ranking = view.ranking_view();

        assert_eq!(ranking.rows.len(), GEO_RANKING_TOP_N);
        for (row, datum) in ranking.rows.iter().zip(&view.data) {
            assert_eq!(row.key, datum.name);
            assert_eq!(row.uv, datum.value);
        }
    }

    #[test]
    fn tooltip_shows_grouped_visitor_counts() {
        let stats = location_stats(&[("广东省", 12845, 80.0)]);
        let view = ChoroplethView::build(GeoMode::Domestic, &stats);
        assert_eq!(view.tooltip_line(0).unwrap(), "广东省: 12,845 visitors");
        assert_eq!(view.tooltip_line(5), None);
    }

    #[test]
    fn mode_switch_reports_change() {
        let mut widget = GeoWidget::new();
        assert!(!widget.set_mode(GeoMode::Domestic));
        assert!(widget.set_mode(GeoMode::Global));
        assert_eq!(widget.mode(), GeoMode::Global);
    }
}

//! Generic top-N ranking tables
//!
//! One transform covers referer, browser, OS, device, and URL rankings
//! (URL additionally shows pageviews next to uniques) plus the geo top-10.
//! The transform is a pure function of the payload; bar widths are clamped
//! at render time so out-of-range upstream percentages cannot break the
//! layout.

use serde::Serialize;
use tracing::error;

use crate::client::models::RankingStats;
use crate::client::FetchError;
use crate::render::{RenderPayload, SurfaceFactory, SurfaceSlot};

/// One rendered ranking row. Percentages are kept as received; clamping
/// happens in the width accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    pub key: String,
    pub uv: u64,
    pub uv_percent: f64,
    pub pv: Option<u64>,
    pub pv_percent: Option<f64>,
}

impl RankingRow {
    /// Bar fill width for the uniques column, clamped to the display range
    pub fn primary_bar_width(&self) -> f64 {
        clamp_percent(self.uv_percent)
    }

    /// Bar fill width for the pageviews column, when present
    pub fn secondary_bar_width(&self) -> Option<f64> {
        self.pv_percent.map(clamp_percent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingTableView {
    pub rows: Vec<RankingRow>,
    /// Whether the pageview column is rendered alongside uniques
    pub show_secondary: bool,
}

impl RankingTableView {
    /// An empty payload renders a single "no data" placeholder row, never
    /// an empty table body.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Clamp a percentage to `[0, 100]`. Non-finite values collapse to 0.
pub fn clamp_percent(p: f64) -> f64 {
    if !p.is_finite() {
        return 0.0;
    }
    p.clamp(0.0, 100.0)
}

/// Normalize a ranking payload into the generic bar-table model.
///
/// Row count equals `key.len()`; missing entries in the parallel arrays
/// default to zero, and absent secondary arrays degrade to primary-only
/// rows even when `show_secondary` was requested.
pub fn render_top_n(payload: &RankingStats, show_secondary: bool) -> RankingTableView {
    let pv = payload.pv.as_deref().filter(|_| show_secondary);
    let pv_percent = payload.pv_percent.as_deref().filter(|_| show_secondary);

    let rows = payload
        .key
        .iter()
        .enumerate()
        .map(|(i, key)| RankingRow {
            key: key.clone(),
            uv: payload.uv.get(i).copied().unwrap_or(0),
            uv_percent: payload.uv_percent.get(i).copied().unwrap_or(0.0),
            pv: pv.map(|pv| pv.get(i).copied().unwrap_or(0)),
            pv_percent: pv_percent.map(|pp| pp.get(i).copied().unwrap_or(0.0)),
        })
        .collect();

    RankingTableView {
        rows,
        show_secondary: show_secondary && pv.is_some(),
    }
}

/// A ranking table widget owning its surface
pub struct RankingWidget {
    label: &'static str,
    show_secondary: bool,
    slot: SurfaceSlot,
    view: Option<RankingTableView>,
}

impl RankingWidget {
    pub fn new(container: &'static str, show_secondary: bool) -> Self {
        Self {
            label: container,
            show_secondary,
            slot: SurfaceSlot::new(container),
            view: None,
        }
    }

    pub fn view(&self) -> Option<&RankingTableView> {
        self.view.as_ref()
    }

    /// Render a fetched payload
    pub fn apply(
        &mut self,
        payload: &RankingStats,
        factory: &dyn SurfaceFactory,
    ) -> anyhow::Result<()> {
        let view = render_top_n(payload, self.show_secondary);
        let surface = self.slot.acquire(factory)?;
        surface.render(RenderPayload::RankingTable(&view))?;
        self.view = Some(view);
        Ok(())
    }

    /// Replace the table content with a failure placeholder
    pub fn show_error(&mut self, err: &FetchError, factory: &dyn SurfaceFactory) {
        error!("{} ranking fetch failed: {}", self.label, err);
        self.view = None;
        let message = format!("Failed to load {} ranking", self.label);
        self.render_placeholder(RenderPayload::ErrorMessage(&message), factory);
    }

    /// Explicit empty state when no website is selectable
    pub fn show_empty(&mut self, message: &str, factory: &dyn SurfaceFactory) {
        self.view = None;
        self.render_placeholder(RenderPayload::EmptyState(message), factory);
    }

    fn render_placeholder(&mut self, payload: RenderPayload<'_>, factory: &dyn SurfaceFactory) {
        match self.slot.acquire(factory) {
            Ok(surface) => {
                if let Err(e) = surface.render(payload) {
                    error!("{} ranking placeholder render failed: {}", self.label, e);
                }
            }
            Err(e) => error!("{} ranking surface unavailable: {}", self.label, e),
        }
    }
}

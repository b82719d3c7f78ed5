//! Time-series chart engine
//!
//! Builds a stacked two-series view from the visitors/pageviews payload.
//! The pageview series is plotted as `pageviews - visitors` so the stack
//! totals to pageviews; hiding the visitors series swaps the plotted
//! array to the full pageview counts and showing it again swaps back.
//! Tooltips always read from the original arrays, whichever array is
//! currently plotted.

use thiserror::Error;
use tracing::{debug, error};

use crate::client::models::{Granularity, TimeRange, TimeSeriesStats};
use crate::render::{RenderPayload, SurfaceFactory, SurfaceSlot};

#[derive(Debug, Error)]
pub enum ChartDataError {
    #[error("empty time-series payload")]
    Empty,

    #[error(
        "series length mismatch: {labels} labels, {visitors} visitors, {pageviews} pageviews"
    )]
    LengthMismatch {
        labels: usize,
        visitors: usize,
        pageviews: usize,
    },
}

/// Validated time-series data with the derived stacked component.
///
/// `pv_minus_uv` is always recomputed from the two fetched series, never
/// fetched itself; upstream guarantees `pageviews >= visitors` per bucket
/// and a violating payload saturates at zero.
#[derive(Debug, Clone)]
pub struct TimeSeriesDataset {
    pub labels: Vec<String>,
    pub visitors: Vec<u64>,
    pub pageviews: Vec<u64>,
    pub pv_minus_uv: Vec<u64>,
}

impl TryFrom<TimeSeriesStats> for TimeSeriesDataset {
    type Error = ChartDataError;

    fn try_from(stats: TimeSeriesStats) -> Result<Self, Self::Error> {
        if stats.labels.is_empty() {
            return Err(ChartDataError::Empty);
        }
        if stats.labels.len() != stats.visitors.len()
            || stats.labels.len() != stats.pageviews.len()
        {
            return Err(ChartDataError::LengthMismatch {
                labels: stats.labels.len(),
                visitors: stats.visitors.len(),
                pageviews: stats.pageviews.len(),
            });
        }

        let pv_minus_uv = stats
            .pageviews
            .iter()
            .zip(&stats.visitors)
            .map(|(pv, uv)| pv.saturating_sub(*uv))
            .collect();

        Ok(Self {
            labels: stats.labels,
            visitors: stats.visitors,
            pageviews: stats.pageviews,
            pv_minus_uv,
        })
    }
}

/// The two plotted series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Visitors,
    Pageviews,
}

/// Legend visibility; the visitors flag determines which array the
/// pageview series plots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegendState {
    pub visitors_hidden: bool,
    pub pageviews_hidden: bool,
}

impl LegendState {
    pub fn toggle(&mut self, series: SeriesKind) {
        match series {
            SeriesKind::Visitors => self.visitors_hidden = !self.visitors_hidden,
            SeriesKind::Pageviews => self.pageviews_hidden = !self.pageviews_hidden,
        }
    }
}

/// Granularity selector state, re-validated on every range change.
///
/// Single-day ranges permit only hourly buckets; multi-day ranges default
/// to daily but leave hourly selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GranularityControls {
    pub selected: Granularity,
    pub daily_enabled: bool,
}

impl GranularityControls {
    pub fn for_range(range: TimeRange) -> Self {
        if range.is_single_day() {
            Self {
                selected: Granularity::Hourly,
                daily_enabled: false,
            }
        } else {
            Self {
                selected: Granularity::Daily,
                daily_enabled: true,
            }
        }
    }

    pub fn revalidate(&mut self, range: TimeRange) {
        *self = Self::for_range(range);
    }

    /// Apply a user selection. Returns false when the control for the
    /// requested granularity is disabled.
    pub fn select(&mut self, granularity: Granularity) -> bool {
        if granularity == Granularity::Daily && !self.daily_enabled {
            return false;
        }
        self.selected = granularity;
        true
    }
}

/// Renderable chart state: the validated dataset plus legend visibility
#[derive(Debug, Clone)]
pub struct TimeSeriesView {
    dataset: TimeSeriesDataset,
    legend: LegendState,
}

impl TimeSeriesView {
    pub fn new(dataset: TimeSeriesDataset) -> Self {
        Self {
            dataset,
            legend: LegendState::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.dataset.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.labels.is_empty()
    }

    pub fn legend(&self) -> LegendState {
        self.legend
    }

    pub fn toggle_legend(&mut self, series: SeriesKind) {
        self.legend.toggle(series);
    }

    pub fn dataset(&self) -> &TimeSeriesDataset {
        &self.dataset
    }

    /// The array the pageview series currently plots: the subtracted
    /// component while visitors are stacked below it, the full counts
    /// while the visitors series is hidden.
    pub fn plotted_pageviews(&self) -> &[u64] {
        if self.legend.visitors_hidden {
            &self.dataset.pageviews
        } else {
            &self.dataset.pv_minus_uv
        }
    }

    pub fn plotted_visitors(&self) -> &[u64] {
        &self.dataset.visitors
    }

    /// Category axis label: within a contiguous run of identical labels
    /// only the first is drawn, later repeats render empty.
    pub fn axis_label(&self, index: usize) -> &str {
        let labels = &self.dataset.labels;
        match labels.get(index) {
            Some(label) if index > 0 && labels[index - 1] == *label => "",
            Some(label) => label,
            None => "",
        }
    }

    /// Tooltip line for one bucket, always built from the original
    /// full-value arrays.
    pub fn tooltip_line(&self, series: SeriesKind, index: usize) -> Option<String> {
        let label = self.dataset.labels.get(index)?;
        Some(match series {
            SeriesKind::Visitors => {
                format!("{label} - Visitors (UV): {}", self.dataset.visitors.get(index)?)
            }
            SeriesKind::Pageviews => {
                format!("{label} - Pageviews (PV): {}", self.dataset.pageviews.get(index)?)
            }
        })
    }
}

/// Chart interactions delivered by the host environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartEvent {
    RangeChanged(TimeRange),
    GranularitySelected(Granularity),
    LegendToggled(SeriesKind),
}

/// What the controller must do after a chart event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartAction {
    /// The selected series changed; fetch and re-render
    Refetch,
    /// Handled locally, no fetch needed
    Handled,
}

/// The chart widget: granularity controls, current view, and the owned
/// surface instance. A fresh dataset replaces the surface outright (the
/// prior instance is destroyed first) and resets legend visibility.
pub struct ChartWidget {
    slot: SurfaceSlot,
    controls: GranularityControls,
    view: Option<TimeSeriesView>,
}

impl ChartWidget {
    pub fn new(range: TimeRange) -> Self {
        Self {
            slot: SurfaceSlot::new("visits-chart"),
            controls: GranularityControls::for_range(range),
            view: None,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.controls.selected
    }

    pub fn controls(&self) -> GranularityControls {
        self.controls
    }

    pub fn view(&self) -> Option<&TimeSeriesView> {
        self.view.as_ref()
    }

    /// Re-validate the granularity controls against a new range. Runs on
    /// every range change, not only the first.
    pub fn revalidate_range(&mut self, range: TimeRange) {
        self.controls.revalidate(range);
    }

    pub fn handle(&mut self, event: ChartEvent) -> anyhow::Result<ChartAction> {
        match event {
            ChartEvent::RangeChanged(range) => {
                self.revalidate_range(range);
                Ok(ChartAction::Refetch)
            }
            ChartEvent::GranularitySelected(granularity) => {
                if self.controls.selected == granularity {
                    return Ok(ChartAction::Handled);
                }
                if self.controls.select(granularity) {
                    Ok(ChartAction::Refetch)
                } else {
                    debug!("Ignoring selection of disabled granularity {}", granularity);
                    Ok(ChartAction::Handled)
                }
            }
            ChartEvent::LegendToggled(series) => {
                if let Some(view) = self.view.as_mut() {
                    view.toggle_legend(series);
                    if let Some(surface) = self.slot.live() {
                        surface.render(RenderPayload::TimeSeries(view))?;
                    }
                }
                Ok(ChartAction::Handled)
            }
        }
    }

    /// Validate and render a fetched payload. The prior chart instance is
    /// destroyed before the replacement renders; legend visibility resets
    /// with the new instance.
    pub fn apply_stats(
        &mut self,
        stats: TimeSeriesStats,
        factory: &dyn SurfaceFactory,
    ) -> anyhow::Result<()> {
        let dataset = TimeSeriesDataset::try_from(stats)?;
        let view = TimeSeriesView::new(dataset);

        let surface = self.slot.replace(factory)?;
        surface.render(RenderPayload::TimeSeries(&view))?;
        self.view = Some(view);
        Ok(())
    }

    /// Show an error placeholder in place of the chart, releasing the
    /// prior instance first so no stale canvas leaks.
    pub fn show_error(&mut self, message: &str, factory: &dyn SurfaceFactory) {
        self.view = None;
        self.slot.release();
        match self.slot.acquire(factory) {
            Ok(surface) => {
                if let Err(e) = surface.render(RenderPayload::ErrorMessage(message)) {
                    error!("Chart error placeholder render failed: {}", e);
                }
            }
            Err(e) => error!("Chart surface unavailable: {}", e),
        }
    }

    pub fn show_empty(&mut self, message: &str, factory: &dyn SurfaceFactory) {
        self.view = None;
        self.slot.release();
        match self.slot.acquire(factory) {
            Ok(surface) => {
                if let Err(e) = surface.render(RenderPayload::EmptyState(message)) {
                    error!("Chart empty-state render failed: {}", e);
                }
            }
            Err(e) => error!("Chart surface unavailable: {}", e),
        }
    }
}

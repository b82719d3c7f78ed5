//! Overall UV/PV/traffic summary card

use serde::Serialize;
use tracing::error;

use crate::client::models::OverallStats;
use crate::client::FetchError;
use crate::render::{format_traffic, group_thousands, RenderPayload, SurfaceFactory, SurfaceSlot};

/// Display-ready totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverviewView {
    pub uv: String,
    pub pv: String,
    pub traffic: String,
}

impl OverviewView {
    pub fn from_stats(stats: &OverallStats) -> Self {
        Self {
            uv: group_thousands(stats.uv),
            pv: group_thousands(stats.pv),
            traffic: format_traffic(stats.traffic),
        }
    }
}

pub struct OverviewWidget {
    slot: SurfaceSlot,
    view: Option<OverviewView>,
}

impl Default for OverviewWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl OverviewWidget {
    pub fn new() -> Self {
        Self {
            slot: SurfaceSlot::new("overview"),
            view: None,
        }
    }

    pub fn view(&self) -> Option<&OverviewView> {
        self.view.as_ref()
    }

    pub fn apply(
        &mut self,
        stats: &OverallStats,
        factory: &dyn SurfaceFactory,
    ) -> anyhow::Result<()> {
        let view = OverviewView::from_stats(stats);
        let surface = self.slot.acquire(factory)?;
        surface.render(RenderPayload::Overview(&view))?;
        self.view = Some(view);
        Ok(())
    }

    pub fn show_error(&mut self, err: &FetchError, factory: &dyn SurfaceFactory) {
        error!("Overall stats fetch failed: {}", err);
        self.view = None;
        self.render_placeholder(
            RenderPayload::ErrorMessage("Failed to load overall stats"),
            factory,
        );
    }

    pub fn show_empty(&mut self, message: &str, factory: &dyn SurfaceFactory) {
        self.view = None;
        self.render_placeholder(RenderPayload::EmptyState(message), factory);
    }

    fn render_placeholder(&mut self, payload: RenderPayload<'_>, factory: &dyn SurfaceFactory) {
        match self.slot.acquire(factory) {
            Ok(surface) => {
                if let Err(e) = surface.render(payload) {
                    error!("Overview placeholder render failed: {}", e);
                }
            }
            Err(e) => error!("Overview surface unavailable: {}", e),
        }
    }
}

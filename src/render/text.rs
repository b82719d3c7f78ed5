//! Terminal rendering backend
//!
//! Renders widget views as plain text. This is the surface implementation
//! the CLI binary plugs into the dashboard; a browser host would supply
//! its own implementation bridging to a real chart library.

use std::io::Write;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing::debug;

use crate::chart::{SeriesKind, TimeSeriesView};
use crate::geo::ChoroplethView;
use crate::logs::{LogTableView, StatusClass};
use crate::overview::OverviewView;
use crate::ranking::RankingTableView;
use crate::theme::ThemeOverlay;

use super::{RenderPayload, Surface, SurfaceFactory};

/// Bar width in characters for a 100% ranking row
const BAR_CELLS: usize = 20;

fn bar(width_percent: f64) -> String {
    let filled = ((width_percent / 100.0) * BAR_CELLS as f64).round() as usize;
    let filled = filled.min(BAR_CELLS);
    format!("{}{}", "█".repeat(filled), "·".repeat(BAR_CELLS - filled))
}

fn status_tag(class: StatusClass) -> &'static str {
    match class {
        StatusClass::Success => "ok",
        StatusClass::Warning => "warn",
        StatusClass::Error => "err",
    }
}

/// A text surface bound to a named container, writing to a shared sink
pub struct TextSurface {
    container: String,
    out: Arc<Mutex<dyn Write + Send>>,
}

impl TextSurface {
    fn section(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "\n── {} ──", self.container)
    }

    fn render_to(&self, out: &mut dyn Write, payload: RenderPayload<'_>) -> std::io::Result<()> {
        self.section(out)?;
        match payload {
            RenderPayload::TimeSeries(view) => render_timeseries(out, view),
            RenderPayload::Choropleth(view) => render_choropleth(out, view),
            RenderPayload::RankingTable(view) => render_ranking(out, view),
            RenderPayload::LogTable(view) => render_logs(out, view),
            RenderPayload::Overview(view) => render_overview(out, view),
            RenderPayload::EmptyState(message) => writeln!(out, "({message})"),
            RenderPayload::ErrorMessage(message) => writeln!(out, "!! {message}"),
        }
    }
}

fn render_timeseries(out: &mut dyn Write, view: &TimeSeriesView) -> std::io::Result<()> {
    let legend = view.legend();
    for i in 0..view.len() {
        let label = view.axis_label(i);
        write!(out, "{label:>8} ")?;
        if !legend.visitors_hidden {
            write!(out, " uv={:<6}", view.plotted_visitors()[i])?;
        }
        if !legend.pageviews_hidden {
            write!(out, " pv+={:<6}", view.plotted_pageviews()[i])?;
        }
        if let Some(tip) = view.tooltip_line(SeriesKind::Pageviews, i) {
            write!(out, " [{tip}]")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn render_choropleth(out: &mut dyn Write, view: &ChoroplethView) -> std::io::Result<()> {
    writeln!(
        out,
        "choropleth ({}) scale [{}, {}]",
        view.mode, view.scale_min, view.scale_max
    )?;
    for datum in &view.data {
        writeln!(out, "  {:<28} {:>8} ({:.1}%)", datum.name, datum.value, datum.percentage)?;
    }
    Ok(())
}

fn render_ranking(out: &mut dyn Write, view: &RankingTableView) -> std::io::Result<()> {
    if view.is_empty() {
        return writeln!(out, "(no data)");
    }
    for row in &view.rows {
        write!(
            out,
            "  {:<32} {} {:>8} ({:.1}%)",
            row.key,
            bar(row.primary_bar_width()),
            row.uv,
            row.primary_bar_width()
        )?;
        if view.show_secondary {
            if let (Some(pv), Some(width)) = (row.pv, row.secondary_bar_width()) {
                write!(out, "  {} {:>8} ({:.1}%)", bar(width), pv, width)?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn render_logs(out: &mut dyn Write, view: &LogTableView) -> std::io::Result<()> {
    writeln!(out, "page {}/{}", view.page, view.total_pages)?;
    if view.rows.is_empty() {
        return writeln!(out, "(no logs found)");
    }
    for row in &view.rows {
        writeln!(
            out,
            "  {} | {:<15} | {:<18} | {:<40} | {} [{}] | {:>10} | {} | {} | {} | {} | {}",
            row.time,
            row.ip,
            row.location,
            row.request,
            row.status_code,
            status_tag(row.status_class),
            row.traffic,
            row.referer,
            row.browser,
            row.os,
            row.device,
            if row.pageview { "✓" } else { "-" },
        )?;
    }
    Ok(())
}

fn render_overview(out: &mut dyn Write, view: &OverviewView) -> std::io::Result<()> {
    writeln!(out, "visitors: {}", view.uv)?;
    writeln!(out, "pageviews: {}", view.pv)?;
    writeln!(out, "traffic: {}", view.traffic)
}

impl Surface for TextSurface {
    fn render(&mut self, payload: RenderPayload<'_>) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| anyhow::anyhow!("text surface sink poisoned"))?;
        self.render_to(&mut *out, payload)
            .with_context(|| format!("failed to write widget '{}'", self.container))
    }

    fn apply_theme(&mut self, overlay: &ThemeOverlay) -> Result<()> {
        // Terminal output has no color scale to restyle.
        debug!(
            "theme overlay {} → {} on '{}'",
            overlay.low_color, overlay.high_color, self.container
        );
        Ok(())
    }

    fn destroy(&mut self) {
        debug!("destroying text surface '{}'", self.container);
    }
}

/// Factory producing text surfaces over one shared sink
pub struct TextSurfaceFactory {
    out: Arc<Mutex<dyn Write + Send>>,
}

impl TextSurfaceFactory {
    pub fn stdout() -> Self {
        Self {
            out: Arc::new(Mutex::new(std::io::stdout())),
        }
    }

    pub fn with_sink(out: Arc<Mutex<dyn Write + Send>>) -> Self {
        Self { out }
    }
}

impl SurfaceFactory for TextSurfaceFactory {
    fn create(&self, container: &str) -> Result<Box<dyn Surface>> {
        Ok(Box::new(TextSurface {
            container: container.to_string(),
            out: Arc::clone(&self.out),
        }))
    }
}

//! Seam to the host rendering layer
//!
//! The real dashboard hands datasets to an external chart/map library that
//! exposes set-dataset / set-option / destroy primitives. [`Surface`] is
//! that library's narrow interface; [`SurfaceFactory`] creates instances
//! bound to a named container. Widgets never hold a surface outside a
//! [`SurfaceSlot`], which enforces the one-live-instance rule: a prior
//! instance is always destroyed before a replacement is created.

pub mod text;

use anyhow::Result;

use crate::chart::TimeSeriesView;
use crate::geo::ChoroplethView;
use crate::logs::LogTableView;
use crate::overview::OverviewView;
use crate::ranking::RankingTableView;
use crate::theme::ThemeOverlay;

/// One renderable widget state, borrowed from the owning widget
#[derive(Clone, Copy)]
pub enum RenderPayload<'a> {
    TimeSeries(&'a TimeSeriesView),
    Choropleth(&'a ChoroplethView),
    RankingTable(&'a RankingTableView),
    LogTable(&'a LogTableView),
    Overview(&'a OverviewView),
    /// Explicit "nothing to show" state, e.g. no registered websites
    EmptyState(&'a str),
    /// Human-readable failure placeholder replacing the widget content
    ErrorMessage(&'a str),
}

pub trait Surface: Send {
    /// Replace the surface content with the given payload
    fn render(&mut self, payload: RenderPayload<'_>) -> Result<()>;

    /// Merge a visual theme overlay into the live instance without
    /// touching its dataset
    fn apply_theme(&mut self, overlay: &ThemeOverlay) -> Result<()>;

    /// Release rendering resources. The surface must not be used after.
    fn destroy(&mut self);
}

pub trait SurfaceFactory: Send + Sync {
    fn create(&self, container: &str) -> Result<Box<dyn Surface>>;
}

/// Holder for a widget's single live surface
pub struct SurfaceSlot {
    container: String,
    surface: Option<Box<dyn Surface>>,
}

impl SurfaceSlot {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            surface: None,
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    /// Get the live surface, creating one if none exists
    pub fn acquire(&mut self, factory: &dyn SurfaceFactory) -> Result<&mut dyn Surface> {
        let surface = match &mut self.surface {
            Some(surface) => surface,
            slot => slot.insert(factory.create(&self.container)?),
        };
        Ok(surface.as_mut())
    }

    /// Destroy any prior instance, then create a fresh one
    pub fn replace(&mut self, factory: &dyn SurfaceFactory) -> Result<&mut dyn Surface> {
        self.release();
        self.acquire(factory)
    }

    /// Destroy and drop the live instance, if any
    pub fn release(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.destroy();
        }
    }

    /// The live surface, if one exists
    pub fn live(&mut self) -> Option<&mut (dyn Surface + '_)> {
        match &mut self.surface {
            Some(surface) => Some(surface.as_mut()),
            None => None,
        }
    }

    pub fn is_live(&self) -> bool {
        self.surface.is_some()
    }
}

impl Drop for SurfaceSlot {
    fn drop(&mut self) {
        self.release();
    }
}

/// Format a byte count the way the dashboard displays traffic: binary
/// units with two decimals, B through TB.
pub fn format_traffic(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    const GB: f64 = 1024.0 * 1024.0 * 1024.0;
    const TB: f64 = 1024.0 * 1024.0 * 1024.0 * 1024.0;

    let bytes = bytes as f64;
    if bytes < KB {
        format!("{bytes:.2} B")
    } else if bytes < MB {
        format!("{:.2} KB", bytes / KB)
    } else if bytes < GB {
        format!("{:.2} MB", bytes / MB)
    } else if bytes < TB {
        format!("{:.2} GB", bytes / GB)
    } else {
        format!("{:.2} TB", bytes / TB)
    }
}

/// Thousands-grouped integer display, `12345` → `"12,345"`
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    struct ProbeSurface {
        live: Arc<AtomicUsize>,
    }

    impl Surface for ProbeSurface {
        fn render(&mut self, _payload: RenderPayload<'_>) -> Result<()> {
            Ok(())
        }

        fn apply_theme(&mut self, _overlay: &ThemeOverlay) -> Result<()> {
            Ok(())
        }

        fn destroy(&mut self) {
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    struct ProbeFactory {
        live: Arc<AtomicUsize>,
        created: Arc<AtomicUsize>,
    }

    impl ProbeFactory {
        fn new() -> Self {
            Self {
                live: Arc::new(AtomicUsize::new(0)),
                created: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl SurfaceFactory for ProbeFactory {
        fn create(&self, _container: &str) -> Result<Box<dyn Surface>> {
            self.live.fetch_add(1, Ordering::SeqCst);
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(ProbeSurface {
                live: Arc::clone(&self.live),
            }))
        }
    }

    #[test]
    fn slot_keeps_exactly_one_live_instance() {
        let factory = ProbeFactory::new();
        let mut slot = SurfaceSlot::new("visits-chart");
        assert!(!slot.is_live());

        slot.acquire(&factory).unwrap();
        slot.acquire(&factory).unwrap();
        assert_eq!(factory.created.load(Ordering::SeqCst), 1);
        assert_eq!(factory.live.load(Ordering::SeqCst), 1);

        // Replacing destroys the prior instance before creating the next.
        slot.replace(&factory).unwrap();
        assert_eq!(factory.created.load(Ordering::SeqCst), 2);
        assert_eq!(factory.live.load(Ordering::SeqCst), 1);

        slot.release();
        assert_eq!(factory.live.load(Ordering::SeqCst), 0);
        assert!(!slot.is_live());
    }

    #[test]
    fn dropping_a_slot_destroys_its_surface() {
        let factory = ProbeFactory::new();
        {
            let mut slot = SurfaceSlot::new("geo-map");
            slot.acquire(&factory).unwrap();
            assert_eq!(factory.live.load(Ordering::SeqCst), 1);
        }
        assert_eq!(factory.live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn traffic_units() {
        assert_eq!(format_traffic(0), "0.00 B");
        assert_eq!(format_traffic(1023), "1023.00 B");
        assert_eq!(format_traffic(1536), "1.50 KB");
        assert_eq!(format_traffic(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_traffic(3 * 1024 * 1024 * 1024), "3.00 GB");
        assert_eq!(format_traffic(2 * 1024 * 1024 * 1024 * 1024), "2.00 TB");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }
}

//! Light/dark theme handling
//!
//! The theme is a persisted boolean flag plus a color-range overlay merged
//! into the live map surface. Applying a theme never triggers a data
//! fetch; it is a pure visual update on whatever the map already shows.

use std::sync::Arc;

use crate::geo::GeoWidget;
use crate::prefs::{PreferenceStore, PREF_DARK_MODE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

/// Visual-map color range merged into a live choropleth surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeOverlay {
    pub low_color: &'static str,
    pub high_color: &'static str,
}

impl Theme {
    pub fn overlay(self) -> ThemeOverlay {
        match self {
            Theme::Light => ThemeOverlay {
                low_color: "#e0ffff",
                high_color: "#006edd",
            },
            Theme::Dark => ThemeOverlay {
                low_color: "#2a5769",
                high_color: "#7eb9ff",
            },
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

pub struct ThemeManager {
    prefs: Arc<dyn PreferenceStore>,
}

impl ThemeManager {
    pub fn new(prefs: Arc<dyn PreferenceStore>) -> Self {
        Self { prefs }
    }

    /// The persisted theme; anything but the string "true" is light mode.
    pub fn current(&self) -> Theme {
        if self.prefs.get(PREF_DARK_MODE).as_deref() == Some("true") {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    /// Flip and persist the theme, returning the new value
    pub fn toggle(&self) -> Theme {
        let next = match self.current() {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        };
        self.prefs
            .set(PREF_DARK_MODE, if next.is_dark() { "true" } else { "false" });
        next
    }

    /// Push the current theme onto the live map instance
    pub fn apply(&self, geo: &mut GeoWidget) -> anyhow::Result<()> {
        geo.apply_theme(&self.current().overlay())
    }
}

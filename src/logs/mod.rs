//! Server-paginated log browser
//!
//! Owns the pagination/sort/filter state machine and renders one fetched
//! page at a time. The server is authoritative for the page count and the
//! effective page number; locally requested values are only ever treated
//! as a request. Page size and sort settings persist across sessions,
//! page and filter do not.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::client::models::{LogEntry, LogsPage, Pagination};
use crate::client::{FetchError, LogQuery};
use crate::prefs::{
    PreferenceStore, PREF_LOGS_PAGE_SIZE, PREF_LOGS_SORT_FIELD, PREF_LOGS_SORT_ORDER,
};
use crate::render::{format_traffic, RenderPayload, SurfaceFactory, SurfaceSlot};

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_SORT_FIELD: &str = "timestamp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

/// Pagination/sort/filter state. `total_pages` always mirrors the last
/// server response.
#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub sort_field: String,
    pub sort_order: SortOrder,
    pub filter: String,
}

impl PageState {
    /// Restore persisted settings; anything absent or unparsable falls
    /// back to its default.
    pub fn from_prefs(prefs: &dyn PreferenceStore) -> Self {
        let page_size = prefs
            .get(PREF_LOGS_PAGE_SIZE)
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let sort_field = prefs.get_or(PREF_LOGS_SORT_FIELD, DEFAULT_SORT_FIELD);

        let sort_order = prefs
            .get(PREF_LOGS_SORT_ORDER)
            .and_then(|v| v.parse::<SortOrder>().ok())
            .unwrap_or(SortOrder::Desc);

        Self {
            page: 1,
            page_size,
            total_pages: 0,
            sort_field,
            sort_order,
            filter: String::new(),
        }
    }

    /// Snapshot the current state as fetch parameters
    pub fn query(&self) -> LogQuery {
        LogQuery {
            page: self.page,
            page_size: self.page_size,
            sort_field: self.sort_field.clone(),
            sort_order: self.sort_order.as_str().to_string(),
            filter: self.filter.clone(),
        }
    }

    /// Adopt the server's pagination verdict; the requested page may have
    /// been clamped.
    pub fn sync_from_response(&mut self, pagination: &Pagination) {
        self.page = pagination.page;
        self.total_pages = pagination.pages;
    }
}

/// Log-browser interactions delivered by the host environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogsEvent {
    WebsiteChanged,
    FilterChanged(String),
    SortFieldChanged(String),
    SortOrderChanged(SortOrder),
    PageSizeChanged(u32),
    NextPage,
    PrevPage,
    /// Raw user input from the jump box, validated before any fetch
    JumpToPage(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LogsError {
    #[error("enter a page number between 1 and {total_pages}")]
    InvalidJump { total_pages: u32 },
}

/// Whether a state transition requires a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Fetch,
    None,
}

/// Apply one event to the state. Settings that survive reloads are
/// written through to the preference store inside the transition; `page`
/// and `filter` stay session-only.
pub fn apply_event(
    state: &mut PageState,
    event: LogsEvent,
    prefs: &dyn PreferenceStore,
) -> Result<Transition, LogsError> {
    match event {
        LogsEvent::WebsiteChanged => {
            state.page = 1;
            Ok(Transition::Fetch)
        }
        LogsEvent::FilterChanged(filter) => {
            state.filter = filter.trim().to_string();
            state.page = 1;
            Ok(Transition::Fetch)
        }
        LogsEvent::SortFieldChanged(field) => {
            state.sort_field = field;
            prefs.set(PREF_LOGS_SORT_FIELD, &state.sort_field);
            state.page = 1;
            Ok(Transition::Fetch)
        }
        LogsEvent::SortOrderChanged(order) => {
            state.sort_order = order;
            prefs.set(PREF_LOGS_SORT_ORDER, order.as_str());
            state.page = 1;
            Ok(Transition::Fetch)
        }
        LogsEvent::PageSizeChanged(size) => {
            state.page_size = size.max(1);
            prefs.set(PREF_LOGS_PAGE_SIZE, &state.page_size.to_string());
            state.page = 1;
            Ok(Transition::Fetch)
        }
        LogsEvent::NextPage => {
            if state.page < state.total_pages {
                state.page += 1;
                Ok(Transition::Fetch)
            } else {
                Ok(Transition::None)
            }
        }
        LogsEvent::PrevPage => {
            if state.page > 1 {
                state.page -= 1;
                Ok(Transition::Fetch)
            } else {
                Ok(Transition::None)
            }
        }
        LogsEvent::JumpToPage(input) => {
            let target = input.trim().parse::<u32>().ok().filter(|p| {
                *p >= 1 && *p <= state.total_pages
            });
            match target {
                Some(page) => {
                    state.page = page;
                    Ok(Transition::Fetch)
                }
                None => Err(LogsError::InvalidJump {
                    total_pages: state.total_pages,
                }),
            }
        }
    }
}

/// Status-code presentation bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusClass {
    Success,
    Warning,
    Error,
}

pub fn status_class(code: u16) -> StatusClass {
    if code >= 400 {
        StatusClass::Error
    } else if code >= 300 {
        StatusClass::Warning
    } else {
        StatusClass::Success
    }
}

/// Location display precedence: domestic, else global, else "-"
pub fn location_display(domestic: &str, global: &str) -> String {
    if !domestic.is_empty() {
        domestic.to_string()
    } else if !global.is_empty() {
        global.to_string()
    } else {
        "-".to_string()
    }
}

fn dash_if_empty(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

/// One rendered log row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRow {
    pub time: String,
    pub ip: String,
    pub location: String,
    pub request: String,
    pub status_code: u16,
    pub status_class: StatusClass,
    pub traffic: String,
    pub referer: String,
    pub browser: String,
    pub os: String,
    pub device: String,
    pub pageview: bool,
}

impl LogRow {
    pub fn from_entry(entry: &LogEntry) -> Self {
        Self {
            time: entry.time.clone(),
            ip: entry.ip.clone(),
            location: location_display(&entry.domestic_location, &entry.global_location),
            request: format!("{} {}", entry.method, entry.url),
            status_code: entry.status_code,
            status_class: status_class(entry.status_code),
            traffic: format_traffic(entry.bytes_sent),
            referer: dash_if_empty(&entry.referer),
            browser: dash_if_empty(&entry.user_browser),
            os: dash_if_empty(&entry.user_os),
            device: dash_if_empty(&entry.user_device),
            pageview: entry.pageview_flag,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogTableView {
    pub rows: Vec<LogRow>,
    pub page: u32,
    pub total_pages: u32,
}

/// The log browser widget: state machine, control locking, and the owned
/// table surface.
pub struct LogBrowser {
    slot: SurfaceSlot,
    state: PageState,
    controls_locked: bool,
}

impl LogBrowser {
    pub fn from_prefs(prefs: &dyn PreferenceStore) -> Self {
        Self {
            slot: SurfaceSlot::new("logs-table"),
            state: PageState::from_prefs(prefs),
            controls_locked: false,
        }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn controls_locked(&self) -> bool {
        self.controls_locked
    }

    /// Feed one event through the state machine. Events are ignored while
    /// a fetch is in flight, mirroring disabled controls.
    pub fn handle(
        &mut self,
        event: LogsEvent,
        prefs: &dyn PreferenceStore,
    ) -> Result<Transition, LogsError> {
        if self.controls_locked {
            return Ok(Transition::None);
        }
        apply_event(&mut self.state, event, prefs)
    }

    /// A website change arrives from the selection controller, not the
    /// paging controls, so it applies even while a fetch holds the lock;
    /// the in-flight response is discarded by the controller's epoch guard.
    pub fn reset_for_website(&mut self, prefs: &dyn PreferenceStore) {
        self.controls_locked = false;
        let _ = apply_event(&mut self.state, LogsEvent::WebsiteChanged, prefs);
    }

    /// Lock the controls and snapshot fetch parameters
    pub fn begin_fetch(&mut self) -> LogQuery {
        self.controls_locked = true;
        self.state.query()
    }

    /// Render a fetched page; pagination state is adopted from the
    /// response and controls unlock.
    pub fn apply_page(
        &mut self,
        page: &LogsPage,
        factory: &dyn SurfaceFactory,
    ) -> anyhow::Result<()> {
        self.controls_locked = false;
        self.state.sync_from_response(&page.pagination);

        let view = LogTableView {
            rows: page.logs.iter().map(LogRow::from_entry).collect(),
            page: self.state.page,
            total_pages: self.state.total_pages,
        };

        let surface = self.slot.acquire(factory)?;
        surface.render(RenderPayload::LogTable(&view))?;
        Ok(())
    }

    /// Replace the table with a single error row; controls unlock so the
    /// user can retry with another action.
    pub fn show_error(&mut self, err: &FetchError, factory: &dyn SurfaceFactory) {
        error!("Log fetch failed: {}", err);
        self.controls_locked = false;
        self.render_placeholder(
            RenderPayload::ErrorMessage("Failed to load logs, try again"),
            factory,
        );
    }

    pub fn show_empty(&mut self, message: &str, factory: &dyn SurfaceFactory) {
        self.controls_locked = false;
        self.render_placeholder(RenderPayload::EmptyState(message), factory);
    }

    fn render_placeholder(&mut self, payload: RenderPayload<'_>, factory: &dyn SurfaceFactory) {
        match self.slot.acquire(factory) {
            Ok(surface) => {
                if let Err(e) = surface.render(payload) {
                    error!("Log placeholder render failed: {}", e);
                }
            }
            Err(e) => error!("Log surface unavailable: {}", e),
        }
    }
}

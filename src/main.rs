use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use url::Url;

use vantage::client::models::TimeRange;
use vantage::client::StatsClient;
use vantage::config::Config;
use vantage::prefs::{FilePreferenceStore, PreferenceStore};
use vantage::render::text::TextSurfaceFactory;
use vantage::session::Dashboard;
use vantage::theme::ThemeManager;

#[derive(Parser)]
#[command(name = "vantage")]
#[command(about = "Terminal snapshot of a web-traffic analytics dashboard", long_about = None)]
struct Cli {
    /// Website id to show; falls back to the stored preference, then the
    /// first registered website
    #[arg(long)]
    website: Option<String>,

    /// Time range: today, yesterday, 7d, 30d
    #[arg(long, default_value = "7d")]
    range: TimeRange,

    /// Stats API base URL (overrides VANTAGE_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Preference file path (overrides VANTAGE_PREFS_PATH)
    #[arg(long)]
    prefs_file: Option<String>,

    /// Flip the persisted light/dark theme before rendering
    #[arg(long)]
    toggle_theme: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.api.base_url = api_url;
    }
    if let Some(path) = cli.prefs_file {
        config.prefs.path = path;
    }

    let prefs: Arc<dyn PreferenceStore> =
        Arc::new(FilePreferenceStore::open(&config.prefs.path)?);
    let client = StatsClient::new(&config.api)?;
    let factory = TextSurfaceFactory::stdout();

    let theme = ThemeManager::new(Arc::clone(&prefs));
    if cli.toggle_theme {
        info!("Theme switched to {:?}", theme.toggle());
    }

    info!("Fetching websites from {}", config.api.base_url);
    let websites = client.websites().await?;

    // The --website flag plays the role of the page's ?id= query.
    let mut page_url = Url::parse("app://vantage/dashboard")?;
    if let Some(website) = cli.website.as_deref() {
        page_url.query_pairs_mut().append_pair("id", website);
    }

    let mut dashboard = Dashboard::new(Arc::clone(&prefs), page_url, cli.range);
    match dashboard.resolve_initial(&websites, cli.range) {
        Some(selection) => {
            info!(
                "Showing '{}' over {}",
                selection.website_id, selection.time_range
            );
            dashboard
                .refresh(&client, &theme.current().overlay(), &factory)
                .await;
        }
        None => {
            warn!("No websites registered on the server");
            dashboard.show_empty_all(&factory);
        }
    }

    Ok(())
}

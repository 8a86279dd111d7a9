//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::{load_config, GalleryConfig};
use crate::error::{Result, ResultExt};
use crate::feed::{FeedSource, ProfileSummary, XrpcClient};
use crate::gallery::{FeedUpdate, Gallery};
use crate::http::HttpClient;
use crate::proxy::{self, RssProxy};
use crate::render::{HtmlPage, JsonLinesSink, RenderSink};
use crate::types::LogLevel;
use serde_json::json;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;

        match &self.cli.command {
            Commands::Profile => self.profile(&config).await,
            Commands::Feed { pages, min_count } => self.feed(&config, *pages, *min_count).await,
            Commands::Render { output } => self.render(&config, output).await,
            Commands::Serve { port } => crate::cli::serve(config, *port).await,
            Commands::Proxy { port } => proxy::serve(RssProxy::from_config(&config)?, *port).await,
        }
    }

    /// Load the configuration file (or defaults) and apply flag overrides
    pub fn load_config(&self) -> Result<GalleryConfig> {
        let mut config = match &self.cli.config {
            Some(path) => load_config(path)?,
            None => GalleryConfig::default(),
        };

        if let Some(handle) = &self.cli.handle {
            config.handle.clone_from(handle);
        }

        let config = config.normalized();
        config.validate()?;
        Ok(config)
    }

    /// Default log level: `--verbose` wins over the configuration file
    pub fn log_level(&self) -> LogLevel {
        if self.cli.verbose {
            return LogLevel::Debug;
        }
        self.load_config()
            .map(|config| config.log_level)
            .unwrap_or_default()
    }

    async fn profile(&self, config: &GalleryConfig) -> Result<()> {
        let gallery = Gallery::new(build_source(config)?, config);
        let profile = gallery.load_profile().await;

        let mut sink = JsonLinesSink::new(io::stdout());
        sink.render_profile(profile.as_ref())
    }

    async fn feed(
        &self,
        config: &GalleryConfig,
        pages: usize,
        min_count: Option<usize>,
    ) -> Result<()> {
        let start = Instant::now();
        let mut config = config.clone();
        if let Some(min_count) = min_count {
            config.initial_count = min_count.max(1);
        }

        let gallery =
            Gallery::new(build_source(&config)?, &config).with_cancellation(cancel_on_ctrl_c());
        let mut sink = JsonLinesSink::new(io::stdout());

        let mut update = gallery.load_initial().await;
        update.render_into(&mut sink)?;

        for _ in 0..pages {
            let Some(next) = gallery.load_more().await.into_update() else {
                break;
            };
            next.render_into(&mut sink)?;
            update = next;
        }

        let summary = json!({
            "type": "summary",
            "handle": gallery.handle(),
            "items": sink.written(),
            "has_more": update.has_more,
            "stop": update.stop.to_string(),
            "elapsed_ms": start.elapsed().as_millis() as u64,
        });
        let mut stdout = sink.into_inner();
        writeln!(stdout, "{summary}")?;
        Ok(())
    }

    async fn render(&self, config: &GalleryConfig, output: &Path) -> Result<()> {
        let gallery =
            Gallery::new(build_source(config)?, config).with_cancellation(cancel_on_ctrl_c());
        let profile = gallery.load_profile().await;
        let update = gallery.load_initial().await;

        let page = render_page(&config.web_url, profile.as_ref(), &update, false)?;
        fs::write(output, page.document())
            .with_context(|| format!("Failed to write {}", output.display()))?;

        info!(
            path = %output.display(),
            items = page.card_count(),
            stop = %update.stop,
            "Wrote gallery"
        );
        Ok(())
    }
}

/// AppView source for the configured service
pub fn build_source(config: &GalleryConfig) -> Result<Arc<dyn FeedSource>> {
    let http = HttpClient::with_config(config.http_client_config())?;
    Ok(Arc::new(
        XrpcClient::new(http).with_page_limit(config.page_limit),
    ))
}

/// Full gallery page for a profile and an initial load
pub fn render_page(
    web_url: &str,
    profile: Option<&ProfileSummary>,
    update: &FeedUpdate,
    infinite_scroll: bool,
) -> Result<HtmlPage> {
    let mut page = HtmlPage::new(web_url);
    if infinite_scroll {
        page = page.with_infinite_scroll();
    }
    page.render_profile(profile)?;
    update.render_into(&mut page)?;
    page.set_has_more(update.has_more);
    Ok(page)
}

/// Token cancelled on Ctrl-C
pub(crate) fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling feed fetch");
            child.cancel();
        }
    });
    token
}

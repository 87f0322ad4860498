use std::sync::Arc;

use anyhow::{anyhow, Result};
use eframe::egui::ViewportBuilder;

use hn_feed_reader::app::ReaderApp;
use hn_feed_reader::config::ReaderConfig;
use hn_feed_reader::db::{Bookmarks, SqliteStore};
use hn_feed_reader::hn_client::{HackerNewsClient, ItemSource};
use hn_feed_reader::loader::{Loader, Notify};
use hn_feed_reader::logging;

fn main() -> Result<()> {
    let config = ReaderConfig::load()?;
    let data_dir = config.data_dir()?;
    logging::initialize(&config.log, &data_dir);

    // Network work runs here; the egui event loop keeps the main thread.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let source: Arc<dyn ItemSource> = Arc::new(HackerNewsClient::new(&config.api)?);
    let bookmarks = Bookmarks::new(Arc::new(SqliteStore::open_in(&data_dir)?));
    let handle = runtime.handle().clone();

    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([1000.0, 800.0])
            .with_min_inner_size([600.0, 400.0])
            .with_title("HN Feed Reader"),
        ..Default::default()
    };

    log::info!("reading from {}", config.api.base_url);
    eframe::run_native(
        "HN Feed Reader",
        options,
        Box::new(move |cc| {
            let ctx = cc.egui_ctx.clone();
            let notify: Notify = Arc::new(move || ctx.request_repaint());
            let loader = Loader::new(handle, source, notify);
            Ok(Box::new(ReaderApp::restore(cc.storage, loader, bookmarks)))
        }),
    )
    .map_err(|err| anyhow!("UI exited with an error: {}", err))
}

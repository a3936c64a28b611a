//! `build` command: run the pipeline over a filesystem store and write the
//! rendered document.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::FeedToolConfig;
use crate::core::{CancelToken, SystemClock};
use crate::feed::{FeedGenerator, FeedOptions};
use crate::log;
use crate::logger::Logger;
use crate::store::FsStore;

/// Build the feed described by `config`. Returns the written path.
pub fn build_feed(config: &FeedToolConfig, logger: &Logger, token: &CancelToken) -> Result<PathBuf> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let store = FsStore::new(&config.store.root);
    if !store.root().is_dir() {
        anyhow::bail!("store directory '{}' not found", store.root().display());
    }

    let generator = FeedGenerator::new(
        Arc::new(store),
        Arc::new(SystemClock),
        logger.clone(),
        FeedOptions::from_config(config),
    );
    let bytes = runtime
        .block_on(generator.generate(token))
        .context("Failed to build feed")?;

    let path = config.feed.path.clone();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create '{}'", parent.display()))?;
    }
    fs::write(&path, &bytes).with_context(|| format!("Failed to write '{}'", path.display()))?;

    log!(logger; "done"; "{}", path.display());
    Ok(path)
}

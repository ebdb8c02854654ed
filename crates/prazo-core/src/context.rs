//! Per-run context — constructed once in `main` and threaded through every
//! component, so there is no module-level mutable state and tests can
//! inject their own fixtures.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::cache::FileCache;
use crate::config::Config;

pub const PAGE_CACHE_FILE: &str = "page_cache.json";
pub const TITLE_CACHE_FILE: &str = "materia_cache.json";
pub const LAST_MESSAGE_FILE: &str = "last_message.json";

/// Everything one sync run needs: configuration, the frozen "today"
/// reference, and the three persistent caches.
pub struct SyncContext {
    pub config: Config,
    /// Computed once at process start; day counts stay consistent across
    /// workers even if the run straddles midnight.
    pub today: NaiveDate,
    /// Raw Notion pages keyed by page id.
    pub pages: Arc<FileCache>,
    /// Resolved relation titles keyed by page id.
    pub titles: Arc<FileCache>,
    /// The last dispatched message's identity (no age-based invalidation).
    pub dispatch_state: Arc<FileCache>,
}

impl SyncContext {
    pub fn new(config: Config, today: NaiveDate) -> Self {
        std::fs::create_dir_all(&config.cache_dir).ok();
        let max_age = Some(config.cache_max_age_days);
        let pages = Arc::new(FileCache::open(
            &config.cache_dir.join(PAGE_CACHE_FILE),
            "page_cache",
            max_age,
        ));
        let titles = Arc::new(FileCache::open(
            &config.cache_dir.join(TITLE_CACHE_FILE),
            "materia_cache",
            max_age,
        ));
        let dispatch_state = Arc::new(FileCache::open(
            &config.cache_dir.join(LAST_MESSAGE_FILE),
            "last_message",
            None,
        ));
        Self { config, today, pages, titles, dispatch_state }
    }

    /// Persist the page and title caches. The dispatch record is saved
    /// separately, only after a successful send.
    pub fn save_caches(&self) {
        self.pages.save();
        self.titles.save();
    }
}

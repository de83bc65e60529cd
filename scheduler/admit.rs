//! Admit/Observe (spec.md §4.5): forwards a freshly crawled page into the page
//! DB. Touches no schedule state — the next `request` call observes the
//! updated `last_crawl`/`n_crawls` through the page DB itself.

use crate::error::Result;
use crate::pagedb::{CrawledPage, PageDb};

pub fn add(page_db: &dyn PageDb, page: &CrawledPage) -> Result<()> {
    page_db.add(page)
}

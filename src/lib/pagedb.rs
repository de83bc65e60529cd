//! The page database collaborator interface.
//!
//! spec.md §1 treats the page DB as out of scope: "used as an oracle for per-page
//! statistics." This module defines only the interface the scheduler needs
//! (spec.md §6 "Collaborator contracts"), plus a minimal in-memory double used by
//! this crate's own tests and by `schedule-tool`. A real deployment backs
//! [`PageDb`] with whatever durable store the surrounding crawler already uses;
//! this crate never assumes more than the trait below.

use std::cell::RefCell;

use crate::error::Error;

/// Opaque 64-bit page identifier, provided by the page DB.
pub type PageHash = u64;

/// Per-page crawl history and metadata, as known to the page DB.
#[derive(Debug, Clone, PartialEq)]
pub struct PageInfo {
    pub url: String,
    /// Seconds since the Unix epoch, matching the original C implementation's
    /// `difftime(now, 0) - last_crawl` subtraction (spec.md §9, resolved in
    /// SPEC_FULL.md §8): both sides of the throttle comparison are plain
    /// seconds-since-epoch with no other unit conversion.
    pub last_crawl: i64,
    pub n_crawls: u32,
    pub is_seed: bool,
    /// Crawls per unit time, derived from crawl history. `None` when the page
    /// DB cannot yet estimate a rate (e.g. fewer than two observed crawls).
    /// Surfaced through [`PageInfo::rate`] rather than read directly so a
    /// real page DB can compute it lazily instead of storing it.
    pub rate: Option<f64>,
}

impl PageInfo {
    pub fn rate(&self) -> Option<f64> {
        self.rate
    }
}

/// A freshly crawled page, as reported by the surrounding crawler loop.
#[derive(Debug, Clone)]
pub struct CrawledPage {
    pub hash: PageHash,
    pub url: String,
    pub crawled_at: i64,
}

/// The scheduler's one-way dependency on the page DB (spec.md §9): the
/// scheduler holds a borrow of a `PageDb` implementation, bound once at
/// `open`, and never needs the reverse reference. All three methods take
/// `&self`, matching spec.md §5's "expected to be thread-safe at the
/// granularity of one call" — a production page DB is expected to own its
/// interior synchronization (e.g. a connection pool) the same way the
/// teacher's `UserRepository` wraps a cloneable `sqlx::PgPool` instead of
/// requiring `&mut self` for writes.
pub trait PageDb {
    /// Looks up the current stats for a page, or `None` if the page DB no
    /// longer knows about it.
    fn get_info(&self, hash: PageHash) -> Result<Option<PageInfo>, Error>;

    /// Records a crawl outcome. `add` on the scheduler forwards here unchanged
    /// (spec.md §4.5).
    fn add(&self, page: &CrawledPage) -> Result<(), Error>;

    /// Streams every known `(hash, PageInfo)` pair, for `load_from_pagedb`.
    fn hashinfo_stream(&self) -> Result<Vec<(PageHash, PageInfo)>, Error>;
}

/// An in-memory [`PageDb`] double, used by this crate's tests and by
/// `schedule-tool`'s demo mode. Not a production collaborator.
///
/// Wraps its map in a `RefCell` so `add` can take `&self` like the trait
/// requires while still mutating in place; a real page DB's own pool/store
/// handle would supply that interior synchronization instead.
#[derive(Debug, Default)]
pub struct InMemoryPageDb {
    pages: RefCell<std::collections::HashMap<PageHash, PageInfo>>,
}

impl InMemoryPageDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, hash: PageHash, info: PageInfo) {
        self.pages.get_mut().insert(hash, info);
    }

    pub fn remove(&mut self, hash: PageHash) -> Option<PageInfo> {
        self.pages.get_mut().remove(&hash)
    }
}

impl PageDb for InMemoryPageDb {
    fn get_info(&self, hash: PageHash) -> Result<Option<PageInfo>, Error> {
        Ok(self.pages.borrow().get(&hash).cloned())
    }

    fn add(&self, page: &CrawledPage) -> Result<(), Error> {
        let mut pages = self.pages.borrow_mut();
        let entry = pages.entry(page.hash).or_insert_with(|| PageInfo {
            url: page.url.clone(),
            last_crawl: page.crawled_at,
            n_crawls: 0,
            is_seed: false,
            rate: None,
        });
        entry.url = page.url.clone();
        entry.last_crawl = page.crawled_at;
        entry.n_crawls += 1;
        Ok(())
    }

    fn hashinfo_stream(&self) -> Result<Vec<(PageHash, PageInfo)>, Error> {
        Ok(self.pages.borrow().iter().map(|(h, pi)| (*h, pi.clone())).collect())
    }
}

//! The frequency-based recrawl scheduler: an ordered, persistent priority
//! queue keyed by a virtual "next-due" score (spec.md §1-2).
//!
//! `mod.rs` is the facade: [`Scheduler`] owns the store and schedule table and
//! exposes the public operations (`load_*`, `request`, `add`, `dump`). Each
//! submodule carries one component from spec.md §2's table.

pub mod admit;
pub mod dump;
pub mod engine;
pub mod key;
pub mod loader;
pub mod schedule;
pub mod store;

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::SchedulerOptions;
use crate::error::Result;
use crate::pagedb::{CrawledPage, PageDb};

use loader::PageFreq;
use schedule::Schedule;
use store::Store;

/// Owns one scheduler instance's on-disk directory, store handle, schedule
/// table, and its one-way borrow of the page DB (spec.md §9: "the scheduler
/// holds a borrow of the page DB; the page DB does not know the scheduler
/// exists"). Single-writer: one logical caller issues `request`/`load_*`/`add`
/// at a time, while `dump` may run concurrently (spec.md §5).
pub struct Scheduler<'db> {
    store: Store,
    schedule: Schedule,
    path: PathBuf,
    options: SchedulerOptions,
    page_db: &'db dyn PageDb,
}

impl<'db> Scheduler<'db> {
    /// Creates the directory if absent, opens the store with a 1-DBI layout,
    /// registers the schedule table, and binds the page DB for the lifetime
    /// of the scheduler (spec.md §4.7, §6 `open(page_db, path, options)`).
    /// Does not mutate the schedule itself.
    pub fn open(
        page_db: &'db dyn PageDb,
        path: impl AsRef<Path>,
        options: SchedulerOptions,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let store = Store::open(&path, options.map_size)?;

        let mut wtxn = store.begin_write()?;
        let schedule = Schedule::open(&store, &mut wtxn)?;
        wtxn.commit().map_err(crate::error::Error::from)?;

        info!(path = %path.display(), "opened scheduler");
        Ok(Self { store, schedule, path, options, page_db })
    }

    /// Directory name a scheduler uses when the caller does not specify one
    /// explicitly (spec.md §6): `<page_db_path>_freqs`.
    pub fn default_path(page_db_path: impl AsRef<Path>) -> PathBuf {
        let mut name = page_db_path.as_ref().as_os_str().to_os_string();
        name.push("_freqs");
        PathBuf::from(name)
    }

    pub fn load_from_pagedb(&self, freq_default: f32, freq_scale: f32) -> Result<()> {
        loader::load_from_pagedb(
            &self.store,
            &self.schedule,
            self.page_db,
            freq_default,
            freq_scale,
            self.options.max_n_crawls,
        )
    }

    pub fn load_from_array(&self, freqs: &[PageFreq]) -> Result<()> {
        loader::load_from_array(&self.store, &self.schedule, freqs)
    }

    /// Returns up to `max` URLs to fetch next (spec.md §4.4), consulting the
    /// page DB bound at `open`.
    pub fn request(&self, max: usize) -> Result<Vec<String>> {
        engine::request(
            &self.store,
            &self.schedule,
            self.page_db,
            max,
            self.options.margin,
            self.options.max_n_crawls,
        )
    }

    /// Records a crawl outcome in the page DB (spec.md §4.5). Does not touch
    /// the schedule. `PageDb::add` takes `&self` (see `pagedb.rs`), so this
    /// goes through the same bound reference as `request`/`load_from_pagedb`
    /// rather than needing a separate mutable handle.
    pub fn add(&self, page: &CrawledPage) -> Result<()> {
        admit::add(self.page_db, page)
    }

    /// Writes one line per schedule entry, in ascending key order.
    pub fn dump(&self, out: &mut dyn std::io::Write) -> Result<()> {
        dump::dump(&self.store, &self.schedule, out)
    }

    /// Closes the store. If `persist = false`, removes the data and lock
    /// files and the directory itself (spec.md §4.7).
    pub fn close(self) -> Result<()> {
        let Self { store, path, options, .. } = self;
        drop(store);

        if !options.persist {
            for name in ["data.mdb", "lock.mdb"] {
                let _ = std::fs::remove_file(path.join(name));
            }
            let _ = std::fs::remove_dir(&path);
            info!(path = %path.display(), "removed non-persistent scheduler directory");
        }
        Ok(())
    }
}

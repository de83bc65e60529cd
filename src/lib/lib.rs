//! Frequency-based recrawl scheduler.
//!
//! Given a page's observed crawl frequency, [`scheduler::Scheduler`] keeps a
//! persistent, ordered priority queue of "next due" times and hands back
//! batches of URLs in virtual-time order (see `SPEC_FULL.md`).

pub mod config;
pub mod error;
pub mod pagedb;

#[path = "../../scheduler/mod.rs"]
pub mod scheduler;

pub use config::SchedulerOptions;
pub use error::{Error, Result};
pub use pagedb::{CrawledPage, PageDb, PageHash, PageInfo};
pub use scheduler::loader::PageFreq;
pub use scheduler::Scheduler;

//! Populates the schedule from either the page DB's derived frequencies or an
//! externally supplied frequency array (spec.md §4.3).

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::pagedb::PageDb;

use super::key::ScheduleKey;
use super::schedule::Schedule;
use super::store::Store;

/// One `(hash, freq)` pair for [`load_from_array`].
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct PageFreq {
    pub hash: u64,
    pub freq: f32,
}

/// Populates the schedule from the page DB's per-hash stream (spec.md
/// §4.3.1). Runs inside one write transaction; any failure aborts it so no
/// partial load is ever observable.
pub fn load_from_pagedb(
    store: &Store,
    schedule: &Schedule,
    page_db: &dyn PageDb,
    freq_default: f32,
    freq_scale: f32,
    max_n_crawls: u32,
) -> Result<()> {
    let stream = page_db.hashinfo_stream()?;
    let mut wtxn = store.begin_write()?;

    let mut loaded = 0u64;
    for (hash, info) in &stream {
        let under_cap = max_n_crawls == 0 || info.n_crawls < max_n_crawls;
        let eligible = info.n_crawls > 0 && under_cap && !info.is_seed;
        if !eligible {
            continue;
        }

        let freq = if freq_scale > 0.0 {
            match info.rate() {
                Some(rate) if rate > 0.0 => freq_scale * rate as f32,
                _ => freq_default,
            }
        } else {
            freq_default
        };

        // Mirrors the C original's silent skip on non-positive derived
        // frequency (SPEC_FULL.md §8): a page simply isn't scheduled, this is
        // not an error.
        if freq <= 0.0 {
            continue;
        }

        let key = ScheduleKey::new(0.0, *hash)?;
        if let Err(e) = schedule.put(&mut wtxn, key, freq) {
            wtxn.abort();
            return Err(e);
        }
        loaded += 1;
    }

    wtxn.commit().map_err(Error::from)?;
    info!(loaded, "loaded schedule from page DB");
    Ok(())
}

/// Populates the schedule from an explicit frequency array (spec.md §4.3.2).
/// Each entry starts at `score = 1/freq` so the first turn is one period from
/// `t = 0`. The store is grown by `2 * n * entry_size` first to guarantee
/// headroom for the bulk insert (spec.md §4.3.2, §5 "Growth").
pub fn load_from_array(store: &Store, schedule: &Schedule, freqs: &[PageFreq]) -> Result<()> {
    const ENTRY_SIZE: usize = super::key::ENCODED_LEN + std::mem::size_of::<f32>();
    store.expand(2 * freqs.len() * ENTRY_SIZE)?;

    let mut wtxn = store.begin_write()?;
    for f in freqs {
        if f.freq <= 0.0 {
            wtxn.abort();
            return Err(Error::InvalidArgument(format!(
                "frequency for hash {:#016x} must be positive, got {}",
                f.hash, f.freq
            )));
        }
        let key = ScheduleKey::new(1.0 / f.freq as f64, f.hash)?;
        if let Err(e) = schedule.put(&mut wtxn, key, f.freq) {
            wtxn.abort();
            return Err(e);
        }
    }
    wtxn.commit().map_err(Error::from)?;
    debug!(n = freqs.len(), "loaded schedule from frequency array");
    Ok(())
}

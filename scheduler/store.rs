//! The memory-mapped transactional store (spec.md §4.2).
//!
//! Wraps a single-DBI `heed` environment. Policy matches the original C
//! implementation's LMDB flags one-for-one: no thread-local transactions (a
//! transaction may be begun on one logical call and committed on another) and
//! relaxed fsync (`NOSYNC`-equivalent) — durability is coarse and commit-only,
//! which is acceptable because the schedule can always be rebuilt from the page
//! DB (spec.md §4.2 "Policy").

use std::path::Path;

use heed::{Env, EnvFlags, EnvOpenOptions};

use crate::error::{Error, Result};

pub type ReadTxn<'e> = heed::RoTxn<'e>;
pub type WriteTxn<'e> = heed::RwTxn<'e>;

/// A single memory-mapped environment backing one scheduler instance.
pub struct Store {
    env: Env,
}

impl Store {
    /// Opens (creating if absent) a one-DBI LMDB environment at `path`.
    pub fn open(path: &Path, map_size: usize) -> Result<Self> {
        std::fs::create_dir_all(path)
            .map_err(|e| Error::InvalidPath(format!("creating {}: {e}", path.display())))?;

        let mut options = EnvOpenOptions::new();
        options.map_size(map_size).max_dbs(1);
        unsafe {
            options.flags(EnvFlags::NO_TLS | EnvFlags::NO_SYNC);
        }

        let env = unsafe { options.open(path) }
            .map_err(|e| Error::InvalidPath(format!("opening {}: {e}", path.display())))?;

        Ok(Self { env })
    }

    pub fn begin_read(&self) -> Result<ReadTxn<'_>> {
        self.env.read_txn().map_err(Error::from)
    }

    pub fn begin_write(&self) -> Result<WriteTxn<'_>> {
        self.env.write_txn().map_err(Error::from)
    }

    /// Grows the map size by at least `extra_bytes`. Must be called with no
    /// transactions open, before a large bulk load (spec.md §4.3.2, §5
    /// "Growth").
    pub fn expand(&self, extra_bytes: usize) -> Result<()> {
        let current = self.env.info().map_size;
        let target = current.checked_add(extra_bytes).ok_or_else(|| {
            Error::Memory(format!(
                "map size {current} + {extra_bytes} overflows usize"
            ))
        })?;
        unsafe { self.env.resize(target) }.map_err(Error::from)
    }

    pub(crate) fn env(&self) -> &Env {
        &self.env
    }
}

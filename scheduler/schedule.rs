//! The schedule index: a single ordered table `ScheduleKey -> freq` (spec.md
//! §4.1, §2 "Schedule Index"). This is the priority queue itself; the store
//! (`scheduler::store`) only supplies transactions, this module supplies the
//! ordered operations over the one table.

use heed::Database;

use crate::error::{Error, Result};

use super::key::{FreqCodec, ScheduleKey, ScheduleKeyCodec};
use super::store::{ReadTxn, Store, WriteTxn};

const TABLE_NAME: &str = "schedule";

/// Handle to the `schedule` table, opened once at construction with the
/// encoding from `scheduler::key` that makes the store's default byte order
/// equal to `(score asc, hash asc)` (spec.md §4.1, §9 design notes).
#[derive(Clone, Copy)]
pub struct Schedule {
    db: Database<ScheduleKeyCodec, FreqCodec>,
}

impl Schedule {
    pub fn open(store: &Store, wtxn: &mut WriteTxn<'_>) -> Result<Self> {
        let db = store
            .env()
            .create_database(wtxn, Some(TABLE_NAME))
            .map_err(Error::from)?;
        Ok(Self { db })
    }

    /// Invariant 1/2: rejects non-positive frequencies and NaN/negative scores
    /// before anything touches the store.
    fn validate(key: &ScheduleKey, freq: f32) -> Result<()> {
        if freq <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "frequency must be positive, got {freq}"
            )));
        }
        if key.score < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "score must be non-negative, got {}",
                key.score
            )));
        }
        Ok(())
    }

    pub fn put(&self, wtxn: &mut WriteTxn<'_>, key: ScheduleKey, freq: f32) -> Result<()> {
        Self::validate(&key, freq)?;
        self.db.put(wtxn, &key, &freq).map_err(Error::from)
    }

    pub fn delete(&self, wtxn: &mut WriteTxn<'_>, key: &ScheduleKey) -> Result<bool> {
        self.db.delete(wtxn, key).map_err(Error::from)
    }

    /// The head of the queue: the entry with the smallest `(score, hash)`.
    pub fn first(&self, rtxn: &ReadTxn<'_>) -> Result<Option<(ScheduleKey, f32)>> {
        self.db.first(rtxn).map_err(Error::from)
    }

    /// Ordered iteration over the whole table, ascending by key — used by
    /// `scheduler::dump` and by the crash-safety / reopen tests.
    pub fn iter<'t>(
        &self,
        rtxn: &'t ReadTxn<'t>,
    ) -> Result<impl Iterator<Item = Result<(ScheduleKey, f32)>> + 't> {
        let iter = self.db.iter(rtxn).map_err(Error::from)?;
        Ok(iter.map(|r| r.map_err(Error::from)))
    }

    pub fn len(&self, rtxn: &ReadTxn<'_>) -> Result<u64> {
        self.db.len(rtxn).map_err(Error::from)
    }

    pub fn is_empty(&self, rtxn: &ReadTxn<'_>) -> Result<bool> {
        Ok(self.len(rtxn)? == 0)
    }
}

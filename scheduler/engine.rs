//! The request engine: the core algorithm (spec.md §4.4). Pops the due-est
//! page, consults the page DB, throttles, emits, and reinserts with an
//! advanced score — all inside one write transaction.

use tracing::debug;

use crate::error::{Error, Result};
use crate::pagedb::PageDb;

use super::key::ScheduleKey;
use super::schedule::Schedule;
use super::store::Store;

/// Seconds since the Unix epoch, matching the page DB's `last_crawl` unit
/// (SPEC_FULL.md §8).
fn now_seconds() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Returns up to `max` URLs to fetch next, in one write transaction (spec.md
/// §4.4). Steps, repeated until the result reaches `max` or an interrupt
/// fires:
///
/// 1. Peek the head (smallest `(score, hash)`). An empty schedule interrupts
///    immediately.
/// 2. Copy `(score, hash, freq)` out before mutating anything.
/// 3. Look up the page in the page DB (it may have been removed).
/// 4. Throttle: if `margin >= 0` and the page exists, and it was crawled more
///    recently than `1 / (freq * (1 + margin))` ago, the head is **not** yet
///    due. The batch stops here — the entry is left completely untouched
///    (not deleted, not re-keyed) and **no later, larger-score entry is
///    inspected this call**: virtual-time order guarantees nothing else in
///    the schedule is due sooner, and this is the intended behavior, not
///    an oversight (see SPEC_FULL.md §8).
/// 5. Otherwise the head is deleted unconditionally.
/// 6. `crawl` decides whether to emit and reinsert: unlimited, or under the
///    crawl cap. A page whose `PageInfo` vanished is never emitted.
/// 7. If crawling: emit the URL and reinsert at `score + 1/freq` with the
///    same `freq`.
/// 8. Otherwise the page is retired permanently (cap reached).
pub fn request(
    store: &Store,
    schedule: &Schedule,
    page_db: &dyn PageDb,
    max: usize,
    margin: f64,
    max_n_crawls: u32,
) -> Result<Vec<String>> {
    let mut wtxn = store.begin_write()?;
    let mut urls = Vec::with_capacity(max.min(64));

    let result = (|| -> Result<()> {
        while urls.len() < max {
            let Some((key, freq)) = schedule.first(&wtxn)? else {
                break;
            };

            let info = page_db.get_info(key.hash)?;

            if let Some(pi) = &info {
                if margin >= 0.0 {
                    let elapsed = (now_seconds() - pi.last_crawl) as f64;
                    let min_interval = 1.0 / (freq as f64 * (1.0 + margin));
                    if elapsed < min_interval {
                        debug!(hash = key.hash, elapsed, min_interval, "head not yet due");
                        break;
                    }
                }
            }

            schedule.delete(&mut wtxn, &key)?;

            let crawl = match &info {
                Some(pi) => max_n_crawls == 0 || pi.n_crawls < max_n_crawls,
                None => false,
            };

            if crawl {
                let pi = info.expect("crawl is only true when info is Some");
                urls.push(pi.url.clone());
                let next_key = ScheduleKey::new(key.score + 1.0 / freq as f64, key.hash)?;
                schedule.put(&mut wtxn, next_key, freq)?;
                debug!(hash = key.hash, next_score = next_key.score, "emitted and rescheduled");
            } else {
                debug!(hash = key.hash, "retired from schedule");
            }
        }
        Ok(())
    })();

    match result {
        Ok(()) => {
            wtxn.commit().map_err(Error::from)?;
            Ok(urls)
        }
        Err(e) => {
            wtxn.abort();
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagedb::{InMemoryPageDb, PageInfo};
    use crate::scheduler::loader::{load_from_array, PageFreq};

    fn open_store() -> (tempfile::TempDir, Store, Schedule) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path(), 10 << 20).unwrap();
        let mut wtxn = store.begin_write().unwrap();
        let schedule = Schedule::open(&store, &mut wtxn).unwrap();
        wtxn.commit().unwrap();
        (dir, store, schedule)
    }

    fn db_with(pages: &[(u64, &str, i64, u32)]) -> InMemoryPageDb {
        let mut db = InMemoryPageDb::new();
        for (hash, url, last_crawl, n_crawls) in pages {
            db.insert(
                *hash,
                PageInfo { url: url.to_string(), last_crawl: *last_crawl, n_crawls: *n_crawls, is_seed: false, rate: None },
            );
        }
        db
    }

    #[test]
    fn empty_schedule_emits_nothing() {
        let (_dir, store, schedule) = open_store();
        let db = InMemoryPageDb::new();
        let urls = request(&store, &schedule, &db, 100, -1.0, 0).unwrap();
        assert!(urls.is_empty());
    }

    #[test]
    fn two_page_interleaving_matches_virtual_time_order() {
        // Scenario 1 of spec.md §8: h=1 f=2.0, h=2 f=1.0, both start at score 0.
        let (_dir, store, schedule) = open_store();
        let db = db_with(&[(1, "https://h1.example", 0, 0), (2, "https://h2.example", 0, 0)]);

        let mut wtxn = store.begin_write().unwrap();
        schedule.put(&mut wtxn, ScheduleKey::new(0.0, 1).unwrap(), 2.0).unwrap();
        schedule.put(&mut wtxn, ScheduleKey::new(0.0, 2).unwrap(), 1.0).unwrap();
        wtxn.commit().unwrap();

        let urls = request(&store, &schedule, &db, 6, -1.0, 0).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://h1.example",
                "https://h1.example",
                "https://h2.example",
                "https://h1.example",
                "https://h1.example",
                "https://h2.example",
            ]
        );

        let rtxn = store.begin_read().unwrap();
        let mut by_hash = std::collections::HashMap::new();
        for entry in schedule.iter(&rtxn).unwrap() {
            let (key, _) = entry.unwrap();
            by_hash.insert(key.hash, key.score);
        }
        assert_eq!(by_hash[&1], 2.0);
        assert_eq!(by_hash[&2], 2.0);
    }

    #[test]
    fn throttle_blocks_head_without_mutating_it() {
        // Scenario 2: one page, crawled 0.5s ago, margin 0 requires a full
        // 1s gap at freq=1.0.
        let (_dir, store, schedule) = open_store();
        let now = now_seconds();
        let db = db_with(&[(7, "https://h7.example", now, 0)]);

        let mut wtxn = store.begin_write().unwrap();
        schedule.put(&mut wtxn, ScheduleKey::new(0.0, 7).unwrap(), 1.0).unwrap();
        wtxn.commit().unwrap();

        let urls = request(&store, &schedule, &db, 10, 0.0, 0).unwrap();
        assert!(urls.is_empty());

        let rtxn = store.begin_read().unwrap();
        let (key, freq) = schedule.first(&rtxn).unwrap().unwrap();
        assert_eq!(key, ScheduleKey::new(0.0, 7).unwrap());
        assert_eq!(freq, 1.0);
    }

    #[test]
    fn cap_retires_page_after_limit_reached() {
        // Scenario 3: n_crawls=2, max_n_crawls=3 -> one more emission, then gone.
        let (_dir, store, schedule) = open_store();
        let mut db = db_with(&[(9, "https://h9.example", 0, 2)]);

        let mut wtxn = store.begin_write().unwrap();
        schedule.put(&mut wtxn, ScheduleKey::new(0.0, 9).unwrap(), 5.0).unwrap();
        wtxn.commit().unwrap();

        let urls = request(&store, &schedule, &db, 5, -1.0, 3).unwrap();
        assert_eq!(urls, vec!["https://h9.example"]);

        db.insert(9, PageInfo { url: "https://h9.example".into(), last_crawl: 0, n_crawls: 3, is_seed: false, rate: None });

        let urls = request(&store, &schedule, &db, 5, -1.0, 3).unwrap();
        assert!(urls.is_empty());

        let rtxn = store.begin_read().unwrap();
        assert!(schedule.is_empty(&rtxn).unwrap());
    }

    #[test]
    fn missing_page_info_is_dropped_not_crawled() {
        let (_dir, store, schedule) = open_store();
        let db = InMemoryPageDb::new(); // hash 3 unknown to the page DB

        let mut wtxn = store.begin_write().unwrap();
        schedule.put(&mut wtxn, ScheduleKey::new(0.0, 3).unwrap(), 1.0).unwrap();
        wtxn.commit().unwrap();

        let urls = request(&store, &schedule, &db, 5, -1.0, 0).unwrap();
        assert!(urls.is_empty());

        let rtxn = store.begin_read().unwrap();
        assert!(schedule.is_empty(&rtxn).unwrap());
    }

    #[test]
    fn rate_law_converges_over_many_emissions() {
        let (_dir, store, schedule) = open_store();
        let db = db_with(&[(1, "u1", 0, 0), (2, "u2", 0, 0)]);
        load_from_array(
            &store,
            &schedule,
            &[PageFreq { hash: 1, freq: 3.0 }, PageFreq { hash: 2, freq: 1.0 }],
        )
        .unwrap();

        let mut counts = [0u64, 0u64];
        for _ in 0..4000 {
            let urls = request(&store, &schedule, &db, 1, -1.0, 0).unwrap();
            match urls.first().map(String::as_str) {
                Some("u1") => counts[0] += 1,
                Some("u2") => counts[1] += 1,
                _ => {}
            }
        }

        let total = (counts[0] + counts[1]) as f64;
        let observed_fraction = counts[0] as f64 / total;
        // Expected fraction is f1 / (f1 + f2) = 3/4.
        assert!((observed_fraction - 0.75).abs() < 0.02, "got {observed_fraction}");
    }
}

//! Command-line driver for [`recrawl_scheduler::Scheduler`].
//!
//! Usage:
//!   schedule-tool <store-dir> load <freqs.json>
//!   schedule-tool <store-dir> request <max>
//!   schedule-tool <store-dir> dump

use std::io::stdout;

use anyhow::{bail, Context, Result};
use tracing::info;

use recrawl_scheduler::pagedb::InMemoryPageDb;
use recrawl_scheduler::{PageFreq, Scheduler, SchedulerOptions};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [store_dir, command, rest @ ..] = args.as_slice() else {
        bail!("usage: schedule-tool <store-dir> <load|request|dump> [arg]");
    };

    // schedule-tool has no durable page DB of its own; an empty double means
    // every due entry is dropped rather than crawled. Useful for inspecting
    // schedule ordering, not for driving a real crawl. Bound once at `open`,
    // matching the scheduler's one-way dependency on the page DB.
    let page_db = InMemoryPageDb::new();
    let scheduler = Scheduler::open(&page_db, store_dir, SchedulerOptions::default())
        .with_context(|| format!("opening scheduler at {store_dir}"))?;

    match command.as_str() {
        "load" => {
            let Some(path) = rest.first() else {
                bail!("load requires a path to a frequency JSON array");
            };
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {path}"))?;
            let freqs: Vec<PageFreq> = serde_json::from_str(&text)
                .with_context(|| format!("parsing {path} as a frequency array"))?;
            let n = freqs.len();
            scheduler.load_from_array(&freqs)?;
            info!(n, "loaded frequencies into schedule");
        }
        "request" => {
            let max: usize = rest
                .first()
                .context("request requires a max batch size")?
                .parse()
                .context("max must be a non-negative integer")?;
            let urls = scheduler.request(max)?;
            for url in urls {
                println!("{url}");
            }
        }
        "dump" => {
            scheduler.dump(&mut stdout())?;
        }
        other => bail!("unknown command {other:?}"),
    }

    scheduler.close()?;
    Ok(())
}

//! Scheduler configuration options (spec.md §6).

/// Default initial store map size: a generous upper bound the store grows into
/// lazily, matching the original's `FREQ_SCHEDULER_DEFAULT_SIZE`.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30; // 1 GiB

/// Throttle disabled, per spec.md §6's default of `margin = -1`.
pub const MARGIN_DISABLED: f64 = -1.0;

#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// If `false`, [`crate::Scheduler::close`] deletes the store's data and lock
    /// files and the directory itself.
    pub persist: bool,
    /// Throttle slack; negative disables the throttle guard entirely.
    pub margin: f64,
    /// When greater than zero, a page is dropped from the schedule once it has
    /// reached this many crawls. Zero means unlimited.
    pub max_n_crawls: u32,
    /// Initial map size for the memory-mapped store.
    pub map_size: usize,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            persist: true,
            margin: MARGIN_DISABLED,
            max_n_crawls: 0,
            map_size: DEFAULT_MAP_SIZE,
        }
    }
}

//! Runtime counters and span names for the minion control loop.
//!
//! Counters are lock-free `AtomicU64`s bumped on the tick path and read on
//! export, so a host can hand a shared reference to a dashboard thread.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters for control-loop outcomes.
#[derive(Debug)]
pub struct MinionCounters {
    /// Minions that broke free for good.
    pub renegades: AtomicU64,
    /// Successful recovery rolls.
    pub recoveries: AtomicU64,
    /// Followers forced hostile by excess-capacity strain.
    pub strain_provocations: AtomicU64,
    /// Push impulses started.
    pub pushes: AtomicU64,
    /// Teleport-behind-player recoveries.
    pub teleports: AtomicU64,
    /// Items taken from loot.
    pub pickups: AtomicU64,
    /// Items equipped.
    pub equips: AtomicU64,
    /// Followers placed by a reposition job.
    pub repositions_placed: AtomicU64,
    /// Followers left in place after exhausting the sample budget.
    pub repositions_exhausted: AtomicU64,
}

impl MinionCounters {
    /// Create a new set of zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            renegades: AtomicU64::new(0),
            recoveries: AtomicU64::new(0),
            strain_provocations: AtomicU64::new(0),
            pushes: AtomicU64::new(0),
            teleports: AtomicU64::new(0),
            pickups: AtomicU64::new(0),
            equips: AtomicU64::new(0),
            repositions_placed: AtomicU64::new(0),
            repositions_exhausted: AtomicU64::new(0),
        }
    }

    /// Increment one counter.
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot all counters for export.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            renegades: self.renegades.load(Ordering::Relaxed),
            recoveries: self.recoveries.load(Ordering::Relaxed),
            strain_provocations: self.strain_provocations.load(Ordering::Relaxed),
            pushes: self.pushes.load(Ordering::Relaxed),
            teleports: self.teleports.load(Ordering::Relaxed),
            pickups: self.pickups.load(Ordering::Relaxed),
            equips: self.equips.load(Ordering::Relaxed),
            repositions_placed: self.repositions_placed.load(Ordering::Relaxed),
            repositions_exhausted: self.repositions_exhausted.load(Ordering::Relaxed),
        }
    }
}

impl Default for MinionCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// A snapshot of counter values at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Minions that broke free.
    pub renegades: u64,
    /// Successful recovery rolls.
    pub recoveries: u64,
    /// Strain provocations.
    pub strain_provocations: u64,
    /// Pushes started.
    pub pushes: u64,
    /// Teleports.
    pub teleports: u64,
    /// Loot pickups.
    pub pickups: u64,
    /// Equips.
    pub equips: u64,
    /// Reposition placements.
    pub repositions_placed: u64,
    /// Reposition budgets exhausted.
    pub repositions_exhausted: u64,
}

impl CounterSnapshot {
    /// Format as Prometheus-compatible text.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        let rows = [
            ("renegades", "Minions lost to renegade conversion", self.renegades),
            ("recoveries", "Loyalty recovery rolls won", self.recoveries),
            ("strain_provocations", "Followers turned by excess capacity", self.strain_provocations),
            ("pushes", "Push impulses started", self.pushes),
            ("teleports", "Teleport-behind-player recoveries", self.teleports),
            ("pickups", "Items taken from player loot", self.pickups),
            ("equips", "Items equipped", self.equips),
            ("repositions_placed", "Followers placed near the player", self.repositions_placed),
            ("repositions_exhausted", "Followers left in place", self.repositions_exhausted),
        ];

        rows.iter()
            .map(|(name, help, value)| {
                format!(
                    "# HELP minion_{name}_total {help}\n\
                     # TYPE minion_{name}_total counter\n\
                     minion_{name}_total {value}\n"
                )
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tracing Span Names
// ---------------------------------------------------------------------------

/// Span names used with `tracing::debug_span!` on the tick path.
pub mod spans {
    /// Whole `guide_all` pass.
    pub const GUIDE_ALL: &str = "minion::guide_all";
    /// Loyalty sweep.
    pub const LOYALTY_SWEEP: &str = "minion::loyalty";
    /// One controller tick.
    pub const GUIDE: &str = "minion::guide";
    /// Equipment check.
    pub const EQUIPMENT: &str = "minion::equipment";
    /// Scheduled task execution.
    pub const TASKS: &str = "minion::tasks";
    /// One reposition step.
    pub const REPOSITION: &str = "minion::reposition";
}

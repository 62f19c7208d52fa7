//! The registry of active minions and its batch operations.
//!
//! Constructed explicitly by the host and tied to the area lifecycle:
//! [`MinionRegistry::initialize`] on every area load. All mutation happens on
//! the simulation thread, so the registry is plain owned data.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, debug_span, info};

use crate::config::MinionConfig;
use crate::controller::{
    MinionRecord, TickContext, convert_renegade, finish_push, guide, provoke, regenerate,
    restore_loyalty, set_mode, start_push,
};
use crate::error::{MinionError, Result};
use crate::events::MinionEvent;
use crate::host::{Creatures, World};
use crate::loyalty::{self, Recovery};
use crate::metrics::{MinionCounters, spans};
use crate::oracle::PathOracle;
use crate::scheduler::{RepositionJob, ResumeAt, Task, TaskQueue, TaskToken, square_sample};
use crate::tag::parse_tag;
use crate::types::{CreatureId, InteractionMode, Mode, SimTime, TickClock};

/// Height above the player's feet at which reposition samples are taken.
const SAMPLE_LIFT: f32 = 0.3;

/// Every minion the player currently controls.
#[derive(Debug)]
pub struct MinionRegistry {
    config: MinionConfig,
    records: Vec<MinionRecord>,
    tasks: TaskQueue,
    events: Vec<MinionEvent>,
    counters: MinionCounters,
    rng: StdRng,
}

impl MinionRegistry {
    /// An empty registry. Randomness is seeded from `general.rng_seed` when
    /// set.
    #[must_use]
    pub fn new(config: MinionConfig) -> Self {
        let rng = config
            .general
            .rng_seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            config,
            records: Vec::new(),
            tasks: TaskQueue::new(),
            events: Vec::new(),
            counters: MinionCounters::new(),
            rng,
        }
    }

    /// Tuning in effect.
    #[must_use]
    pub fn config(&self) -> &MinionConfig {
        &self.config
    }

    /// Outcome counters.
    #[must_use]
    pub fn counters(&self) -> &MinionCounters {
        &self.counters
    }

    /// Pending cooperative tasks.
    #[must_use]
    pub fn tasks(&self) -> &TaskQueue {
        &self.tasks
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no minion is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether `creature` is a registered minion.
    #[must_use]
    pub fn contains(&self, creature: CreatureId) -> bool {
        self.records.iter().any(|r| r.creature == creature)
    }

    /// The record for `creature`.
    #[must_use]
    pub fn get(&self, creature: CreatureId) -> Option<&MinionRecord> {
        self.records.iter().find(|r| r.creature == creature)
    }

    /// Followers across all records.
    #[must_use]
    pub fn follower_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_following()).count()
    }

    /// Follower capacity for the player's current willpower.
    #[must_use]
    pub fn capacity<W: Creatures + ?Sized>(&self, world: &W) -> usize {
        loyalty::follower_capacity(
            world.player().willpower,
            self.config.loyalty.willpower_per_follower,
        )
    }

    /// Whether one more follower fits.
    #[must_use]
    pub fn can_add_follower<W: Creatures + ?Sized>(&self, world: &W) -> bool {
        loyalty::can_add_follower(self.follower_count(), self.capacity(world))
    }

    /// Hand over queued notifications.
    pub fn drain_events(&mut self) -> Vec<MinionEvent> {
        std::mem::take(&mut self.events)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Rebuild the registry from the creatures in the current area, reading
    /// each one's status from its display tag. Records from a previous area
    /// are dismissed first, so calling this twice yields the same set.
    ///
    /// A tagged creature that lost its ally flag while the area was unloaded
    /// is registered too; the next loyalty sweep rolls its recovery.
    pub fn initialize<W: Creatures + ?Sized>(&mut self, world: &mut W, now: SimTime) {
        for record in self.records.drain(..) {
            record.dismiss(world);
        }
        self.tasks.clear();

        for creature in world.creatures() {
            let Some(state) = world.creature(creature) else {
                continue;
            };
            let Some(mode) = parse_tag(&state.tag).and_then(|status| status.mode()) else {
                continue;
            };
            if let Some(record) = MinionRecord::attach(world, creature, mode, now, &self.config) {
                self.records.push(record);
            }
        }
        info!(
            minions = self.records.len(),
            followers = self.follower_count(),
            "minion registry initialized"
        );
    }

    /// Live records. Records whose creature is gone or inactive are pruned
    /// and their proxies destroyed.
    pub fn get_all<W: Creatures + ?Sized>(&mut self, world: &mut W) -> &[MinionRecord] {
        self.prune(world);
        &self.records
    }

    fn prune<W: Creatures + ?Sized>(&mut self, world: &mut W) {
        let (live, gone): (Vec<_>, Vec<_>) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|r| world.is_active(r.creature) && world.creature(r.creature).is_some());
        self.records = live;
        for record in gone {
            if let Some(token) = record.push_task {
                self.tasks.cancel(token);
            }
            record.dismiss(world);
        }
    }

    /// Take control of an allied creature. It follows if there is room,
    /// otherwise it stays. Adding a creature that is already a minion returns
    /// its current mode.
    ///
    /// # Errors
    /// `CreatureNotFound` if the host does not know the creature,
    /// `NotAMinion` if it is not currently a player ally.
    pub fn add_new<W: Creatures + ?Sized>(
        &mut self,
        world: &mut W,
        creature: CreatureId,
        now: SimTime,
    ) -> Result<Mode> {
        if let Some(record) = self.get(creature) {
            return Ok(record.mode);
        }
        let state = world
            .creature(creature)
            .ok_or(MinionError::CreatureNotFound(creature))?;
        if !state.is_ally() {
            return Err(MinionError::NotAMinion(creature));
        }

        let mode = if self.can_add_follower(&*world) {
            Mode::Following
        } else {
            Mode::Staying
        };
        let record = MinionRecord::attach(world, creature, mode, now, &self.config)
            .ok_or(MinionError::CreatureNotFound(creature))?;
        self.records.push(record);
        info!(%creature, ?mode, "minion added");
        Ok(mode)
    }

    /// Restore every minion's health, magic and stamina.
    pub fn rest<W: Creatures + ?Sized>(&mut self, world: &mut W) {
        for record in &self.records {
            if let Some(state) = world.creature_mut(record.creature) {
                state.resources.restore();
            }
        }
        debug!(minions = self.records.len(), "minions rested");
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// One simulation tick: resume due tasks, run the loyalty sweep, then
    /// guide and regenerate every surviving minion.
    pub fn guide_all<W: World + ?Sized>(&mut self, world: &mut W, clock: TickClock) {
        let _span = debug_span!(spans::GUIDE_ALL, frame = clock.frame).entered();
        self.run_tasks(world, clock.now);
        self.prune(world);
        self.loyalty_sweep(world);

        let Self {
            config,
            records,
            events,
            counters,
            rng,
            ..
        } = self;
        let config: &MinionConfig = config;
        let mut ctx = TickContext {
            config,
            clock,
            rng,
            events,
            counters,
        };
        for record in records.iter_mut() {
            guide(record, world, &mut ctx);
            if config.behavior.regenerate {
                regenerate(record, world, clock.now, config.timing.regen_interval);
            }
        }
    }

    /// Resume every task due at `now`.
    pub fn run_tasks<W: World + ?Sized>(&mut self, world: &mut W, now: SimTime) {
        let due = self.tasks.take_due(now);
        if due.is_empty() {
            return;
        }
        let _span = debug_span!(spans::TASKS, due = due.len()).entered();
        for (token, task) in due {
            match task {
                Task::ClearPush { creature } => {
                    if let Some(record) = self.records.iter_mut().find(|r| r.creature == creature) {
                        finish_push(record, token);
                    }
                }
                Task::Reposition(job) => self.reposition_step(world, job),
            }
        }
    }

    fn loyalty_sweep<W: Creatures + ?Sized>(&mut self, world: &mut W) {
        let _span = debug_span!(spans::LOYALTY_SWEEP).entered();
        let willpower = world.player().willpower;
        let capacity = self.capacity(&*world);
        let followers = self.follower_count();

        if followers > capacity {
            for record in self.records.iter().filter(|r| r.is_following()) {
                if loyalty::success_roll(&mut self.rng, self.config.loyalty.strain_chance) {
                    provoke(world, record.creature);
                    MinionCounters::bump(&self.counters.strain_provocations);
                    debug!(creature = %record.creature, followers, capacity, "loyalty strained");
                }
            }
        }

        let mut lost = Vec::new();
        for record in &self.records {
            let Some(state) = world.creature(record.creature) else {
                continue;
            };
            if state.is_ally() {
                continue;
            }
            let max_health = state.resources.max_health;
            match loyalty::resolve_recovery(&mut self.rng, willpower, max_health) {
                Recovery::Restored => {
                    restore_loyalty(world, record.creature);
                    MinionCounters::bump(&self.counters.recoveries);
                    info!(creature = %record.creature, "minion loyalty recovered");
                }
                Recovery::Renegade => lost.push(record.creature),
            }
        }

        for creature in lost {
            let Some(index) = self.records.iter().position(|r| r.creature == creature) else {
                continue;
            };
            let record = self.records.remove(index);
            if let Some(token) = record.push_task {
                self.tasks.cancel(token);
            }
            let event = convert_renegade(record, world, &self.config);
            MinionCounters::bump(&self.counters.renegades);
            self.events.push(event);
        }
    }

    // -----------------------------------------------------------------------
    // Player interaction
    // -----------------------------------------------------------------------

    /// Handle the player activating `creature`. Returns whether the
    /// activation was consumed.
    ///
    /// Converse toggles follow/stay, refusing to follow past capacity. Grab
    /// pushes the minion if the player is close enough. Other modes are
    /// left to the host.
    ///
    /// # Errors
    /// `NotAMinion` if `creature` is not registered.
    pub fn activate<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        creature: CreatureId,
        mode: InteractionMode,
        now: SimTime,
    ) -> Result<bool> {
        let can_follow = self.can_add_follower(&*world);
        let index = self
            .records
            .iter()
            .position(|r| r.creature == creature)
            .ok_or(MinionError::NotAMinion(creature))?;

        match mode {
            InteractionMode::Converse => {
                let record = &mut self.records[index];
                match record.mode {
                    Mode::Following => set_mode(record, world, Mode::Staying, &mut self.events),
                    Mode::Staying if can_follow => {
                        set_mode(record, world, Mode::Following, &mut self.events);
                    }
                    Mode::Staying => {
                        self.events.push(MinionEvent::FollowDenied { creature });
                        debug!(%creature, "follow refused at capacity");
                    }
                }
                Ok(true)
            }
            InteractionMode::Grab => {
                let Some(position) = world.creature(creature).map(|c| c.position) else {
                    return Ok(false);
                };
                if position.distance(world.player().position) > self.config.ranges.push_activate {
                    return Ok(false);
                }
                let record = &mut self.records[index];
                let pushed = start_push(record, world, &mut self.tasks, &self.config, now);
                if pushed {
                    MinionCounters::bump(&self.counters.pushes);
                }
                Ok(pushed)
            }
            InteractionMode::Other => Ok(false),
        }
    }

    // -----------------------------------------------------------------------
    // Reposition
    // -----------------------------------------------------------------------

    /// Queue a pass that moves far-away followers next to the player. The
    /// pass waits one tick before sampling and then handles one follower per
    /// tick. Returns the task token.
    pub fn reposition_all(&mut self) -> TaskToken {
        let followers = self
            .records
            .iter()
            .filter(|r| r.is_following())
            .map(|r| r.creature);
        let job = RepositionJob::new(followers);
        debug!(followers = job.pending.len(), "reposition queued");
        self.tasks.schedule(ResumeAt::NextTick, Task::Reposition(job))
    }

    fn reposition_step<W: World + ?Sized>(&mut self, world: &mut W, mut job: RepositionJob) {
        let _span = debug_span!(spans::REPOSITION, remaining = job.pending.len()).entered();
        if let Some(creature) = job.pending.pop_front() {
            if self.get(creature).is_some_and(MinionRecord::is_following) {
                self.reposition_one(world, creature);
            }
        }
        if !job.pending.is_empty() {
            self.tasks.schedule(ResumeAt::NextTick, Task::Reposition(job));
        }
    }

    fn reposition_one<W: World + ?Sized>(&mut self, world: &mut W, creature: CreatureId) {
        let Some(state) = world.creature(creature) else {
            return;
        };
        let (position, forward) = (state.position, state.forward);
        let player = world.player().position;
        let settings = &self.config.reposition;
        if position.distance(player) <= settings.trigger_distance {
            return;
        }

        let oracle = PathOracle::new(&*world);
        let spot = (0..settings.attempts)
            .map(|_| square_sample(&mut self.rng, player, settings.radius, SAMPLE_LIFT))
            .find(|&candidate| {
                oracle.is_standable(candidate) && oracle.has_path(candidate, player, true)
            });

        match spot {
            Some(spot) => {
                world.teleport(creature, spot, forward);
                MinionCounters::bump(&self.counters.repositions_placed);
                debug!(%creature, "follower repositioned");
            }
            None => {
                MinionCounters::bump(&self.counters.repositions_exhausted);
                debug!(%creature, attempts = settings.attempts, "no reposition spot found");
            }
        }
    }

    /// Drop every record, destroying proxies. Used on area unload.
    pub fn clear<W: Creatures + ?Sized>(&mut self, world: &mut W) {
        for record in self.records.drain(..) {
            record.dismiss(world);
        }
        self.tasks.clear();
    }
}

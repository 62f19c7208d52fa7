//! Per-minion state machine.
//!
//! A [`MinionRecord`] is plain data; everything that happens to a minion in
//! a tick is a free function over the record and the host [`World`]. The
//! controller never moves a creature itself. It writes targets, sense
//! toggles and the proxy marker position, and the host AI does the walking.

use ordered_float::OrderedFloat;
use rand::Rng;
use tracing::{debug, debug_span, info, warn};

use crate::config::{FollowConfig, MinionConfig, VolumeLevel};
use crate::equipment::{EquipAction, check_equipment};
use crate::events::MinionEvent;
use crate::host::{AudioOutput, Creatures, Physics, RayLayers, Senses, World, target_position};
use crate::metrics::{MinionCounters, spans};
use crate::oracle::{EYE_HEIGHT, PathOracle};
use crate::scheduler::{ResumeAt, Task, TaskQueue, TaskToken};
use crate::tag::{MinionStatus, format_tag};
use crate::types::{CreatureId, MarkerId, Mode, SimTime, TargetRef, Team, TickClock, Vec3};

/// Gap left between a pushed proxy and the wall that stopped it.
const PUSH_STANDOFF: f32 = 0.1;

const TELEPORT_CLEARANCE: f32 = 3.0;
const TELEPORT_BEHIND: f32 = 2.0;
const TELEPORT_SPACE_RADIUS: f32 = 0.65;
const TELEPORT_FLOOR_PROBE: f32 = 3.0;

// ---------------------------------------------------------------------------
// Proxy target
// ---------------------------------------------------------------------------

/// The invisible marker a minion's AI chases instead of a real creature.
///
/// Not `Clone`. [`ProxyTarget::destroy`] consumes it, so each marker is
/// released exactly once.
#[derive(Debug, PartialEq, Eq)]
pub struct ProxyTarget {
    marker: MarkerId,
}

impl ProxyTarget {
    /// Spawn a marker at `position`.
    pub fn spawn<W: Creatures + ?Sized>(world: &mut W, position: Vec3) -> Self {
        Self {
            marker: world.spawn_marker(position),
        }
    }

    /// The host marker id.
    #[must_use]
    pub fn marker(&self) -> MarkerId {
        self.marker
    }

    /// This proxy as an AI target.
    #[must_use]
    pub fn target(&self) -> TargetRef {
        TargetRef::Marker(self.marker)
    }

    /// Current marker position, if the host still has it.
    pub fn position<W: Creatures + ?Sized>(&self, world: &W) -> Option<Vec3> {
        world.marker_position(self.marker)
    }

    /// Move the marker.
    pub fn place<W: Creatures + ?Sized>(&self, world: &mut W, position: Vec3) -> bool {
        let placed = world.move_marker(self.marker, position);
        if !placed {
            warn!(marker = %self.marker, "proxy marker missing on host");
        }
        placed
    }

    /// Release the marker.
    pub fn destroy<W: Creatures + ?Sized>(self, world: &mut W) -> bool {
        world.destroy_marker(self.marker)
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Controller state for one minion.
#[derive(Debug)]
pub struct MinionRecord {
    /// Backing creature. Owned by the host.
    pub creature: CreatureId,
    /// Follow or stay.
    pub mode: Mode,
    /// True only while a push impulse is active.
    pub is_being_pushed: bool,
    proxy: ProxyTarget,
    /// Where the player was last visible from this minion.
    pub last_seen_player_position: Vec3,
    /// Last equipment check.
    pub last_equip_check: SimTime,
    /// Last quest-target unlock scan.
    pub last_quest_check: SimTime,
    /// Last regeneration step.
    pub last_regen: SimTime,
    /// The in-flight push-clear task, if any.
    pub push_task: Option<TaskToken>,
}

impl MinionRecord {
    /// Take control of `creature` in `mode`.
    ///
    /// Narrows the creature's senses to minion defaults, writes its display
    /// tag and spawns its proxy marker. Returns `None` if the host does not
    /// know the creature.
    pub fn attach<W: Creatures + ?Sized>(
        world: &mut W,
        creature: CreatureId,
        mode: Mode,
        now: SimTime,
        config: &MinionConfig,
    ) -> Option<Self> {
        let state = world.creature_mut(creature)?;
        let position = state.position;
        state.tag = format_tag(mode.into(), &state.name);
        if let Some(senses) = state.senses.as_mut() {
            senses.sight_radius = config.ranges.minion_sight;
            senses.hearing_radius = config.ranges.minion_hearing;
        }

        let proxy = ProxyTarget::spawn(world, position);
        let timing = &config.timing;
        Some(Self {
            creature,
            mode,
            is_being_pushed: false,
            proxy,
            last_seen_player_position: world.player().position,
            last_equip_check: now.after(timing.initial_equip_delay - timing.equip_interval),
            last_quest_check: now,
            last_regen: now,
            push_task: None,
        })
    }

    /// The record's proxy marker.
    #[must_use]
    pub fn proxy(&self) -> &ProxyTarget {
        &self.proxy
    }

    /// Whether this minion is following.
    #[must_use]
    pub fn is_following(&self) -> bool {
        self.mode.is_following()
    }

    /// Release control without touching the creature, e.g. when it left the
    /// world. Destroys the proxy.
    pub fn dismiss<W: Creatures + ?Sized>(self, world: &mut W) -> bool {
        debug!(creature = %self.creature, "minion record dismissed");
        self.proxy.destroy(world)
    }
}

/// Mutable per-tick context shared by every controller call in a pass.
pub struct TickContext<'a, R: Rng + ?Sized> {
    /// Tuning.
    pub config: &'a MinionConfig,
    /// Current time and frame.
    pub clock: TickClock,
    /// Randomness for jitter and rolls.
    pub rng: &'a mut R,
    /// Outgoing notifications.
    pub events: &'a mut Vec<MinionEvent>,
    /// Outcome counters.
    pub counters: &'a MinionCounters,
}

fn senses_mut<W: Creatures + ?Sized>(world: &mut W, creature: CreatureId) -> Option<&mut Senses> {
    world.creature_mut(creature)?.senses.as_mut()
}

fn clear_targets<W: Creatures + ?Sized>(world: &mut W, creature: CreatureId) {
    if let Some(senses) = senses_mut(world, creature) {
        senses.clear_targets();
    }
}

// ---------------------------------------------------------------------------
// Tick
// ---------------------------------------------------------------------------

/// Run one controller tick for `record`.
pub fn guide<W: World + ?Sized, R: Rng + ?Sized>(
    record: &mut MinionRecord,
    world: &mut W,
    ctx: &mut TickContext<'_, R>,
) {
    let _span = debug_span!(spans::GUIDE, creature = %record.creature).entered();
    let config = ctx.config;
    let Some(position) = world.creature(record.creature).map(|c| c.position) else {
        return;
    };

    let player = world.player();
    if PathOracle::new(&*world).can_see(position, player.position + Vec3::Y * EYE_HEIGHT, true) {
        record.last_seen_player_position = player.position;
    }

    if record.is_being_pushed {
        hold_push(record, world);
    } else if record.is_following() {
        let distance = follow_distance(&config.follow, ctx.rng);
        do_follow(record, world, ctx, distance);
    }

    refresh_volume(world, record.creature, config.behavior.volume);

    let now = ctx.clock.now;
    if now.since(record.last_equip_check) >= config.timing.equip_interval {
        record.last_equip_check = now;
        run_equipment_check(record.creature, world, ctx);
    }
    if now.since(record.last_quest_check) >= config.timing.quest_check_interval {
        record.last_quest_check = now;
        unlock_quest_targets(world, position, config.ranges.quest_radius);
    }
}

/// Roll this tick's follow distance.
pub fn follow_distance<R: Rng + ?Sized>(follow: &FollowConfig, rng: &mut R) -> f32 {
    let jitter = if follow.jitter_max > follow.jitter_min {
        rng.gen_range(follow.jitter_min..follow.jitter_max)
    } else {
        follow.jitter_min
    };
    follow.trigger_distance + jitter
}

fn hold_push<W: Creatures + ?Sized>(record: &MinionRecord, world: &mut W) {
    let proxy_position = record.proxy.position(world);
    let target = record.proxy.target();
    if let Some(senses) = senses_mut(world, record.creature) {
        senses.clear_targets();
        senses.enabled = false;
        senses.target = Some(target);
        senses.last_known_target_pos = proxy_position;
        senses.predicted_target_pos = proxy_position;
    }
}

/// While the proxy is the active target, make it perceivable to the
/// creature's own AI.
fn expose_proxy<W: Creatures + ?Sized>(record: &MinionRecord, world: &mut W, hearing: f32) {
    let proxy = record.proxy.target();
    if let Some(senses) = senses_mut(world, record.creature) {
        if senses.target == Some(proxy) {
            senses.hearing_radius = hearing;
            senses.target_detected = true;
        }
    }
}

// ---------------------------------------------------------------------------
// Follow policy
// ---------------------------------------------------------------------------

/// The follow policy for one tick at a given follow distance.
pub fn do_follow<W: World + ?Sized, R: Rng + ?Sized>(
    record: &mut MinionRecord,
    world: &mut W,
    ctx: &mut TickContext<'_, R>,
    follow_distance: f32,
) {
    let config = ctx.config;
    let follow = &config.follow;
    let id = record.creature;

    let Some(state) = world.creature(id) else {
        return;
    };
    let position = state.position;
    let Some(senses) = state.senses.as_ref() else {
        return;
    };
    let sensing_disabled = !senses.enabled;
    let current_target = senses.target;
    let target_in_sight = senses.target_in_sight;
    let distance = position.distance(world.player().position);

    if let Some(senses) = senses_mut(world, id) {
        senses.secondary_target = None;
        senses.draws_aggression = false;
    }

    let scan_due = ctx.clock.frame % follow.ambush_scan_interval_frames.max(1) == 0;
    let ambusher = if sensing_disabled && scan_due {
        target_nearby_enemies(&*world, id, follow.ambush_radius)
    } else {
        None
    };

    if let Some(enemy) = ambusher {
        if let Some(senses) = senses_mut(world, id) {
            senses.enabled = true;
            senses.target = Some(TargetRef::Creature(enemy));
        }
        debug!(creature = %id, %enemy, "follower engaging ambusher");
    } else {
        match current_target {
            None => {
                if distance > follow_distance {
                    begin_pursuit(record, world, follow);
                }
            }
            Some(target) if target == record.proxy.target() => {
                if distance <= follow_distance {
                    clear_targets(world, id);
                    debug!(creature = %id, distance, "follower arrived");
                } else {
                    begin_pursuit(record, world, follow);
                }
            }
            Some(target) => {
                review_engaged_target(record, world, follow, target, target_in_sight, distance);
            }
        }
    }

    if config.behavior.auto_teleport
        && distance > follow.teleport_distance
        && teleport_behind_player(world, id, follow)
    {
        MinionCounters::bump(&ctx.counters.teleports);
    }

    expose_proxy(record, world, follow.proxy_hearing_radius);
}

fn review_engaged_target<W: World + ?Sized>(
    record: &MinionRecord,
    world: &mut W,
    follow: &FollowConfig,
    target: TargetRef,
    target_in_sight: bool,
    player_distance: f32,
) {
    let id = record.creature;
    let Some(position) = world.creature(id).map(|c| c.position) else {
        return;
    };

    let passive = match target {
        TargetRef::Creature(other) => world.creature(other).is_some_and(|t| {
            !t.is_hostile() && t.senses.as_ref().is_none_or(|s| s.target.is_none())
        }),
        TargetRef::Player | TargetRef::Marker(_) => false,
    };
    let drop_reason = match target_position(&*world, target) {
        None => Some("target gone"),
        Some(at) if !target_in_sight && position.distance(at) > follow.unseen_drop_distance => {
            Some("target out of sight")
        }
        Some(_) if passive => Some("target is passive"),
        Some(_) => None,
    };

    if let Some(reason) = drop_reason {
        clear_targets(world, id);
        debug!(creature = %id, reason, "follower dropped target");
    }

    if player_distance > follow.abandon_fight_distance {
        clear_targets(world, id);
        begin_pursuit(record, world, follow);
        debug!(creature = %id, player_distance, "follower abandoned fight");
    } else if drop_reason.is_none() {
        if let Some(senses) = senses_mut(world, id) {
            senses.draws_aggression = true;
        }
    }
}

/// Aim the creature's AI at the proxy, placed one unit past where the
/// player was last seen.
pub fn begin_pursuit<W: Creatures + ?Sized>(
    record: &MinionRecord,
    world: &mut W,
    follow: &FollowConfig,
) {
    let Some(position) = world.creature(record.creature).map(|c| c.position) else {
        return;
    };
    let last_seen = record.last_seen_player_position;
    let proxy_position = last_seen + (last_seen - position).normalize_or_zero();
    record.proxy.place(world, proxy_position);

    let target = record.proxy.target();
    let Some(state) = world.creature_mut(record.creature) else {
        return;
    };
    if let Some(senses) = state.senses.as_mut() {
        senses.enabled = false;
        senses.target = Some(target);
        senses.secondary_target = Some(target);
        senses.old_last_known_target_pos = Some(proxy_position);
        senses.last_known_target_pos = Some(proxy_position);
        senses.predicted_target_pos = Some(proxy_position);
    }
    if let Some(motor) = state.motor.as_mut() {
        motor.give_up_timer = follow.give_up_timer;
    }
}

/// The closest hostile, visible, non-allied creature within `radius` of
/// `creature`. Doors block sight.
#[must_use]
pub fn target_nearby_enemies<W: Creatures + Physics + ?Sized>(
    world: &W,
    creature: CreatureId,
    radius: f32,
) -> Option<CreatureId> {
    let position = world.creature(creature)?.position;
    let oracle = PathOracle::new(world);
    world
        .creatures_near(position, radius)
        .into_iter()
        .filter(|&other| other != creature)
        .filter_map(|other| world.creature(other).map(|state| (other, state)))
        .filter(|(_, state)| state.is_hostile() && !state.is_ally())
        .filter(|(_, state)| oracle.can_see(position, state.position + Vec3::Y * EYE_HEIGHT, false))
        .min_by_key(|(_, state)| OrderedFloat(state.position.distance_squared(position)))
        .map(|(other, _)| other)
}

/// Move a straggler to a spot just behind the player, provided the player
/// is facing away from it and the spot is free. Returns whether it moved.
pub fn teleport_behind_player<W: World + ?Sized>(
    world: &mut W,
    creature: CreatureId,
    follow: &FollowConfig,
) -> bool {
    let Some(position) = world.creature(creature).map(|c| c.position) else {
        return false;
    };
    let player = world.player();
    let Some(facing) = Vec3::new(player.forward.x, 0.0, player.forward.z).try_normalize() else {
        return false;
    };
    let Some(to_player) = Vec3::new(
        player.position.x - position.x,
        0.0,
        player.position.z - position.z,
    )
    .try_normalize() else {
        return false;
    };
    if to_player.angle_between(facing).to_degrees() >= follow.teleport_view_angle {
        return false;
    }

    let eye = player.position + Vec3::Y * EYE_HEIGHT;
    if world
        .raycast(eye, -facing, TELEPORT_CLEARANCE, RayLayers::All)
        .is_some()
    {
        return false;
    }
    let spot = player.position - facing * TELEPORT_BEHIND + Vec3::Y;
    if world.sphere_blocked(spot, TELEPORT_SPACE_RADIUS) {
        return false;
    }
    if !PathOracle::new(&*world).has_floor(position, TELEPORT_FLOOR_PROBE) {
        return false;
    }

    world.teleport(creature, spot, facing);
    clear_targets(world, creature);
    debug!(%creature, "follower teleported behind player");
    true
}

// ---------------------------------------------------------------------------
// Push
// ---------------------------------------------------------------------------

/// Shove the minion away from the player. Cancels any in-flight push on the
/// same record and schedules the clear.
pub fn start_push<W: World + ?Sized>(
    record: &mut MinionRecord,
    world: &mut W,
    tasks: &mut TaskQueue,
    config: &MinionConfig,
    now: SimTime,
) -> bool {
    let Some(position) = world.creature(record.creature).map(|c| c.position) else {
        return false;
    };
    let player = world.player();
    let direction = Vec3::new(
        position.x - player.position.x,
        0.0,
        position.z - player.position.z,
    )
    .try_normalize()
    .unwrap_or(player.forward);

    let ranges = &config.ranges;
    let origin = position + Vec3::Y * EYE_HEIGHT;
    let destination = match world.raycast(origin, direction, ranges.push_probe, RayLayers::All) {
        Some(hit) if hit.surface.is_solid_static() => {
            Vec3::new(hit.point.x, position.y, hit.point.z) - direction * PUSH_STANDOFF
        }
        _ => position + direction * ranges.push_distance,
    };
    record.proxy.place(world, destination);

    if let Some(stale) = record.push_task.take() {
        tasks.cancel(stale);
    }
    record.is_being_pushed = true;
    record.push_task = Some(tasks.schedule(
        ResumeAt::Time(now.after(config.timing.push_duration)),
        Task::ClearPush {
            creature: record.creature,
        },
    ));
    debug!(creature = %record.creature, "push started");
    true
}

/// End a push if `token` is still the record's live push task.
pub fn finish_push(record: &mut MinionRecord, token: TaskToken) -> bool {
    if record.push_task != Some(token) {
        return false;
    }
    record.push_task = None;
    record.is_being_pushed = false;
    debug!(creature = %record.creature, "push cleared");
    true
}

// ---------------------------------------------------------------------------
// Periodic work
// ---------------------------------------------------------------------------

/// Set the creature's audio output from the configured tier.
pub fn refresh_volume<W: Creatures + ?Sized>(world: &mut W, creature: CreatureId, level: VolumeLevel) {
    let ambient = world.ambient_volume();
    if let Some(state) = world.creature_mut(creature) {
        state.audio = match level.scale() {
            Some(scale) => AudioOutput::Volume(ambient * scale),
            None => AudioOutput::Muted,
        };
    }
}

fn run_equipment_check<W: World + ?Sized, R: Rng + ?Sized>(
    creature: CreatureId,
    world: &mut W,
    ctx: &mut TickContext<'_, R>,
) {
    let _span = debug_span!(spans::EQUIPMENT).entered();
    let Some(action) = check_equipment(world, creature, ctx.config.ranges.loot_radius) else {
        return;
    };
    let name = world
        .creature(creature)
        .map(|c| c.name.clone())
        .unwrap_or_default();
    let event = match action {
        EquipAction::TookLoot { item } => {
            MinionCounters::bump(&ctx.counters.pickups);
            MinionEvent::TookItem { creature, name, item }
        }
        EquipAction::Equipped { item, .. } => {
            MinionCounters::bump(&ctx.counters.equips);
            MinionEvent::EquippedItem { creature, name, item }
        }
    };
    ctx.events.push(event);
}

/// Make hostile quest targets near `center` attackable by AI. Returns how
/// many were unlocked.
pub fn unlock_quest_targets<W: Creatures + ?Sized>(world: &mut W, center: Vec3, radius: f32) -> usize {
    let mut unlocked = 0;
    for id in world.creatures_near(center, radius) {
        let Some(state) = world.creature_mut(id) else {
            continue;
        };
        let hostile = state.is_hostile();
        if let Some(quest) = state.quest.as_mut() {
            if hostile && !quest.attackable_by_ai {
                quest.attackable_by_ai = true;
                unlocked += 1;
            }
        }
    }
    unlocked
}

/// Add one point of health, magic and stamina once per interval.
pub fn regenerate<W: Creatures + ?Sized>(
    record: &mut MinionRecord,
    world: &mut W,
    now: SimTime,
    interval: f32,
) -> bool {
    if now.since(record.last_regen) < interval {
        return false;
    }
    record.last_regen = now;
    match world.creature_mut(record.creature) {
        Some(state) => {
            state.resources.regenerate(1);
            true
        }
        None => false,
    }
}

/// Write the display tag for `status`.
pub fn set_tag<W: Creatures + ?Sized>(world: &mut W, creature: CreatureId, status: MinionStatus) {
    if let Some(state) = world.creature_mut(creature) {
        state.tag = format_tag(status, &state.name);
    }
}

/// Switch between following and staying, updating the tag and emitting a
/// notification. Capacity is the caller's business.
pub fn set_mode<W: Creatures + ?Sized>(
    record: &mut MinionRecord,
    world: &mut W,
    mode: Mode,
    events: &mut Vec<MinionEvent>,
) {
    record.mode = mode;
    set_tag(world, record.creature, mode.into());
    let creature = record.creature;
    match mode {
        Mode::Staying => {
            clear_targets(world, creature);
            events.push(MinionEvent::Staying { creature });
        }
        Mode::Following => events.push(MinionEvent::Following { creature }),
    }
    debug!(%creature, ?mode, "minion mode changed");
}

// ---------------------------------------------------------------------------
// Loyalty transitions
// ---------------------------------------------------------------------------

/// Turn a follower against the player.
pub fn provoke<W: Creatures + ?Sized>(world: &mut W, creature: CreatureId) {
    let Some(state) = world.creature_mut(creature) else {
        return;
    };
    state.team = Team::Hostile;
    if let Some(motor) = state.motor.as_mut() {
        motor.is_hostile = true;
    }
    if let Some(senses) = state.senses.as_mut() {
        senses.enabled = true;
        senses.target = Some(TargetRef::Player);
    }
}

/// Bring a minion that lost its ally flag back under control.
pub fn restore_loyalty<W: Creatures + ?Sized>(world: &mut W, creature: CreatureId) {
    let Some(state) = world.creature_mut(creature) else {
        return;
    };
    state.team = Team::PlayerAlly;
    if let Some(motor) = state.motor.as_mut() {
        motor.is_hostile = false;
    }
    if let Some(senses) = state.senses.as_mut() {
        senses.clear_targets();
    }
}

/// Release a minion for good. Consumes the record and destroys its proxy.
pub fn convert_renegade<W: Creatures + ?Sized>(
    record: MinionRecord,
    world: &mut W,
    config: &MinionConfig,
) -> MinionEvent {
    let creature = record.creature;
    let ambient = world.ambient_volume();
    let mut name = String::new();
    if let Some(state) = world.creature_mut(creature) {
        name.clone_from(&state.name);
        state.tag = format_tag(MinionStatus::Renegade, &state.name);
        state.audio = AudioOutput::Volume(ambient);
        if let Some(senses) = state.senses.as_mut() {
            senses.enabled = true;
            senses.sight_radius = config.ranges.renegade_sight;
            senses.hearing_radius = config.ranges.renegade_hearing;
        }
    }
    record.proxy.destroy(world);
    info!(%creature, %name, "minion turned renegade");
    MinionEvent::Renegade { creature, name }
}

//! Integration Tests: End-to-End Minion Scenarios
//!
//! These tests drive the registry against the in-memory world: capacity,
//! follow/stay toggles, loyalty loss, proxy lifetime, pushes, repositioning,
//! equipment and the periodic checks.

use minion_core::config::{MinionConfig, VolumeLevel};
use minion_core::host::{AudioOutput, Creatures, Loot, QuestTarget};
use minion_core::inventory::{EquipSlot, Item, ItemHands, ItemKind, WeaponKind};
use minion_core::tag::MinionStatus;
use minion_core::{
    CreatureId, InteractionMode, MinionError, MinionEvent, MinionRegistry, Mode, SimTime,
    TargetRef, Team, TickClock, Vec3,
};
use minion_world::bridge::{MOBILE_LICH, SpawnSpec};
use minion_world::components::{Block, STAND_HEIGHT};
use minion_world::hooks;
use minion_world::{MinionSystem, SimWorld, WorldConfig};

const ZOMBIE: u16 = 17;

fn config() -> MinionConfig {
    let mut config = MinionConfig::default();
    config.general.rng_seed = Some(7);
    config
}

fn registry() -> MinionRegistry {
    MinionRegistry::new(config())
}

fn world(willpower: i32) -> SimWorld {
    let mut world = SimWorld::with_floor(100.0);
    world.player_mut().willpower = willpower;
    world
}

fn ally(world: &mut SimWorld, x: f32, z: f32) -> CreatureId {
    world.spawn(SpawnSpec::ally("Zombie", ZOMBIE, Vec3::new(x, 0.0, z)).build())
}

fn at(seconds: f32, frame: u64) -> TickClock {
    TickClock::new(SimTime(seconds), frame)
}

fn distance_to_player(world: &SimWorld, id: CreatureId) -> f32 {
    let position = world.creature(id).expect("creature").position;
    position.distance(world.player().position)
}

fn place(world: &mut SimWorld, id: CreatureId, x: f32, z: f32) {
    world.creature_mut(id).expect("creature").position = Vec3::new(x, STAND_HEIGHT, z);
}

// ---------------------------------------------------------------------------
// Capacity and conversion
// ---------------------------------------------------------------------------

#[test]
fn new_minions_follow_until_capacity() {
    let mut world = world(89);
    let mut registry = registry();
    let ids: Vec<_> = (0..3).map(|i| ally(&mut world, 1.0 + i as f32, 1.0)).collect();

    let modes: Vec<_> = ids
        .iter()
        .map(|&id| registry.add_new(&mut world, id, SimTime::ZERO).expect("ally"))
        .collect();

    assert_eq!(modes, vec![Mode::Following, Mode::Following, Mode::Staying]);
    assert_eq!(registry.capacity(&world), 2);
    assert!(!registry.can_add_follower(&world));
    assert_eq!(world.creature(ids[2]).expect("c").tag, "Minion[Zombie]");
    assert_eq!(world.creature(ids[0]).expect("c").tag, "Follower[Zombie]");
}

#[test]
fn only_allies_become_minions() {
    let mut world = world(90);
    let mut registry = registry();
    let foe = world.spawn(SpawnSpec::hostile("Orc", 7, Vec3::new(3.0, 0.0, 0.0)).build());

    assert!(matches!(
        registry.add_new(&mut world, foe, SimTime::ZERO),
        Err(MinionError::NotAMinion(id)) if id == foe
    ));
    assert!(matches!(
        registry.add_new(&mut world, CreatureId::new(), SimTime::ZERO),
        Err(MinionError::CreatureNotFound(_))
    ));
    assert!(registry.is_empty());
    assert_eq!(world.marker_count(), 0);
}

#[test]
fn adding_twice_keeps_one_record() {
    let mut world = world(90);
    let mut registry = registry();
    let id = ally(&mut world, 1.0, 0.0);

    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");
    assert_eq!(registry.len(), 1);
    assert_eq!(world.marker_count(), 1);
}

#[test]
fn follow_refused_at_capacity_without_side_effects() {
    let mut world = world(30);
    let mut registry = registry();
    let leader = ally(&mut world, 1.0, 0.0);
    let waiting = ally(&mut world, -1.0, 0.0);
    registry.add_new(&mut world, leader, SimTime::ZERO).expect("ally");
    registry.add_new(&mut world, waiting, SimTime::ZERO).expect("ally");

    let handled = registry
        .activate(&mut world, waiting, InteractionMode::Converse, SimTime::ZERO)
        .expect("minion");

    assert!(handled);
    assert_eq!(registry.get(waiting).expect("record").mode, Mode::Staying);
    assert_eq!(registry.follower_count(), 1);
    assert_eq!(world.creature(waiting).expect("c").tag, "Minion[Zombie]");
    assert_eq!(
        registry.drain_events(),
        vec![MinionEvent::FollowDenied { creature: waiting }]
    );
}

#[test]
fn converse_toggles_follow_and_stay() {
    let mut world = world(30);
    let mut registry = registry();
    let first = ally(&mut world, 1.0, 0.0);
    let second = ally(&mut world, -1.0, 0.0);
    registry.add_new(&mut world, first, SimTime::ZERO).expect("ally");
    registry.add_new(&mut world, second, SimTime::ZERO).expect("ally");

    registry
        .activate(&mut world, first, InteractionMode::Converse, SimTime::ZERO)
        .expect("minion");
    registry
        .activate(&mut world, second, InteractionMode::Converse, SimTime::ZERO)
        .expect("minion");

    assert_eq!(registry.get(first).expect("r").mode, Mode::Staying);
    assert_eq!(registry.get(second).expect("r").mode, Mode::Following);
    assert_eq!(world.creature(second).expect("c").tag, "Follower[Zombie]");
    assert_eq!(
        registry.drain_events(),
        vec![
            MinionEvent::Staying { creature: first },
            MinionEvent::Following { creature: second },
        ]
    );
}

// ---------------------------------------------------------------------------
// World load
// ---------------------------------------------------------------------------

#[test]
fn initialize_reads_tags_and_is_idempotent() {
    let mut world = world(90);
    let staying = world.spawn(
        SpawnSpec::ally("Lich", MOBILE_LICH, Vec3::new(2.0, 0.0, 0.0))
            .with_status(MinionStatus::Staying)
            .build(),
    );
    let following = world.spawn(
        SpawnSpec::ally("Zombie", ZOMBIE, Vec3::new(-2.0, 0.0, 0.0))
            .with_status(MinionStatus::Following)
            .build(),
    );
    world.spawn(
        SpawnSpec::hostile("Zombie", ZOMBIE, Vec3::new(5.0, 0.0, 5.0))
            .with_status(MinionStatus::Renegade)
            .build(),
    );
    ally(&mut world, 0.0, 4.0);

    let mut registry = registry();
    hooks::on_world_load(&mut registry, &mut world, SimTime::ZERO);
    hooks::on_world_load(&mut registry, &mut world, SimTime::ZERO);

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.get(staying).expect("r").mode, Mode::Staying);
    assert_eq!(registry.get(following).expect("r").mode, Mode::Following);
    assert_eq!(world.marker_count(), 2);
    assert_eq!(world.marker_totals(), (4, 2));

    let senses = world.creature(following).expect("c").senses.clone().expect("senses");
    assert!((senses.sight_radius - 12.0).abs() < f32::EPSILON);
    assert!((senses.hearing_radius - 4.0).abs() < f32::EPSILON);
}

// ---------------------------------------------------------------------------
// Loyalty
// ---------------------------------------------------------------------------

#[test]
fn lost_minions_recover_about_one_time_in_five() {
    // willpower 40, max health 100: breaking modifier 20, so a 20% chance.
    let trials = 400;
    let mut kept = 0;
    for seed in 0..trials {
        let mut config = config();
        config.general.rng_seed = Some(seed);
        let mut registry = MinionRegistry::new(config);
        let mut world = world(40);
        let id = world.spawn(
            SpawnSpec::ally("Zombie", ZOMBIE, Vec3::new(1.0, 0.0, 0.0))
                .with_max_health(100)
                .build(),
        );
        registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");
        world.creature_mut(id).expect("c").team = Team::Hostile;

        registry.guide_all(&mut world, at(0.1, 1));

        if registry.contains(id) {
            kept += 1;
            assert!(world.creature(id).expect("c").is_ally());
        } else {
            assert!(!world.creature(id).expect("c").is_ally());
        }
    }
    assert!((50..110).contains(&kept), "kept {kept} of {trials}");
}

#[test]
fn excess_followers_turn_renegade() {
    let mut config = config();
    config.loyalty.strain_chance = 100;
    let mut registry = MinionRegistry::new(config);
    let mut world = world(30);
    let ids: Vec<_> = (0..3)
        .map(|i| {
            world.spawn(
                SpawnSpec::ally("Zombie", ZOMBIE, Vec3::new(i as f32, 0.0, 2.0))
                    .with_max_health(500)
                    .with_status(MinionStatus::Following)
                    .build(),
            )
        })
        .collect();
    registry.initialize(&mut world, SimTime::ZERO);
    assert_eq!(registry.follower_count(), 3);

    registry.guide_all(&mut world, at(0.1, 1));

    assert!(registry.is_empty());
    assert_eq!(world.marker_count(), 0);
    for id in &ids {
        let state = world.creature(*id).expect("c");
        assert!(state.tag.starts_with("Renegade["));
        let senses = state.senses.as_ref().expect("senses");
        assert!(senses.enabled);
        assert!((senses.sight_radius - 50.0).abs() < f32::EPSILON);
        assert!((senses.hearing_radius - 25.0).abs() < f32::EPSILON);
    }
    let events = registry.drain_events();
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| matches!(e, MinionEvent::Renegade { .. })));

    let stats = registry.counters().snapshot();
    assert_eq!(stats.strain_provocations, 3);
    assert_eq!(stats.renegades, 3);

    // Renegades are not picked up again on reload.
    registry.initialize(&mut world, SimTime(1.0));
    assert!(registry.is_empty());
}

fn saved_follower_that_lost_its_flag(world: &mut SimWorld) -> CreatureId {
    world.spawn(
        SpawnSpec::hostile("Zombie", ZOMBIE, Vec3::new(1.0, 0.0, 1.0))
            .with_status(MinionStatus::Following)
            .build(),
    )
}

#[test]
fn reloaded_follower_without_ally_flag_is_recovered() {
    // willpower 200 against max health 20: recovery is certain.
    let mut world = world(200);
    let id = saved_follower_that_lost_its_flag(&mut world);
    let mut registry = registry();

    registry.initialize(&mut world, SimTime::ZERO);
    assert!(registry.contains(id));

    registry.guide_all(&mut world, at(0.1, 1));
    assert!(registry.contains(id));
    let state = world.creature(id).expect("c");
    assert!(state.is_ally());
    assert!(!state.is_hostile());
    assert_eq!(state.tag, "Follower[Zombie]");
    assert_eq!(registry.counters().snapshot().recoveries, 1);
}

#[test]
fn reloaded_follower_without_ally_flag_can_turn_renegade() {
    let mut world = world(0);
    let id = saved_follower_that_lost_its_flag(&mut world);
    let mut registry = registry();

    registry.initialize(&mut world, SimTime::ZERO);
    registry.guide_all(&mut world, at(0.1, 1));

    assert!(!registry.contains(id));
    assert_eq!(world.creature(id).expect("c").tag, "Renegade[Zombie]");
    assert_eq!(world.marker_count(), 0);
    assert!(matches!(
        registry.drain_events().as_slice(),
        [MinionEvent::Renegade { creature, .. }] if *creature == id
    ));
}

// ---------------------------------------------------------------------------
// Proxy lifetime
// ---------------------------------------------------------------------------

#[test]
fn each_record_owns_exactly_one_proxy() {
    let mut world = world(120);
    let mut registry = registry();
    let ids: Vec<_> = (0..4).map(|i| ally(&mut world, i as f32, 2.0)).collect();
    for &id in &ids {
        registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");
    }
    assert_eq!(world.marker_count(), 4);

    let proxies: std::collections::HashSet<_> = registry
        .get_all(&mut world)
        .iter()
        .map(|r| r.proxy().marker())
        .collect();
    assert_eq!(proxies.len(), 4);

    world.despawn(ids[0]);
    world.set_active(ids[1], false);
    assert_eq!(registry.get_all(&mut world).len(), 2);
    assert_eq!(world.marker_count(), 2);
    assert_eq!(world.marker_totals(), (4, 2));

    hooks::on_world_unload(&mut registry, &mut world);
    assert_eq!(world.marker_totals(), (4, 4));
}

// ---------------------------------------------------------------------------
// Push
// ---------------------------------------------------------------------------

#[test]
fn second_push_replaces_the_first() {
    let mut world = world(60);
    let mut registry = registry();
    let id = ally(&mut world, 0.0, 2.0);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");

    assert!(hooks::on_activate(&mut registry, &mut world, id, InteractionMode::Grab, SimTime::ZERO));
    assert!(hooks::on_activate(&mut registry, &mut world, id, InteractionMode::Grab, SimTime(1.0)));
    assert_eq!(registry.tasks().pending_push_clears(id), 1);
    assert_eq!(registry.counters().snapshot().pushes, 2);

    // The first push would have ended at 1.5 s.
    registry.guide_all(&mut world, at(1.6, 1));
    let record = registry.get(id).expect("record");
    assert!(record.is_being_pushed);
    let proxy = record.proxy().target();
    let senses = world.creature(id).expect("c").senses.clone().expect("senses");
    assert!(!senses.enabled);
    assert_eq!(senses.target, Some(proxy));

    registry.guide_all(&mut world, at(2.5, 2));
    assert!(!registry.get(id).expect("record").is_being_pushed);
    assert!(registry.tasks().is_empty());
}

#[test]
fn push_lands_short_of_walls() {
    let mut world = world(60);
    world.add_block(Block::new(
        Vec3::new(-5.0, 0.0, 3.9),
        Vec3::new(5.0, 4.0, 4.1),
        minion_core::host::Surface::Mesh,
    ));
    let mut registry = registry();
    let id = ally(&mut world, 0.0, 2.0);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");

    registry
        .activate(&mut world, id, InteractionMode::Grab, SimTime::ZERO)
        .expect("minion");
    let marker = registry.get(id).expect("record").proxy().marker();
    let proxy = world.marker_position(marker).expect("marker");
    assert!((proxy.z - 3.8).abs() < 1e-4, "proxy at {proxy}");
}

#[test]
fn open_push_travels_full_distance() {
    let mut world = world(60);
    let mut registry = registry();
    let id = ally(&mut world, 2.0, 0.0);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");

    registry
        .activate(&mut world, id, InteractionMode::Grab, SimTime::ZERO)
        .expect("minion");
    let marker = registry.get(id).expect("record").proxy().marker();
    let proxy = world.marker_position(marker).expect("marker");
    assert!((proxy.x - 7.0).abs() < 1e-4, "proxy at {proxy}");
}

#[test]
fn pushed_minion_keeps_its_own_hearing() {
    let mut world = world(60);
    let mut registry = registry();
    let id = ally(&mut world, 0.0, 2.0);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");

    registry
        .activate(&mut world, id, InteractionMode::Grab, SimTime::ZERO)
        .expect("minion");
    registry.guide_all(&mut world, at(0.1, 1));

    let proxy = registry.get(id).expect("record").proxy().target();
    let senses = world.creature(id).expect("c").senses.clone().expect("senses");
    assert_eq!(senses.target, Some(proxy));
    assert!(!senses.target_detected);
    assert!((senses.hearing_radius - 4.0).abs() < f32::EPSILON);
}

#[test]
fn grab_out_of_reach_is_not_consumed() {
    let mut world = world(60);
    let mut registry = registry();
    let id = ally(&mut world, 0.0, 3.0);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");

    assert!(!hooks::on_activate(&mut registry, &mut world, id, InteractionMode::Grab, SimTime::ZERO));
    assert!(registry.tasks().is_empty());

    let stranger = ally(&mut world, 0.0, 1.0);
    assert!(!hooks::on_activate(&mut registry, &mut world, stranger, InteractionMode::Converse, SimTime::ZERO));
}

// ---------------------------------------------------------------------------
// Follow policy
// ---------------------------------------------------------------------------

fn fixed_distance_config(distance: f32) -> MinionConfig {
    let mut config = config();
    config.follow.trigger_distance = distance;
    config.follow.jitter_min = 0.0;
    config.follow.jitter_max = 0.0;
    config
}

#[test]
fn distant_follower_pursues_proxy() {
    let mut world = world(60);
    let mut registry = registry();
    let id = ally(&mut world, 10.0, 0.0);
    assert_eq!(hooks::on_creature_allied(&mut registry, &mut world, id, SimTime::ZERO).expect("ally"), Mode::Following);

    registry.guide_all(&mut world, at(0.1, 1));

    let proxy = registry.get(id).expect("record").proxy().target();
    let state = world.creature(id).expect("c");
    let senses = state.senses.as_ref().expect("senses");
    assert_eq!(senses.target, Some(proxy));
    assert_eq!(senses.secondary_target, Some(proxy));
    assert!(!senses.enabled);
    assert!(senses.target_detected);
    assert!((senses.hearing_radius - 20.0).abs() < f32::EPSILON);
    assert!((state.motor.expect("motor").give_up_timer - 200.0).abs() < f32::EPSILON);

    // One unit past the player, on the far side from the minion.
    let TargetRef::Marker(marker) = proxy else {
        panic!("proxy is a marker");
    };
    let spot = world.marker_position(marker).expect("marker");
    assert!((spot.x + 1.0).abs() < 1e-4, "proxy at {spot}");
}

#[test]
fn arrival_clears_target_inside_follow_distance() {
    let mut world = world(60);
    let mut registry = MinionRegistry::new(fixed_distance_config(2.8));
    let id = ally(&mut world, 10.0, 0.0);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");
    registry.guide_all(&mut world, at(0.1, 1));
    let proxy = registry.get(id).expect("record").proxy().target();

    place(&mut world, id, 3.5, 0.0);
    registry.guide_all(&mut world, at(0.2, 2));
    let senses = world.creature(id).expect("c").senses.clone().expect("senses");
    assert_eq!(senses.target, Some(proxy));

    place(&mut world, id, 2.5, 0.0);
    registry.guide_all(&mut world, at(0.3, 3));
    let senses = world.creature(id).expect("c").senses.clone().expect("senses");
    assert_eq!(senses.target, None);
    assert_eq!(senses.secondary_target, None);
    assert_eq!(senses.last_known_target_pos, None);
}

#[test]
fn staying_minion_does_not_pursue() {
    let mut world = world(0);
    let mut registry = registry();
    let id = ally(&mut world, 10.0, 0.0);
    assert_eq!(registry.add_new(&mut world, id, SimTime::ZERO).expect("ally"), Mode::Staying);

    registry.guide_all(&mut world, at(0.1, 1));
    let senses = world.creature(id).expect("c").senses.clone().expect("senses");
    assert_eq!(senses.target, None);
    assert!(senses.enabled);
}

#[test]
fn ambush_scan_engages_closest_visible_enemy() {
    let mut world = world(60);
    let mut registry = registry();
    let id = ally(&mut world, 8.0, 0.0);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");
    registry.guide_all(&mut world, at(0.1, 1));

    let near = world.spawn(SpawnSpec::hostile("Orc", 7, Vec3::new(8.0, 0.0, 4.0)).build());
    world.spawn(SpawnSpec::hostile("Orc", 7, Vec3::new(8.0, 0.0, -7.0)).build());

    // Not a scan frame.
    registry.guide_all(&mut world, at(0.2, 19));
    let senses = world.creature(id).expect("c").senses.clone().expect("senses");
    assert!(!senses.enabled);

    registry.guide_all(&mut world, at(0.3, 20));
    let senses = world.creature(id).expect("c").senses.clone().expect("senses");
    assert!(senses.enabled);
    assert_eq!(senses.target, Some(TargetRef::Creature(near)));
}

#[test]
fn walls_hide_ambushers() {
    let mut world = world(60);
    world.add_block(Block::new(
        Vec3::new(6.0, 0.0, 1.9),
        Vec3::new(10.0, 4.0, 2.1),
        minion_core::host::Surface::Door,
    ));
    let mut registry = registry();
    let id = ally(&mut world, 8.0, 0.0);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");
    registry.guide_all(&mut world, at(0.1, 1));
    world.spawn(SpawnSpec::hostile("Orc", 7, Vec3::new(8.0, 0.0, 4.0)).build());

    registry.guide_all(&mut world, at(0.2, 20));
    let senses = world.creature(id).expect("c").senses.clone().expect("senses");
    assert!(!senses.enabled);
}

#[test]
fn fights_are_abandoned_when_player_is_far() {
    let mut world = world(60);
    let mut registry = registry();
    let id = ally(&mut world, 13.0, 0.0);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");
    let foe = world.spawn(SpawnSpec::hostile("Orc", 7, Vec3::new(14.0, 0.0, 0.0)).build());
    {
        let senses = world.creature_mut(id).expect("c").senses.as_mut().expect("senses");
        senses.target = Some(TargetRef::Creature(foe));
        senses.target_in_sight = true;
    }

    registry.guide_all(&mut world, at(0.1, 1));
    let proxy = registry.get(id).expect("record").proxy().target();
    let senses = world.creature(id).expect("c").senses.clone().expect("senses");
    assert_eq!(senses.target, Some(proxy));
}

#[test]
fn nearby_fight_draws_aggression() {
    let mut world = world(60);
    let mut registry = registry();
    let id = ally(&mut world, 5.0, 0.0);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");
    let foe = world.spawn(SpawnSpec::hostile("Orc", 7, Vec3::new(6.0, 0.0, 0.0)).build());
    {
        let senses = world.creature_mut(id).expect("c").senses.as_mut().expect("senses");
        senses.target = Some(TargetRef::Creature(foe));
        senses.target_in_sight = true;
    }

    registry.guide_all(&mut world, at(0.1, 1));
    let senses = world.creature(id).expect("c").senses.clone().expect("senses");
    assert_eq!(senses.target, Some(TargetRef::Creature(foe)));
    assert!(senses.draws_aggression);
}

#[test]
fn passive_untargeted_creatures_are_left_alone() {
    let mut world = world(60);
    let mut registry = registry();
    let id = ally(&mut world, 2.0, 0.0);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");
    let deer = world.spawn(SpawnSpec::ally("Deer", 90, Vec3::new(3.0, 0.0, 0.0)).build());
    world.creature_mut(deer).expect("c").team = Team::Neutral;
    {
        let senses = world.creature_mut(id).expect("c").senses.as_mut().expect("senses");
        senses.target = Some(TargetRef::Creature(deer));
        senses.target_in_sight = true;
    }

    registry.guide_all(&mut world, at(0.1, 1));
    let senses = world.creature(id).expect("c").senses.clone().expect("senses");
    assert_eq!(senses.target, None);
}

#[test]
fn stragglers_teleport_behind_the_player() {
    let mut world = world(60);
    let mut registry = registry();
    let id = ally(&mut world, 0.0, -20.0);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");

    registry.guide_all(&mut world, at(0.1, 1));

    let position = world.creature(id).expect("c").position;
    assert!((position - Vec3::new(0.0, STAND_HEIGHT, -2.0)).length() < 1e-4, "at {position}");
    assert_eq!(registry.counters().snapshot().teleports, 1);
    assert_eq!(world.creature(id).expect("c").senses.as_ref().expect("s").target, None);
}

#[test]
fn no_teleport_while_player_looks_back() {
    let mut world = world(60);
    world.player_mut().forward = Vec3::NEG_Z;
    let mut registry = registry();
    let id = ally(&mut world, 0.0, -20.0);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");

    registry.guide_all(&mut world, at(0.1, 1));
    assert!((distance_to_player(&world, id) - 20.0).abs() < 1e-4);
    assert_eq!(registry.counters().snapshot().teleports, 0);
}

// ---------------------------------------------------------------------------
// Reposition
// ---------------------------------------------------------------------------

fn no_teleport_config() -> MinionConfig {
    let mut config = config();
    config.behavior.auto_teleport = false;
    config
}

#[test]
fn reposition_places_followers_one_per_tick() {
    let mut world = world(90);
    let mut registry = MinionRegistry::new(no_teleport_config());
    let a = ally(&mut world, 10.0, 0.0);
    let b = ally(&mut world, -10.0, 0.0);
    registry.add_new(&mut world, a, SimTime::ZERO).expect("ally");
    registry.add_new(&mut world, b, SimTime::ZERO).expect("ally");

    registry.reposition_all();
    assert!((distance_to_player(&world, a) - 10.0).abs() < 1e-4);

    registry.guide_all(&mut world, at(0.1, 1));
    assert!(distance_to_player(&world, a) <= 4.3);
    assert!((distance_to_player(&world, b) - 10.0).abs() < 1e-4);

    registry.guide_all(&mut world, at(0.2, 2));
    assert!(distance_to_player(&world, b) <= 4.3);
    assert!(!registry.tasks().has_reposition());
    assert_eq!(registry.counters().snapshot().repositions_placed, 2);
}

#[test]
fn blocked_reposition_leaves_follower_in_place() {
    // The player hovers over a void; only the follower has ground.
    let mut world = SimWorld::new();
    world.player_mut().willpower = 60;
    world.add_block(Block::new(
        Vec3::new(18.0, -1.0, -2.0),
        Vec3::new(22.0, 0.0, 2.0),
        minion_core::host::Surface::Terrain,
    ));
    let mut registry = MinionRegistry::new(no_teleport_config());
    let id = ally(&mut world, 20.0, 0.0);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");
    let before = world.creature(id).expect("c").position;

    registry.reposition_all();
    for frame in 1..4 {
        registry.guide_all(&mut world, at(0.1 * frame as f32, frame));
    }

    assert_eq!(world.creature(id).expect("c").position, before);
    assert_eq!(registry.counters().snapshot().repositions_exhausted, 1);
    assert!(registry.tasks().is_empty());
}

#[test]
fn reposition_reaches_through_doors() {
    // The player stands in a tight booth of doors; every free spot is outside.
    let mut world = world(60);
    for (min, max) in [
        (Vec3::new(-1.1, 0.0, -1.1), Vec3::new(-0.9, 4.0, 1.1)),
        (Vec3::new(0.9, 0.0, -1.1), Vec3::new(1.1, 4.0, 1.1)),
        (Vec3::new(-1.1, 0.0, -1.1), Vec3::new(1.1, 4.0, -0.9)),
        (Vec3::new(-1.1, 0.0, 0.9), Vec3::new(1.1, 4.0, 1.1)),
    ] {
        world.add_block(Block::new(min, max, minion_core::host::Surface::Door));
    }
    let mut registry = MinionRegistry::new(no_teleport_config());
    let id = ally(&mut world, 20.0, 0.0);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");

    registry.reposition_all();
    for frame in 1..4 {
        registry.guide_all(&mut world, at(0.1 * frame as f32, frame));
    }

    let stats = registry.counters().snapshot();
    assert_eq!(stats.repositions_placed, 1);
    assert_eq!(stats.repositions_exhausted, 0);
    let position = world.creature(id).expect("c").position;
    assert!(position.x.abs() > 1.0 || position.z.abs() > 1.0, "at {position}");
    assert!(distance_to_player(&world, id) <= 4.3);
}

#[test]
fn close_followers_are_not_repositioned() {
    let mut world = world(60);
    let mut registry = MinionRegistry::new(no_teleport_config());
    let id = ally(&mut world, 4.0, 0.0);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");
    let before = world.creature(id).expect("c").position;

    hooks::on_fast_travel(&mut registry);
    registry.guide_all(&mut world, at(0.1, 1));
    assert_eq!(world.creature(id).expect("c").position, before);
}

// ---------------------------------------------------------------------------
// Periodic work
// ---------------------------------------------------------------------------

#[test]
fn lich_picks_up_then_equips_a_staff() {
    let mut world = world(60);
    let mut registry = registry();
    let id = world.spawn(SpawnSpec::ally("Lich", MOBILE_LICH, Vec3::new(1.0, 0.0, 0.0)).build());
    let staff = Item::new(
        "Staff of Ash",
        ItemKind::Weapon {
            hands: ItemHands::Both,
            weapon: WeaponKind::Staff,
        },
        50,
        10,
    );
    let staff_id = staff.id;
    let loot = world.add_loot(Vec3::new(1.0, STAND_HEIGHT, 0.5), true, vec![staff]);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");

    registry.guide_all(&mut world, at(3.9, 1));
    assert!(world.creature(id).expect("c").inventory.is_empty());

    registry.guide_all(&mut world, at(4.0, 2));
    assert!(world.creature(id).expect("c").inventory.get(staff_id).is_some());
    assert!(world.container(loot).is_none());

    registry.guide_all(&mut world, at(6.0, 3));
    let inventory = &world.creature(id).expect("c").inventory;
    assert_eq!(inventory.equipped_in(EquipSlot::RightHand).map(|i| i.id), Some(staff_id));

    let events = registry.drain_events();
    assert!(matches!(&events[0], MinionEvent::TookItem { item, .. } if item == "Staff of Ash"));
    assert!(matches!(&events[1], MinionEvent::EquippedItem { item, .. } if item == "Staff of Ash"));
}

#[test]
fn foreign_loot_is_ignored() {
    let mut world = world(60);
    let mut registry = registry();
    let id = world.spawn(SpawnSpec::ally("Lich", MOBILE_LICH, Vec3::new(1.0, 0.0, 0.0)).build());
    let amulet = Item::new("Amulet", ItemKind::Amulet, 10, 10);
    world.add_loot(Vec3::new(1.0, STAND_HEIGHT, 0.0), false, vec![amulet]);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");

    registry.guide_all(&mut world, at(4.0, 1));
    assert!(world.creature(id).expect("c").inventory.is_empty());
}

#[test]
fn hostile_quest_targets_become_attackable() {
    let mut world = world(60);
    let mut registry = registry();
    let id = ally(&mut world, 1.0, 0.0);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");
    let mut boss = SpawnSpec::hostile("Necromancer", 120, Vec3::new(4.0, 0.0, 0.0)).build();
    boss.quest = Some(QuestTarget::default());
    let boss = world.spawn(boss);

    registry.guide_all(&mut world, at(0.5, 1));
    assert!(!world.creature(boss).expect("c").quest.expect("quest").attackable_by_ai);

    registry.guide_all(&mut world, at(1.0, 2));
    assert!(world.creature(boss).expect("c").quest.expect("quest").attackable_by_ai);
}

#[test]
fn regeneration_ticks_every_ten_seconds() {
    let mut world = world(60);
    let mut registry = registry();
    let id = ally(&mut world, 1.0, 0.0);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");
    world.creature_mut(id).expect("c").resources.health = 5;

    registry.guide_all(&mut world, at(9.0, 1));
    assert_eq!(world.creature(id).expect("c").resources.health, 5);
    registry.guide_all(&mut world, at(10.0, 2));
    assert_eq!(world.creature(id).expect("c").resources.health, 6);
}

#[test]
fn volume_follows_configured_tier() {
    let mut config = config();
    config.behavior.volume = VolumeLevel::Low;
    let mut registry = MinionRegistry::new(config);
    let mut world = world(60);
    world.set_ambient_volume(0.5);
    let id = ally(&mut world, 1.0, 0.0);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");

    registry.guide_all(&mut world, at(0.1, 1));
    let AudioOutput::Volume(volume) = world.creature(id).expect("c").audio else {
        panic!("expected audible minion");
    };
    assert!((volume - 0.1).abs() < 1e-6);
}

#[test]
fn long_rest_restores_and_gathers() {
    let mut world = world(60);
    let mut registry = MinionRegistry::new(no_teleport_config());
    let id = ally(&mut world, 12.0, 0.0);
    registry.add_new(&mut world, id, SimTime::ZERO).expect("ally");
    world.creature_mut(id).expect("c").resources.health = 1;

    hooks::on_long_rest(&mut registry, &mut world);
    let resources = world.creature(id).expect("c").resources;
    assert_eq!(resources.health, resources.max_health);
    assert!(registry.tasks().has_reposition());

    registry.guide_all(&mut world, at(0.1, 1));
    assert!(distance_to_player(&world, id) <= 4.3);
}

// ---------------------------------------------------------------------------
// Whole system
// ---------------------------------------------------------------------------

#[test]
fn followers_walk_to_the_player() {
    let mut world = world(60);
    let mut system = MinionSystem::new(&WorldConfig::default());
    let id = ally(&mut world, 10.0, 0.0);
    let now = system.now();
    hooks::on_creature_allied(system.registry_mut(), &mut world, id, now).expect("ally");

    system.run(&mut world, 150, 1.0 / 30.0);

    assert!(distance_to_player(&world, id) < 3.5);
    assert!(system.hud().is_empty());
    assert_eq!(system.stats().renegades, 0);
}

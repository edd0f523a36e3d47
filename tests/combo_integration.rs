//! Combo subsystem integration tests
//!
//! Full chain traversal, drop/recovery cycling, and buffer discipline
//! through the public API, driven by a manual clock.

use std::sync::Arc;

use falchion::attack::demo;
use falchion::attack::{ChainFamily, InputDirection, InputKind};
use falchion::combo::{ComboState, ComboSystem};
use falchion::core::clock::ManualClock;
use falchion::core::config::ComboTuning;
use falchion::core::events::{CombatEvent, EventLog};
use falchion::core::types::ActorId;

fn setup() -> (Arc<ManualClock>, ComboSystem, ActorId) {
    let clock = Arc::new(ManualClock::new());
    let mut system = ComboSystem::new(
        clock.clone(),
        ComboTuning::default(),
        Arc::new(demo::library()),
        demo::chains(),
        demo::move_set(),
    );
    let actor = ActorId::new();
    system.register_actor(actor);
    (clock, system, actor)
}

/// An empty buffer resolves nothing and mutates nothing.
#[test]
fn test_empty_buffer_scenario() {
    let (_clock, mut system, actor) = setup();

    assert_eq!(system.next_attack(actor), None);
    assert_eq!(system.state(actor), Some(ComboState::Idle));
    assert_eq!(system.hit_count(actor), 0);
    assert_eq!(system.buffered_len(actor), 0);
}

/// Buffering light across successive cancel windows visits
/// chain positions 0, 1, 2 and then holds without overrunning.
#[test]
fn test_light_chain_ordering() {
    let (clock, mut system, actor) = setup();
    let mut log = EventLog::new();

    system.buffer_input(actor, InputKind::Light, InputDirection::Neutral);
    let opener = system.next_attack(actor).unwrap();
    assert_eq!(opener, demo::JAB);
    system.start_attack(actor, opener);
    assert_eq!(system.chain_position(actor, ChainFamily::Light), Some(0));

    let mut visited = vec![0];
    // Walk the windows: jab -> cross -> finisher, then hold
    for (buffer_at, update_at) in [(100, 150), (400, 480), (700, 760), (1000, 1060)] {
        clock.set(buffer_at);
        system.buffer_input(actor, InputKind::Light, InputDirection::Neutral);
        clock.set(update_at);
        system.update(&mut log);
        if let Some(position) = system.chain_position(actor, ChainFamily::Light) {
            if visited.last() != Some(&position) {
                visited.push(position);
            }
        }
    }

    assert_eq!(visited, vec![0, 1, 2]);
    assert_eq!(system.chain_position(actor, ChainFamily::Light), Some(2));
}

/// A stale combo drops once, then a later update alone
/// returns the actor to Idle.
#[test]
fn test_drop_and_recovery_cycle() {
    let (clock, mut system, actor) = setup();
    let mut log = EventLog::new();

    system.start_attack(actor, demo::JAB);
    clock.set(100);
    system.register_hit(actor);
    assert_eq!(system.hit_count(actor), 1);

    // Quiet past the drop timeout
    clock.set(100 + ComboTuning::default().drop_timeout_ms + 1);
    system.update(&mut log);
    assert_eq!(system.state(actor), Some(ComboState::Dropped));
    assert_eq!(system.hit_count(actor), 0);
    assert_eq!(
        log.events,
        vec![CombatEvent::ComboDropped { actor, hits: 1 }]
    );

    // The cooldown is re-checked against the clock on a later update; no
    // external call needed
    clock.advance(ComboTuning::default().dropped_cooldown_ms);
    system.update(&mut log);
    assert_eq!(system.state(actor), Some(ComboState::Idle));
    assert_eq!(log.len(), 1);
}

/// Chain position resets with the combo drop, so the next opener starts the
/// family over at position 0.
#[test]
fn test_chain_position_resets_on_drop() {
    let (clock, mut system, actor) = setup();
    let mut log = EventLog::new();

    system.start_attack(actor, demo::CROSS);
    system.register_hit(actor);
    assert_eq!(system.chain_position(actor, ChainFamily::Light), Some(1));

    clock.set(2000);
    system.update(&mut log);
    assert_eq!(system.state(actor), Some(ComboState::Dropped));
    assert_eq!(system.chain_position(actor, ChainFamily::Light), None);

    system.buffer_input(actor, InputKind::Light, InputDirection::Neutral);
    let opener = system.next_attack(actor).unwrap();
    system.start_attack(actor, opener);
    assert_eq!(system.chain_position(actor, ChainFamily::Light), Some(0));
}

/// A buffered rising input interrupts recovery through the cancel window.
#[test]
fn test_rising_cancel_through_update() {
    let (clock, mut system, actor) = setup();
    let mut log = EventLog::new();

    system.start_attack(actor, demo::JAB);

    clock.set(150); // jab post-active window
    system.buffer_input(actor, InputKind::Heavy, InputDirection::Up);
    system.update(&mut log);

    assert_eq!(system.current_attack(actor), Some(demo::RISING_CUT));
    assert!(log
        .iter()
        .any(|event| matches!(event, CombatEvent::AttackChained { attack, .. } if *attack == demo::RISING_CUT)));
}

/// Inputs buffered before the window opened still count if they have not
/// expired; inputs older than the window never resolve.
#[test]
fn test_buffer_window_boundaries() {
    let (clock, mut system, actor) = setup();
    let mut log = EventLog::new();

    system.start_attack(actor, demo::JAB);

    // Buffered during startup, consumed when the window opens 110 ms later
    clock.set(30);
    system.buffer_input(actor, InputKind::Light, InputDirection::Neutral);
    clock.set(150);
    system.update(&mut log);
    assert_eq!(system.current_attack(actor), Some(demo::CROSS));

    // An input left to rot never resolves
    clock.set(600);
    system.buffer_input(actor, InputKind::Light, InputDirection::Neutral);
    clock.set(600 + ComboTuning::default().buffer_window_ms + 1);
    assert_eq!(system.next_attack(actor), None);
    assert_eq!(system.buffered_len(actor), 0);
}

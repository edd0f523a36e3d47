//! Input buffering, chain traversal, and cancel-window gating
//!
//! The buffer is a sliding window: expired inputs are discarded in one
//! bounded front-to-back pass and are never consumed. Resolution looks at
//! the oldest surviving input only; consuming it is the success path,
//! leaving it is the failure path.

use std::sync::Arc;

use ahash::AHashMap;

use crate::attack::chains::{ChainFamily, ChainTable, MoveSet};
use crate::attack::definition::{AttackDefinition, AttackLibrary, AttackPhase};
use crate::attack::input::{BufferedInput, InputDirection, InputKind};
use crate::core::clock::Clock;
use crate::core::config::ComboTuning;
use crate::core::events::{CombatEvent, EventSink};
use crate::core::types::{ActorId, AttackId, TimeMs};
use crate::combo::record::{ComboRecord, ComboState};

/// Per-actor combo state and chain resolution
pub struct ComboSystem {
    clock: Arc<dyn Clock>,
    tuning: ComboTuning,
    library: Arc<AttackLibrary>,
    chains: ChainTable,
    moves: MoveSet,
    records: AHashMap<ActorId, ComboRecord>,
    /// Registration order; sweeps follow it so event order is stable
    roster: Vec<ActorId>,
}

impl ComboSystem {
    pub fn new(
        clock: Arc<dyn Clock>,
        tuning: ComboTuning,
        library: Arc<AttackLibrary>,
        chains: ChainTable,
        moves: MoveSet,
    ) -> Self {
        Self {
            clock,
            tuning,
            library,
            chains,
            moves,
            records: AHashMap::new(),
            roster: Vec::new(),
        }
    }

    /// Create the actor's record; re-registration resets it
    pub fn register_actor(&mut self, actor: ActorId) {
        if self.records.insert(actor, ComboRecord::new()).is_none() {
            self.roster.push(actor);
        }
    }

    pub fn unregister_actor(&mut self, actor: ActorId) {
        if self.records.remove(&actor).is_some() {
            self.roster.retain(|id| *id != actor);
        }
    }

    pub fn is_registered(&self, actor: ActorId) -> bool {
        self.records.contains_key(&actor)
    }

    /// Append a timestamped input, discarding expired entries first and the
    /// oldest entry when the capacity cap is hit
    pub fn buffer_input(&mut self, actor: ActorId, kind: InputKind, direction: InputDirection) {
        let now = self.clock.now();
        let window = self.tuning.buffer_window_ms;
        let capacity = self.tuning.buffer_capacity;
        let Some(record) = self.records.get_mut(&actor) else {
            return;
        };
        Self::prune_buffer(record, now, window);
        while record.buffer.len() >= capacity {
            record.buffer.pop_front();
        }
        record.buffer.push_back(BufferedInput { kind, direction, at: now });
    }

    /// Resolve the oldest buffered input into an attack id for the current
    /// state. Consumes the input on success; leaves the buffer untouched on
    /// failure.
    pub fn next_attack(&mut self, actor: ActorId) -> Option<AttackId> {
        let now = self.clock.now();
        let window = self.tuning.buffer_window_ms;
        {
            let record = self.records.get_mut(&actor)?;
            Self::prune_buffer(record, now, window);
        }
        let record = self.records.get(&actor)?;
        let input = *record.buffer.front()?;

        let resolved = match record.state {
            ComboState::Idle | ComboState::Dropped => self.initiate(input),
            ComboState::Attacking => {
                let id = record.current_attack?;
                let current = self.library.get(id)?;
                match current.phase_at(now.saturating_sub(record.attack_started_at)) {
                    AttackPhase::Active | AttackPhase::Recovery => {
                        self.continue_chain(record, current, input)
                    }
                    AttackPhase::Startup | AttackPhase::Done => None,
                }
            }
            ComboState::CancelWindow => match record.current_attack {
                Some(id) => {
                    let current = self.library.get(id)?;
                    self.continue_chain(record, current, input)
                }
                // Recovery fully elapsed with the combo alive: the chain
                // context is gone, so fresh inputs initiate
                None => self.initiate(input),
            },
        };

        if resolved.is_some() {
            if let Some(record) = self.records.get_mut(&actor) {
                record.buffer.pop_front();
            }
        }
        resolved
    }

    /// Start an attack now: stamps the start time and the actor's position
    /// in every chain the attack is a link of
    pub fn start_attack(&mut self, actor: ActorId, attack: AttackId) -> bool {
        if !self.library.contains(attack) {
            tracing::warn!(?actor, ?attack, "start_attack with unknown attack id");
            return false;
        }
        let now = self.clock.now();
        let Some(record) = self.records.get_mut(&actor) else {
            return false;
        };
        record.current_attack = Some(attack);
        record.attack_started_at = now;
        record.state = ComboState::Attacking;
        record.cancel_available = false;
        for family in ChainFamily::all() {
            if let Some(position) = self.chains.position_of(*family, attack) {
                record.chain_positions.insert(*family, position);
            }
        }
        true
    }

    /// A hit of the actor's attack connected
    pub fn register_hit(&mut self, actor: ActorId) {
        let now = self.clock.now();
        if let Some(record) = self.records.get_mut(&actor) {
            record.hit_count += 1;
            record.last_hit_at = now;
        }
    }

    /// Per-frame advancement: drop timeouts, attack phase progression, and
    /// cancel-window chaining, in that order per actor
    pub fn update(&mut self, sink: &mut dyn EventSink) {
        let now = self.clock.now();
        let roster = self.roster.clone();
        for actor in roster {
            self.update_actor(actor, now, sink);
        }
    }

    fn update_actor(&mut self, actor: ActorId, now: TimeMs, sink: &mut dyn EventSink) {
        let Some(record) = self.records.get_mut(&actor) else {
            return;
        };

        // (1) drop timeout, then the Dropped -> Idle cooldown on a later call
        if record.hit_count > 0
            && now.saturating_sub(record.last_hit_at) > self.tuning.drop_timeout_ms
        {
            let hits = record.hit_count;
            record.drop_combo(now);
            tracing::debug!(?actor, hits, "combo dropped");
            sink.emit(CombatEvent::ComboDropped { actor, hits });
            return;
        }
        if record.state == ComboState::Dropped {
            // Re-validated against the injected clock; no host timer involved
            if now.saturating_sub(record.dropped_at) >= self.tuning.dropped_cooldown_ms {
                record.state = ComboState::Idle;
            }
            return;
        }

        // (2) attack phase progression
        if let (ComboState::Attacking | ComboState::CancelWindow, Some(id)) =
            (record.state, record.current_attack)
        {
            if let Some(current) = self.library.get(id) {
                let elapsed = now.saturating_sub(record.attack_started_at);
                if elapsed >= current.total_ms() {
                    record.current_attack = None;
                    if record.hit_count > 0 {
                        record.state = ComboState::CancelWindow;
                        record.cancel_available = true;
                    } else {
                        record.state = ComboState::Idle;
                        record.cancel_available = false;
                    }
                } else if record.state == ComboState::Attacking
                    && elapsed >= current.startup_ms + current.active_ms
                {
                    record.state = ComboState::CancelWindow;
                    record.cancel_available = true;
                }
            } else {
                tracing::warn!(?actor, ?id, "current attack missing from library");
                record.current_attack = None;
                record.state = ComboState::Idle;
            }
        }

        // (3) cancel-window chaining
        if self.records.get(&actor).map(|r| r.state) == Some(ComboState::CancelWindow) {
            if let Some(record) = self.records.get_mut(&actor) {
                record.cancel_available = true;
            }
            if let Some(next) = self.next_attack(actor) {
                self.start_attack(actor, next);
                tracing::debug!(?actor, attack = ?next, "attack chained");
                sink.emit(CombatEvent::AttackChained { actor, attack: next });
            }
        }
    }

    /// Force the actor back to Idle with everything cleared
    pub fn reset(&mut self, actor: ActorId) {
        if let Some(record) = self.records.get_mut(&actor) {
            record.reset();
        }
    }

    pub fn state(&self, actor: ActorId) -> Option<ComboState> {
        self.records.get(&actor).map(|record| record.state)
    }

    pub fn hit_count(&self, actor: ActorId) -> u32 {
        self.records.get(&actor).map_or(0, |record| record.hit_count)
    }

    pub fn current_attack(&self, actor: ActorId) -> Option<AttackId> {
        self.records.get(&actor).and_then(|record| record.current_attack)
    }

    pub fn is_cancel_available(&self, actor: ActorId) -> bool {
        self.records
            .get(&actor)
            .is_some_and(|record| record.cancel_available)
    }

    pub fn chain_position(&self, actor: ActorId, family: ChainFamily) -> Option<usize> {
        self.records
            .get(&actor)
            .and_then(|record| record.chain_position(family))
    }

    pub fn buffered_len(&self, actor: ActorId) -> usize {
        self.records.get(&actor).map_or(0, ComboRecord::buffered_len)
    }

    /// Raw record access for debugging overlays
    pub fn record(&self, actor: ActorId) -> Option<&ComboRecord> {
        self.records.get(&actor)
    }

    /// Initiation table for actors with no attack in progress
    fn initiate(&self, input: BufferedInput) -> Option<AttackId> {
        match (input.kind, input.direction) {
            (InputKind::Heavy, InputDirection::Up) => Some(self.moves.rising),
            (InputKind::Light, _) => self.chains.first(ChainFamily::Light),
            (InputKind::Heavy, _) => self.chains.first(ChainFamily::Heavy),
            (InputKind::Force, InputDirection::Back) => Some(self.moves.force_pull),
            (InputKind::Force, _) => Some(self.moves.force_push),
            (InputKind::Special, _) => Some(self.moves.special),
        }
    }

    /// Chain-continuation lookup against the attack in progress, in fixed
    /// rule order
    fn continue_chain(
        &self,
        record: &ComboRecord,
        current: &AttackDefinition,
        input: BufferedInput,
    ) -> Option<AttackId> {
        // (1) upward heavy resolves to the rising attack when explicitly
        //     permitted; a terminal attack always allows it
        if input.kind == InputKind::Heavy
            && input.direction == InputDirection::Up
            && (current.is_terminal() || current.can_cancel_into(self.moves.rising))
        {
            return Some(self.moves.rising);
        }

        // (2) force variants need explicit permission
        if input.kind == InputKind::Force {
            let id = if input.direction == InputDirection::Back {
                self.moves.force_pull
            } else {
                self.moves.force_push
            };
            return current.can_cancel_into(id).then_some(id);
        }

        // (3) same-input chain continuation: advance if the next link is
        //     permitted, else restart if the opener is
        let family = input.kind.chain_family()?;
        let chain = self.chains.sequence(family)?;
        if let Some(position) = record.chain_position(family) {
            if let Some(next) = chain.get(position + 1).copied() {
                if current.can_cancel_into(next) {
                    return Some(next);
                }
            }
        }
        let opener = chain.first().copied()?;
        current.can_cancel_into(opener).then_some(opener)
    }

    fn prune_buffer(record: &mut ComboRecord, now: TimeMs, window: TimeMs) {
        // One bounded pass: the buffer is time-ordered, so every expired
        // entry sits at the front
        while record
            .buffer
            .front()
            .is_some_and(|input| now.saturating_sub(input.at) > window)
        {
            record.buffer.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::demo;
    use crate::core::clock::ManualClock;
    use crate::core::events::EventLog;

    fn system() -> (Arc<ManualClock>, ComboSystem) {
        let clock = Arc::new(ManualClock::new());
        let system = ComboSystem::new(
            clock.clone(),
            ComboTuning::default(),
            Arc::new(demo::library()),
            demo::chains(),
            demo::move_set(),
        );
        (clock, system)
    }

    fn registered() -> (Arc<ManualClock>, ComboSystem, ActorId) {
        let (clock, mut system) = system();
        let actor = ActorId::new();
        system.register_actor(actor);
        (clock, system, actor)
    }

    #[test]
    fn test_empty_buffer_resolves_nothing_and_mutates_nothing() {
        let (_clock, mut system, actor) = registered();

        assert_eq!(system.next_attack(actor), None);
        assert_eq!(system.state(actor), Some(ComboState::Idle));
        assert_eq!(system.buffered_len(actor), 0);
    }

    #[test]
    fn test_unregistered_actor_is_neutral() {
        let (_clock, mut system) = system();
        let ghost = ActorId::new();

        system.buffer_input(ghost, InputKind::Light, InputDirection::Neutral);
        assert_eq!(system.next_attack(ghost), None);
        assert!(!system.start_attack(ghost, demo::JAB));
        assert_eq!(system.state(ghost), None);
        assert_eq!(system.hit_count(ghost), 0);
    }

    #[test]
    fn test_initiation_table() {
        let cases = [
            (InputKind::Light, InputDirection::Neutral, demo::JAB),
            (InputKind::Heavy, InputDirection::Neutral, demo::OVERHEAD),
            (InputKind::Heavy, InputDirection::Up, demo::RISING_CUT),
            (InputKind::Force, InputDirection::Neutral, demo::FORCE_PUSH),
            (InputKind::Force, InputDirection::Back, demo::FORCE_PULL),
            (InputKind::Special, InputDirection::Neutral, demo::BURST),
        ];

        for (kind, direction, expected) in cases {
            let (_clock, mut system, actor) = registered();
            system.buffer_input(actor, kind, direction);
            assert_eq!(system.next_attack(actor), Some(expected), "{kind:?} {direction:?}");
            // Consumed on success
            assert_eq!(system.buffered_len(actor), 0);
        }
    }

    #[test]
    fn test_expired_inputs_are_discarded_not_consumed() {
        let (clock, mut system, actor) = registered();

        system.buffer_input(actor, InputKind::Light, InputDirection::Neutral);
        clock.advance(401);

        assert_eq!(system.next_attack(actor), None);
        assert_eq!(system.buffered_len(actor), 0);
    }

    #[test]
    fn test_buffer_capacity_evicts_oldest() {
        let (_clock, mut system, actor) = registered();

        for _ in 0..ComboTuning::default().buffer_capacity {
            system.buffer_input(actor, InputKind::Light, InputDirection::Neutral);
        }
        system.buffer_input(actor, InputKind::Special, InputDirection::Neutral);

        assert_eq!(
            system.buffered_len(actor),
            ComboTuning::default().buffer_capacity
        );
    }

    #[test]
    fn test_start_attack_stamps_chain_position() {
        let (_clock, mut system, actor) = registered();

        assert!(system.start_attack(actor, demo::CROSS));
        assert_eq!(system.state(actor), Some(ComboState::Attacking));
        assert_eq!(system.current_attack(actor), Some(demo::CROSS));
        assert_eq!(system.chain_position(actor, ChainFamily::Light), Some(1));
        assert_eq!(system.chain_position(actor, ChainFamily::Heavy), None);
    }

    #[test]
    fn test_no_resolution_during_startup() {
        let (clock, mut system, actor) = registered();
        system.start_attack(actor, demo::JAB);

        clock.advance(40); // still in the 80 ms startup
        system.buffer_input(actor, InputKind::Light, InputDirection::Neutral);
        assert_eq!(system.next_attack(actor), None);
        assert_eq!(system.buffered_len(actor), 1);
    }

    #[test]
    fn test_explicit_cancel_during_active_phase() {
        let (clock, mut system, actor) = registered();
        system.start_attack(actor, demo::JAB);

        clock.advance(100); // active phase
        system.buffer_input(actor, InputKind::Heavy, InputDirection::Up);
        assert_eq!(system.next_attack(actor), Some(demo::RISING_CUT));
    }

    #[test]
    fn test_force_cancel_needs_explicit_permission() {
        let (clock, mut system, actor) = registered();

        // Jab permits both force variants
        system.start_attack(actor, demo::JAB);
        clock.advance(100);
        system.buffer_input(actor, InputKind::Force, InputDirection::Back);
        assert_eq!(system.next_attack(actor), Some(demo::FORCE_PULL));

        // Cross permits neither
        system.start_attack(actor, demo::CROSS);
        clock.advance(150);
        system.buffer_input(actor, InputKind::Force, InputDirection::Neutral);
        assert_eq!(system.next_attack(actor), None);
        assert_eq!(system.buffered_len(actor), 1);
    }

    #[test]
    fn test_terminal_attack_escape_hatch() {
        let (clock, mut system, actor) = registered();
        system.start_attack(actor, demo::FINISHER); // empty cancel set

        clock.advance(300); // recovery
        system.buffer_input(actor, InputKind::Heavy, InputDirection::Up);
        assert_eq!(system.next_attack(actor), Some(demo::RISING_CUT));

        // The hatch is only for the rising attack; a light goes nowhere
        system.start_attack(actor, demo::FINISHER);
        clock.advance(300);
        system.buffer_input(actor, InputKind::Light, InputDirection::Neutral);
        assert_eq!(system.next_attack(actor), None);
    }

    #[test]
    fn test_light_chain_walks_in_order_and_holds() {
        let (clock, mut system, actor) = registered();
        let mut log = EventLog::new();

        system.start_attack(actor, demo::JAB);
        assert_eq!(system.chain_position(actor, ChainFamily::Light), Some(0));

        // Jab post-active at 140 ms; buffered light chains into cross
        clock.set(100);
        system.buffer_input(actor, InputKind::Light, InputDirection::Neutral);
        clock.set(150);
        system.update(&mut log);
        assert_eq!(system.current_attack(actor), Some(demo::CROSS));
        assert_eq!(system.chain_position(actor, ChainFamily::Light), Some(1));

        // Cross (started at 150) post-active at 330 ms; chains into finisher
        clock.set(400);
        system.buffer_input(actor, InputKind::Light, InputDirection::Neutral);
        clock.set(480);
        system.update(&mut log);
        assert_eq!(system.current_attack(actor), Some(demo::FINISHER));
        assert_eq!(system.chain_position(actor, ChainFamily::Light), Some(2));

        // Finisher (started at 480) is terminal: the chain holds at the end
        clock.set(700);
        system.buffer_input(actor, InputKind::Light, InputDirection::Neutral);
        clock.set(760);
        system.update(&mut log);
        assert_eq!(system.current_attack(actor), Some(demo::FINISHER));
        assert_eq!(system.chain_position(actor, ChainFamily::Light), Some(2));
        assert_eq!(system.buffered_len(actor), 1);

        let chained: Vec<_> = log
            .iter()
            .filter(|event| matches!(event, CombatEvent::AttackChained { .. }))
            .collect();
        assert_eq!(chained.len(), 2);
    }

    #[test]
    fn test_attack_without_hits_returns_to_idle() {
        let (clock, mut system, actor) = registered();
        let mut log = EventLog::new();

        system.start_attack(actor, demo::JAB);
        clock.set(150);
        system.update(&mut log);
        assert_eq!(system.state(actor), Some(ComboState::CancelWindow));
        assert!(system.is_cancel_available(actor));

        clock.set(300); // past the 280 ms total
        system.update(&mut log);
        assert_eq!(system.state(actor), Some(ComboState::Idle));
        assert_eq!(system.current_attack(actor), None);
        assert!(!system.is_cancel_available(actor));
    }

    #[test]
    fn test_attack_with_hits_keeps_the_window_open() {
        let (clock, mut system, actor) = registered();
        let mut log = EventLog::new();

        system.start_attack(actor, demo::JAB);
        clock.set(100);
        system.register_hit(actor);

        clock.set(300); // past total duration
        system.update(&mut log);
        assert_eq!(system.state(actor), Some(ComboState::CancelWindow));
        assert_eq!(system.current_attack(actor), None);
        assert_eq!(system.hit_count(actor), 1);
    }

    #[test]
    fn test_drop_and_recovery_cycle() {
        let (clock, mut system, actor) = registered();
        let mut log = EventLog::new();

        system.start_attack(actor, demo::JAB);
        system.register_hit(actor);
        system.register_hit(actor);
        assert_eq!(system.hit_count(actor), 2);

        // No hit for longer than the drop timeout
        clock.set(1501);
        system.update(&mut log);
        assert_eq!(system.state(actor), Some(ComboState::Dropped));
        assert_eq!(system.hit_count(actor), 0);
        assert_eq!(system.current_attack(actor), None);
        assert_eq!(system.chain_position(actor, ChainFamily::Light), None);
        assert_eq!(
            log.events,
            vec![CombatEvent::ComboDropped { actor, hits: 2 }]
        );

        // Cooldown not yet served: still Dropped
        clock.set(1600);
        system.update(&mut log);
        assert_eq!(system.state(actor), Some(ComboState::Dropped));

        // A later update alone brings the actor back to Idle
        clock.set(1751);
        system.update(&mut log);
        assert_eq!(system.state(actor), Some(ComboState::Idle));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_initiation_allowed_while_dropped() {
        let (clock, mut system, actor) = registered();
        let mut log = EventLog::new();

        system.register_hit(actor);
        clock.set(1501);
        system.update(&mut log);
        assert_eq!(system.state(actor), Some(ComboState::Dropped));

        system.buffer_input(actor, InputKind::Light, InputDirection::Neutral);
        assert_eq!(system.next_attack(actor), Some(demo::JAB));
    }

    #[test]
    fn test_reset_forces_idle() {
        let (clock, mut system, actor) = registered();

        system.start_attack(actor, demo::CROSS);
        system.register_hit(actor);
        clock.advance(10);
        system.buffer_input(actor, InputKind::Light, InputDirection::Neutral);

        system.reset(actor);

        assert_eq!(system.state(actor), Some(ComboState::Idle));
        assert_eq!(system.hit_count(actor), 0);
        assert_eq!(system.current_attack(actor), None);
        assert_eq!(system.buffered_len(actor), 0);
        assert_eq!(system.chain_position(actor, ChainFamily::Light), None);
    }
}

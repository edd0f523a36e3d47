//! Property tests for the stun arbitration rules
//!
//! Quantified versions of the arbitration and scaling guarantees: priority
//! monotonicity over every type pair, and the scaling floor over arbitrary
//! consecutive-hit runs.

use std::sync::Arc;

use proptest::prelude::*;

use falchion::attack::demo;
use falchion::core::clock::ManualClock;
use falchion::core::config::StunTuning;
use falchion::core::types::ActorId;
use falchion::stun::{StunSystem, StunType};

fn setup() -> (Arc<ManualClock>, StunSystem, ActorId) {
    let clock = Arc::new(ManualClock::new());
    let mut system = StunSystem::new(clock.clone(), StunTuning::default());
    let actor = ActorId::new();
    system.register_actor(actor, 1.0);
    (clock, system, actor)
}

fn apply(system: &mut StunSystem, actor: ActorId, stun_type: StunType, source: ActorId) {
    let library = demo::library();
    match stun_type {
        StunType::Hitstun => {
            system.apply_hitstun(actor, library.get(demo::JAB).unwrap(), source);
        }
        StunType::Blockstun => {
            system.apply_blockstun(actor, library.get(demo::JAB).unwrap(), source);
        }
        StunType::GuardBreak => {
            system.apply_guard_break(actor, source);
        }
        StunType::Stagger => {
            system.apply_stagger(actor, source);
        }
        StunType::ForceFreeze => {
            system.apply_force_freeze(actor, source);
        }
    }
}

fn any_stun_type() -> impl Strategy<Value = StunType> {
    prop::sample::select(StunType::all())
}

proptest! {
    /// Applying B over A never dethrones a strictly higher-priority A, and a
    /// higher-or-equal B always takes over.
    #[test]
    fn priority_monotonicity(first in any_stun_type(), second in any_stun_type()) {
        let (clock, mut system, actor) = setup();
        let source = ActorId::new();

        apply(&mut system, actor, first, source);
        clock.advance(10);
        apply(&mut system, actor, second, source);

        let active = system.stun_type(actor).expect("a stun must be active");
        if second.priority() >= first.priority() {
            prop_assert_eq!(active, second);
        } else {
            prop_assert_eq!(active, first);
        }
    }

    /// Any run of consecutive hitstuns keeps the scaling multiplier at or
    /// above the floor and the duration at or above the configured minimum.
    #[test]
    fn scaling_never_breaks_the_floor(hits in 1usize..40) {
        let (_clock, mut system, actor) = setup();
        let tuning = StunTuning::default();
        let library = demo::library();
        let jab = library.get(demo::JAB).unwrap();
        let source = ActorId::new();

        let mut last_applied = 0;
        for _ in 0..hits {
            last_applied = system.apply_hitstun(actor, jab, source);
        }

        let floor_ms = (tuning.hitstun_light_ms as f32 * tuning.combo_scaling_floor) as u64;
        prop_assert!(last_applied >= floor_ms.min(tuning.hitstun_min_ms));
        prop_assert!(last_applied >= tuning.hitstun_min_ms);
    }

    /// Two reads with no clock advance agree.
    #[test]
    fn remaining_is_idempotent(advance in 0u64..200) {
        let (clock, mut system, actor) = setup();
        let library = demo::library();
        system.apply_hitstun(actor, library.get(demo::JAB).unwrap(), ActorId::new());

        clock.advance(advance);
        prop_assert_eq!(system.stun_remaining(actor), system.stun_remaining(actor));
    }
}

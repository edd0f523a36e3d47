//! Demo move set used by tests and tuning sessions
//!
//! A small but complete kit: a three-hit light string, a two-hit heavy
//! string, the rising cut reached from an upward heavy, both force variants,
//! and one special.

use crate::attack::chains::{ChainFamily, ChainTable, MoveSet};
use crate::attack::definition::{AttackDefinition, AttackLibrary, AttackType};
use crate::core::types::AttackId;

pub const JAB: AttackId = AttackId(1);
pub const CROSS: AttackId = AttackId(2);
pub const FINISHER: AttackId = AttackId(3);
pub const OVERHEAD: AttackId = AttackId(10);
pub const SLAM: AttackId = AttackId(11);
pub const RISING_CUT: AttackId = AttackId(20);
pub const FORCE_PUSH: AttackId = AttackId(30);
pub const FORCE_PULL: AttackId = AttackId(31);
pub const BURST: AttackId = AttackId(40);

pub fn library() -> AttackLibrary {
    let mut library = AttackLibrary::new();

    library.insert(
        AttackDefinition::new(JAB, "jab", AttackType::Light, 80, 60, 140)
            .with_chain(ChainFamily::Light)
            .with_cancels([CROSS, RISING_CUT, FORCE_PUSH, FORCE_PULL]),
    );
    library.insert(
        AttackDefinition::new(CROSS, "cross", AttackType::Light, 100, 80, 160)
            .with_chain(ChainFamily::Light)
            .with_cancels([FINISHER, RISING_CUT]),
    );
    // Terminal: ends the light string; the rising cut stays reachable
    // through the empty-cancel-set escape hatch
    library.insert(
        AttackDefinition::new(FINISHER, "finisher", AttackType::Light, 140, 100, 260)
            .with_chain(ChainFamily::Light),
    );

    library.insert(
        AttackDefinition::new(OVERHEAD, "overhead", AttackType::Heavy, 140, 90, 210)
            .with_chain(ChainFamily::Heavy)
            .with_cancels([SLAM, FORCE_PUSH]),
    );
    library.insert(
        AttackDefinition::new(SLAM, "slam", AttackType::Heavy, 180, 110, 290)
            .with_chain(ChainFamily::Heavy),
    );

    library.insert(AttackDefinition::new(
        RISING_CUT,
        "rising cut",
        AttackType::Power,
        120,
        80,
        260,
    ));
    library.insert(AttackDefinition::new(
        FORCE_PUSH,
        "force push",
        AttackType::Power,
        100,
        60,
        200,
    ));
    library.insert(AttackDefinition::new(
        FORCE_PULL,
        "force pull",
        AttackType::Power,
        100,
        60,
        200,
    ));
    library.insert(AttackDefinition::new(
        BURST,
        "burst",
        AttackType::Special,
        160,
        120,
        300,
    ));

    library
}

pub fn chains() -> ChainTable {
    let mut table = ChainTable::new();
    table.set_chain(ChainFamily::Light, vec![JAB, CROSS, FINISHER]);
    table.set_chain(ChainFamily::Heavy, vec![OVERHEAD, SLAM]);
    table
}

pub fn move_set() -> MoveSet {
    MoveSet {
        rising: RISING_CUT,
        force_push: FORCE_PUSH,
        force_pull: FORCE_PULL,
        special: BURST,
    }
}

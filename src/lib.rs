//! Falchion - real-time combat resolution core for an action game
//!
//! Decides, frame by frame, which attack an actor may perform next, how long
//! a struck actor stays incapacitated, and how competing stun effects are
//! arbitrated. Hit detection, damage math, rendering, and audio live outside
//! this crate and talk to it through the interfaces in `core` and
//! `orchestrator`.

pub mod attack;
pub mod combo;
pub mod core;
pub mod fsm;
pub mod orchestrator;
pub mod stun;

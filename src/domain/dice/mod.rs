//! Dice module - stochastic resolution for the LotusRPG game mechanic.
//!
//! Pure and synchronous: the engine owns no state beyond its draw cap and
//! never suspends, so handlers call it inline.

mod engine;
mod source;

pub use engine::{resolve, DiceEngine, DiceError, DicePair, DiceRoll, DEFAULT_DRAW_CAP, MAX_FACE};
pub use source::{RandomSource, RngSource, ScriptedSource};

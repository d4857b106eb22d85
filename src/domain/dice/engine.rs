//! Double-ten exploding dice resolution.
//!
//! # Rules
//!
//! ```text
//! roll (a, b)
//! └─ (10, 10)?  ── no ──▶ done
//!       │ yes
//!       ▼
//!    roll (c, d) ◀──────────────┐
//!       ├─ (10, 10) ────────────┘
//!       ├─ exactly one 10 ──▶ explode that die: add d10 while the
//!       │                     previous extra draw was a 10, then done
//!       └─ no 10 ──────────▶ done
//! ```
//!
//! Exploded dice keep accumulating in place, so a pair can read `[17, 3]`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::RandomSource;

/// Highest face of a d10; also the value that triggers rerolls.
pub const MAX_FACE: u32 = 10;

/// Default ceiling on single-die draws per resolution.
pub const DEFAULT_DRAW_CAP: usize = 10_000;

/// One recorded pair. Exploded dice carry their accumulated value.
pub type DicePair = [u32; 2];

/// Outcome of one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    /// Pairs in the order they were rolled.
    pub rolls: Vec<DicePair>,
    /// Sum of every die drawn, including explosions.
    pub total: u32,
}

/// Failures of the engine. Both indicate a broken random source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("Dice resolution exceeded {cap} draws")]
    Exhausted { cap: usize },

    #[error("Random source produced face {0}, expected 1..=10")]
    InvalidFace(u32),
}

/// Stateless resolver; the only setting is the draw cap.
#[derive(Debug, Clone, Copy)]
pub struct DiceEngine {
    draw_cap: usize,
}

impl Default for DiceEngine {
    fn default() -> Self {
        Self::new(DEFAULT_DRAW_CAP)
    }
}

impl DiceEngine {
    pub fn new(draw_cap: usize) -> Self {
        Self { draw_cap }
    }

    pub fn draw_cap(&self) -> usize {
        self.draw_cap
    }

    /// Resolves one double-ten roll against `source`.
    pub fn resolve(&self, source: &mut dyn RandomSource) -> Result<DiceRoll, DiceError> {
        let mut dice = Draws {
            source,
            drawn: 0,
            cap: self.draw_cap,
        };
        let mut roll = DiceRoll {
            rolls: Vec::new(),
            total: 0,
        };

        let first = dice.pair()?;
        roll.push(first);
        if first != [MAX_FACE, MAX_FACE] {
            return Ok(roll);
        }

        loop {
            let pair = dice.pair()?;
            roll.push(pair);

            let hot = match (pair[0] == MAX_FACE, pair[1] == MAX_FACE) {
                (true, true) => continue,
                (true, false) => 0,
                (false, true) => 1,
                (false, false) => break,
            };

            // Only the hot die explodes; it chains while each extra draw is a 10.
            loop {
                let extra = dice.face()?;
                roll.explode_last(hot, extra);
                if extra != MAX_FACE {
                    break;
                }
            }
            break;
        }

        Ok(roll)
    }
}

/// Resolves with the default draw cap.
pub fn resolve(source: &mut dyn RandomSource) -> Result<DiceRoll, DiceError> {
    DiceEngine::default().resolve(source)
}

impl DiceRoll {
    fn push(&mut self, pair: DicePair) {
        self.total += pair[0] + pair[1];
        self.rolls.push(pair);
    }

    fn explode_last(&mut self, die: usize, extra: u32) {
        if let Some(last) = self.rolls.last_mut() {
            last[die] += extra;
        }
        self.total += extra;
    }
}

struct Draws<'a> {
    source: &'a mut dyn RandomSource,
    drawn: usize,
    cap: usize,
}

impl Draws<'_> {
    fn face(&mut self) -> Result<u32, DiceError> {
        if self.drawn >= self.cap {
            return Err(DiceError::Exhausted { cap: self.cap });
        }
        self.drawn += 1;
        let face = self.source.roll_d10();
        if !(1..=MAX_FACE).contains(&face) {
            return Err(DiceError::InvalidFace(face));
        }
        Ok(face)
    }

    fn pair(&mut self) -> Result<DicePair, DiceError> {
        Ok([self.face()?, self.face()?])
    }
}

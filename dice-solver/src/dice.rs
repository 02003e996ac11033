//! The dice rolled for one round.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// The number of white dice in a roll.
pub const WHITE_DICE: usize = 5;

/// The faces of a die.
pub const FACES: std::ops::RangeInclusive<u8> = 1..=6;

/// A dice configuration violates the rules of the game.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedConfig {
    /// The number of white dice is not five.
    #[error("expected 5 white dice, found {0}")]
    WrongDiceCount(usize),

    /// A white die shows a value outside `1..=6`.
    #[error("a die shows {0}, but dice only show the values 1 through 6")]
    DieOutOfRange(u8),

    /// The target is not a two-digit number whose digits are both in `1..=6`.
    #[error("the target {0} cannot be rolled with two black dice")]
    TargetOutOfRange(u8),

    /// A persistence key could not be parsed.
    #[error("`{0}` is not a dice configuration key (expected something like `12345-15`)")]
    InvalidKey(String),
}

/// One roll: five white dice and the two-digit target formed by the black dice.
///
/// The white dice are a multiset, so they are kept sorted; two rolls with the same values in a
/// different order are the same configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiceConfig {
    white: [u8; WHITE_DICE],
    black: u8,
}

impl DiceConfig {
    /// Creates a configuration, checking every die and the target.
    pub fn new(mut white: [u8; WHITE_DICE], black: u8) -> Result<Self, MalformedConfig> {
        if let Some(&die) = white.iter().find(|&&die| !FACES.contains(&die)) {
            return Err(MalformedConfig::DieOutOfRange(die));
        }

        let (tens, units) = (black / 10, black % 10);
        if black >= 100 || !FACES.contains(&tens) || !FACES.contains(&units) {
            return Err(MalformedConfig::TargetOutOfRange(black));
        }

        white.sort_unstable();
        Ok(Self { white, black })
    }

    /// Creates a configuration from a slice of white dice, which must hold exactly five values.
    pub fn from_slice(white: &[u8], black: u8) -> Result<Self, MalformedConfig> {
        let white = <[u8; WHITE_DICE]>::try_from(white)
            .map_err(|_| MalformedConfig::WrongDiceCount(white.len()))?;
        Self::new(white, black)
    }

    /// The white dice, in ascending order.
    pub fn white(&self) -> [u8; WHITE_DICE] {
        self.white
    }

    /// The target.
    pub fn black(&self) -> u8 {
        self.black
    }

    /// How many times each face appears among the white dice. Index `0` counts the ones.
    pub fn face_counts(&self) -> [u8; 6] {
        let mut counts = [0; 6];
        for die in self.white {
            counts[usize::from(die - 1)] += 1;
        }
        counts
    }

    /// The stable key used to persist this configuration, such as `12345-15`.
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Every configuration of the game, in ascending key order.
    ///
    /// There are 252 multisets of white dice and 36 targets, for 9072 configurations.
    pub fn all() -> Vec<Self> {
        let mut configs = Vec::with_capacity(9072);
        for a in FACES {
            for b in a..=6 {
                for c in b..=6 {
                    for d in c..=6 {
                        for e in d..=6 {
                            for tens in FACES {
                                for units in FACES {
                                    configs.push(Self {
                                        white: [a, b, c, d, e],
                                        black: tens * 10 + units,
                                    });
                                }
                            }
                        }
                    }
                }
            }
        }
        configs
    }
}

impl fmt::Display for DiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for die in self.white {
            write!(f, "{}", die)?;
        }
        write!(f, "-{}", self.black)
    }
}

impl FromStr for DiceConfig {
    type Err = MalformedConfig;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MalformedConfig::InvalidKey(s.to_owned());
        let (white, black) = s.split_once('-').ok_or_else(invalid)?;

        let white = white.chars()
            .map(|c| c.to_digit(10).and_then(|d| u8::try_from(d).ok()).ok_or_else(invalid))
            .collect::<Result<Vec<_>, _>>()?;
        // exactly two digits, so that `015` and `+15` are not read as `15`
        if black.len() != 2 || !black.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let black = black.parse::<u8>().map_err(|_| invalid())?;

        Self::from_slice(&white, black)
    }
}

impl TryFrom<String> for DiceConfig {
    type Error = MalformedConfig;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DiceConfig> for String {
    fn from(config: DiceConfig) -> Self {
        config.key()
    }
}

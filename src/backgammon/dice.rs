use std::fmt::Debug;

use rand::{Rng, random_range};

use crate::{error::{GameError, GameResult}, misc::TinyVec};

/// Pip bag for one turn. Four entries for a double, two otherwise.
pub type Pips = TinyVec<u8, 4>;

/// The two face values of one throw, each in 1..=6.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Roll {
    die1: u8,
    die2: u8,
}

impl Roll {
    pub fn new(die1: u8, die2: u8) -> GameResult<Self> {
        for die in [die1, die2] {
            if !(1..=6).contains(&die) {
                return Err(GameError::PipOutOfRange(die));
            }
        }
        Ok(Roll { die1, die2 })
    }

    pub fn die1(&self) -> u8 {
        self.die1
    }

    pub fn die2(&self) -> u8 {
        self.die2
    }

    pub fn as_pair(&self) -> (u8, u8) {
        (self.die1, self.die2)
    }

    pub fn is_double(&self) -> bool {
        self.die1 == self.die2
    }

    /// Expands the roll into the pips it grants.
    pub fn pips(&self) -> Pips {
        let mut pips = Pips::new();
        pips.push(self.die1);
        pips.push(self.die2);
        if self.is_double() {
            pips.push(self.die1);
            pips.push(self.die1);
        }
        pips
    }

    /// Parses `"a,b"` as given on the command line.
    pub fn parse(text: &str) -> GameResult<Self> {
        let parts: Vec<&str> = text.split(',').map(str::trim).collect();
        let [a, b] = parts.as_slice() else {
            return Err(GameError::MalformedRoll(format!("expected two values in {text:?}")));
        };
        let parse = |s: &str| s.parse::<u8>()
            .map_err(|_| GameError::MalformedRoll(format!("{s:?} is not a die value")));
        Roll::new(parse(*a)?, parse(*b)?)
    }
}

impl TryFrom<(u8, u8)> for Roll {
    type Error = GameError;

    fn try_from((die1, die2): (u8, u8)) -> Result<Self, Self::Error> {
        Roll::new(die1, die2)
    }
}

impl Debug for Roll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.die1, self.die2)
    }
}

/// Rolls two dice and remembers the last throw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dice {
    last_roll: Option<Roll>,
}

impl Dice {
    pub fn new() -> Self {
        Dice { last_roll: None }
    }

    pub fn roll(&mut self) -> Roll {
        let roll = Roll { die1: random_range(1..=6), die2: random_range(1..=6) };
        self.last_roll = Some(roll);
        roll
    }

    /// Same as [`Self::roll`] but driven by the caller's generator.
    pub fn roll_with<R: Rng>(&mut self, rng: &mut R) -> Roll {
        let roll = Roll { die1: rng.random_range(1..=6), die2: rng.random_range(1..=6) };
        self.last_roll = Some(roll);
        roll
    }

    /// Sets the dice to show `roll` without throwing them.
    pub fn show(&mut self, roll: Roll) {
        self.last_roll = Some(roll);
    }

    pub fn clear(&mut self) {
        self.last_roll = None;
    }

    pub fn last_roll(&self) -> Option<Roll> {
        self.last_roll
    }

    /// False until the first roll.
    pub fn is_double(&self) -> bool {
        self.last_roll.is_some_and(|roll| roll.is_double())
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_roll_pips() {
        for i in 1..=6 {
            for j in 1..=6 {
                let roll = Roll::new(i, j).unwrap();
                let pips = roll.pips();
                if i == j {
                    assert!(roll.is_double());
                    assert_eq!(&*pips, &[i; 4]);
                } else {
                    assert!(!roll.is_double());
                    assert_eq!(&*pips, &[i, j]);
                }
            }
        }
    }

    #[test]
    fn test_roll_bounds() {
        assert_eq!(Roll::new(0, 3), Err(GameError::PipOutOfRange(0)));
        assert_eq!(Roll::new(3, 7), Err(GameError::PipOutOfRange(7)));
    }

    #[test]
    fn test_parse() {
        assert_eq!(Roll::parse("3,4").unwrap().as_pair(), (3, 4));
        assert_eq!(Roll::parse(" 6 , 6 ").unwrap().as_pair(), (6, 6));
        assert!(matches!(Roll::parse("34"), Err(GameError::MalformedRoll(_))));
        assert!(matches!(Roll::parse("3,4,5"), Err(GameError::MalformedRoll(_))));
        assert!(matches!(Roll::parse("x,y"), Err(GameError::MalformedRoll(_))));
        assert!(matches!(Roll::parse(""), Err(GameError::MalformedRoll(_))));
        assert_eq!(Roll::parse("0,4"), Err(GameError::PipOutOfRange(0)));
    }

    #[test]
    fn test_dice_roll() {
        let mut dice = Dice::new();
        assert!(!dice.is_double());
        assert_eq!(dice.last_roll(), None);
        for _ in 1..=100 {
            let roll = dice.roll();
            assert!((1..=6).contains(&roll.die1()));
            assert!((1..=6).contains(&roll.die2()));
            assert_eq!(dice.last_roll(), Some(roll));
            assert_eq!(dice.is_double(), roll.die1() == roll.die2());
        }
    }

    #[test]
    fn test_seeded_rolls_repeat() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let mut dice = Dice::new();
        for _ in 0..20 {
            assert_eq!(dice.roll_with(&mut a), dice.roll_with(&mut b));
        }
    }
}

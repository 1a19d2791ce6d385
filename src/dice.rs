//! Physically flavoured dice.
//!
//! A [`Die`] does not just pick a face: it runs a short decaying random
//! process whose intermediate faces can be animated. The process is driven
//! step by step, finite and not restartable until rolled again. The last
//! face reached is the result.
//!
//! A [`DiceEnsemble`] rolls several dice together and merges their samples
//! round-robin until every member has come to rest.

use std::time::Duration;

use rand::Rng;

use crate::error::InvariantViolation;

/// Power below which a die stops.
pub const MIN_POWER: f64 = 0.05;

/// Sub-steps a die may spend trying to change face within one step.
pub const MAX_SUBSTEPS: u32 = 4;

/// Power lost unconditionally on every step.
const POWER_STEP: f64 = 0.03;

/// One intermediate state of a rolling die.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DieSample {
    /// Face showing after this step.
    pub value: u8,
    /// Power left after this step.
    pub power: f64,
    /// Sub-steps spent reaching this face. Presenters pace animation with it.
    pub substeps: u32,
}

/// A single die running a decaying random process.
#[derive(Debug, Clone, Copy)]
pub struct Die {
    min: u8,
    max: u8,
    value: u8,
    /// Continuous position in `[min, max + 1)`; the face is its floor.
    position: f64,
    power: f64,
    rolling: bool,
    tick: Duration,
}

impl Die {
    /// Create a die showing faces `a..=b` (either order).
    #[must_use]
    pub fn new(a: u8, b: u8) -> Self {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        Self {
            min,
            max,
            value: min,
            position: f64::from(min),
            power: 0.0,
            rolling: false,
            tick: Duration::ZERO,
        }
    }

    /// A regular six-sided die.
    #[must_use]
    pub fn d6() -> Self {
        Self::new(1, 6)
    }

    /// Face currently showing.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.value
    }

    /// Lowest face.
    #[must_use]
    pub const fn min(&self) -> u8 {
        self.min
    }

    /// Highest face.
    #[must_use]
    pub const fn max(&self) -> u8 {
        self.max
    }

    /// Whether the die is still moving.
    #[must_use]
    pub const fn is_rolling(&self) -> bool {
        self.rolling
    }

    /// Power left in the current roll.
    #[must_use]
    pub const fn power(&self) -> f64 {
        self.power
    }

    /// Pause between sub-steps, for presenters that animate.
    #[must_use]
    pub const fn tick(&self) -> Duration {
        self.tick
    }

    /// Throw the die.
    ///
    /// `power` defaults to 1.0 when absent, not positive or not finite.
    /// The starting face is drawn uniformly.
    pub fn roll<R: Rng>(&mut self, rng: &mut R, power: Option<f64>, tick: Duration) {
        self.power = power.filter(|p| p.is_finite() && *p > 0.0).unwrap_or(1.0);
        self.tick = tick;
        self.rolling = true;
        self.value = rng.random_range(self.min..=self.max);
        self.position = f64::from(self.value);
    }

    /// Advance the process by one step.
    ///
    /// Returns `Ok(None)` once the die has come to rest; its final face is
    /// then [`Die::value`].
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::DiceNotRolling`] if the die is at rest.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> Result<Option<DieSample>, InvariantViolation> {
        if !self.rolling {
            return Err(InvariantViolation::DiceNotRolling);
        }

        self.power -= POWER_STEP;
        if self.power < MIN_POWER {
            self.stop();
            return Ok(None);
        }

        let start = self.value;
        let mut substeps = 0;
        while self.face() == start && substeps < MAX_SUBSTEPS {
            if self.power < MIN_POWER {
                break;
            }
            let bound = self.power + self.power * self.power;
            self.position += rng.random::<f64>() * bound;
            self.power -= self.power * self.power * rng.random::<f64>() / 2.0;
            substeps += 1;
        }
        self.value = self.face();

        if self.power < MIN_POWER {
            self.stop();
            return Ok(None);
        }

        Ok(Some(DieSample {
            value: self.value,
            power: self.power,
            substeps,
        }))
    }

    /// Read the face, sending a position past the top face back to `min`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn face(&mut self) -> u8 {
        let upper = f64::from(self.max) + 1.0;
        if self.position >= upper {
            self.position = f64::from(self.min);
        }
        (self.position.floor() as u8).clamp(self.min, self.max)
    }

    fn stop(&mut self) {
        self.power = 0.0;
        self.rolling = false;
    }
}

/// A sample from one member of an ensemble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnsembleSample {
    /// Index of the die within the ensemble.
    pub die: usize,
    /// Face showing after this step.
    pub value: u8,
    /// Power left after this step.
    pub power: f64,
    /// How long a presenter should hold this frame.
    pub pause: Duration,
}

/// Two or more dice rolled together.
#[derive(Debug, Clone)]
pub struct DiceEnsemble {
    dice: Vec<Die>,
}

impl DiceEnsemble {
    /// Group dice into an ensemble.
    ///
    /// Returns `None` with fewer than two dice.
    #[must_use]
    pub fn new(dice: Vec<Die>) -> Option<Self> {
        if dice.len() < 2 {
            return None;
        }
        Some(Self { dice })
    }

    /// Two six-sided dice.
    #[must_use]
    pub fn pair() -> Self {
        Self {
            dice: vec![Die::d6(), Die::d6()],
        }
    }

    /// Member dice.
    #[must_use]
    pub fn dice(&self) -> &[Die] {
        &self.dice
    }

    /// Final faces of every member.
    #[must_use]
    pub fn values(&self) -> Vec<u8> {
        self.dice.iter().map(Die::value).collect()
    }

    /// Sum of the faces showing.
    #[must_use]
    pub fn sum(&self) -> u32 {
        self.dice.iter().map(|d| u32::from(d.value())).sum()
    }

    /// True iff there are exactly two dice showing the same face.
    #[must_use]
    pub fn is_double(&self) -> bool {
        matches!(self.dice.as_slice(), [a, b] if a.value() == b.value())
    }

    /// Throw every die and return the merged sample stream.
    ///
    /// `total_time` is split evenly between the members. `powers` overrides
    /// the starting power of the first `powers.len()` dice.
    pub fn roll_all<'a, R: Rng>(
        &'a mut self,
        rng: &'a mut R,
        total_time: Duration,
        powers: &[f64],
    ) -> EnsembleRoll<'a, R> {
        let members = u32::try_from(self.dice.len()).unwrap_or(u32::MAX);
        let tick = total_time / members;
        for (i, die) in self.dice.iter_mut().enumerate() {
            die.roll(rng, powers.get(i).copied(), tick);
        }
        EnsembleRoll {
            dice: &mut self.dice,
            rng,
            next: 0,
        }
    }

    /// Throw every die and run the process to rest, collecting the samples.
    pub fn roll_to_rest<R: Rng>(
        &mut self,
        rng: &mut R,
        total_time: Duration,
    ) -> Vec<EnsembleSample> {
        self.roll_all(rng, total_time, &[]).collect()
    }
}

/// Lazy, fair merge of the samples of every rolling member.
#[derive(Debug)]
pub struct EnsembleRoll<'a, R> {
    dice: &'a mut [Die],
    rng: &'a mut R,
    next: usize,
}

impl<R: Rng> Iterator for EnsembleRoll<'_, R> {
    type Item = EnsembleSample;

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.dice.len();
        while self.dice.iter().any(Die::is_rolling) {
            let index = self.next;
            self.next = (self.next + 1) % len;

            let die = &mut self.dice[index];
            if !die.is_rolling() {
                continue;
            }
            let tick = die.tick();
            if let Ok(Some(sample)) = die.step(self.rng) {
                return Some(EnsembleSample {
                    die: index,
                    value: sample.value,
                    power: sample.power,
                    pause: tick * sample.substeps,
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_step_at_rest_is_illegal() {
        let mut die = Die::d6();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(die.step(&mut rng), Err(InvariantViolation::DiceNotRolling));
    }

    #[test]
    fn test_die_comes_to_rest_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            let mut die = Die::d6();
            die.roll(&mut rng, None, Duration::ZERO);
            let mut steps = 0;
            while let Ok(Some(sample)) = die.step(&mut rng) {
                assert!((1..=6).contains(&sample.value));
                assert!(sample.substeps <= MAX_SUBSTEPS);
                steps += 1;
                assert!(steps < 100, "process must be finite");
            }
            assert!(!die.is_rolling());
            assert!((1..=6).contains(&die.value()));
        }
    }

    #[test]
    fn test_reversed_bounds() {
        let die = Die::new(6, 1);
        assert_eq!(die.min(), 1);
        assert_eq!(die.max(), 6);
    }

    #[test]
    fn test_every_face_reachable() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut seen = [false; 6];
        let mut pair = DiceEnsemble::pair();
        for _ in 0..300 {
            pair.roll_to_rest(&mut rng, Duration::ZERO);
            for v in pair.values() {
                seen[usize::from(v - 1)] = true;
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_ensemble_requires_two_dice() {
        assert!(DiceEnsemble::new(vec![Die::d6()]).is_none());
        assert!(DiceEnsemble::new(vec![Die::d6(), Die::d6()]).is_some());
    }

    #[test]
    fn test_ensemble_merges_all_members_until_rest() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut pair = DiceEnsemble::pair();
        let samples = pair.roll_to_rest(&mut rng, Duration::from_millis(100));
        assert!(samples.iter().all(|s| s.die < 2));
        assert!(pair.dice().iter().all(|d| !d.is_rolling()));
        assert_eq!(
            pair.sum(),
            pair.values().iter().map(|v| u32::from(*v)).sum::<u32>()
        );
    }

    #[test]
    fn test_power_override() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut pair = DiceEnsemble::pair();
        // Below the floor after the first decay: both dice stop immediately.
        let samples: Vec<_> = pair.roll_all(&mut rng, Duration::ZERO, &[0.06, 0.06]).collect();
        assert!(samples.is_empty());
    }

    #[test]
    fn test_huge_power_still_comes_to_rest() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut pair = DiceEnsemble::pair();
        let samples = pair.roll_all(&mut rng, Duration::ZERO, &[1e9, 1e9]).count();
        assert!(samples < 1000);
        assert!(pair.dice().iter().all(|d| !d.is_rolling()));
        assert!(pair.values().iter().all(|v| (1..=6).contains(v)));

        let samples = pair
            .roll_all(&mut rng, Duration::ZERO, &[f64::INFINITY, f64::NAN])
            .count();
        assert!(samples < 1000);
        assert!(pair.values().iter().all(|v| (1..=6).contains(v)));
    }

    #[test]
    fn test_overshoot_wraps_to_min() {
        let mut die = Die::d6();
        die.position = 6.5;
        assert_eq!(die.face(), 6);
        die.position = 7.0;
        assert_eq!(die.face(), 1);
        die.position = 1e18;
        assert_eq!(die.face(), 1);
    }

    #[test]
    fn test_double_is_pair_only() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut triple = DiceEnsemble::new(vec![Die::new(1, 1), Die::new(1, 1), Die::new(1, 1)])
            .unwrap();
        triple.roll_to_rest(&mut rng, Duration::ZERO);
        assert!(!triple.is_double());

        let mut pair = DiceEnsemble::new(vec![Die::new(2, 2), Die::new(2, 2)]).unwrap();
        pair.roll_to_rest(&mut rng, Duration::ZERO);
        assert!(pair.is_double());
        assert_eq!(pair.sum(), 4);
    }

    #[test]
    fn test_same_seed_same_roll() {
        let roll = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut pair = DiceEnsemble::pair();
            let samples = pair.roll_to_rest(&mut rng, Duration::ZERO);
            (samples.len(), pair.values())
        };
        assert_eq!(roll(42), roll(42));
    }
}

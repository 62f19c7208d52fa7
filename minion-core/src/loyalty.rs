//! Loyalty math: follower capacity, loyalty strain and recovery rolls.
//!
//! All rolls are percentile rolls: a chance of `c` succeeds when a uniform
//! draw from `0..100` is below `c`, so `c <= 0` never succeeds and
//! `c >= 100` always does.
//!
//! Stronger creatures are *harder* to keep: the breaking modifier grows with
//! maximum health and is subtracted from the player's willpower.

use rand::Rng;

/// Outcome of a recovery roll for a minion that lost its ally flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// The player keeps control; the ally flag is restored.
    Restored,
    /// Control is lost for good.
    Renegade,
}

/// Maximum number of simultaneous followers for a willpower value.
///
/// `floor(willpower / willpower_per_follower)`, never negative.
#[must_use]
pub fn follower_capacity(willpower: i32, willpower_per_follower: i32) -> usize {
    if willpower_per_follower <= 0 {
        return 0;
    }
    usize::try_from(willpower.max(0) / willpower_per_follower).unwrap_or(0)
}

/// Whether another follower fits under the capacity.
#[must_use]
pub fn can_add_follower(followers: usize, capacity: usize) -> bool {
    followers < capacity
}

/// Resistance of a creature to being brought back under control.
#[must_use]
pub fn breaking_modifier(max_health: i32) -> i32 {
    max_health / 5
}

/// Percent chance that a minion which lost its ally flag is recovered.
#[must_use]
pub fn recovery_chance(willpower: i32, max_health: i32) -> i32 {
    willpower
        .saturating_sub(breaking_modifier(max_health))
        .clamp(0, 100)
}

/// Percentile success roll.
pub fn success_roll<R: Rng + ?Sized>(rng: &mut R, chance: i32) -> bool {
    rng.gen_range(0..100) < chance
}

/// Roll recovery for a minion whose ally flag is gone.
pub fn resolve_recovery<R: Rng + ?Sized>(rng: &mut R, willpower: i32, max_health: i32) -> Recovery {
    if success_roll(rng, recovery_chance(willpower, max_health)) {
        Recovery::Restored
    } else {
        Recovery::Renegade
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn capacity_floors_willpower() {
        assert_eq!(follower_capacity(89, 30), 2);
        assert_eq!(follower_capacity(90, 30), 3);
        assert_eq!(follower_capacity(0, 30), 0);
        assert_eq!(follower_capacity(-40, 30), 0);
        assert_eq!(follower_capacity(100, 0), 0);
    }

    #[test]
    fn can_add_only_below_capacity() {
        assert!(can_add_follower(1, 2));
        assert!(!can_add_follower(2, 2));
        assert!(!can_add_follower(0, 0));
    }

    #[test]
    fn recovery_chance_example() {
        assert_eq!(breaking_modifier(100), 20);
        assert_eq!(recovery_chance(40, 100), 20);
    }

    #[test]
    fn recovery_chance_is_clamped() {
        assert_eq!(recovery_chance(10, 500), 0);
        assert_eq!(recovery_chance(250, 10), 100);
        assert_eq!(recovery_chance(i32::MIN, 10), 0);
    }

    #[test]
    fn certain_rolls() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            assert!(success_roll(&mut rng, 100));
            assert!(!success_roll(&mut rng, 0));
        }
        assert_eq!(resolve_recovery(&mut rng, 200, 10), Recovery::Restored);
        assert_eq!(resolve_recovery(&mut rng, 0, 10), Recovery::Renegade);
    }

    #[test]
    fn twenty_percent_roll_is_roughly_twenty_percent() {
        let mut rng = StdRng::seed_from_u64(42);
        let wins = (0..10_000)
            .filter(|_| success_roll(&mut rng, recovery_chance(40, 100)))
            .count();
        assert!((1_700..2_300).contains(&wins), "got {wins}");
    }
}

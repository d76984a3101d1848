use std::time::{Duration, SystemTime};

use super::progress::MAX_HEARTS;

/// Time it takes for one heart to come back.
pub const HEART_REGEN_TIME: Duration = Duration::from_secs(300);

/// Countdown until the next heart is restored.
///
/// The countdown is anchored on the moment the last heart was lost (or restored), so it can be
/// recomputed from the persisted timestamp after a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeartRegen {
    pub last_heart_lost_at: Option<SystemTime>,
    pub seconds_remaining: u32,
}

impl HeartRegen {
    /// No countdown; hearts are full.
    pub fn idle() -> Self {
        Self::default()
    }

    /// A full countdown starting at `now`.
    pub fn started(now: SystemTime) -> Self {
        Self {
            last_heart_lost_at: Some(now),
            seconds_remaining: HEART_REGEN_TIME.as_secs() as u32,
        }
    }

    /// Countdown state after the heart count changed to `hearts` at `now`.
    pub fn after_change(hearts: u8, now: SystemTime) -> Self {
        if hearts >= MAX_HEARTS {
            Self::idle()
        } else {
            Self::started(now)
        }
    }

    pub fn is_running(&self) -> bool {
        self.last_heart_lost_at.is_some()
    }

    /// Brings the countdown up to date with `now`, restoring one heart per elapsed period.
    /// Returns how many hearts were restored.
    pub fn advance(&mut self, hearts: &mut u8, now: SystemTime) -> u8 {
        if *hearts >= MAX_HEARTS {
            *hearts = MAX_HEARTS;
            *self = Self::idle();
            return 0;
        }

        let Some(mut anchor) = self.last_heart_lost_at else {
            *self = Self::started(now);
            return 0;
        };

        let mut restored = 0;
        loop {
            let elapsed = now.duration_since(anchor).unwrap_or_default();
            if elapsed < HEART_REGEN_TIME {
                self.last_heart_lost_at = Some(anchor);
                self.seconds_remaining = (HEART_REGEN_TIME.as_secs() - elapsed.as_secs()) as u32;
                return restored;
            }

            *hearts += 1;
            restored += 1;
            anchor += HEART_REGEN_TIME;

            if *hearts >= MAX_HEARTS {
                *self = Self::idle();
                return restored;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(seconds: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + seconds)
    }

    #[test]
    fn test_countdown_ticks_down() {
        let mut regen = HeartRegen::started(at(0));
        let mut hearts = 3;

        assert_eq!(regen.advance(&mut hearts, at(1)), 0);
        assert_eq!(regen.seconds_remaining, 299);
        assert_eq!(regen.advance(&mut hearts, at(299)), 0);
        assert_eq!(regen.seconds_remaining, 1);
        assert_eq!(hearts, 3);
    }

    #[test]
    fn test_elapsed_period_restores_one_heart_and_restarts() {
        let mut regen = HeartRegen::started(at(0));
        let mut hearts = 3;

        assert_eq!(regen.advance(&mut hearts, at(300)), 1);
        assert_eq!(hearts, 4);
        assert_eq!(regen.last_heart_lost_at, Some(at(300)));
        assert_eq!(regen.seconds_remaining, 300);
    }

    #[test]
    fn test_long_absence_restores_several_hearts_up_to_cap() {
        let mut regen = HeartRegen::started(at(0));
        let mut hearts = 1;

        assert_eq!(regen.advance(&mut hearts, at(650)), 2);
        assert_eq!(hearts, 3);
        assert_eq!(regen.seconds_remaining, 250);

        assert_eq!(regen.advance(&mut hearts, at(100_000)), 2);
        assert_eq!(hearts, MAX_HEARTS);
        assert!(!regen.is_running());
        assert_eq!(regen.seconds_remaining, 0);
    }

    #[test]
    fn test_missing_anchor_starts_full_countdown() {
        let mut regen = HeartRegen::idle();
        let mut hearts = 2;

        assert_eq!(regen.advance(&mut hearts, at(10)), 0);
        assert_eq!(regen, HeartRegen::started(at(10)));
    }

    #[test]
    fn test_full_hearts_clear_countdown() {
        let mut regen = HeartRegen::started(at(0));
        let mut hearts = MAX_HEARTS;

        assert_eq!(regen.advance(&mut hearts, at(5)), 0);
        assert_eq!(regen, HeartRegen::idle());
        assert_eq!(hearts, MAX_HEARTS);
    }

    #[test]
    fn test_clock_going_backwards_keeps_full_countdown() {
        let mut regen = HeartRegen::started(at(100));
        let mut hearts = 4;

        assert_eq!(regen.advance(&mut hearts, at(50)), 0);
        assert_eq!(regen.seconds_remaining, 300);
    }
}

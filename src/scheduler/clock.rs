//! Day/night arithmetic, in game ticks.

/// Length of a full day/night cycle.
pub const DAY_LENGTH: u64 = 24_000;

/// First tick of the night.
pub const NIGHTFALL: u64 = 12_000;

#[inline]
pub fn is_night(time: u64) -> bool {
    time % DAY_LENGTH >= NIGHTFALL
}

/// Ticks until the first periodic run.
///
/// A fixed delay wins. Otherwise the run lands on the next nightfall; at
/// night that is the following night, the current one being covered by
/// the immediate run.
pub fn initial_delay(time: u64, fixed: Option<u64>) -> u64 {
    if let Some(delay) = fixed {
        return delay;
    }
    let time = time % DAY_LENGTH;
    if is_night(time) {
        DAY_LENGTH + NIGHTFALL - time
    } else {
        NIGHTFALL - time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_night() {
        assert!(!is_night(0));
        assert!(!is_night(11_999));
        assert!(is_night(12_000));
        assert!(is_night(23_999));
    }

    #[test]
    fn test_automatic_delay() {
        assert_eq!(initial_delay(5_000, None), 7_000);
        assert_eq!(initial_delay(15_000, None), 21_000);
        assert_eq!(initial_delay(0, None), 12_000);
        assert_eq!(initial_delay(12_000, None), 24_000);
    }

    #[test]
    fn test_fixed_delay_ignores_time() {
        assert_eq!(initial_delay(5_000, Some(40)), 40);
        assert_eq!(initial_delay(15_000, Some(0)), 0);
    }
}

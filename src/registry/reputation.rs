//! Reputation arithmetic
//!
//! Pure functions translating task outcomes and external signals into bounded
//! score adjustments.

pub const MAX_REPUTATION: u8 = 100;
pub const SUCCESS_DELTA: i32 = 1;
pub const FAILURE_DELTA: i32 = -2;

pub const MAX_LIVE_SCORE: i32 = 10;
pub const MIN_LIVE_SCORE: i32 = -10;

/// Apply one task outcome to a reputation score, clamped to 0..=100
pub fn apply_task_outcome(reputation: u8, success: bool) -> u8 {
    let delta = if success { SUCCESS_DELTA } else { FAILURE_DELTA };
    (reputation as i32 + delta).clamp(0, MAX_REPUTATION as i32) as u8
}

/// Success rate as the registry defines it: current reputation over tasks completed.
///
/// This is anchored to the reputation score rather than to a count of
/// successful tasks, so it drifts toward zero as the task count grows.
/// The result is clamped to 0..=100.
pub fn success_rate(reputation: u8, tasks_completed: u64) -> f64 {
    if tasks_completed == 0 {
        return 100.0;
    }
    (reputation as f64 / tasks_completed as f64 * 100.0).clamp(0.0, 100.0)
}

/// Clamp a merged live score to -10..=10
pub fn clamp_live_score(score: i32) -> i32 {
    score.clamp(MIN_LIVE_SCORE, MAX_LIVE_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_increments() {
        assert_eq!(apply_task_outcome(0, true), 1);
        assert_eq!(apply_task_outcome(50, true), 51);
    }

    #[test]
    fn test_failure_clamps_at_zero() {
        assert_eq!(apply_task_outcome(0, false), 0);
        assert_eq!(apply_task_outcome(1, false), 0);
        assert_eq!(apply_task_outcome(10, false), 8);
    }

    #[test]
    fn test_reputation_never_leaves_bounds() {
        let mut rep = 95;
        for _ in 0..20 {
            rep = apply_task_outcome(rep, true);
            assert!(rep <= MAX_REPUTATION);
        }
        assert_eq!(rep, 100);

        for _ in 0..80 {
            rep = apply_task_outcome(rep, false);
        }
        assert_eq!(rep, 0);
    }

    #[test]
    fn test_success_rate_anchored_to_reputation() {
        assert_eq!(success_rate(1, 1), 100.0);
        assert_eq!(success_rate(0, 1), 0.0);
        assert_eq!(success_rate(10, 20), 50.0);
        // Large reputation with few tasks would exceed 100 without the clamp
        assert_eq!(success_rate(80, 2), 100.0);
    }

    #[test]
    fn test_success_rate_no_tasks() {
        assert_eq!(success_rate(0, 0), 100.0);
    }

    #[test]
    fn test_clamp_live_score() {
        assert_eq!(clamp_live_score(12), 10);
        assert_eq!(clamp_live_score(-14), -10);
        assert_eq!(clamp_live_score(3), 3);
    }
}

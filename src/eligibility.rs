//! Rank-window eligibility check.
//!
//! A challenge is only allowed between players whose ranks are within the
//! configured maximum difference. This is the authoritative server-side
//! check; UI-side gating is advisory and must not be trusted.

/// True iff `|current_rank - target_rank| <= max_rank_difference`.
///
/// Pure and total over its inputs; malformed ranks are a caller
/// precondition, not an error case.
pub fn can_challenge(current_rank: u32, target_rank: u32, max_rank_difference: u32) -> bool {
    current_rank.abs_diff(target_rank) <= max_rank_difference
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_window() {
        assert!(can_challenge(3, 5, 5));
        assert!(can_challenge(5, 3, 5));
        assert!(can_challenge(7, 7, 5));
    }

    #[test]
    fn test_boundary_at_default_window() {
        // max = 5: gap of exactly 5 allowed, 6 rejected
        assert!(can_challenge(10, 15, 5));
        assert!(can_challenge(15, 10, 5));
        assert!(!can_challenge(10, 16, 5));
        assert!(!can_challenge(16, 10, 5));
    }

    #[test]
    fn test_tightened_window() {
        assert!(can_challenge(1, 4, 3));
        assert!(!can_challenge(1, 5, 3));
    }

    #[test]
    fn test_zero_window_only_equal_ranks() {
        assert!(can_challenge(4, 4, 0));
        assert!(!can_challenge(4, 5, 0));
    }
}

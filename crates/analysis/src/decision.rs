//! Vectorization Decision Engine
//!
//! Reduces the independent analysis signals to a single verdict and a
//! vector width. A detected reduction is assumed safe to vectorize via a
//! parallel tree reduction regardless of the naive dependency heuristic:
//! true reductions are commutative and associative by construction of the
//! detector. That asymmetry is a recorded trade-off, not a proof.

/// The combined signals of the four analysis passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
    pub has_dependency: bool,
    pub uniform: bool,
    pub is_reduction: bool,
    pub has_constant_trip_count: bool,
    pub trip_count: u64,
    pub is_simple_pattern: bool,
}

/// The engine's verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub is_vectorizable: bool,
    /// Zero exactly when the loop is not vectorizable
    pub recommended_width: u32,
}

/// Width used for reductions and short or unknown trip counts
pub const NARROW_WIDTH: u32 = 4;
/// Width used when the trip count is known to cover at least one wide vector
pub const WIDE_WIDTH: u32 = 8;

/// Pure decision function over the analysis signals.
pub const fn decide(signals: &Signals) -> Verdict {
    let eligible =
        signals.has_constant_trip_count || signals.is_reduction || signals.is_simple_pattern;
    let dependency_safe = !signals.has_dependency || signals.is_reduction;
    let is_vectorizable = eligible && dependency_safe && signals.uniform;

    let recommended_width = if !is_vectorizable {
        0
    } else if signals.is_reduction {
        NARROW_WIDTH
    } else if signals.has_constant_trip_count && signals.trip_count >= WIDE_WIDTH as u64 {
        WIDE_WIDTH
    } else {
        NARROW_WIDTH
    };

    Verdict {
        is_vectorizable,
        recommended_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const fn signals(
        has_dependency: bool,
        uniform: bool,
        is_reduction: bool,
        trip: Option<u64>,
        is_simple_pattern: bool,
    ) -> Signals {
        Signals {
            has_dependency,
            uniform,
            is_reduction,
            has_constant_trip_count: trip.is_some(),
            trip_count: match trip {
                Some(n) => n,
                None => 0,
            },
            is_simple_pattern,
        }
    }

    #[test]
    fn dependency_without_reduction_blocks_vectorization() {
        let verdict = decide(&signals(true, true, false, Some(128), true));
        assert!(!verdict.is_vectorizable);
        assert_eq!(verdict.recommended_width, 0);
    }

    #[test]
    fn reduction_masks_the_dependency_heuristic() {
        let verdict = decide(&signals(true, true, true, None, false));
        assert!(verdict.is_vectorizable);
        assert_eq!(verdict.recommended_width, NARROW_WIDTH);
    }

    #[test]
    fn long_constant_trip_count_selects_wide_vectors() {
        let verdict = decide(&signals(false, true, false, Some(128), true));
        assert_eq!(verdict.recommended_width, WIDE_WIDTH);
    }

    #[test]
    fn short_trip_count_stays_narrow() {
        let verdict = decide(&signals(false, true, false, Some(4), false));
        assert!(verdict.is_vectorizable);
        assert_eq!(verdict.recommended_width, NARROW_WIDTH);
    }

    #[test]
    fn mixed_types_block_everything() {
        let verdict = decide(&signals(false, false, true, Some(128), true));
        assert!(!verdict.is_vectorizable);
    }

    #[test]
    fn no_positive_signal_means_not_vectorizable() {
        let verdict = decide(&signals(false, true, false, None, false));
        assert!(!verdict.is_vectorizable);
    }

    proptest! {
        #[test]
        fn width_is_positive_iff_vectorizable(
            has_dependency: bool,
            uniform: bool,
            is_reduction: bool,
            trip in proptest::option::of(0u64..1_000_000),
            is_simple_pattern: bool,
        ) {
            let verdict = decide(&signals(has_dependency, uniform, is_reduction, trip, is_simple_pattern));
            prop_assert_eq!(verdict.is_vectorizable, verdict.recommended_width > 0);
        }

        #[test]
        fn reductions_always_get_narrow_width(
            has_dependency: bool,
            trip in proptest::option::of(0u64..1_000_000),
            is_simple_pattern: bool,
        ) {
            let verdict = decide(&signals(has_dependency, true, true, trip, is_simple_pattern));
            prop_assert!(verdict.is_vectorizable);
            prop_assert_eq!(verdict.recommended_width, NARROW_WIDTH);
        }

        #[test]
        fn non_uniform_is_never_vectorizable(
            has_dependency: bool,
            is_reduction: bool,
            trip in proptest::option::of(0u64..1_000_000),
            is_simple_pattern: bool,
        ) {
            let verdict = decide(&signals(has_dependency, false, is_reduction, trip, is_simple_pattern));
            prop_assert!(!verdict.is_vectorizable);
        }
    }
}

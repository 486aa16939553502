//! Range specs over history rings.
//!
//! A [`RangeSpec`] is what the user asked for (`3`, `1..4`, `-5..-1`, `2..`).
//! A [`ResolvedRange`] is that request pinned to absolute indices against a
//! ring whose length is known at resolution time.
//!
//! Resolution never fails: requests that fall outside the ring, or whose
//! bounds are reversed, resolve to an empty range.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// One endpoint of a [`RangeSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Absolute, zero-based position.
    Index(usize),
    /// Offset from the end; `FromEnd(1)` is the most recent entry.
    FromEnd(usize),
}

impl Bound {
    /// Converts the bound to a signed absolute index for a ring of `length`.
    ///
    /// The result may lie outside `[0, length)`; clamping is the caller's job.
    /// Computed in `i128` so no `usize` bound can overflow.
    fn absolute(self, length: usize) -> i128 {
        match self {
            Bound::Index(n) => n as i128,
            Bound::FromEnd(k) => length as i128 - k as i128,
        }
    }

    fn as_signed(self) -> i128 {
        match self {
            Bound::Index(n) => n as i128,
            Bound::FromEnd(k) => -(k as i128),
        }
    }
}

impl From<i64> for Bound {
    fn from(value: i64) -> Self {
        if value < 0 {
            Bound::FromEnd(value.unsigned_abs() as usize)
        } else {
            Bound::Index(value as usize)
        }
    }
}

/// A user-supplied selection of ring entries, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub start: Bound,
    pub end: Bound,
    /// Written as `a...b`: the end bound itself is not selected.
    pub exclusive_end: bool,
}

impl RangeSpec {
    /// Offset of the oldest entry in the recent window.
    pub const RECENT_WINDOW: usize = 5;

    pub fn new(start: Bound, end: Bound) -> Self {
        Self {
            start,
            end,
            exclusive_end: false,
        }
    }

    /// A spec selecting exactly one entry.
    pub fn single(bound: Bound) -> Self {
        Self::new(bound, bound)
    }

    /// The window used when the user does not name a range: `-5..-1`.
    pub fn recent_window() -> Self {
        Self::new(Bound::FromEnd(Self::RECENT_WINDOW), Bound::FromEnd(1))
    }

    /// Every entry of the ring: `0..-1`.
    pub fn all() -> Self {
        Self::new(Bound::Index(0), Bound::FromEnd(1))
    }

    /// Reinterprets a one-based spec (line numbers) as a zero-based one.
    ///
    /// `Index(0)` is treated like `Index(1)`; offsets from the end are
    /// already position independent and stay as they are.
    #[must_use]
    pub fn to_zero_based(self) -> Self {
        let shift = |bound: Bound| match bound {
            Bound::Index(n) => Bound::Index(n.saturating_sub(1)),
            other => other,
        };
        Self {
            start: shift(self.start),
            end: shift(self.end),
            exclusive_end: self.exclusive_end,
        }
    }

    /// Pins this spec to absolute indices in a ring of `length` entries.
    pub fn resolve(self, length: usize) -> ResolvedRange {
        if length == 0 {
            return ResolvedRange::EMPTY;
        }

        let last_index = length as i128 - 1;
        let start = self.start.absolute(length);
        let mut end = self.end.absolute(length);
        if self.exclusive_end {
            end -= 1;
        }

        // Reversed, or entirely outside the ring.
        if start > end || end < 0 || start > last_index {
            return ResolvedRange::EMPTY;
        }

        ResolvedRange {
            first: start.max(0) as usize,
            last: end.min(last_index) as usize,
        }
    }
}

impl Default for RangeSpec {
    fn default() -> Self {
        Self::recent_window()
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end && !self.exclusive_end {
            return write!(f, "{}", self.start.as_signed());
        }
        let dots = if self.exclusive_end { "..." } else { ".." };
        write!(
            f,
            "{}{}{}",
            self.start.as_signed(),
            dots,
            self.end.as_signed()
        )
    }
}

/// Error returned when range text cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeParseError {
    input: String,
}

impl fmt::Display for RangeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid range '{}': expected N, A..B, A...B, A.. or ..B",
            self.input
        )
    }
}

impl std::error::Error for RangeParseError {}

impl FromStr for RangeSpec {
    type Err = RangeParseError;

    /// Parses `N`, `A..B`, `A...B`, `A..` and `..B`; any bound may be negative.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || RangeParseError {
            input: s.to_string(),
        };
        let text = s.trim();
        if text.is_empty() {
            return Err(err());
        }

        let parse_bound = |raw: &str| -> Result<Option<Bound>, RangeParseError> {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(None);
            }
            raw.parse::<i64>()
                .ok()
                .map(|n| Some(Bound::from(n)))
                .ok_or_else(err)
        };

        let (start, end, exclusive_end) = if let Some((a, b)) = text.split_once("...") {
            (a, Some(b), true)
        } else if let Some((a, b)) = text.split_once("..") {
            (a, Some(b), false)
        } else {
            (text, None, false)
        };

        let Some(end) = end else {
            let bound = parse_bound(start)?.ok_or_else(err)?;
            return Ok(Self::single(bound));
        };

        let start_bound = parse_bound(start)?;
        let end_bound = parse_bound(end)?;
        if start_bound.is_none() && end_bound.is_none() {
            return Err(err());
        }

        Ok(Self {
            start: start_bound.unwrap_or(Bound::Index(0)),
            // An open end always runs through the most recent entry.
            exclusive_end: exclusive_end && end_bound.is_some(),
            end: end_bound.unwrap_or(Bound::FromEnd(1)),
        })
    }
}

/// A [`RangeSpec`] resolved against a ring: absolute, clamped, inclusive.
///
/// Empty when `first > last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    first: usize,
    last: usize,
}

impl ResolvedRange {
    pub const EMPTY: ResolvedRange = ResolvedRange { first: 1, last: 0 };

    pub fn first(&self) -> usize {
        self.first
    }

    pub fn last(&self) -> usize {
        self.last
    }

    pub fn is_empty(&self) -> bool {
        self.first > self.last
    }

    /// Absolute indices in increasing order.
    pub fn indices(&self) -> RangeInclusive<usize> {
        self.first..=self.last
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn spec(start: i64, end: i64) -> RangeSpec {
        RangeSpec::new(Bound::from(start), Bound::from(end))
    }

    fn indices(range: ResolvedRange) -> Vec<usize> {
        range.indices().collect()
    }

    #[test]
    fn test_last_entry_resolves_to_length_minus_one() {
        let resolved = spec(-1, -1).resolve(7);
        assert_eq!((resolved.first(), resolved.last()), (6, 6));
    }

    #[test]
    fn test_default_is_recent_window() {
        assert_eq!(RangeSpec::default(), spec(-5, -1));
        assert_eq!(indices(RangeSpec::default().resolve(8)), vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_recent_window_clamps_on_short_ring() {
        assert_eq!(indices(RangeSpec::recent_window().resolve(3)), vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_ring_resolves_empty() {
        assert!(spec(0, 0).resolve(0).is_empty());
        assert!(RangeSpec::all().resolve(0).is_empty());
        assert_eq!(RangeSpec::recent_window().resolve(0).indices().count(), 0);
    }

    #[test]
    fn test_end_past_ring_is_clamped() {
        assert_eq!(indices(spec(1, 40).resolve(4)), vec![1, 2, 3]);
    }

    #[test]
    fn test_start_before_ring_is_clamped() {
        assert_eq!(indices(spec(-40, 1).resolve(4)), vec![0, 1]);
    }

    #[test]
    fn test_range_outside_ring_is_empty() {
        assert!(spec(10, 12).resolve(4).is_empty());
        assert!(spec(-20, -10).resolve(4).is_empty());
    }

    #[test]
    fn test_reversed_range_is_empty() {
        assert!(spec(3, 1).resolve(5).is_empty());
        assert!(spec(-1, -3).resolve(5).is_empty());
    }

    #[test]
    fn test_exclusive_end_drops_last_index() {
        let parsed: RangeSpec = "1...3".parse().unwrap();
        assert_eq!(indices(parsed.resolve(5)), vec![1, 2]);

        let parsed: RangeSpec = "-3...-1".parse().unwrap();
        assert_eq!(indices(parsed.resolve(5)), vec![2, 3]);

        let parsed: RangeSpec = "0...0".parse().unwrap();
        assert!(parsed.resolve(5).is_empty());
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!("3".parse::<RangeSpec>().unwrap(), spec(3, 3));
        assert_eq!("-2".parse::<RangeSpec>().unwrap(), spec(-2, -2));
        assert_eq!("1..4".parse::<RangeSpec>().unwrap(), spec(1, 4));
        assert_eq!("-5..-1".parse::<RangeSpec>().unwrap(), spec(-5, -1));
        assert_eq!("2..".parse::<RangeSpec>().unwrap(), spec(2, -1));
        assert_eq!("..3".parse::<RangeSpec>().unwrap(), spec(0, 3));
        assert_eq!(" 1 .. 2 ".parse::<RangeSpec>().unwrap(), spec(1, 2));

        let open_exclusive: RangeSpec = "2...".parse().unwrap();
        assert!(!open_exclusive.exclusive_end);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "..", "a", "1..b", "1-3", "--1"] {
            assert!(input.parse::<RangeSpec>().is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for text in ["3", "-1", "1..4", "-5..-1", "0...-1"] {
            let parsed: RangeSpec = text.parse().unwrap();
            assert_eq!(parsed.to_string(), text);
        }
    }

    #[test]
    fn test_extreme_bounds_clamp_to_whole_ring() {
        let everything = vec![0, 1, 2];
        assert_eq!(
            indices(RangeSpec::new(Bound::Index(0), Bound::Index(usize::MAX)).resolve(3)),
            everything
        );
        assert_eq!(
            indices(RangeSpec::new(Bound::FromEnd(usize::MAX), Bound::FromEnd(1)).resolve(3)),
            everything
        );
        assert_eq!(
            indices(RangeSpec::new(Bound::FromEnd(usize::MAX), Bound::Index(usize::MAX)).resolve(3)),
            everything
        );
        assert!(RangeSpec::single(Bound::Index(usize::MAX)).resolve(3).is_empty());
        assert!(RangeSpec::single(Bound::FromEnd(usize::MAX)).resolve(3).is_empty());
    }

    #[test]
    fn test_i64_min_bound_parses_resolves_and_displays() {
        let text = "-9223372036854775808..-1";
        let parsed: RangeSpec = text.parse().unwrap();

        assert_eq!(indices(parsed.resolve(3)), vec![0, 1, 2]);
        assert_eq!(parsed.to_string(), text);
        assert_eq!(
            "9223372036854775807".parse::<RangeSpec>().unwrap().to_string(),
            "9223372036854775807"
        );
    }

    #[test]
    fn test_to_zero_based_shifts_indices_only() {
        assert_eq!(spec(1, 3).to_zero_based(), spec(0, 2));
        assert_eq!(spec(0, -1).to_zero_based(), spec(0, -1));
        assert_eq!(spec(5, -2).to_zero_based(), spec(4, -2));
    }

    proptest! {
        #[test]
        fn resolved_range_stays_inside_ring(
            start in -30i64..30,
            end in -30i64..30,
            length in 0usize..20,
        ) {
            let resolved = spec(start, end).resolve(length);
            if length == 0 {
                prop_assert!(resolved.is_empty());
            }
            if !resolved.is_empty() {
                prop_assert!(resolved.last() < length);
                prop_assert!(resolved.first() <= resolved.last());
            }
            prop_assert!(resolved.indices().all(|index| index < length));
        }

        #[test]
        fn extreme_bounds_never_panic_and_stay_inside_ring(
            start in prop_oneof![
                Just(i64::MIN),
                Just(i64::MAX),
                any::<i64>(),
                -30i64..30,
            ],
            end in prop_oneof![
                Just(i64::MIN),
                Just(i64::MAX),
                any::<i64>(),
                -30i64..30,
            ],
            exclusive_end in any::<bool>(),
            length in prop_oneof![Just(0usize), 1usize..20, Just(usize::MAX)],
        ) {
            let range = RangeSpec {
                exclusive_end,
                ..spec(start, end)
            };
            let resolved = range.resolve(length);
            if !resolved.is_empty() {
                prop_assert!(resolved.first() <= resolved.last());
                prop_assert!(resolved.last() < length);
            }
            let reparsed: RangeSpec = range.to_string().parse().unwrap();
            prop_assert_eq!(reparsed.resolve(length), resolved);
        }

        #[test]
        fn usize_bounds_resolve_like_saturated_bounds(
            start in prop_oneof![Just(usize::MAX), 0usize..30],
            end in prop_oneof![Just(usize::MAX), 0usize..30],
            length in 1usize..20,
        ) {
            let huge = RangeSpec::new(Bound::FromEnd(start), Bound::Index(end)).resolve(length);
            let saturated = RangeSpec::new(
                Bound::FromEnd(start.min(length + 1)),
                Bound::Index(end.min(length + 1)),
            )
            .resolve(length);
            prop_assert_eq!(huge, saturated);
        }

        #[test]
        fn negative_single_index_counts_from_end(k in 1usize..20, extra in 0usize..20) {
            let length = k + extra;
            let resolved = RangeSpec::single(Bound::FromEnd(k)).resolve(length);
            prop_assert_eq!(resolved.first(), length - k);
            prop_assert_eq!(resolved.last(), length - k);
        }
    }
}

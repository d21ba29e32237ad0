//! Expands `--test`/`--skip` arguments of the form `N[,N|N-N]*` into a
//! membership predicate over test indices.

use std::collections::BTreeSet;

use crate::error::{TestError, TestResult};

/// A membership predicate over positive integers, as produced by
/// [`parse`]. `Empty` means "no filter active" -- it is what an empty
/// string or literal `"0"` parses to, and is treated specially by the
/// driver (an empty *run* range means "run everything"; an empty *skip*
/// range means "skip nothing").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeSet {
    Empty,
    Set(BTreeSet<u64>),
}

impl RangeSet {
    pub fn contains(&self, index: u64) -> bool {
        match self {
            RangeSet::Empty => false,
            RangeSet::Set(set) => set.contains(&index),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RangeSet::Empty)
    }
}

/// Parses a range expression.
///
/// Empty input and the literal `"0"` both produce [`RangeSet::Empty`].
/// Anything outside `[0-9,-]` is a parse failure, as is a dangling `-`
/// (`-5` or `5-`).
pub fn parse(raw: &str) -> TestResult<RangeSet> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "0" {
        return Ok(RangeSet::Empty);
    }

    if !raw.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '-') {
        return Err(TestError::InvalidRange(raw.to_string()));
    }

    let mut set = BTreeSet::new();
    for part in raw.split(',') {
        if part.is_empty() {
            return Err(TestError::InvalidRange(raw.to_string()));
        }

        match part.split_once('-') {
            Some((lo, hi)) => {
                if lo.is_empty() || hi.is_empty() {
                    return Err(TestError::InvalidRange(raw.to_string()));
                }
                let lo: u64 = lo.parse().map_err(|_| TestError::InvalidRange(raw.to_string()))?;
                let hi: u64 = hi.parse().map_err(|_| TestError::InvalidRange(raw.to_string()))?;
                let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
                set.extend(lo..=hi);
            }
            None => {
                let n: u64 = part.parse().map_err(|_| TestError::InvalidRange(raw.to_string()))?;
                set.insert(n);
            }
        }
    }

    Ok(RangeSet::Set(set))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[u64]) -> RangeSet {
        RangeSet::Set(values.iter().copied().collect())
    }

    #[test]
    fn empty_and_zero_are_the_empty_predicate() {
        assert_eq!(parse("").unwrap(), RangeSet::Empty);
        assert_eq!(parse("0").unwrap(), RangeSet::Empty);
    }

    #[test]
    fn single_number() {
        assert_eq!(parse("3").unwrap(), set(&[3]));
    }

    #[test]
    fn range_is_inclusive() {
        assert_eq!(parse("5-7").unwrap(), set(&[5, 6, 7]));
    }

    #[test]
    fn reversed_range_is_normalized() {
        assert_eq!(parse("7-5").unwrap(), set(&[5, 6, 7]));
    }

    #[test]
    fn comma_list_is_union_and_idempotent() {
        assert_eq!(parse("3,1,1,2-4").unwrap(), parse("1,2,3,4").unwrap());
    }

    #[test]
    fn dangling_hyphen_is_a_parse_failure() {
        assert!(parse("-5").is_err());
        assert!(parse("5-").is_err());
    }

    #[test]
    fn stray_characters_are_a_parse_failure() {
        assert!(parse("1;2").is_err());
        assert!(parse("abc").is_err());
    }
}

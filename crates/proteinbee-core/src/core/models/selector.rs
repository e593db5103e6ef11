use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

/// Largest residue number expressible in a selector token (five decimal digits).
pub const MAX_RESIDUE_NUMBER: isize = 99_999;

const MAX_DIGITS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error(
        "Invalid selector string: {input}. The selector string should be of the form: A786-790."
    )]
    InvalidFormat { input: String },

    #[error(
        "Invalid range: ({start}, {end}) in selector '{input}'. The number left of '-' should not be greater than the number right of '-'."
    )]
    InvalidRange {
        input: String,
        start: isize,
        end: isize,
    },

    #[error("Invalid chain identifier '{0}'. Chains are a single uppercase letter A-Z.")]
    InvalidChain(char),

    #[error("Residue number {0} is outside the selectable range 0-99999.")]
    OutOfBounds(isize),
}

/// A contiguous, inclusive range of residues on a single chain, e.g. `A786-790`.
///
/// Selectors are plain values: they compare, hash and order by
/// `(chain, start, end)` and are never mutated after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Selector {
    chain: char,
    start: isize,
    end: isize,
}

impl Selector {
    /// Creates a selector from its parts, enforcing the same constraints as the
    /// textual grammar.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::InvalidChain`] for a chain outside `A-Z`,
    /// [`SelectorError::OutOfBounds`] for residue numbers that do not fit five
    /// digits, and [`SelectorError::InvalidRange`] when `start > end`.
    pub fn new(chain: char, start: isize, end: isize) -> Result<Self, SelectorError> {
        if !chain.is_ascii_uppercase() {
            return Err(SelectorError::InvalidChain(chain));
        }
        for bound in [start, end] {
            if !(0..=MAX_RESIDUE_NUMBER).contains(&bound) {
                return Err(SelectorError::OutOfBounds(bound));
            }
        }
        if start > end {
            return Err(SelectorError::InvalidRange {
                input: format!("{chain}{start}-{end}"),
                start,
                end,
            });
        }
        Ok(Self { chain, start, end })
    }

    /// Parses a selector token of the form `<Chain><Start>-<End>`.
    ///
    /// The chain is one uppercase letter; both bounds are 1-5 decimal digits and
    /// the hyphenated range is mandatory.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::InvalidFormat`] when the token does not match the
    /// grammar and [`SelectorError::InvalidRange`] when the start exceeds the end.
    pub fn from_string(s: &str) -> Result<Self, SelectorError> {
        let (chain, start, end) = pattern_check(s)?;
        range_check(s, start, end)?;
        Ok(Self { chain, start, end })
    }

    /// Returns `true` when `s` is a valid selector token, i.e. exactly when
    /// [`Selector::from_string`] would succeed.
    pub fn check_string(s: &str) -> bool {
        pattern_check(s).is_ok_and(|(_, start, end)| range_check(s, start, end).is_ok())
    }

    /// The chain ID.
    pub fn chain(&self) -> char {
        self.chain
    }

    /// The first residue number of the range.
    pub fn start(&self) -> isize {
        self.start
    }

    /// The last residue number of the range (inclusive).
    pub fn end(&self) -> isize {
        self.end
    }

    /// The number of residues covered by the selector.
    pub fn length(&self) -> usize {
        self.start.abs_diff(self.end) + 1
    }

    pub fn contains(&self, residue_id: isize) -> bool {
        self.residue_ids().contains(&residue_id)
    }

    pub fn residue_ids(&self) -> RangeInclusive<isize> {
        self.start..=self.end
    }
}

fn is_residue_number(digits: &str) -> bool {
    (1..=MAX_DIGITS).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
}

fn pattern_check(s: &str) -> Result<(char, isize, isize), SelectorError> {
    let invalid = || SelectorError::InvalidFormat {
        input: s.to_string(),
    };

    let mut chars = s.chars();
    let chain = chars.next().filter(char::is_ascii_uppercase).ok_or_else(invalid)?;
    let (start, end) = chars.as_str().split_once('-').ok_or_else(invalid)?;
    if !is_residue_number(start) || !is_residue_number(end) {
        return Err(invalid());
    }

    let start = start.parse().map_err(|_| invalid())?;
    let end = end.parse().map_err(|_| invalid())?;
    Ok((chain, start, end))
}

fn range_check(s: &str, start: isize, end: isize) -> Result<(), SelectorError> {
    if start > end {
        return Err(SelectorError::InvalidRange {
            input: s.to_string(),
            start,
            end,
        });
    }
    Ok(())
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}-{}", self.chain, self.start, self.end)
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_string(&s).map_err(serde::de::Error::custom)
    }
}

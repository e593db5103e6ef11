use super::selector::{Selector, SelectorError};
use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Delimiter used when none is given, and by every designed-structure motif.
pub const DEFAULT_DELIMITER: char = '/';

/// Segment value marking an explicit break between chains. It is never
/// renumbered and is skipped by [`Motif::segment_iter`].
pub const CHAIN_BREAK: isize = -1;

/// Segment value that separates chains when a motif is split with
/// [`Motif::split_by_chain`]. Everywhere else it is an ordinary zero-length segment.
pub const CHAIN_SPLIT: isize = 0;

const DESIGNED_CHAIN_POOL: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MotifError {
    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("Invalid segment length '{0}' in motif.")]
    InvalidSegment(String),

    #[error("Motif has no components.")]
    EmptyMotif,

    #[error("Cannot assign more than {max} chains to a designed structure.")]
    ChainPoolExhausted { max: usize },
}

/// One entry of a motif: either a residue range or a segment length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotifComponent {
    Selector(Selector),
    /// Number of unselected residues, or one of the [`CHAIN_BREAK`] /
    /// [`CHAIN_SPLIT`] markers.
    Segment(isize),
}

impl MotifComponent {
    /// Classifies a single token: decimal digits and the literal `-1` are
    /// segments, anything else must be a valid selector.
    pub fn parse(token: &str) -> Result<Self, MotifError> {
        let is_segment = token == "-1"
            || (!token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()));
        if is_segment {
            token
                .parse()
                .map(MotifComponent::Segment)
                .map_err(|_| MotifError::InvalidSegment(token.to_string()))
        } else {
            Ok(MotifComponent::Selector(Selector::from_string(token)?))
        }
    }

    pub fn as_selector(&self) -> Option<&Selector> {
        match self {
            MotifComponent::Selector(selector) => Some(selector),
            MotifComponent::Segment(_) => None,
        }
    }

    pub fn as_segment(&self) -> Option<isize> {
        match self {
            MotifComponent::Selector(_) => None,
            MotifComponent::Segment(length) => Some(*length),
        }
    }
}

impl From<Selector> for MotifComponent {
    fn from(selector: Selector) -> Self {
        MotifComponent::Selector(selector)
    }
}

impl From<isize> for MotifComponent {
    fn from(length: isize) -> Self {
        MotifComponent::Segment(length)
    }
}

impl fmt::Display for MotifComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotifComponent::Selector(selector) => fmt::Display::fmt(selector, f),
            MotifComponent::Segment(length) => fmt::Display::fmt(length, f),
        }
    }
}

/// An ordered description of residue ranges and the segments between them,
/// e.g. `10/A322-326/5/0/B531-539/5/B551-562`.
///
/// The delimiter is kept per instance so a motif serializes back to exactly the
/// text it was parsed from. Two motifs are equal when both their components and
/// their delimiters are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Motif {
    components: Vec<MotifComponent>,
    delim: char,
}

impl Motif {
    /// Builds a motif from already classified components.
    ///
    /// # Errors
    ///
    /// Returns [`MotifError::EmptyMotif`] for an empty component list and
    /// [`MotifError::InvalidSegment`] for a segment below [`CHAIN_BREAK`].
    pub fn new(components: Vec<MotifComponent>, delim: char) -> Result<Self, MotifError> {
        if components.is_empty() {
            return Err(MotifError::EmptyMotif);
        }
        if let Some(length) = components
            .iter()
            .filter_map(MotifComponent::as_segment)
            .find(|&length| length < CHAIN_BREAK)
        {
            return Err(MotifError::InvalidSegment(length.to_string()));
        }
        Ok(Self::from_components(components, delim))
    }

    fn from_components(components: Vec<MotifComponent>, delim: char) -> Self {
        Self { components, delim }
    }

    /// Parses a motif from `s`, splitting on `delim`.
    ///
    /// # Errors
    ///
    /// Fails on the first token that is neither a segment nor a valid selector.
    pub fn from_string(s: &str, delim: char) -> Result<Self, MotifError> {
        let components = s
            .split(delim)
            .map(MotifComponent::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_components(components, delim))
    }

    /// Parses a motif using [`DEFAULT_DELIMITER`].
    pub fn parse(s: &str) -> Result<Self, MotifError> {
        Self::from_string(s, DEFAULT_DELIMITER)
    }

    pub fn components(&self) -> &[MotifComponent] {
        &self.components
    }

    pub fn delimiter(&self) -> char {
        self.delim
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterates over the selectors of the motif in order.
    pub fn selector_iter(&self) -> impl Iterator<Item = &Selector> + '_ {
        self.components.iter().filter_map(MotifComponent::as_selector)
    }

    /// Iterates over the segment lengths of the motif in order, skipping
    /// [`CHAIN_BREAK`] markers. Zero-length segments are included.
    pub fn segment_iter(&self) -> impl Iterator<Item = isize> + '_ {
        self.components
            .iter()
            .filter_map(MotifComponent::as_segment)
            .filter(|&length| length != CHAIN_BREAK)
    }

    /// Counts how often each distinct selector occurs, in order of first occurrence.
    pub fn get_selector_counts(&self) -> Vec<(Selector, usize)> {
        let mut positions: HashMap<Selector, usize> = HashMap::new();
        let mut counts: Vec<(Selector, usize)> = Vec::new();
        for selector in self.selector_iter() {
            match positions.entry(*selector) {
                Entry::Occupied(entry) => counts[*entry.get()].1 += 1,
                Entry::Vacant(entry) => {
                    entry.insert(counts.len());
                    counts.push((*selector, 1));
                }
            }
        }
        counts
    }

    /// How often `selector` occurs in the motif.
    pub fn count_of(&self, selector: &Selector) -> usize {
        self.selector_iter().filter(|&s| s == selector).count()
    }

    /// Number of residues spanned by the motif once packed into a designed chain.
    ///
    /// Matches the cursor walk of [`Motif::get_motif_wrt_designed_structure`], so
    /// each [`CHAIN_BREAK`] takes one residue off the total.
    pub fn total_length(&self) -> usize {
        let total: isize = self
            .components
            .iter()
            .map(|component| match component {
                MotifComponent::Selector(selector) => selector.length() as isize,
                MotifComponent::Segment(length) => *length,
            })
            .sum();
        usize::try_from(total).unwrap_or(0)
    }

    /// Renumbers and rechains the motif onto a designed single-chain structure.
    ///
    /// Walking the components with a 1-based cursor, each segment is copied as-is
    /// and advances the cursor by its length; each selector is replaced by a
    /// selector on `chain_id` covering the same number of residues starting at the
    /// cursor. A [`CHAIN_BREAK`] is a segment like any other, so it steps the
    /// cursor back by one. The result always uses [`DEFAULT_DELIMITER`].
    ///
    /// # Errors
    ///
    /// Returns [`MotifError::EmptyMotif`] for a motif without components (such as
    /// the empty chain before a leading [`CHAIN_SPLIT`]), and
    /// [`MotifError::Selector`] if `chain_id` is not an uppercase letter or a
    /// renumbered selector no longer fits five digits.
    pub fn get_motif_wrt_designed_structure(&self, chain_id: char) -> Result<Motif, MotifError> {
        if self.components.is_empty() {
            return Err(MotifError::EmptyMotif);
        }
        let mut cursor: isize = 1;
        let mut components = Vec::with_capacity(self.components.len());
        for component in &self.components {
            match *component {
                MotifComponent::Segment(length) => {
                    components.push(*component);
                    cursor += length;
                }
                MotifComponent::Selector(selector) => {
                    let length = selector.length() as isize;
                    let designed = Selector::new(chain_id, cursor, cursor + length - 1)?;
                    components.push(MotifComponent::Selector(designed));
                    cursor += length;
                }
            }
        }
        Ok(Motif::from_components(components, DEFAULT_DELIMITER))
    }

    /// Splits the motif on [`CHAIN_SPLIT`] and renumbers every chain onto its own
    /// designed chain, lettered `A`, `B`, `C`, ... in order.
    ///
    /// Yields [`MotifError::EmptyMotif`] for an empty chain and
    /// [`MotifError::ChainPoolExhausted`] for any chain past the 26th.
    pub fn get_motif_wrt_designed_structure_multi_chain(
        &self,
    ) -> impl Iterator<Item = Result<Motif, MotifError>> + '_ {
        self.split_by_chain()
            .enumerate()
            .map(|(index, chain_motif)| {
                let chain_id = DESIGNED_CHAIN_POOL.chars().nth(index).ok_or(
                    MotifError::ChainPoolExhausted {
                        max: DESIGNED_CHAIN_POOL.len(),
                    },
                )?;
                chain_motif.get_motif_wrt_designed_structure(chain_id)
            })
    }

    /// Splits the motif into one motif per chain, using [`CHAIN_SPLIT`] segments
    /// as boundaries. The boundary segments themselves are dropped.
    pub fn split_by_chain(&self) -> SplitByChain<'_> {
        SplitByChain {
            components: &self.components,
            delim: self.delim,
            position: 0,
        }
    }
}

/// Iterator returned by [`Motif::split_by_chain`].
///
/// Every [`CHAIN_SPLIT`] closes the current batch, so leading or repeated
/// boundaries produce empty motifs, while a boundary in last position closes the
/// final batch without opening another one.
#[derive(Debug, Clone)]
pub struct SplitByChain<'a> {
    components: &'a [MotifComponent],
    delim: char,
    position: usize,
}

impl Iterator for SplitByChain<'_> {
    type Item = Motif;

    fn next(&mut self) -> Option<Self::Item> {
        let last = self.components.len().checked_sub(1)?;
        let mut batch = Vec::new();
        while let Some(&component) = self.components.get(self.position) {
            let index = self.position;
            self.position += 1;

            let is_boundary = component == MotifComponent::Segment(CHAIN_SPLIT);
            if is_boundary || index == last {
                if !is_boundary {
                    batch.push(component);
                }
                return Some(Motif::from_components(batch, self.delim));
            }
            batch.push(component);
        }
        None
    }
}

impl FromStr for Motif {
    type Err = MotifError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Motif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let delim = self.delim.to_string();
        write!(f, "{}", self.components.iter().join(&delim))
    }
}

impl Serialize for Motif {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Motif {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(s: &str) -> Selector {
        Selector::from_string(s).unwrap()
    }

    fn motif(s: &str) -> Motif {
        Motif::parse(s).unwrap()
    }

    fn strings(motifs: impl IntoIterator<Item = Motif>) -> Vec<String> {
        motifs.into_iter().map(|m| m.to_string()).collect()
    }

    mod parsing {
        use super::*;

        #[test]
        fn from_string_classifies_tokens_in_order() {
            let m = motif("25/A814-824/-1/0/B1-10");
            assert_eq!(
                m.components(),
                &[
                    MotifComponent::Segment(25),
                    MotifComponent::Selector(sel("A814-824")),
                    MotifComponent::Segment(-1),
                    MotifComponent::Segment(0),
                    MotifComponent::Selector(sel("B1-10")),
                ]
            );
            assert_eq!(m.delimiter(), '/');
            assert_eq!(m.len(), 5);
        }

        #[test]
        fn from_string_round_trips_with_any_delimiter() {
            let texts = [
                "A814-824",
                "25/A814-824/25",
                "10/A322-326/5/0/B531-539/5/B551-562",
                "A814-824/10/-1/25/B1-10",
                "0/0/X9-10/1000/X9-10",
            ];
            for delim in ['/', ',', '.'] {
                for text in texts {
                    let text = text.replace('/', &delim.to_string());
                    let m = Motif::from_string(&text, delim).unwrap();
                    assert_eq!(m.to_string(), text);
                    assert_eq!(Motif::from_string(&m.to_string(), delim).unwrap(), m);
                }
            }
        }

        #[test]
        fn constructed_motif_equals_parsed_motif() {
            let components = vec![
                MotifComponent::from(12),
                MotifComponent::from(sel("Q5-9")),
                MotifComponent::from(sel("Q5-9")),
                MotifComponent::from(0),
            ];
            let built = Motif::new(components, ',').unwrap();
            let text = built.to_string();
            assert_eq!(text, "12,Q5-9,Q5-9,0");
            assert_eq!(Motif::from_string(&text, ',').unwrap(), built);
        }

        #[test]
        fn new_rejects_components_that_do_not_print_back() {
            assert_eq!(Motif::new(Vec::new(), '/'), Err(MotifError::EmptyMotif));
            assert_eq!(
                Motif::new(vec![MotifComponent::from(sel("A1-5")), MotifComponent::from(-5)], '/'),
                Err(MotifError::InvalidSegment("-5".to_string()))
            );
            let with_break = Motif::new(
                vec![MotifComponent::from(sel("A1-5")), MotifComponent::from(CHAIN_BREAK)],
                '/',
            )
            .unwrap();
            assert_eq!(Motif::parse(&with_break.to_string()).unwrap(), with_break);
        }

        #[test]
        fn equality_includes_delimiter() {
            let slash = Motif::from_string("A1-5/3", '/').unwrap();
            let comma = Motif::from_string("A1-5,3", ',').unwrap();
            assert_eq!(slash.components(), comma.components());
            assert_ne!(slash, comma);
        }

        #[test]
        fn invalid_selector_tokens_are_rejected() {
            assert!(matches!(
                Motif::parse("25/a814-824/25"),
                Err(MotifError::Selector(SelectorError::InvalidFormat { .. }))
            ));
            assert!(matches!(
                Motif::parse("A790-786"),
                Err(MotifError::Selector(SelectorError::InvalidRange { .. }))
            ));
            assert!(Motif::parse("-2/A1-5").is_err());
            assert!(Motif::parse("").is_err());
            assert!(Motif::parse("A1-5//3").is_err());
        }

        #[test]
        fn oversized_segments_are_rejected() {
            let huge = "9".repeat(40);
            assert_eq!(
                Motif::parse(&format!("A1-5/{huge}")),
                Err(MotifError::InvalidSegment(huge))
            );
        }

        #[test]
        fn wrong_delimiter_fails_to_parse() {
            assert!(Motif::from_string("A1-5/3", ',').is_err());
        }

        #[test]
        fn serde_uses_default_delimiter_string() {
            let m = motif("25/A814-824/25");
            let json = serde_json::to_string(&m).unwrap();
            assert_eq!(json, "\"25/A814-824/25\"");
            assert_eq!(serde_json::from_str::<Motif>(&json).unwrap(), m);
        }
    }

    mod iteration {
        use super::*;

        #[test]
        fn selector_and_segment_iterators_filter_components() {
            let m = motif("A814-824/10/-1/25/B1-10");
            let selectors: Vec<_> = m.selector_iter().copied().collect();
            assert_eq!(selectors, vec![sel("A814-824"), sel("B1-10")]);
            assert_eq!(m.segment_iter().collect::<Vec<_>>(), vec![10, 25]);
        }

        #[test]
        fn segment_iter_keeps_zero_segments() {
            let m = motif("0/A1-5/0/-1/3");
            assert_eq!(m.segment_iter().collect::<Vec<_>>(), vec![0, 0, 3]);
        }

        #[test]
        fn iterators_are_restartable() {
            let m = motif("A1-5/3/B2-4");
            assert_eq!(m.selector_iter().count(), 2);
            assert_eq!(m.selector_iter().count(), 2);
            assert_eq!(m.segment_iter().sum::<isize>(), 3);
            assert_eq!(m.segment_iter().sum::<isize>(), 3);
        }

        #[test]
        fn get_selector_counts_counts_by_value_in_first_occurrence_order() {
            let m = motif("25/C1146-1165/10/C1146-1165/0/A814-824/10/A814-824/25");
            assert_eq!(
                m.get_selector_counts(),
                vec![(sel("C1146-1165"), 2), (sel("A814-824"), 2)]
            );
        }

        #[test]
        fn count_of_looks_up_a_single_selector() {
            let m = motif("25/C1146-1165/10/C1146-1165/0/A814-824/25");
            assert_eq!(m.count_of(&sel("C1146-1165")), 2);
            assert_eq!(m.count_of(&sel("A814-824")), 1);
            assert_eq!(m.count_of(&sel("A814-825")), 0);
        }

        #[test]
        fn total_length_sums_selectors_and_segments() {
            assert_eq!(motif("25/A814-824/25").total_length(), 61);
            assert_eq!(motif("A1-5/-1/B1-5").total_length(), 9);
        }
    }

    mod designed_structure {
        use super::*;

        #[test]
        fn renumbers_selectors_after_leading_segment() {
            let designed = motif("25/A814-824/25")
                .get_motif_wrt_designed_structure('A')
                .unwrap();
            assert_eq!(designed.to_string(), "25/A26-36/25");
        }

        #[test]
        fn rechains_onto_requested_chain() {
            let designed = motif("B1-10/5/C20-22")
                .get_motif_wrt_designed_structure('Q')
                .unwrap();
            assert_eq!(designed.to_string(), "Q1-10/5/Q16-18");
        }

        #[test]
        fn chain_break_steps_the_cursor_back_by_one() {
            let designed = motif("A814-824/10/-1/25/B1-10")
                .get_motif_wrt_designed_structure('A')
                .unwrap();
            assert_eq!(designed.to_string(), "A1-11/10/-1/25/A46-55");
        }

        #[test]
        fn result_always_uses_default_delimiter() {
            let m = Motif::from_string("5,A10-12,2", ',').unwrap();
            let designed = m.get_motif_wrt_designed_structure('A').unwrap();
            assert_eq!(designed.delimiter(), DEFAULT_DELIMITER);
            assert_eq!(designed.to_string(), "5/A6-8/2");
        }

        #[test]
        fn rejects_invalid_chain_id() {
            assert_eq!(
                motif("A1-5").get_motif_wrt_designed_structure('a'),
                Err(MotifError::Selector(SelectorError::InvalidChain('a')))
            );
        }

        #[test]
        fn rejects_positions_beyond_five_digits() {
            assert!(matches!(
                motif("99990/A1-20").get_motif_wrt_designed_structure('A'),
                Err(MotifError::Selector(SelectorError::OutOfBounds(_)))
            ));
        }

        #[test]
        fn multi_chain_restarts_numbering_per_chain() {
            let designed: Vec<_> = motif("10/A322-326/5/0/B531-539/5/B551-562")
                .get_motif_wrt_designed_structure_multi_chain()
                .collect::<Result<_, _>>()
                .unwrap();
            assert_eq!(strings(designed), vec!["10/A11-15/5", "B1-9/5/B15-26"]);
        }

        #[test]
        fn empty_chains_are_errors_not_empty_motifs() {
            let results: Vec<_> = motif("0/A1-5")
                .get_motif_wrt_designed_structure_multi_chain()
                .collect();
            assert_eq!(results.len(), 2);
            assert_eq!(results[0], Err(MotifError::EmptyMotif));
            assert_eq!(results[1].as_ref().unwrap().to_string(), "B1-5");

            let empty = motif("0").split_by_chain().next().unwrap();
            assert_eq!(
                empty.get_motif_wrt_designed_structure('A'),
                Err(MotifError::EmptyMotif)
            );
            assert_eq!(
                motif("0").get_motif_wrt_designed_structure('A').unwrap().to_string(),
                "0"
            );
        }

        #[test]
        fn multi_chain_fails_past_twenty_six_chains() {
            let text = vec!["A1-2"; 27].join("/0/");
            let results: Vec<_> = motif(&text)
                .get_motif_wrt_designed_structure_multi_chain()
                .collect();
            assert_eq!(results.len(), 27);
            assert_eq!(results[25].as_ref().unwrap().to_string(), "Z1-2");
            assert_eq!(
                results[26],
                Err(MotifError::ChainPoolExhausted { max: 26 })
            );
        }
    }

    mod splitting {
        use super::*;

        #[test]
        fn splits_on_zero_segments() {
            let m = motif("10/A322-326/5/0/B531-539/5/B551-562");
            assert_eq!(
                strings(m.split_by_chain()),
                vec!["10/A322-326/5", "B531-539/5/B551-562"]
            );
        }

        #[test]
        fn preserves_delimiter_of_source_motif() {
            let m = Motif::from_string("A1-5,0,B1-5", ',').unwrap();
            let parts: Vec<_> = m.split_by_chain().collect();
            assert!(parts.iter().all(|p| p.delimiter() == ','));
        }

        #[test]
        fn motif_without_boundary_is_a_single_chain() {
            let m = motif("A1-5/3/A9-10");
            let parts: Vec<_> = m.split_by_chain().collect();
            assert_eq!(parts, vec![m.clone()]);
        }

        #[test]
        fn leading_and_repeated_boundaries_produce_empty_chains() {
            assert_eq!(strings(motif("0/A1-5").split_by_chain()), vec!["", "A1-5"]);
            assert_eq!(
                strings(motif("A1-5/0/0/B1-5").split_by_chain()),
                vec!["A1-5", "", "B1-5"]
            );
        }

        #[test]
        fn trailing_boundary_does_not_open_a_new_chain() {
            assert_eq!(strings(motif("A1-5/0").split_by_chain()), vec!["A1-5"]);
            assert_eq!(strings(motif("0").split_by_chain()), vec![""]);
        }

        #[test]
        fn empty_motif_yields_nothing() {
            let m = Motif::from_components(Vec::new(), '/');
            assert_eq!(m.split_by_chain().count(), 0);
            assert_eq!(m.get_motif_wrt_designed_structure_multi_chain().count(), 0);
        }

        #[test]
        fn chain_break_does_not_split() {
            assert_eq!(
                strings(motif("A1-5/-1/B1-5").split_by_chain()),
                vec!["A1-5/-1/B1-5"]
            );
        }
    }
}

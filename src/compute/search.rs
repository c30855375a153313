//! Relevance-ranked free-text search over places.
//!
//! Queries and fields go through the same normalization: lowercase, Unicode
//! decomposition with combining marks stripped, trimmed. The normalized
//! query is split on whitespace into terms, and a place matches only when
//! every term matches one of its field categories.
//!
//! For each term, categories are tried in a fixed order and the first one
//! that matches wins; a term never scores in two categories:
//!
//! | Order | Category | Scores |
//! |-------|----------|--------|
//! | 1 | Postal code (term has ≥ 5 digits) | exact 20, prefix 15, substring 10 |
//! | 2 | Address (house number, then text) | number 20; text as for names |
//! | 3 | City and neighborhood (weight 4 each) | exact 12, prefix 8, substring 4 per field |
//! | 4 | Name | exact 20, word 15, word prefix 10, substring 5 |
//!
//! A place's relevance is the sum of its term scores. Results are sorted by
//! relevance, highest first; equal scores keep dataset order.

use super::geo_math::bounding_box;
use crate::config::Config;
use geo::Rect;
use geoview_types::Place;
use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

static FIRST_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

pub const POSTAL_EXACT: u32 = 20;
pub const POSTAL_PREFIX: u32 = 15;
pub const POSTAL_SUBSTRING: u32 = 10;

pub const HOUSE_NUMBER_EXACT: u32 = 20;

pub const TEXT_EXACT: u32 = 20;
pub const TEXT_WORD: u32 = 15;
pub const TEXT_WORD_PREFIX: u32 = 10;
pub const TEXT_SUBSTRING: u32 = 5;

/// Per-field weight of the city and neighborhood category.
pub const LOCALITY_WEIGHT: u32 = 4;

/// Field category a term matched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField {
    PostalCode,
    HouseNumber,
    Address,
    Locality,
    Name,
}

/// A matched place and its relevance.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<'a> {
    pub place: &'a Place,
    pub score: u32,
    /// Category matched by each query term, in term order.
    pub matched: SmallVec<[MatchField; 4]>,
}

/// Ordered results plus the box the viewport should re-fit to.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome<'a> {
    pub query: String,
    pub results: Vec<SearchResult<'a>>,
    /// Bounding box of the results with valid coordinates.
    pub bounds: Option<Rect<f64>>,
}

impl SearchOutcome<'_> {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.place.id.as_str()).collect()
    }
}

/// Lowercase, strip diacritics and trim.
///
/// ```rust
/// use geoview::compute::search::normalize;
///
/// assert_eq!(normalize("  São JOSÉ  "), "sao jose");
/// assert_eq!(normalize("Conceição"), "conceicao");
/// ```
pub fn normalize(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// Keep only ASCII digits.
pub fn digits_only(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalized text field with its words.
#[derive(Debug, Clone, Default, PartialEq)]
struct TextField {
    full: String,
    words: Vec<String>,
}

impl TextField {
    fn new(raw: Option<&str>) -> Option<Self> {
        let full = normalize(raw?);
        if full.is_empty() {
            return None;
        }
        let words = words(&full);
        Some(Self { full, words })
    }

    fn score(&self, term: &str) -> u32 {
        if self.full == term {
            TEXT_EXACT
        } else if self.words.iter().any(|w| w == term) {
            TEXT_WORD
        } else if self.words.iter().any(|w| w.starts_with(term)) {
            TEXT_WORD_PREFIX
        } else if self.full.contains(term) {
            TEXT_SUBSTRING
        } else {
            0
        }
    }
}

/// Searchable, pre-normalized view of one place.
#[derive(Debug, Clone, Default, PartialEq)]
struct SearchDoc {
    postal_digits: Option<String>,
    address: Option<TextField>,
    house_number: Option<String>,
    city: Option<String>,
    neighborhood: Option<String>,
    name: Option<TextField>,
}

impl SearchDoc {
    fn new(place: &Place) -> Self {
        let normalized = |field: &Option<String>| {
            field
                .as_deref()
                .map(normalize)
                .filter(|value| !value.is_empty())
        };

        let house_number = place
            .address
            .as_deref()
            .and_then(|address| FIRST_NUMBER_RE.find(address))
            .map(|m| m.as_str().to_string());

        Self {
            postal_digits: place
                .postal_code
                .as_deref()
                .map(digits_only)
                .filter(|digits| !digits.is_empty()),
            address: TextField::new(place.address.as_deref()),
            house_number,
            city: normalized(&place.city),
            neighborhood: normalized(&place.neighborhood),
            name: TextField::new(Some(&place.name)),
        }
    }

    fn score_postal(&self, term: &str, min_digits: usize) -> u32 {
        let term_digits = digits_only(term);
        if term_digits.len() < min_digits {
            return 0;
        }
        let Some(postal) = &self.postal_digits else {
            return 0;
        };

        let same_region =
            postal.len() >= min_digits && postal[..min_digits] == term_digits[..min_digits];

        if *postal == term_digits {
            POSTAL_EXACT
        } else if postal.starts_with(&term_digits) || same_region {
            POSTAL_PREFIX
        } else if postal.contains(&term_digits) || term_digits.contains(postal.as_str()) {
            POSTAL_SUBSTRING
        } else {
            0
        }
    }

    fn score_address(&self, term: &str) -> Option<(MatchField, u32)> {
        let address = self.address.as_ref()?;

        if term.chars().all(|c| c.is_ascii_digit())
            && self.house_number.as_deref() == Some(term)
        {
            return Some((MatchField::HouseNumber, HOUSE_NUMBER_EXACT));
        }

        match address.score(term) {
            0 => None,
            score => Some((MatchField::Address, score)),
        }
    }

    fn score_locality(&self, term: &str) -> u32 {
        [&self.city, &self.neighborhood]
            .into_iter()
            .flatten()
            .map(|value| {
                if value == term {
                    3 * LOCALITY_WEIGHT
                } else if value.starts_with(term) {
                    2 * LOCALITY_WEIGHT
                } else if value.contains(term) {
                    LOCALITY_WEIGHT
                } else {
                    0
                }
            })
            .sum()
    }

    /// Score one term against the first matching category.
    fn score_term(&self, term: &str, min_postal_digits: usize) -> Option<(MatchField, u32)> {
        match self.score_postal(term, min_postal_digits) {
            0 => {}
            score => return Some((MatchField::PostalCode, score)),
        }

        if let Some(hit) = self.score_address(term) {
            return Some(hit);
        }

        match self.score_locality(term) {
            0 => {}
            score => return Some((MatchField::Locality, score)),
        }

        match self.name.as_ref().map_or(0, |name| name.score(term)) {
            0 => None,
            score => Some((MatchField::Name, score)),
        }
    }
}

/// Pre-normalized search fields for a dataset snapshot.
///
/// Build once per dataset; every query is then scored from scratch against
/// the stored fields. The index is positional: it must be queried with the
/// same slice it was built from.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    docs: Vec<SearchDoc>,
    min_postal_digits: usize,
}

impl SearchIndex {
    pub fn new(places: &[Place], config: &Config) -> Self {
        Self {
            docs: places.iter().map(SearchDoc::new).collect(),
            min_postal_digits: config.search_min_postal_digits,
        }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Rank `places` against `query`.
    ///
    /// A blank query returns every place in dataset order with score 0, and
    /// bounds covering all places with valid coordinates. An index built
    /// from a dataset of a different size matches nothing.
    pub fn search<'a>(&self, places: &'a [Place], query: &str) -> SearchOutcome<'a> {
        let normalized = normalize(query);

        if places.len() != self.docs.len() {
            log::warn!(
                "Search index covers {} places but {} were given; rebuild the index",
                self.docs.len(),
                places.len()
            );
            return SearchOutcome {
                query: normalized,
                results: Vec::new(),
                bounds: None,
            };
        }

        let terms: Vec<&str> = normalized.split_whitespace().collect();

        if terms.is_empty() {
            let results: Vec<SearchResult<'a>> = places
                .iter()
                .map(|place| SearchResult {
                    place,
                    score: 0,
                    matched: SmallVec::new(),
                })
                .collect();
            return SearchOutcome {
                query: normalized,
                bounds: bounding_box(places),
                results,
            };
        }

        let mut results: Vec<SearchResult<'a>> = places
            .iter()
            .zip(&self.docs)
            .filter_map(|(place, doc)| {
                let mut score = 0;
                let mut matched = SmallVec::new();
                for term in &terms {
                    let (field, term_score) = doc.score_term(term, self.min_postal_digits)?;
                    log::trace!(
                        "Place {} matched {:?} on {:?} (+{})",
                        place.id,
                        term,
                        field,
                        term_score
                    );
                    score += term_score;
                    matched.push(field);
                }
                Some(SearchResult {
                    place,
                    score,
                    matched,
                })
            })
            .collect();

        results.sort_by(|a, b| b.score.cmp(&a.score));

        let bounds = bounding_box(results.iter().map(|r| r.place));

        log::debug!(
            "Search {:?}: {} terms, {} of {} places matched",
            normalized,
            terms.len(),
            results.len(),
            places.len()
        );

        SearchOutcome {
            query: normalized,
            results,
            bounds,
        }
    }
}

/// Build a throwaway index and run one query.
///
/// # Examples
///
/// ```rust
/// use geoview::{Config, Place};
/// use geoview::compute::search::search;
///
/// let places = vec![
///     Place::new("1", "Maria Silva", -23.55, -46.63).with_neighborhood("Centro"),
///     Place::new("2", "Maria Silva", -23.50, -46.60).with_neighborhood("Norte"),
/// ];
///
/// let outcome = search(&places, "silva centro", &Config::default());
/// assert_eq!(outcome.ids(), vec!["1"]);
/// ```
pub fn search<'a>(places: &'a [Place], query: &str, config: &Config) -> SearchOutcome<'a> {
    SearchIndex::new(places, config).search(places, query)
}

//! String matching between legacy identifiers and v4 names.
//!
//! v3 identifiers look like `ADDRESS_LINE.E45`; v4 names look like
//! `Address Line`. [`normalize_identifier`] turns the former into something
//! comparable, and a [`Matcher`] picks the best candidate.
//!
//! Scores run from 0 to 100. The fuzzy score mirrors a weighted ratio: plain
//! similarity, token-order-insensitive similarity and, for candidates of very
//! different length, best-substring similarity.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").unwrap());

/// A chosen candidate and how well it matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    pub choice: &'a str,
    pub score: u8,
}

/// Strategy for pairing a query with one of several candidates.
pub trait Matcher {
    /// Best candidate for `query`, first one wins on ties.
    fn best_match<'a>(&self, query: &str, choices: &'a [String]) -> Option<Match<'a>>;
}

/// Always returns the highest-scoring candidate, however weak.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyMatcher;

impl Matcher for FuzzyMatcher {
    fn best_match<'a>(&self, query: &str, choices: &'a [String]) -> Option<Match<'a>> {
        let mut best: Option<Match<'a>> = None;
        for choice in choices {
            let score = similarity(query, choice);
            if best.map_or(true, |b| score > b.score) {
                best = Some(Match { choice, score });
            }
        }
        best
    }
}

/// Only accepts candidates equal to the query after normalization.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl Matcher for ExactMatcher {
    fn best_match<'a>(&self, query: &str, choices: &'a [String]) -> Option<Match<'a>> {
        let wanted = process(query);
        choices
            .iter()
            .find(|choice| !wanted.is_empty() && process(choice) == wanted)
            .map(|choice| Match { choice, score: 100 })
    }
}

/// `ADDRESS_LINE.E45` → `Address Line`.
///
/// Keeps the part before the first `.`, turns underscores into spaces and
/// capitalizes every word.
pub fn normalize_identifier(identifier: &str) -> String {
    let head = identifier.split('.').next().unwrap_or(identifier);
    head.replace('_', " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Lowercase, strip punctuation, collapse whitespace.
fn process(s: &str) -> String {
    NON_WORD.replace_all(&s.to_lowercase(), " ").trim().to_string()
}

/// Similarity score between two strings, 0 to 100.
pub fn similarity(a: &str, b: &str) -> u8 {
    let a = process(a);
    let b = process(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    if a == b {
        return 100;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let base = ratio(&a_chars, &b_chars);

    let (shorter, longer) = if a_chars.len() <= b_chars.len() {
        (&a_chars, &b_chars)
    } else {
        (&b_chars, &a_chars)
    };
    let len_ratio = longer.len() as f64 / shorter.len() as f64;

    let sorted_a: Vec<char> = sorted_tokens(&a).chars().collect();
    let sorted_b: Vec<char> = sorted_tokens(&b).chars().collect();
    let token_sort = ratio(&sorted_a, &sorted_b);

    let score = if len_ratio < 1.5 {
        base.max(token_sort * 0.95)
    } else {
        let scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
        base.max(partial_ratio(shorter, longer) * scale)
            .max(token_sort * 0.95 * scale)
    };

    score.round().clamp(0.0, 100.0) as u8
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// `2 * LCS / (len_a + len_b)` scaled to 100.
fn ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * longest_common_subsequence(a, b) as f64 / total as f64
}

/// Best [`ratio`] of `shorter` against any same-length window of `longer`.
fn partial_ratio(shorter: &[char], longer: &[char]) -> f64 {
    let width = shorter.len();
    if width == 0 {
        return 0.0;
    }
    longer
        .windows(width)
        .map(|window| ratio(shorter, window))
        .fold(0.0, f64::max)
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

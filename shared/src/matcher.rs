//! Fuzzy address matching.
//!
//! Calendar events carry free-text addresses ("317 N 19th St") that rarely
//! match the stored form ("317 North 19th Street") byte for byte, so match
//! targets are ranked by approximate similarity instead.

use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};

/// Score at or below which a candidate is treated as "no match".
const SCORE_FLOOR: f64 = 0.0;

/// A similarity scoring strategy.
///
/// Scores are bounded to `[0.0, 1.0]`: identical strings score 1.0,
/// dissimilar strings score at or near 0.0, and small edits degrade the
/// score gradually. Implementations are interchangeable; selection logic
/// never depends on a particular algorithm.
pub trait Scorer: Sync {
    fn score(&self, query: &str, candidate: &str) -> f64;
}

/// Default scorer backed by the nucleo fuzzy matcher.
///
/// A nucleo atom only matches when the pattern is a character subsequence
/// of the haystack, so text present in one string but not the other zeroes
/// that direction. Event addresses carry extra text (city suffixes) as
/// often as they drop it, so both directions are scored and the better one
/// wins. The raw nucleo score grows with pattern length; each direction is
/// normalized against the pattern's self-match score.
#[derive(Debug, Default, Clone, Copy)]
pub struct NucleoScorer;

impl Scorer for NucleoScorer {
    fn score(&self, query: &str, candidate: &str) -> f64 {
        let mut matcher = Matcher::new(Config::DEFAULT);
        f64::max(
            directional_score(&mut matcher, query, candidate),
            directional_score(&mut matcher, candidate, query),
        )
    }
}

/// Score `haystack` against a pattern built from `needle`, normalized to
/// `[0.0, 1.0]` by the needle's self-match score.
fn directional_score(matcher: &mut Matcher, needle: &str, haystack: &str) -> f64 {
    let pattern = Pattern::new(
        needle,
        CaseMatching::Ignore,
        Normalization::Smart,
        AtomKind::Fuzzy,
    );

    let mut buf = Vec::new();
    let ceiling = match pattern.score(Utf32Str::new(needle, &mut buf), matcher) {
        Some(ceiling) if ceiling > 0 => ceiling as f64,
        _ => return 0.0,
    };

    let mut buf = Vec::new();
    match pattern.score(Utf32Str::new(haystack, &mut buf), matcher) {
        Some(score) => (score as f64 / ceiling).min(1.0),
        None => 0.0,
    }
}

/// Best candidate found for a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    /// Index into the candidate sequence.
    pub index: usize,
    /// Similarity score of that candidate.
    pub score: f64,
}

/// Rank `candidates` against `query` and return the single best match.
///
/// Candidates are scanned in order and the best-so-far is replaced only on
/// a strictly greater score, so the first occurrence wins ties. The running
/// best starts at the floor, and a score equal to the floor never counts as
/// a match: an empty candidate list, or one where nothing scores above
/// zero, returns `None` rather than index 0.
pub fn best_match(scorer: &dyn Scorer, query: &str, candidates: &[String]) -> Option<MatchResult> {
    let mut highest = SCORE_FLOOR;
    let mut best = None;

    for (index, candidate) in candidates.iter().enumerate() {
        let score = scorer.score(query, candidate);
        if score > highest {
            highest = score;
            best = Some(MatchResult { index, score });
        }
    }

    best
}

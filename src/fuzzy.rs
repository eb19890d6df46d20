// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Approximate string matching with the Bitap algorithm.
//!
//! Scores range from 0 (perfect) to 1 (no match). A candidate matches when its
//! score stays at or below the threshold; the score combines the number of
//! errors relative to the pattern length with the distance of the match from
//! the expected location.

use std::collections::HashMap;

/// Patterns longer than this are searched in overlapping chunks
const MAX_BITS: usize = 32;

/// Lowest score a non-identical match can report
const MIN_SCORE: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    /// Maximum accepted score; lower is stricter
    pub threshold: f64,
    /// How far from `location` a match may drift before it scores as a full miss
    pub distance: usize,
    /// Where in the text the pattern is expected to start
    pub location: usize,
    /// Shortest run of matching characters that counts as a match
    pub min_match_char_length: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            distance: 100,
            location: 0,
            min_match_char_length: 1,
        }
    }
}

/// A ranked search hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    /// Position of the candidate in the searched collection
    pub index: usize,
    /// Ranking score, lower is better
    pub score: f64,
}

struct Chunk {
    pattern: Vec<char>,
    alphabet: HashMap<char, u32>,
    start: usize,
}

impl Chunk {
    fn new(pattern: &[char], start: usize) -> Self {
        let len = pattern.len();
        let mut alphabet = HashMap::new();
        for (i, c) in pattern.iter().enumerate() {
            *alphabet.entry(*c).or_insert(0) |= 1u32 << (len - i - 1);
        }

        Self {
            pattern: pattern.to_vec(),
            alphabet,
            start,
        }
    }
}

/// A case-insensitive fuzzy matcher for a single pattern
pub struct FuzzyMatcher {
    pattern: String,
    chunks: Vec<Chunk>,
    options: MatchOptions,
}

impl FuzzyMatcher {
    pub fn new(pattern: &str, options: MatchOptions) -> Self {
        let pattern = pattern.to_lowercase();
        let chars: Vec<char> = pattern.chars().collect();
        let len = chars.len();

        let mut chunks = Vec::new();
        if len > MAX_BITS {
            let remainder = len % MAX_BITS;
            let end = len - remainder;
            for start in (0..end).step_by(MAX_BITS) {
                chunks.push(Chunk::new(&chars[start..start + MAX_BITS], start));
            }
            if remainder > 0 {
                let start = len - MAX_BITS;
                chunks.push(Chunk::new(&chars[start..], start));
            }
        } else if len > 0 {
            chunks.push(Chunk::new(&chars, 0));
        }

        Self {
            pattern,
            chunks,
            options,
        }
    }

    /// Raw Bitap score of `text`, or `None` if it does not match
    pub fn score(&self, text: &str) -> Option<f64> {
        let text = text.to_lowercase();
        if text == self.pattern {
            return Some(0.0);
        }
        if self.chunks.is_empty() {
            return None;
        }

        let text: Vec<char> = text.chars().collect();
        let mut total = 0.0;
        let mut matched = false;

        for chunk in &self.chunks {
            let (is_match, score) = bitap(&text, chunk, &self.options);
            matched |= is_match;
            total += score;
        }

        matched.then(|| total / self.chunks.len() as f64)
    }

    /// Rank candidates by score, shorter fields winning ties in raw score
    ///
    /// Equal final scores keep their input order. Blank candidates never match.
    pub fn search<'a, I>(&self, candidates: I) -> Vec<Match>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut matches: Vec<Match> = candidates
            .into_iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .filter_map(|(index, text)| {
                let raw = self.score(text)?;
                let base = if raw == 0.0 { f64::EPSILON } else { raw };
                Some(Match {
                    index,
                    score: base.powf(field_norm(text)),
                })
            })
            .collect();

        matches.sort_by(|a, b| a.score.total_cmp(&b.score));
        matches
    }

    /// The best-ranked candidate, if any matches
    pub fn best<'a, I>(&self, candidates: I) -> Option<Match>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.search(candidates).into_iter().next()
    }
}

/// Weight that favours matches in short fields: 1/sqrt(token count), 3 decimals
fn field_norm(text: &str) -> f64 {
    let tokens = text.split(' ').filter(|t| !t.is_empty()).count().max(1);
    (1.0 / (tokens as f64).sqrt() * 1000.0).round() / 1000.0
}

fn compute_score(
    pattern_len: usize,
    errors: usize,
    current_location: usize,
    expected_location: usize,
    distance: usize,
) -> f64 {
    let accuracy = errors as f64 / pattern_len as f64;
    let proximity = current_location.abs_diff(expected_location);

    if distance == 0 {
        return if proximity > 0 { 1.0 } else { accuracy };
    }

    accuracy + proximity as f64 / distance as f64
}

fn find_from(text: &[char], pattern: &[char], from: usize) -> Option<usize> {
    if pattern.len() > text.len() {
        return None;
    }
    (from..=text.len() - pattern.len()).find(|&i| text[i..i + pattern.len()] == *pattern)
}

fn has_run(mask: &[bool], min_len: usize) -> bool {
    let mut run = 0;
    for &matched in mask {
        if matched {
            run += 1;
            if run >= min_len {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

fn bitap(text: &[char], chunk: &Chunk, options: &MatchOptions) -> (bool, f64) {
    let pattern = &chunk.pattern;
    let pattern_len = pattern.len();
    let text_len = text.len();
    let distance = options.distance;
    let expected = (options.location + chunk.start).min(text_len);

    let compute_matches = options.min_match_char_length > 1;
    let mut match_mask = vec![false; text_len + pattern_len];
    let mut current_threshold = options.threshold;

    // Exact occurrences tighten the threshold before the fuzzy pass
    let mut search_from = expected;
    while let Some(index) = find_from(text, pattern, search_from) {
        let score = compute_score(pattern_len, 0, index, expected, distance);
        current_threshold = current_threshold.min(score);
        search_from = index + pattern_len;
        if compute_matches {
            match_mask[index..index + pattern_len].fill(true);
        }
    }

    let mut best_location: Option<usize> = None;
    let mut last_bits: Vec<u32> = Vec::new();
    let mut final_score = 1.0;
    let mut bin_max = pattern_len + text_len;
    let mask = 1u32 << (pattern_len - 1);

    for errors in 0..pattern_len {
        // Binary search for how far from the expected location this error level can reach
        let mut bin_min = 0;
        let mut bin_mid = bin_max;
        while bin_min < bin_mid {
            let score = compute_score(pattern_len, errors, expected + bin_mid, expected, distance);
            if score <= current_threshold {
                bin_min = bin_mid;
            } else {
                bin_max = bin_mid;
            }
            bin_mid = (bin_max - bin_min) / 2 + bin_min;
        }
        bin_max = bin_mid;

        let mut start = (expected + 1).saturating_sub(bin_mid).max(1);
        let finish = (expected + bin_mid).min(text_len) + pattern_len;

        let mut bits = vec![0u32; finish + 2];
        bits[finish + 1] = (1u32 << errors) - 1;

        let mut j = finish;
        while j >= start {
            let current_location = j - 1;
            let char_match = text
                .get(current_location)
                .and_then(|c| chunk.alphabet.get(c))
                .copied()
                .unwrap_or(0);

            if compute_matches {
                match_mask[current_location] = char_match != 0;
            }

            bits[j] = ((bits[j + 1] << 1) | 1) & char_match;
            if errors > 0 {
                let next = last_bits.get(j + 1).copied().unwrap_or(0);
                let here = last_bits.get(j).copied().unwrap_or(0);
                bits[j] |= ((next | here) << 1) | 1 | next;
            }

            if bits[j] & mask != 0 {
                final_score =
                    compute_score(pattern_len, errors, current_location, expected, distance);

                if final_score <= current_threshold {
                    current_threshold = final_score;
                    best_location = Some(current_location);

                    if current_location <= expected {
                        break;
                    }

                    start = (2 * expected).saturating_sub(current_location).max(1);
                }
            }

            j -= 1;
        }

        // No point looking for more errors if the next level cannot win
        let score = compute_score(pattern_len, errors + 1, expected, expected, distance);
        if score > current_threshold {
            break;
        }

        last_bits = bits;
    }

    let mut is_match = best_location.is_some();
    if compute_matches && !has_run(&match_mask, options.min_match_char_length) {
        is_match = false;
    }

    (is_match, f64::max(MIN_SCORE, final_score))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict() -> MatchOptions {
        MatchOptions {
            threshold: 0.3,
            distance: 100,
            location: 0,
            min_match_char_length: 3,
        }
    }

    #[test]
    fn identical_text_scores_zero() {
        let matcher = FuzzyMatcher::new("Breaking Bad", strict());
        assert_eq!(matcher.score("breaking bad"), Some(0.0));
    }

    #[test]
    fn prefix_match_scores_minimum() {
        let matcher = FuzzyMatcher::new("Breaking Bad", strict());
        assert_eq!(matcher.score("Breaking Bad (2008) 1080p"), Some(MIN_SCORE));
    }

    #[test]
    fn tolerates_a_typo() {
        let matcher = FuzzyMatcher::new("Breking Bad", strict());
        let score = matcher.score("Breaking Bad (2008)").unwrap();
        assert!(score > MIN_SCORE && score <= 0.3, "score was {score}");
    }

    #[test]
    fn rejects_unrelated_text() {
        let matcher = FuzzyMatcher::new("Breaking Bad", strict());
        assert_eq!(matcher.score("The Office"), None);
    }

    #[test]
    fn rejects_matches_far_from_start() {
        let matcher = FuzzyMatcher::new("Breaking Bad", strict());
        let text = "The complete and utterly unabridged collection of Breaking Bad";
        assert_eq!(matcher.score(text), None);
    }

    #[test]
    fn short_runs_do_not_count() {
        let options = MatchOptions {
            min_match_char_length: 3,
            ..MatchOptions::default()
        };
        assert_eq!(FuzzyMatcher::new("ab", options).score("ab cd"), None);
        assert!(
            FuzzyMatcher::new("ab", MatchOptions::default())
                .score("ab cd")
                .is_some()
        );
    }

    #[test]
    fn empty_pattern_matches_nothing() {
        let matcher = FuzzyMatcher::new("", strict());
        assert_eq!(matcher.score("anything"), None);
    }

    #[test]
    fn long_patterns_are_chunked() {
        let title = "The Lord of the Rings The Fellowship of the Ring Extended";
        let matcher = FuzzyMatcher::new(title, strict());
        assert_eq!(matcher.chunks.len(), 2);
        assert!(matcher.score(&format!("{title} 2160p")).is_some());
    }

    #[test]
    fn search_prefers_shorter_fields() {
        let matcher = FuzzyMatcher::new("Breaking Bad", strict());
        let titles = ["Breaking Bad (2008) Season 1-5 1080p", "Breaking Bad"];

        let results = matcher.search(titles);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].index, 1);
        assert_eq!(results[1].index, 0);
    }

    #[test]
    fn search_keeps_input_order_on_ties() {
        let matcher = FuzzyMatcher::new("Dark", strict());
        let titles = ["Dark 1080p", "Dark 1080p", "Dark 1080p"];

        let best = matcher.best(titles).unwrap();

        assert_eq!(best.index, 0);
    }

    #[test]
    fn search_skips_blank_candidates() {
        let matcher = FuzzyMatcher::new("Dark", strict());
        assert!(matcher.search(["", "   "]).is_empty());
    }

    #[test]
    fn field_norm_rounds_to_three_decimals() {
        assert_eq!(field_norm("one"), 1.0);
        assert_eq!(field_norm("one two"), 0.707);
        assert_eq!(field_norm("a b c d"), 0.5);
    }
}

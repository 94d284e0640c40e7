//! Subsequence ranking of candidate strings against a short query.
//!
//! Every query character must appear in the candidate in order. Matches
//! score higher when they start the candidate, follow a separator, hit a
//! camel-case boundary or sit next to the previous match; unmatched
//! leading and trailing characters cost points.

const FIRST_CHAR_MATCH_BONUS: i32 = 10;
const MATCH_FOLLOWING_SEPARATOR_BONUS: i32 = 20;
const CAMEL_CASE_MATCH_BONUS: i32 = 20;
const ADJACENT_MATCH_BONUS: i32 = 5;
const UNMATCHED_LEADING_CHAR_PENALTY: i32 = -5;
const MAX_UNMATCHED_LEADING_CHAR_PENALTY: i32 = -15;
const SEPARATORS: [char; 6] = ['/', '-', '_', ' ', '.', '\\'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Position of the candidate in the input slice.
    pub index: usize,
    pub score: i32,
    /// Character positions in the candidate that matched the query.
    pub matched_indexes: Vec<usize>,
}

/// Ranks `candidates` against `pattern`, best first. Equal scores keep
/// input order. An empty pattern matches nothing.
pub fn find<S: AsRef<str>>(pattern: &str, candidates: &[S]) -> Vec<Match> {
    let pattern: Vec<char> = pattern.chars().collect();
    if pattern.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<Match> = candidates
        .iter()
        .enumerate()
        .filter_map(|(index, candidate)| {
            score_candidate(&pattern, candidate.as_ref()).map(|(score, matched_indexes)| Match {
                index,
                score,
                matched_indexes,
            })
        })
        .collect();
    matches.sort_by(|left, right| right.score.cmp(&left.score));
    matches
}

fn score_candidate(pattern: &[char], candidate: &str) -> Option<(i32, Vec<usize>)> {
    let chars: Vec<char> = candidate.chars().collect();
    let mut matched_indexes: Vec<usize> = Vec::with_capacity(pattern.len());
    let mut total = 0i32;
    let mut pattern_index = 0usize;
    let mut best_score = -1i32;
    let mut best_index: Option<usize> = None;
    let mut adjacent_bonus = 0i32;
    let mut previous: Option<char> = None;

    for (position, &current) in chars.iter().enumerate() {
        if pattern_index >= pattern.len() {
            break;
        }

        if eq_fold(current, pattern[pattern_index]) {
            let mut score = 0;
            if position == 0 {
                score += FIRST_CHAR_MATCH_BONUS;
            }
            if let Some(previous) = previous {
                if previous.is_lowercase() && current.is_uppercase() {
                    score += CAMEL_CASE_MATCH_BONUS;
                }
                if SEPARATORS.contains(&previous) {
                    score += MATCH_FOLLOWING_SEPARATOR_BONUS;
                }
            }
            if let Some(&last_match) = matched_indexes.last()
                && last_match + 1 == position
            {
                let bonus = adjacent_bonus * 2 + ADJACENT_MATCH_BONUS;
                score += bonus;
                adjacent_bonus += bonus;
            }
            if score > best_score {
                best_score = score;
                best_index = Some(position);
            }
        }

        // Commit the best position for this query character once the next
        // query character is coming up or the candidate ends, so a later,
        // better-placed occurrence can still win.
        let next_pattern = pattern.get(pattern_index + 1).copied();
        let next_char = chars.get(position + 1).copied();
        let commit = match (next_char, next_pattern) {
            (None, _) => true,
            (Some(next_char), Some(next_pattern)) => eq_fold(next_char, next_pattern),
            (Some(_), None) => false,
        };
        if commit && let Some(index) = best_index {
            if matched_indexes.is_empty() {
                let leading = i32::try_from(index).unwrap_or(i32::MAX);
                let penalty = leading
                    .saturating_mul(UNMATCHED_LEADING_CHAR_PENALTY)
                    .max(MAX_UNMATCHED_LEADING_CHAR_PENALTY);
                best_score += penalty;
            }
            total += best_score;
            matched_indexes.push(index);
            best_score = -1;
            best_index = None;
            pattern_index += 1;
        }

        previous = Some(current);
    }

    if matched_indexes.len() != pattern.len() {
        return None;
    }
    let unmatched = i32::try_from(chars.len() - matched_indexes.len()).unwrap_or(i32::MAX);
    Some((total.saturating_sub(unmatched), matched_indexes))
}

fn eq_fold(left: char, right: char) -> bool {
    left == right || left.to_lowercase().eq(right.to_lowercase())
}

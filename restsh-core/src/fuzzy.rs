//! Case-insensitive subsequence matching used to filter completion candidates.

const SCORE_MATCH: i32 = 16;
const SCORE_GAP: i32 = -1;
const BONUS_FIRST_CHAR: i32 = 10;
const BONUS_BOUNDARY: i32 = 8;
const BONUS_CONSECUTIVE: i32 = 4;
const BONUS_PREFIX: i32 = 10;

fn is_delimiter(c: char) -> bool {
    matches!(c, '_' | '-' | '/' | '.' | ' ' | '{' | '}')
}

/// Score `candidate` against `query`; `None` when `query` is not a subsequence.
///
/// Higher is better. Prefix matches, matches after a delimiter and runs of
/// consecutive characters score more; gaps and trailing characters cost.
pub fn score(query: &str, candidate: &str) -> Option<i32> {
    if query.is_empty() {
        return Some(0);
    }
    let query: Vec<char> = query.to_lowercase().chars().collect();
    let original: Vec<char> = candidate.chars().collect();
    let lower: Vec<char> = candidate.to_lowercase().chars().collect();
    if lower.len() != original.len() || query.len() > lower.len() {
        return simple_contains(&query, candidate);
    }

    let mut total = 0;
    let mut prev: Option<usize> = None;
    let mut ci = 0;
    for &qc in &query {
        let pos = (ci..lower.len()).find(|&i| lower[i] == qc)?;
        total += SCORE_MATCH;
        if pos == 0 {
            total += BONUS_FIRST_CHAR;
        } else if is_delimiter(original[pos - 1]) {
            total += BONUS_BOUNDARY;
        }
        match prev {
            Some(p) if pos == p + 1 => total += BONUS_CONSECUTIVE,
            Some(p) => total += SCORE_GAP * (pos - p - 1) as i32,
            None => total += SCORE_GAP * pos as i32,
        }
        prev = Some(pos);
        ci = pos + 1;
    }

    if lower.starts_with(&query) {
        total += BONUS_PREFIX;
    }
    total += SCORE_GAP * (lower.len() - ci) as i32 / 2;
    Some(total)
}

/// Fallback for text whose lowercase form changes length.
fn simple_contains(query: &[char], candidate: &str) -> Option<i32> {
    let query: String = query.iter().collect();
    candidate
        .to_lowercase()
        .contains(&query)
        .then_some(SCORE_MATCH * query.chars().count() as i32)
}

/// Keep the candidates matching `query`, best first, ties in text order, without duplicates.
pub fn filter<I, S>(query: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut scored: Vec<(i32, String)> = candidates
        .into_iter()
        .map(Into::into)
        .filter_map(|c: String| score(query, &c).map(|s| (s, c)))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    let mut seen = std::collections::HashSet::new();
    scored
        .into_iter()
        .filter(|(_, c)| seen.insert(c.clone()))
        .map(|(_, c)| c)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsequence_required() {
        assert!(score("srch", "_search").is_some());
        assert!(score("SEA", "_search").is_some());
        assert!(score("xyz", "_search").is_none());
        assert!(score("searchh", "_search").is_none());
    }

    #[test]
    fn test_prefix_beats_scattered() {
        let prefix = score("con", "connect").unwrap();
        let scattered = score("con", "cat_open_nodes").unwrap();
        assert!(prefix > scattered);
    }

    #[test]
    fn test_filter_orders_and_dedups() {
        let result = filter("s", ["size", "q", "_source", "size", "sort"]);
        assert_eq!(result[0], "size");
        assert!(result.contains(&"sort".to_string()));
        assert!(result.contains(&"_source".to_string()));
        assert!(!result.contains(&"q".to_string()));
        assert_eq!(result.iter().filter(|c| *c == "size").count(), 1);
    }

    #[test]
    fn test_empty_query_keeps_everything_sorted() {
        assert_eq!(filter("", ["b", "a", "c"]), vec!["a", "b", "c"]);
    }
}

/// Similarity (0-100) of two strings after lower-casing, stripping
/// punctuation and sorting their tokens, so word order does not matter.
///
/// The ratio is the Indel one: `2 * lcs / (len_a + len_b)`, counted in chars.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = sorted_tokens(a).chars().collect();
    let b: Vec<char> = sorted_tokens(b).chars().collect();

    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let total = (a.len() + b.len()) as f64;
    (200.0 * longest_common_subsequence(&a, &b) as f64 / total).round() as u8
}

fn sorted_tokens(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .flat_map(char::to_lowercase)
        .collect();

    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

// Single-row DP; `row[j]` is the LCS of the prefix of `a` seen so far and `b[..j]`.
fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diagonal = 0;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb { diagonal + 1 } else { above.max(row[j]) };
            diagonal = above;
        }
    }
    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_order_and_case_are_ignored() {
        assert_eq!(token_sort_ratio("Red Apple", "apple red"), 100);
        assert_eq!(token_sort_ratio("ice_cream", "cream ice"), 100);
    }

    #[test]
    fn closer_strings_score_higher() {
        let close = token_sort_ratio("apple", "apples");
        let far = token_sort_ratio("apple", "bicycle");
        assert!(close > far, "{close} <= {far}");
        assert!(close > 80);
    }

    #[test]
    fn swaps_cost_an_insert_and_a_delete() {
        // Levenshtein would give 0 here: two substitutions over two chars.
        assert_eq!(token_sort_ratio("ab", "ba"), 50);
        assert_eq!(token_sort_ratio("apple", "apples"), 91);
        assert_eq!(token_sort_ratio("cat", "cart"), 86);
    }

    #[test]
    fn empty_input_scores_zero() {
        assert_eq!(token_sort_ratio("", "apple"), 0);
        assert_eq!(token_sort_ratio("apple", "!!"), 0);
    }
}

use std::sync::LazyLock;

use regex::Regex;

pub const NO_WORD: &str = "(No Word)";
pub const EMPTY_WORD: &str = "(Empty)";

static TERM_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[(;,]| or ").unwrap());

/// Search terms derived from an entry's phrase.
///
/// `"dog (puppy) or hound; cur"` becomes `["dog", "puppy", "hound", "cur"]`.
/// The first term doubles as the base word for saved symbol filenames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerms {
    terms: Vec<String>,
}

impl SearchTerms {
    pub fn from_phrase(phrase: Option<&str>) -> Self {
        let Some(phrase) = phrase else {
            return Self { terms: vec![NO_WORD.to_string()] };
        };

        let without_close = phrase.replace(')', "");
        let terms: Vec<String> = TERM_SEPARATOR
            .split(&without_close)
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_string)
            .collect();

        if terms.is_empty() {
            Self { terms: vec![EMPTY_WORD.to_string()] }
        } else {
            Self { terms }
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn base_word(&self) -> &str {
        &self.terms[0]
    }

    /// True when the entry has no phrase at all and must never be searched.
    pub fn is_unsearchable(&self) -> bool {
        self.base_word() == NO_WORD
    }

    pub fn has_alternatives(&self) -> bool {
        self.terms.len() > 1
    }
}

/// Alphanumeric-only prefix for saved symbol filenames.
pub fn sanitize_word(word: &str, index: usize) -> String {
    let sanitized: String = word.chars().filter(|c| c.is_alphanumeric()).collect();
    if sanitized.is_empty() {
        format!("entry{index}")
    } else {
        sanitized
    }
}

pub fn clean_symbol_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect::<String>()
        .trim()
        .replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_parens_or_and_semicolons() {
        let terms = SearchTerms::from_phrase(Some("dog (puppy) or hound; cur"));
        assert_eq!(terms.terms(), ["dog", "puppy", "hound", "cur"]);
        assert_eq!(terms.base_word(), "dog");
        assert!(terms.has_alternatives());
    }

    #[test]
    fn single_word_has_no_alternatives() {
        let terms = SearchTerms::from_phrase(Some("  apple "));
        assert_eq!(terms.terms(), ["apple"]);
        assert!(!terms.has_alternatives());
    }

    #[test]
    fn word_containing_or_is_not_split() {
        let terms = SearchTerms::from_phrase(Some("orange, door"));
        assert_eq!(terms.terms(), ["orange", "door"]);
    }

    #[test]
    fn punctuation_only_phrase_is_empty() {
        let terms = SearchTerms::from_phrase(Some(" ( ) ; , "));
        assert_eq!(terms.terms(), [EMPTY_WORD]);
        assert!(!terms.is_unsearchable());
    }

    #[test]
    fn missing_phrase_is_unsearchable() {
        let terms = SearchTerms::from_phrase(None);
        assert_eq!(terms.base_word(), NO_WORD);
        assert!(terms.is_unsearchable());
    }

    #[test]
    fn sanitize_falls_back_to_entry_index() {
        assert_eq!(sanitize_word("ice-cream cone", 3), "icecreamcone");
        assert_eq!(sanitize_word("(Empty)", 3), "Empty");
        assert_eq!(sanitize_word("?!", 7), "entry7");
        assert_eq!(sanitize_word("ĉevalo", 0), "ĉevalo");
    }

    #[test]
    fn clean_symbol_name_keeps_separators() {
        assert_eq!(clean_symbol_name(" red apple! "), "red_apple");
        assert_eq!(clean_symbol_name("to-do_list"), "to-do_list");
    }
}

//! Stop-word set for keyword extraction.
//!
//! Built-in: the common Chinese function words, pronouns and connectives the
//! review corpus is full of, plus short English function words for the
//! mixed-language reviews. Extra words can be added from config.

use std::collections::HashSet;

/// Chinese function words / pronouns / connectives.
const CJK_FUNCTION_WORDS: &[&str] = &[
    "的", "了", "和", "是", "在", "有", "我", "就", "不", "也", "都", "這", "那", "要", "會", "可",
    "能", "但", "很", "還", "沒", "說", "而", "到", "去", "對", "與", "及", "以", "被", "給", "把",
    "讓", "為", "從", "向", "於", "比", "讓我", "我們", "你們", "他們", "這個", "那個", "什麼",
    "如果", "因為", "所以", "雖然", "然而", "當然", "可以", "應該", "可能", "一定",
];

/// English function words short enough to surface as 2–4 char windows.
const ENGLISH_FUNCTION_WORDS: &[&str] = &[
    "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "had", "has", "have", "he",
    "her", "his", "if", "in", "is", "it", "its", "me", "my", "no", "not", "of", "on", "or", "our",
    "she", "so", "than", "that", "the", "them", "then", "they", "this", "to", "too", "us", "very",
    "was", "we", "were", "with", "you", "your",
];

/// Exact-string membership; candidates are compared verbatim.
#[derive(Debug, Clone)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Default for Stopwords {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Stopwords {
    pub fn builtin() -> Self {
        let words = CJK_FUNCTION_WORDS
            .iter()
            .chain(ENGLISH_FUNCTION_WORDS)
            .map(|w| w.to_string())
            .collect();
        Self { words }
    }

    pub fn empty() -> Self {
        Self {
            words: HashSet::new(),
        }
    }

    /// Add more words (blank entries are ignored).
    pub fn extend<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for w in extra {
            let t = w.as_ref().trim();
            if !t.is_empty() {
                self.words.insert(t.to_string());
            }
        }
        self
    }

    pub fn contains(&self, term: &str) -> bool {
        self.words.contains(term)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_both_scripts() {
        let s = Stopwords::builtin();
        assert!(s.contains("我們"));
        assert!(s.contains("因為"));
        assert!(s.contains("the"));
        assert!(!s.contains("早餐"));
    }

    #[test]
    fn extend_trims_and_skips_blanks() {
        let s = Stopwords::empty().extend(["  酒店 ", "", "hotel"]);
        assert_eq!(s.len(), 2);
        assert!(s.contains("酒店"));
        assert!(s.contains("hotel"));
    }
}

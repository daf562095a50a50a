//! Text processing and normalization

use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

/// Common English stop words shared by phrase extraction and tokenization
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
    "around", "as", "at", "be", "became", "because", "become", "becomes", "becoming", "been",
    "before", "beforehand", "behind", "being", "below", "beside", "besides", "between", "beyond",
    "both", "but", "by", "can", "cannot", "could", "did", "do", "does", "doing", "done", "down",
    "due", "during", "each", "either", "else", "elsewhere", "enough", "etc", "even", "ever",
    "every", "everyone", "everything", "everywhere", "except", "few", "for", "former",
    "formerly", "from", "further", "had", "has", "have", "having", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hers", "herself", "him", "himself", "his", "how",
    "however", "i", "if", "in", "indeed", "into", "is", "it", "its", "itself", "just", "least",
    "less", "many", "may", "me", "meanwhile", "might", "mine", "more", "moreover", "most",
    "mostly", "much", "must", "my", "myself", "namely", "neither", "never", "nevertheless",
    "next", "no", "nobody", "none", "nor", "not", "nothing", "now", "nowhere", "of", "off",
    "often", "on", "once", "one", "only", "onto", "or", "other", "others", "otherwise", "our",
    "ours", "ourselves", "out", "over", "own", "per", "perhaps", "please", "quite", "rather",
    "really", "same", "several", "she", "should", "since", "so", "some", "somehow", "someone",
    "something", "sometimes", "somewhere", "still", "such", "than", "that", "the", "their",
    "theirs", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "these", "they", "this", "those", "though", "through", "throughout",
    "thru", "thus", "to", "together", "too", "toward", "towards", "under", "unless", "until",
    "up", "upon", "us", "used", "using", "various", "very", "via", "was", "we", "well", "were",
    "what", "whatever", "when", "whence", "whenever", "where", "whereas", "whereby", "wherein",
    "whether", "which", "while", "who", "whoever", "whole", "whom", "whose", "why", "will",
    "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

/// The shared English stop-word list
pub fn stop_words() -> impl Iterator<Item = &'static str> {
    STOP_WORDS.iter().copied()
}

pub struct TextProcessor {
    stop_words: HashSet<&'static str>,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProcessor {
    pub fn new() -> Self {
        Self {
            stop_words: stop_words().collect(),
        }
    }

    /// Lowercase and fold typographic punctuation, keeping line structure
    pub fn normalize(&self, text: &str) -> String {
        self.normalize_unicode(&text.to_lowercase())
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Tokenize text into lowercase words using Unicode segmentation
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .map(|word| word.to_lowercase())
            .filter(|word| word.chars().any(|c| c.is_alphanumeric()))
            .collect()
    }

    /// Content tokens: `tokenize` minus stop words and single characters
    pub fn content_tokens(&self, text: &str) -> Vec<String> {
        self.tokenize(text)
            .into_iter()
            .filter(|token| token.chars().count() > 1 && !self.is_stop_word(token))
            .collect()
    }

    /// Collapse runs of whitespace into single spaces
    pub fn normalize_whitespace(&self, text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Normalize Unicode characters
    fn normalize_unicode(&self, text: &str) -> String {
        text.chars()
            .map(|c| match c {
                '\u{2018}' | '\u{2019}' => '\'', // Smart quotes to regular quotes
                '\u{201C}' | '\u{201D}' => '"',
                '\u{2013}' | '\u{2014}' => '-', // En dash, em dash to hyphen
                '\u{2026}' => '.',
                '\u{00A0}' => ' ',
                '\u{2022}' | '\u{25CF}' | '\u{25AA}' | '\u{2023}' => '\n', // Bullets end a clause
                _ => c,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let processor = TextProcessor::new();
        let normalized = processor.normalize("Senior \u{201C}Rust\u{201D} Engineer \u{2014} C++");
        assert_eq!(normalized, "senior \"rust\" engineer - c++");
    }

    #[test]
    fn test_bullets_become_line_breaks() {
        let processor = TextProcessor::new();
        assert_eq!(processor.normalize("\u{2022} Python \u{2022} SQL"), "\n python \n sql");
    }

    #[test]
    fn test_tokenization() {
        let processor = TextProcessor::new();
        let tokens = processor.content_tokens("Rust programming language is awesome!");

        assert!(tokens.contains(&"rust".to_string()));
        assert!(tokens.contains(&"programming".to_string()));
        assert!(tokens.contains(&"language".to_string()));
        assert!(!tokens.contains(&"is".to_string()));
    }

    #[test]
    fn test_stop_words() {
        let processor = TextProcessor::new();
        assert!(processor.is_stop_word("the"));
        assert!(processor.is_stop_word("with"));
        assert!(!processor.is_stop_word("python"));
    }

    #[test]
    fn test_normalize_whitespace() {
        let processor = TextProcessor::new();
        assert_eq!(processor.normalize_whitespace("  a \n\t b  "), "a b");
    }
}

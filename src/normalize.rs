//! # Text Normalization
//!
//! Turns raw review text into sentence-level token Documents for training.
//!
//! ## Pipeline
//!
//! - Strip markup tags, keeping anchor tags (`<a ...>`, `</a>`) intact.
//! - Remove backslash escape sequences and a fixed punctuation set,
//!   smart quotes included.
//! - Lowercase everything.
//! - Split into sentence segments on `.?!;:` and tokenize each segment
//!   on whitespace.
//!
//! Sentence-ending punctuation is consumed by the segmentation step and
//! is therefore absent from the removal set. Malformed input degrades to
//! an empty token sequence; there are no error conditions.
//!
//! A `Stopwords` filter backed by a newline-delimited word file drops
//! high-frequency function words from Documents before training.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::collections::HashSet;

use log::info;
use regex::{Captures, Regex};
use serde::{Serialize, Deserialize};

/// Default path for the stopwords file.
const STOPWORDS_PATH: &str = "data/stopwords.txt";

/// Punctuation removed during normalization. Sentence enders (`.?!;:`)
/// are excluded so segmentation still sees them.
const PUNCTUATION: &str = ",\"'\u{201c}\u{201d}\u{2018}\u{2019}()[]{}*#$%&@^_+=|~`\\-\u{2013}\u{2014}";

/// Sentence-ending characters used for segmentation.
const SENTENCE_ENDERS: &[char] = &['.', '?', '!', ';', ':'];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One sentence of the corpus as an ordered token sequence.
///
/// # Fields
///
/// * `tokens` - Normalized tokens in sentence order.
pub struct Document {
    pub tokens: Vec<String>,
}

impl Document {
    /// Create a document from a token sequence.
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Normalizer for raw review text.
///
/// Holds the compiled patterns; build once and reuse across documents.
///
/// # Examples
///
/// ```
/// let normalizer = TextNormalizer::new();
/// let documents = normalizer.normalize("A fine film. Truly fine!");
/// ```
pub struct TextNormalizer {
    tag: Regex,
    anchor: Regex,
    escape: Regex,
}

impl TextNormalizer {
    /// Create a new normalizer with compiled patterns.
    pub fn new() -> Self {
        Self {
            // Any markup-like tag.
            tag: Regex::new(r"</?[A-Za-z!][^>]*>")
                .expect("Failed to compile tag pattern"),
            // Allow-pattern: anchor tags survive, everything else is stripped.
            anchor: Regex::new(r"(?i)^</?a(\s[^>]*)?>$")
                .expect("Failed to compile anchor pattern"),
            escape: Regex::new(r#"\\[ntr"'\\]"#)
                .expect("Failed to compile escape pattern"),
        }
    }

    /// Normalize raw text into sentence-level Documents.
    ///
    /// # Arguments
    ///
    /// * `raw` - Arbitrary raw text, possibly containing markup and punctuation.
    ///
    /// # Returns
    ///
    /// * `Vec<Document>` - One document per sentence segment. Segments that
    ///   normalize to zero tokens are dropped.
    pub fn normalize(&self, raw: &str) -> Vec<Document> {
        // The regex crate has no lookahead, so the allow-pattern is
        // applied per match instead.
        let stripped = self.tag.replace_all(raw, |caps: &Captures| {
            if self.anchor.is_match(&caps[0]) {
                caps[0].to_string()
            } else {
                " ".to_string()
            }
        });
        let unescaped = self.escape.replace_all(&stripped, " ");
        let cleaned: String = unescaped
            .chars()
            .filter(|c| !PUNCTUATION.contains(*c))
            .collect();
        let lowered = cleaned.to_lowercase();

        lowered
            .split(SENTENCE_ENDERS)
            .map(|segment| {
                Document::new(
                    segment
                        .trim()
                        .split_whitespace()
                        .map(|token| token.to_string())
                        .collect(),
                )
            })
            .filter(|doc| !doc.is_empty())
            .collect()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// A stopword filter backed by a newline-delimited word file.
///
/// # Fields
///
/// * `words` - The stopword set, one lowercase word per entry.
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    /// Read the stopwords from a file.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the stopwords file. Defaults to `data/stopwords.txt`.
    ///
    /// # Returns
    ///
    /// * `io::Result<Self>` - The loaded filter.
    pub fn load(path: Option<&str>) -> io::Result<Self> {
        let path = path.unwrap_or(STOPWORDS_PATH);
        let file = File::open(path)?;
        let words: HashSet<String> = BufReader::new(file)
            .lines()
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        info!("Loaded {} stopwords from {}", words.len(), path);
        Ok(Self { words })
    }

    /// Build a filter from an in-memory word list.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Remove stopwords from a document, preserving token order.
    ///
    /// # Arguments
    ///
    /// * `document` - The document to filter.
    ///
    /// # Returns
    ///
    /// * `Document` - A new document without stopword tokens.
    pub fn remove(&self, document: &Document) -> Document {
        Document::new(
            document
                .tokens
                .iter()
                .filter(|token| !self.words.contains(token.as_str()))
                .cloned()
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(doc: &Document) -> Vec<&str> {
        doc.tokens.iter().map(String::as_str).collect()
    }

    #[test]
    fn normalizes_a_plain_sentence() {
        let normalizer = TextNormalizer::new();
        let docs = normalizer.normalize("jennifer ehle was sparkling in pride and prejudice.");
        assert_eq!(docs.len(), 1);
        assert_eq!(
            tokens(&docs[0]),
            vec!["jennifer", "ehle", "was", "sparkling", "in", "pride", "and", "prejudice"]
        );
    }

    #[test]
    fn strips_markup_tags() {
        let normalizer = TextNormalizer::new();
        let docs = normalizer.normalize("A great film.<br /><br />Really great.");
        assert_eq!(docs.len(), 2);
        assert_eq!(tokens(&docs[0]), vec!["a", "great", "film"]);
        assert_eq!(tokens(&docs[1]), vec!["really", "great"]);
    }

    #[test]
    fn keeps_anchor_tags() {
        let normalizer = TextNormalizer::new();
        let docs = normalizer.normalize("see <a>here</a> now.");
        assert_eq!(docs.len(), 1);
        assert_eq!(tokens(&docs[0]), vec!["see", "<a>here</a>", "now"]);
    }

    #[test]
    fn removes_smart_quotes_and_punctuation() {
        let normalizer = TextNormalizer::new();
        let docs = normalizer.normalize("\u{201c}Brilliant,\u{201d} she said (twice).");
        assert_eq!(docs.len(), 1);
        assert_eq!(tokens(&docs[0]), vec!["brilliant", "she", "said", "twice"]);
    }

    #[test]
    fn removes_escape_sequences() {
        let normalizer = TextNormalizer::new();
        let docs = normalizer.normalize(r#"it was \"fine\" overall."#);
        assert_eq!(docs.len(), 1);
        assert_eq!(tokens(&docs[0]), vec!["it", "was", "fine", "overall"]);
    }

    #[test]
    fn splits_on_all_sentence_enders() {
        let normalizer = TextNormalizer::new();
        let docs = normalizer.normalize("one two? three four! five six; seven: eight");
        assert_eq!(docs.len(), 5);
        assert_eq!(tokens(&docs[0]), vec!["one", "two"]);
        assert_eq!(tokens(&docs[4]), vec!["eight"]);
    }

    #[test]
    fn drops_tokenless_segments() {
        let normalizer = TextNormalizer::new();
        // Trailing period produces an empty final segment.
        let docs = normalizer.normalize("fin.");
        assert_eq!(docs.len(), 1);
        // Pure markup collapses to nothing.
        assert!(normalizer.normalize("<br /><br />").is_empty());
        assert!(normalizer.normalize("").is_empty());
    }

    #[test]
    fn stopword_filter_preserves_order() {
        let stopwords = Stopwords::from_words(["the", "was", "in", "and"]);
        let doc = Document::new(
            ["jennifer", "was", "sparkling", "in", "pride", "and", "prejudice"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        let filtered = stopwords.remove(&doc);
        assert_eq!(tokens(&filtered), vec!["jennifer", "sparkling", "pride", "prejudice"]);
    }

    #[test]
    fn stopword_filter_on_clean_document_is_identity() {
        let stopwords = Stopwords::from_words(["the"]);
        let doc = Document::new(vec!["sparkling".to_string()]);
        assert_eq!(stopwords.remove(&doc), doc);
    }
}

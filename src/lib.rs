use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use walkdir::WalkDir;

pub mod export;

pub use export::{ExportFormat, csv_safe_cell, render_report, result_to_json, save_result};

/// Stopwords excluded from the frequency ranking.
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "is", "are", "was", "were", "be", "been", "i", "you", "he", "she", "it", "we", "they",
    "this", "that",
];

const POSITIVE_WORDS: &[&str] = &[
    "amazing",
    "love",
    "great",
    "awesome",
    "excellent",
    "good",
    "best",
    "beautiful",
];

const NEGATIVE_WORDS: &[&str] = &[
    "hate", "bad", "worst", "terrible", "horrible", "poor", "awful",
];

static STOPWORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOPWORDS.iter().copied().collect());
static POSITIVE_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| POSITIVE_WORDS.iter().copied().collect());
static NEGATIVE_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| NEGATIVE_WORDS.iter().copied().collect());

/// A capital letter followed by lowercase letters, bounded by word boundaries.
/// Matches single capitalized word tokens, never multi-word phrases; all-caps
/// runs like "NASA" have no internal boundary and do not match.
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z][a-z]*\b").expect("valid regex"));

/// Maximum number of ranked words reported.
pub const TOP_WORDS_LIMIT: usize = 8;
/// Maximum number of keywords (prefix of the ranked words).
pub const KEYWORD_LIMIT: usize = 5;
/// Maximum number of reported capitalized terms.
pub const ENTITY_LIMIT: usize = 5;

/// A word together with its occurrence count in the filtered token stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: u32,
}

/// Summary statistics over the raw input and its token stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub characters: usize,
    pub words: usize,
    pub unique_words: usize,
    pub sentences: usize,
    pub avg_word_length: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

/// Lexicon-based sentiment: one point per positive hit, minus one per
/// negative hit, over the full (unfiltered) token stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub score: i32,
}

/// The complete result bundle of one analysis run.
///
/// Serializes to the documented JSON shape (`topWords`, `uniqueWords`,
/// `avgWordLength` spellings), so exported documents stay compatible with
/// external consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub cleaned: String,
    pub tokens: Vec<String>,
    pub filtered: Vec<String>,
    pub top_words: Vec<WordCount>,
    pub keywords: Vec<String>,
    pub statistics: Statistics,
    pub sentiment: Sentiment,
    pub entities: Vec<String>,
}

/// Analyze a block of text and return the full result bundle.
///
/// Total over all string input: the empty string yields a well-formed result
/// with empty fields. Deterministic, no I/O, no state between calls.
///
/// # Example
/// ```
/// use lexistat::analyze;
/// let r = analyze("Rust is great great great");
/// assert_eq!(r.statistics.words, 5);
/// assert_eq!(r.top_words[0].word, "great");
/// assert_eq!(r.top_words[0].count, 3);
/// assert_eq!(r.sentiment.score, 3);
/// ```
pub fn analyze(raw: &str) -> AnalysisResult {
    let cleaned = normalize(raw);
    let tokens: Vec<String> = cleaned.split_whitespace().map(String::from).collect();
    let filtered: Vec<String> = tokens
        .iter()
        .filter(|t| t.len() > 2 && !STOPWORD_SET.contains(t.as_str()))
        .cloned()
        .collect();

    let top_words = rank_words(&filtered);
    let keywords: Vec<String> = top_words
        .iter()
        .take(KEYWORD_LIMIT)
        .map(|w| w.word.clone())
        .collect();

    let statistics = Statistics {
        characters: raw.chars().count(),
        words: tokens.len(),
        unique_words: tokens.iter().map(String::as_str).collect::<HashSet<_>>().len(),
        sentences: count_sentences(raw),
        avg_word_length: avg_word_length(&tokens),
    };

    let sentiment = score_sentiment(&tokens);
    let entities = extract_entities(raw);

    AnalysisResult {
        cleaned,
        tokens,
        filtered,
        top_words,
        keywords,
        statistics,
        sentiment,
        entities,
    }
}

/// Lowercase the input, keep only ASCII alphanumerics, underscore and
/// whitespace, and trim. Accented letters fall outside the kept class and
/// are removed.
fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let kept: String = lowered
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    kept.trim().to_string()
}

/// Count occurrences over the filtered tokens and rank by count descending.
/// Entries enter the sort in first-occurrence order and the sort is stable,
/// so equal counts keep first-appearance order.
fn rank_words(filtered: &[String]) -> Vec<WordCount> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for word in filtered {
        let entry = counts.entry(word.as_str()).or_insert(0);
        if *entry == 0 {
            order.push(word.as_str());
        }
        *entry += 1;
    }

    let mut ranked: Vec<WordCount> = order
        .into_iter()
        .map(|word| WordCount {
            word: word.to_string(),
            count: counts[word],
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(TOP_WORDS_LIMIT);
    ranked
}

/// Sentence count over the ORIGINAL text: segments between runs of
/// `.`, `!`, `?` whose trimmed length is non-zero.
fn count_sentences(raw: &str) -> usize {
    raw.split(['.', '!', '?'])
        .filter(|segment| !segment.trim().is_empty())
        .count()
}

/// Mean token length to one decimal place; 0 for an empty token stream.
fn avg_word_length(tokens: &[String]) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let total: usize = tokens.iter().map(|t| t.chars().count()).sum();
    let mean = total as f64 / tokens.len() as f64;
    (mean * 10.0).round() / 10.0
}

fn score_sentiment(tokens: &[String]) -> Sentiment {
    let mut score: i32 = 0;
    for token in tokens {
        if POSITIVE_SET.contains(token.as_str()) {
            score += 1;
        }
        if NEGATIVE_SET.contains(token.as_str()) {
            score -= 1;
        }
    }
    let label = if score > 2 {
        SentimentLabel::Positive
    } else if score < -2 {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };
    Sentiment { label, score }
}

/// Capitalized word tokens from the ORIGINAL text, deduplicated by exact
/// string in first-occurrence order, capped at [`ENTITY_LIMIT`].
fn extract_entities(raw: &str) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut entities: Vec<String> = Vec::new();
    for m in ENTITY_RE.find_iter(raw) {
        if seen.insert(m.as_str()) {
            entities.push(m.as_str().to_string());
            if entities.len() == ENTITY_LIMIT {
                break;
            }
        }
    }
    entities
}

/// Collect the `.txt` files under a path.
///
/// A single file is passed through as-is; a directory is walked recursively
/// with entries sorted by file name so runs are deterministic.
pub fn collect_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }
    WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().map(|ext| ext == "txt").unwrap_or(false))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(normalize("(_test] {test2!="), "_test test2");
        assert_eq!(normalize("  Hello, World!  "), "hello world");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_drops_non_ascii_letters() {
        // é is outside the kept class
        assert_eq!(normalize("café"), "caf");
    }

    #[test]
    fn test_rank_stable_tie_break() {
        let filtered: Vec<String> = ["delta", "delta", "echo", "echo", "alpha"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let ranked = rank_words(&filtered);
        let words: Vec<&str> = ranked.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["delta", "echo", "alpha"]);
        assert_eq!(ranked[0].count, 2);
        assert_eq!(ranked[1].count, 2);
        assert_eq!(ranked[2].count, 1);
    }

    #[test]
    fn test_rank_caps_at_limit() {
        let filtered: Vec<String> = (0..12).map(|i| format!("word{i}")).collect();
        assert_eq!(rank_words(&filtered).len(), TOP_WORDS_LIMIT);
    }

    #[test]
    fn test_entity_pattern_skips_all_caps() {
        let entities = extract_entities("Berlin is in Germany. NASA launched a rocket.");
        assert!(entities.contains(&"Berlin".to_string()));
        assert!(entities.contains(&"Germany".to_string()));
        assert!(!entities.contains(&"NASA".to_string()));
    }

    #[test]
    fn test_entity_dedup_preserves_first_occurrence() {
        let entities = extract_entities("Alice met Bob near Paris. Alice left.");
        assert_eq!(entities, vec!["Alice", "Bob", "Paris"]);
    }

    #[test]
    fn test_sentence_count_ignores_empty_segments() {
        assert_eq!(count_sentences("Hello world. How are you? Fine!"), 3);
        assert_eq!(count_sentences("Wait... what?!"), 2);
        assert_eq!(count_sentences("..."), 0);
    }

    #[test]
    fn test_avg_word_length_rounds_to_one_decimal() {
        let tokens: Vec<String> = ["hello", "world", "how", "are", "you", "fine"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        // 23 chars / 6 tokens = 3.8333...
        assert_eq!(avg_word_length(&tokens), 3.8);
        assert_eq!(avg_word_length(&[]), 0.0);
    }
}

// Text vectorizer: bag of word or character n-grams, optionally TF-IDF weighted

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static WORD_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s\s+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Analyzer {
    Word,
    Char,
    /// Character n-grams taken only inside word boundaries, each word padded with spaces.
    #[default]
    CharWb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Vectorizer {
    pub vocabulary: HashMap<String, usize>,
    #[serde(default)]
    pub analyzer: Analyzer,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
    #[serde(default)]
    pub idf: Option<Vec<f64>>,
    #[serde(default)]
    pub norm: Option<Norm>,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_lowercase() -> bool {
    true
}

/// Sparse feature vector, sorted by column.
pub type SparseVector = Vec<(usize, f64)>;

impl Vectorizer {
    /// Smallest feature width able to hold every vocabulary column.
    pub fn min_features(&self) -> usize {
        self.vocabulary.values().max().map_or(0, |&max| max + 1)
    }

    /// Check internal consistency. Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(format!("invalid ngram_range ({min_n}, {max_n})"));
        }
        if let Some(idf) = &self.idf {
            if idf.len() < self.min_features() {
                return Err(format!(
                    "idf has {} weights but vocabulary needs {}",
                    idf.len(),
                    self.min_features()
                ));
            }
        }
        Ok(())
    }

    /// Transform one document into its feature vector. Unknown terms are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.analyze(text) {
            if let Some(&col) = self.vocabulary.get(&term) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }

        if let Some(idf) = &self.idf {
            for (col, value) in counts.iter_mut() {
                *value *= idf.get(*col).copied().unwrap_or(1.0);
            }
        }

        let mut features: SparseVector = counts.into_iter().collect();
        if let Some(norm) = self.norm {
            let total = match norm {
                Norm::L1 => features.iter().map(|(_, v)| v.abs()).sum::<f64>(),
                Norm::L2 => features.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
            };
            if total > 0.0 {
                for (_, v) in features.iter_mut() {
                    *v /= total;
                }
            }
        }
        features
    }

    fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        let (min_n, max_n) = self.ngram_range;
        match self.analyzer {
            Analyzer::Word => word_ngrams(&text, min_n, max_n),
            Analyzer::Char => char_ngrams(&text, min_n, max_n),
            Analyzer::CharWb => char_wb_ngrams(&text, min_n, max_n),
        }
    }
}

fn word_ngrams(text: &str, min_n: usize, max_n: usize) -> Vec<String> {
    let tokens: Vec<&str> = WORD_TOKEN.find_iter(text).map(|m| m.as_str()).collect();
    let mut out = Vec::new();
    for n in min_n..=max_n.min(tokens.len()) {
        for window in tokens.windows(n) {
            out.push(window.join(" "));
        }
    }
    out
}

fn char_ngrams(text: &str, min_n: usize, max_n: usize) -> Vec<String> {
    let normalized = WHITESPACE_RUN.replace_all(text, " ");
    let chars: Vec<char> = normalized.chars().collect();
    let mut out = Vec::new();
    for n in min_n..=max_n.min(chars.len()) {
        for window in chars.windows(n) {
            out.push(window.iter().collect());
        }
    }
    out
}

fn char_wb_ngrams(text: &str, min_n: usize, max_n: usize) -> Vec<String> {
    let mut out = Vec::new();
    for word in text.split_whitespace() {
        let padded: Vec<char> = std::iter::once(' ')
            .chain(word.chars())
            .chain(std::iter::once(' '))
            .collect();
        let len = padded.len();
        for n in min_n..=max_n {
            let mut offset = 0;
            out.push(padded[offset..(offset + n).min(len)].iter().collect());
            while offset + n < len {
                offset += 1;
                out.push(padded[offset..offset + n].iter().collect());
            }
            // A word shorter than n is counted once.
            if offset == 0 {
                break;
            }
        }
    }
    out
}

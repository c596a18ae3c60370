//! TF-IDF relevance ranking over the article corpus.
//!
//! The vector space is rebuilt per request from the full corpus plus the
//! query text; nothing is cached, so the ranking is always consistent with
//! the stored articles. Ties, including the all-zero case where the query
//! shares no terms with the corpus, preserve corpus order.

use std::collections::{HashMap, HashSet};

use crate::config::SearchConfig;
use crate::entities::articles;
use crate::services::summary;

/// One corpus entry with its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedIndex {
    /// Position in the original corpus
    pub index: usize,
    pub score: f64,
}

/// Ranked articles plus the optional extractive summary.
#[derive(Debug)]
pub struct SearchOutcome {
    pub articles: Vec<articles::Model>,
    pub scores: Vec<f64>,
    pub summary: Option<String>,
}

#[derive(Clone)]
pub struct SearchEngine {
    config: SearchConfig,
}

impl SearchEngine {
    #[must_use]
    pub const fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Rank `articles` against `query`. An empty query (after trimming) or
    /// an empty corpus short-circuits to the corpus in its natural order
    /// with no summary. Never fails.
    #[must_use]
    pub fn search(&self, articles: Vec<articles::Model>, query: &str) -> SearchOutcome {
        let query = query.trim();

        if query.is_empty() || articles.is_empty() {
            let scores = vec![0.0; articles.len()];
            return SearchOutcome {
                articles,
                scores,
                summary: None,
            };
        }

        let docs: Vec<String> = articles
            .iter()
            .map(|a| format!("{} {}", a.title, a.content))
            .collect();

        let ranking = rank(&docs, query);

        let mut by_index: Vec<Option<articles::Model>> = articles.into_iter().map(Some).collect();
        let mut ranked = Vec::with_capacity(ranking.len());
        let mut scores = Vec::with_capacity(ranking.len());
        for entry in &ranking {
            if let Some(article) = by_index[entry.index].take() {
                ranked.push(article);
                scores.push(entry.score);
            }
        }

        let bodies: Vec<String> = ranked.iter().map(|a| a.content.clone()).collect();
        let summary = summary::summarize(
            &bodies,
            self.config.summary_max_fragments,
            self.config.summary_min_fragment_chars,
        );

        SearchOutcome {
            articles: ranked,
            scores,
            summary: Some(summary),
        }
    }
}

/// Lowercased alphanumeric tokens of at least two characters.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// Score every document against the query and return indices ordered by
/// descending similarity. The sort is stable: equal scores keep corpus order.
///
/// Weighting is smoothed TF-IDF (`idf = ln((1 + n) / (1 + df)) + 1`) with
/// L2-normalized vectors, so the cosine similarity is a plain dot product
/// and a document identical to the query scores 1. The query participates
/// in the document-frequency counts.
#[must_use]
pub fn rank(docs: &[String], query: &str) -> Vec<RankedIndex> {
    let doc_tokens: Vec<Vec<String>> = docs.iter().map(|d| tokenize(d)).collect();
    let query_tokens = tokenize(query);

    // Document frequency over docs + query
    let n = docs.len() + 1;
    let mut df: HashMap<&str, usize> = HashMap::new();
    for tokens in doc_tokens.iter().chain(std::iter::once(&query_tokens)) {
        let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
        for term in unique {
            *df.entry(term).or_insert(0) += 1;
        }
    }

    let idf = |term: &str| -> f64 {
        let df = df.get(term).copied().unwrap_or(0);
        ((1.0 + n as f64) / (1.0 + df as f64)).ln() + 1.0
    };

    let vectorize = |tokens: &[String]| -> HashMap<String, f64> {
        let mut tf: HashMap<String, f64> = HashMap::new();
        for token in tokens {
            *tf.entry(token.clone()).or_insert(0.0) += 1.0;
        }

        for (term, weight) in &mut tf {
            *weight *= idf(term);
        }

        let norm: f64 = tf.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for weight in tf.values_mut() {
                *weight /= norm;
            }
        }

        tf
    };

    let query_vec = vectorize(&query_tokens);

    let mut ranking: Vec<RankedIndex> = doc_tokens
        .iter()
        .enumerate()
        .map(|(index, tokens)| {
            let doc_vec = vectorize(tokens);
            let score: f64 = query_vec
                .iter()
                .filter_map(|(term, qw)| doc_vec.get(term).map(|dw| qw * dw))
                .sum();
            RankedIndex { index, score }
        })
        .collect();

    // Stable: ties keep corpus order
    ranking.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    ranking
}

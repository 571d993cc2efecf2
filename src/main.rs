#![allow(dead_code)]

mod logging;
mod normalize;
mod query;
mod vector;
mod word2vec;

use std::env;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use dotenv::dotenv;
use log::{info, warn};

use logging::{LevelFilter, LogConfig};
use normalize::{Stopwords, TextNormalizer};
use query::{analogy, similar};
use word2vec::{read_corpus, VocabularyModel, Word2Vec, Word2VecConfig};

/// Macro to time the execution of a block of code
macro_rules! time_it {
    ($label:expr, $block:expr) => {{
        let start = Instant::now();
        let result = $block;
        let duration = start.elapsed();
        info!("{} took {:.2?}", $label, duration);
        result
    }};
}

/// Read a configuration value from the environment, falling back to a default.
fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let log_path = env_or("W2V_LOG_PATH", "logs/rust_word2vec.log");
    logging::init(&LogConfig::new(log_path, LevelFilter::Info))?;

    let corpus_path = env_or("W2V_CORPUS_PATH", "data/reviews.txt");
    let model_path = env_or("W2V_MODEL_PATH", "models/word2vec_model.json");
    let stopwords_path = env_or("W2V_STOPWORDS_PATH", "data/stopwords.txt");

    // Reuse a trained model when one is on disk; otherwise train from the
    // raw corpus and persist the result for the next run.
    let model = if Path::new(&model_path).exists() {
        info!("Loading trained model from {}", model_path);
        time_it!("Model load", VocabularyModel::load_parallel(&model_path)?)
    } else {
        let raw = read_corpus(Some(&corpus_path))?;
        let normalizer = TextNormalizer::new();
        let stopwords = Stopwords::load(Some(&stopwords_path))?;

        let documents: Vec<_> = time_it!(
            "Normalization",
            raw.iter()
                .flat_map(|line| normalizer.normalize(line))
                .map(|document| stopwords.remove(&document))
                .filter(|document| !document.is_empty())
                .collect()
        );
        info!("Normalized corpus into {} sentence documents", documents.len());

        let model = time_it!(
            "Training",
            Word2Vec::new(Word2VecConfig::default()).fit(&documents)
        );
        model.save(Some(&model_path))?;
        model
    };
    info!("Model ready: {} tokens, {} dimensions", model.len(), model.vector_size());

    // Synonym lookups
    for phrase in ["movie", "actor", "story"] {
        match time_it!(format!("Query {:?}", phrase), similar(&model, phrase, 10)) {
            Ok(synonyms) => {
                info!("Nearest to {:?}:", phrase);
                for synonym in &synonyms {
                    info!("  {:<16} {:.4}", synonym.token, synonym.score);
                }
            }
            Err(e) => warn!("Synonym query for {:?} failed: {}", phrase, e),
        }
    }

    // Analogy scoring: smaller distance, stronger analogy
    for (x, y, z, a) in [
        ("king", "man", "queen", "woman"),
        ("good", "great", "bad", "terrible"),
    ] {
        match analogy(&model, x, y, z, a) {
            Ok(score) => info!("{} is to {} as {} is to {}: distance {:.4}", x, y, z, a, score),
            Err(e) => warn!("Analogy ({}, {}, {}, {}) failed: {}", x, y, z, a, e),
        }
    }

    Ok(())
}

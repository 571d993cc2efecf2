//! # Query Module.
//!
//! Synonym lookups and analogy scoring over a trained `VocabularyModel`.
//!
//! ## Key Features
//!
//! - Synonym queries
//!
//! `similar` resolves a free-text phrase to a single embedding, asks the
//! model for the nearest vocabulary tokens, and filters out every token
//! that already appears in the phrase itself.
//!
//! - Analogy scoring
//!
//! `analogy` scores how well "x is to y as z is to a" holds in the
//! embedding space: the closer the two pair-difference vectors, the
//! stronger the analogy. The raw Euclidean distance is the result; no
//! normalization or thresholding is applied.
//!
//! Phrases go through a lighter normalization than the corpus pipeline:
//! lowercase and whitespace split only, with no punctuation or markup
//! handling. Phrase resolution takes the FIRST token's embedding; this
//! mirrors the model transform behavior the queries were built against
//! and is preserved as-is.
//!
//! Both operations are pure functions over an immutable model reference.

use log::debug;
use thiserror::Error;

use crate::vector::{self, VectorError};
use crate::word2vec::{ModelError, Synonym, VocabularyModel};

#[derive(Debug, Error, PartialEq)]
/// Errors raised by synonym and analogy queries.
pub enum QueryError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Vector(#[from] VectorError),
}

/// Normalize a query phrase into tokens.
///
/// Intentionally lighter than the corpus normalizer: lowercase and
/// whitespace split only.
///
/// # Arguments
///
/// * `phrase` - The free-text phrase.
///
/// # Returns
///
/// * `Vec<String>` - The lowercased tokens.
pub fn tokenize_phrase(phrase: &str) -> Vec<String> {
    phrase
        .to_lowercase()
        .split_whitespace()
        .map(|token| token.to_string())
        .collect()
}

/// Find up to `k` tokens similar to a phrase.
///
/// The phrase resolves to its first token's embedding; the model returns
/// the `k` nearest vocabulary tokens by cosine similarity, and any token
/// already present (case-insensitively) in the phrase is dropped. The
/// result can therefore be shorter than `k`. Requesting more neighbors
/// than the vocabulary holds returns all available filtered entries.
///
/// # Arguments
///
/// * `model` - The trained model.
/// * `phrase` - The free-text phrase.
/// * `k` - Result size, clamped to at least 1.
///
/// # Returns
///
/// * `Ok(Vec<Synonym>)` - Up to `k` entries, descending by score.
/// * `Err(QueryError)` - If the resolved token is out of vocabulary.
///
/// # Examples
///
/// ```
/// let synonyms = similar(&model, "Movie", 10)?;
/// ```
pub fn similar(model: &VocabularyModel, phrase: &str, k: usize) -> Result<Vec<Synonym>, QueryError> {
    let k = k.max(1);
    let tokens = tokenize_phrase(phrase);
    let vector = model.embed(&tokens)?;
    let neighbors = model.nearest(vector, k)?;
    debug!("similar({:?}, {}): {} raw neighbors", phrase, k, neighbors.len());

    Ok(neighbors
        .into_iter()
        .filter(|synonym| !tokens.iter().any(|t| t == &synonym.token.to_lowercase()))
        .collect())
}

/// Score the analogy "x is to y as z is to a".
///
/// Computes the difference vector of each pair and the Euclidean distance
/// between the two differences. Smaller distances mean the relationship
/// holds more strongly. The pairing is `vector(x) - vector(is_to_y)`
/// against `vector(is_to_a) - vector(like_z)`; this orientation matches
/// the behavior the scores were calibrated against and must not be
/// flipped.
///
/// # Arguments
///
/// * `model` - The trained model.
/// * `x`, `is_to_y` - The first word pair.
/// * `like_z`, `is_to_a` - The second word pair.
///
/// # Returns
///
/// * `Ok(f32)` - The non-negative raw distance.
/// * `Err(QueryError)` - If any phrase resolves to an out-of-vocabulary token.
///
/// # Examples
///
/// ```
/// let score = analogy(&model, "king", "man", "queen", "woman")?;
/// ```
pub fn analogy(
    model: &VocabularyModel,
    x: &str,
    is_to_y: &str,
    like_z: &str,
    is_to_a: &str,
) -> Result<f32, QueryError> {
    let x_vec = model.embed(&tokenize_phrase(x))?;
    let y_vec = model.embed(&tokenize_phrase(is_to_y))?;
    let z_vec = model.embed(&tokenize_phrase(like_z))?;
    let a_vec = model.embed(&tokenize_phrase(is_to_a))?;

    let left = vector::subtract(x_vec, y_vec)?;
    let right = vector::subtract(a_vec, z_vec)?;
    Ok(vector::euclidean_distance(&left, &right)?)
}

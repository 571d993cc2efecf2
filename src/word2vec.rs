//! Word2Vec model implementation.
//!
//! Based on the paper "Distributed Representations of Words and Phrases and their Compositionality" by Tomas Mikolov, Kai Chen, Greg Corrado, and Jeffrey Dean.
//!
//! https://arxiv.org/abs/1310.4546
//!
//! ## Key Features
//!
//! ### Vocabulary construction:
//!
//! The vocabulary is built from sentence-level Documents and excludes
//! tokens below a minimum corpus frequency (`min_count`). Out-of-vocabulary
//! lookups fail explicitly; the model never substitutes a default vector.
//!
//! ### Training:
//!
//! Skip-Gram with Negative Sampling, with context windows bounded by
//! sentence edges. Embeddings are initialized randomly with fastrand and
//! updated by gradient descent. Training progress is reported with an
//! indicatif bar.
//!
//! ### Queries:
//!
//! The trained `VocabularyModel` is immutable. It exposes exact embedding
//! lookup, phrase embedding via a documented first-token rule, and a
//! rayon-parallel cosine nearest-neighbor scan over the vocabulary.
//!
//! ### Persistence:
//!
//! The `save` and `load` methods persist the model as JSON using
//! serde_json. `load_parallel` reads the file in per-core chunks before
//! parsing, which helps with large trained models.
//!
//! # Examples
//!
//! ```
//! let documents = normalizer.normalize(&raw_text);
//! let model = Word2Vec::new(Word2VecConfig::default()).fit(&documents);
//! let neighbors = model.nearest(model.embedding("movie")?, 10)?;
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom};
use std::collections::{HashMap, HashSet};

use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::normalize::Document;
use crate::vector::{self, VectorError};

/// Default path for the model.
const DEFAULT_MODEL_PATH: &str = "models/word2vec_model.json";
/// Default path for the corpus.
const DEFAULT_CORPUS_PATH: &str = "data/reviews.txt";

#[derive(Debug, Error, PartialEq)]
/// Errors raised by vocabulary lookups.
pub enum ModelError {
    #[error("token not in vocabulary: {0}")]
    TokenNotFound(String),
    #[error("cannot embed an empty token sequence")]
    EmptyPhrase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One nearest-neighbor hit: a vocabulary token and its similarity score.
pub struct Synonym {
    pub token: String,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Training configuration for the Word2Vec model.
///
/// # Fields
///
/// * `vector_size` - Embedding dimension.
/// * `min_count` - Minimum corpus frequency for a token to enter the vocabulary.
/// * `window_size` - Context window size, bounded by sentence edges.
/// * `negative_samples` - Negative samples per positive sample.
/// * `epochs` - Number of passes over the corpus.
/// * `learning_rate` - Gradient descent step size.
///
/// # Examples
///
/// ```
/// let config = Word2VecConfig::default()
///     .with_vector_size(100)
///     .with_min_count(5);
/// ```
pub struct Word2VecConfig {
    pub vector_size: usize,
    pub min_count: usize,
    pub window_size: usize,
    pub negative_samples: usize,
    pub epochs: usize,
    pub learning_rate: f32,
}

impl Default for Word2VecConfig {
    fn default() -> Self {
        Self {
            vector_size: 200,
            min_count: 10,
            window_size: 5,
            negative_samples: 5,
            epochs: 10,
            learning_rate: 0.025,
        }
    }
}

impl Word2VecConfig {
    pub fn with_vector_size(mut self, vector_size: usize) -> Self {
        self.vector_size = vector_size;
        self
    }

    pub fn with_min_count(mut self, min_count: usize) -> Self {
        self.min_count = min_count;
        self
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_negative_samples(mut self, negative_samples: usize) -> Self {
        self.negative_samples = negative_samples;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }
}

/// Trainer for the Word2Vec model.
///
/// Builds the vocabulary from sentence Documents, trains with Skip-Gram
/// and Negative Sampling, and produces an immutable `VocabularyModel`.
///
/// # Examples
///
/// ```
/// let trainer = Word2Vec::new(Word2VecConfig::default());
/// let model = trainer.fit(&documents);
/// ```
pub struct Word2Vec {
    config: Word2VecConfig,
    vocab: HashMap<String, usize>,         // Word to index mapping
    index_to_word: Vec<String>,            // Index to word mapping
    input_vectors: Vec<Vec<f32>>,          // Input layer embeddings
    output_vectors: Vec<Vec<f32>>,         // Output layer embeddings
}

impl Word2Vec {
    /// Initialize the trainer.
    ///
    /// # Arguments
    ///
    /// * `config` - The training configuration.
    ///
    /// # Returns
    ///
    /// * `Self` - The `Word2Vec` trainer, vocabulary still empty.
    pub fn new(config: Word2VecConfig) -> Self {
        Self {
            config,
            vocab: HashMap::new(),
            index_to_word: Vec::new(),
            input_vectors: Vec::new(),
            output_vectors: Vec::new(),
        }
    }

    /// Train on a document collection and produce the immutable model.
    ///
    /// # Arguments
    ///
    /// * `documents` - Sentence-level token Documents.
    ///
    /// # Returns
    ///
    /// * `VocabularyModel` - The trained, read-only model.
    pub fn fit(mut self, documents: &[Document]) -> VocabularyModel {
        self.build_vocab(documents);
        self.init_vectors();
        self.train(documents);
        VocabularyModel {
            vocab: self.vocab,
            index_to_word: self.index_to_word,
            vectors: self.input_vectors,
            vector_size: self.config.vector_size,
        }
    }

    /// Build the vocabulary, excluding tokens below `min_count`.
    fn build_vocab(&mut self, documents: &[Document]) {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for document in documents {
            for token in &document.tokens {
                *counts.entry(token.as_str()).or_insert(0) += 1;
            }
        }
        let total = counts.len();

        let mut kept: Vec<&str> = counts
            .iter()
            .filter(|(_, &count)| count >= self.config.min_count)
            .map(|(&token, _)| token)
            .collect();
        // Deterministic index assignment across runs.
        kept.sort_unstable();

        for token in kept {
            let idx = self.index_to_word.len();
            self.vocab.insert(token.to_string(), idx);
            self.index_to_word.push(token.to_string());
        }
        info!(
            "Vocabulary: kept {} of {} distinct tokens (min_count = {})",
            self.vocab.len(),
            total,
            self.config.min_count
        );
    }

    /// Initialize random embeddings for input and output layers.
    fn init_vectors(&mut self) {
        let vocab_size = self.vocab.len();
        let dim = self.config.vector_size;
        self.input_vectors = (0..vocab_size)
            .into_par_iter()
            .map(|_| (0..dim).map(|_| fastrand::f32() - 0.5).collect())
            .collect();
        self.output_vectors = (0..vocab_size)
            .into_par_iter()
            .map(|_| (0..dim).map(|_| fastrand::f32() - 0.5).collect())
            .collect();
    }

    /// Train using Skip-Gram with Negative Sampling.
    ///
    /// Context windows never cross sentence boundaries.
    fn train(&mut self, documents: &[Document]) {
        if self.vocab.is_empty() {
            info!("Empty vocabulary, skipping training");
            return;
        }

        let pb = ProgressBar::new((self.config.epochs * documents.len()) as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
        {
            pb.set_style(style);
        }

        for epoch in 0..self.config.epochs {
            for document in documents {
                self.train_document(document);
                pb.inc(1);
            }
            pb.set_message(format!("Epoch {}/{}", epoch + 1, self.config.epochs));
        }
        pb.finish_with_message("Training complete");
    }

    /// Run one Skip-Gram pass over a single sentence.
    fn train_document(&mut self, document: &Document) {
        let tokens = &document.tokens;
        let lr = self.config.learning_rate;
        for (idx, word) in tokens.iter().enumerate() {
            let Some(&word_idx) = self.vocab.get(word) else { continue };
            let start = idx.saturating_sub(self.config.window_size);
            let end = usize::min(idx + self.config.window_size + 1, tokens.len());

            for context_word in &tokens[start..end] {
                if context_word == word { continue; }
                if let Some(&context_idx) = self.vocab.get(context_word) {
                    self.update_embeddings(word_idx, context_idx, 1.0, lr);

                    let negative_samples: HashSet<usize> = (0..self.config.negative_samples)
                        .map(|_| fastrand::usize(0..self.vocab.len()))
                        .filter(|&idx| idx != context_idx)
                        .collect();

                    for &neg_idx in &negative_samples {
                        self.update_embeddings(word_idx, neg_idx, 0.0, lr);
                    }
                }
            }
        }
    }

    /// Update embeddings using gradient descent.
    ///
    /// # Arguments
    ///
    /// * `target_idx` - The index of the target word.
    /// * `context_idx` - The index of the context word.
    /// * `label` - 1.0 for a positive sample, 0.0 for a negative sample.
    /// * `learning_rate` - The learning rate.
    fn update_embeddings(&mut self, target_idx: usize, context_idx: usize, label: f32, learning_rate: f32) {
        let input_vec = self.input_vectors[target_idx].clone();
        let output_vec = self.output_vectors[context_idx].clone();

        let dot_product: f32 = input_vec.iter().zip(output_vec.iter()).map(|(x, y)| x * y).sum();
        let sigmoid = 1.0 / (1.0 + (-dot_product).exp());
        let error = sigmoid - label;

        for i in 0..self.config.vector_size {
            self.input_vectors[target_idx][i] -= learning_rate * error * output_vec[i];
            self.output_vectors[context_idx][i] -= learning_rate * error * input_vec[i];
        }
    }
}

#[derive(Serialize, Deserialize)]
/// The trained token-to-embedding mapping.
///
/// Immutable after construction: every query borrows it read-only, so
/// concurrent lookups are safe without synchronization.
///
/// # Fields
///
/// * `vocab` - Word to index mapping.
/// * `index_to_word` - Index to word mapping.
/// * `vectors` - One embedding per vocabulary entry (input layer).
/// * `vector_size` - Embedding dimension, uniform across the model.
pub struct VocabularyModel {
    vocab: HashMap<String, usize>,
    index_to_word: Vec<String>,
    vectors: Vec<Vec<f32>>,
    vector_size: usize,
}

impl VocabularyModel {
    /// Build a model from precomputed embeddings.
    ///
    /// All vectors must share one dimensionality; the model takes it from
    /// the first entry.
    ///
    /// # Arguments
    ///
    /// * `entries` - `(token, embedding)` pairs.
    ///
    /// # Returns
    ///
    /// * `Self` - The assembled model.
    pub fn from_embeddings(entries: Vec<(String, Vec<f32>)>) -> Self {
        let vector_size = entries.first().map(|(_, v)| v.len()).unwrap_or(0);
        let mut vocab = HashMap::with_capacity(entries.len());
        let mut index_to_word = Vec::with_capacity(entries.len());
        let mut vectors = Vec::with_capacity(entries.len());
        for (token, vector) in entries {
            vocab.insert(token.clone(), index_to_word.len());
            index_to_word.push(token);
            vectors.push(vector);
        }
        Self { vocab, index_to_word, vectors, vector_size }
    }

    /// Number of tokens in the vocabulary.
    pub fn len(&self) -> usize {
        self.index_to_word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_word.is_empty()
    }

    /// Embedding dimension shared by every vector in the model.
    pub fn vector_size(&self) -> usize {
        self.vector_size
    }

    pub fn contains(&self, token: &str) -> bool {
        self.vocab.contains_key(token)
    }

    /// Get the embedding for a token.
    ///
    /// # Arguments
    ///
    /// * `token` - The token to look up.
    ///
    /// # Returns
    ///
    /// * `Ok(&[f32])` - The embedding.
    /// * `Err(ModelError)` - If the token is out of vocabulary. The model
    ///   never substitutes a default vector.
    pub fn embedding(&self, token: &str) -> Result<&[f32], ModelError> {
        self.vocab
            .get(token)
            .map(|&idx| self.vectors[idx].as_slice())
            .ok_or_else(|| ModelError::TokenNotFound(token.to_string()))
    }

    /// Reduce a token sequence to a single embedding.
    ///
    /// Multi-token phrases resolve to the embedding of their FIRST token;
    /// the remaining tokens are ignored, not averaged. Downstream analogy
    /// scores depend on this exact behavior.
    ///
    /// # Arguments
    ///
    /// * `tokens` - The token sequence.
    ///
    /// # Returns
    ///
    /// * `Ok(&[f32])` - The first token's embedding.
    /// * `Err(ModelError)` - If the sequence is empty or the first token
    ///   is out of vocabulary.
    pub fn embed(&self, tokens: &[String]) -> Result<&[f32], ModelError> {
        let first = tokens.first().ok_or(ModelError::EmptyPhrase)?;
        self.embedding(first)
    }

    /// Find the `k` vocabulary tokens nearest to a vector.
    ///
    /// Similarity is cosine. The scan runs in parallel over the whole
    /// vocabulary; requesting more neighbors than the vocabulary holds
    /// returns every entry.
    ///
    /// # Arguments
    ///
    /// * `vector` - The query vector.
    /// * `k` - Maximum number of neighbors to return.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Synonym>)` - At most `k` entries, descending by score.
    /// * `Err(VectorError)` - If the query vector's length differs from
    ///   the model's dimension.
    pub fn nearest(&self, vector: &[f32], k: usize) -> Result<Vec<Synonym>, VectorError> {
        let mut scored: Vec<Synonym> = self
            .vectors
            .par_iter()
            .enumerate()
            .map(|(idx, candidate)| {
                vector::cosine_similarity(vector, candidate).map(|score| Synonym {
                    token: self.index_to_word[idx].clone(),
                    score,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);
        Ok(scored)
    }

    /// Save the model to a JSON file.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the model file. Defaults to `models/word2vec_model.json`.
    pub fn save(&self, path: Option<&str>) -> Result<()> {
        let path = path.unwrap_or(DEFAULT_MODEL_PATH);
        if let Some(parent) = std::path::Path::new(path).parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create model directory for {}", path))?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create model file {}", path))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &self)?;
        info!("Saved model ({} tokens, {} dims) to {}", self.len(), self.vector_size, path);
        Ok(())
    }

    /// Load the model from a JSON file.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the model file. Defaults to `models/word2vec_model.json`.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let path = path.unwrap_or(DEFAULT_MODEL_PATH);
        let file = File::open(path)
            .with_context(|| format!("Failed to open model file {}", path))?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Load the model by reading the JSON file in per-core chunks.
    ///
    /// Trained models run to hundreds of megabytes; reading the file in
    /// parallel before a single parse pass cuts the I/O wait.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the model file.
    pub fn load_parallel(path: &str) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open model file {}", path))?;
        let file_size = file.metadata()?.len();
        let workers = num_cpus::get() as u64;
        let chunk_size = file_size / workers;

        let chunks: Vec<String> = (0..workers)
            .into_par_iter()
            .map(|i| {
                let mut reader = BufReader::new(File::open(path).ok()?);
                let start = i * chunk_size;
                let end = if i == workers - 1 { file_size } else { (i + 1) * chunk_size };

                reader.seek(SeekFrom::Start(start)).ok()?;
                let mut buffer = vec![0; (end - start) as usize];
                reader.read_exact(&mut buffer).ok()?;

                String::from_utf8(buffer).ok()
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| anyhow!("Failed to read model file chunks from {}", path))?;

        let combined = chunks.join("");
        Ok(serde_json::from_str(&combined)?)
    }
}

/// Read the raw corpus from a newline-delimited file, one document per line.
///
/// # Arguments
///
/// * `path` - The path to the corpus file. Defaults to `data/reviews.txt`.
///
/// # Returns
///
/// * `Result<Vec<String>>` - The raw documents.
pub fn read_corpus(path: Option<&str>) -> Result<Vec<String>> {
    let path = path.unwrap_or(DEFAULT_CORPUS_PATH);
    let file = File::open(path)
        .with_context(|| format!("Failed to open corpus file {}", path))?;
    let reader = BufReader::new(file);
    let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;
    info!("Read {} raw documents from {}", lines.len(), path);
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(tokens: &[&str]) -> Document {
        Document::new(tokens.iter().map(|t| t.to_string()).collect())
    }

    fn tiny_model() -> VocabularyModel {
        VocabularyModel::from_embeddings(vec![
            ("movie".to_string(), vec![1.0, 0.0]),
            ("film".to_string(), vec![0.9, 0.1]),
            ("flick".to_string(), vec![0.8, 0.3]),
            ("banana".to_string(), vec![0.0, 1.0]),
        ])
    }

    #[test]
    fn vocab_excludes_tokens_below_min_count() {
        let documents = vec![
            doc(&["good", "movie"]),
            doc(&["good", "film"]),
            doc(&["good", "rare"]),
        ];
        let config = Word2VecConfig::default()
            .with_vector_size(4)
            .with_min_count(2)
            .with_epochs(1);
        let model = Word2Vec::new(config).fit(&documents);

        assert!(model.contains("good"));
        assert!(!model.contains("movie"));
        assert!(!model.contains("rare"));
    }

    #[test]
    fn training_produces_uniform_dimensionality() {
        let documents = vec![
            doc(&["the", "quick", "brown", "fox"]),
            doc(&["the", "lazy", "brown", "dog"]),
            doc(&["the", "quick", "lazy", "fox"]),
        ];
        let config = Word2VecConfig::default()
            .with_vector_size(8)
            .with_min_count(2)
            .with_window_size(2)
            .with_epochs(3);
        let model = Word2Vec::new(config).fit(&documents);

        assert_eq!(model.vector_size(), 8);
        assert!(model.len() > 0);
        let embedding = model.embedding("fox").unwrap();
        assert_eq!(embedding.len(), 8);
    }

    #[test]
    fn oov_lookup_fails_with_the_token() {
        let model = tiny_model();
        assert_eq!(
            model.embedding("unseen"),
            Err(ModelError::TokenNotFound("unseen".to_string()))
        );
    }

    #[test]
    fn embed_uses_only_the_first_token() {
        let model = tiny_model();
        let phrase: Vec<String> = vec!["movie".to_string(), "banana".to_string()];
        let embedded = model.embed(&phrase).unwrap();
        assert_eq!(embedded, model.embedding("movie").unwrap());
    }

    #[test]
    fn embed_rejects_empty_sequences() {
        let model = tiny_model();
        assert_eq!(model.embed(&[]), Err(ModelError::EmptyPhrase));
    }

    #[test]
    fn nearest_ranks_by_descending_similarity() {
        let model = tiny_model();
        let query = model.embedding("movie").unwrap().to_vec();
        let neighbors = model.nearest(&query, 3).unwrap();

        assert_eq!(neighbors.len(), 3);
        assert_eq!(neighbors[0].token, "movie");
        assert_eq!(neighbors[1].token, "film");
        assert_eq!(neighbors[2].token, "flick");
        assert!(neighbors[0].score >= neighbors[1].score);
        assert!(neighbors[1].score >= neighbors[2].score);
    }

    #[test]
    fn nearest_caps_at_vocabulary_size() {
        let model = tiny_model();
        let query = model.embedding("movie").unwrap().to_vec();
        let neighbors = model.nearest(&query, 100).unwrap();
        assert_eq!(neighbors.len(), model.len());
    }

    #[test]
    fn nearest_rejects_mismatched_query_vectors() {
        let model = tiny_model();
        assert!(model.nearest(&[1.0, 0.0, 0.0], 2).is_err());
    }

    #[test]
    fn save_and_load_round_trip() {
        let model = tiny_model();
        let path = std::env::temp_dir().join(format!(
            "rust_word2vec_model_{}.json",
            std::process::id()
        ));
        let path = path.to_str().unwrap().to_string();

        model.save(Some(&path)).unwrap();
        let loaded = VocabularyModel::load(Some(&path)).unwrap();
        let parallel = VocabularyModel::load_parallel(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.len(), model.len());
        assert_eq!(loaded.vector_size(), model.vector_size());
        assert_eq!(loaded.embedding("film").unwrap(), model.embedding("film").unwrap());
        assert_eq!(parallel.embedding("film").unwrap(), model.embedding("film").unwrap());
    }
}

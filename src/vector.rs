//! Elementwise arithmetic over fixed-length embedding vectors.
//!
//! All embeddings in one model share a dimensionality, so a length
//! mismatch here means the caller mixed vectors from different models.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
/// Error type for vector arithmetic.
pub enum VectorError {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
    },
}

/// Subtract two vectors elementwise.
///
/// # Arguments
///
/// * `a` - The minuend.
/// * `b` - The subtrahend.
///
/// # Returns
///
/// * `Ok(Vec<f32>)` - The difference `a[i] - b[i]`, same length as `a`.
/// * `Err(VectorError)` - If the lengths differ.
pub fn subtract(a: &[f32], b: &[f32]) -> Result<Vec<f32>, VectorError> {
    if a.len() != b.len() {
        return Err(VectorError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(a.iter().zip(b.iter()).map(|(x, y)| x - y).collect())
}

/// Euclidean distance between two vectors.
///
/// # Arguments
///
/// * `a` - The first vector.
/// * `b` - The second vector.
///
/// # Returns
///
/// * `Ok(f32)` - The square root of the sum of squared elementwise differences.
/// * `Err(VectorError)` - If the lengths differ.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> Result<f32, VectorError> {
    if a.len() != b.len() {
        return Err(VectorError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    let sum: f32 = a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum();
    Ok(sum.sqrt())
}

/// Cosine similarity between two vectors.
///
/// Used by the nearest-neighbor scan. Returns 0.0 when either vector
/// has zero magnitude.
///
/// # Arguments
///
/// * `a` - The first vector.
/// * `b` - The second vector.
///
/// # Returns
///
/// * `Ok(f32)` - The cosine similarity in [-1, 1].
/// * `Err(VectorError)` - If the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, VectorError> {
    if a.len() != b.len() {
        return Err(VectorError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn subtract_is_elementwise() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![0.5, 1.0, 1.5];
        let diff = subtract(&a, &b).unwrap();
        assert_eq!(diff, vec![0.5, 1.0, 1.5]);
    }

    #[test]
    fn subtract_preserves_dimensionality() {
        let a = vec![0.1; 200];
        let b = vec![0.2; 200];
        assert_eq!(subtract(&a, &b).unwrap().len(), a.len());
    }

    #[test]
    fn subtract_rejects_mismatched_lengths() {
        let a = vec![1.0, 2.0];
        let b = vec![1.0, 2.0, 3.0];
        assert_eq!(
            subtract(&a, &b),
            Err(VectorError::DimensionMismatch { expected: 2, actual: 3 })
        );
    }

    #[test]
    fn distance_is_reflexive() {
        let v = vec![0.3, -1.2, 4.5, 0.0];
        assert_eq!(euclidean_distance(&v, &v).unwrap(), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![-2.0, 0.5, 7.0];
        let ab = euclidean_distance(&a, &b).unwrap();
        let ba = euclidean_distance(&b, &a).unwrap();
        assert!((ab - ba).abs() < EPSILON);
    }

    #[test]
    fn distance_matches_hand_computation() {
        // sqrt(3^2 + 4^2) = 5
        let a = vec![3.0, 4.0];
        let b = vec![0.0, 0.0];
        assert!((euclidean_distance(&a, &b).unwrap() - 5.0).abs() < EPSILON);
    }

    #[test]
    fn distance_rejects_mismatched_lengths() {
        let a = vec![1.0];
        let b = vec![1.0, 2.0];
        assert!(matches!(
            euclidean_distance(&a, &b),
            Err(VectorError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![1.0, 2.0, 2.0];
        assert!((cosine_similarity(&v, &v).unwrap() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).unwrap().abs() < EPSILON);
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b).unwrap(), 0.0);
    }
}

use crate::{Embedder, EmbeddingError};

/// Deterministic feature-hashing embedder.
///
/// Each lowercase alphanumeric token is hashed into a signed bucket, so texts
/// sharing vocabulary land close together under cosine similarity. Text with
/// no tokens gets a pseudo-random unit vector seeded from its bytes. Needs no
/// model download, which makes it the embedder for tests and offline runs.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&mut self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if self.dimension == 0 {
            return Err(EmbeddingError::ZeroDimension);
        }
        Ok(hash_embed(text, self.dimension))
    }
}

fn hash_embed(text: &str, dimension: usize) -> Vec<f32> {
    let mut vec = vec![0.0_f32; dimension];
    let mut tokens = 0usize;
    let dim = dimension as u64;

    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        let token = token.to_lowercase();
        let hash = fnv1a_64(token.as_bytes());
        #[allow(clippy::cast_possible_truncation)]
        let bucket = (hash % dim) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vec[bucket] += sign;
        tokens += 1;
    }

    if tokens == 0 {
        return seeded_unit_vector(text, dimension);
    }
    normalize(&mut vec);
    vec
}

fn seeded_unit_vector(text: &str, dimension: usize) -> Vec<f32> {
    let mut state =
        fnv1a_64(text.as_bytes()) ^ (dimension as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut vec = Vec::with_capacity(dimension);
    for _ in 0..dimension {
        let bits = splitmix64(&mut state);
        #[allow(clippy::cast_possible_truncation)]
        let mantissa = ((bits >> 32) as u32) >> 9;
        let unit = f32::from_bits(0x3f80_0000 | mantissa) - 1.0;
        vec.push(unit.mul_add(2.0, -1.0));
    }
    normalize(&mut vec);
    vec
}

fn normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vec.iter_mut() {
            *v /= norm;
        }
    }
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

const fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cosine_similarity;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn identical_input_gives_identical_vectors() {
        let mut a = HashEmbedder::new(64);
        let mut b = HashEmbedder::new(64);
        assert_eq!(
            a.embed("Encrypt data at rest").expect("embed should succeed"),
            b.embed("Encrypt data at rest").expect("embed should succeed")
        );
    }

    #[rstest]
    #[case("Passwords must be hashed")]
    #[case("")]
    #[case("   --- ")]
    fn vectors_are_unit_length(#[case] text: &str) {
        let v = HashEmbedder::new(128).embed(text).expect("embed should succeed");
        assert_eq!(v.len(), 128);
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "norm was {norm}");
    }

    #[test]
    fn shared_vocabulary_scores_higher() {
        let mut e = HashEmbedder::default();
        let query = e.embed("password hashing").expect("embed should succeed");
        let related = e.embed("every password must use salted hashing").expect("embed should succeed");
        let unrelated = e.embed("quarterly revenue forecast spreadsheet").expect("embed should succeed");
        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn case_is_ignored() {
        let mut e = HashEmbedder::new(32);
        assert_eq!(e.embed("TLS Required").expect("embed should succeed"), e.embed("tls required").expect("embed should succeed"));
    }

    #[test]
    fn zero_dimension_is_an_error() {
        assert!(HashEmbedder::new(0).embed("x").is_err());
    }
}

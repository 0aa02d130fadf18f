//! Text embeddings for the semantic candidate query
//!
//! The shipped embedder is a Harmonic Token Projection: every token is read as
//! a base-2^16 integer, reduced modulo a set of coprime moduli and each residue
//! projected onto the unit circle. Token vectors are mean-pooled and L2
//! normalised. It needs no model file, is deterministic and handles any
//! script, but only captures shared tokens, not meaning.

use std::f64::consts::PI;

/// Output dimension of [`EmbeddingModel`] (sin + cos per modulus)
pub const EMBEDDING_DIM: usize = 384;

const NUM_MODULI: usize = EMBEDDING_DIM / 2;

/// Code points of a token that contribute to its integer encoding
const MAX_TOKEN_CHARS: usize = 64;

/// Produces fixed-size vectors for text
pub trait Embedder: Send + Sync {
    fn dimension(&self) -> usize;

    fn embed(&self, text: &str) -> Vec<f32>;
}

pub struct EmbeddingModel {
    moduli: Vec<u64>,
}

impl EmbeddingModel {
    pub fn new() -> Self {
        Self {
            moduli: first_primes(NUM_MODULI),
        }
    }

    fn project_token(&self, token: &str, acc: &mut [f64]) {
        let n = token
            .chars()
            .take(MAX_TOKEN_CHARS)
            .fold(0u64, |n, c| n.wrapping_mul(1 << 16).wrapping_add(c as u64));

        for (i, &m) in self.moduli.iter().enumerate() {
            let theta = 2.0 * PI * ((n % m) as f64) / (m as f64);
            acc[2 * i] += theta.sin();
            acc[2 * i + 1] += theta.cos();
        }
    }
}

impl Default for EmbeddingModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for EmbeddingModel {
    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut acc = vec![0.0f64; EMBEDDING_DIM];
        let mut tokens = 0usize;

        for token in tokenize(text) {
            self.project_token(&token, &mut acc);
            tokens += 1;
        }

        if tokens == 0 {
            return vec![0.0; EMBEDDING_DIM];
        }

        // Mean pooling cancels out under L2 normalisation
        let norm = acc.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            acc.iter().map(|x| (x / norm) as f32).collect()
        } else {
            acc.iter().map(|x| *x as f32).collect()
        }
    }
}

/// Lowercased words split on whitespace and ASCII punctuation
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
}

fn first_primes(count: usize) -> Vec<u64> {
    let mut primes: Vec<u64> = Vec::with_capacity(count);
    let mut candidate = 2u64;
    while primes.len() < count {
        if primes
            .iter()
            .take_while(|&&p| p * p <= candidate)
            .all(|&p| candidate % p != 0)
        {
            primes.push(candidate);
        }
        candidate += 1;
    }
    primes
}

/// Cosine similarity; zero for mismatched or zero vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a > 0.0 && norm_b > 0.0 {
        dot / (norm_a * norm_b)
    } else {
        0.0
    }
}

/// Cosine distance in `[0, 2]`; smaller is closer
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

//! Deterministic provider doubles for pipeline tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};

use support_rag::error::{Error, Result};
use support_rag::providers::{EmbeddingProvider, GenerationProvider};

pub const STUB_DIMENSIONS: usize = 512;

/// Process-wide word-to-dimension assignment. Each distinct word gets its
/// own slot, so cosine similarity measures exact word overlap with no
/// hash collisions.
fn word_slot(word: &str) -> usize {
    static VOCAB: OnceLock<Mutex<HashMap<String, usize>>> = OnceLock::new();
    let mut vocab = VOCAB
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap();
    let next = vocab.len();
    *vocab.entry(word.to_string()).or_insert(next) % STUB_DIMENSIONS
}

/// Stable 64-bit FNV-1a hash, so embeddings do not depend on the
/// platform hasher
fn fnv1a64(data: &str) -> u64 {
    let mut hash = 0xcbf29ce484222325u64;
    for byte in data.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// Bag-of-words embedder: each lowercase word maps to its own dimension.
/// Texts sharing words get positive cosine similarity; disjoint texts
/// score zero. Fully deterministic.
pub struct StubEmbedder {
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl StubEmbedder {
    pub fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn embed_text(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; STUB_DIMENSIONS];
        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            vector[word_slot(word)] += 1.0;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::embedding("stub embedder offline"));
        }
        Ok(Self::embed_text(text))
    }

    fn dimensions(&self) -> usize {
        STUB_DIMENSIONS
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.fail.load(Ordering::SeqCst))
    }

    fn name(&self) -> &str {
        "stub-embedder"
    }
}

/// Scripted generator: answers are a deterministic function of the
/// prompt, and failure can be switched on to exercise fallback paths.
pub struct StubGenerator {
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl StubGenerator {
    pub fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        let generator = Self::new();
        generator.fail.store(true, Ordering::SeqCst);
        generator
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationProvider for StubGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::synthesis("stub generator offline"));
        }
        Ok(format!("stub-answer:{:016x}", fnv1a64(prompt)))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.fail.load(Ordering::SeqCst))
    }

    fn name(&self) -> &str {
        "stub-generator"
    }

    fn model(&self) -> &str {
        "stub"
    }
}

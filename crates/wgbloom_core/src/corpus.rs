//! Word corpora: a flat buffer of comma-terminated words plus start offsets.
use crate::consts::{
    ALPHABET_BASE, ALPHABET_SPAN, MAX_GENERATED_WORD_BYTES, MAX_WORD_BYTES, MIN_WORD_BYTES,
    WORD_DELIMITER,
};
use crate::errors::{BloomError, Result};
use rand::Rng;

/// Start offsets of the first `num_words` words in `bytes`.
///
/// `offsets[0] == 0` and every further offset is the byte following a comma.
/// Malformed input is not rejected: when fewer commas are present the
/// result is truncated.
pub fn word_positions(bytes: &[u8], num_words: usize) -> Vec<usize> {
    if num_words == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(num_words);
    out.push(0);
    for (i, &b) in bytes.iter().enumerate() {
        if out.len() == num_words {
            break;
        }
        if b == WORD_DELIMITER {
            out.push(i + 1);
        }
    }
    out
}

/// Owned corpus. Positions are fixed once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Corpus {
    bytes: Vec<u8>,
    positions: Vec<usize>,
}

impl Corpus {
    /// Random words filling at most `budget` bytes.
    ///
    /// Word lengths (comma included) are uniform in `2..=51`; bytes are drawn
    /// from `'A'..='y'`. Generation stops at the first word that would
    /// reach the budget.
    pub fn generate<R: Rng + ?Sized>(budget: usize, rng: &mut R) -> Self {
        let mut bytes = Vec::with_capacity(budget);
        let mut num_words = 0usize;
        loop {
            let len = rng.random_range(MIN_WORD_BYTES..=MAX_GENERATED_WORD_BYTES);
            if bytes.len() + len >= budget {
                break;
            }
            bytes.extend((0..len - 1).map(|_| ALPHABET_BASE + rng.random_range(0..ALPHABET_SPAN)));
            bytes.push(WORD_DELIMITER);
            num_words += 1;
        }
        let positions = word_positions(&bytes, num_words);
        Self { bytes, positions }
    }

    /// Wraps an existing comma-terminated buffer holding `num_words` words.
    pub fn from_bytes(bytes: Vec<u8>, num_words: usize) -> Result<Self> {
        let positions = word_positions(&bytes, num_words);
        let corpus = Self { bytes, positions };
        corpus.validate()?;
        Ok(corpus)
    }

    pub fn from_words<S: AsRef<[u8]>>(words: &[S]) -> Result<Self> {
        let mut bytes = Vec::new();
        for w in words {
            bytes.extend_from_slice(w.as_ref());
            bytes.push(WORD_DELIMITER);
        }
        Self::from_bytes(bytes, words.len())
    }

    /// Every word must be comma terminated and fit a scratch slot.
    pub fn validate(&self) -> Result<()> {
        for index in 0..self.len() {
            let len = self.word_len(index).ok_or(BloomError::Unterminated { index })?;
            if len > MAX_WORD_BYTES {
                return Err(BloomError::WordTooLong { index, len, max: MAX_WORD_BYTES });
            }
        }
        Ok(())
    }

    pub fn bytes(&self) -> &[u8] { &self.bytes }
    pub fn positions(&self) -> &[usize] { &self.positions }
    pub fn len(&self) -> usize { self.positions.len() }
    pub fn is_empty(&self) -> bool { self.positions.is_empty() }

    /// Length of word `index` including its comma.
    pub fn word_len(&self, index: usize) -> Option<usize> {
        let start = *self.positions.get(index)?;
        self.bytes[start..]
            .iter()
            .position(|&b| b == WORD_DELIMITER)
            .map(|n| n + 1)
    }

    /// Word `index` without its comma.
    pub fn word(&self, index: usize) -> Option<&[u8]> {
        let start = *self.positions.get(index)?;
        let len = self.word_len(index)?;
        Some(&self.bytes[start..start + len - 1])
    }
}

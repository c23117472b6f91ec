//! Launch shaping: block and grid dimensions plus scratch sizing.
//!
//! Dimension 0 is the hash row, dimension 1 the word within a block.
use crate::consts::{MAX_WORD_BYTES, WORDS_PER_WARP};
use crate::errors::{BloomError, Result};
use serde::Serialize;

/// `(rows, cols)` of a 2-D range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Range2 {
    pub rows: usize,
    pub cols: usize,
}

impl Range2 {
    pub const DEGENERATE: Range2 = Range2 { rows: 0, cols: 0 };

    pub fn new(rows: usize, cols: usize) -> Self { Self { rows, cols } }
    pub fn size(&self) -> usize { self.rows * self.cols }
    pub fn is_degenerate(&self) -> bool { self.size() == 0 }
}

/// Block shape `(num_hashes, words_per_block)` for a device whose groups
/// hold at most `max_group` work items.
///
/// Returns [`Range2::DEGENERATE`] and logs an error when there are no words,
/// no hash functions, or more hash functions than a group can hold.
pub fn block_shape(num_words: usize, num_hashes: usize, max_group: usize) -> Range2 {
    if num_words == 0 || num_hashes == 0 {
        tracing::error!("specify at least one input word and one hash function");
        return Range2::DEGENERATE;
    }
    let max_words = max_group / num_hashes;
    if max_words == 0 {
        tracing::error!(num_hashes, max_group, "the work group cannot support this number of hash functions");
        return Range2::DEGENERATE;
    }
    let mut words_per_block = WORDS_PER_WARP * (max_words / WORDS_PER_WARP);
    if words_per_block == 0 {
        words_per_block = max_words;
    }
    if num_words <= max_words {
        words_per_block = num_words;
    }
    Range2::new(num_hashes, words_per_block)
}

/// Everything the device needs to launch one kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LaunchConfig {
    pub grid: Range2,
    pub block: Range2,
    /// Block-local scratch bytes.
    pub scratch_bytes: usize,
}

impl LaunchConfig {
    pub fn for_words(num_words: usize, num_hashes: usize, max_group: usize) -> Result<Self> {
        let block = block_shape(num_words, num_hashes, max_group);
        if block.is_degenerate() {
            return Err(BloomError::Launch(format!(
                "degenerate block for {num_words} words, {num_hashes} hashes, group size {max_group}"
            )));
        }
        let cols = num_words.div_ceil(block.cols) * block.cols;
        Ok(Self {
            grid: Range2::new(block.rows, cols),
            block,
            scratch_bytes: block.cols * MAX_WORD_BYTES,
        })
    }

    /// Number of blocks along the word dimension.
    pub fn num_groups(&self) -> usize {
        if self.block.cols == 0 { 0 } else { self.grid.cols / self.block.cols }
    }
}

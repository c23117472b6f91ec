// crates/wgbloom_core/src/consts.rs

/// Every word in a corpus ends with this byte.
pub const WORD_DELIMITER: u8 = b',';

/// Scratch bytes reserved per word in a block, trailing comma included.
pub const MAX_WORD_BYTES: usize = 51;

/// Preferred granularity of words per block.
pub const WORDS_PER_WARP: usize = 32;

pub const DJB2_SEED: u64 = 5381;

// Generator bounds: word length (comma included) is drawn from
// MIN_WORD_BYTES..=MAX_GENERATED_WORD_BYTES, bytes from ALPHABET_BASE..ALPHABET_BASE+ALPHABET_SPAN.
pub const MIN_WORD_BYTES: usize = 2;
pub const MAX_GENERATED_WORD_BYTES: usize = 51;
pub const ALPHABET_BASE: u8 = 65;
pub const ALPHABET_SPAN: u8 = 57;

pub const DEFAULT_FILTER_BITS: usize = 100_000;
pub const DEFAULT_NUM_HASHES: usize = 10;
pub const DEFAULT_CORPUS_BYTES: usize = 2500;

pub const DEFAULT_MAX_WORK_GROUP_SIZE: usize = 1024;
pub const DEFAULT_LOCAL_MEM_SIZE: usize = 64 * 1024;

const _: () = { assert!(MAX_GENERATED_WORD_BYTES <= MAX_WORD_BYTES); };
const _: () = { assert!(MIN_WORD_BYTES >= 2); };

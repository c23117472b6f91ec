//! Insert and query kernels.
//!
//! Work item `(row, col)` of group `g` handles hash row `row` of word
//! `g * block.cols + col`. Row 0 copies each of the group's words into
//! scratch before the barrier; after it every row hashes from scratch.
use crate::consts::WORD_DELIMITER;
use crate::corpus::Corpus;
use crate::device::{WorkGroupKernel, WorkItem};
use crate::errors::{BloomError, Result};
use crate::filter::DeviceFilter;
use crate::hash;
use std::sync::atomic::{AtomicU8, Ordering};

/// One byte per queried word: 1 = maybe present, 0 = absent.
///
/// Entries start at 1 and can only be cleared.
#[derive(Debug)]
pub struct QueryResults {
    flags: Vec<AtomicU8>,
}

impl QueryResults {
    pub fn new(num_words: usize) -> Self {
        Self { flags: (0..num_words).map(|_| AtomicU8::new(1)).collect() }
    }

    pub fn len(&self) -> usize { self.flags.len() }
    pub fn is_empty(&self) -> bool { self.flags.is_empty() }

    #[inline]
    pub fn clear(&self, word: usize) {
        self.flags[word].store(0, Ordering::Relaxed);
    }

    pub fn is_present(&self, word: usize) -> bool {
        self.flags[word].load(Ordering::Relaxed) != 0
    }

    pub fn snapshot(&self) -> Vec<u8> {
        self.flags.iter().map(|f| f.load(Ordering::Relaxed)).collect()
    }

    /// `(present, absent)` counts.
    pub fn tally(&self) -> (usize, usize) {
        let present = self.flags.iter().filter(|f| f.load(Ordering::Relaxed) != 0).count();
        (present, self.len() - present)
    }
}

#[derive(Clone, Copy)]
struct WordSource<'a> {
    words: &'a [u8],
    positions: &'a [usize],
}

impl<'a> WordSource<'a> {
    fn new(corpus: &'a Corpus) -> Self {
        Self { words: corpus.bytes(), positions: corpus.positions() }
    }

    fn num_words(&self) -> usize { self.positions.len() }

    /// Scratch offset of the item's word, `None` past the end of the corpus.
    #[inline]
    fn local_start(&self, item: &WorkItem) -> Option<usize> {
        let word = item.global_col();
        if word >= self.num_words() {
            return None;
        }
        Some(self.positions[word] - self.positions[item.group_start()])
    }

    /// Row 0 copies its word, comma included, to the same relative offset in scratch.
    fn stage(&self, item: &WorkItem, scratch: &mut [u8]) {
        if item.row != 0 {
            return;
        }
        let Some(dst) = self.local_start(item) else { return };
        let start = self.positions[item.global_col()];
        let len = self.words[start..]
            .iter()
            .position(|&b| b == WORD_DELIMITER)
            .map_or(self.words.len() - start, |n| n + 1);
        // Corpus validation bounds every word by MAX_WORD_BYTES, so this fits.
        scratch[dst..dst + len].copy_from_slice(&self.words[start..start + len]);
    }
}

pub struct InsertKernel<'a> {
    src: WordSource<'a>,
    filter: &'a DeviceFilter,
    num_hashes: usize,
}

impl<'a> InsertKernel<'a> {
    pub fn new(corpus: &'a Corpus, filter: &'a DeviceFilter, num_hashes: usize) -> Result<Self> {
        if filter.is_empty() {
            return Err(BloomError::Config("filter size must be non-zero".into()));
        }
        Ok(Self { src: WordSource::new(corpus), filter, num_hashes })
    }
}

impl WorkGroupKernel for InsertKernel<'_> {
    fn stage(&self, item: &WorkItem, scratch: &mut [u8]) {
        self.src.stage(item, scratch);
    }

    fn compute(&self, item: &WorkItem, scratch: &[u8]) {
        let Some(start) = self.src.local_start(item) else { return };
        if let Some(idx) = hash::probe_index(scratch, start, self.filter.len(), self.num_hashes, item.row) {
            self.filter.set(idx);
        }
    }
}

pub struct QueryKernel<'a> {
    src: WordSource<'a>,
    filter: &'a DeviceFilter,
    results: &'a QueryResults,
    num_hashes: usize,
}

impl<'a> QueryKernel<'a> {
    pub fn new(
        corpus: &'a Corpus,
        filter: &'a DeviceFilter,
        results: &'a QueryResults,
        num_hashes: usize,
    ) -> Result<Self> {
        if filter.is_empty() {
            return Err(BloomError::Config("filter size must be non-zero".into()));
        }
        if results.len() != corpus.len() {
            return Err(BloomError::Config(format!(
                "{} result slots for {} words",
                results.len(),
                corpus.len()
            )));
        }
        Ok(Self { src: WordSource::new(corpus), filter, results, num_hashes })
    }
}

impl WorkGroupKernel for QueryKernel<'_> {
    fn stage(&self, item: &WorkItem, scratch: &mut [u8]) {
        self.src.stage(item, scratch);
    }

    fn compute(&self, item: &WorkItem, scratch: &[u8]) {
        let Some(start) = self.src.local_start(item) else { return };
        let Some(idx) = hash::probe_index(scratch, start, self.filter.len(), self.num_hashes, item.row) else {
            return;
        };
        if !self.filter.is_set(idx) {
            self.results.clear(item.global_col());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_WORD_BYTES;
    use crate::device::{Device, DeviceLimits, HostDevice};
    use crate::grid::{LaunchConfig, Range2};

    fn device() -> HostDevice {
        HostDevice::new(DeviceLimits::default()).unwrap()
    }

    #[test]
    fn single_word_has_no_false_negative() {
        let corpus = Corpus::from_words(&["abc"]).unwrap();
        let filter = DeviceFilter::new(1024);
        let dev = device();
        let launch = LaunchConfig::for_words(corpus.len(), 4, 1024).unwrap();
        dev.dispatch(&launch, &InsertKernel::new(&corpus, &filter, 4).unwrap()).unwrap();

        let results = QueryResults::new(corpus.len());
        dev.dispatch(&launch, &QueryKernel::new(&corpus, &filter, &results, 4).unwrap()).unwrap();
        assert_eq!(results.snapshot(), vec![1]);
    }

    #[test]
    fn device_insert_matches_host_insert() {
        let corpus = Corpus::from_words(&["alpha", "beta", "gamma", "delta", "epsilon"]).unwrap();
        let on_device = DeviceFilter::new(257);
        let launch = LaunchConfig::for_words(corpus.len(), 3, 1024).unwrap();
        device().dispatch(&launch, &InsertKernel::new(&corpus, &on_device, 3).unwrap()).unwrap();

        let on_host = DeviceFilter::new(257);
        for &p in corpus.positions() {
            on_host.insert(corpus.bytes(), p, 3);
        }
        assert_eq!(on_device.snapshot(), on_host.snapshot());
    }

    #[test]
    fn staged_scratch_reproduces_global_hashes() {
        let corpus = Corpus::from_words(&["first", "second", "third", "fourth", "fifth"]).unwrap();
        // Two words per block; the second group starts at "third".
        let block = Range2::new(2, 2);
        let src = WordSource::new(&corpus);
        let mut scratch = vec![0u8; block.cols * MAX_WORD_BYTES];
        for col in 0..block.cols {
            src.stage(&WorkItem { group: 1, row: 0, col, block }, &mut scratch);
        }
        let p0 = corpus.positions()[2];
        for col in 0..block.cols {
            let item = WorkItem { group: 1, row: 1, col, block };
            let local = src.local_start(&item).unwrap();
            let global = corpus.positions()[item.global_col()];
            assert_eq!(local, global - p0);
            assert_eq!(hash::djb2(&scratch, local), hash::djb2(corpus.bytes(), global));
            assert_eq!(hash::sdbm(&scratch, local), hash::sdbm(corpus.bytes(), global));
        }
    }

    #[test]
    fn only_row_zero_stages() {
        let corpus = Corpus::from_words(&["zz"]).unwrap();
        let src = WordSource::new(&corpus);
        let block = Range2::new(2, 1);
        let mut scratch = vec![0u8; MAX_WORD_BYTES];
        src.stage(&WorkItem { group: 0, row: 1, col: 0, block }, &mut scratch);
        assert!(scratch.iter().all(|&b| b == 0));
        src.stage(&WorkItem { group: 0, row: 0, col: 0, block }, &mut scratch);
        assert_eq!(&scratch[..3], b"zz,");
    }

    #[test]
    fn query_against_empty_filter_clears_everything() {
        let corpus = Corpus::from_words(&["one", "two", "three"]).unwrap();
        let filter = DeviceFilter::new(64);
        let results = QueryResults::new(corpus.len());
        let launch = LaunchConfig::for_words(corpus.len(), 2, 1024).unwrap();
        device().dispatch(&launch, &QueryKernel::new(&corpus, &filter, &results, 2).unwrap()).unwrap();
        assert_eq!(results.tally(), (0, 3));
    }

    #[test]
    fn results_never_come_back() {
        let results = QueryResults::new(2);
        results.clear(0);
        results.clear(0);
        assert_eq!(results.snapshot(), vec![0, 1]);
        assert!(!results.is_present(0));
    }

    #[test]
    fn mismatched_result_length_is_rejected() {
        let corpus = Corpus::from_words(&["one", "two"]).unwrap();
        let filter = DeviceFilter::new(64);
        let results = QueryResults::new(1);
        assert!(QueryKernel::new(&corpus, &filter, &results, 2).is_err());
        assert!(InsertKernel::new(&corpus, &DeviceFilter::new(0), 2).is_err());
    }
}

//! Byte-per-bit Bloom filter shared by every work item of a dispatch.
use crate::errors::Result;
use crate::hash;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};

/// One flag byte per filter bit. Flags only ever go from 0 to 1.
///
/// Stores are relaxed: concurrent writers always store the same constant.
#[derive(Debug)]
pub struct DeviceFilter {
    flags: Vec<AtomicU8>,
}

impl DeviceFilter {
    pub fn new(size: usize) -> Self {
        Self { flags: (0..size).map(|_| AtomicU8::new(0)).collect() }
    }

    pub fn len(&self) -> usize { self.flags.len() }
    pub fn is_empty(&self) -> bool { self.flags.is_empty() }

    #[inline]
    pub fn set(&self, idx: usize) {
        self.flags[idx].store(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_set(&self, idx: usize) -> bool {
        self.flags[idx].load(Ordering::Relaxed) != 0
    }

    /// Host-side insertion of a single comma-terminated word.
    pub fn insert(&self, buf: &[u8], start: usize, num_hashes: usize) {
        if self.is_empty() { return; }
        for p in hash::probes(buf, start, self.len(), num_hashes) {
            self.set(p);
        }
    }

    /// Host-side membership test for a single comma-terminated word.
    pub fn contains(&self, buf: &[u8], start: usize, num_hashes: usize) -> bool {
        if self.is_empty() { return true; }
        hash::probes(buf, start, self.len(), num_hashes)
            .into_iter()
            .all(|p| self.is_set(p))
    }

    pub fn count_set(&self) -> usize {
        self.flags.iter().filter(|f| f.load(Ordering::Relaxed) != 0).count()
    }

    pub fn snapshot(&self) -> Vec<u8> {
        self.flags.iter().map(|f| f.load(Ordering::Relaxed)).collect()
    }

    /// blake3 of the flag bytes, hex encoded.
    pub fn digest(&self) -> String {
        blake3::hash(&self.snapshot()).to_hex().to_string()
    }

    /// `'1'`/`'0'` per flag, in index order.
    pub fn to_ascii(&self) -> Vec<u8> {
        self.flags
            .iter()
            .map(|f| if f.load(Ordering::Relaxed) != 0 { b'1' } else { b'0' })
            .collect()
    }

    pub fn write_ascii(&self, path: &Path) -> Result<()> {
        let mut f = fs::File::create(path)?;
        f.write_all(&self.to_ascii())?;
        f.sync_all()?;
        Ok(())
    }
}

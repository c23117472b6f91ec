//! String hashes and the double-hash probe family.
//!
//! Both hashes walk bytes from `start` up to, but excluding, the first
//! [`WORD_DELIMITER`]. Arithmetic is wrapping on 64-bit unsigned integers.
use crate::consts::{DJB2_SEED, WORD_DELIMITER};

#[inline]
fn word_bytes(buf: &[u8], start: usize) -> impl Iterator<Item = u8> + '_ {
    buf[start..].iter().copied().take_while(|&b| b != WORD_DELIMITER)
}

pub fn djb2(buf: &[u8], start: usize) -> u64 {
    word_bytes(buf, start).fold(DJB2_SEED, |h, c| {
        (h << 5).wrapping_add(h).wrapping_add(c as u64)
    })
}

pub fn sdbm(buf: &[u8], start: usize) -> u64 {
    word_bytes(buf, start).fold(0u64, |h, c| {
        (c as u64)
            .wrapping_add(h << 6)
            .wrapping_add(h << 16)
            .wrapping_sub(h)
    })
}

/// Both base hashes reduced modulo the filter size `x`.
#[inline]
pub fn hash_pair(buf: &[u8], start: usize, x: usize) -> (u64, u64) {
    let m = x as u64;
    (djb2(buf, start) % m, sdbm(buf, start) % m)
}

/// Filter index probed by hash row `fy`: `(h1 + fy*fy*h2 mod x) mod x`.
///
/// `None` when `fy >= y`. `x` must be non-zero.
pub fn probe_index(buf: &[u8], start: usize, x: usize, y: usize, fy: usize) -> Option<usize> {
    let (first, second) = hash_pair(buf, start, x);
    if fy >= y {
        return None;
    }
    Some(combine(first, second, fy, x))
}

#[inline]
pub(crate) fn combine(first: u64, second: u64, fy: usize, x: usize) -> usize {
    let m = x as u64;
    let k = fy as u64;
    let second = second.wrapping_mul(k).wrapping_mul(k) % m;
    ((first + second) % m) as usize
}

/// All `y` probes for the word at `start`.
pub fn probes(buf: &[u8], start: usize, x: usize, y: usize) -> Vec<usize> {
    let (first, second) = hash_pair(buf, start, x);
    (0..y).map(|fy| combine(first, second, fy, x)).collect()
}

//! Word-packed boolean planes backing the Visible and Revealed state.
//!
//! One [`BitPlane`] holds the bits for every faction of one plane kind,
//! flattened as `faction_slot * width * height + y * width + x`.

/// Fixed-size bitset packed into `u64` words.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BitPlane {
    bits: usize,
    words: Vec<u64>,
}

impl BitPlane {
    pub fn new(bits: usize) -> Self {
        Self {
            bits,
            words: vec![0; bits.div_ceil(64)],
        }
    }

    /// Rebuild a plane from its raw words, as captured by a snapshot.
    /// Returns `None` when the word count does not match `bits`.
    pub fn from_words(bits: usize, words: Vec<u64>) -> Option<Self> {
        if words.len() != bits.div_ceil(64) {
            return None;
        }
        Some(Self { bits, words })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits
    }

    #[inline]
    pub fn get(&self, bit: usize) -> bool {
        debug_assert!(bit < self.bits);
        self.words[bit / 64] & (1u64 << (bit % 64)) != 0
    }

    #[inline]
    pub fn set(&mut self, bit: usize) {
        debug_assert!(bit < self.bits);
        self.words[bit / 64] |= 1u64 << (bit % 64);
    }

    pub fn clear_all(&mut self) {
        self.words.fill(0);
    }

    /// Population count over `[start, start + len)`. The range may start and
    /// end mid-word; faction sub-planes are not word-aligned in general.
    pub fn count_ones_range(&self, start: usize, len: usize) -> usize {
        debug_assert!(start + len <= self.bits);
        if len == 0 {
            return 0;
        }
        let end = start + len;
        let first_word = start / 64;
        let last_word = (end - 1) / 64;

        if first_word == last_word {
            let mask = mask_from(start % 64) & mask_until(end - last_word * 64);
            return (self.words[first_word] & mask).count_ones() as usize;
        }

        let mut total = (self.words[first_word] & mask_from(start % 64)).count_ones() as usize;
        for word in &self.words[first_word + 1..last_word] {
            total += word.count_ones() as usize;
        }
        total += (self.words[last_word] & mask_until(end - last_word * 64)).count_ones() as usize;
        total
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }
}

/// Mask selecting bit positions `>= offset` within a word.
#[inline]
fn mask_from(offset: usize) -> u64 {
    u64::MAX << offset
}

/// Mask selecting bit positions `< end` within a word, `1 <= end <= 64`.
#[inline]
fn mask_until(end: usize) -> u64 {
    debug_assert!(end >= 1 && end <= 64);
    u64::MAX >> (64 - end)
}

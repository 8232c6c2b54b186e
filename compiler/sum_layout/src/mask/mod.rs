//! Fixed-width bit set describing spare bit positions.
//!
//! A [`SpareBitsMask`] covers the bit positions of a payload
//! representation. A set bit means the position never carries live case
//! data, so it can hold part of the tag instead.
//!
//! Bit `i` lives in word `i / 64` at position `i % 64`. Bits at or above
//! the mask's width are always clear. Masks up to 128 bits wide (every
//! loadable payload) are stored inline.

use std::fmt;

use smallvec::SmallVec;

const WORD_BITS: u32 = 64;

/// Fixed-width bit vector of spare payload positions.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct SpareBitsMask {
    width: u32,
    words: SmallVec<[u64; 2]>,
}

/// One byte of a mask that contains at least one spare bit, together with
/// the tag bits that land in it. Produced by [`SpareBitsMask::scatter_bytes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpareByte {
    /// Byte index from the start of the payload (little-endian bit order).
    pub index: u32,
    /// Spare positions within this byte.
    pub mask: u8,
    /// Tag bits placed at those positions. Always a subset of `mask`.
    pub value: u8,
}

impl SpareBitsMask {
    /// A mask of `width` bits with every position clear.
    pub fn new(width: u32) -> Self {
        let len = width.div_ceil(WORD_BITS) as usize;
        Self {
            width,
            words: SmallVec::from_elem(0, len),
        }
    }

    /// A mask of `width` bits with every position set.
    pub fn all_set(width: u32) -> Self {
        let mut mask = Self::new(width);
        for word in &mut mask.words {
            *word = u64::MAX;
        }
        mask.clear_tail();
        mask
    }

    /// A mask of `width` bits (at most 128) taken from the low bits of `value`.
    pub fn from_u128(width: u32, value: u128) -> Self {
        debug_assert!(width <= 128, "from_u128 on a {width}-bit mask");
        let mut mask = Self::new(width);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "splitting a u128 into its two u64 halves"
        )]
        let halves = [value as u64, (value >> 64) as u64];
        for (word, half) in mask.words.iter_mut().zip(halves) {
            *word = half;
        }
        mask.clear_tail();
        mask
    }

    /// Number of bit positions covered by the mask.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of bytes needed to hold `width` bits.
    #[inline]
    pub fn byte_len(&self) -> u32 {
        self.width.div_ceil(8)
    }

    /// Number of set positions.
    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// True if no position is set.
    pub fn is_clear(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Test a single position. Positions beyond the width read as clear.
    #[inline]
    pub fn test(&self, bit: u32) -> bool {
        if bit >= self.width {
            return false;
        }
        let word = self.words[(bit / WORD_BITS) as usize];
        word & (1 << (bit % WORD_BITS)) != 0
    }

    /// Set a single position.
    pub fn set(&mut self, bit: u32) {
        debug_assert!(bit < self.width, "bit {bit} out of range for {}-bit mask", self.width);
        if bit < self.width {
            self.words[(bit / WORD_BITS) as usize] |= 1 << (bit % WORD_BITS);
        }
    }

    /// Clear a single position.
    pub fn clear(&mut self, bit: u32) {
        if bit < self.width {
            self.words[(bit / WORD_BITS) as usize] &= !(1 << (bit % WORD_BITS));
        }
    }

    /// Clear every position below `bit`, a whole word at a time.
    pub fn clear_below(&mut self, bit: u32) {
        let bit = bit.min(self.width);
        let full = (bit / WORD_BITS) as usize;
        for word in self.words.iter_mut().take(full) {
            *word = 0;
        }
        let rem = bit % WORD_BITS;
        if rem != 0 {
            if let Some(word) = self.words.get_mut(full) {
                *word &= !((1u64 << rem) - 1);
            }
        }
    }

    /// Positions set in both masks. The masks must have the same width.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        debug_assert_eq!(self.width, other.width, "intersecting masks of different widths");
        let mut out = self.clone();
        for (word, theirs) in out.words.iter_mut().zip(other.words.iter()) {
            *word &= *theirs;
        }
        out
    }

    /// Copy of this mask at a new width. Positions added by growing take
    /// the value `fill`; positions removed by shrinking are dropped.
    #[must_use]
    pub fn resized(&self, width: u32, fill: bool) -> Self {
        let mut out = if fill {
            Self::all_set(width)
        } else {
            Self::new(width)
        };
        for bit in 0..self.width.min(width) {
            if !self.test(bit) {
                out.clear(bit);
            } else if !fill {
                out.set(bit);
            }
        }
        out
    }

    /// Set positions in ascending order.
    pub fn iter_set(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.width).filter(move |&bit| self.test(bit))
    }

    /// The mask as an integer, if it is at most 128 bits wide.
    pub fn to_u128(&self) -> Option<u128> {
        if self.width > 128 {
            return None;
        }
        let lo = u128::from(self.words.first().copied().unwrap_or(0));
        let hi = u128::from(self.words.get(1).copied().unwrap_or(0));
        Some(lo | (hi << 64))
    }

    /// The complement within the mask's width, as an integer. Used to
    /// strip spare positions from a loaded payload.
    pub fn occupied_u128(&self) -> Option<u128> {
        self.to_u128().map(|spare| !spare & width_mask(self.width))
    }

    /// Bits `[8 * index, 8 * index + 8)` of the mask.
    pub fn byte(&self, index: u32) -> u8 {
        let mut byte = 0u8;
        for bit in 0..8 {
            if self.test(index * 8 + bit) {
                byte |= 1 << bit;
            }
        }
        byte
    }

    /// Scatter the low bits of `spare` into the set positions of this mask
    /// (lowest set position first) and group the result by byte.
    ///
    /// Only bytes containing at least one spare position are returned, in
    /// ascending byte order. This is the byte-granular form of
    /// [`interleave`](crate::interleave::interleave) with a zero occupied
    /// value, and works for masks of any width.
    pub fn scatter_bytes(&self, spare: u64) -> SmallVec<[SpareByte; 8]> {
        let mut out: SmallVec<[SpareByte; 8]> = SmallVec::new();
        for (consumed, bit) in self.iter_set().enumerate() {
            let index = bit / 8;
            let pos = 1u8 << (bit % 8);
            let value_bit = consumed < 64 && (spare >> consumed) & 1 == 1;
            match out.last_mut() {
                Some(last) if last.index == index => {
                    last.mask |= pos;
                    if value_bit {
                        last.value |= pos;
                    }
                }
                _ => out.push(SpareByte {
                    index,
                    mask: pos,
                    value: if value_bit { pos } else { 0 },
                }),
            }
        }
        out
    }

    fn clear_tail(&mut self) {
        let rem = self.width % WORD_BITS;
        if rem != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << rem) - 1;
            }
        }
    }
}

/// All-ones integer of the given width (at most 128).
#[inline]
pub fn width_mask(width: u32) -> u128 {
    if width >= 128 {
        u128::MAX
    } else {
        (1u128 << width) - 1
    }
}

impl fmt::Debug for SpareBitsMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpareBitsMask({self})")
    }
}

/// Prints `<width>'h<hex>`, most significant word first.
impl fmt::Display for SpareBitsMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'h", self.width)?;
        if self.words.is_empty() {
            return write!(f, "0");
        }
        let mut words = self.words.iter().rev();
        if let Some(top) = words.next() {
            write!(f, "{top:x}")?;
        }
        for word in words {
            write!(f, "_{word:016x}")?;
        }
        Ok(())
    }
}

//! Spare-bit interleaving.
//!
//! Combines an "occupied" value (live payload bits) with a "spare" value
//! (usually a discriminant) by taking, at each bit position, either the
//! next unconsumed bit of `spare` (where the mask is set) or the bit of
//! `occupied` at the same position (where the mask is clear).
//!
//! `spare` is packed contiguously: its bit 0 goes to the lowest set mask
//! position, its bit 1 to the next set position, and so on. It is not
//! indexed by absolute position.
//!
//! ```text
//! mask     = 0b1010_0100
//! occupied = 0b0101_1011
//! spare    = 0b101
//! combined = 0b1101_1111    (positions 2, 5, 7 take spare bits 0, 1, 2)
//! ```

use crate::mask::{width_mask, SpareBitsMask};

/// Interleave `occupied` and `spare` under `mask`.
///
/// Works on masks up to 128 bits wide; the result is confined to the
/// mask's width. Spare bits beyond the number of set positions are
/// dropped.
pub fn interleave(mask: &SpareBitsMask, occupied: u128, spare: u64) -> u128 {
    debug_assert!(
        mask.width() <= 128,
        "interleave on a {}-bit mask",
        mask.width()
    );
    let mut combined = occupied;
    for (consumed, bit) in mask.iter_set().enumerate() {
        if bit >= 128 {
            break;
        }
        let pos = 1u128 << bit;
        let spare_bit = consumed < 64 && (spare >> consumed) & 1 == 1;
        if spare_bit {
            combined |= pos;
        } else {
            combined &= !pos;
        }
    }
    combined & width_mask(mask.width())
}

/// Inverse of [`interleave`]: split `combined` into its occupied bits
/// (spare positions zeroed) and its spare bits (packed low-to-high).
pub fn deinterleave(mask: &SpareBitsMask, combined: u128) -> (u128, u64) {
    let mut spare = 0u64;
    let mut occupied = combined & width_mask(mask.width());
    for (consumed, bit) in mask.iter_set().enumerate() {
        if bit >= 128 {
            break;
        }
        let pos = 1u128 << bit;
        if combined & pos != 0 && consumed < 64 {
            spare |= 1 << consumed;
        }
        occupied &= !pos;
    }
    (occupied, spare)
}

#[cfg(test)]
mod tests;

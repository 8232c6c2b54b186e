//! Payload packing and unpacking.
//!
//! A union payload is a single integer wide enough for the largest case.
//! [`PayloadPacker`] collects the scalars of one case into that integer,
//! low bits first; [`PayloadUnpacker`] takes them back out. Both are
//! transient: one instance per injection or projection.

use sum_ir::{IrBuilder, ValueId};

use crate::error::{Result, UnionCodegenError};

/// Accumulates scalars into a `bit_size`-wide payload integer.
///
/// Every placement must fit: `offset + width <= bit_size`. Values are
/// zero-extended to the payload width, shifted into position and OR-ed
/// into the accumulator.
#[derive(Debug)]
pub struct PayloadPacker {
    bit_size: u32,
    packed_bits: u32,
    packed: Option<ValueId>,
}

impl PayloadPacker {
    pub fn new(bit_size: u32) -> Self {
        Self {
            bit_size,
            packed_bits: 0,
            packed: None,
        }
    }

    /// Declared payload width.
    #[inline]
    pub fn bit_size(&self) -> u32 {
        self.bit_size
    }

    /// Bits consumed by sequential [`add`](Self::add) calls so far.
    #[inline]
    pub fn cursor(&self) -> u32 {
        self.packed_bits
    }

    /// Append `v` immediately after the previously added value (or at
    /// offset zero for the first) and advance the cursor by its width.
    pub fn add(&mut self, ir: &mut IrBuilder, v: ValueId) -> Result<()> {
        let width = int_width(ir, v)?;
        self.add_at_offset(ir, v, self.packed_bits)?;
        self.packed_bits += width;
        Ok(())
    }

    /// Place `v` at an explicit bit offset. The cursor does not move.
    pub fn add_at_offset(&mut self, ir: &mut IrBuilder, v: ValueId, offset: u32) -> Result<()> {
        let width = int_width(ir, v)?;
        self.check_fits(offset, width)?;
        let wide = ir.zext(v, self.bit_size);
        let placed = if offset == 0 {
            wide
        } else {
            let amount = ir.const_int(self.bit_size, u128::from(offset));
            ir.shl(wide, amount)
        };
        self.merge(ir, placed);
        Ok(())
    }

    /// Merge a partially packed sub-payload (packed from bit zero) by
    /// shifting it up to the cursor. The cursor does not move.
    pub fn combine(&mut self, ir: &mut IrBuilder, v: ValueId) -> Result<()> {
        self.add_at_offset(ir, v, self.packed_bits)
    }

    /// The packed payload, zero-padded to the declared width. `None` for a
    /// zero-width payload.
    pub fn get(self, ir: &mut IrBuilder) -> Option<ValueId> {
        if self.bit_size == 0 {
            return None;
        }
        Some(
            self.packed
                .unwrap_or_else(|| Self::get_empty(ir, self.bit_size)),
        )
    }

    /// An all-zero payload of `bit_size` bits, for data-less cases.
    pub fn get_empty(ir: &mut IrBuilder, bit_size: u32) -> ValueId {
        ir.const_zero(bit_size)
    }

    fn check_fits(&self, offset: u32, width: u32) -> Result<()> {
        if width == 0 || offset.saturating_add(width) > self.bit_size {
            return Err(UnionCodegenError::PayloadOverflow {
                offset,
                width,
                capacity: self.bit_size,
            });
        }
        Ok(())
    }

    fn merge(&mut self, ir: &mut IrBuilder, v: ValueId) {
        self.packed = Some(match self.packed {
            None => v,
            Some(acc) => ir.or(acc, v),
        });
    }
}

/// Extracts scalars from a packed payload integer.
#[derive(Debug)]
pub struct PayloadUnpacker {
    packed: ValueId,
    packed_width: u32,
    unpacked_bits: u32,
}

impl PayloadUnpacker {
    /// Start unpacking `packed`, which must be an integer.
    pub fn new(ir: &IrBuilder, packed: ValueId) -> Result<Self> {
        let packed_width = int_width(ir, packed)?;
        Ok(Self {
            packed,
            packed_width,
            unpacked_bits: 0,
        })
    }

    /// Bits consumed by sequential [`claim`](Self::claim) calls so far.
    #[inline]
    pub fn cursor(&self) -> u32 {
        self.unpacked_bits
    }

    /// Extract the next `bits`-wide value after the previously claimed one
    /// and advance the cursor.
    pub fn claim(&mut self, ir: &mut IrBuilder, bits: u32) -> Result<ValueId> {
        let v = self.claim_at_offset(ir, bits, self.unpacked_bits)?;
        self.unpacked_bits += bits;
        Ok(v)
    }

    /// Extract a `bits`-wide value at an explicit offset. The cursor does
    /// not move.
    pub fn claim_at_offset(&self, ir: &mut IrBuilder, bits: u32, offset: u32) -> Result<ValueId> {
        if bits == 0 {
            return Err(UnionCodegenError::ZeroWidth);
        }
        if offset.saturating_add(bits) > self.packed_width {
            return Err(UnionCodegenError::PayloadOverflow {
                offset,
                width: bits,
                capacity: self.packed_width,
            });
        }
        let shifted = if offset == 0 {
            self.packed
        } else {
            let amount = ir.const_int(self.packed_width, u128::from(offset));
            ir.lshr(self.packed, amount)
        };
        Ok(ir.trunc(shifted, bits))
    }
}

/// Integer width of `v`, or [`UnionCodegenError::NotInteger`].
pub(crate) fn int_width(ir: &IrBuilder, v: ValueId) -> Result<u32> {
    ir.int_width(v)
        .ok_or(UnionCodegenError::NotInteger { value: v })
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]

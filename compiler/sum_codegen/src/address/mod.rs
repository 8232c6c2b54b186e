//! Memory access to unions through an address.
//!
//! Every case's payload overlaps at [`MemoryLayout::payload_offset`]
//! (immediately after the dedicated tag field, if any, aligned to the
//! payload). Initializing a union in place is two steps: store the case's
//! associated value through [`project_address_for_store`], then write the
//! discriminant with [`store_tag`]. For spare-bit layouts the tag write
//! only touches the bytes that contain spare positions, preserving the
//! payload bits around them, so the payload must be written first.
//!
//! These are the only operations available on address-only unions.
//! [`load_union`] and [`store_union`] move whole loadable unions between
//! memory and their register explosion.
//!
//! [`MemoryLayout::payload_offset`]: sum_layout::MemoryLayout::payload_offset

use sum_ir::{IrBuilder, IrType, ValueId};
use sum_layout::{CaseId, RepresentationKind, UnionLayout};
use tracing::trace;

use crate::error::{case_of, check_explosion, require_loadable, Result, UnionCodegenError};
use crate::payload::{PayloadPacker, PayloadUnpacker};
use crate::Explosion;

/// Address at which `case`'s associated value should be stored.
///
/// The same for every case of a union; the case is validated but does not
/// move the slot.
pub fn project_address_for_store(
    ir: &mut IrBuilder,
    layout: &UnionLayout,
    address: ValueId,
    case: CaseId,
) -> Result<ValueId> {
    require_address(ir, address)?;
    case_of(layout, case)?;
    Ok(payload_address(ir, layout, address))
}

/// Record `case` as the case held by the union at `address`.
///
/// - single case: nothing to write
/// - dedicated tag: a plain store of the discriminant into the tag field
/// - spare bits: per spare-carrying byte, load, clear the spare positions,
///   OR in the tag bits, store back
pub fn store_tag(
    ir: &mut IrBuilder,
    layout: &UnionLayout,
    address: ValueId,
    case: CaseId,
) -> Result<()> {
    require_address(ir, address)?;
    let desc = case_of(layout, case)?;
    let discriminant = layout.discriminant(case);
    trace!(union = layout.name(), case = %desc.name, kind = %layout.kind(), "store tag");

    match layout.kind() {
        RepresentationKind::SingleCase => {}
        RepresentationKind::TagPlusPayload => {
            if let Some(field) = layout.memory().tag {
                let tag = ir.const_int(field.bytes * 8, u128::from(discriminant));
                let slot = ir.ptr_offset(address, u64::from(field.offset));
                ir.store(slot, tag);
            }
        }
        RepresentationKind::SpareBits => {
            let base = layout.memory().payload_offset;
            for byte in layout.spare_bits().scatter_bytes(discriminant) {
                let slot = ir.ptr_offset(address, base + u64::from(byte.index));
                let old = ir.load(slot, 8);
                let keep = ir.const_int(8, u128::from(!byte.mask));
                let mut new = ir.and(old, keep);
                if byte.value != 0 {
                    let bits = ir.const_int(8, u128::from(byte.value));
                    new = ir.or(new, bits);
                }
                ir.store(slot, new);
            }
        }
    }
    Ok(())
}

/// Load a loadable union from `address` into its register explosion.
pub fn load_union(
    ir: &mut IrBuilder,
    layout: &UnionLayout,
    address: ValueId,
) -> Result<Explosion> {
    require_loadable(layout, "load")?;
    require_address(ir, address)?;

    let mut out = Explosion::new();
    match layout.kind() {
        RepresentationKind::SingleCase => {
            let fields = layout.cases().first().map(|c| c.repr.fields()).unwrap_or_default();
            if fields.is_empty() {
                return Ok(out);
            }
            let packed = load_payload(ir, layout, address);
            let mut unpacker = PayloadUnpacker::new(ir, packed)?;
            for field in fields {
                out.push(unpacker.claim(ir, field.bits)?);
            }
        }
        RepresentationKind::TagPlusPayload => {
            if let Some(field) = layout.memory().tag {
                let slot = ir.ptr_offset(address, u64::from(field.offset));
                let raw = ir.load(slot, field.bytes * 8);
                out.push(ir.trunc(raw, layout.tag_bits()));
            }
            if layout.payload_bits() > 0 {
                out.push(load_payload(ir, layout, address));
            }
        }
        RepresentationKind::SpareBits => out.push(load_payload(ir, layout, address)),
    }
    Ok(out)
}

/// Store a loadable union's register explosion to `address`.
pub fn store_union(
    ir: &mut IrBuilder,
    layout: &UnionLayout,
    address: ValueId,
    value: &[ValueId],
) -> Result<()> {
    require_loadable(layout, "store")?;
    require_address(ir, address)?;
    check_explosion(ir, layout, value)?;

    match layout.kind() {
        RepresentationKind::SingleCase => {
            let mut packer = PayloadPacker::new(layout.payload_bits());
            for &v in value {
                packer.add(ir, v)?;
            }
            if let Some(packed) = packer.get(ir) {
                let slot = payload_address(ir, layout, address);
                ir.store(slot, packed);
            }
        }
        RepresentationKind::TagPlusPayload => {
            let mut rest = value;
            if let (Some(field), Some((&tag, tail))) = (layout.memory().tag, value.split_first()) {
                let slot = ir.ptr_offset(address, u64::from(field.offset));
                let wide = ir.zext(tag, field.bytes * 8);
                ir.store(slot, wide);
                rest = tail;
            }
            if let Some(&payload) = rest.first() {
                let slot = payload_address(ir, layout, address);
                ir.store(slot, payload);
            }
        }
        RepresentationKind::SpareBits => {
            if let Some(&combined) = value.first() {
                let slot = payload_address(ir, layout, address);
                ir.store(slot, combined);
            }
        }
    }
    Ok(())
}

fn payload_address(ir: &mut IrBuilder, layout: &UnionLayout, address: ValueId) -> ValueId {
    ir.ptr_offset(address, layout.memory().payload_offset)
}

fn load_payload(ir: &mut IrBuilder, layout: &UnionLayout, address: ValueId) -> ValueId {
    let slot = payload_address(ir, layout, address);
    ir.load(slot, layout.payload_bits())
}

fn require_address(ir: &IrBuilder, address: ValueId) -> Result<()> {
    if ir.value_type(address) == Some(IrType::Ptr) {
        Ok(())
    } else {
        Err(UnionCodegenError::NotAddress { value: address })
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
mod tests;

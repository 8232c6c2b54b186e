//! Case injection: build a union value from a case and its data.

use sum_ir::{IrBuilder, ValueId};
use sum_layout::{CaseDescriptor, CaseId, RepresentationKind, UnionLayout};
use tracing::trace;

use crate::error::{case_of, require_loadable, Result, UnionCodegenError};
use crate::payload::PayloadPacker;
use crate::Explosion;

/// Build the register representation of `case` holding `data`.
///
/// `data` is the case's associated value as scalars, one per declared
/// field and in declaration order. The result follows
/// [`UnionLayout::explosion_widths`]:
///
/// - single case: `data` unchanged
/// - dedicated tag: `[tag, payload]`, payload omitted when zero-width
/// - spare bits: `[payload]` with the data's spare positions cleared and
///   the discriminant scattered into them
pub fn inject_case(
    ir: &mut IrBuilder,
    layout: &UnionLayout,
    case: CaseId,
    data: &[ValueId],
) -> Result<Explosion> {
    require_loadable(layout, "inject")?;
    let desc = case_of(layout, case)?;
    check_data(ir, layout, desc, data)?;
    trace!(union = layout.name(), case = %desc.name, kind = %layout.kind(), "inject");

    match layout.kind() {
        RepresentationKind::SingleCase => Ok(Explosion::from_slice(data)),
        RepresentationKind::TagPlusPayload => {
            let mut out = Explosion::new();
            if layout.tag_bits() > 0 {
                out.push(ir.const_int(layout.tag_bits(), u128::from(layout.discriminant(case))));
            }
            if let Some(payload) = pack(ir, layout.payload_bits(), data)? {
                out.push(payload);
            }
            Ok(out)
        }
        RepresentationKind::SpareBits => {
            let bits = layout.payload_bits();
            let pattern = layout.spare_tag_pattern(case);
            let combined = if data.is_empty() {
                ir.const_int(bits, pattern)
            } else {
                let packed = pack(ir, bits, data)?.unwrap_or_else(|| ir.const_zero(bits));
                let keep = layout.spare_bits().occupied_u128().unwrap_or(u128::MAX);
                let keep = ir.const_int(bits, keep);
                let occupied = ir.and(packed, keep);
                if pattern == 0 {
                    occupied
                } else {
                    let tag = ir.const_int(bits, pattern);
                    ir.or(occupied, tag)
                }
            };
            Ok(Explosion::from_slice(&[combined]))
        }
    }
}

/// Pack `data` low-to-high into a `bits`-wide payload.
fn pack(ir: &mut IrBuilder, bits: u32, data: &[ValueId]) -> Result<Option<ValueId>> {
    let mut packer = PayloadPacker::new(bits);
    for &v in data {
        packer.add(ir, v)?;
    }
    Ok(packer.get(ir))
}

/// Check arity and widths of `data` against the case's declared fields.
fn check_data(
    ir: &IrBuilder,
    layout: &UnionLayout,
    desc: &CaseDescriptor,
    data: &[ValueId],
) -> Result<()> {
    let fields = desc.repr.fields();
    if fields.len() != data.len() {
        return Err(UnionCodegenError::ArityMismatch {
            union: layout.name().to_owned(),
            case: desc.name.clone(),
            expected: fields.len(),
            found: data.len(),
        });
    }
    for (index, (field, &v)) in fields.iter().zip(data).enumerate() {
        let found = ir.int_width(v);
        if found != Some(field.bits) {
            return Err(UnionCodegenError::WidthMismatch {
                case: desc.name.clone(),
                index,
                expected: field.bits,
                found,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]

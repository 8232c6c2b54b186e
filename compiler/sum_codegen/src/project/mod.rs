//! Unchecked case projection.
//!
//! The caller must already know which case the union holds (typically
//! because control is inside that case's dispatch block). Nothing here
//! re-validates the tag.

use sum_ir::{IrBuilder, ValueId};
use sum_layout::{CaseId, RepresentationKind, UnionLayout};
use tracing::trace;

use crate::error::{case_of, check_explosion, require_loadable, Result};
use crate::payload::PayloadUnpacker;
use crate::Explosion;

/// Recover the associated scalars of `case` from a union value.
///
/// `value` must match [`UnionLayout::explosion_widths`]. For spare-bit
/// layouts the spare positions are masked off before unpacking; for a
/// dedicated tag the tag scalar is ignored. Data-less cases yield an empty
/// explosion.
pub fn project_case(
    ir: &mut IrBuilder,
    layout: &UnionLayout,
    value: &[ValueId],
    case: CaseId,
) -> Result<Explosion> {
    require_loadable(layout, "project")?;
    let desc = case_of(layout, case)?;
    check_explosion(ir, layout, value)?;
    trace!(union = layout.name(), case = %desc.name, kind = %layout.kind(), "project");

    let fields = desc.repr.fields();
    if fields.is_empty() {
        return Ok(Explosion::new());
    }

    if layout.kind() == RepresentationKind::SingleCase {
        return Ok(Explosion::from_slice(value));
    }
    // A case with fields forces a non-empty payload, which is always the
    // last scalar.
    let Some(&combined) = value.last() else {
        return Ok(Explosion::new());
    };
    let spare = layout.spare_bits();
    let payload = match spare.occupied_u128() {
        Some(occupied) if layout.kind() == RepresentationKind::SpareBits && !spare.is_clear() => {
            let mask = ir.const_int(layout.payload_bits(), occupied);
            ir.and(combined, mask)
        }
        _ => combined,
    };

    let mut unpacker = PayloadUnpacker::new(ir, payload)?;
    fields
        .iter()
        .map(|field| unpacker.claim(ir, field.bits))
        .collect()
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
mod tests;

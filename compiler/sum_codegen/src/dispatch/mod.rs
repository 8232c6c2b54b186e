//! Case dispatch: branch on which case a union value holds.
//!
//! Emits exactly one terminator into the current block:
//!
//! | Layout | Scrutinee | Terminator |
//! |--------|-----------|------------|
//! | single case | none | `br` to the sole case's block, else default |
//! | dedicated tag | the tag scalar | `switch` over discriminants |
//! | spare bits | `payload & spare_mask` | `switch` over tag patterns |
//! | no cases | none | `br` to default |

use sum_ir::{BlockId, IrBuilder, ValueId};
use sum_layout::{CaseId, RepresentationKind, UnionLayout};
use tracing::debug;

use crate::error::{case_of, check_explosion, require_loadable, Result};

/// Branch to the block registered for the case `value` holds.
///
/// `dests` pairs cases with destination blocks; comparisons are emitted in
/// the given order and a case registered twice keeps its first block.
/// Unregistered cases (and impossible tag values) go to `default`.
///
/// Every case ID and the shape of `value` are validated before anything is
/// emitted, so on error the current block is left untouched.
pub fn dispatch(
    ir: &mut IrBuilder,
    layout: &UnionLayout,
    value: &[ValueId],
    dests: &[(CaseId, BlockId)],
    default: BlockId,
) -> Result<()> {
    require_loadable(layout, "dispatch")?;
    check_explosion(ir, layout, value)?;
    let mut unique: Vec<(CaseId, BlockId)> = Vec::with_capacity(dests.len());
    for &(case, block) in dests {
        case_of(layout, case)?;
        if !unique.iter().any(|&(seen, _)| seen == case) {
            unique.push((case, block));
        }
    }
    debug!(
        union = layout.name(),
        kind = %layout.kind(),
        registered = unique.len(),
        "dispatch"
    );

    match layout.kind() {
        RepresentationKind::SingleCase => {
            let target = unique.first().map_or(default, |&(_, block)| block);
            ir.br(target);
        }
        RepresentationKind::TagPlusPayload => match value.first() {
            Some(&tag) if layout.tag_bits() > 0 => {
                let cases: Vec<(u128, BlockId)> = unique
                    .iter()
                    .map(|&(case, block)| (u128::from(layout.discriminant(case)), block))
                    .collect();
                ir.switch(tag, default, &cases);
            }
            _ => ir.br(default),
        },
        RepresentationKind::SpareBits => {
            let Some(&combined) = value.first() else {
                ir.br(default);
                return Ok(());
            };
            let spare = layout.spare_bits().to_u128().unwrap_or(0);
            let mask = ir.const_int(layout.payload_bits(), spare);
            let tag = ir.and(combined, mask);
            let cases: Vec<(u128, BlockId)> = unique
                .iter()
                .map(|&(case, block)| (layout.spare_tag_pattern(case), block))
                .collect();
            ir.switch(tag, default, &cases);
        }
    }
    Ok(())
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]

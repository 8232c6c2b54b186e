//! Internal-consistency failures during union code generation.
//!
//! Every variant is a compiler bug upstream of this crate: a case ID from
//! the wrong union, data that disagrees with the case's representation, a
//! register operation on an address-only union. None of them are
//! recoverable at the request level; callers propagate with `?` and abort
//! codegen for the unit.

use sum_ir::{IrBuilder, ValueId};
use sum_layout::{CaseDescriptor, CaseId, UnionId, UnionLayout};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UnionCodegenError {
    #[error("case {case} is not one of the {count} cases of `{union}`")]
    UnknownCase {
        union: String,
        case: CaseId,
        count: usize,
    },

    #[error("no union registered for handle {}", .0.raw())]
    UnknownUnion(UnionId),

    #[error("`{union}` is address-only; {operation} needs a loadable union")]
    NotLoadable {
        union: String,
        operation: &'static str,
    },

    #[error("case `{case}` of `{union}` carries {expected} scalars, got {found}")]
    ArityMismatch {
        union: String,
        case: String,
        expected: usize,
        found: usize,
    },

    #[error("scalar {index} of case `{case}` must be i{expected}, got {found:?}")]
    WidthMismatch {
        case: String,
        index: usize,
        expected: u32,
        found: Option<u32>,
    },

    #[error("`{union}` explodes to {expected:?}, got widths {found:?}")]
    ExplosionMismatch {
        union: String,
        expected: Vec<u32>,
        found: Vec<Option<u32>>,
    },

    #[error("{width} bits at offset {offset} overflow a {capacity}-bit payload")]
    PayloadOverflow {
        offset: u32,
        width: u32,
        capacity: u32,
    },

    #[error("cannot claim a zero-width value from a payload")]
    ZeroWidth,

    #[error("{value} is not an integer")]
    NotInteger { value: ValueId },

    #[error("{value} is not an address")]
    NotAddress { value: ValueId },
}

pub type Result<T, E = UnionCodegenError> = std::result::Result<T, E>;

// ── Request validation ──────────────────────────────────────────────

/// Resolve `case` within `layout`'s closed case set.
pub(crate) fn case_of(layout: &UnionLayout, case: CaseId) -> Result<&CaseDescriptor> {
    layout
        .case(case)
        .ok_or_else(|| UnionCodegenError::UnknownCase {
            union: layout.name().to_owned(),
            case,
            count: layout.cases().len(),
        })
}

/// Reject register-level operations on address-only unions.
pub(crate) fn require_loadable(layout: &UnionLayout, operation: &'static str) -> Result<()> {
    if layout.is_loadable() {
        Ok(())
    } else {
        Err(UnionCodegenError::NotLoadable {
            union: layout.name().to_owned(),
            operation,
        })
    }
}

/// Check that `value` has exactly the union's explosion widths.
pub(crate) fn check_explosion(ir: &IrBuilder, layout: &UnionLayout, value: &[ValueId]) -> Result<()> {
    let expected = layout.explosion_widths();
    let found: Vec<Option<u32>> = value.iter().map(|&v| ir.int_width(v)).collect();
    let matches = expected.len() == found.len()
        && expected.iter().zip(&found).all(|(&e, &f)| f == Some(e));
    if matches {
        Ok(())
    } else {
        Err(UnionCodegenError::ExplosionMismatch {
            union: layout.name().to_owned(),
            expected: expected.to_vec(),
            found,
        })
    }
}

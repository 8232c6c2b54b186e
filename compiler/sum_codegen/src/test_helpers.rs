//! Shared test utilities for union codegen.
//!
//! Factory functions for the unions used across `inject`, `project`,
//! `dispatch` and `address` tests, plus shorthands for building and
//! running single-function programs. Only compiled in test builds.

use sum_ir::{
    run, Function, InterpConfig, InterpError, IrBuilder, IrType, Memory, Outcome, Val, ValueId,
};
use sum_layout::{
    CaseDecl, CaseRepr, LayoutConfig, LayoutPlanner, ScalarRepr, UnionDecl, UnionLayout,
};

/// Plan a union under the default config.
pub(crate) fn plan(name: &str, cases: Vec<CaseDecl>) -> UnionLayout {
    LayoutPlanner::new(LayoutConfig::default()).plan(&UnionDecl::new(name, cases))
}

/// A case carrying the given integer scalars.
pub(crate) fn ints(name: &str, widths: &[u32]) -> CaseDecl {
    CaseDecl::new(
        name,
        CaseRepr::scalars(widths.iter().map(|&w| ScalarRepr::int(w))),
    )
}

/// `A | B(i8) | C(i32)`: two-bit dedicated tag, 32-bit payload.
pub(crate) fn abc() -> UnionLayout {
    plan(
        "ABC",
        vec![
            CaseDecl::empty("A"),
            ints("B", &[8]),
            ints("C", &[32]),
        ],
    )
}

/// `Some(ptr) | None`: the tag lives in the pointer's alignment bits.
pub(crate) fn opt_ptr() -> UnionLayout {
    plan(
        "OptPtr",
        vec![
            CaseDecl::new("Some", CaseRepr::scalars([ScalarRepr::pointer(64, 8)])),
            CaseDecl::empty("None"),
        ],
    )
}

/// `T(bool) | F(bool) | Nil`: the tag lives in the high bits of the byte.
pub(crate) fn bools() -> UnionLayout {
    plan(
        "Bools",
        vec![
            CaseDecl::new("T", CaseRepr::scalars([ScalarRepr::bool_byte()])),
            CaseDecl::new("F", CaseRepr::scalars([ScalarRepr::bool_byte()])),
            CaseDecl::empty("Nil"),
        ],
    )
}

/// A single-case wrapper around `(i8, i32)`.
pub(crate) fn wrapper() -> UnionLayout {
    plan("Wrap", vec![ints("Only", &[8, 32])])
}

/// A union whose payload only fits in memory.
pub(crate) fn blob() -> UnionLayout {
    plan(
        "Blob",
        vec![
            CaseDecl::new(
                "Big",
                CaseRepr::AddressOnly {
                    size: 64,
                    align: 8,
                },
            ),
            ints("Small", &[16]),
        ],
    )
}

/// A builder with the given parameters, positioned at its entry block.
pub(crate) fn builder(params: &[IrType]) -> (IrBuilder, Vec<ValueId>) {
    let mut irb = IrBuilder::new("test");
    let args = params.iter().map(|&ty| irb.add_param(ty)).collect();
    let entry = irb.append_block("entry");
    irb.position_at_end(entry);
    (irb, args)
}

/// Integer parameter types of the given widths.
pub(crate) fn int_params(widths: &[u32]) -> Vec<IrType> {
    widths.iter().map(|&w| IrType::Int(w)).collect()
}

/// Run with default limits and fresh memory.
pub(crate) fn exec(func: &Function, args: &[Val]) -> Result<Outcome, InterpError> {
    let config = InterpConfig::default();
    let mut memory = Memory::for_config(&config);
    run(func, args, &mut memory, &config)
}

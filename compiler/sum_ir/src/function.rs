//! Basic-block IR: types, instructions, terminators, functions.
//!
//! The same shape as LLVM IR at the granularity union codegen needs:
//!
//! - **[`Function`]** — parameters, blocks, value types
//! - **[`Block`]** — a basic block: body instructions, one terminator
//! - **[`Instr`]** — integer arithmetic, conversions, address arithmetic,
//!   memory access
//! - **[`Terminator`]** — block exit (branch, switch, return)
//!
//! Values are named via [`ValueId`] (SSA). Control flow uses [`BlockId`]
//! references between blocks.

use crate::ids::{BlockId, ValueId};

// ── Types ───────────────────────────────────────────────────────────

/// Type of an IR value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IrType {
    /// Integer of `1..=128` bits.
    Int(u32),
    /// Untyped byte address.
    Ptr,
}

impl IrType {
    /// Integer width, or `None` for pointers.
    #[inline]
    pub fn int_bits(self) -> Option<u32> {
        match self {
            Self::Int(bits) => Some(bits),
            Self::Ptr => None,
        }
    }
}

// ── Instructions ────────────────────────────────────────────────────

/// Two-operand integer operation. Both operands and the result share one
/// width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinOp {
    And,
    Or,
    Xor,
    /// Shift left; amounts of at least the width yield zero.
    Shl,
    /// Logical shift right; amounts of at least the width yield zero.
    LShr,
}

/// A single non-terminating instruction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Instr {
    /// `dst = <bits>-bit constant`.
    Const { dst: ValueId, bits: u32, value: u128 },
    /// `dst = lhs <op> rhs`.
    Binary {
        dst: ValueId,
        op: BinOp,
        lhs: ValueId,
        rhs: ValueId,
    },
    /// `dst = low <bits> bits of value`.
    Trunc {
        dst: ValueId,
        value: ValueId,
        bits: u32,
    },
    /// `dst = value zero-extended to <bits>`.
    ZExt {
        dst: ValueId,
        value: ValueId,
        bits: u32,
    },
    /// `dst = (lhs == rhs)` as an `i1`.
    ICmpEq {
        dst: ValueId,
        lhs: ValueId,
        rhs: ValueId,
    },
    /// `dst = base + bytes`.
    PtrOffset {
        dst: ValueId,
        base: ValueId,
        bytes: u64,
    },
    /// `dst = load <bits> from addr` (little-endian, `ceil(bits/8)` bytes).
    Load {
        dst: ValueId,
        addr: ValueId,
        bits: u32,
    },
    /// `store value to addr` (little-endian, `ceil(width/8)` bytes).
    Store { addr: ValueId, value: ValueId },
}

impl Instr {
    /// The value defined by this instruction, if any.
    pub fn defined_value(&self) -> Option<ValueId> {
        match self {
            Instr::Const { dst, .. }
            | Instr::Binary { dst, .. }
            | Instr::Trunc { dst, .. }
            | Instr::ZExt { dst, .. }
            | Instr::ICmpEq { dst, .. }
            | Instr::PtrOffset { dst, .. }
            | Instr::Load { dst, .. } => Some(*dst),
            Instr::Store { .. } => None,
        }
    }
}

// ── Terminators ─────────────────────────────────────────────────────

/// Block terminator: how control leaves a basic block.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Terminator {
    /// Unconditional branch.
    Br { target: BlockId },
    /// Branch on an `i1`.
    CondBr {
        cond: ValueId,
        then_block: BlockId,
        else_block: BlockId,
    },
    /// Multi-way branch on an integer. Cases are tested in order; the
    /// first equal constant wins, otherwise control goes to `default`.
    Switch {
        value: ValueId,
        default: BlockId,
        cases: Vec<(u128, BlockId)>,
    },
    /// Return zero or more values.
    Ret { values: Vec<ValueId> },
    /// Control never reaches here.
    Unreachable,
}

impl Terminator {
    /// Blocks control may transfer to.
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Terminator::Br { target } => vec![*target],
            Terminator::CondBr {
                then_block,
                else_block,
                ..
            } => vec![*then_block, *else_block],
            Terminator::Switch { default, cases, .. } => {
                let mut out = Vec::with_capacity(cases.len() + 1);
                out.extend(cases.iter().map(|&(_, b)| b));
                out.push(*default);
                out
            }
            Terminator::Ret { .. } | Terminator::Unreachable => Vec::new(),
        }
    }
}

// ── Blocks and functions ────────────────────────────────────────────

/// A basic block: straight-line body plus exactly one terminator once
/// complete.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Block {
    pub id: BlockId,
    pub name: String,
    pub body: Vec<Instr>,
    pub terminator: Option<Terminator>,
}

/// A finished function.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Function {
    pub name: String,
    pub params: Vec<ValueId>,
    pub blocks: Vec<Block>,
    /// Type of every value, indexed by `ValueId`.
    pub value_types: Vec<IrType>,
    pub entry: BlockId,
}

impl Function {
    #[inline]
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.index())
    }

    #[inline]
    pub fn value_type(&self, id: ValueId) -> Option<IrType> {
        self.value_types.get(id.index()).copied()
    }

    /// Total number of body instructions across all blocks.
    pub fn instr_count(&self) -> usize {
        self.blocks.iter().map(|b| b.body.len()).sum()
    }

    /// Iterate over every body instruction, in block order.
    pub fn instrs(&self) -> impl Iterator<Item = &Instr> {
        self.blocks.iter().flat_map(|b| b.body.iter())
    }
}

//! ID-based instruction builder.
//!
//! `IrBuilder` owns the function under construction and exposes only
//! opaque `ValueId` / `BlockId` handles to callers. It is the explicit
//! emission context threaded through union codegen: every operation takes
//! `&mut IrBuilder` instead of reaching for ambient state.
//!
//! # Defensive Construction
//!
//! Operand mismatches (shifting a pointer, mixing widths, emitting into a
//! terminated block) are internal compiler bugs. Rather than panicking,
//! the builder logs them with `tracing::error!`, counts them, and returns
//! a well-typed fallback so construction can continue. A function built
//! with a non-zero [`codegen_error_count`](IrBuilder::codegen_error_count)
//! is malformed and must not be executed.
//!
//! # Method Organization
//!
//! | Category | Methods |
//! |----------|---------|
//! | Constants | `const_int`, `const_zero` |
//! | Bitwise | `and`, `or`, `xor`, `shl`, `lshr` |
//! | Conversions | `trunc`, `zext` |
//! | Comparisons | `icmp_eq` |
//! | Memory | `ptr_offset`, `load`, `store` |
//! | Control flow | `br`, `cond_br`, `switch`, `ret`, `unreachable` |
//! | Blocks | `append_block`, `position_at_end`, `current_block`, `is_terminated` |

use std::cell::Cell;

use crate::MAX_INT_BITS;
use crate::function::{BinOp, Block, Function, Instr, IrType, Terminator};
use crate::ids::{next_raw, BlockId, ValueId};

/// Builds one [`Function`].
pub struct IrBuilder {
    name: String,
    params: Vec<ValueId>,
    value_types: Vec<IrType>,
    blocks: Vec<Block>,
    /// Currently-active basic block (set by `position_at_end`).
    current_block: Option<BlockId>,
    /// Count of malformed-IR errors during construction.
    codegen_errors: Cell<u32>,
}

impl IrBuilder {
    /// Start building a function called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            value_types: Vec::new(),
            blocks: Vec::new(),
            current_block: None,
            codegen_errors: Cell::new(0),
        }
    }

    /// Record a malformed-IR error.
    fn record_codegen_error(&self) {
        self.codegen_errors.set(self.codegen_errors.get() + 1);
    }

    /// Number of malformed-IR errors recorded so far.
    pub fn codegen_error_count(&self) -> u32 {
        self.codegen_errors.get()
    }

    fn new_value(&mut self, ty: IrType) -> ValueId {
        let id = ValueId::new(next_raw(self.value_types.len()));
        self.value_types.push(ty);
        id
    }

    // -----------------------------------------------------------------------
    // Parameters and types
    // -----------------------------------------------------------------------

    /// Add a function parameter of the given type.
    pub fn add_param(&mut self, ty: IrType) -> ValueId {
        let id = self.new_value(ty);
        self.params.push(id);
        id
    }

    /// Parameters added so far, in order.
    pub fn params(&self) -> &[ValueId] {
        &self.params
    }

    /// Type of a value, or `None` for an unknown handle.
    #[inline]
    pub fn value_type(&self, v: ValueId) -> Option<IrType> {
        self.value_types.get(v.index()).copied()
    }

    /// Integer width of a value, or `None` if it is not an integer.
    #[inline]
    pub fn int_width(&self, v: ValueId) -> Option<u32> {
        self.value_type(v).and_then(IrType::int_bits)
    }

    // -----------------------------------------------------------------------
    // Blocks
    // -----------------------------------------------------------------------

    /// Append a new empty block. The first block appended is the entry.
    pub fn append_block(&mut self, name: &str) -> BlockId {
        let id = BlockId::new(next_raw(self.blocks.len()));
        self.blocks.push(Block {
            id,
            name: name.to_owned(),
            body: Vec::new(),
            terminator: None,
        });
        id
    }

    /// Make `block` the insertion point.
    pub fn position_at_end(&mut self, block: BlockId) {
        if block.index() >= self.blocks.len() {
            tracing::error!(block = block.raw(), "position_at_end on unknown block");
            self.record_codegen_error();
            return;
        }
        self.current_block = Some(block);
    }

    #[inline]
    pub fn current_block(&self) -> Option<BlockId> {
        self.current_block
    }

    /// True if the current block already has a terminator.
    pub fn is_terminated(&self) -> bool {
        self.current_block
            .and_then(|b| self.blocks.get(b.index()))
            .is_some_and(|b| b.terminator.is_some())
    }

    fn open_block(&mut self) -> Option<&mut Block> {
        let index = self.current_block?.index();
        match self.blocks.get_mut(index) {
            Some(block) if block.terminator.is_none() => Some(block),
            _ => None,
        }
    }

    fn push_instr(&mut self, instr: Instr) {
        if let Some(block) = self.open_block() {
            block.body.push(instr);
        } else {
            tracing::error!(?instr, "instruction emitted with no open block");
            self.record_codegen_error();
        }
    }

    fn set_terminator(&mut self, term: Terminator) {
        if let Some(block) = self.open_block() {
            block.terminator = Some(term);
        } else {
            tracing::error!(?term, "terminator emitted with no open block");
            self.record_codegen_error();
        }
    }

    // -----------------------------------------------------------------------
    // Constants
    // -----------------------------------------------------------------------

    /// Create an integer constant. `value` is truncated to `bits`.
    pub fn const_int(&mut self, bits: u32, value: u128) -> ValueId {
        let bits = self.checked_width(bits);
        let value = value & width_mask(bits);
        let dst = self.new_value(IrType::Int(bits));
        self.push_instr(Instr::Const { dst, bits, value });
        dst
    }

    /// Create a zero constant of the given width.
    #[inline]
    pub fn const_zero(&mut self, bits: u32) -> ValueId {
        self.const_int(bits, 0)
    }

    fn checked_width(&self, bits: u32) -> u32 {
        if (1..=MAX_INT_BITS).contains(&bits) {
            bits
        } else {
            tracing::error!(bits, "integer width out of range — clamping");
            self.record_codegen_error();
            bits.clamp(1, MAX_INT_BITS)
        }
    }

    // -----------------------------------------------------------------------
    // Bitwise
    // -----------------------------------------------------------------------

    /// Build a two-operand integer operation.
    ///
    /// Defensive: if the operands are not integers of one width, returns
    /// `lhs` unchanged instead of panicking.
    pub fn binary(&mut self, op: BinOp, lhs: ValueId, rhs: ValueId) -> ValueId {
        let (l, r) = (self.int_width(lhs), self.int_width(rhs));
        let Some(bits) = l.filter(|_| l == r) else {
            tracing::error!(?op, lhs = ?self.value_type(lhs), rhs = ?self.value_type(rhs),
                "binary operand mismatch — returning lhs");
            self.record_codegen_error();
            return lhs;
        };
        let dst = self.new_value(IrType::Int(bits));
        self.push_instr(Instr::Binary { dst, op, lhs, rhs });
        dst
    }

    #[inline]
    pub fn and(&mut self, lhs: ValueId, rhs: ValueId) -> ValueId {
        self.binary(BinOp::And, lhs, rhs)
    }

    #[inline]
    pub fn or(&mut self, lhs: ValueId, rhs: ValueId) -> ValueId {
        self.binary(BinOp::Or, lhs, rhs)
    }

    #[inline]
    pub fn xor(&mut self, lhs: ValueId, rhs: ValueId) -> ValueId {
        self.binary(BinOp::Xor, lhs, rhs)
    }

    #[inline]
    pub fn shl(&mut self, lhs: ValueId, rhs: ValueId) -> ValueId {
        self.binary(BinOp::Shl, lhs, rhs)
    }

    #[inline]
    pub fn lshr(&mut self, lhs: ValueId, rhs: ValueId) -> ValueId {
        self.binary(BinOp::LShr, lhs, rhs)
    }

    // -----------------------------------------------------------------------
    // Conversions
    // -----------------------------------------------------------------------

    /// Truncate an integer to `bits`. A no-op when already that wide.
    ///
    /// Defensive: truncating a non-integer or to a wider type returns the
    /// value unchanged.
    pub fn trunc(&mut self, value: ValueId, bits: u32) -> ValueId {
        match self.int_width(value) {
            Some(w) if w == bits => value,
            Some(w) if bits < w && bits > 0 => {
                let dst = self.new_value(IrType::Int(bits));
                self.push_instr(Instr::Trunc { dst, value, bits });
                dst
            }
            other => {
                tracing::error!(from = ?other, to = bits, "invalid trunc — returning value");
                self.record_codegen_error();
                value
            }
        }
    }

    /// Zero-extend an integer to `bits`. A no-op when already that wide.
    ///
    /// Defensive: extending a non-integer or to a narrower type returns
    /// the value unchanged.
    pub fn zext(&mut self, value: ValueId, bits: u32) -> ValueId {
        match self.int_width(value) {
            Some(w) if w == bits => value,
            Some(w) if bits > w && bits <= MAX_INT_BITS => {
                let dst = self.new_value(IrType::Int(bits));
                self.push_instr(Instr::ZExt { dst, value, bits });
                dst
            }
            other => {
                tracing::error!(from = ?other, to = bits, "invalid zext — returning value");
                self.record_codegen_error();
                value
            }
        }
    }

    // -----------------------------------------------------------------------
    // Comparisons
    // -----------------------------------------------------------------------

    /// Integer equality, producing an `i1`.
    ///
    /// Defensive: mismatched operands compare as `false`.
    pub fn icmp_eq(&mut self, lhs: ValueId, rhs: ValueId) -> ValueId {
        let (l, r) = (self.int_width(lhs), self.int_width(rhs));
        if l.is_none() || l != r {
            tracing::error!(lhs = ?l, rhs = ?r, "icmp_eq operand mismatch — false");
            self.record_codegen_error();
            return self.const_int(1, 0);
        }
        let dst = self.new_value(IrType::Int(1));
        self.push_instr(Instr::ICmpEq { dst, lhs, rhs });
        dst
    }

    // -----------------------------------------------------------------------
    // Memory
    // -----------------------------------------------------------------------

    /// Address arithmetic: `base + bytes`.
    pub fn ptr_offset(&mut self, base: ValueId, bytes: u64) -> ValueId {
        if self.value_type(base) != Some(IrType::Ptr) {
            tracing::error!(base = ?self.value_type(base), "ptr_offset on non-pointer");
            self.record_codegen_error();
            return base;
        }
        if bytes == 0 {
            return base;
        }
        let dst = self.new_value(IrType::Ptr);
        self.push_instr(Instr::PtrOffset { dst, base, bytes });
        dst
    }

    /// Load a `bits`-wide integer from `addr`.
    ///
    /// Defensive: loading through a non-pointer yields zero.
    pub fn load(&mut self, addr: ValueId, bits: u32) -> ValueId {
        let bits = self.checked_width(bits);
        if self.value_type(addr) != Some(IrType::Ptr) {
            tracing::error!(addr = ?self.value_type(addr), "load through non-pointer — zero");
            self.record_codegen_error();
            return self.const_zero(bits);
        }
        let dst = self.new_value(IrType::Int(bits));
        self.push_instr(Instr::Load { dst, addr, bits });
        dst
    }

    /// Store an integer to `addr`.
    pub fn store(&mut self, addr: ValueId, value: ValueId) {
        if self.value_type(addr) != Some(IrType::Ptr) || self.int_width(value).is_none() {
            tracing::error!(
                addr = ?self.value_type(addr),
                value = ?self.value_type(value),
                "invalid store — dropped"
            );
            self.record_codegen_error();
            return;
        }
        self.push_instr(Instr::Store { addr, value });
    }

    // -----------------------------------------------------------------------
    // Control flow
    // -----------------------------------------------------------------------

    /// Build an unconditional branch.
    pub fn br(&mut self, target: BlockId) {
        self.set_terminator(Terminator::Br { target });
    }

    /// Build a conditional branch.
    ///
    /// Defensive: if `cond` is not an `i1`, falls back to an
    /// unconditional branch to the else block.
    pub fn cond_br(&mut self, cond: ValueId, then_block: BlockId, else_block: BlockId) {
        if self.int_width(cond) != Some(1) {
            tracing::error!(cond = ?self.value_type(cond), "cond_br on non-i1 — branching to else");
            self.record_codegen_error();
            self.br(else_block);
            return;
        }
        self.set_terminator(Terminator::CondBr {
            cond,
            then_block,
            else_block,
        });
    }

    /// Build a switch over integer constants.
    ///
    /// Defensive: if the scrutinee is not an integer, falls back to a
    /// branch to the default block.
    pub fn switch(&mut self, value: ValueId, default: BlockId, cases: &[(u128, BlockId)]) {
        let Some(bits) = self.int_width(value) else {
            tracing::error!(val_type = ?self.value_type(value), "switch on non-int — branching to default");
            self.record_codegen_error();
            self.br(default);
            return;
        };
        let mask = width_mask(bits);
        self.set_terminator(Terminator::Switch {
            value,
            default,
            cases: cases.iter().map(|&(c, b)| (c & mask, b)).collect(),
        });
    }

    /// Build a return of zero or more values.
    pub fn ret(&mut self, values: &[ValueId]) {
        self.set_terminator(Terminator::Ret {
            values: values.to_vec(),
        });
    }

    /// Build an unreachable terminator.
    pub fn unreachable(&mut self) {
        self.set_terminator(Terminator::Unreachable);
    }

    // -----------------------------------------------------------------------
    // Finish
    // -----------------------------------------------------------------------

    /// Finish construction. The entry block is the first block appended.
    pub fn finish(self) -> Function {
        Function {
            name: self.name,
            params: self.params,
            blocks: self.blocks,
            value_types: self.value_types,
            entry: BlockId::new(0),
        }
    }
}

/// All-ones integer of the given width (at most 128).
#[inline]
pub(crate) fn width_mask(bits: u32) -> u128 {
    if bits >= 128 {
        u128::MAX
    } else {
        (1u128 << bits) - 1
    }
}

//! Textual form of a [`Function`].
//!
//! ```text
//! fn inject_Some(%0: i32) {
//! bb0 (entry):
//!   %1 = zext i32 %0 to i33
//!   %2 = const i33 0x100000000
//!   %3 = or i33 %1, %2
//!   ret %3
//! }
//! ```

use std::fmt;

use crate::function::{BinOp, Block, Function, Instr, IrType, Terminator};
use crate::ids::ValueId;

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Int(bits) => write!(f, "i{bits}"),
            IrType::Ptr => f.write_str("ptr"),
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::Xor => "xor",
            BinOp::Shl => "shl",
            BinOp::LShr => "lshr",
        })
    }
}

/// A value printed with its type, e.g. `i32 %4`.
struct Typed<'a>(&'a Function, ValueId);

impl fmt::Display for Typed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.value_type(self.1) {
            Some(ty) => write!(f, "{ty} {}", self.1),
            None => write!(f, "? {}", self.1),
        }
    }
}

fn write_instr(f: &mut fmt::Formatter<'_>, func: &Function, instr: &Instr) -> fmt::Result {
    match instr {
        Instr::Const { dst, bits, value } => write!(f, "{dst} = const i{bits} {value:#x}"),
        Instr::Binary { dst, op, lhs, rhs } => {
            write!(f, "{dst} = {op} {}, {rhs}", Typed(func, *lhs))
        }
        Instr::Trunc { dst, value, bits } => {
            write!(f, "{dst} = trunc {} to i{bits}", Typed(func, *value))
        }
        Instr::ZExt { dst, value, bits } => {
            write!(f, "{dst} = zext {} to i{bits}", Typed(func, *value))
        }
        Instr::ICmpEq { dst, lhs, rhs } => {
            write!(f, "{dst} = icmp eq {}, {rhs}", Typed(func, *lhs))
        }
        Instr::PtrOffset { dst, base, bytes } => write!(f, "{dst} = offset ptr {base}, {bytes}"),
        Instr::Load { dst, addr, bits } => write!(f, "{dst} = load i{bits}, ptr {addr}"),
        Instr::Store { addr, value } => write!(f, "store {}, ptr {addr}", Typed(func, *value)),
    }
}

fn write_terminator(f: &mut fmt::Formatter<'_>, func: &Function, term: &Terminator) -> fmt::Result {
    match term {
        Terminator::Br { target } => write!(f, "br {target}"),
        Terminator::CondBr {
            cond,
            then_block,
            else_block,
        } => write!(f, "br {cond}, {then_block}, {else_block}"),
        Terminator::Switch {
            value,
            default,
            cases,
        } => {
            write!(f, "switch {}, default {default} [", Typed(func, *value))?;
            for (i, (constant, target)) in cases.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{constant:#x} => {target}")?;
            }
            f.write_str("]")
        }
        Terminator::Ret { values } => {
            f.write_str("ret")?;
            for (i, v) in values.iter().enumerate() {
                f.write_str(if i == 0 { " " } else { ", " })?;
                write!(f, "{v}")?;
            }
            Ok(())
        }
        Terminator::Unreachable => f.write_str("unreachable"),
    }
}

fn write_block(f: &mut fmt::Formatter<'_>, func: &Function, block: &Block) -> fmt::Result {
    writeln!(f, "{} ({}):", block.id, block.name)?;
    for instr in &block.body {
        f.write_str("  ")?;
        write_instr(f, func, instr)?;
        f.write_str("\n")?;
    }
    match &block.terminator {
        Some(term) => {
            f.write_str("  ")?;
            write_terminator(f, func, term)?;
            f.write_str("\n")
        }
        None => f.write_str("  <unterminated>\n"),
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn {}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match self.value_type(*p) {
                Some(ty) => write!(f, "{p}: {ty}")?,
                None => write!(f, "{p}: ?")?,
            }
        }
        f.write_str(") {\n")?;
        for block in &self.blocks {
            write_block(f, self, block)?;
        }
        f.write_str("}\n")
    }
}

//! Backend-neutral emission context for sum-type codegen.
//!
//! A small basic-block IR with exactly the operations union code
//! generation needs: integer constants, bitwise arithmetic, shifts,
//! truncation and zero-extension, equality, address offsets, loads,
//! stores, branches and switches.
//!
//! - [`IrBuilder`] — ID-based builder; the only way to create values
//! - [`Function`] — the finished result, printable via `Display`
//! - [`interp`] — a reference interpreter over a little-endian byte
//!   memory, used to check emitted code end to end
//!
//! Integers are unsigned bit vectors of `1..=`[`MAX_INT_BITS`] bits.

mod builder;
mod function;
mod ids;
pub mod interp;
mod print;

pub use builder::IrBuilder;
pub use function::{BinOp, Block, Function, Instr, IrType, Terminator};
pub use ids::{BlockId, ValueId};
pub use interp::{run, InterpConfig, InterpError, Memory, Outcome, Val};

/// Widest integer the IR models.
pub const MAX_INT_BITS: u32 = 128;

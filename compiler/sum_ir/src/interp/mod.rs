//! Reference interpreter for finished functions.
//!
//! Executes a [`Function`] over concrete argument values and a flat
//! [`Memory`]. Used to check emitted union code end to end: inject then
//! project, dispatch to the right block, store then load through memory.
//!
//! Semantics:
//! - Integers are unsigned; every result is masked to its width.
//! - Shift amounts of at least the operand width produce zero.
//! - Loads and stores move `ceil(bits / 8)` little-endian bytes.
//! - Execution is bounded by [`InterpConfig::step_limit`] blocks.

mod memory;

use thiserror::Error;

use crate::builder::width_mask;
use crate::function::{BinOp, Function, Instr, IrType, Terminator};
use crate::ids::{BlockId, ValueId};

pub use memory::Memory;

/// A runtime value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Val {
    Int { bits: u32, value: u128 },
    Ptr(u64),
}

impl Val {
    /// An integer masked to `bits`.
    pub fn int(bits: u32, value: u128) -> Self {
        Val::Int {
            bits,
            value: value & width_mask(bits),
        }
    }

    /// Integer payload, or `None` for pointers.
    pub fn as_int(self) -> Option<u128> {
        match self {
            Val::Int { value, .. } => Some(value),
            Val::Ptr(_) => None,
        }
    }

    fn ty(self) -> IrType {
        match self {
            Val::Int { bits, .. } => IrType::Int(bits),
            Val::Ptr(_) => IrType::Ptr,
        }
    }
}

/// Interpreter limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterpConfig {
    /// Maximum number of blocks executed before giving up.
    pub step_limit: u32,
    /// Size of memory created by [`Memory::for_config`].
    pub memory_bytes: usize,
}

impl Default for InterpConfig {
    fn default() -> Self {
        Self {
            step_limit: 10_000,
            memory_bytes: 256,
        }
    }
}

impl Memory {
    /// Zeroed memory sized by `config`.
    pub fn for_config(config: &InterpConfig) -> Self {
        Memory::new(config.memory_bytes)
    }
}

/// Result of a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// Values passed to `ret`.
    pub values: Vec<Val>,
    /// The block whose `ret` ended execution.
    pub exit_block: BlockId,
}

impl Outcome {
    /// Integer payloads of the returned values (pointers are skipped).
    pub fn ints(&self) -> Vec<u128> {
        self.values.iter().filter_map(|v| v.as_int()).collect()
    }
}

/// Execution failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InterpError {
    #[error("expected {expected} arguments, found {found}")]
    ArgCount { expected: usize, found: usize },
    #[error("argument {index} has type {found}, expected {expected}")]
    ArgType {
        index: usize,
        expected: IrType,
        found: IrType,
    },
    #[error("value {0} used before definition")]
    Undefined(ValueId),
    #[error("value {value} has the wrong type for {operation}")]
    TypeMismatch {
        value: ValueId,
        operation: &'static str,
    },
    #[error("access of {len} bytes at {addr:#x} outside memory of {size} bytes")]
    OutOfBounds { addr: u64, len: usize, size: usize },
    #[error("branch to unknown block {0}")]
    UnknownBlock(BlockId),
    #[error("block {0} has no terminator")]
    Unterminated(BlockId),
    #[error("reached unreachable in {0}")]
    Unreachable(BlockId),
    #[error("step limit of {0} blocks exceeded")]
    StepLimit(u32),
}

/// Register file for one activation.
struct Frame {
    values: Vec<Option<Val>>,
}

impl Frame {
    fn get(&self, id: ValueId) -> Result<Val, InterpError> {
        self.values
            .get(id.index())
            .copied()
            .flatten()
            .ok_or(InterpError::Undefined(id))
    }

    fn int(&self, id: ValueId, operation: &'static str) -> Result<(u32, u128), InterpError> {
        match self.get(id)? {
            Val::Int { bits, value } => Ok((bits, value)),
            Val::Ptr(_) => Err(InterpError::TypeMismatch {
                value: id,
                operation,
            }),
        }
    }

    fn ptr(&self, id: ValueId, operation: &'static str) -> Result<u64, InterpError> {
        match self.get(id)? {
            Val::Ptr(addr) => Ok(addr),
            Val::Int { .. } => Err(InterpError::TypeMismatch {
                value: id,
                operation,
            }),
        }
    }

    fn set(&mut self, id: ValueId, val: Val) {
        if let Some(slot) = self.values.get_mut(id.index()) {
            *slot = Some(val);
        }
    }
}

/// Run `func` from its entry block.
pub fn run(
    func: &Function,
    args: &[Val],
    memory: &mut Memory,
    config: &InterpConfig,
) -> Result<Outcome, InterpError> {
    if args.len() != func.params.len() {
        return Err(InterpError::ArgCount {
            expected: func.params.len(),
            found: args.len(),
        });
    }

    let mut frame = Frame {
        values: vec![None; func.value_types.len()],
    };
    for (index, (&param, &arg)) in func.params.iter().zip(args).enumerate() {
        let expected = func.value_type(param).unwrap_or(IrType::Ptr);
        if arg.ty() != expected {
            return Err(InterpError::ArgType {
                index,
                expected,
                found: arg.ty(),
            });
        }
        frame.set(param, arg);
    }

    let mut current = func.entry;
    let mut steps = 0u32;
    loop {
        steps += 1;
        if steps > config.step_limit {
            return Err(InterpError::StepLimit(config.step_limit));
        }
        let block = func
            .block(current)
            .ok_or(InterpError::UnknownBlock(current))?;
        tracing::trace!(block = %current, name = %block.name, "interp enter");

        for instr in &block.body {
            step(&mut frame, memory, instr)?;
        }

        match block
            .terminator
            .as_ref()
            .ok_or(InterpError::Unterminated(current))?
        {
            Terminator::Br { target } => current = *target,
            Terminator::CondBr {
                cond,
                then_block,
                else_block,
            } => {
                let (_, c) = frame.int(*cond, "br")?;
                current = if c != 0 { *then_block } else { *else_block };
            }
            Terminator::Switch {
                value,
                default,
                cases,
            } => {
                let (_, v) = frame.int(*value, "switch")?;
                current = cases
                    .iter()
                    .find(|&&(c, _)| c == v)
                    .map_or(*default, |&(_, target)| target);
            }
            Terminator::Ret { values } => {
                let values = values
                    .iter()
                    .map(|&v| frame.get(v))
                    .collect::<Result<Vec<_>, _>>()?;
                return Ok(Outcome {
                    values,
                    exit_block: current,
                });
            }
            Terminator::Unreachable => return Err(InterpError::Unreachable(current)),
        }
    }
}

fn step(frame: &mut Frame, memory: &mut Memory, instr: &Instr) -> Result<(), InterpError> {
    match *instr {
        Instr::Const { dst, bits, value } => frame.set(dst, Val::int(bits, value)),
        Instr::Binary { dst, op, lhs, rhs } => {
            let (bits, l) = frame.int(lhs, "binary")?;
            let (_, r) = frame.int(rhs, "binary")?;
            frame.set(dst, Val::int(bits, binary(op, bits, l, r)));
        }
        Instr::Trunc { dst, value, bits } => {
            let (_, v) = frame.int(value, "trunc")?;
            frame.set(dst, Val::int(bits, v));
        }
        Instr::ZExt { dst, value, bits } => {
            let (_, v) = frame.int(value, "zext")?;
            frame.set(dst, Val::int(bits, v));
        }
        Instr::ICmpEq { dst, lhs, rhs } => {
            let (_, l) = frame.int(lhs, "icmp")?;
            let (_, r) = frame.int(rhs, "icmp")?;
            frame.set(dst, Val::int(1, u128::from(l == r)));
        }
        Instr::PtrOffset { dst, base, bytes } => {
            let base = frame.ptr(base, "offset")?;
            frame.set(dst, Val::Ptr(base.wrapping_add(bytes)));
        }
        Instr::Load { dst, addr, bits } => {
            let addr = frame.ptr(addr, "load")?;
            let value = memory.load_int(addr, bits)?;
            frame.set(dst, Val::int(bits, value));
        }
        Instr::Store { addr, value } => {
            let addr = frame.ptr(addr, "store")?;
            let (bits, v) = frame.int(value, "store")?;
            memory.store_int(addr, bits, v)?;
        }
    }
    Ok(())
}

fn binary(op: BinOp, bits: u32, l: u128, r: u128) -> u128 {
    let shift = |r: u128| u32::try_from(r).ok().filter(|&s| s < bits);
    match op {
        BinOp::And => l & r,
        BinOp::Or => l | r,
        BinOp::Xor => l ^ r,
        BinOp::Shl => shift(r).map_or(0, |s| l << s),
        BinOp::LShr => shift(r).map_or(0, |s| l >> s),
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
mod tests;

//! Errors surfaced by the driver commands.

use sum_codegen::UnionCodegenError;
use sum_ir::InterpError;
use thiserror::Error;

use crate::parse::ParseError;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("cannot read input: {0}")]
    Read(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Codegen(#[from] UnionCodegenError),

    #[error("interpreter: {0}")]
    Interp(#[from] InterpError),

    #[error("no union named `{0}`")]
    UnknownUnion(String),

    #[error("unknown option `{0}`")]
    UnknownFlag(String),

    #[error("invalid value `{value}` for `{flag}`")]
    InvalidFlagValue { flag: &'static str, value: String },

    #[error("union `{union}` is {size} bytes, too large to check in the interpreter")]
    TooLargeToCheck { union: String, size: u64 },

    #[error("`{function}` was built with {errors} malformed instruction(s)")]
    MalformedIr { function: String, errors: u32 },
}

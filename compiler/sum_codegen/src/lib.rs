//! Code generation for sum types.
//!
//! Given a planned [`UnionLayout`](sum_layout::UnionLayout), this crate
//! emits the instructions that construct, take apart, branch on and store
//! union values:
//!
//! - **Payload packing** ([`PayloadPacker`], [`PayloadUnpacker`]) — scalars
//!   in and out of a single payload integer.
//! - **Injection** ([`inject_case`]) — case + data to union value.
//! - **Projection** ([`project_case`]) — unchecked inverse of injection.
//! - **Dispatch** ([`dispatch`]) — one terminator branching on the case.
//! - **Address access** ([`project_address_for_store`], [`store_tag`],
//!   [`load_union`], [`store_union`]) — unions in memory.
//! - **Facade** ([`UnionCodegen`]) — the same operations keyed by
//!   [`UnionId`](sum_layout::UnionId) through a shared layout cache.
//!
//! Every operation takes the emission context (`&mut IrBuilder`)
//! explicitly and branches on the layout's
//! [`RepresentationKind`](sum_layout::RepresentationKind).

mod address;
mod dispatch;
mod error;
mod facade;
mod inject;
mod payload;
mod project;

#[cfg(test)]
mod test_helpers;

use smallvec::SmallVec;
use sum_ir::ValueId;

pub use address::{load_union, project_address_for_store, store_tag, store_union};
pub use dispatch::dispatch;
pub use error::{Result, UnionCodegenError};
pub use facade::UnionCodegen;
pub use inject::inject_case;
pub use payload::{PayloadPacker, PayloadUnpacker};
pub use project::project_case;

/// A union value as an ordered list of scalars.
pub type Explosion = SmallVec<[ValueId; 2]>;

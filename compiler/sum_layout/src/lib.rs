//! Representation planning for sum types.
//!
//! This crate decides how a union value is laid out in bits:
//!
//! - **Case metadata** ([`UnionDecl`], [`CaseRepr`], [`ScalarRepr`]) — the
//!   closed, ordered case list handed over by type resolution.
//!
//! - **Spare bits** ([`SpareBitsMask`]) — payload positions no case ever
//!   uses, plus the [`interleave`] function that scatters a tag into them.
//!
//! - **Planning** ([`LayoutPlanner`], [`UnionLayout`]) — picks one of three
//!   representations ([`RepresentationKind`]): a transparent single-case
//!   wrapper, a dedicated tag field ahead of the payload, or a tag folded
//!   into spare payload bits. Payloads wider than the register limit make
//!   the union address-only ([`Storage`]).
//!
//! - **Caching** ([`LayoutCache`]) — one immutable layout per union per
//!   compilation unit, planned on first use.
//!
//! # Design
//!
//! The representation kind is a closed enum fixed at planning time. Every
//! code generation path branches over it instead of dispatching through
//! trait objects, so construction, extraction and branching cannot
//! disagree about where the tag lives.
//!
//! # Crate Dependencies
//!
//! No dependency on the emission context (`sum_ir`). Layout planning is a
//! pure function of case metadata and [`LayoutConfig`].

mod cache;
mod case;
mod config;
pub mod interleave;
mod layout;
pub mod mask;
mod planner;

pub use cache::LayoutCache;
pub use case::{
    integer_align, CaseDecl, CaseDescriptor, CaseId, CaseRepr, ScalarRepr, UnionDecl, UnionId,
};
pub use config::{LayoutConfig, MAX_SCALAR_BITS};
pub use interleave::{deinterleave, interleave};
pub use layout::{MemoryLayout, RepresentationKind, Storage, TagField, UnionLayout};
pub use mask::{width_mask, SpareBitsMask, SpareByte};
pub use planner::{tag_bits_for, LayoutPlanner};

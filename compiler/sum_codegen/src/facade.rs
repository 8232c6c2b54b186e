//! Union codegen keyed by [`UnionId`].
//!
//! Resolves each request's layout through a shared [`LayoutCache`], so a
//! code generation pass can work with union handles instead of carrying
//! planned layouts around.

use std::sync::Arc;

use sum_ir::{BlockId, IrBuilder, ValueId};
use sum_layout::{CaseId, LayoutCache, UnionId, UnionLayout};

use crate::error::{Result, UnionCodegenError};
use crate::Explosion;

/// Borrowing front end over a [`LayoutCache`].
#[derive(Clone, Copy)]
pub struct UnionCodegen<'c> {
    cache: &'c LayoutCache,
}

impl<'c> UnionCodegen<'c> {
    pub fn new(cache: &'c LayoutCache) -> Self {
        Self { cache }
    }

    /// The layout of `union`, planning it on first use.
    pub fn layout(&self, union: UnionId) -> Result<Arc<UnionLayout>> {
        self.cache
            .layout(union)
            .ok_or(UnionCodegenError::UnknownUnion(union))
    }

    /// See [`inject_case`](crate::inject_case).
    pub fn inject(
        &self,
        ir: &mut IrBuilder,
        union: UnionId,
        case: CaseId,
        data: &[ValueId],
    ) -> Result<Explosion> {
        crate::inject_case(ir, &*self.layout(union)?, case, data)
    }

    /// See [`project_case`](crate::project_case).
    pub fn project(
        &self,
        ir: &mut IrBuilder,
        union: UnionId,
        value: &[ValueId],
        case: CaseId,
    ) -> Result<Explosion> {
        crate::project_case(ir, &*self.layout(union)?, value, case)
    }

    /// See [`dispatch`](crate::dispatch).
    pub fn dispatch(
        &self,
        ir: &mut IrBuilder,
        union: UnionId,
        value: &[ValueId],
        dests: &[(CaseId, BlockId)],
        default: BlockId,
    ) -> Result<()> {
        crate::dispatch(ir, &*self.layout(union)?, value, dests, default)
    }

    /// See [`project_address_for_store`](crate::project_address_for_store).
    pub fn project_address_for_store(
        &self,
        ir: &mut IrBuilder,
        union: UnionId,
        address: ValueId,
        case: CaseId,
    ) -> Result<ValueId> {
        crate::project_address_for_store(ir, &*self.layout(union)?, address, case)
    }

    /// See [`store_tag`](crate::store_tag).
    pub fn store_tag(
        &self,
        ir: &mut IrBuilder,
        union: UnionId,
        address: ValueId,
        case: CaseId,
    ) -> Result<()> {
        crate::store_tag(ir, &*self.layout(union)?, address, case)
    }

    /// See [`load_union`](crate::load_union).
    pub fn load(&self, ir: &mut IrBuilder, union: UnionId, address: ValueId) -> Result<Explosion> {
        crate::load_union(ir, &*self.layout(union)?, address)
    }

    /// See [`store_union`](crate::store_union).
    pub fn store(
        &self,
        ir: &mut IrBuilder,
        union: UnionId,
        address: ValueId,
        value: &[ValueId],
    ) -> Result<()> {
        crate::store_union(ir, &*self.layout(union)?, address, value)
    }
}

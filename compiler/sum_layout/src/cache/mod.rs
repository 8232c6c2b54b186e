//! Memoized layouts for the union types of one compilation unit.
//!
//! Declarations are registered up front (`&mut self`); layouts are planned
//! lazily on first request and then shared as `Arc<UnionLayout>`.
//!
//! # Thread Safety
//!
//! Planned layouts sit behind a `parking_lot::RwLock`. The first request
//! for a type plans it outside the lock and publishes the result under
//! the write lock; if another thread published first, its layout wins and
//! ours is dropped. Once published a layout is never replaced, so readers
//! only ever observe a finished, frozen descriptor.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::case::{UnionDecl, UnionId};
use crate::config::LayoutConfig;
use crate::layout::UnionLayout;
use crate::planner::LayoutPlanner;

/// Union declarations plus their lazily planned layouts.
pub struct LayoutCache {
    planner: LayoutPlanner,
    decls: Vec<UnionDecl>,
    layouts: RwLock<FxHashMap<UnionId, Arc<UnionLayout>>>,
}

impl LayoutCache {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            planner: LayoutPlanner::new(config),
            decls: Vec::new(),
            layouts: RwLock::new(FxHashMap::default()),
        }
    }

    /// Register a union declaration and return its handle.
    pub fn register(&mut self, decl: UnionDecl) -> UnionId {
        let id = UnionId::new(u32::try_from(self.decls.len()).unwrap_or(u32::MAX));
        self.decls.push(decl);
        id
    }

    /// The declaration behind a handle.
    pub fn decl(&self, id: UnionId) -> Option<&UnionDecl> {
        self.decls.get(id.index())
    }

    /// Find a registered union by name.
    pub fn lookup(&self, name: &str) -> Option<UnionId> {
        self.decls
            .iter()
            .position(|d| d.name == name)
            .and_then(|i| u32::try_from(i).ok())
            .map(UnionId::new)
    }

    /// Handles of every registered union, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = UnionId> + '_ {
        (0..self.decls.len())
            .filter_map(|i| u32::try_from(i).ok())
            .map(UnionId::new)
    }

    /// Number of registered unions.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Number of unions whose layout has been planned so far.
    pub fn planned_count(&self) -> usize {
        self.layouts.read().len()
    }

    #[inline]
    pub fn planner(&self) -> &LayoutPlanner {
        &self.planner
    }

    /// The layout of a registered union, planning it on first use.
    ///
    /// Returns `None` for an unregistered handle.
    pub fn layout(&self, id: UnionId) -> Option<Arc<UnionLayout>> {
        if let Some(layout) = self.layouts.read().get(&id) {
            return Some(Arc::clone(layout));
        }

        let decl = self.decls.get(id.index())?;
        let planned = Arc::new(self.planner.plan(decl));

        let mut layouts = self.layouts.write();
        let layout = layouts.entry(id).or_insert_with(|| {
            trace!(union = %decl.name, id = id.raw(), "caching union layout");
            planned
        });
        Some(Arc::clone(layout))
    }
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

//! Command handlers for the `sumc` CLI.
//!
//! Each submodule implements one command. The `*_file` entry points read
//! the input, print to stdout and exit with status 1 on failure; the
//! functions they wrap return their output so tests can inspect it.

use std::sync::Arc;

use sum_layout::{LayoutCache, UnionLayout};

use crate::parse::parse_unions;
use crate::{DriverError, DriverOptions};

mod check;
mod emit;
mod layout;

pub use check::{check_file, check_union, CheckReport};
pub use emit::{emit_file, emit_union};
pub use layout::{layout_file, LayoutReport};

/// Parse `source`, register every union and return the planned layouts
/// the options select, in declaration order.
pub fn plan_unions(
    source: &str,
    options: &DriverOptions,
) -> Result<Vec<Arc<UnionLayout>>, DriverError> {
    let mut cache = LayoutCache::new(options.layout);
    for decl in parse_unions(source, &options.layout)? {
        cache.register(decl);
    }
    let ids: Vec<_> = match &options.union {
        Some(name) => vec![cache
            .lookup(name)
            .ok_or_else(|| DriverError::UnknownUnion(name.clone()))?],
        None => cache.ids().collect(),
    };
    Ok(ids.into_iter().filter_map(|id| cache.layout(id)).collect())
}

/// Plan every union in the file at `path`.
pub fn plan_path(
    path: &str,
    options: &DriverOptions,
) -> Result<Vec<Arc<UnionLayout>>, DriverError> {
    let source = std::fs::read_to_string(path)?;
    plan_unions(&source, options)
}

/// [`plan_path`] for the CLI: failures go to stderr with exit status 1.
pub(super) fn plan_file(path: &str, options: &DriverOptions) -> Vec<Arc<UnionLayout>> {
    plan_path(path, options).unwrap_or_else(|e| {
        eprintln!("error: {path}: {e}");
        std::process::exit(1);
    })
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]

//! Layout planning: choose how a union's tag and payload share bits.
//!
//! The decision, in order:
//!
//! 1. One case: the union is a transparent wrapper around it.
//! 2. Otherwise the payload is as wide as the widest case. Positions no
//!    case ever uses are spare. If there are at least `ceil(log2(N))`
//!    spare positions, the tag is scattered into them and the union is no
//!    wider than its payload.
//! 3. Otherwise a dedicated `ceil(log2(N))`-bit tag field precedes the
//!    payload.
//!
//! Independently, a payload wider than the register limit (or any
//! address-only case) makes the union address-only.

use tracing::{debug, trace};

use crate::case::{integer_align, CaseDescriptor, CaseId, UnionDecl};
use crate::config::LayoutConfig;
use crate::layout::{MemoryLayout, RepresentationKind, Storage, TagField, UnionLayout};
use crate::mask::SpareBitsMask;

/// Computes [`UnionLayout`]s under a fixed [`LayoutConfig`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LayoutPlanner {
    config: LayoutConfig,
}

impl LayoutPlanner {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Plan the representation of `decl`.
    ///
    /// Deterministic in the case list and config; never fails.
    pub fn plan(&self, decl: &UnionDecl) -> UnionLayout {
        let cases: Vec<CaseDescriptor> = decl
            .cases
            .iter()
            .enumerate()
            .map(|(i, c)| CaseDescriptor {
                id: CaseId::new(u32::try_from(i).unwrap_or(u32::MAX)),
                name: c.name.clone(),
                repr: c.repr.clone(),
            })
            .collect();

        let payload_bits = cases
            .iter()
            .map(|c| c.repr.bit_width())
            .max()
            .unwrap_or(0);
        let payload_bytes = cases.iter().map(|c| c.repr.byte_size()).max().unwrap_or(0);
        let payload_align = cases.iter().map(|c| c.repr.align()).max().unwrap_or(1);

        let footprint_bits = cases
            .iter()
            .filter(|c| c.repr.is_address_only())
            .map(|c| c.repr.bit_width())
            .max();
        let spare_bits = match footprint_bits {
            Some(bits) if bits >= payload_bits => SpareBitsMask::default(),
            _ => cases.iter().fold(SpareBitsMask::all_set(payload_bits), |acc, c| {
                acc.intersect(&c.repr.unused_mask(payload_bits))
            }),
        };

        let (kind, tag_bits) = if cases.len() == 1 {
            (RepresentationKind::SingleCase, 0)
        } else {
            let needed = tag_bits_for(cases.len());
            if payload_bits > 0 && spare_bits.count_ones() >= needed {
                (RepresentationKind::SpareBits, needed)
            } else {
                (RepresentationKind::TagPlusPayload, needed)
            }
        };

        let address_only = cases.iter().any(|c| c.repr.is_address_only())
            || payload_bits > self.config.register_limit()
            || tag_bits > self.config.register_limit();
        let storage = if address_only {
            Storage::AddressOnly
        } else {
            Storage::Loadable
        };

        let memory = memory_layout(kind, tag_bits, payload_bytes, payload_align);

        debug!(
            union = %decl.name,
            cases = cases.len(),
            %kind,
            %storage,
            tag_bits,
            payload_bits,
            spare = spare_bits.count_ones(),
            size = memory.size,
            "planned union layout"
        );
        trace!(union = %decl.name, spare_mask = %spare_bits, "spare bits");

        UnionLayout {
            name: decl.name.clone(),
            cases,
            kind,
            storage,
            tag_bits,
            payload_bits,
            spare_bits,
            memory,
        }
    }
}

/// Bits needed to distinguish `count` cases: `ceil(log2(count))`.
pub fn tag_bits_for(count: usize) -> u32 {
    if count <= 1 {
        0
    } else {
        usize::BITS - (count - 1).leading_zeros()
    }
}

/// Bytes of the memory field holding a `bits`-wide dedicated tag.
fn tag_field_bytes(bits: u32) -> u32 {
    integer_align(bits.div_ceil(8)).min(8)
}

/// `value` rounded up to a multiple of `align`. Sizes stay below 2^34
/// (a `u32` footprint plus a `u32` alignment), so `u64` cannot overflow.
fn align_to(value: u64, align: u32) -> u64 {
    let align = u64::from(align.max(1));
    value.div_ceil(align) * align
}

fn memory_layout(
    kind: RepresentationKind,
    tag_bits: u32,
    payload_bytes: u64,
    payload_align: u32,
) -> MemoryLayout {
    let (tag, payload_offset, align) = match kind {
        RepresentationKind::TagPlusPayload if tag_bits > 0 => {
            let bytes = tag_field_bytes(tag_bits);
            let align = bytes.max(payload_align);
            (
                Some(TagField { offset: 0, bytes }),
                align_to(u64::from(bytes), payload_align),
                align,
            )
        }
        RepresentationKind::SingleCase
        | RepresentationKind::TagPlusPayload
        | RepresentationKind::SpareBits => (None, 0, payload_align),
    };
    MemoryLayout {
        tag,
        payload_offset,
        payload_bytes,
        size: align_to(payload_offset + payload_bytes, align),
        align,
    }
}

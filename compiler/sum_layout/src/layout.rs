//! The planned representation of a union type.
//!
//! A [`UnionLayout`] is computed once per union by the
//! [`LayoutPlanner`](crate::LayoutPlanner) and never mutated afterwards.
//! Every codegen path (injection, projection, dispatch, address access)
//! reads the same descriptor, which keeps them bit-for-bit consistent.

use std::fmt;

use smallvec::SmallVec;

use crate::case::{CaseDescriptor, CaseId};
use crate::interleave::interleave;
use crate::mask::SpareBitsMask;

/// How the tag and payload share the union's bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum RepresentationKind {
    /// Exactly one case: the union is its associated value, no tag.
    SingleCase,
    /// A dedicated tag field ahead of a payload wide enough for every case.
    TagPlusPayload,
    /// The tag lives in payload bits no case uses.
    SpareBits,
}

/// Where values of the union can live.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Storage {
    /// Representable as a short list of integer scalars.
    Loadable,
    /// Only addressable in memory.
    AddressOnly,
}

/// The dedicated tag field of a `TagPlusPayload` union in memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TagField {
    /// Byte offset from the start of the union.
    pub offset: u32,
    /// Size of the field in bytes (1, 2, 4 or 8).
    pub bytes: u32,
}

/// Byte-level layout of the union in memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryLayout {
    /// The dedicated tag field, if any.
    pub tag: Option<TagField>,
    /// Offset at which every case's payload starts.
    pub payload_offset: u64,
    /// Bytes reserved for the payload: the largest case's footprint.
    pub payload_bytes: u64,
    /// Total size in bytes (a multiple of `align`).
    pub size: u64,
    /// Alignment in bytes.
    pub align: u32,
}

/// Planned representation of one union type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct UnionLayout {
    pub(crate) name: String,
    pub(crate) cases: Vec<CaseDescriptor>,
    pub(crate) kind: RepresentationKind,
    pub(crate) storage: Storage,
    pub(crate) tag_bits: u32,
    pub(crate) payload_bits: u32,
    pub(crate) spare_bits: SpareBitsMask,
    pub(crate) memory: MemoryLayout,
}

impl UnionLayout {
    /// Name of the union type.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cases in discriminant order.
    #[inline]
    pub fn cases(&self) -> &[CaseDescriptor] {
        &self.cases
    }

    /// Look up a case. `None` if the ID is outside the closed case set.
    #[inline]
    pub fn case(&self, id: CaseId) -> Option<&CaseDescriptor> {
        self.cases.get(id.index())
    }

    /// Look up a case by name.
    pub fn case_named(&self, name: &str) -> Option<&CaseDescriptor> {
        self.cases.iter().find(|c| c.name == name)
    }

    #[inline]
    pub fn kind(&self) -> RepresentationKind {
        self.kind
    }

    #[inline]
    pub fn storage(&self) -> Storage {
        self.storage
    }

    /// True if the union can be held in registers.
    #[inline]
    pub fn is_loadable(&self) -> bool {
        self.storage == Storage::Loadable
    }

    /// Bits of tag information: the dedicated field width for
    /// `TagPlusPayload`, the number of spare bits that encode the
    /// discriminant for `SpareBits`, zero for `SingleCase`.
    #[inline]
    pub fn tag_bits(&self) -> u32 {
        self.tag_bits
    }

    /// Width of the payload: the widest case.
    #[inline]
    pub fn payload_bits(&self) -> u32 {
        self.payload_bits
    }

    /// Payload positions unused by every case.
    ///
    /// Covers `payload_bits` positions, except when an address-only
    /// footprint is the widest case: nothing is spare then and the mask is
    /// empty.
    #[inline]
    pub fn spare_bits(&self) -> &SpareBitsMask {
        &self.spare_bits
    }

    #[inline]
    pub fn memory(&self) -> &MemoryLayout {
        &self.memory
    }

    /// Widths of the scalars in the union's register representation, in
    /// order.
    ///
    /// - `SingleCase`: the sole case's scalars.
    /// - `TagPlusPayload`: `[tag, payload]`, payload omitted when empty.
    /// - `SpareBits`: `[payload]`.
    pub fn explosion_widths(&self) -> SmallVec<[u32; 2]> {
        match self.kind {
            RepresentationKind::SingleCase => self
                .cases
                .first()
                .map(|c| c.repr.fields().iter().map(|f| f.bits).collect())
                .unwrap_or_default(),
            RepresentationKind::TagPlusPayload => [self.tag_bits, self.payload_bits]
                .into_iter()
                .filter(|&w| w > 0)
                .collect(),
            RepresentationKind::SpareBits => SmallVec::from_slice(&[self.payload_bits]),
        }
    }

    /// Total width of the register representation.
    pub fn loadable_bits(&self) -> u32 {
        self.explosion_widths().iter().sum()
    }

    /// The discriminant of a case as an integer.
    #[inline]
    pub fn discriminant(&self, id: CaseId) -> u64 {
        u64::from(id.raw())
    }

    /// The bits a case sets in the spare positions: the discriminant
    /// interleaved with an all-zero occupied value. Only meaningful for
    /// `SpareBits` layouts of at most 128 bits.
    pub fn spare_tag_pattern(&self, id: CaseId) -> u128 {
        interleave(&self.spare_bits, 0, self.discriminant(id))
    }
}

impl fmt::Display for RepresentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SingleCase => "single-case",
            Self::TagPlusPayload => "tag+payload",
            Self::SpareBits => "spare-bits",
        })
    }
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Loadable => "loadable",
            Self::AddressOnly => "address-only",
        })
    }
}

//! Case metadata supplied by type resolution.
//!
//! Upstream hands the planner a [`UnionDecl`]: the closed, ordered list of
//! cases with their associated-value representations. Discriminants are
//! assigned by declaration order and never change afterwards.

use std::fmt;

use smallvec::SmallVec;

use crate::mask::{width_mask, SpareBitsMask};

// ── ID newtypes ─────────────────────────────────────────────────────

/// Discriminant index of a case within its union (`0..N`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct CaseId(u32);

impl CaseId {
    /// Create a case ID from a raw discriminant.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a registered union type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct UnionId(u32);

impl UnionId {
    /// Create a union ID from a raw index.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ── Scalar and case representations ─────────────────────────────────

/// One register-sized scalar of a case's associated value.
///
/// `unused` marks bits of the scalar that are never set in any valid
/// value (alignment bits of a pointer, high bits of a boolean byte). Those
/// positions are candidates for spare bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalarRepr {
    /// Width in bits, `1..=128`.
    pub bits: u32,
    /// Bits (within `bits`) that are always zero.
    pub unused: u128,
}

impl ScalarRepr {
    /// A plain integer with every bit live.
    pub fn int(bits: u32) -> Self {
        Self { bits, unused: 0 }
    }

    /// A boolean stored in a byte: only bit 0 is live.
    pub fn bool_byte() -> Self {
        Self {
            bits: 8,
            unused: 0xFE,
        }
    }

    /// A pointer of `bits` width aligned to `align` bytes: its low
    /// `log2(align)` bits are always zero.
    pub fn pointer(bits: u32, align: u32) -> Self {
        let low = align.max(1).trailing_zeros().min(bits);
        Self {
            bits,
            unused: width_mask(low),
        }
    }

    /// An integer with an explicit unused-bit mask.
    pub fn with_unused(bits: u32, unused: u128) -> Self {
        Self {
            bits,
            unused: unused & width_mask(bits),
        }
    }

    /// Bits that may carry data.
    #[inline]
    pub fn live(self) -> u128 {
        !self.unused & width_mask(self.bits)
    }
}

/// Associated-value representation of a single case.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum CaseRepr {
    /// No associated value.
    Empty,
    /// Associated value exploded into scalars, packed low-to-high in order.
    Loadable(SmallVec<[ScalarRepr; 2]>),
    /// Associated value that only exists in memory.
    AddressOnly {
        /// Size in bytes.
        size: u32,
        /// Alignment in bytes (a power of two).
        align: u32,
    },
}

impl CaseRepr {
    /// A loadable representation from a list of scalars.
    pub fn scalars(fields: impl IntoIterator<Item = ScalarRepr>) -> Self {
        let fields: SmallVec<[ScalarRepr; 2]> = fields.into_iter().collect();
        if fields.is_empty() {
            Self::Empty
        } else {
            Self::Loadable(fields)
        }
    }

    /// Width of the associated value in bits (memory footprint for
    /// address-only cases, saturating at `u32::MAX`).
    pub fn bit_width(&self) -> u32 {
        match self {
            Self::Empty => 0,
            Self::Loadable(fields) => fields.iter().fold(0, |acc, f| acc.saturating_add(f.bits)),
            Self::AddressOnly { size, .. } => size.saturating_mul(8),
        }
    }

    /// Bytes the associated value occupies in memory.
    pub fn byte_size(&self) -> u64 {
        match self {
            Self::Empty => 0,
            Self::Loadable(_) => u64::from(self.bit_width().div_ceil(8)),
            Self::AddressOnly { size, .. } => u64::from(*size),
        }
    }

    /// The scalar fields of a loadable case; empty otherwise.
    pub fn fields(&self) -> &[ScalarRepr] {
        match self {
            Self::Loadable(fields) => fields,
            Self::Empty | Self::AddressOnly { .. } => &[],
        }
    }

    /// True for cases that can only live in memory.
    pub fn is_address_only(&self) -> bool {
        matches!(self, Self::AddressOnly { .. })
    }

    /// Required alignment of the packed value in memory, in bytes.
    pub fn align(&self) -> u32 {
        match self {
            Self::Empty => 1,
            Self::Loadable(_) => integer_align(self.bit_width().div_ceil(8)),
            Self::AddressOnly { align, .. } => (*align).max(1),
        }
    }

    /// Positions of a `width`-bit payload this case never uses.
    ///
    /// Bits above the case's own width are unused, as are the declared
    /// unused bits of each scalar. Address-only cases use every bit of
    /// their footprint.
    pub fn unused_mask(&self, width: u32) -> SpareBitsMask {
        let mut mask = SpareBitsMask::all_set(width);
        match self {
            Self::Empty => {}
            Self::Loadable(fields) => {
                let mut offset = 0u32;
                for field in fields {
                    for bit in 0..field.bits {
                        if (field.unused >> bit) & 1 == 0 {
                            mask.clear(offset + bit);
                        }
                    }
                    offset += field.bits;
                }
            }
            Self::AddressOnly { .. } => mask.clear_below(self.bit_width()),
        }
        mask
    }
}

/// Natural alignment for an integer of `bytes` bytes, capped at 16.
pub fn integer_align(bytes: u32) -> u32 {
    bytes.max(1).next_power_of_two().min(16)
}

// ── Declarations ────────────────────────────────────────────────────

/// A case as declared by the front end.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct CaseDecl {
    pub name: String,
    pub repr: CaseRepr,
}

impl CaseDecl {
    pub fn new(name: impl Into<String>, repr: CaseRepr) -> Self {
        Self {
            name: name.into(),
            repr,
        }
    }

    /// A case without associated data.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, CaseRepr::Empty)
    }
}

/// A union type as declared by the front end: closed and ordered.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct UnionDecl {
    pub name: String,
    pub cases: Vec<CaseDecl>,
}

impl UnionDecl {
    pub fn new(name: impl Into<String>, cases: Vec<CaseDecl>) -> Self {
        Self {
            name: name.into(),
            cases,
        }
    }
}

/// A case after planning: declaration plus its stable discriminant.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct CaseDescriptor {
    pub id: CaseId,
    pub name: String,
    pub repr: CaseRepr,
}

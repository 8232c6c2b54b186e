//! Target policy consulted by the layout planner.

use crate::case::ScalarRepr;

/// Widest integer the emission context supports.
pub const MAX_SCALAR_BITS: u32 = 128;

/// Register-size and pointer policy of the compilation target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Widest payload (in bits) still kept in registers. Wider payloads
    /// make the union address-only. Clamped to [`MAX_SCALAR_BITS`].
    pub max_loadable_bits: u32,
    /// Pointer width in bits.
    pub pointer_bits: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_loadable_bits: MAX_SCALAR_BITS,
            pointer_bits: 64,
        }
    }
}

impl LayoutConfig {
    /// The effective register limit.
    #[inline]
    pub fn register_limit(&self) -> u32 {
        self.max_loadable_bits.min(MAX_SCALAR_BITS)
    }

    /// A naturally aligned pointer scalar for this target.
    pub fn pointer_scalar(&self) -> ScalarRepr {
        ScalarRepr::pointer(self.pointer_bits, self.pointer_bits / 8)
    }
}

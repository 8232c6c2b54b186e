//! Flat little-endian byte memory.

use super::InterpError;

/// Zero-initialized byte-addressed memory. Address `0` is the first byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    /// Create `size` zeroed bytes.
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
        }
    }

    /// Wrap existing contents.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn range(&self, addr: u64, len: usize) -> Result<std::ops::Range<usize>, InterpError> {
        let out_of_bounds = || InterpError::OutOfBounds {
            addr,
            len,
            size: self.bytes.len(),
        };
        let start = usize::try_from(addr).map_err(|_| out_of_bounds())?;
        let end = start.checked_add(len).ok_or_else(out_of_bounds)?;
        if end > self.bytes.len() {
            return Err(out_of_bounds());
        }
        Ok(start..end)
    }

    /// Borrow `len` bytes starting at `addr`.
    pub fn read(&self, addr: u64, len: usize) -> Result<&[u8], InterpError> {
        let range = self.range(addr, len)?;
        Ok(&self.bytes[range])
    }

    /// Overwrite bytes starting at `addr`.
    pub fn write(&mut self, addr: u64, data: &[u8]) -> Result<(), InterpError> {
        let range = self.range(addr, data.len())?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }

    /// Load a `bits`-wide integer from `ceil(bits / 8)` little-endian bytes.
    /// Bits above `bits` in the last byte are discarded.
    pub fn load_int(&self, addr: u64, bits: u32) -> Result<u128, InterpError> {
        let raw = self.read(addr, byte_len(bits))?;
        let mut buf = [0u8; 16];
        buf[..raw.len()].copy_from_slice(raw);
        Ok(u128::from_le_bytes(buf) & crate::builder::width_mask(bits))
    }

    /// Store the low `bits` of `value` into `ceil(bits / 8)` little-endian
    /// bytes. Padding bits in the last byte are written as zero.
    pub fn store_int(&mut self, addr: u64, bits: u32, value: u128) -> Result<(), InterpError> {
        let value = value & crate::builder::width_mask(bits);
        let len = byte_len(bits);
        self.write(addr, &value.to_le_bytes()[..len])
    }
}

/// Bytes needed to hold `bits`.
#[inline]
pub(crate) fn byte_len(bits: u32) -> usize {
    (bits.div_ceil(8) as usize).min(16)
}

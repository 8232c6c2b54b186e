use super::{deinterleave, interleave};
use crate::mask::{width_mask, SpareBitsMask};

#[test]
fn doc_example() {
    let mask = SpareBitsMask::from_u128(8, 0b1010_0100);
    assert_eq!(interleave(&mask, 0b0101_1011, 0b101), 0b1101_1111);
}

#[test]
fn clear_mask_returns_occupied() {
    let mask = SpareBitsMask::new(16);
    assert_eq!(interleave(&mask, 0xBEEF, 0xFFFF), 0xBEEF);
}

#[test]
fn full_mask_returns_spare() {
    let mask = SpareBitsMask::all_set(8);
    assert_eq!(interleave(&mask, 0xFF, 0x3C), 0x3C);
}

#[test]
fn spare_is_consumed_by_rank_not_position() {
    // Only position 7 is spare: spare bit 0 lands there.
    let mask = SpareBitsMask::from_u128(8, 0b1000_0000);
    assert_eq!(interleave(&mask, 0, 1), 0b1000_0000);
    assert_eq!(interleave(&mask, 0, 0b10), 0);
}

#[test]
fn spare_positions_override_occupied() {
    let mask = SpareBitsMask::from_u128(8, 0b0000_0011);
    assert_eq!(interleave(&mask, 0b1111_1111, 0b01), 0b1111_1101);
}

#[test]
fn result_is_confined_to_width() {
    let mask = SpareBitsMask::from_u128(4, 0b1000);
    assert_eq!(interleave(&mask, 0xFF, 1), 0xF);
}

#[test]
fn full_width_128() {
    let mut mask = SpareBitsMask::new(128);
    mask.set(127);
    let combined = interleave(&mask, 1, 1);
    assert_eq!(combined, (1u128 << 127) | 1);
    assert_eq!(deinterleave(&mask, combined), (1, 1));
}

#[test]
fn deinterleave_doc_example() {
    let mask = SpareBitsMask::from_u128(8, 0b1010_0100);
    assert_eq!(deinterleave(&mask, 0b1101_1111), (0b0101_1011, 0b101));
}

mod proptest_interleave {
    use proptest::prelude::*;

    use super::super::{deinterleave, interleave};
    use crate::mask::{width_mask, SpareBitsMask};

    proptest! {
        #[test]
        fn clear_positions_keep_occupied(
            width in 1u32..=128,
            mask_bits in any::<u128>(),
            occupied in any::<u128>(),
            spare in any::<u64>(),
        ) {
            let mask = SpareBitsMask::from_u128(width, mask_bits);
            let clear = !mask_bits & width_mask(width);
            let combined = interleave(&mask, occupied, spare);
            prop_assert_eq!(combined & clear, occupied & clear);
        }

        #[test]
        fn set_positions_carry_spare_in_order(
            width in 1u32..=128,
            mask_bits in any::<u128>(),
            occupied in any::<u128>(),
            spare in any::<u64>(),
        ) {
            let mask = SpareBitsMask::from_u128(width, mask_bits);
            let combined = interleave(&mask, occupied, spare);
            for (rank, bit) in mask.iter_set().enumerate() {
                let expected = rank < 64 && (spare >> rank) & 1 == 1;
                prop_assert_eq!((combined >> bit) & 1 == 1, expected);
            }
        }

        #[test]
        fn inversion_recovers_inputs(
            width in 1u32..=128,
            mask_bits in any::<u128>(),
            occupied in any::<u128>(),
            spare in any::<u64>(),
        ) {
            let mask = SpareBitsMask::from_u128(width, mask_bits);
            let spare_count = mask.count_ones().min(64);
            let spare = if spare_count == 64 { spare } else { spare & ((1u64 << spare_count) - 1) };
            let occupied_only = occupied & mask.occupied_u128().unwrap_or(0);
            let combined = interleave(&mask, occupied, spare);
            prop_assert_eq!(deinterleave(&mask, combined), (occupied_only, spare));
        }
    }
}

#[test]
fn byte_scatter_agrees_with_interleave() {
    let mask = SpareBitsMask::from_u128(24, 0x80_0F_01);
    let combined = interleave(&mask, 0, 0b11_0101);
    for byte in mask.scatter_bytes(0b11_0101) {
        let shifted = combined >> (byte.index * 8);
        #[expect(clippy::cast_possible_truncation, reason = "extracting one byte")]
        let actual = (shifted & 0xFF) as u8;
        assert_eq!(actual, byte.value);
    }
    assert_eq!(combined & !width_mask(24), 0);
}

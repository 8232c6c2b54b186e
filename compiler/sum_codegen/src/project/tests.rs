use pretty_assertions::assert_eq;
use sum_ir::{IrType, Val};
use sum_layout::CaseId;

use super::*;
use crate::error::UnionCodegenError;
use crate::inject_case;
use crate::test_helpers::{abc, blob, bools, builder, exec, int_params, opt_ptr, wrapper};

/// Inject `case` from parameters, project it straight back, return the
/// projected values.
fn round_trip(layout: &UnionLayout, case: u32, params: &[IrType], args: &[Val]) -> Vec<Val> {
    let (mut irb, data) = builder(params);
    let case = CaseId::new(case);
    let value = inject_case(&mut irb, layout, case, &data).unwrap();
    let back = project_case(&mut irb, layout, &value, case).unwrap();
    irb.ret(&back);
    assert_eq!(irb.codegen_error_count(), 0);
    exec(&irb.finish(), args).unwrap().values
}

#[test]
fn dedicated_tag_round_trip() {
    let layout = abc();
    let args = [Val::int(8, 0xFF)];
    assert_eq!(round_trip(&layout, 1, &int_params(&[8]), &args), args);
    let args = [Val::int(32, 0xDEAD_BEEF)];
    assert_eq!(round_trip(&layout, 2, &int_params(&[32]), &args), args);
    assert_eq!(round_trip(&layout, 0, &[], &[]), vec![]);
}

#[test]
fn spare_bits_are_masked_off() {
    let layout = opt_ptr();
    let args = [Val::int(64, 0x7FFF_0000_1000)];
    assert_eq!(round_trip(&layout, 0, &int_params(&[64]), &args), args);

    let layout = bools();
    for (case, bit) in [(0, 1), (1, 0), (1, 1)] {
        let args = [Val::int(8, bit)];
        assert_eq!(round_trip(&layout, case, &int_params(&[8]), &args), args);
    }
}

#[test]
fn projection_ignores_foreign_tag_bits() {
    // A raw byte with spare bits set still projects to the data bit.
    let layout = bools();
    let (mut irb, raw) = builder(&int_params(&[8]));
    let back = project_case(&mut irb, &layout, &raw, CaseId::new(1)).unwrap();
    irb.ret(&back);
    let out = exec(&irb.finish(), &[Val::int(8, 0b1111_0111)]).unwrap();
    assert_eq!(out.values, vec![Val::int(8, 1)]);
}

#[test]
fn single_case_round_trip_is_identity() {
    let layout = wrapper();
    let args = [Val::int(8, 0x7A), Val::int(32, 0x0102_0304)];
    assert_eq!(round_trip(&layout, 0, &int_params(&[8, 32]), &args), args);
}

#[test]
fn explosion_shape_is_checked() {
    let layout = abc();
    let (mut irb, value) = builder(&int_params(&[2, 16]));
    assert_eq!(
        project_case(&mut irb, &layout, &value, CaseId::new(1)),
        Err(UnionCodegenError::ExplosionMismatch {
            union: "ABC".to_owned(),
            expected: vec![2, 32],
            found: vec![Some(2), Some(16)]
        })
    );
}

#[test]
fn address_only_unions_cannot_be_projected() {
    let layout = blob();
    let (mut irb, value) = builder(&int_params(&[1]));
    assert!(matches!(
        project_case(&mut irb, &layout, &value, CaseId::new(1)),
        Err(UnionCodegenError::NotLoadable { .. })
    ));
}

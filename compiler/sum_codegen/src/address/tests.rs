use pretty_assertions::assert_eq;
use sum_ir::{run, Function, InterpConfig, Memory, Outcome, Val};

use super::*;
use crate::test_helpers::{abc, blob, bools, builder, int_params, opt_ptr, wrapper};
use crate::{dispatch, project_case};

fn run_in(func: &Function, args: &[Val], memory: &mut Memory) -> Outcome {
    run(func, args, memory, &InterpConfig::default()).unwrap()
}

/// `fn(p: ptr, data...)`: store `case`'s data through the projected
/// address, then store its tag.
fn initialize(layout: &UnionLayout, case: u32, widths: &[u32]) -> Function {
    let mut params = vec![IrType::Ptr];
    params.extend(int_params(widths));
    let (mut irb, args) = builder(&params);
    let case = CaseId::new(case);
    let slot = project_address_for_store(&mut irb, layout, args[0], case).unwrap();
    if !widths.is_empty() {
        let mut packer = PayloadPacker::new(widths.iter().sum());
        for &v in &args[1..] {
            packer.add(&mut irb, v).unwrap();
        }
        let packed = packer.get(&mut irb).unwrap();
        irb.store(slot, packed);
    }
    store_tag(&mut irb, layout, args[0], case).unwrap();
    irb.ret(&[]);
    assert_eq!(irb.codegen_error_count(), 0);
    irb.finish()
}

/// `fn(p: ptr)`: load the union, dispatch on it, and in each case's block
/// return the projected data.
fn read_back(layout: &UnionLayout) -> Function {
    let (mut irb, args) = builder(&[IrType::Ptr]);
    let entry = irb.current_block().unwrap();
    let default = irb.append_block("default");
    irb.position_at_end(default);
    irb.unreachable();

    irb.position_at_end(entry);
    let value = load_union(&mut irb, layout, args[0]).unwrap();
    let mut dests = Vec::new();
    for desc in layout.cases() {
        let block = irb.append_block(&desc.name);
        dests.push((desc.id, block));
    }
    dispatch(&mut irb, layout, &value, &dests, default).unwrap();
    for &(case, block) in &dests {
        irb.position_at_end(block);
        let data = project_case(&mut irb, layout, &value, case).unwrap();
        irb.ret(&data);
    }
    assert_eq!(irb.codegen_error_count(), 0);
    irb.finish()
}

#[test]
fn payload_follows_the_tag_field() {
    let layout = abc();
    let (mut irb, args) = builder(&[IrType::Ptr]);
    let slot = project_address_for_store(&mut irb, &layout, args[0], CaseId::new(2)).unwrap();
    irb.ret(&[]);
    let func = irb.finish();
    assert_eq!(layout.memory().payload_offset, 4);
    assert_eq!(
        func.blocks[0].body,
        vec![sum_ir::Instr::PtrOffset {
            dst: slot,
            base: args[0],
            bytes: 4
        }]
    );
}

#[test]
fn single_case_payload_is_the_union_address() {
    let layout = wrapper();
    let (mut irb, args) = builder(&[IrType::Ptr]);
    let slot = project_address_for_store(&mut irb, &layout, args[0], CaseId::new(0)).unwrap();
    assert_eq!(slot, args[0]);
    store_tag(&mut irb, &layout, args[0], CaseId::new(0)).unwrap();
    irb.ret(&[]);
    assert_eq!(irb.finish().instr_count(), 0);
}

#[test]
fn dedicated_tag_is_a_plain_store() {
    let layout = abc();
    let func = initialize(&layout, 1, &[8]);
    let mut memory = Memory::from_bytes(vec![0xEE; 8]);
    run_in(&func, &[Val::Ptr(0), Val::int(8, 0x5A)], &mut memory);
    assert_eq!(memory.bytes(), &[0x01, 0xEE, 0xEE, 0xEE, 0x5A, 0xEE, 0xEE, 0xEE]);
}

#[test]
fn spare_tag_store_preserves_payload_bits() {
    let layout = bools();
    let (mut irb, args) = builder(&[IrType::Ptr]);
    store_tag(&mut irb, &layout, args[0], CaseId::new(1)).unwrap();
    irb.ret(&[]);
    let func = irb.finish();

    let mut memory = Memory::from_bytes(vec![0x01]);
    run_in(&func, &[Val::Ptr(0)], &mut memory);
    assert_eq!(memory.bytes(), &[0x03]);

    let mut memory = Memory::from_bytes(vec![0xFF]);
    run_in(&func, &[Val::Ptr(0)], &mut memory);
    assert_eq!(memory.bytes(), &[0x03]);
}

#[test]
fn payload_then_tag_reads_back_every_case() {
    let cases: [(UnionLayout, u32, Vec<u32>, Vec<u128>); 6] = [
        (abc(), 0, vec![], vec![]),
        (abc(), 1, vec![8], vec![0xFF]),
        (abc(), 2, vec![32], vec![0x8000_0001]),
        (bools(), 1, vec![8], vec![1]),
        (bools(), 2, vec![], vec![]),
        (opt_ptr(), 0, vec![64], vec![0x0000_7F00_DEAD_BEE8]),
    ];
    for (layout, case, widths, values) in cases {
        let mut args = vec![Val::Ptr(16)];
        args.extend(widths.iter().zip(&values).map(|(&w, &v)| Val::int(w, v)));
        let mut memory = Memory::new(64);
        run_in(&initialize(&layout, case, &widths), &args, &mut memory);

        let reader = read_back(&layout);
        let out = run_in(&reader, &[Val::Ptr(16)], &mut memory);
        let desc = layout.case(CaseId::new(case)).unwrap();
        assert_eq!(out.ints(), values, "{} {}", layout.name(), desc.name);
        assert_eq!(
            reader.block(out.exit_block).map(|b| b.name.as_str()),
            Some(desc.name.as_str())
        );
    }
}

#[test]
fn address_only_union_in_memory() {
    let layout = blob();
    assert!(!layout.is_loadable());
    let func = initialize(&layout, 1, &[16]);
    let mut memory = Memory::new(72);
    run_in(&func, &[Val::Ptr(0), Val::int(16, 0xBEEF)], &mut memory);
    assert_eq!(layout.memory().payload_offset, 8);
    assert_eq!(memory.bytes()[0], 1);
    assert_eq!(&memory.bytes()[8..10], &[0xEF, 0xBE]);

    let (mut irb, args) = builder(&[IrType::Ptr]);
    assert!(matches!(
        load_union(&mut irb, &layout, args[0]),
        Err(UnionCodegenError::NotLoadable { operation: "load", .. })
    ));
}

#[test]
fn store_union_then_load_union() {
    let layout = abc();
    let (mut irb, args) = builder(&[IrType::Ptr, IrType::Int(2), IrType::Int(32)]);
    store_union(&mut irb, &layout, args[0], &args[1..]).unwrap();
    let back = load_union(&mut irb, &layout, args[0]).unwrap();
    irb.ret(&back);
    let func = irb.finish();

    let mut memory = Memory::new(8);
    let out = run_in(
        &func,
        &[Val::Ptr(0), Val::int(2, 2), Val::int(32, 0x0BAD_F00D)],
        &mut memory,
    );
    assert_eq!(out.values, vec![Val::int(2, 2), Val::int(32, 0x0BAD_F00D)]);
    assert_eq!(memory.bytes(), &[0x02, 0, 0, 0, 0x0D, 0xF0, 0xAD, 0x0B]);
}

#[test]
fn single_case_store_packs_fields() {
    let layout = wrapper();
    let (mut irb, args) = builder(&[IrType::Ptr, IrType::Int(8), IrType::Int(32)]);
    store_union(&mut irb, &layout, args[0], &args[1..]).unwrap();
    let back = load_union(&mut irb, &layout, args[0]).unwrap();
    irb.ret(&back);
    let func = irb.finish();

    let mut memory = Memory::new(8);
    let out = run_in(
        &func,
        &[Val::Ptr(0), Val::int(8, 0x11), Val::int(32, 0x2233_4455)],
        &mut memory,
    );
    assert_eq!(out.values, vec![Val::int(8, 0x11), Val::int(32, 0x2233_4455)]);
    assert_eq!(&memory.bytes()[..5], &[0x11, 0x55, 0x44, 0x33, 0x22]);
}

#[test]
fn non_pointer_address_is_rejected() {
    let layout = abc();
    let (mut irb, args) = builder(&int_params(&[64]));
    assert_eq!(
        store_tag(&mut irb, &layout, args[0], CaseId::new(0)),
        Err(UnionCodegenError::NotAddress { value: args[0] })
    );
    assert!(project_address_for_store(&mut irb, &layout, args[0], CaseId::new(0)).is_err());
}

use super::*;
use crate::IrBuilder;

fn run_default(func: &Function, args: &[Val]) -> Result<Outcome, InterpError> {
    let config = InterpConfig::default();
    let mut memory = Memory::for_config(&config);
    run(func, args, &mut memory, &config)
}

// -- Arithmetic --

#[test]
fn shifts_past_width_are_zero() {
    let mut irb = IrBuilder::new("f");
    let x = irb.add_param(IrType::Int(8));
    let entry = irb.append_block("entry");
    irb.position_at_end(entry);
    let eight = irb.const_int(8, 8);
    let three = irb.const_int(8, 3);
    let a = irb.shl(x, eight);
    let b = irb.shl(x, three);
    let c = irb.lshr(x, three);
    irb.ret(&[a, b, c]);
    let func = irb.finish();

    let out = run_default(&func, &[Val::int(8, 0xFF)]).unwrap();
    assert_eq!(out.ints(), vec![0, 0xF8, 0x1F]);
}

#[test]
fn trunc_and_zext_mask_values() {
    let mut irb = IrBuilder::new("f");
    let x = irb.add_param(IrType::Int(64));
    let entry = irb.append_block("entry");
    irb.position_at_end(entry);
    let t = irb.trunc(x, 12);
    let z = irb.zext(t, 128);
    irb.ret(&[t, z]);
    let func = irb.finish();

    let out = run_default(&func, &[Val::int(64, 0xABCD_1234)]).unwrap();
    assert_eq!(out.values[0], Val::Int { bits: 12, value: 0x234 });
    assert_eq!(out.values[1], Val::Int { bits: 128, value: 0x234 });
}

// -- Control flow --

#[test]
fn switch_picks_first_matching_case() {
    let mut irb = IrBuilder::new("f");
    let x = irb.add_param(IrType::Int(4));
    let entry = irb.append_block("entry");
    let one = irb.append_block("one");
    let two = irb.append_block("two");
    let other = irb.append_block("other");
    irb.position_at_end(entry);
    irb.switch(x, other, &[(1, one), (2, two), (2, one)]);
    for b in [one, two, other] {
        irb.position_at_end(b);
        irb.ret(&[]);
    }
    let func = irb.finish();

    let exit = |v| run_default(&func, &[Val::int(4, v)]).unwrap().exit_block;
    assert_eq!(exit(1), one);
    assert_eq!(exit(2), two);
    assert_eq!(exit(7), other);
}

#[test]
fn cond_br_follows_comparison() {
    let mut irb = IrBuilder::new("f");
    let x = irb.add_param(IrType::Int(16));
    let entry = irb.append_block("entry");
    let yes = irb.append_block("yes");
    let no = irb.append_block("no");
    irb.position_at_end(entry);
    let k = irb.const_int(16, 500);
    let eq = irb.icmp_eq(x, k);
    irb.cond_br(eq, yes, no);
    irb.position_at_end(yes);
    irb.ret(&[]);
    irb.position_at_end(no);
    irb.ret(&[]);
    let func = irb.finish();

    assert_eq!(run_default(&func, &[Val::int(16, 500)]).unwrap().exit_block, yes);
    assert_eq!(run_default(&func, &[Val::int(16, 501)]).unwrap().exit_block, no);
}

#[test]
fn infinite_loop_hits_step_limit() {
    let mut irb = IrBuilder::new("spin");
    let entry = irb.append_block("entry");
    irb.position_at_end(entry);
    irb.br(entry);
    let func = irb.finish();

    let config = InterpConfig {
        step_limit: 5,
        memory_bytes: 0,
    };
    let mut memory = Memory::for_config(&config);
    assert_eq!(
        run(&func, &[], &mut memory, &config),
        Err(InterpError::StepLimit(5))
    );
}

#[test]
fn unreachable_is_an_error() {
    let mut irb = IrBuilder::new("f");
    let entry = irb.append_block("entry");
    irb.position_at_end(entry);
    irb.unreachable();
    let func = irb.finish();
    assert_eq!(
        run_default(&func, &[]),
        Err(InterpError::Unreachable(entry))
    );
}

// -- Arguments --

#[test]
fn argument_checks() {
    let mut irb = IrBuilder::new("f");
    let _ = irb.add_param(IrType::Ptr);
    let entry = irb.append_block("entry");
    irb.position_at_end(entry);
    irb.ret(&[]);
    let func = irb.finish();

    assert_eq!(
        run_default(&func, &[]),
        Err(InterpError::ArgCount {
            expected: 1,
            found: 0
        })
    );
    assert_eq!(
        run_default(&func, &[Val::int(8, 0)]),
        Err(InterpError::ArgType {
            index: 0,
            expected: IrType::Ptr,
            found: IrType::Int(8)
        })
    );
}

// -- Memory --

#[test]
fn memory_is_little_endian() {
    let mut memory = Memory::new(8);
    memory.store_int(1, 24, 0x00AB_CDEF).unwrap();
    assert_eq!(memory.bytes(), &[0, 0xEF, 0xCD, 0xAB, 0, 0, 0, 0]);
    assert_eq!(memory.load_int(1, 16).unwrap(), 0xCDEF);
    assert_eq!(memory.load_int(2, 4).unwrap(), 0xD);
}

#[test]
fn odd_widths_round_up_to_whole_bytes() {
    let mut memory = Memory::from_bytes(vec![0xFF; 4]);
    memory.store_int(0, 9, 0x1FF).unwrap();
    assert_eq!(memory.bytes(), &[0xFF, 0x01, 0xFF, 0xFF]);
    assert_eq!(memory.load_int(0, 9).unwrap(), 0x1FF);
}

#[test]
fn out_of_bounds_access_fails() {
    let memory = Memory::new(4);
    assert_eq!(
        memory.load_int(2, 32),
        Err(InterpError::OutOfBounds {
            addr: 2,
            len: 4,
            size: 4
        })
    );
    assert!(memory.read(u64::MAX, 1).is_err());
    assert!(!memory.is_empty());
    assert_eq!(memory.len(), 4);
}

#[test]
fn store_then_load_through_function() {
    let mut irb = IrBuilder::new("f");
    let p = irb.add_param(IrType::Ptr);
    let x = irb.add_param(IrType::Int(32));
    let entry = irb.append_block("entry");
    irb.position_at_end(entry);
    let q = irb.ptr_offset(p, 4);
    irb.store(q, x);
    let back = irb.load(q, 32);
    let byte = irb.load(q, 8);
    irb.ret(&[back, byte]);
    let func = irb.finish();

    let mut memory = Memory::new(8);
    let out = run(
        &func,
        &[Val::Ptr(0), Val::int(32, 0x1122_3344)],
        &mut memory,
        &InterpConfig::default(),
    )
    .unwrap();
    assert_eq!(out.ints(), vec![0x1122_3344, 0x44]);
    assert_eq!(&memory.bytes()[4..], &[0x44, 0x33, 0x22, 0x11]);
}

//! `sumc check`: run the generated code in the interpreter.
//!
//! For every case and a handful of sample values that respect the case's
//! unused-bit masks:
//!
//! - loadable unions: inject, dispatch and project in one function; the
//!   returning block must be the case's and the values must come back
//!   unchanged.
//! - all unions: store the case through the address accessors into memory
//!   pre-filled with garbage, then decode the tag and payload from the
//!   bytes; loadable unions are also loaded, dispatched and projected.

use std::fmt;

use sum_codegen::{dispatch, inject_case, load_union, project_case};
use sum_ir::{run, Function, InterpConfig, IrBuilder, IrType, Memory, Outcome, Val, ValueId};
use sum_layout::{CaseDescriptor, RepresentationKind, UnionLayout};
use tracing::debug;

use super::emit::{field_types, finish, start, store_function};
use super::plan_file;
use crate::{DriverError, DriverOptions};

/// Byte written over the union's memory before each store.
const FILL: u8 = 0xA5;

/// Largest union footprint the checker will allocate.
const MAX_CHECK_BYTES: u64 = 1 << 20;

/// Per-field sample patterns, masked to each field's live bits.
const PATTERNS: [u128; 3] = [u128::MAX, 0x5555_5555_5555_5555_5555_5555_5555_5555, 0];

/// Outcome of checking one union.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub union: String,
    /// Comparisons made.
    pub checks: usize,
    /// One line per failed comparison.
    pub failures: Vec<String>,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    fn compare<T: PartialEq + fmt::Debug>(&mut self, case: &str, what: &str, expected: T, got: T) {
        self.checks += 1;
        if expected != got {
            self.failures.push(format!(
                "{}::{case}: {what}: expected {expected:?}, got {got:?}",
                self.union
            ));
        }
    }
}

/// Check every case of `layout`.
pub fn check_union(layout: &UnionLayout) -> Result<CheckReport, DriverError> {
    let config = InterpConfig::default();
    let mut report = CheckReport {
        union: layout.name().to_owned(),
        ..CheckReport::default()
    };
    let read_back = if layout.is_loadable() {
        Some(read_back_function(layout)?)
    } else {
        None
    };
    let size = layout.memory().size;
    let size = usize::try_from(size)
        .ok()
        .filter(|_| size <= MAX_CHECK_BYTES)
        .ok_or_else(|| DriverError::TooLargeToCheck {
            union: layout.name().to_owned(),
            size,
        })?;

    for case in layout.cases() {
        let round_trip = if layout.is_loadable() {
            Some(round_trip_function(layout, case)?)
        } else {
            None
        };
        let store = store_function(layout, case)?;

        for sample in samples(case) {
            let data: Vec<Val> = case
                .repr
                .fields()
                .iter()
                .zip(&sample)
                .map(|(f, &v)| Val::int(f.bits, v))
                .collect();

            if let Some(func) = &round_trip {
                let out = run(func, &data, &mut Memory::new(0), &config)?;
                let exit = exit_name(func, &out);
                report.compare(&case.name, "dispatch", Some(case.name.as_str()), exit);
                report.compare(&case.name, "round trip", sample.clone(), out.ints());
            }

            let mut memory = Memory::from_bytes(vec![FILL; size]);
            let mut args = vec![Val::Ptr(0)];
            args.extend(&data);
            run(&store, &args, &mut memory, &config)?;
            report.compare(
                &case.name,
                "stored tag",
                layout.discriminant(case.id),
                stored_discriminant(layout, &memory)?,
            );
            let bits = case.repr.bit_width();
            if !case.repr.fields().is_empty() {
                report.compare(
                    &case.name,
                    "stored payload",
                    pack(case, &sample),
                    stored_payload(layout, &memory, bits)?,
                );
            }

            if let Some(func) = &read_back {
                let out = run(func, &[Val::Ptr(0)], &mut memory, &config)?;
                let exit = exit_name(func, &out);
                report.compare(&case.name, "load dispatch", Some(case.name.as_str()), exit);
                report.compare(&case.name, "load", sample.clone(), out.ints());
            }
        }
    }

    debug!(
        union = layout.name(),
        checks = report.checks,
        failures = report.failures.len(),
        "checked union"
    );
    Ok(report)
}

/// Check every selected union in `path`; exit with status 1 on any failure.
pub fn check_file(path: &str, options: &DriverOptions) {
    let layouts = plan_file(path, options);
    let mut failed = false;
    let mut checks = 0;
    for layout in &layouts {
        match check_union(layout) {
            Ok(report) => {
                checks += report.checks;
                for failure in &report.failures {
                    eprintln!("FAIL: {failure}");
                }
                failed |= !report.passed();
            }
            Err(e) => {
                eprintln!("error: {}: {e}", layout.name());
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
    println!("OK: {path} ({} unions, {checks} checks)", layouts.len());
}

// ── Sample data ─────────────────────────────────────────────────────

fn samples(case: &CaseDescriptor) -> Vec<Vec<u128>> {
    let fields = case.repr.fields();
    if fields.is_empty() {
        return vec![Vec::new()];
    }
    PATTERNS
        .iter()
        .map(|&p| fields.iter().map(|f| f.live() & p).collect())
        .collect()
}

/// Field values packed low to high, as the payload integer holds them.
fn pack(case: &CaseDescriptor, values: &[u128]) -> u128 {
    let mut packed = 0u128;
    let mut offset = 0u32;
    for (field, &v) in case.repr.fields().iter().zip(values) {
        packed |= v.checked_shl(offset).unwrap_or(0);
        offset += field.bits;
    }
    packed
}

// ── Decoding memory ─────────────────────────────────────────────────

/// The discriminant stored in the union at address 0.
fn stored_discriminant(layout: &UnionLayout, memory: &Memory) -> Result<u64, DriverError> {
    match layout.kind() {
        RepresentationKind::SingleCase => Ok(0),
        RepresentationKind::TagPlusPayload => match layout.memory().tag {
            Some(tag) => {
                let raw = memory.load_int(u64::from(tag.offset), tag.bytes * 8)?;
                Ok(u64::try_from(raw).unwrap_or(u64::MAX))
            }
            None => Ok(0),
        },
        RepresentationKind::SpareBits => {
            let base = layout.memory().payload_offset;
            let mut value = 0u64;
            for (i, bit) in layout.spare_bits().iter_set().take(64).enumerate() {
                let byte = memory
                    .read(base + u64::from(bit / 8), 1)?
                    .first()
                    .copied()
                    .unwrap_or(0);
                if (byte >> (bit % 8)) & 1 == 1 {
                    value |= 1 << i;
                }
            }
            Ok(value)
        }
    }
}

/// The low `bits` of the stored payload with the spare positions cleared.
fn stored_payload(
    layout: &UnionLayout,
    memory: &Memory,
    bits: u32,
) -> Result<u128, DriverError> {
    let raw = memory.load_int(layout.memory().payload_offset, bits)?;
    let spare = layout
        .spare_bits()
        .iter_set()
        .take_while(|&bit| bit < bits)
        .fold(0u128, |mask, bit| mask | (1 << bit));
    Ok(raw & !spare)
}

// ── Check functions ─────────────────────────────────────────────────

fn exit_name<'f>(func: &'f Function, out: &Outcome) -> Option<&'f str> {
    func.block(out.exit_block).map(|b| b.name.as_str())
}

/// Dispatch `value` to one block per case; each block projects its own
/// case and returns the data.
fn dispatch_and_project(
    irb: &mut IrBuilder,
    layout: &UnionLayout,
    value: &[ValueId],
) -> Result<(), DriverError> {
    let entry = irb.current_block();
    let mut dests = Vec::with_capacity(layout.cases().len());
    for case in layout.cases() {
        let block = irb.append_block(&case.name);
        irb.position_at_end(block);
        let data = project_case(irb, layout, value, case.id)?;
        irb.ret(&data);
        dests.push((case.id, block));
    }
    let default = irb.append_block("default");
    irb.position_at_end(default);
    irb.unreachable();

    if let Some(entry) = entry {
        irb.position_at_end(entry);
    }
    dispatch(irb, layout, value, &dests, default)?;
    Ok(())
}

fn round_trip_function(
    layout: &UnionLayout,
    case: &CaseDescriptor,
) -> Result<Function, DriverError> {
    let name = format!("check_{}_{}", layout.name(), case.name);
    let (mut irb, data) = start(name, &field_types(case));
    let value = inject_case(&mut irb, layout, case.id, &data)?;
    dispatch_and_project(&mut irb, layout, &value)?;
    finish(irb)
}

fn read_back_function(layout: &UnionLayout) -> Result<Function, DriverError> {
    let name = format!("read_back_{}", layout.name());
    let (mut irb, args) = start(name, &[IrType::Ptr]);
    let value = load_union(&mut irb, layout, args[0])?;
    dispatch_and_project(&mut irb, layout, &value)?;
    finish(irb)
}

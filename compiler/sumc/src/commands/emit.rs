//! `sumc emit`: print the IR generated for each union.
//!
//! Per union, in order: one `inject_*` and `project_*` function per case
//! and one `dispatch_*` function (loadable unions only), then one
//! `store_*` function per case and, for loadable unions, `load_*`.

use sum_codegen::{
    dispatch, inject_case, load_union, project_address_for_store, project_case, store_tag,
    PayloadPacker,
};
use sum_ir::{Function, IrBuilder, IrType, ValueId};
use sum_layout::{CaseDescriptor, UnionLayout};
use tracing::debug;

use super::plan_file;
use crate::{DriverError, DriverOptions};

/// A builder for `name` with the given parameters, positioned at `entry`.
pub(super) fn start(name: String, params: &[IrType]) -> (IrBuilder, Vec<ValueId>) {
    let mut irb = IrBuilder::new(name);
    let args = params.iter().map(|&ty| irb.add_param(ty)).collect();
    let entry = irb.append_block("entry");
    irb.position_at_end(entry);
    (irb, args)
}

/// Finish `irb`, rejecting functions with malformed instructions.
pub(super) fn finish(irb: IrBuilder) -> Result<Function, DriverError> {
    let errors = irb.codegen_error_count();
    let func = irb.finish();
    if errors > 0 {
        return Err(DriverError::MalformedIr {
            function: func.name,
            errors,
        });
    }
    Ok(func)
}

/// Integer parameter types for a case's scalar fields.
pub(super) fn field_types(case: &CaseDescriptor) -> Vec<IrType> {
    case.repr.fields().iter().map(|f| IrType::Int(f.bits)).collect()
}

/// Integer types of the union's register representation.
pub(super) fn explosion_types(layout: &UnionLayout) -> Vec<IrType> {
    layout
        .explosion_widths()
        .iter()
        .map(|&w| IrType::Int(w))
        .collect()
}

fn inject_function(layout: &UnionLayout, case: &CaseDescriptor) -> Result<Function, DriverError> {
    let name = format!("inject_{}_{}", layout.name(), case.name);
    let (mut irb, data) = start(name, &field_types(case));
    let value = inject_case(&mut irb, layout, case.id, &data)?;
    irb.ret(&value);
    finish(irb)
}

fn project_function(layout: &UnionLayout, case: &CaseDescriptor) -> Result<Function, DriverError> {
    let name = format!("project_{}_{}", layout.name(), case.name);
    let (mut irb, value) = start(name, &explosion_types(layout));
    let data = project_case(&mut irb, layout, &value, case.id)?;
    irb.ret(&data);
    finish(irb)
}

/// Branch on the case and return its discriminant as an `i32`.
fn dispatch_function(layout: &UnionLayout) -> Result<Function, DriverError> {
    let name = format!("dispatch_{}", layout.name());
    let (mut irb, value) = start(name, &explosion_types(layout));
    let entry = irb.current_block();

    let mut dests = Vec::with_capacity(layout.cases().len());
    for case in layout.cases() {
        let block = irb.append_block(&case.name);
        irb.position_at_end(block);
        let tag = irb.const_int(32, u128::from(layout.discriminant(case.id)));
        irb.ret(&[tag]);
        dests.push((case.id, block));
    }
    let default = irb.append_block("default");
    irb.position_at_end(default);
    irb.unreachable();

    if let Some(entry) = entry {
        irb.position_at_end(entry);
    }
    dispatch(&mut irb, layout, &value, &dests, default)?;
    finish(irb)
}

/// `store_*(p: ptr, fields...)`: write the payload through the projected
/// address, then the tag.
pub(super) fn store_function(
    layout: &UnionLayout,
    case: &CaseDescriptor,
) -> Result<Function, DriverError> {
    let name = format!("store_{}_{}", layout.name(), case.name);
    let mut params = vec![IrType::Ptr];
    params.extend(field_types(case));
    let (mut irb, args) = start(name, &params);
    let (address, fields) = (args[0], &args[1..]);

    let slot = project_address_for_store(&mut irb, layout, address, case.id)?;
    if !fields.is_empty() {
        let mut packer = PayloadPacker::new(case.repr.bit_width());
        for &field in fields {
            packer.add(&mut irb, field)?;
        }
        if let Some(packed) = packer.get(&mut irb) {
            irb.store(slot, packed);
        }
    }
    store_tag(&mut irb, layout, address, case.id)?;
    irb.ret(&[]);
    finish(irb)
}

fn load_function(layout: &UnionLayout) -> Result<Function, DriverError> {
    let name = format!("load_{}", layout.name());
    let (mut irb, args) = start(name, &[IrType::Ptr]);
    let value = load_union(&mut irb, layout, args[0])?;
    irb.ret(&value);
    finish(irb)
}

/// Every function `sumc emit` prints for `layout`.
pub fn emit_union(layout: &UnionLayout) -> Result<Vec<Function>, DriverError> {
    let mut functions = Vec::new();
    if layout.is_loadable() {
        for case in layout.cases() {
            functions.push(inject_function(layout, case)?);
            functions.push(project_function(layout, case)?);
        }
        functions.push(dispatch_function(layout)?);
    }
    for case in layout.cases() {
        functions.push(store_function(layout, case)?);
    }
    if layout.is_loadable() {
        functions.push(load_function(layout)?);
    }
    debug!(
        union = layout.name(),
        functions = functions.len(),
        "emitted union functions"
    );
    Ok(functions)
}

/// Print the IR of every selected union in `path`.
pub fn emit_file(path: &str, options: &DriverOptions) {
    let layouts = plan_file(path, options);
    let mut first = true;
    for layout in &layouts {
        let functions = match emit_union(layout) {
            Ok(functions) => functions,
            Err(e) => {
                eprintln!("error: {}: {e}", layout.name());
                std::process::exit(1);
            }
        };
        for func in functions {
            if !first {
                println!();
            }
            first = false;
            print!("{func}");
        }
    }
}

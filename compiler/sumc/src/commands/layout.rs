//! `sumc layout`: print planned union descriptors.

use std::fmt;

use sum_layout::{CaseRepr, RepresentationKind, ScalarRepr, UnionLayout};

use super::plan_file;
use crate::DriverOptions;

/// Human-readable dump of one union's layout.
///
/// ```text
/// union ABC: tag+payload, loadable
///   tag:       2 bits
///   payload:   32 bits
///   spare:     32'h0
///   memory:    size 8, align 4, tag 1B @ 0, payload 4B @ 4
///   explosion: [i2, i32]
///   #0 A
///   #1 B(i8)
///   #2 C(i32)
/// ```
///
/// Spare-bit unions list each case's tag pattern after the case.
pub struct LayoutReport<'a>(pub &'a UnionLayout);

impl fmt::Display for LayoutReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = self.0;
        writeln!(
            f,
            "union {}: {}, {}",
            layout.name(),
            layout.kind(),
            layout.storage()
        )?;
        writeln!(f, "  tag:       {} bits", layout.tag_bits())?;
        writeln!(f, "  payload:   {} bits", layout.payload_bits())?;
        writeln!(f, "  spare:     {}", layout.spare_bits())?;

        let memory = layout.memory();
        write!(f, "  memory:    size {}, align {}", memory.size, memory.align)?;
        if let Some(tag) = memory.tag {
            write!(f, ", tag {}B @ {}", tag.bytes, tag.offset)?;
        }
        writeln!(
            f,
            ", payload {}B @ {}",
            memory.payload_bytes, memory.payload_offset
        )?;

        if layout.is_loadable() {
            let widths: Vec<String> = layout
                .explosion_widths()
                .iter()
                .map(|w| format!("i{w}"))
                .collect();
            writeln!(f, "  explosion: [{}]", widths.join(", "))?;
        }

        let show_patterns =
            layout.kind() == RepresentationKind::SpareBits && layout.is_loadable();
        for case in layout.cases() {
            write!(f, "  {} {}", case.id, case.name)?;
            write_repr(f, &case.repr)?;
            if show_patterns {
                write!(f, "  tag {:#x}", layout.spare_tag_pattern(case.id))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn write_repr(f: &mut fmt::Formatter<'_>, repr: &CaseRepr) -> fmt::Result {
    match repr {
        CaseRepr::Empty => Ok(()),
        CaseRepr::Loadable(fields) => {
            let fields: Vec<String> = fields.iter().map(|&s| scalar(s)).collect();
            write!(f, "({})", fields.join(", "))
        }
        CaseRepr::AddressOnly { size, align } => write!(f, "(mem {size} align {align})"),
    }
}

fn scalar(s: ScalarRepr) -> String {
    if s.unused == 0 {
        format!("i{}", s.bits)
    } else {
        format!("i{} unused {:#x}", s.bits, s.unused)
    }
}

/// Print the layout of every selected union in `path`.
pub fn layout_file(path: &str, options: &DriverOptions) {
    let layouts = plan_file(path, options);
    for (i, layout) in layouts.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{}", LayoutReport(layout));
    }
}

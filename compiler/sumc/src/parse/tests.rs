use pretty_assertions::assert_eq;

use super::*;

const SHAPE: &str = "\
# every spelling the reader accepts
union Shape {
    Empty
    Byte(i8)
    Word(i32)
    Handle(ptr)          # pointer, low bits unused
    Flag(bool)
    Pair(i8, i32)
    Blob(mem 64 align 8)
}
";

fn parse(source: &str) -> Result<Vec<UnionDecl>, ParseError> {
    parse_unions(source, &LayoutConfig::default())
}

#[test]
fn reads_every_case_form() {
    let unions = parse(SHAPE).unwrap();
    assert_eq!(unions.len(), 1);
    let shape = &unions[0];
    assert_eq!(shape.name, "Shape");
    let names: Vec<&str> = shape.cases.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        ["Empty", "Byte", "Word", "Handle", "Flag", "Pair", "Blob"]
    );
    assert_eq!(shape.cases[0].repr, CaseRepr::Empty);
    assert_eq!(
        shape.cases[1].repr,
        CaseRepr::scalars([ScalarRepr::int(8)])
    );
    assert_eq!(
        shape.cases[3].repr,
        CaseRepr::scalars([ScalarRepr::pointer(64, 8)])
    );
    assert_eq!(
        shape.cases[4].repr,
        CaseRepr::scalars([ScalarRepr::bool_byte()])
    );
    assert_eq!(
        shape.cases[5].repr,
        CaseRepr::scalars([ScalarRepr::int(8), ScalarRepr::int(32)])
    );
    assert_eq!(
        shape.cases[6].repr,
        CaseRepr::AddressOnly {
            size: 64,
            align: 8
        }
    );
}

#[test]
fn pointer_width_follows_config() {
    let config = LayoutConfig {
        pointer_bits: 32,
        ..LayoutConfig::default()
    };
    let unions = parse_unions("union P { Some(ptr) None }", &config).unwrap();
    assert_eq!(
        unions[0].cases[0].repr,
        CaseRepr::scalars([ScalarRepr::pointer(32, 4)])
    );
}

#[test]
fn commas_and_several_unions_on_one_line() {
    let unions = parse("union A { X, Y(i1), } union B { Only(i64) }").unwrap();
    assert_eq!(unions.len(), 2);
    assert_eq!(unions[0].cases.len(), 2);
    assert_eq!(unions[1].name, "B");
}

#[test]
fn empty_input_and_empty_union() {
    assert_eq!(parse("  # nothing here\n").unwrap(), vec![]);
    let unions = parse("union Never {}").unwrap();
    assert!(unions[0].cases.is_empty());
}

#[test]
fn errors_carry_line_numbers() {
    assert_eq!(
        parse("union U {\n  A(f32)\n}"),
        Err(ParseError::UnknownScalar {
            line: 2,
            name: "f32".to_owned()
        })
    );
    assert_eq!(
        parse("union U {\n\n  A(i129)\n}"),
        Err(ParseError::BadWidth { line: 3, bits: 129 })
    );
    assert_eq!(
        parse("union U { A(i0) }"),
        Err(ParseError::BadWidth { line: 1, bits: 0 })
    );
    assert_eq!(
        parse("union U {\n  A; }"),
        Err(ParseError::UnexpectedChar { line: 2, ch: ';' })
    );
    assert_eq!(
        parse("enum U { A }"),
        Err(ParseError::Expected {
            line: 1,
            expected: "union",
            found: "enum".to_owned()
        })
    );
}

#[test]
fn unterminated_union() {
    assert_eq!(
        parse("union U {\n  A\n  B(i8"),
        Err(ParseError::UnexpectedEof { expected: ")" })
    );
    assert_eq!(
        parse("union U { A"),
        Err(ParseError::UnexpectedEof {
            expected: "case name or `}`"
        })
    );
}

#[test]
fn duplicates_are_rejected() {
    assert_eq!(
        parse("union U { A B A }"),
        Err(ParseError::DuplicateCase {
            line: 1,
            union: "U".to_owned(),
            name: "A".to_owned()
        })
    );
    assert_eq!(
        parse("union U { A }\nunion U { B }"),
        Err(ParseError::DuplicateUnion {
            line: 2,
            name: "U".to_owned()
        })
    );
}

#[test]
fn footprints_are_validated() {
    assert!(matches!(
        parse("union U { A(mem 0 align 8) }"),
        Err(ParseError::BadFootprint { line: 1, .. })
    ));
    assert!(matches!(
        parse("union U { A(mem 16 align 3) }"),
        Err(ParseError::BadFootprint { line: 1, .. })
    ));
}

#[test]
fn oversized_scalar_lists_need_mem() {
    assert_eq!(
        parse("union U {\n  Wide(i128, i8)\n  Other\n}"),
        Err(ParseError::CaseTooWide {
            line: 2,
            name: "Wide".to_owned(),
            bits: 136
        })
    );
}

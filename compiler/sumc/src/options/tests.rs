use pretty_assertions::assert_eq;

use super::*;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

#[test]
fn defaults_without_flags() {
    let options = parse_driver_options(&[]).unwrap();
    assert_eq!(options, DriverOptions::default());
    assert_eq!(options.layout.max_loadable_bits, 128);
    assert_eq!(options.layout.pointer_bits, 64);
}

#[test]
fn flags_override_defaults() {
    let options = parse_driver_options(&args(&[
        "--max-loadable-bits=32",
        "--pointer-bits=32",
        "--union=Shape",
    ]))
    .unwrap();
    assert_eq!(options.layout.max_loadable_bits, 32);
    assert_eq!(options.layout.pointer_bits, 32);
    assert_eq!(options.union.as_deref(), Some("Shape"));
}

#[test]
fn bad_values_are_rejected() {
    assert!(matches!(
        parse_driver_options(&args(&["--max-loadable-bits=lots"])),
        Err(DriverError::InvalidFlagValue {
            flag: "--max-loadable-bits",
            ..
        })
    ));
    assert!(matches!(
        parse_driver_options(&args(&["--pointer-bits=48"])),
        Err(DriverError::InvalidFlagValue {
            flag: "--pointer-bits",
            ..
        })
    ));
    assert!(matches!(
        parse_driver_options(&args(&["--union="])),
        Err(DriverError::InvalidFlagValue { flag: "--union", .. })
    ));
}

#[test]
fn unknown_flag_is_an_error() {
    assert!(matches!(
        parse_driver_options(&args(&["--verbose"])),
        Err(DriverError::UnknownFlag(flag)) if flag == "--verbose"
    ));
}

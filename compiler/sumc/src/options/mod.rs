//! Command-line flags shared by every `sumc` command.

use sum_layout::LayoutConfig;

use crate::DriverError;

/// Options parsed from `--flag=value` arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DriverOptions {
    /// Target policy handed to the layout planner.
    pub layout: LayoutConfig,
    /// Restrict the command to one union.
    pub union: Option<String>,
}

/// Parse driver flags. Positional arguments must already be removed.
///
/// Recognized flags:
/// - `--max-loadable-bits=N`: register limit for loadable unions
/// - `--pointer-bits=N`: pointer width (16, 32 or 64)
/// - `--union=Name`: only process the named union
pub fn parse_driver_options(args: &[String]) -> Result<DriverOptions, DriverError> {
    let mut options = DriverOptions::default();
    for arg in args {
        if let Some(value) = arg.strip_prefix("--max-loadable-bits=") {
            options.layout.max_loadable_bits = parse_bits("--max-loadable-bits", value)?;
        } else if let Some(value) = arg.strip_prefix("--pointer-bits=") {
            let bits = parse_bits("--pointer-bits", value)?;
            if !matches!(bits, 16 | 32 | 64) {
                return Err(DriverError::InvalidFlagValue {
                    flag: "--pointer-bits",
                    value: value.to_owned(),
                });
            }
            options.layout.pointer_bits = bits;
        } else if let Some(name) = arg.strip_prefix("--union=") {
            if name.is_empty() {
                return Err(DriverError::InvalidFlagValue {
                    flag: "--union",
                    value: String::new(),
                });
            }
            options.union = Some(name.to_owned());
        } else {
            return Err(DriverError::UnknownFlag(arg.clone()));
        }
    }
    Ok(options)
}

fn parse_bits(flag: &'static str, value: &str) -> Result<u32, DriverError> {
    value
        .parse()
        .map_err(|_| DriverError::InvalidFlagValue {
            flag,
            value: value.to_owned(),
        })
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
mod tests;

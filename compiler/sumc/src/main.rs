//! Sum-type layout driver CLI
//!
//! Plans union layouts, prints the IR generated for them and checks that
//! IR in the interpreter.

use sumc::commands::{check_file, emit_file, layout_file};
use sumc::parse_driver_options;

fn main() {
    sumc::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "layout" | "emit" | "check" => {
            // Flags may come before or after the file path
            let mut path = None;
            let mut flags = Vec::new();
            for arg in args.iter().skip(2) {
                if arg.starts_with("--") {
                    flags.push(arg.clone());
                } else if path.is_none() {
                    path = Some(arg.as_str());
                }
            }

            let Some(path) = path else {
                eprintln!("Usage: sumc {command} <file> [options]");
                std::process::exit(1);
            };

            let options = match parse_driver_options(&flags) {
                Ok(options) => options,
                Err(e) => {
                    eprintln!("error: {e}");
                    std::process::exit(1);
                }
            };

            match command.as_str() {
                "layout" => layout_file(path, &options),
                "emit" => emit_file(path, &options),
                _ => check_file(path, &options),
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-v" => {
            println!("sumc {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Sum-type layout planner and codegen checker");
    println!();
    println!("Usage: sumc <command> <file> [options]");
    println!();
    println!("Commands:");
    println!("  layout <file>        Print each union's planned layout");
    println!("  emit <file>          Print the IR generated for each union");
    println!("  check <file>         Run the generated IR in the interpreter");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Options:");
    println!("  --union=<name>          Only process the named union");
    println!("  --max-loadable-bits=<n> Widest payload kept in registers (default: 128)");
    println!("  --pointer-bits=<n>      Pointer width: 16, 32 or 64 (default: 64)");
    println!();
    println!("Set RUST_LOG=sum_layout=debug to trace layout planning.");
}

//! Porta CLI
//!
//! `porta [--dry-run] <config.json> <file>...`

use std::path::Path;

use porta::{init_tracing, FilePorter, PortConfig};
use porta_diagnostic::DiagnosticQueue;

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    let mut dry_run = false;
    let mut positional = Vec::new();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--dry-run" | "-n" => dry_run = true,
            "--help" | "-h" => {
                print_usage();
                return;
            }
            flag if flag.starts_with('-') => {
                eprintln!("error: unknown option `{flag}`");
                print_usage();
                std::process::exit(1);
            }
            _ => positional.push(arg.as_str()),
        }
    }

    let Some((config_path, files)) = positional.split_first() else {
        print_usage();
        std::process::exit(1);
    };
    if files.is_empty() {
        eprintln!("error: no input files");
        std::process::exit(1);
    }

    let config = match PortConfig::load(Path::new(config_path)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };
    let mut porter = match FilePorter::from_config(&config) {
        Ok(porter) => porter,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let mut failed = 0usize;
    for file in files {
        let mut queue = DiagnosticQueue::new();
        let result = porter.port_file(Path::new(file), &mut queue);
        for diagnostic in queue.flush() {
            eprintln!("{diagnostic}");
        }

        match result {
            Ok(outcome) if outcome.errors > 0 => {
                eprintln!("error: {file}: not written, {} error(s)", outcome.errors);
                failed += 1;
            }
            Ok(outcome) if dry_run => print!("{}", outcome.output),
            Ok(outcome) => {
                if let Err(err) = outcome.write() {
                    eprintln!("error: {err}");
                    failed += 1;
                }
            }
            Err(err) => {
                eprintln!("error: {err}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        eprintln!("{failed} of {} file(s) failed", files.len());
        std::process::exit(1);
    }
}

fn print_usage() {
    eprintln!("Porta - conditional-compilation aware source porting");
    eprintln!();
    eprintln!("Usage: porta [--dry-run] <config.json> <file>...");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -n, --dry-run    Print ported sources to stdout instead of writing them");
    eprintln!("  -h, --help       Show this message");
    eprintln!();
    eprintln!("Set RUST_LOG (e.g. RUST_LOG=porta=debug) for trace output.");
}

//! `crunchjs` — command-line shell for the crunch JavaScript processor.
//!
//! Reads a JavaScript file, parses it, reports every diagnostic on stderr,
//! and writes the regenerated source to stdout (or `-o FILE`). The exit code
//! is 0 for clean or advisory runs, 1 when any diagnostic of severity Error
//! or worse was reported, and 2 for usage or I/O failures.

use std::process::ExitCode;

use crunch_core::error::Severity;
use crunch_core::process;
use crunch_core::settings::CodeSettings;

const USAGE: &str = "usage: crunchjs [--pretty] [--line-break N] [-o FILE] <input.js>";

struct Options {
    input: String,
    output: Option<String>,
    settings: CodeSettings,
}

fn parse_args() -> Result<Options, String> {
    let mut settings = CodeSettings::default();
    let mut input = None;
    let mut output = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--pretty" | "-p" => settings = CodeSettings::pretty(),
            "--line-break" => {
                let value = args.next().ok_or("--line-break needs a column count")?;
                settings.line_break_threshold = value
                    .parse()
                    .map_err(|_| format!("bad --line-break value: {value}"))?;
            }
            "-o" => {
                output = Some(args.next().ok_or("-o needs a file name")?);
            }
            "--help" | "-h" => return Err(USAGE.to_string()),
            _ if arg.starts_with('-') => return Err(format!("unknown option: {arg}")),
            _ => {
                if input.replace(arg).is_some() {
                    return Err("only one input file is accepted".to_string());
                }
            }
        }
    }
    let input = input.ok_or(USAGE)?;
    Ok(Options {
        input,
        output,
        settings,
    })
}

fn main() -> ExitCode {
    let options = match parse_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    let source = match std::fs::read_to_string(&options.input) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("crunchjs: {}: {err}", options.input);
            return ExitCode::from(2);
        }
    };

    let result = process(&source, &options.settings);
    for diagnostic in &result.diagnostics {
        eprintln!("{}: {diagnostic}", options.input);
    }

    let failed = result
        .diagnostics
        .iter()
        .any(|d| d.severity <= Severity::Error);
    if !failed {
        match &options.output {
            Some(path) => {
                if let Err(err) = std::fs::write(path, &result.code) {
                    eprintln!("crunchjs: {path}: {err}");
                    return ExitCode::from(2);
                }
            }
            None => println!("{}", result.code),
        }
    }

    if failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

//! `crunch_core` — the crunch JavaScript source-to-source processor.
//!
//! # Crate layout
//!
//! - [`parser`] — Scanner, resilient recursive-descent parser, AST, traversal,
//!   and scope analysis.
//! - [`printer`] — Precedence-aware minifying code generator with a
//!   source-map hook.
//! - [`settings`] — Output configuration.
//! - [`error`] — Diagnostics and fatal error types.
//!
//! The one-call entry point is [`process`]:
//!
//! ```
//! use crunch_core::{process, settings::CodeSettings};
//!
//! let output = process("var x = 1; var y = 2;", &CodeSettings::default());
//! assert_eq!(output.code, "var x=1;var y=2");
//! assert!(output.diagnostics.is_empty());
//! ```

/// Diagnostics and fatal error types.
pub mod error;
/// Scanner, parser, AST, traversal, and scope analysis.
pub mod parser;
/// Minifying code generator.
pub mod printer;
/// Output configuration.
pub mod settings;

use error::{CrunchError, CrunchResult, Diagnostic};
use parser::Parser;
use settings::CodeSettings;

/// The result of one processing run: the generated code plus everything the
/// parser had to say about the input. Even a fatally broken input yields an
/// `Output`; [`minify`] is the strict variant.
#[derive(Debug)]
pub struct Output {
    /// The regenerated source.
    pub code: String,
    /// All diagnostics collected during parsing, in source order.
    pub diagnostics: Vec<Diagnostic>,
}

impl Output {
    /// `true` if any collected diagnostic aborted the parse.
    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_fatal)
    }
}

/// Parse `source` and print it back under `settings`, collecting diagnostics
/// rather than failing.
pub fn process(source: &str, settings: &CodeSettings) -> Output {
    let result = Parser::new(source, settings).parse();
    Output {
        code: printer::print(&result.program, settings),
        diagnostics: result.diagnostics,
    }
}

/// Parse `source` and print it back, treating a fatal diagnostic as a hard
/// error.
pub fn minify(source: &str, settings: &CodeSettings) -> CrunchResult<String> {
    let output = process(source, settings);
    match output.diagnostics.iter().find(|d| d.is_fatal()) {
        Some(fatal) => Err(CrunchError::SyntaxError(fatal.to_string())),
        None => Ok(output.code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_round_trip() {
        let output = process("function f(a, b) { return a + b; }", &CodeSettings::default());
        assert_eq!(output.code, "function f(a,b){return a+b}");
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_process_collects_diagnostics() {
        let output = process("if (a = b) c();", &CodeSettings::default());
        assert!(!output.has_fatal());
        assert!(!output.diagnostics.is_empty());
    }

    #[test]
    fn test_minify_rejects_fatal_input() {
        let err = minify("/* never closed", &CodeSettings::default());
        assert!(matches!(err, Err(CrunchError::SyntaxError(_))));
    }

    #[test]
    fn test_minify_ok() {
        let code = minify("var answer = 40 + 2;", &CodeSettings::default()).unwrap();
        assert_eq!(code, "var answer=40+2");
    }
}

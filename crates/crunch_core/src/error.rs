//! Error and diagnostic types for the crunch processor.
//!
//! Two tiers exist side by side:
//!
//! - [`Diagnostic`] — a recoverable or advisory event collected while parsing
//!   continues. Each carries a coded [`DiagnosticKind`], a [`Severity`], and
//!   the offending source span.
//! - [`CrunchError`] — a fatal condition that aborts the whole operation
//!   (I/O failures, internal contract violations).

use thiserror::Error;

use crate::parser::scanner::Span;

// ─────────────────────────────────────────────────────────────────────────────
// Severity
// ─────────────────────────────────────────────────────────────────────────────

/// How serious a [`Diagnostic`] is, from 0 (will definitely fail at run time)
/// to 4 (purely stylistic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// The code will definitely fail when run.
    Fatal = 0,
    /// The code is almost certainly wrong.
    Error = 1,
    /// The construct could not be parsed as written; a placeholder was
    /// substituted.
    Recovered = 2,
    /// Suspicious but legal code.
    Warning = 3,
    /// Stylistic advice only.
    Suggestion = 4,
}

// ─────────────────────────────────────────────────────────────────────────────
// DiagnosticKind
// ─────────────────────────────────────────────────────────────────────────────

/// The coded kind of a [`Diagnostic`].
///
/// Each kind maps to a fixed default [`Severity`] via
/// [`DiagnosticKind::severity`]; consumers key behavior off the code, not the
/// message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A token appeared where the grammar did not allow it.
    UnexpectedToken,
    /// A required token (e.g. `)` or `:`) was missing.
    ExpectedToken,
    /// A statement terminator was inferred from a line break, `}`, or EOF.
    SemicolonInsertion,
    /// `=` appeared where `==` was probably intended (inside a condition).
    SuspiciousAssignment,
    /// An expression was expected but none could be parsed; a placeholder
    /// constant was substituted.
    ExpressionExpected,
    /// A statement was expected but none could be parsed.
    StatementExpected,
    /// `break`/`continue` referenced a label that is not in scope.
    NoLabel,
    /// `break` outside a loop or switch, or `continue` outside a loop.
    BadBreakOrContinue,
    /// The same label was nested inside itself.
    DuplicateLabel,
    /// A `var`/`let`/`const` declaration had no binding name.
    NoIdentifier,
    /// `let`/`const` declared the same name twice in one scope.
    DuplicateLexicalDeclaration,
    /// A construct valid only in a newer language level was encountered.
    UnsupportedSyntax,
    /// End of file was reached inside an unterminated construct.
    UnexpectedEndOfFile,
    /// Error recovery skipped its maximum token budget without finding a
    /// resynchronization point.
    TooManySkippedTokens,
    /// The scanner could not form a token.
    BadToken,
    /// `with` statement encountered (legal, but hostile to minification).
    WithNotRecommended,
    /// An embedded `<% … %>` block appeared while the settings forbid them.
    EmbeddedBlockNotAllowed,
}

impl DiagnosticKind {
    /// The default severity for this kind.
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::UnexpectedEndOfFile | DiagnosticKind::TooManySkippedTokens => {
                Severity::Fatal
            }
            DiagnosticKind::NoLabel
            | DiagnosticKind::BadBreakOrContinue
            | DiagnosticKind::DuplicateLabel
            | DiagnosticKind::DuplicateLexicalDeclaration
            | DiagnosticKind::EmbeddedBlockNotAllowed => Severity::Error,
            DiagnosticKind::UnexpectedToken
            | DiagnosticKind::ExpectedToken
            | DiagnosticKind::ExpressionExpected
            | DiagnosticKind::StatementExpected
            | DiagnosticKind::NoIdentifier
            | DiagnosticKind::UnsupportedSyntax
            | DiagnosticKind::BadToken => Severity::Recovered,
            DiagnosticKind::SuspiciousAssignment | DiagnosticKind::WithNotRecommended => {
                Severity::Warning
            }
            DiagnosticKind::SemicolonInsertion => Severity::Suggestion,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Diagnostic
// ─────────────────────────────────────────────────────────────────────────────

/// A single error event reported through the diagnostics boundary.
///
/// Non-fatal diagnostics never stop the parse; callers inspect the collected
/// vector after [`crate::parser::Parser::parse`] returns.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// The coded kind.
    pub kind: DiagnosticKind,
    /// Severity, 0 (fatal) through 4 (stylistic).
    pub severity: Severity,
    /// The offending source span.
    pub span: Span,
    /// Human-readable detail.
    pub message: String,
}

impl Diagnostic {
    /// Build a diagnostic with the kind's default severity.
    pub fn new(kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            span,
            message: message.into(),
        }
    }

    /// `true` for severities that abort the parse (tier 3 of the error
    /// design: skip ceiling exceeded, EOF mid-construct).
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: [{:?}/{}] {}",
            self.span.start.line, self.span.start.column, self.kind, self.severity as u8,
            self.message
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fatal errors
// ─────────────────────────────────────────────────────────────────────────────

/// Fatal errors produced by the crunch processor.
#[derive(Debug, Error)]
pub enum CrunchError {
    /// The scanner hit input it cannot tokenize at all.
    #[error("SyntaxError: {0}")]
    SyntaxError(String),

    /// An internal contract was violated (e.g. the printer was handed a
    /// malformed tree). Not a user-facing error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenient `Result` alias for fallible crunch operations.
pub type CrunchResult<T> = Result<T, CrunchError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::scanner::{Position, Span};

    fn span() -> Span {
        Span {
            start: Position {
                offset: 0,
                line: 1,
                column: 1,
            },
            end: Position {
                offset: 1,
                line: 1,
                column: 2,
            },
        }
    }

    // ── Severity ordering ─────────────────────────────────────────────────────

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Fatal < Severity::Error);
        assert!(Severity::Warning < Severity::Suggestion);
        assert_eq!(Severity::Fatal as u8, 0);
        assert_eq!(Severity::Suggestion as u8, 4);
    }

    // ── Default severities ────────────────────────────────────────────────────

    #[test]
    fn test_kind_default_severity() {
        assert_eq!(
            DiagnosticKind::SemicolonInsertion.severity(),
            Severity::Suggestion
        );
        assert_eq!(
            DiagnosticKind::UnexpectedEndOfFile.severity(),
            Severity::Fatal
        );
        assert_eq!(
            DiagnosticKind::ExpressionExpected.severity(),
            Severity::Recovered
        );
    }

    #[test]
    fn test_diagnostic_is_fatal() {
        let d = Diagnostic::new(DiagnosticKind::TooManySkippedTokens, span(), "gave up");
        assert!(d.is_fatal());
        let d = Diagnostic::new(DiagnosticKind::UnexpectedToken, span(), "?");
        assert!(!d.is_fatal());
    }

    // ── Display ───────────────────────────────────────────────────────────────

    #[test]
    fn test_diagnostic_display_contains_location() {
        let d = Diagnostic::new(DiagnosticKind::ExpectedToken, span(), "expected ')'");
        let text = d.to_string();
        assert!(text.starts_with("1:1:"));
        assert!(text.contains("expected ')'"));
    }

    #[test]
    fn test_crunch_error_display() {
        let e = CrunchError::SyntaxError("bad token".into());
        assert_eq!(e.to_string(), "SyntaxError: bad token");
    }
}

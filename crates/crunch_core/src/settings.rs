//! Output and parsing settings.
//!
//! [`CodeSettings`] is consumed — never owned — by the parser and printer.
//! The defaults produce fully minified single-line output.

// ─────────────────────────────────────────────────────────────────────────────
// OutputMode
// ─────────────────────────────────────────────────────────────────────────────

/// How the printer lays out its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Everything on one logical line, broken only when a line exceeds
    /// [`CodeSettings::line_break_threshold`].
    SingleLine,
    /// One statement per line with indentation.
    MultipleLines,
}

// ─────────────────────────────────────────────────────────────────────────────
// CodeSettings
// ─────────────────────────────────────────────────────────────────────────────

/// Settings controlling parsing tolerances and output layout.
#[derive(Debug, Clone)]
pub struct CodeSettings {
    /// Single-line (minified) or multi-line (readable) output.
    pub output_mode: OutputMode,
    /// Spaces per indent level in multi-line mode.
    pub indent_size: usize,
    /// Column after which single-line mode inserts an opportunistic line
    /// break at the next safe break point. `0` disables soft breaks.
    pub line_break_threshold: usize,
    /// Always quote object-literal property keys.
    pub quote_object_keys: bool,
    /// Rewrite numeric and string literals to their shortest equivalent
    /// form. When `false`, literals are emitted as written in the source.
    pub minify_literals: bool,
    /// Keep `/*! … */` and conditional-compilation comments in the output.
    pub preserve_important_comments: bool,
    /// Tolerate embedded `<% … %>` host-template blocks, passing them
    /// through to the output verbatim.
    pub allow_embedded_blocks: bool,
}

impl CodeSettings {
    /// Settings for fully minified single-line output.
    pub fn minified() -> Self {
        Self {
            output_mode: OutputMode::SingleLine,
            indent_size: 4,
            line_break_threshold: 0,
            quote_object_keys: false,
            minify_literals: true,
            preserve_important_comments: true,
            allow_embedded_blocks: false,
        }
    }

    /// Settings for readable multi-line output that keeps literals as
    /// written ("inline-safe" pretty mode).
    pub fn pretty() -> Self {
        Self {
            output_mode: OutputMode::MultipleLines,
            indent_size: 4,
            line_break_threshold: 0,
            quote_object_keys: false,
            minify_literals: false,
            preserve_important_comments: true,
            allow_embedded_blocks: false,
        }
    }
}

impl Default for CodeSettings {
    fn default() -> Self {
        Self::minified()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_minified() {
        let s = CodeSettings::default();
        assert_eq!(s.output_mode, OutputMode::SingleLine);
        assert!(s.minify_literals);
    }

    #[test]
    fn test_pretty_mode() {
        let s = CodeSettings::pretty();
        assert_eq!(s.output_mode, OutputMode::MultipleLines);
        assert!(!s.minify_literals);
        assert_eq!(s.indent_size, 4);
    }
}

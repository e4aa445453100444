//! JavaScript lexer (scanner).
//!
//! Produces the token stream consumed by [`crate::parser::Parser`]. Each
//! [`Token`] carries its [`Span`] and a flag recording whether a line
//! terminator preceded it (the parser's ASI input). The scanner never fails
//! hard: malformed input yields a token with [`TokenKind::Error`] and the
//! parser decides how to recover.
//!
//! The scanner is cheap to clone; the parser peeks ahead by scanning on a
//! disposable clone so the main stream is never perturbed.

// ─────────────────────────────────────────────────────────────────────────────
// Position / Span
// ─────────────────────────────────────────────────────────────────────────────

/// A byte offset + line/column location in source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset from the beginning of the source string.
    pub offset: usize,
    /// 1-based line number (incremented on every *LineTerminator*).
    pub line: u32,
    /// 1-based column number, measured in Unicode scalar values.
    pub column: u32,
}

/// A half-open `[start, end)` source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Inclusive start of the span.
    pub start: Position,
    /// Exclusive end of the span.
    pub end: Position,
}

impl Span {
    /// Merge two spans into one covering both.
    pub fn combine(self, other: Span) -> Span {
        let start = if self.start.offset <= other.start.offset {
            self.start
        } else {
            other.start
        };
        let end = if self.end.offset >= other.end.offset {
            self.end
        } else {
            other.end
        };
        Span { start, end }
    }
}

impl Default for Span {
    fn default() -> Self {
        Span {
            start: Position::default(),
            end: Position::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────────────

/// The syntactic category of a JavaScript lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Decimal, hex (`0x…`), binary (`0b…`), octal (`0o…` / legacy) numeric
    /// literal.
    NumericLiteral,
    /// String literal enclosed in `"` or `'`.
    StringLiteral,
    /// Regular expression literal `/pattern/flags`.
    RegExpLiteral,
    /// An identifier that is not a reserved word.
    Identifier,

    // ── Reserved words ────────────────────────────────────────────────────
    /// `break`
    Break,
    /// `case`
    Case,
    /// `catch`
    Catch,
    /// `class` (reserved; unsupported at this language level)
    Class,
    /// `const`
    Const,
    /// `continue`
    Continue,
    /// `debugger`
    Debugger,
    /// `default`
    Default,
    /// `delete`
    Delete,
    /// `do`
    Do,
    /// `else`
    Else,
    /// `enum` (reserved, never used)
    Enum,
    /// `export` (reserved; unsupported at this language level)
    Export,
    /// `extends` (reserved)
    Extends,
    /// `false`
    False,
    /// `finally`
    Finally,
    /// `for`
    For,
    /// `function`
    Function,
    /// `if`
    If,
    /// `import` (reserved; unsupported at this language level)
    Import,
    /// `in`
    In,
    /// `instanceof`
    Instanceof,
    /// `let`
    Let,
    /// `new`
    New,
    /// `null`
    Null,
    /// `of` (contextual, only meaningful in a `for (… of …)` head)
    Of,
    /// `return`
    Return,
    /// `super` (reserved)
    Super,
    /// `switch`
    Switch,
    /// `this`
    This,
    /// `throw`
    Throw,
    /// `true`
    True,
    /// `try`
    Try,
    /// `typeof`
    Typeof,
    /// `var`
    Var,
    /// `void`
    Void,
    /// `while`
    While,
    /// `with`
    With,
    /// `get` (contextual, object-literal accessors)
    Get,
    /// `set` (contextual, object-literal accessors)
    Set,

    // ── Punctuators ───────────────────────────────────────────────────────
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `.`
    Dot,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `==`
    EqualEqual,
    /// `!=`
    BangEqual,
    /// `===`
    EqualEqualEqual,
    /// `!==`
    BangEqualEqual,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `**`
    StarStar,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,
    /// `<<`
    LessLess,
    /// `>>`
    GreaterGreater,
    /// `>>>`
    GreaterGreaterGreater,
    /// `&`
    Ampersand,
    /// `|`
    Pipe,
    /// `^`
    Caret,
    /// `!`
    Bang,
    /// `~`
    Tilde,
    /// `&&`
    AmpersandAmpersand,
    /// `||`
    PipePipe,
    /// `??`
    QuestionQuestion,
    /// `?`
    Question,
    /// `:`
    Colon,
    /// `=`
    Equal,
    /// `+=`
    PlusEqual,
    /// `-=`
    MinusEqual,
    /// `*=`
    StarEqual,
    /// `**=`
    StarStarEqual,
    /// `/=`
    SlashEqual,
    /// `%=`
    PercentEqual,
    /// `<<=`
    LessLessEqual,
    /// `>>=`
    GreaterGreaterEqual,
    /// `>>>=`
    GreaterGreaterGreaterEqual,
    /// `&=`
    AmpersandEqual,
    /// `|=`
    PipeEqual,
    /// `^=`
    CaretEqual,
    /// `??=`
    QuestionQuestionEqual,
    /// `=>` (tokenized so the parser can reject arrow functions cleanly)
    Arrow,

    // ── Comments / host blocks ────────────────────────────────────────────
    /// Single-line comment `// …`.
    SingleLineComment,
    /// Block comment `/* … */`.
    MultiLineComment,
    /// Embedded `<% … %>` host-template block (only when enabled).
    EmbeddedBlock,

    // ── Sentinels ─────────────────────────────────────────────────────────
    /// A character sequence that could not be tokenized.
    Error,
    /// End of input.
    Eof,
}

impl TokenKind {
    /// `true` for tokens that form an *IdentifierName*: plain identifiers
    /// plus every reserved and contextual word. Member access (`a.delete`)
    /// and object-literal keys accept any of these.
    pub fn is_identifier_name(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Identifier
                | Break | Case | Catch | Class | Const | Continue | Debugger | Default
                | Delete | Do | Else | Enum | Export | Extends | False | Finally | For
                | Function | If | Import | In | Instanceof | Let | New | Null | Of
                | Return | Super | Switch | This | Throw | True | Try | Typeof | Var
                | Void | While | With | Get | Set
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────────────

/// The payload value associated with a [`Token`].
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    /// No semantic value (punctuators, reserved words, EOF).
    None,
    /// Raw text for identifiers, strings, comments, regexps, and error
    /// descriptions.
    Str(String),
    /// Parsed numeric value for [`TokenKind::NumericLiteral`].
    Number(f64),
}

/// A single lexical token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The syntactic category.
    pub kind: TokenKind,
    /// The associated value, if any.
    pub value: TokenValue,
    /// Source location of this token.
    pub span: Span,
    /// `true` when at least one line terminator appeared between the
    /// previous token and this one. The parser's ASI input.
    pub newline_before: bool,
}

impl Token {
    /// The identifier/string payload, or `""` for valueless tokens.
    pub fn text(&self) -> &str {
        match &self.value {
            TokenValue::Str(s) => s.as_str(),
            _ => "",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Character classification
// ─────────────────────────────────────────────────────────────────────────────

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\x0B'
            | '\x0C'
            | ' '
            | '\u{00A0}'
            | '\u{FEFF}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
    ) || is_line_terminator(c)
}

/// Returns `true` for characters that may *start* a JS identifier.
pub(crate) fn is_id_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphabetic()
}

/// Returns `true` for characters that may *continue* a JS identifier.
pub(crate) fn is_id_continue(c: char) -> bool {
    c == '$' || c == '_' || c == '\u{200C}' || c == '\u{200D}' || c.is_alphanumeric()
}

/// Map an identifier string to a keyword [`TokenKind`], or `None` for plain
/// identifiers.
fn keyword_kind(s: &str) -> Option<TokenKind> {
    Some(match s {
        "break" => TokenKind::Break,
        "case" => TokenKind::Case,
        "catch" => TokenKind::Catch,
        "class" => TokenKind::Class,
        "const" => TokenKind::Const,
        "continue" => TokenKind::Continue,
        "debugger" => TokenKind::Debugger,
        "default" => TokenKind::Default,
        "delete" => TokenKind::Delete,
        "do" => TokenKind::Do,
        "else" => TokenKind::Else,
        "enum" => TokenKind::Enum,
        "export" => TokenKind::Export,
        "extends" => TokenKind::Extends,
        "false" => TokenKind::False,
        "finally" => TokenKind::Finally,
        "for" => TokenKind::For,
        "function" => TokenKind::Function,
        "if" => TokenKind::If,
        "import" => TokenKind::Import,
        "in" => TokenKind::In,
        "instanceof" => TokenKind::Instanceof,
        "let" => TokenKind::Let,
        "new" => TokenKind::New,
        "null" => TokenKind::Null,
        "of" => TokenKind::Of,
        "return" => TokenKind::Return,
        "super" => TokenKind::Super,
        "switch" => TokenKind::Switch,
        "this" => TokenKind::This,
        "throw" => TokenKind::Throw,
        "true" => TokenKind::True,
        "try" => TokenKind::Try,
        "typeof" => TokenKind::Typeof,
        "var" => TokenKind::Var,
        "void" => TokenKind::Void,
        "while" => TokenKind::While,
        "with" => TokenKind::With,
        "get" => TokenKind::Get,
        "set" => TokenKind::Set,
        _ => return None,
    })
}

/// Returns `true` when a `/` should open a regular-expression literal rather
/// than act as a division operator, given the most recent significant token.
///
/// `/` is division only after tokens that complete a value (identifier,
/// literal, `)`, `]`, `++`, `--`, or a value keyword). Every other context
/// is regexp. The parser can override this with
/// [`Lexer::rescan_as_regexp`] when grammar context says otherwise.
fn slash_is_regexp(last: Option<TokenKind>) -> bool {
    match last {
        None => true,
        Some(k) => !matches!(
            k,
            TokenKind::Identifier
                | TokenKind::NumericLiteral
                | TokenKind::StringLiteral
                | TokenKind::RegExpLiteral
                | TokenKind::RightParen
                | TokenKind::RightBracket
                | TokenKind::RightBrace
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::This
        ),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lexer
// ─────────────────────────────────────────────────────────────────────────────

/// JavaScript lexer.
///
/// Call [`Lexer::next_token`] repeatedly until a token with
/// [`TokenKind::Eof`] is returned. Comments are returned as ordinary tokens;
/// the parser filters or preserves them.
#[derive(Clone)]
pub struct Lexer<'src> {
    /// The complete source string.
    source: &'src str,
    /// Current byte position within `source`.
    pos: usize,
    /// Current 1-based line number.
    line: u32,
    /// Current 1-based column number.
    column: u32,
    /// The most recent significant (non-comment) token kind, for
    /// regexp/division disambiguation.
    last_significant: Option<TokenKind>,
    /// Tolerate `<% … %>` host-template blocks.
    embedded_blocks: bool,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given UTF-8 source string.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 1,
            last_significant: None,
            embedded_blocks: false,
        }
    }

    /// Enable or disable `<% … %>` host-template block tolerance.
    pub fn with_embedded_blocks(mut self, allow: bool) -> Self {
        self.embedded_blocks = allow;
        self
    }

    /// The source text this lexer is scanning.
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// The raw source text under `span`.
    pub fn slice(&self, span: Span) -> &'src str {
        &self.source[span.start.offset..span.end.offset]
    }

    /// Returns `true` when all input has been consumed.
    pub fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    // ── Low-level helpers ───────────────────────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek2(&self) -> Option<char> {
        let mut it = self.source[self.pos..].chars();
        it.next();
        it.next()
    }

    /// Advance past the current character, updating line/column tracking.
    /// `\r\n` counts as one line terminator.
    fn advance(&mut self) -> char {
        let ch = self.source[self.pos..]
            .chars()
            .next()
            .expect("advance called past end of input");
        self.pos += ch.len_utf8();
        match ch {
            '\r' => {
                if self.source[self.pos..].starts_with('\n') {
                    self.pos += 1;
                }
                self.line += 1;
                self.column = 1;
            }
            '\n' | '\u{2028}' | '\u{2029}' => {
                self.line += 1;
                self.column = 1;
            }
            _ => self.column += 1,
        }
        ch
    }

    /// Consume the current character when it equals `c`.
    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn here(&self) -> Position {
        Position {
            offset: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn span_from(&self, start: Position) -> Span {
        Span {
            start,
            end: self.here(),
        }
    }

    /// Build a valueless token from `start` to the current position.
    fn punct(&self, kind: TokenKind, start: Position, newline_before: bool) -> Token {
        Token {
            kind,
            value: TokenValue::None,
            span: self.span_from(start),
            newline_before,
        }
    }

    /// Build a token whose value is the raw text `[start, here)`.
    fn text_token(&self, kind: TokenKind, start: Position, newline_before: bool) -> Token {
        Token {
            kind,
            value: TokenValue::Str(self.source[start.offset..self.pos].to_string()),
            span: self.span_from(start),
            newline_before,
        }
    }

    /// Build an [`TokenKind::Error`] token carrying `message`.
    fn error_token(&self, message: &str, start: Position, newline_before: bool) -> Token {
        Token {
            kind: TokenKind::Error,
            value: TokenValue::Str(message.to_string()),
            span: self.span_from(start),
            newline_before,
        }
    }

    /// Consume leading whitespace; returns `true` if any line terminator
    /// was seen.
    fn skip_whitespace(&mut self) -> bool {
        let mut had_lt = false;
        while let Some(c) = self.peek() {
            if !is_js_whitespace(c) {
                break;
            }
            if is_line_terminator(c) {
                had_lt = true;
            }
            self.advance();
        }
        had_lt
    }

    // ── Literal scanners ────────────────────────────────────────────────────

    fn scan_decimal_digits(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '_') {
            self.advance();
        }
    }

    fn scan_exponent(&mut self) {
        if matches!(self.peek(), Some('e') | Some('E')) {
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            self.scan_decimal_digits();
        }
    }

    /// Scan a numeric literal; `first` has already been consumed.
    fn scan_numeric(&mut self, first: char, start: Position, had_lt: bool) -> Token {
        if first == '0' && matches!(self.peek(), Some('x') | Some('X')) {
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit() || c == '_') {
                self.advance();
            }
        } else if first == '0' && matches!(self.peek(), Some('o') | Some('O')) {
            self.advance();
            while matches!(self.peek(), Some(c) if matches!(c, '0'..='7') || c == '_') {
                self.advance();
            }
        } else if first == '0' && matches!(self.peek(), Some('b') | Some('B')) {
            self.advance();
            while matches!(self.peek(), Some(c) if matches!(c, '0' | '1') || c == '_') {
                self.advance();
            }
        } else {
            // Decimal: integer part, optional fraction, optional exponent.
            // A leading '.' means the integer part was empty.
            if first != '.' {
                self.scan_decimal_digits();
                if self.peek() == Some('.') {
                    self.advance();
                }
            }
            self.scan_decimal_digits();
            self.scan_exponent();
        }
        let raw = &self.source[start.offset..self.pos];
        Token {
            kind: TokenKind::NumericLiteral,
            value: TokenValue::Number(parse_numeric_raw(raw)),
            span: self.span_from(start),
            newline_before: had_lt,
        }
    }

    /// Scan a string literal; the opening quote has been consumed.
    ///
    /// On an unterminated string the token covers up to the line end and has
    /// [`TokenKind::Error`].
    fn scan_string(&mut self, quote: char, start: Position, had_lt: bool) -> Token {
        loop {
            match self.peek() {
                None => return self.error_token("unterminated string literal", start, had_lt),
                Some(c) if is_line_terminator(c) => {
                    return self.error_token("unterminated string literal", start, had_lt);
                }
                Some(c) if c == quote => {
                    self.advance();
                    return self.text_token(TokenKind::StringLiteral, start, had_lt);
                }
                Some('\\') => {
                    self.advance();
                    // Consume the escaped character (or a CRLF line
                    // continuation) without interpreting it; decoding happens
                    // in the AST builder.
                    if self.peek().is_some() {
                        self.advance();
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Scan a regular-expression literal; the opening `/` has been consumed.
    fn scan_regexp(&mut self, start: Position, had_lt: bool) -> Token {
        let mut in_class = false;
        loop {
            match self.peek() {
                None => {
                    return self.error_token("unterminated regular expression", start, had_lt);
                }
                Some(c) if is_line_terminator(c) => {
                    return self.error_token("unterminated regular expression", start, had_lt);
                }
                Some('[') => {
                    in_class = true;
                    self.advance();
                }
                Some(']') => {
                    in_class = false;
                    self.advance();
                }
                Some('/') if !in_class => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        None => {}
                        Some(c) if is_line_terminator(c) => {}
                        _ => {
                            self.advance();
                        }
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
        // Flags.
        while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            self.advance();
        }
        self.text_token(TokenKind::RegExpLiteral, start, had_lt)
    }

    /// Scan an identifier or keyword; the first character has been consumed.
    fn scan_identifier(&mut self, start: Position, had_lt: bool) -> Token {
        while matches!(self.peek(), Some(c) if is_id_continue(c)) {
            self.advance();
        }
        let name = &self.source[start.offset..self.pos];
        match keyword_kind(name) {
            Some(kind) => self.punct(kind, start, had_lt),
            None => self.text_token(TokenKind::Identifier, start, had_lt),
        }
    }

    /// Scan an embedded `<% … %>` block; `<%` has been consumed.
    fn scan_embedded_block(&mut self, start: Position, had_lt: bool) -> Token {
        loop {
            match self.peek() {
                None => return self.error_token("unterminated '<%' block", start, had_lt),
                Some('%') if self.peek2() == Some('>') => {
                    self.advance();
                    self.advance();
                    return self.text_token(TokenKind::EmbeddedBlock, start, had_lt);
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ── Parser-directed regex rescan ────────────────────────────────────────

    /// Re-scan `slash_token` (a `/` or `/=` the heuristic classified as
    /// division) as a regular-expression literal.
    ///
    /// Works on a clone positioned at the token start, so `self` is only
    /// advanced when the rescan succeeds. Returns `None` when no valid regexp
    /// starts there.
    pub fn rescan_as_regexp(&mut self, slash_token: &Token) -> Option<Token> {
        if !matches!(slash_token.kind, TokenKind::Slash | TokenKind::SlashEqual) {
            return None;
        }
        let mut probe = self.clone();
        probe.pos = slash_token.span.start.offset;
        probe.line = slash_token.span.start.line;
        probe.column = slash_token.span.start.column;
        probe.advance(); // the '/'
        let tok = probe.scan_regexp(slash_token.span.start, slash_token.newline_before);
        if tok.kind != TokenKind::RegExpLiteral {
            return None;
        }
        probe.last_significant = Some(TokenKind::RegExpLiteral);
        *self = probe;
        Some(tok)
    }

    // ── Main entry point ────────────────────────────────────────────────────

    /// Scan and return the next [`Token`].
    pub fn next_token(&mut self) -> Token {
        let had_lt = self.skip_whitespace();

        if self.is_eof() {
            return Token {
                kind: TokenKind::Eof,
                value: TokenValue::None,
                span: self.span_from(self.here()),
                newline_before: had_lt,
            };
        }

        let start = self.here();
        let c = self.advance();

        let tok = match c {
            '/' => match self.peek() {
                Some('/') => {
                    self.advance();
                    while matches!(self.peek(), Some(ch) if !is_line_terminator(ch)) {
                        self.advance();
                    }
                    // Comments are not significant for slash disambiguation.
                    return self.text_token(TokenKind::SingleLineComment, start, had_lt);
                }
                Some('*') => {
                    self.advance();
                    let mut inner_lt = false;
                    loop {
                        match self.peek() {
                            None => {
                                return self.error_token("unterminated comment", start, had_lt);
                            }
                            Some('*') if self.peek2() == Some('/') => {
                                self.advance();
                                self.advance();
                                return self.text_token(
                                    TokenKind::MultiLineComment,
                                    start,
                                    had_lt || inner_lt,
                                );
                            }
                            Some(ch) => {
                                if is_line_terminator(ch) {
                                    inner_lt = true;
                                }
                                self.advance();
                            }
                        }
                    }
                }
                _ if slash_is_regexp(self.last_significant) => {
                    let tok = self.scan_regexp(start, had_lt);
                    self.last_significant = Some(tok.kind);
                    return tok;
                }
                Some('=') => {
                    self.advance();
                    self.punct(TokenKind::SlashEqual, start, had_lt)
                }
                _ => self.punct(TokenKind::Slash, start, had_lt),
            },

            '"' | '\'' => {
                let tok = self.scan_string(c, start, had_lt);
                self.last_significant = Some(tok.kind);
                return tok;
            }

            c if c.is_ascii_digit() => {
                let tok = self.scan_numeric(c, start, had_lt);
                self.last_significant = Some(tok.kind);
                return tok;
            }

            '.' => {
                if matches!(self.peek(), Some(d) if d.is_ascii_digit()) {
                    let tok = self.scan_numeric('.', start, had_lt);
                    self.last_significant = Some(tok.kind);
                    return tok;
                }
                self.punct(TokenKind::Dot, start, had_lt)
            }

            c if is_id_start(c) => {
                let tok = self.scan_identifier(start, had_lt);
                self.last_significant = Some(tok.kind);
                return tok;
            }

            '{' => self.punct(TokenKind::LeftBrace, start, had_lt),
            '}' => self.punct(TokenKind::RightBrace, start, had_lt),
            '(' => self.punct(TokenKind::LeftParen, start, had_lt),
            ')' => self.punct(TokenKind::RightParen, start, had_lt),
            '[' => self.punct(TokenKind::LeftBracket, start, had_lt),
            ']' => self.punct(TokenKind::RightBracket, start, had_lt),
            ';' => self.punct(TokenKind::Semicolon, start, had_lt),
            ',' => self.punct(TokenKind::Comma, start, had_lt),
            '~' => self.punct(TokenKind::Tilde, start, had_lt),
            ':' => self.punct(TokenKind::Colon, start, had_lt),

            '<' => {
                let kind = if self.embedded_blocks && self.peek() == Some('%') {
                    self.advance();
                    return self.scan_embedded_block(start, had_lt);
                } else if self.eat('<') {
                    if self.eat('=') {
                        TokenKind::LessLessEqual
                    } else {
                        TokenKind::LessLess
                    }
                } else if self.eat('=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                };
                self.punct(kind, start, had_lt)
            }

            '>' => {
                let kind = if self.eat('>') {
                    if self.eat('>') {
                        if self.eat('=') {
                            TokenKind::GreaterGreaterGreaterEqual
                        } else {
                            TokenKind::GreaterGreaterGreater
                        }
                    } else if self.eat('=') {
                        TokenKind::GreaterGreaterEqual
                    } else {
                        TokenKind::GreaterGreater
                    }
                } else if self.eat('=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                };
                self.punct(kind, start, had_lt)
            }

            '=' => {
                let kind = if self.eat('=') {
                    if self.eat('=') {
                        TokenKind::EqualEqualEqual
                    } else {
                        TokenKind::EqualEqual
                    }
                } else if self.eat('>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Equal
                };
                self.punct(kind, start, had_lt)
            }

            '!' => {
                let kind = if self.eat('=') {
                    if self.eat('=') {
                        TokenKind::BangEqualEqual
                    } else {
                        TokenKind::BangEqual
                    }
                } else {
                    TokenKind::Bang
                };
                self.punct(kind, start, had_lt)
            }

            '+' => {
                let kind = if self.eat('+') {
                    TokenKind::PlusPlus
                } else if self.eat('=') {
                    TokenKind::PlusEqual
                } else {
                    TokenKind::Plus
                };
                self.punct(kind, start, had_lt)
            }

            '-' => {
                let kind = if self.eat('-') {
                    TokenKind::MinusMinus
                } else if self.eat('=') {
                    TokenKind::MinusEqual
                } else {
                    TokenKind::Minus
                };
                self.punct(kind, start, had_lt)
            }

            '*' => {
                let kind = if self.eat('*') {
                    if self.eat('=') {
                        TokenKind::StarStarEqual
                    } else {
                        TokenKind::StarStar
                    }
                } else if self.eat('=') {
                    TokenKind::StarEqual
                } else {
                    TokenKind::Star
                };
                self.punct(kind, start, had_lt)
            }

            '%' => {
                let kind = if self.eat('=') {
                    TokenKind::PercentEqual
                } else {
                    TokenKind::Percent
                };
                self.punct(kind, start, had_lt)
            }

            '&' => {
                let kind = if self.eat('&') {
                    TokenKind::AmpersandAmpersand
                } else if self.eat('=') {
                    TokenKind::AmpersandEqual
                } else {
                    TokenKind::Ampersand
                };
                self.punct(kind, start, had_lt)
            }

            '|' => {
                let kind = if self.eat('|') {
                    TokenKind::PipePipe
                } else if self.eat('=') {
                    TokenKind::PipeEqual
                } else {
                    TokenKind::Pipe
                };
                self.punct(kind, start, had_lt)
            }

            '^' => {
                let kind = if self.eat('=') {
                    TokenKind::CaretEqual
                } else {
                    TokenKind::Caret
                };
                self.punct(kind, start, had_lt)
            }

            '?' => {
                let kind = if self.peek() == Some('?') {
                    self.advance();
                    if self.eat('=') {
                        TokenKind::QuestionQuestionEqual
                    } else {
                        TokenKind::QuestionQuestion
                    }
                } else if self.peek() == Some('.')
                    && !matches!(self.peek2(), Some(d) if d.is_ascii_digit())
                {
                    // `?.` is not part of the parsed language level; let the
                    // parser report it as two tokens would only confuse the
                    // diagnostic, so surface it as an error token here.
                    self.advance();
                    return self.error_token("optional chaining is not supported", start, had_lt);
                } else {
                    TokenKind::Question
                };
                self.punct(kind, start, had_lt)
            }

            _ => self.error_token("invalid or unexpected character", start, had_lt),
        };

        self.last_significant = Some(tok.kind);
        tok
    }

    /// Tokenize everything, excluding the EOF sentinel. Test helper.
    pub fn tokenize_all(source: &'src str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token();
            if tok.kind == TokenKind::Eof {
                break;
            }
            tokens.push(tok);
        }
        tokens
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Numeric parsing helper
// ─────────────────────────────────────────────────────────────────────────────

/// Parse the raw text of a numeric literal to an `f64`. Numeric separators
/// (`_`) are stripped first. Returns NaN for text that cannot be parsed.
fn parse_numeric_raw(raw: &str) -> f64 {
    let clean: String = raw.chars().filter(|&c| c != '_').collect();
    if let Some(hex) = clean.strip_prefix("0x").or_else(|| clean.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).map(|n| n as f64).unwrap_or(f64::NAN)
    } else if let Some(oct) = clean.strip_prefix("0o").or_else(|| clean.strip_prefix("0O")) {
        u64::from_str_radix(oct, 8).map(|n| n as f64).unwrap_or(f64::NAN)
    } else if let Some(bin) = clean.strip_prefix("0b").or_else(|| clean.strip_prefix("0B")) {
        u64::from_str_radix(bin, 2).map(|n| n as f64).unwrap_or(f64::NAN)
    } else if clean.len() > 1
        && clean.starts_with('0')
        && clean.bytes().all(|b| b.is_ascii_digit())
        && clean.bytes().all(|b| (b'0'..=b'7').contains(&b))
    {
        // Legacy octal (e.g. `017`).
        u64::from_str_radix(&clean[1..], 8).map(|n| n as f64).unwrap_or(f64::NAN)
    } else {
        clean.parse::<f64>().unwrap_or(f64::NAN)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

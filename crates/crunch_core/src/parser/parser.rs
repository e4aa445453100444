//! Recursive-descent JavaScript parser.
//!
//! Statements are parsed by dedicated productions; expressions by a
//! dual-stack operator-precedence engine (one operand stack, one operator
//! stack, an empty stack acting as the sentinel). Comma sequences are
//! normalized into one flat n-ary node as they reduce.
//!
//! # Error recovery
//!
//! The parser never stops at the first error. Each production that knows how
//! to resynchronize pushes a static *no-skip* token set onto a stack; when a
//! construct cannot be parsed, a [`Diagnostic`] is recorded and tokens are
//! skipped until one appears in any active set. The failure then unwinds as
//! [`ParseError::Recovered`] until it reaches the production whose set
//! matched, which claims it and continues. A partially built statement rides
//! along in `pending_partial` so the claiming list keeps what was parsed.
//! Skipping more than [`MAX_SKIPPED_TOKENS`] tokens, or reaching end of
//! input mid-construct, is fatal — but fatal signals never escape
//! [`Parser::parse`]; the result is always a program plus diagnostics.

use std::collections::VecDeque;
use std::mem;

use smallvec::SmallVec;

use crate::error::{Diagnostic, DiagnosticKind};
use crate::parser::ast::{
    ArrayLit, AssignExpr, AssignOp, BinaryExpr, BinaryOp, Block, CallExpr, CatchClause, CondExpr,
    DeclKind, DirectiveStmt, DoWhileStmt, Expr, ExprStmt, ForInKind, ForInStmt, ForStmt, Function,
    Ident, IfStmt, IndexExpr, JumpStmt, LabeledStmt, MemberExpr, NewExpr, NumLit, ObjectLit,
    PostfixExpr, PostfixOp, Precedence, Property, PropertyKey, PropertyKind, RegexLit, ReturnStmt,
    SequenceExpr, Stmt, StrLit, SwitchCase, SwitchStmt, ThrowStmt, TryStmt, UnaryExpr, UnaryOp,
    VarDecl, VarStmt, WhileStmt, WithStmt,
};
use crate::parser::scanner::{Lexer, Span, Token, TokenKind, TokenValue};
use crate::settings::CodeSettings;

/// Recovery ceiling: one resynchronization may skip at most this many tokens.
const MAX_SKIPPED_TOKENS: usize = 50;

// ─────────────────────────────────────────────────────────────────────────────
// No-skip token sets
// ─────────────────────────────────────────────────────────────────────────────

/// Tokens that can begin (or end) a statement; the resynchronization set of
/// every statement list.
const NS_STMT: &[TokenKind] = &[
    TokenKind::Semicolon,
    TokenKind::LeftBrace,
    TokenKind::RightBrace,
    TokenKind::Var,
    TokenKind::Let,
    TokenKind::Const,
    TokenKind::If,
    TokenKind::Do,
    TokenKind::While,
    TokenKind::For,
    TokenKind::Continue,
    TokenKind::Break,
    TokenKind::Return,
    TokenKind::With,
    TokenKind::Switch,
    TokenKind::Throw,
    TokenKind::Try,
    TokenKind::Debugger,
    TokenKind::Function,
];

const NS_RPAREN: &[TokenKind] = &[TokenKind::RightParen];
const NS_RBRACKET: &[TokenKind] = &[TokenKind::RightBracket];
const NS_COLON: &[TokenKind] = &[TokenKind::Colon];
const NS_ARGS: &[TokenKind] = &[TokenKind::Comma, TokenKind::RightParen];
const NS_ARRAY: &[TokenKind] = &[TokenKind::Comma, TokenKind::RightBracket];
const NS_OBJECT: &[TokenKind] = &[TokenKind::Comma, TokenKind::RightBrace];
const NS_CASE: &[TokenKind] = &[TokenKind::Case, TokenKind::Default, TokenKind::RightBrace];

// ─────────────────────────────────────────────────────────────────────────────
// Parser plumbing
// ─────────────────────────────────────────────────────────────────────────────

/// How a production failed. `Recovered` unwinds to the claiming production;
/// `Fatal` unwinds to [`Parser::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParseError {
    Recovered,
    Fatal,
}

type PResult<T> = Result<T, ParseError>;

/// What [`Parser::parse`] yields: a best-effort program plus every
/// diagnostic collected along the way. Check the diagnostics' severities to
/// decide whether the program is trustworthy.
pub struct ParseResult {
    pub program: Block,
    pub diagnostics: Vec<Diagnostic>,
}

/// Constructs a `break`/`continue` must be able to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Enclosure {
    Loop,
    Switch,
}

/// The parser. Create one per source text and call [`Parser::parse`].
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    settings: &'a CodeSettings,
    current: Token,
    /// Span of the most recently consumed token.
    prev_span: Span,
    diagnostics: Vec<Diagnostic>,
    /// Stack of active no-skip sets, innermost last.
    no_skip: SmallVec<[&'static [TokenKind]; 8]>,
    /// A partially built statement waiting for the claiming production.
    pending_partial: Option<Stmt>,
    /// Important comments seen since the last statement boundary.
    pending_important: VecDeque<(Span, String)>,
    /// Labels currently in scope, outermost first, each with whether it
    /// labels an iteration statement (a legal `continue` target).
    labels: Vec<(String, bool)>,
    /// Loop/switch nesting for break/continue legality.
    enclosing: SmallVec<[Enclosure; 8]>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, settings: &'a CodeSettings) -> Self {
        // Embedded blocks are always tokenized; the parser reports them when
        // the settings forbid them.
        let lexer = Lexer::new(source).with_embedded_blocks(true);
        let mut parser = Self {
            lexer,
            settings,
            current: Token {
                kind: TokenKind::Eof,
                value: TokenValue::None,
                span: Span::default(),
                newline_before: false,
            },
            prev_span: Span::default(),
            diagnostics: Vec::new(),
            no_skip: SmallVec::new(),
            pending_partial: None,
            pending_important: VecDeque::new(),
            labels: Vec::new(),
            enclosing: SmallVec::new(),
        };
        parser.bump();
        parser
    }

    // ── Token pump ──────────────────────────────────────────────────────────

    /// Advance to the next significant token, skipping comments. Important
    /// comments (`/*!` and `/*@` conditional-compilation blocks) are queued
    /// for emission at the next statement boundary. A line terminator inside
    /// or before a skipped comment still reaches the following token's ASI
    /// flag.
    fn bump(&mut self) {
        self.prev_span = self.current.span;
        let mut newline = false;
        loop {
            let tok = self.lexer.next_token();
            match tok.kind {
                TokenKind::SingleLineComment => newline |= tok.newline_before,
                TokenKind::MultiLineComment => {
                    newline |= tok.newline_before;
                    if self.settings.preserve_important_comments {
                        let text = tok.text();
                        if text.starts_with("/*!") || text.starts_with("/*@") {
                            self.pending_important.push_back((tok.span, text.to_string()));
                        }
                    }
                }
                _ => {
                    let mut tok = tok;
                    tok.newline_before |= newline;
                    self.current = tok;
                    return;
                }
            }
        }
    }

    /// Look at the next significant token without consuming anything,
    /// scanning on a throwaway clone of the lexer.
    fn peek(&self) -> Token {
        let mut lexer = self.lexer.clone();
        loop {
            let tok = lexer.next_token();
            if !matches!(
                tok.kind,
                TokenKind::SingleLineComment | TokenKind::MultiLineComment
            ) {
                return tok;
            }
        }
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Raw source text of the current token.
    fn slice_text(&self) -> String {
        self.lexer.slice(self.current.span).to_string()
    }

    // ── Diagnostics & recovery ──────────────────────────────────────────────

    fn report(&mut self, kind: DiagnosticKind, span: Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(kind, span, message));
    }

    /// Record a diagnostic, then skip forward to a token some active
    /// no-skip set claims.
    fn recover(&mut self, kind: DiagnosticKind, span: Span, message: impl Into<String>) -> ParseError {
        self.report(kind, span, message);
        self.skip_to_safe_token()
    }

    /// Skip tokens until the current one appears in an active no-skip set.
    /// The offending token itself counts, so zero tokens may be skipped.
    fn skip_to_safe_token(&mut self) -> ParseError {
        let mut skipped = 0;
        loop {
            if self.at(TokenKind::Eof) {
                self.report(
                    DiagnosticKind::UnexpectedEndOfFile,
                    self.current.span,
                    "unexpected end of input",
                );
                return ParseError::Fatal;
            }
            if self
                .no_skip
                .iter()
                .any(|set| set.contains(&self.current.kind))
            {
                return ParseError::Recovered;
            }
            if skipped >= MAX_SKIPPED_TOKENS {
                self.report(
                    DiagnosticKind::TooManySkippedTokens,
                    self.current.span,
                    "could not resynchronize after a syntax error",
                );
                return ParseError::Fatal;
            }
            self.bump();
            skipped += 1;
        }
    }

    /// Consume `kind` or fail with recovery.
    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Span> {
        if self.at(kind) {
            let span = self.current.span;
            self.bump();
            Ok(span)
        } else {
            Err(self.recover(
                DiagnosticKind::ExpectedToken,
                self.current.span,
                format!("expected {what}"),
            ))
        }
    }

    /// Consume `kind`; on failure, recover and claim the error here if the
    /// skip landed on `kind`.
    fn expect_or_claim(&mut self, kind: TokenKind, what: &str) -> PResult<Span> {
        if self.at(kind) {
            let span = self.current.span;
            self.bump();
            return Ok(span);
        }
        match self.recover(
            DiagnosticKind::ExpectedToken,
            self.current.span,
            format!("expected {what}"),
        ) {
            ParseError::Fatal => Err(ParseError::Fatal),
            ParseError::Recovered => {
                if self.at(kind) {
                    let span = self.current.span;
                    self.bump();
                    Ok(span)
                } else {
                    Err(ParseError::Recovered)
                }
            }
        }
    }

    /// Run `f` with `set` pushed onto the no-skip stack.
    fn guarded<T>(
        &mut self,
        set: &'static [TokenKind],
        f: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<T> {
        self.no_skip.push(set);
        let result = f(self);
        self.no_skip.pop();
        result
    }

    fn in_enclosure<T>(&mut self, e: Enclosure, f: impl FnOnce(&mut Self) -> T) -> T {
        self.enclosing.push(e);
        let result = f(self);
        self.enclosing.pop();
        result
    }

    // ── Automatic semicolon insertion ───────────────────────────────────────

    /// Consume an explicit `;`, or apply ASI when the next token follows a
    /// line terminator, is `}`, or is end of input. ASI records an advisory
    /// diagnostic; anything else is a recoverable error.
    fn eat_semicolon(&mut self) -> PResult<Option<Span>> {
        if self.at(TokenKind::Semicolon) {
            let span = self.current.span;
            self.bump();
            return Ok(Some(span));
        }
        if matches!(self.current.kind, TokenKind::RightBrace | TokenKind::Eof)
            || self.current.newline_before
        {
            self.report(
                DiagnosticKind::SemicolonInsertion,
                self.prev_span,
                "semicolon inserted",
            );
            return Ok(None);
        }
        Err(self.recover(
            DiagnosticKind::ExpectedToken,
            self.current.span,
            "expected ';'",
        ))
    }

    /// Finish a terminated statement: on a failed terminator the built node
    /// is stashed in `pending_partial` for the claiming production.
    fn finish_stmt(&mut self, make: impl FnOnce(Option<Span>) -> Stmt) -> PResult<Stmt> {
        match self.eat_semicolon() {
            Ok(terminator) => Ok(make(terminator)),
            Err(e) => {
                self.pending_partial = Some(make(None));
                Err(e)
            }
        }
    }

    // ── Top level ───────────────────────────────────────────────────────────

    /// Parse the whole program. Never fails: fatal conditions end the parse
    /// early but still yield everything parsed so far.
    pub fn parse(mut self) -> ParseResult {
        self.no_skip.push(NS_STMT);
        let mut stmts = Vec::new();
        let mut prologue = true;
        loop {
            if let Some((span, text)) = self.pending_important.pop_front() {
                stmts.push(Stmt::ImportantComment(span, text));
                continue;
            }
            if self.at(TokenKind::Eof) {
                break;
            }
            match self.parse_statement() {
                Ok(stmt) => stmts.push(apply_prologue(stmt, &mut prologue)),
                Err(ParseError::Fatal) => {
                    if let Some(p) = self.pending_partial.take() {
                        stmts.push(p);
                    }
                    break;
                }
                Err(ParseError::Recovered) => {
                    // The top level claims every recovered error.
                    if let Some(p) = self.pending_partial.take() {
                        stmts.push(p);
                    }
                }
            }
        }
        while let Some((span, text)) = self.pending_important.pop_front() {
            stmts.push(Stmt::ImportantComment(span, text));
        }
        let span = match (stmts.first(), stmts.last()) {
            (Some(first), Some(last)) => first.span().combine(last.span()),
            _ => Span::default(),
        };
        ParseResult {
            program: Block { span, stmts },
            diagnostics: self.diagnostics,
        }
    }

    // ── Statements ──────────────────────────────────────────────────────────

    fn parse_statement(&mut self) -> PResult<Stmt> {
        match self.current.kind {
            TokenKind::Eof => {
                self.report(
                    DiagnosticKind::UnexpectedEndOfFile,
                    self.current.span,
                    "unexpected end of input",
                );
                Err(ParseError::Fatal)
            }
            TokenKind::LeftBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Semicolon => {
                let span = self.current.span;
                self.bump();
                Ok(Stmt::Empty(span))
            }
            TokenKind::Var => self.parse_var_statement(DeclKind::Var),
            TokenKind::Const => self.parse_var_statement(DeclKind::Const),
            TokenKind::Let if self.peek().kind == TokenKind::Identifier => {
                self.parse_var_statement(DeclKind::Let)
            }
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::Continue => self.parse_jump(false),
            TokenKind::Break => self.parse_jump(true),
            TokenKind::Return => self.parse_return(),
            TokenKind::With => self.parse_with(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Throw => self.parse_throw(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Debugger => {
                let span = self.current.span;
                self.bump();
                self.finish_stmt(|_| Stmt::Debugger(span))
            }
            TokenKind::Function => {
                let function = self.parse_function(true)?;
                Ok(Stmt::FunctionDecl(Box::new(function)))
            }
            TokenKind::Identifier if self.peek().kind == TokenKind::Colon => self.parse_labeled(),
            TokenKind::Class
            | TokenKind::Import
            | TokenKind::Export
            | TokenKind::Enum
            | TokenKind::Extends => {
                let span = self.current.span;
                let text = self.slice_text();
                Err(self.recover(
                    DiagnosticKind::UnsupportedSyntax,
                    span,
                    format!("'{text}' is not supported at this language level"),
                ))
            }
            TokenKind::RightBrace => {
                let span = self.current.span;
                self.report(DiagnosticKind::UnexpectedToken, span, "unexpected '}'");
                self.bump();
                Err(ParseError::Recovered)
            }
            TokenKind::Error => {
                let span = self.current.span;
                let msg = self.current.text().to_string();
                self.bump();
                Err(self.recover(DiagnosticKind::BadToken, span, msg))
            }
            TokenKind::EmbeddedBlock => {
                if !self.settings.allow_embedded_blocks {
                    self.report(
                        DiagnosticKind::EmbeddedBlockNotAllowed,
                        self.current.span,
                        "embedded '<% %>' blocks are disabled",
                    );
                }
                let span = self.current.span;
                let text = self.slice_text();
                self.bump();
                let terminator = if self.at(TokenKind::Semicolon) {
                    let s = self.current.span;
                    self.bump();
                    Some(s)
                } else {
                    None
                };
                Ok(Stmt::Expr(ExprStmt {
                    span,
                    expr: Expr::EmbeddedBlock(span, text),
                    terminator,
                }))
            }
            _ => self.parse_expression_statement(),
        }
    }

    /// A braced statement list.
    fn parse_block(&mut self) -> PResult<Block> {
        let start = self.expect(TokenKind::LeftBrace, "'{'")?;
        self.no_skip.push(NS_STMT);
        let mut stmts = Vec::new();
        let end;
        loop {
            if let Some((span, text)) = self.pending_important.pop_front() {
                stmts.push(Stmt::ImportantComment(span, text));
                continue;
            }
            match self.current.kind {
                TokenKind::RightBrace => {
                    end = self.current.span;
                    self.bump();
                    break;
                }
                TokenKind::Eof => {
                    self.report(
                        DiagnosticKind::UnexpectedEndOfFile,
                        self.current.span,
                        "unterminated block",
                    );
                    self.no_skip.pop();
                    return Err(ParseError::Fatal);
                }
                _ => {}
            }
            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(ParseError::Fatal) => {
                    self.no_skip.pop();
                    return Err(ParseError::Fatal);
                }
                Err(ParseError::Recovered) => {
                    if let Some(p) = self.pending_partial.take() {
                        stmts.push(p);
                    }
                    if !NS_STMT.contains(&self.current.kind) {
                        self.no_skip.pop();
                        return Err(ParseError::Recovered);
                    }
                }
            }
        }
        self.no_skip.pop();
        Ok(Block {
            span: start.combine(end),
            stmts,
        })
    }

    /// A control-flow body: a braced block or a single statement wrapped
    /// into one.
    fn parse_body_block(&mut self) -> PResult<Block> {
        if self.at(TokenKind::LeftBrace) {
            return self.parse_block();
        }
        let stmt = self.parse_statement()?;
        Ok(Block {
            span: stmt.span(),
            stmts: vec![stmt],
        })
    }

    /// Like [`Parser::parse_body_block`] but absorbs recovered errors into a
    /// best-effort (possibly empty) body, so the enclosing statement
    /// survives.
    fn body_or_empty(&mut self) -> PResult<Block> {
        match self.parse_body_block() {
            Ok(b) => Ok(b),
            Err(ParseError::Fatal) => Err(ParseError::Fatal),
            Err(ParseError::Recovered) => {
                let stmts = match self.pending_partial.take() {
                    Some(p) => vec![p],
                    None => Vec::new(),
                };
                Ok(Block {
                    span: self.prev_span,
                    stmts,
                })
            }
        }
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        let start = self.current.span;
        self.bump();
        let condition = self.parse_paren_condition(true)?;
        let true_branch = self.body_or_empty()?;
        let false_branch = if self.eat(TokenKind::Else) {
            Some(self.body_or_empty()?)
        } else {
            None
        };
        Ok(Stmt::If(Box::new(IfStmt {
            span: start.combine(self.prev_span),
            condition,
            true_branch,
            false_branch,
        })))
    }

    fn parse_while(&mut self) -> PResult<Stmt> {
        let start = self.current.span;
        self.bump();
        let condition = self.parse_paren_condition(true)?;
        let body = self.in_enclosure(Enclosure::Loop, |p| p.body_or_empty())?;
        Ok(Stmt::While(Box::new(WhileStmt {
            span: start.combine(self.prev_span),
            condition,
            body,
        })))
    }

    fn parse_do_while(&mut self) -> PResult<Stmt> {
        let start = self.current.span;
        self.bump();
        let body = self.in_enclosure(Enclosure::Loop, |p| p.body_or_empty())?;
        self.expect_or_claim(TokenKind::While, "'while'")?;
        let condition = self.parse_paren_condition(true)?;
        // A semicolon after `do … while (c)` is always optional; no ASI
        // diagnostic when it is missing.
        let terminator = if self.at(TokenKind::Semicolon) {
            let s = self.current.span;
            self.bump();
            Some(s)
        } else {
            None
        };
        Ok(Stmt::DoWhile(Box::new(DoWhileStmt {
            span: start.combine(self.prev_span),
            body,
            condition,
            terminator,
        })))
    }

    fn parse_jump(&mut self, is_break: bool) -> PResult<Stmt> {
        let start = self.current.span;
        self.bump();
        // Restricted production: a label never attaches across a line break.
        let label = if self.at(TokenKind::Identifier) && !self.current.newline_before {
            let ident = Ident {
                span: self.current.span,
                name: self.slice_text(),
            };
            self.bump();
            Some(ident)
        } else {
            None
        };
        match &label {
            Some(l) => match self.labels.iter().find(|entry| entry.0 == l.name) {
                None => {
                    self.report(
                        DiagnosticKind::NoLabel,
                        l.span,
                        format!("label '{}' is not in scope", l.name),
                    );
                }
                Some(&(_, wraps_loop)) => {
                    // `break` may target any labeled statement; `continue`
                    // only an iteration statement.
                    if !is_break && !wraps_loop {
                        self.report(
                            DiagnosticKind::BadBreakOrContinue,
                            l.span,
                            format!("'continue' label '{}' must target a loop", l.name),
                        );
                    }
                }
            },
            None => {
                let legal = if is_break {
                    self.enclosing
                        .iter()
                        .any(|e| matches!(e, Enclosure::Loop | Enclosure::Switch))
                } else {
                    self.enclosing.contains(&Enclosure::Loop)
                };
                if !legal {
                    let what = if is_break { "break" } else { "continue" };
                    self.report(
                        DiagnosticKind::BadBreakOrContinue,
                        start,
                        format!("'{what}' outside of a {}", if is_break { "loop or switch" } else { "loop" }),
                    );
                }
            }
        }
        self.finish_stmt(|terminator| {
            let jump = JumpStmt {
                span: start,
                label,
                escapes_finally: 0,
                terminator,
            };
            if is_break {
                Stmt::Break(jump)
            } else {
                Stmt::Continue(jump)
            }
        })
    }

    fn parse_return(&mut self) -> PResult<Stmt> {
        let start = self.current.span;
        self.bump();
        // Restricted production: `return` followed by a line terminator
        // returns undefined.
        let value = if matches!(
            self.current.kind,
            TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof
        ) || self.current.newline_before
        {
            None
        } else {
            Some(self.parse_expression(false, false)?)
        };
        self.finish_stmt(|terminator| {
            Stmt::Return(ReturnStmt {
                span: start,
                value,
                terminator,
            })
        })
    }

    fn parse_with(&mut self) -> PResult<Stmt> {
        let start = self.current.span;
        self.report(
            DiagnosticKind::WithNotRecommended,
            start,
            "'with' defeats name resolution and minification",
        );
        self.bump();
        let object = self.parse_paren_condition(false)?;
        let body = self.body_or_empty()?;
        Ok(Stmt::With(Box::new(WithStmt {
            span: start.combine(self.prev_span),
            object,
            body,
        })))
    }

    fn parse_switch(&mut self) -> PResult<Stmt> {
        let start = self.current.span;
        self.bump();
        let discriminant = self.parse_paren_condition(false)?;
        self.expect_or_claim(TokenKind::LeftBrace, "'{'")?;
        self.no_skip.push(NS_CASE);
        let result = self.in_enclosure(Enclosure::Switch, |p| p.parse_switch_cases());
        self.no_skip.pop();
        let cases = result?;
        Ok(Stmt::Switch(Box::new(SwitchStmt {
            span: start.combine(self.prev_span),
            discriminant,
            cases,
        })))
    }

    fn parse_switch_cases(&mut self) -> PResult<Vec<SwitchCase>> {
        let mut cases = Vec::new();
        loop {
            match self.current.kind {
                TokenKind::RightBrace => {
                    self.bump();
                    return Ok(cases);
                }
                TokenKind::Eof => {
                    self.report(
                        DiagnosticKind::UnexpectedEndOfFile,
                        self.current.span,
                        "unterminated switch body",
                    );
                    return Err(ParseError::Fatal);
                }
                TokenKind::Case => {
                    let start = self.current.span;
                    self.bump();
                    let test = self.guarded(NS_COLON, |p| {
                        match p.parse_expression(false, false) {
                            Ok(e) => Ok(e),
                            Err(ParseError::Recovered) if p.at(TokenKind::Colon) => {
                                Ok(Expr::Null(p.current.span))
                            }
                            Err(e) => Err(e),
                        }
                    })?;
                    self.expect_or_claim(TokenKind::Colon, "':'")?;
                    let body = self.parse_case_body()?;
                    cases.push(SwitchCase {
                        span: start.combine(self.prev_span),
                        test: Some(test),
                        body,
                    });
                }
                TokenKind::Default => {
                    let start = self.current.span;
                    self.bump();
                    self.expect_or_claim(TokenKind::Colon, "':'")?;
                    let body = self.parse_case_body()?;
                    cases.push(SwitchCase {
                        span: start.combine(self.prev_span),
                        test: None,
                        body,
                    });
                }
                _ => {
                    match self.recover(
                        DiagnosticKind::UnexpectedToken,
                        self.current.span,
                        "expected 'case' or 'default'",
                    ) {
                        ParseError::Fatal => return Err(ParseError::Fatal),
                        ParseError::Recovered => {
                            if !NS_CASE.contains(&self.current.kind) {
                                return Err(ParseError::Recovered);
                            }
                        }
                    }
                }
            }
        }
    }

    fn parse_case_body(&mut self) -> PResult<Vec<Stmt>> {
        let mut body = Vec::new();
        loop {
            if matches!(
                self.current.kind,
                TokenKind::Case | TokenKind::Default | TokenKind::RightBrace | TokenKind::Eof
            ) {
                return Ok(body);
            }
            match self.parse_statement() {
                Ok(stmt) => body.push(stmt),
                Err(ParseError::Fatal) => return Err(ParseError::Fatal),
                Err(ParseError::Recovered) => {
                    if let Some(p) = self.pending_partial.take() {
                        body.push(p);
                    }
                    if !NS_STMT.contains(&self.current.kind)
                        && !NS_CASE.contains(&self.current.kind)
                    {
                        return Err(ParseError::Recovered);
                    }
                }
            }
        }
    }

    fn parse_labeled(&mut self) -> PResult<Stmt> {
        // Collect the whole `a: b: …` chain before the body: whether
        // `continue` may target any of these labels depends on the statement
        // after the last colon.
        let mut chain: Vec<(Ident, Span, u32)> = Vec::new();
        loop {
            let label = Ident {
                span: self.current.span,
                name: self.slice_text(),
            };
            let start = self.current.span;
            self.bump(); // label
            self.bump(); // colon
            if self.labels.iter().any(|(name, _)| *name == label.name)
                || chain.iter().any(|(l, _, _)| l.name == label.name)
            {
                self.report(
                    DiagnosticKind::DuplicateLabel,
                    label.span,
                    format!("label '{}' is already in scope", label.name),
                );
            }
            let nest_level = (self.labels.len() + chain.len()) as u32;
            chain.push((label, start, nest_level));
            if !(self.at(TokenKind::Identifier) && self.peek().kind == TokenKind::Colon) {
                break;
            }
        }
        let labels_loop = matches!(
            self.current.kind,
            TokenKind::For | TokenKind::While | TokenKind::Do
        );
        let depth = self.labels.len();
        self.labels
            .extend(chain.iter().map(|(l, _, _)| (l.name.clone(), labels_loop)));
        let body = self.parse_statement();
        self.labels.truncate(depth);
        let mut stmt = body?;
        for (label, start, nest_level) in chain.into_iter().rev() {
            stmt = Stmt::Labeled(Box::new(LabeledStmt {
                span: start.combine(self.prev_span),
                label,
                nest_level,
                body: Box::new(stmt),
            }));
        }
        Ok(stmt)
    }

    fn parse_throw(&mut self) -> PResult<Stmt> {
        let start = self.current.span;
        self.bump();
        // Restricted production: no line terminator after `throw`.
        let value = if self.current.newline_before {
            self.report(
                DiagnosticKind::ExpressionExpected,
                self.current.span,
                "'throw' requires an expression on the same line",
            );
            Expr::Null(start)
        } else {
            self.parse_expression(false, false)?
        };
        self.finish_stmt(|terminator| {
            Stmt::Throw(ThrowStmt {
                span: start,
                value,
                terminator,
            })
        })
    }

    fn parse_try(&mut self) -> PResult<Stmt> {
        let start = self.current.span;
        self.bump();
        let mut block = self.parse_block()?;
        let mut catch = if self.at(TokenKind::Catch) {
            self.bump();
            self.expect_or_claim(TokenKind::LeftParen, "'('")?;
            let param = self.parse_binding_name()?;
            self.expect_or_claim(TokenKind::RightParen, "')'")?;
            let body = self.parse_block()?;
            Some(CatchClause {
                span: param.span.combine(self.prev_span),
                param,
                body,
            })
        } else {
            None
        };
        let finally = if self.at(TokenKind::Finally) {
            self.bump();
            Some(self.parse_block()?)
        } else {
            None
        };
        if catch.is_none() && finally.is_none() {
            self.report(
                DiagnosticKind::ExpectedToken,
                self.current.span,
                "expected 'catch' or 'finally'",
            );
        }
        if finally.is_some() {
            bump_finally_escapes(&mut block);
            if let Some(c) = &mut catch {
                bump_finally_escapes(&mut c.body);
            }
        }
        Ok(Stmt::Try(Box::new(TryStmt {
            span: start.combine(self.prev_span),
            block,
            catch,
            finally,
        })))
    }

    fn parse_function(&mut self, is_declaration: bool) -> PResult<Function> {
        let start = self.current.span;
        self.bump(); // `function`
        let name = if self.at(TokenKind::Identifier) {
            let ident = Ident {
                span: self.current.span,
                name: self.slice_text(),
            };
            self.bump();
            Some(ident)
        } else {
            if is_declaration {
                self.report(
                    DiagnosticKind::NoIdentifier,
                    self.current.span,
                    "function declaration requires a name",
                );
            }
            None
        };
        self.expect_or_claim(TokenKind::LeftParen, "'('")?;
        let mut params = Vec::new();
        if !self.at(TokenKind::RightParen) {
            loop {
                params.push(self.parse_binding_name()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect_or_claim(TokenKind::RightParen, "')'")?;
        // Labels and break targets never cross a function boundary.
        let saved_labels = mem::take(&mut self.labels);
        let saved_enclosing = mem::take(&mut self.enclosing);
        let body = self.parse_function_body();
        self.labels = saved_labels;
        self.enclosing = saved_enclosing;
        let body = body?;
        Ok(Function {
            span: start.combine(self.prev_span),
            name,
            params,
            body,
        })
    }

    /// A function body: a block whose leading string statements form a
    /// directive prologue.
    fn parse_function_body(&mut self) -> PResult<Block> {
        let mut block = self.parse_block()?;
        let mut prologue = true;
        let stmts = mem::take(&mut block.stmts);
        block.stmts = stmts
            .into_iter()
            .map(|s| apply_prologue(s, &mut prologue))
            .collect();
        Ok(block)
    }

    fn parse_binding_name(&mut self) -> PResult<Ident> {
        if self.at(TokenKind::Identifier) {
            let ident = Ident {
                span: self.current.span,
                name: self.slice_text(),
            };
            self.bump();
            Ok(ident)
        } else {
            Err(self.recover(
                DiagnosticKind::NoIdentifier,
                self.current.span,
                "expected a binding name",
            ))
        }
    }

    fn parse_var_statement(&mut self, kind: DeclKind) -> PResult<Stmt> {
        let start = self.current.span;
        self.bump();
        let mut var = self.parse_var_decl_list(start, kind, false)?;
        self.finish_stmt(move |terminator| {
            var.terminator = terminator;
            Stmt::Var(var)
        })
    }

    fn parse_expression_statement(&mut self) -> PResult<Stmt> {
        let start = self.current.span;
        let expr = self.parse_expression(false, false)?;
        let span = start.combine(self.prev_span);
        self.finish_stmt(|terminator| {
            Stmt::Expr(ExprStmt {
                span,
                expr,
                terminator,
            })
        })
    }

    /// `( expression )` for if/while/switch/with heads. With `warn_assign`,
    /// a top-level plain `=` draws a suspicion diagnostic.
    fn parse_paren_condition(&mut self, warn_assign: bool) -> PResult<Expr> {
        self.expect_or_claim(TokenKind::LeftParen, "'('")?;
        let expr = self.guarded(NS_RPAREN, |p| match p.parse_expression(false, false) {
            Ok(e) => Ok(e),
            Err(ParseError::Recovered) if p.at(TokenKind::RightParen) => {
                Ok(Expr::Null(p.current.span))
            }
            Err(e) => Err(e),
        })?;
        self.expect_or_claim(TokenKind::RightParen, "')'")?;
        if warn_assign {
            if let Expr::Assign(a) = &expr {
                if a.op == AssignOp::Assign {
                    self.report(
                        DiagnosticKind::SuspiciousAssignment,
                        expr.span(),
                        "assignment in a condition; did you mean '=='?",
                    );
                }
            }
        }
        Ok(expr)
    }

    // ── Variable declarations ───────────────────────────────────────────────

    fn parse_var_decl_list(&mut self, start: Span, kind: DeclKind, no_in: bool) -> PResult<VarStmt> {
        let mut decls = Vec::new();
        loop {
            if !self.at(TokenKind::Identifier) {
                if !decls.is_empty() {
                    self.pending_partial = Some(Stmt::Var(VarStmt {
                        span: start.combine(self.prev_span),
                        kind,
                        decls: mem::take(&mut decls),
                        terminator: None,
                    }));
                }
                return Err(self.recover(
                    DiagnosticKind::NoIdentifier,
                    self.current.span,
                    "expected a binding name",
                ));
            }
            let name = Ident {
                span: self.current.span,
                name: self.slice_text(),
            };
            self.bump();
            let init = if self.eat(TokenKind::Equal) {
                Some(self.parse_expression(no_in, true)?)
            } else {
                None
            };
            let span = match &init {
                Some(e) => name.span.combine(e.span()),
                None => name.span,
            };
            decls.push(VarDecl { span, name, init });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(VarStmt {
            span: start.combine(self.prev_span),
            kind,
            decls,
            terminator: None,
        })
    }

    // ── for / for-in / for-of ───────────────────────────────────────────────

    fn parse_for(&mut self) -> PResult<Stmt> {
        let start = self.current.span;
        self.bump();
        self.expect_or_claim(TokenKind::LeftParen, "'('")?;

        // Head: nothing, a declaration list, or an expression — parsed with
        // `in` withheld so a following `in`/`of` can flip this into an
        // enumeration statement.
        let init: Option<Box<Stmt>> = match self.current.kind {
            TokenKind::Semicolon => None,
            TokenKind::Var | TokenKind::Const => {
                let kind = if self.at(TokenKind::Var) {
                    DeclKind::Var
                } else {
                    DeclKind::Const
                };
                let decl_start = self.current.span;
                self.bump();
                let var = self.parse_var_decl_list(decl_start, kind, true)?;
                if let Some(kind_in) = self.for_in_kind() {
                    return self.parse_for_in_tail(start, kind_in, Stmt::Var(var));
                }
                Some(Box::new(Stmt::Var(var)))
            }
            TokenKind::Let if self.peek().kind == TokenKind::Identifier => {
                let decl_start = self.current.span;
                self.bump();
                let var = self.parse_var_decl_list(decl_start, DeclKind::Let, true)?;
                if let Some(kind_in) = self.for_in_kind() {
                    return self.parse_for_in_tail(start, kind_in, Stmt::Var(var));
                }
                Some(Box::new(Stmt::Var(var)))
            }
            _ => {
                let expr = self.parse_expression(true, false)?;
                if let Some(kind_in) = self.for_in_kind() {
                    // Reinterpretation requires an assignable head; anything
                    // else has nowhere to store the enumerated key.
                    if !is_assignment_target(&expr) {
                        self.report(
                            DiagnosticKind::UnexpectedToken,
                            self.current.span,
                            format!(
                                "the target of 'for-{}' must be assignable",
                                kind_in.as_str()
                            ),
                        );
                    }
                    let left = Stmt::Expr(ExprStmt {
                        span: expr.span(),
                        expr,
                        terminator: None,
                    });
                    return self.parse_for_in_tail(start, kind_in, left);
                }
                Some(Box::new(Stmt::Expr(ExprStmt {
                    span: expr.span(),
                    expr,
                    terminator: None,
                })))
            }
        };

        self.expect_or_claim(TokenKind::Semicolon, "';'")?;
        let condition = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression(false, false)?)
        };
        self.expect_or_claim(TokenKind::Semicolon, "';'")?;
        let update = if self.at(TokenKind::RightParen) {
            None
        } else {
            Some(self.guarded(NS_RPAREN, |p| p.parse_expression(false, false))?)
        };
        self.expect_or_claim(TokenKind::RightParen, "')'")?;
        let body = self.in_enclosure(Enclosure::Loop, |p| p.body_or_empty())?;
        Ok(Stmt::For(Box::new(ForStmt {
            span: start.combine(self.prev_span),
            init,
            condition,
            update,
            body,
        })))
    }

    fn for_in_kind(&mut self) -> Option<ForInKind> {
        match self.current.kind {
            TokenKind::In => Some(ForInKind::In),
            TokenKind::Of => Some(ForInKind::Of),
            _ => None,
        }
    }

    fn parse_for_in_tail(&mut self, start: Span, kind: ForInKind, left: Stmt) -> PResult<Stmt> {
        self.bump(); // `in` / `of`
        // `for-in` enumerates an Expression; `for-of` takes a single
        // assignment expression.
        let right = self.guarded(NS_RPAREN, |p| {
            p.parse_expression(false, kind == ForInKind::Of)
        })?;
        self.expect_or_claim(TokenKind::RightParen, "')'")?;
        let body = self.in_enclosure(Enclosure::Loop, |p| p.body_or_empty())?;
        Ok(Stmt::ForIn(Box::new(ForInStmt {
            span: start.combine(self.prev_span),
            kind,
            left: Box::new(left),
            right,
            body,
        })))
    }

    // ── Expressions ─────────────────────────────────────────────────────────

    /// Operator-precedence expression parsing over two stacks. `no_in`
    /// withholds the `in` operator (for-statement heads); `single` withholds
    /// the comma operator (list elements).
    fn parse_expression(&mut self, no_in: bool, single: bool) -> PResult<Expr> {
        let mut operands: SmallVec<[Expr; 8]> = SmallVec::new();
        let mut operators: SmallVec<[StackOp; 8]> = SmallVec::new();
        let mut operand = self.parse_unary()?;
        loop {
            if self.at(TokenKind::Arrow) {
                // Tokenized only to be rejected here with a useful message.
                match self.recover(
                    DiagnosticKind::UnsupportedSyntax,
                    self.current.span,
                    "arrow functions are not supported at this language level",
                ) {
                    ParseError::Fatal => return Err(ParseError::Fatal),
                    ParseError::Recovered => break,
                }
            }
            let op = match self.operator_at(no_in, single) {
                Some(op) => op,
                None => break,
            };
            // Reduce while the stack top binds tighter, or equally tight
            // with a left-associative incoming operator. The empty stack is
            // the sentinel.
            while let Some(top) = operators.last() {
                let top_prec = top.stack_precedence();
                let cur_prec = op.precedence();
                if top_prec > cur_prec || (top_prec == cur_prec && op.is_left_associative()) {
                    let top = operators.pop().unwrap();
                    let left = operands.pop().unwrap();
                    operand = reduce(top, left, operand);
                } else {
                    break;
                }
            }
            let stack_op = match op {
                OpToken::Question => {
                    self.bump();
                    let if_true = self.guarded(NS_COLON, |p| {
                        let e = match p.parse_expression(false, true) {
                            Ok(e) => e,
                            Err(ParseError::Recovered) if p.at(TokenKind::Colon) => {
                                Expr::Null(p.current.span)
                            }
                            Err(e) => return Err(e),
                        };
                        p.expect_or_claim(TokenKind::Colon, "':'")?;
                        Ok(e)
                    })?;
                    StackOp::Conditional(if_true)
                }
                OpToken::Binary(b) => {
                    self.bump();
                    StackOp::Binary(b)
                }
                OpToken::Assign(a) => {
                    self.bump();
                    StackOp::Assign(a)
                }
                OpToken::Comma => {
                    self.bump();
                    StackOp::Comma
                }
            };
            operators.push(stack_op);
            operands.push(operand);
            operand = self.parse_unary()?;
        }
        while let Some(top) = operators.pop() {
            let left = operands.pop().expect("operand stack tracks operator stack");
            operand = reduce(top, left, operand);
        }
        Ok(operand)
    }

    /// Map the current token to a pending operator, if it is one in this
    /// context.
    fn operator_at(&self, no_in: bool, single: bool) -> Option<OpToken> {
        use TokenKind as K;
        Some(match self.current.kind {
            K::Plus => OpToken::Binary(BinaryOp::Add),
            K::Minus => OpToken::Binary(BinaryOp::Sub),
            K::Star => OpToken::Binary(BinaryOp::Mul),
            K::StarStar => OpToken::Binary(BinaryOp::Exp),
            K::Slash => OpToken::Binary(BinaryOp::Div),
            K::Percent => OpToken::Binary(BinaryOp::Mod),
            K::EqualEqual => OpToken::Binary(BinaryOp::Equal),
            K::BangEqual => OpToken::Binary(BinaryOp::NotEqual),
            K::EqualEqualEqual => OpToken::Binary(BinaryOp::StrictEqual),
            K::BangEqualEqual => OpToken::Binary(BinaryOp::StrictNotEqual),
            K::Less => OpToken::Binary(BinaryOp::Less),
            K::Greater => OpToken::Binary(BinaryOp::Greater),
            K::LessEqual => OpToken::Binary(BinaryOp::LessEqual),
            K::GreaterEqual => OpToken::Binary(BinaryOp::GreaterEqual),
            K::In if !no_in => OpToken::Binary(BinaryOp::In),
            K::Instanceof => OpToken::Binary(BinaryOp::Instanceof),
            K::LessLess => OpToken::Binary(BinaryOp::ShiftLeft),
            K::GreaterGreater => OpToken::Binary(BinaryOp::ShiftRight),
            K::GreaterGreaterGreater => OpToken::Binary(BinaryOp::ShiftRightUnsigned),
            K::Ampersand => OpToken::Binary(BinaryOp::BitAnd),
            K::Pipe => OpToken::Binary(BinaryOp::BitOr),
            K::Caret => OpToken::Binary(BinaryOp::BitXor),
            K::AmpersandAmpersand => OpToken::Binary(BinaryOp::LogicalAnd),
            K::PipePipe => OpToken::Binary(BinaryOp::LogicalOr),
            K::QuestionQuestion => OpToken::Binary(BinaryOp::NullishCoalesce),
            K::Equal => OpToken::Assign(AssignOp::Assign),
            K::PlusEqual => OpToken::Assign(AssignOp::AddAssign),
            K::MinusEqual => OpToken::Assign(AssignOp::SubAssign),
            K::StarEqual => OpToken::Assign(AssignOp::MulAssign),
            K::StarStarEqual => OpToken::Assign(AssignOp::ExpAssign),
            K::SlashEqual => OpToken::Assign(AssignOp::DivAssign),
            K::PercentEqual => OpToken::Assign(AssignOp::ModAssign),
            K::LessLessEqual => OpToken::Assign(AssignOp::ShiftLeftAssign),
            K::GreaterGreaterEqual => OpToken::Assign(AssignOp::ShiftRightAssign),
            K::GreaterGreaterGreaterEqual => OpToken::Assign(AssignOp::ShiftRightUnsignedAssign),
            K::AmpersandEqual => OpToken::Assign(AssignOp::BitAndAssign),
            K::PipeEqual => OpToken::Assign(AssignOp::BitOrAssign),
            K::CaretEqual => OpToken::Assign(AssignOp::BitXorAssign),
            K::QuestionQuestionEqual => OpToken::Assign(AssignOp::NullishAssign),
            K::Question => OpToken::Question,
            K::Comma if !single => OpToken::Comma,
            _ => return None,
        })
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let op = match self.current.kind {
            TokenKind::Delete => Some(UnaryOp::Delete),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::PlusPlus => Some(UnaryOp::Increment),
            TokenKind::MinusMinus => Some(UnaryOp::Decrement),
            _ => None,
        };
        if let Some(op) = op {
            let start = self.current.span;
            self.bump();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary(Box::new(UnaryExpr {
                span: start.combine(operand.span()),
                op,
                operand,
            })));
        }
        let mut expr = self.parse_lhs()?;
        // Postfix updates never attach across a line terminator; the
        // operator instead starts the next statement as a prefix.
        while matches!(
            self.current.kind,
            TokenKind::PlusPlus | TokenKind::MinusMinus
        ) && !self.current.newline_before
        {
            let op = if self.at(TokenKind::PlusPlus) {
                PostfixOp::Increment
            } else {
                PostfixOp::Decrement
            };
            let span = expr.span().combine(self.current.span);
            self.bump();
            expr = Expr::Postfix(Box::new(PostfixExpr {
                span,
                op,
                operand: expr,
            }));
        }
        Ok(expr)
    }

    fn parse_lhs(&mut self) -> PResult<Expr> {
        let expr = if self.at(TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        self.parse_call_tail(expr)
    }

    fn parse_new(&mut self) -> PResult<Expr> {
        let start = self.current.span;
        self.bump();
        let callee = if self.at(TokenKind::New) {
            self.parse_new()?
        } else {
            let primary = self.parse_primary()?;
            self.parse_member_tail(primary)?
        };
        let (args, end) = if self.at(TokenKind::LeftParen) {
            self.parse_arguments()?
        } else {
            (Vec::new(), callee.span())
        };
        Ok(Expr::New(Box::new(NewExpr {
            span: start.combine(end),
            callee,
            args,
        })))
    }

    /// `.name` and `[index]` suffixes only — the callee of `new`.
    fn parse_member_tail(&mut self, mut expr: Expr) -> PResult<Expr> {
        loop {
            match self.current.kind {
                TokenKind::Dot => {
                    self.bump();
                    let property = self.parse_ident_name()?;
                    let span = expr.span().combine(property.span);
                    expr = Expr::Member(Box::new(MemberExpr {
                        span,
                        object: expr,
                        property,
                    }));
                }
                TokenKind::LeftBracket => {
                    expr = self.parse_index_suffix(expr)?;
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Member, index, and call suffixes.
    fn parse_call_tail(&mut self, mut expr: Expr) -> PResult<Expr> {
        loop {
            match self.current.kind {
                TokenKind::Dot => {
                    self.bump();
                    let property = self.parse_ident_name()?;
                    let span = expr.span().combine(property.span);
                    expr = Expr::Member(Box::new(MemberExpr {
                        span,
                        object: expr,
                        property,
                    }));
                }
                TokenKind::LeftBracket => {
                    expr = self.parse_index_suffix(expr)?;
                }
                TokenKind::LeftParen => {
                    let (args, end) = self.parse_arguments()?;
                    let span = expr.span().combine(end);
                    expr = Expr::Call(Box::new(CallExpr {
                        span,
                        callee: expr,
                        args,
                    }));
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_index_suffix(&mut self, expr: Expr) -> PResult<Expr> {
        self.bump(); // `[`
        let index = self.guarded(NS_RBRACKET, |p| {
            let e = match p.parse_expression(false, false) {
                Ok(e) => e,
                Err(ParseError::Recovered) if p.at(TokenKind::RightBracket) => {
                    Expr::Null(p.current.span)
                }
                Err(e) => return Err(e),
            };
            p.expect_or_claim(TokenKind::RightBracket, "']'")?;
            Ok(e)
        })?;
        let span = expr.span().combine(self.prev_span);
        Ok(Expr::Index(Box::new(IndexExpr {
            span,
            object: expr,
            index,
        })))
    }

    fn parse_arguments(&mut self) -> PResult<(Vec<Expr>, Span)> {
        self.expect(TokenKind::LeftParen, "'('")?;
        self.guarded(NS_ARGS, |p| {
            let mut args = Vec::new();
            loop {
                if p.at(TokenKind::RightParen) {
                    break;
                }
                match p.parse_expression(false, true) {
                    Ok(e) => args.push(e),
                    Err(ParseError::Fatal) => return Err(ParseError::Fatal),
                    Err(ParseError::Recovered) => {
                        if !matches!(
                            p.current.kind,
                            TokenKind::Comma | TokenKind::RightParen
                        ) {
                            return Err(ParseError::Recovered);
                        }
                    }
                }
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            let end = p.expect_or_claim(TokenKind::RightParen, "')'")?;
            Ok((args, end))
        })
    }

    fn parse_ident_name(&mut self) -> PResult<Ident> {
        if self.current.kind.is_identifier_name() {
            let ident = Ident {
                span: self.current.span,
                name: self.slice_text(),
            };
            self.bump();
            Ok(ident)
        } else {
            Err(self.recover(
                DiagnosticKind::ExpectedToken,
                self.current.span,
                "expected a property name",
            ))
        }
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let span = self.current.span;
        match self.current.kind {
            TokenKind::Null => {
                self.bump();
                Ok(Expr::Null(span))
            }
            TokenKind::True => {
                self.bump();
                Ok(Expr::True(span))
            }
            TokenKind::False => {
                self.bump();
                Ok(Expr::False(span))
            }
            TokenKind::This => {
                self.bump();
                Ok(Expr::This(span))
            }
            TokenKind::NumericLiteral => {
                let value = match self.current.value {
                    TokenValue::Number(n) => n,
                    _ => f64::NAN,
                };
                let raw = self.slice_text();
                self.bump();
                Ok(Expr::Num(NumLit { span, value, raw }))
            }
            TokenKind::StringLiteral => {
                let raw = self.current.text().to_string();
                let value = decode_string_literal(&raw);
                self.bump();
                Ok(Expr::Str(StrLit { span, value, raw }))
            }
            TokenKind::RegExpLiteral => {
                let raw = self.current.text().to_string();
                self.bump();
                Ok(Expr::Regex(regex_from_raw(span, &raw)))
            }
            // The scanner's heuristic called this a division; grammar
            // context says a term must start here, so re-scan it as a
            // regular expression.
            TokenKind::Slash | TokenKind::SlashEqual => {
                let slash = self.current.clone();
                match self.lexer.rescan_as_regexp(&slash) {
                    Some(tok) => {
                        let raw = tok.text().to_string();
                        let span = tok.span;
                        self.current = tok;
                        self.bump();
                        Ok(Expr::Regex(regex_from_raw(span, &raw)))
                    }
                    None => {
                        self.report(
                            DiagnosticKind::ExpressionExpected,
                            span,
                            "expected an expression",
                        );
                        Ok(Expr::Null(span))
                    }
                }
            }
            TokenKind::Identifier => {
                let name = self.slice_text();
                self.bump();
                Ok(Expr::Ident(Ident { span, name }))
            }
            // Contextual keywords fall back to plain identifiers here.
            TokenKind::Of | TokenKind::Get | TokenKind::Set | TokenKind::Let => {
                let name = self.slice_text();
                self.bump();
                Ok(Expr::Ident(Ident { span, name }))
            }
            TokenKind::LeftParen => {
                self.bump();
                // No parenthesized node exists: the printer re-derives
                // minimal parentheses from precedence alone.
                self.guarded(NS_RPAREN, |p| {
                    let e = match p.parse_expression(false, false) {
                        Ok(e) => e,
                        Err(ParseError::Recovered) if p.at(TokenKind::RightParen) => {
                            Expr::Null(p.current.span)
                        }
                        Err(e) => return Err(e),
                    };
                    p.expect_or_claim(TokenKind::RightParen, "')'")?;
                    Ok(e)
                })
            }
            TokenKind::LeftBracket => self.parse_array_literal(),
            TokenKind::LeftBrace => self.parse_object_literal(),
            TokenKind::Function => {
                let function = self.parse_function(false)?;
                Ok(Expr::Function(Box::new(function)))
            }
            TokenKind::EmbeddedBlock => {
                if !self.settings.allow_embedded_blocks {
                    self.report(
                        DiagnosticKind::EmbeddedBlockNotAllowed,
                        span,
                        "embedded '<% %>' blocks are disabled",
                    );
                }
                let text = self.slice_text();
                self.bump();
                Ok(Expr::EmbeddedBlock(span, text))
            }
            TokenKind::Class | TokenKind::Super | TokenKind::Import => {
                let text = self.slice_text();
                self.report(
                    DiagnosticKind::UnsupportedSyntax,
                    span,
                    format!("'{text}' is not supported at this language level"),
                );
                self.bump();
                Ok(Expr::Null(span))
            }
            TokenKind::Error => {
                let msg = self.current.text().to_string();
                self.report(DiagnosticKind::BadToken, span, msg);
                self.bump();
                self.parse_primary()
            }
            _ => {
                // Substitute a placeholder constant and let the caller's
                // context resynchronize.
                self.report(
                    DiagnosticKind::ExpressionExpected,
                    span,
                    "expected an expression",
                );
                Ok(Expr::Null(span))
            }
        }
    }

    fn parse_array_literal(&mut self) -> PResult<Expr> {
        let start = self.current.span;
        self.bump();
        self.guarded(NS_ARRAY, |p| {
            let mut elements = Vec::new();
            loop {
                if p.at(TokenKind::RightBracket) {
                    break;
                }
                if p.at(TokenKind::Comma) {
                    // Elision.
                    elements.push(None);
                    p.bump();
                    continue;
                }
                match p.parse_expression(false, true) {
                    Ok(e) => elements.push(Some(e)),
                    Err(ParseError::Fatal) => return Err(ParseError::Fatal),
                    Err(ParseError::Recovered) => {
                        if !matches!(
                            p.current.kind,
                            TokenKind::Comma | TokenKind::RightBracket
                        ) {
                            return Err(ParseError::Recovered);
                        }
                    }
                }
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            let end = p.expect_or_claim(TokenKind::RightBracket, "']'")?;
            Ok(Expr::Array(Box::new(ArrayLit {
                span: start.combine(end),
                elements,
            })))
        })
    }

    fn parse_object_literal(&mut self) -> PResult<Expr> {
        let start = self.current.span;
        self.bump();
        self.guarded(NS_OBJECT, |p| {
            let mut properties = Vec::new();
            loop {
                if p.at(TokenKind::RightBrace) {
                    break;
                }
                match p.parse_property() {
                    Ok(prop) => properties.push(prop),
                    Err(ParseError::Fatal) => return Err(ParseError::Fatal),
                    Err(ParseError::Recovered) => {
                        if !matches!(p.current.kind, TokenKind::Comma | TokenKind::RightBrace) {
                            return Err(ParseError::Recovered);
                        }
                    }
                }
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            let end = p.expect_or_claim(TokenKind::RightBrace, "'}'")?;
            Ok(Expr::Object(Box::new(ObjectLit {
                span: start.combine(end),
                properties,
            })))
        })
    }

    fn parse_property(&mut self) -> PResult<Property> {
        // `get`/`set` introduce an accessor only when another key follows;
        // `get: 1` is a plain property named "get".
        let accessor = match self.current.kind {
            TokenKind::Get | TokenKind::Set => {
                let next = self.peek().kind;
                if next.is_identifier_name()
                    || matches!(next, TokenKind::StringLiteral | TokenKind::NumericLiteral)
                {
                    let kind = if self.at(TokenKind::Get) {
                        PropertyKind::Get
                    } else {
                        PropertyKind::Set
                    };
                    self.bump();
                    Some(kind)
                } else {
                    None
                }
            }
            _ => None,
        };
        let key = self.parse_property_key()?;
        if let Some(kind) = accessor {
            let value = self.parse_accessor_body(key.span())?;
            return Ok(Property {
                span: key.span().combine(value.span()),
                kind,
                key,
                value,
            });
        }
        self.expect_or_claim(TokenKind::Colon, "':'")?;
        let value = self.parse_expression(false, true)?;
        Ok(Property {
            span: key.span().combine(value.span()),
            kind: PropertyKind::Init,
            key,
            value,
        })
    }

    fn parse_property_key(&mut self) -> PResult<PropertyKey> {
        let span = self.current.span;
        match self.current.kind {
            TokenKind::StringLiteral => {
                let raw = self.current.text().to_string();
                let value = decode_string_literal(&raw);
                self.bump();
                Ok(PropertyKey::Str(StrLit { span, value, raw }))
            }
            TokenKind::NumericLiteral => {
                let value = match self.current.value {
                    TokenValue::Number(n) => n,
                    _ => f64::NAN,
                };
                let raw = self.slice_text();
                self.bump();
                Ok(PropertyKey::Num(NumLit { span, value, raw }))
            }
            kind if kind.is_identifier_name() => {
                let name = self.slice_text();
                self.bump();
                Ok(PropertyKey::Ident(Ident { span, name }))
            }
            _ => Err(self.recover(
                DiagnosticKind::ExpectedToken,
                span,
                "expected a property name",
            )),
        }
    }

    /// The parameter list and body of a `get`/`set` accessor.
    fn parse_accessor_body(&mut self, key_span: Span) -> PResult<Expr> {
        self.expect_or_claim(TokenKind::LeftParen, "'('")?;
        let mut params = Vec::new();
        if !self.at(TokenKind::RightParen) {
            loop {
                params.push(self.parse_binding_name()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect_or_claim(TokenKind::RightParen, "')'")?;
        let saved_labels = mem::take(&mut self.labels);
        let saved_enclosing = mem::take(&mut self.enclosing);
        let body = self.parse_function_body();
        self.labels = saved_labels;
        self.enclosing = saved_enclosing;
        let body = body?;
        Ok(Expr::Function(Box::new(Function {
            span: key_span.combine(self.prev_span),
            name: None,
            params,
            body,
        })))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Expression stack machinery
// ─────────────────────────────────────────────────────────────────────────────

/// A pending operator recognized at the current token.
enum OpToken {
    Binary(BinaryOp),
    Assign(AssignOp),
    Question,
    Comma,
}

impl OpToken {
    fn precedence(&self) -> Precedence {
        match self {
            OpToken::Binary(b) => b.precedence(),
            OpToken::Assign(_) => Precedence::Assignment,
            OpToken::Question => Precedence::Conditional,
            OpToken::Comma => Precedence::Comma,
        }
    }

    fn is_left_associative(&self) -> bool {
        match self {
            OpToken::Binary(b) => b.is_left_associative(),
            OpToken::Assign(_) | OpToken::Question => false,
            OpToken::Comma => true,
        }
    }
}

/// An operator held on the stack, with the ternary's middle operand parsed
/// inline.
enum StackOp {
    Binary(BinaryOp),
    Assign(AssignOp),
    Conditional(Expr),
    Comma,
}

impl StackOp {
    /// Precedence used when this operator is a reduction candidate. A held
    /// conditional reduces like an assignment so that `a ? b : c = d`
    /// groups as `a ? b : (c = d)`.
    fn stack_precedence(&self) -> Precedence {
        match self {
            StackOp::Binary(b) => b.precedence(),
            StackOp::Assign(_) | StackOp::Conditional(_) => Precedence::Assignment,
            StackOp::Comma => Precedence::Comma,
        }
    }
}

/// Combine `left op right` into one node. Comma reductions flatten into an
/// n-ary sequence.
fn reduce(op: StackOp, left: Expr, right: Expr) -> Expr {
    let span = left.span().combine(right.span());
    match op {
        StackOp::Binary(op) => Expr::Binary(Box::new(BinaryExpr {
            span,
            op,
            left,
            right,
        })),
        StackOp::Assign(op) => Expr::Assign(Box::new(AssignExpr {
            span,
            op,
            left,
            right,
        })),
        StackOp::Conditional(if_true) => Expr::Conditional(Box::new(CondExpr {
            span,
            condition: left,
            if_true,
            if_false: right,
        })),
        StackOp::Comma => match left {
            Expr::Sequence(mut seq) => {
                seq.span = span;
                seq.exprs.push(right);
                Expr::Sequence(seq)
            }
            other => Expr::Sequence(Box::new(SequenceExpr {
                span,
                exprs: vec![other, right],
            })),
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Convert a leading string-literal expression statement into a directive
/// while the prologue is still open.
fn apply_prologue(stmt: Stmt, prologue: &mut bool) -> Stmt {
    if !*prologue {
        return stmt;
    }
    match stmt {
        Stmt::Expr(ExprStmt {
            span,
            expr: Expr::Str(literal),
            terminator,
        }) => Stmt::Directive(DirectiveStmt {
            span,
            literal,
            terminator,
        }),
        other => {
            if !matches!(other, Stmt::ImportantComment(..)) {
                *prologue = false;
            }
            other
        }
    }
}

/// `true` for expressions a `for-in`/`for-of` head may assign into: plain
/// references and member/index accesses. Parenthesized forms are already
/// reduced to the inner node by the time this runs.
fn is_assignment_target(expr: &Expr) -> bool {
    matches!(expr, Expr::Ident(_) | Expr::Member(_) | Expr::Index(_))
}

/// After a `finally` clause is known to exist, count it on every
/// `break`/`continue` inside the protected blocks that jumps to a target
/// outside them. Nested functions are opaque.
fn bump_finally_escapes(block: &mut Block) {
    fn walk(stmts: &mut [Stmt], loops: u32, switches: u32, labels: &mut Vec<String>) {
        for stmt in stmts {
            match stmt {
                Stmt::Break(j) => match &j.label {
                    Some(l) => {
                        if !labels.contains(&l.name) {
                            j.escapes_finally += 1;
                        }
                    }
                    None => {
                        if loops == 0 && switches == 0 {
                            j.escapes_finally += 1;
                        }
                    }
                },
                Stmt::Continue(j) => match &j.label {
                    Some(l) => {
                        if !labels.contains(&l.name) {
                            j.escapes_finally += 1;
                        }
                    }
                    None => {
                        if loops == 0 {
                            j.escapes_finally += 1;
                        }
                    }
                },
                Stmt::Block(b) => walk(&mut b.stmts, loops, switches, labels),
                Stmt::If(i) => {
                    walk(&mut i.true_branch.stmts, loops, switches, labels);
                    if let Some(b) = &mut i.false_branch {
                        walk(&mut b.stmts, loops, switches, labels);
                    }
                }
                Stmt::While(w) => walk(&mut w.body.stmts, loops + 1, switches, labels),
                Stmt::DoWhile(d) => walk(&mut d.body.stmts, loops + 1, switches, labels),
                Stmt::For(f) => walk(&mut f.body.stmts, loops + 1, switches, labels),
                Stmt::ForIn(f) => walk(&mut f.body.stmts, loops + 1, switches, labels),
                Stmt::With(w) => walk(&mut w.body.stmts, loops, switches, labels),
                Stmt::Switch(s) => {
                    for case in &mut s.cases {
                        walk(&mut case.body, loops, switches + 1, labels);
                    }
                }
                Stmt::Labeled(l) => {
                    labels.push(l.label.name.clone());
                    walk(std::slice::from_mut(&mut l.body), loops, switches, labels);
                    labels.pop();
                }
                Stmt::Try(t) => {
                    walk(&mut t.block.stmts, loops, switches, labels);
                    if let Some(c) = &mut t.catch {
                        walk(&mut c.body.stmts, loops, switches, labels);
                    }
                    if let Some(f) = &mut t.finally {
                        walk(&mut f.stmts, loops, switches, labels);
                    }
                }
                _ => {}
            }
        }
    }
    let mut labels = Vec::new();
    walk(&mut block.stmts, 0, 0, &mut labels);
}

/// Decode a raw string literal (quotes included) into its character value.
fn decode_string_literal(raw: &str) -> String {
    let inner = if raw.len() >= 2 {
        &raw[1..raw.len() - 1]
    } else {
        raw
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            None => break,
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{C}'),
            Some('v') => out.push('\u{B}'),
            Some('0') => out.push('\0'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => out.push_str(&hex),
                }
            }
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => out.push_str(&hex),
                }
            }
            // Line continuation: an escaped line terminator vanishes.
            Some('\n') | Some('\u{2028}') | Some('\u{2029}') => {}
            Some('\r') => {
                // Swallow the \n of a CRLF continuation.
                let mut rest = chars.clone();
                if rest.next() == Some('\n') {
                    chars = rest;
                }
            }
            Some(other) => out.push(other),
        }
    }
    out
}

/// Split `/pattern/flags` raw text into a regex node.
fn regex_from_raw(span: Span, raw: &str) -> RegexLit {
    let body = raw.strip_prefix('/').unwrap_or(raw);
    match body.rfind('/') {
        Some(idx) => RegexLit {
            span,
            pattern: body[..idx].to_string(),
            flags: body[idx + 1..].to_string(),
        },
        None => RegexLit {
            span,
            pattern: body.to_string(),
            flags: String::new(),
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Severity;

    fn parse(src: &str) -> ParseResult {
        let settings = CodeSettings::default();
        Parser::new(src, &settings).parse()
    }

    fn parse_clean(src: &str) -> Block {
        let result = parse(src);
        let serious: Vec<_> = result
            .diagnostics
            .iter()
            .filter(|d| d.severity < Severity::Warning)
            .collect();
        assert!(serious.is_empty(), "unexpected diagnostics: {serious:?}");
        result.program
    }

    fn only_expr(program: &Block) -> &Expr {
        assert_eq!(program.stmts.len(), 1, "expected one statement");
        match &program.stmts[0] {
            Stmt::Expr(e) => &e.expr,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    // ── Expression precedence ─────────────────────────────────────────────────

    #[test]
    fn test_precedence_mul_over_add() {
        let program = parse_clean("a + b * c;");
        match only_expr(&program) {
            Expr::Binary(b) => {
                assert_eq!(b.op, BinaryOp::Add);
                assert!(matches!(&b.right, Expr::Binary(r) if r.op == BinaryOp::Mul));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn test_left_associative_chain() {
        // a - b - c  =>  (a - b) - c
        let program = parse_clean("a - b - c;");
        match only_expr(&program) {
            Expr::Binary(b) => {
                assert!(matches!(&b.left, Expr::Binary(l) if l.op == BinaryOp::Sub));
                assert!(matches!(&b.right, Expr::Ident(_)));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn test_exponent_right_associative() {
        // a ** b ** c  =>  a ** (b ** c)
        let program = parse_clean("a ** b ** c;");
        match only_expr(&program) {
            Expr::Binary(b) => {
                assert!(matches!(&b.left, Expr::Ident(_)));
                assert!(matches!(&b.right, Expr::Binary(r) if r.op == BinaryOp::Exp));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn test_assignment_right_associative() {
        let program = parse_clean("a = b = c;");
        match only_expr(&program) {
            Expr::Assign(a) => {
                assert!(matches!(&a.right, Expr::Assign(_)));
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_ternary_nests_right() {
        let program = parse_clean("a ? b : c ? d : e;");
        match only_expr(&program) {
            Expr::Conditional(c) => {
                assert!(matches!(&c.if_false, Expr::Conditional(_)));
            }
            other => panic!("expected conditional, got {other:?}"),
        }
    }

    #[test]
    fn test_ternary_alternate_takes_assignment() {
        // a ? b : c = d  =>  a ? b : (c = d)
        let program = parse_clean("a ? b : c = d;");
        match only_expr(&program) {
            Expr::Conditional(c) => assert!(matches!(&c.if_false, Expr::Assign(_))),
            other => panic!("expected conditional, got {other:?}"),
        }
    }

    #[test]
    fn test_comma_normalizes_nary() {
        let program = parse_clean("a, b, c, d;");
        match only_expr(&program) {
            Expr::Sequence(s) => {
                assert_eq!(s.exprs.len(), 4);
                assert!(s.exprs.iter().all(|e| !matches!(e, Expr::Sequence(_))));
            }
            other => panic!("expected sequence, got {other:?}"),
        }
    }

    #[test]
    fn test_parenthesized_group_has_no_node() {
        // (a + b) * c parses with the sum as the left operand directly.
        let program = parse_clean("(a + b) * c;");
        match only_expr(&program) {
            Expr::Binary(b) => {
                assert_eq!(b.op, BinaryOp::Mul);
                assert!(matches!(&b.left, Expr::Binary(l) if l.op == BinaryOp::Add));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn test_nullish_and_logical() {
        let program = parse_clean("a ?? b || c;");
        // || binds tighter than ??
        match only_expr(&program) {
            Expr::Binary(b) => {
                assert_eq!(b.op, BinaryOp::NullishCoalesce);
                assert!(matches!(&b.right, Expr::Binary(r) if r.op == BinaryOp::LogicalOr));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    // ── Call / member / new ───────────────────────────────────────────────────

    #[test]
    fn test_new_with_member_callee() {
        // new a.b(c) — the member expression is the callee.
        let program = parse_clean("new a.b(c);");
        match only_expr(&program) {
            Expr::New(n) => {
                assert!(matches!(&n.callee, Expr::Member(_)));
                assert_eq!(n.args.len(), 1);
            }
            other => panic!("expected new, got {other:?}"),
        }
    }

    #[test]
    fn test_new_then_member() {
        // new Foo().bar — member of the construction result.
        let program = parse_clean("new Foo().bar;");
        match only_expr(&program) {
            Expr::Member(m) => assert!(matches!(&m.object, Expr::New(_))),
            other => panic!("expected member, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_arg_new() {
        let program = parse_clean("new Foo;");
        match only_expr(&program) {
            Expr::New(n) => assert!(n.args.is_empty()),
            other => panic!("expected new, got {other:?}"),
        }
    }

    #[test]
    fn test_keyword_member_name() {
        let program = parse_clean("a.delete;");
        match only_expr(&program) {
            Expr::Member(m) => assert_eq!(m.property.name, "delete"),
            other => panic!("expected member, got {other:?}"),
        }
    }

    // ── Regex vs divide ───────────────────────────────────────────────────────

    #[test]
    fn test_parser_directed_regexp_rescan() {
        // After `)` the scanner heuristic says division, but a statement
        // body must start a term here.
        let program = parse_clean("if (a) /re/.test(b);");
        match &program.stmts[0] {
            Stmt::If(i) => match i.true_branch.single() {
                Some(Stmt::Expr(e)) => match &e.expr {
                    Expr::Call(c) => match &c.callee {
                        Expr::Member(m) => assert!(matches!(&m.object, Expr::Regex(_))),
                        other => panic!("expected member callee, got {other:?}"),
                    },
                    other => panic!("expected call, got {other:?}"),
                },
                other => panic!("expected expression statement, got {other:?}"),
            },
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn test_division_still_division() {
        let program = parse_clean("x = a / b;");
        match only_expr(&program) {
            Expr::Assign(a) => {
                assert!(matches!(&a.right, Expr::Binary(b) if b.op == BinaryOp::Div));
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    // ── ASI ───────────────────────────────────────────────────────────────────

    #[test]
    fn test_asi_two_statements() {
        let result = parse("a\nb");
        assert_eq!(result.program.stmts.len(), 2);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::SemicolonInsertion
                && d.severity == Severity::Suggestion));
    }

    #[test]
    fn test_asi_newline_before_increment() {
        // `a\n++b` is two statements: `a;` and `++b;`.
        let result = parse("a\n++b");
        assert_eq!(result.program.stmts.len(), 2);
        match &result.program.stmts[1] {
            Stmt::Expr(e) => {
                assert!(matches!(&e.expr, Expr::Unary(u) if u.op == UnaryOp::Increment));
            }
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn test_postfix_on_same_line_attaches() {
        let program = parse_clean("a++;");
        assert!(matches!(
            only_expr(&program),
            Expr::Postfix(p) if p.op == PostfixOp::Increment
        ));
    }

    #[test]
    fn test_restricted_return() {
        let result = parse("function f() { return\nx; }");
        match &result.program.stmts[0] {
            Stmt::FunctionDecl(f) => match &f.body.stmts[0] {
                Stmt::Return(r) => assert!(r.value.is_none()),
                other => panic!("expected return, got {other:?}"),
            },
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_no_asi_mid_expression() {
        // A newline inside an open binary expression does not terminate it.
        let program = parse_clean("x = a +\nb;");
        assert!(matches!(only_expr(&program), Expr::Assign(_)));
        assert_eq!(program.stmts.len(), 1);
    }

    // ── Statements ────────────────────────────────────────────────────────────

    #[test]
    fn test_classic_for_shape() {
        let program = parse_clean("for (var i = 0; i < 10; i++) {}");
        match &program.stmts[0] {
            Stmt::For(f) => {
                assert!(matches!(f.init.as_deref(), Some(Stmt::Var(_))));
                assert!(f.condition.is_some());
                assert!(f.update.is_some());
            }
            other => panic!("expected for, got {other:?}"),
        }
    }

    #[test]
    fn test_for_in() {
        let program = parse_clean("for (var k in obj) {}");
        match &program.stmts[0] {
            Stmt::ForIn(f) => assert_eq!(f.kind, ForInKind::In),
            other => panic!("expected for-in, got {other:?}"),
        }
    }

    #[test]
    fn test_for_of() {
        let program = parse_clean("for (var v of list) {}");
        match &program.stmts[0] {
            Stmt::ForIn(f) => assert_eq!(f.kind, ForInKind::Of),
            other => panic!("expected for-of, got {other:?}"),
        }
    }

    #[test]
    fn test_for_in_target_member_expression() {
        let program = parse_clean("for (o.k in obj) {}");
        assert!(matches!(&program.stmts[0], Stmt::ForIn(_)));
    }

    #[test]
    fn test_for_in_target_must_be_assignable() {
        let result = parse("for (a + b in c) d();");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::UnexpectedToken));
        // The head is still reinterpreted so parsing continues past it.
        assert!(matches!(&result.program.stmts[0], Stmt::ForIn(_)));
    }

    #[test]
    fn test_in_operator_inside_parens_in_for_head() {
        // Parentheses restore the `in` operator inside a for-head.
        let program = parse_clean("for (var x = ('a' in b); x; ) {}");
        assert!(matches!(&program.stmts[0], Stmt::For(_)));
    }

    #[test]
    fn test_if_else_shape() {
        let program = parse_clean("if (a) b(); else c();");
        match &program.stmts[0] {
            Stmt::If(i) => {
                assert_eq!(i.true_branch.stmts.len(), 1);
                assert!(i.false_branch.is_some());
            }
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn test_var_multiple_declarations() {
        let program = parse_clean("var a = 1, b, c = 3;");
        match &program.stmts[0] {
            Stmt::Var(v) => {
                assert_eq!(v.decls.len(), 3);
                assert!(v.decls[1].init.is_none());
                assert!(v.terminator.is_some());
            }
            other => panic!("expected var, got {other:?}"),
        }
    }

    #[test]
    fn test_switch_cases() {
        let program = parse_clean("switch (x) { case 1: a(); break; default: b(); }");
        match &program.stmts[0] {
            Stmt::Switch(s) => {
                assert_eq!(s.cases.len(), 2);
                assert!(s.cases[0].test.is_some());
                assert!(s.cases[1].test.is_none());
            }
            other => panic!("expected switch, got {other:?}"),
        }
    }

    #[test]
    fn test_try_catch_finally() {
        let program = parse_clean("try { a(); } catch (e) { b(e); } finally { c(); }");
        match &program.stmts[0] {
            Stmt::Try(t) => {
                assert!(t.catch.is_some());
                assert!(t.finally.is_some());
            }
            other => panic!("expected try, got {other:?}"),
        }
    }

    #[test]
    fn test_object_literal_accessors() {
        let program = parse_clean("x = { a: 1, get b() { return 2; }, set b(v) {}, get: 3 };");
        match only_expr(&program) {
            Expr::Assign(a) => match &a.right {
                Expr::Object(o) => {
                    assert_eq!(o.properties.len(), 4);
                    assert_eq!(o.properties[0].kind, PropertyKind::Init);
                    assert_eq!(o.properties[1].kind, PropertyKind::Get);
                    assert_eq!(o.properties[2].kind, PropertyKind::Set);
                    // `get: 3` is a plain property named "get".
                    assert_eq!(o.properties[3].kind, PropertyKind::Init);
                }
                other => panic!("expected object, got {other:?}"),
            },
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_array_holes() {
        let program = parse_clean("x = [1, , 3];");
        match only_expr(&program) {
            Expr::Assign(a) => match &a.right {
                Expr::Array(arr) => {
                    assert_eq!(arr.elements.len(), 3);
                    assert!(arr.elements[1].is_none());
                }
                other => panic!("expected array, got {other:?}"),
            },
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_directive_prologue() {
        let program = parse_clean("\"use strict\"; var x;");
        assert!(matches!(&program.stmts[0], Stmt::Directive(_)));
        // A string after other code is a plain statement.
        let program = parse_clean("var x; \"not a directive\";");
        assert!(matches!(&program.stmts[1], Stmt::Expr(_)));
    }

    #[test]
    fn test_important_comment_kept() {
        let program = parse_clean("/*! copyright */ var x;");
        assert!(matches!(&program.stmts[0], Stmt::ImportantComment(..)));
        assert!(matches!(&program.stmts[1], Stmt::Var(_)));
    }

    #[test]
    fn test_ordinary_comment_dropped() {
        let program = parse_clean("/* nothing */ var x; // end");
        assert_eq!(program.stmts.len(), 1);
    }

    // ── Labels, break, continue ───────────────────────────────────────────────

    #[test]
    fn test_labeled_break() {
        let program = parse_clean("outer: for (;;) { break outer; }");
        match &program.stmts[0] {
            Stmt::Labeled(l) => {
                assert_eq!(l.label.name, "outer");
                assert_eq!(l.nest_level, 0);
            }
            other => panic!("expected labeled, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_label() {
        let result = parse("for (;;) { break missing; }");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::NoLabel));
    }

    #[test]
    fn test_break_outside_loop() {
        let result = parse("break;");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::BadBreakOrContinue));
    }

    #[test]
    fn test_continue_inside_switch_not_enough() {
        let result = parse("switch (x) { default: continue; }");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::BadBreakOrContinue));
    }

    #[test]
    fn test_continue_label_must_target_loop() {
        let result = parse("x: { continue x; }");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::BadBreakOrContinue));
    }

    #[test]
    fn test_break_label_may_target_any_statement() {
        parse_clean("x: { break x; }");
    }

    #[test]
    fn test_continue_through_label_chain() {
        parse_clean("a: b: while (c) { continue a; }");
    }

    #[test]
    fn test_duplicate_label() {
        let result = parse("a: a: for (;;) break;");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::DuplicateLabel));
    }

    #[test]
    fn test_labels_do_not_cross_functions() {
        let result = parse("outer: { function f() { break outer; } }");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::NoLabel));
    }

    #[test]
    fn test_finally_escape_count() {
        let program = parse_clean("for (;;) { try { break; } finally { cleanup(); } }");
        // Find the break inside the try block.
        match &program.stmts[0] {
            Stmt::For(f) => match &f.body.stmts[0] {
                Stmt::Try(t) => match &t.block.stmts[0] {
                    Stmt::Break(j) => assert_eq!(j.escapes_finally, 1),
                    other => panic!("expected break, got {other:?}"),
                },
                other => panic!("expected try, got {other:?}"),
            },
            other => panic!("expected for, got {other:?}"),
        }
    }

    #[test]
    fn test_break_to_inner_loop_escapes_nothing() {
        let program = parse_clean("try { for (;;) { break; } } finally {}");
        match &program.stmts[0] {
            Stmt::Try(t) => match &t.block.stmts[0] {
                Stmt::For(f) => match &f.body.stmts[0] {
                    Stmt::Break(j) => assert_eq!(j.escapes_finally, 0),
                    other => panic!("expected break, got {other:?}"),
                },
                other => panic!("expected for, got {other:?}"),
            },
            other => panic!("expected try, got {other:?}"),
        }
    }

    // ── Diagnostics & recovery ────────────────────────────────────────────────

    #[test]
    fn test_suspicious_assignment_in_condition() {
        let result = parse("if (a = b) c();");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::SuspiciousAssignment));
    }

    #[test]
    fn test_with_warning() {
        let result = parse("with (o) { a = 1; }");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::WithNotRecommended));
        assert!(matches!(&result.program.stmts[0], Stmt::With(_)));
    }

    #[test]
    fn test_unsupported_class() {
        let result = parse("class A {} var x = 1;");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::UnsupportedSyntax));
        // Recovery keeps going and finds the var statement.
        assert!(result
            .program
            .stmts
            .iter()
            .any(|s| matches!(s, Stmt::Var(_))));
    }

    #[test]
    fn test_recovery_continues_past_error() {
        let result = parse("var = 1; var ok = 2;");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::NoIdentifier));
        assert!(result
            .program
            .stmts
            .iter()
            .any(|s| matches!(s, Stmt::Var(v) if v.decls[0].name.name == "ok")));
    }

    #[test]
    fn test_recovery_terminates_on_garbage() {
        // Mostly-junk input must produce diagnostics, not hang.
        let result = parse("var x = @ # $ ; function ok() { return 1; }");
        assert!(!result.diagnostics.is_empty());
        assert!(result
            .program
            .stmts
            .iter()
            .any(|s| matches!(s, Stmt::FunctionDecl(f) if f.name.as_ref().unwrap().name == "ok")));
    }

    #[test]
    fn test_skip_ceiling_is_fatal() {
        // A stray `]` inside an if-head forces resynchronization, and the
        // filler identifiers push the skip count past the ceiling.
        let junk = "x ".repeat(MAX_SKIPPED_TOKENS + 10);
        let src = format!("if (a ] {junk}) b;");
        let result = parse(&src);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::TooManySkippedTokens));
    }

    #[test]
    fn test_unterminated_block_is_fatal() {
        let result = parse("function f() { var a = 1;");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::UnexpectedEndOfFile));
    }

    #[test]
    fn test_partial_statement_survives_recovery() {
        // `var a = 1 var b` — the first declaration is kept even though its
        // terminator was missing.
        let result = parse("var a = 1 var b;");
        let vars: Vec<_> = result
            .program
            .stmts
            .iter()
            .filter(|s| matches!(s, Stmt::Var(_)))
            .collect();
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn test_missing_paren_claimed() {
        let result = parse("if (a b) c(); d();");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::ExpectedToken));
        // The statement after the broken if still parses.
        assert!(result.program.stmts.len() >= 2);
    }

    // ── Strings ───────────────────────────────────────────────────────────────

    #[test]
    fn test_decode_string_literal() {
        assert_eq!(decode_string_literal(r#""a\nb""#), "a\nb");
        assert_eq!(decode_string_literal(r#"'it\'s'"#), "it's");
        assert_eq!(decode_string_literal(r#""\x41B""#), "AB");
        assert_eq!(decode_string_literal("\"a\\\nb\""), "ab");
    }

    #[test]
    fn test_string_literal_value_and_raw() {
        let program = parse_clean(r#"x = "a\tb";"#);
        match only_expr(&program) {
            Expr::Assign(a) => match &a.right {
                Expr::Str(s) => {
                    assert_eq!(s.value, "a\tb");
                    assert_eq!(s.raw, r#""a\tb""#);
                }
                other => panic!("expected string, got {other:?}"),
            },
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    // ── let / contextual keywords ─────────────────────────────────────────────

    #[test]
    fn test_let_declaration() {
        let program = parse_clean("let x = 1;");
        match &program.stmts[0] {
            Stmt::Var(v) => assert_eq!(v.kind, DeclKind::Let),
            other => panic!("expected let declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_let_as_identifier() {
        let program = parse_clean("let = 5;");
        assert!(matches!(only_expr(&program), Expr::Assign(_)));
    }

    #[test]
    fn test_of_as_identifier() {
        let program = parse_clean("of = 1;");
        assert!(matches!(only_expr(&program), Expr::Assign(_)));
    }
}

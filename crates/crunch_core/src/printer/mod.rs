//! Minifying code generator.
//!
//! A single stateful pass over the AST. Every character funnels through one
//! emit choke point that tracks the previous character and inserts a space
//! only where two adjacent tokens would otherwise fuse into a different
//! token: identifier/keyword runs (`else if`, `typeof x`, `a in b`), sign
//! runs (`a + +b`, `- -x`), a slash meeting a regex (`a/ /re/`), and a dot
//! following an integer literal (`1 .toString`).
//!
//! Parentheses are not stored in the AST; they are re-derived here from the
//! static [`Precedence`] table. An equal-precedence right operand keeps its
//! parentheses unless the operator is the same associative one (`a*b*c`, but
//! `a-(b-c)` and `a/(b*c)`). Three structural exceptions also force parens:
//! a zero-argument `new` used as an object or callee (`(new Foo).bar`), an
//! expression statement whose leftmost token would be `{` or `function`, and
//! an `in` operator inside a `for` head.
//!
//! In single-line mode an opportunistic line break follows `,` `;` `{` `}`
//! once the current line exceeds [`CodeSettings::line_break_threshold`] —
//! all positions where a JavaScript line terminator can never change
//! meaning. Multi-line mode instead indents by
//! [`CodeSettings::indent_size`].

use crate::parser::ast::{
    Block, DeclKind, Expr, ExprStmt, Function, NumLit, Precedence, PropertyKey, PropertyKind,
    Stmt, StrLit, SwitchCase, VarStmt,
};
use crate::parser::scanner::Span;
use crate::settings::{CodeSettings, OutputMode};

// ─────────────────────────────────────────────────────────────────────────────
// Source-map hook
// ─────────────────────────────────────────────────────────────────────────────

/// Receives output-position events while printing, enough to build a source
/// map. All methods default to no-ops so plain printing pays nothing.
pub trait SegmentSink {
    /// A token is about to be written at output `line`/`column` (0-based),
    /// originating from `span`. `name` is the symbol text for identifiers.
    fn mark_segment(&mut self, line: u32, column: u32, span: Span, name: Option<&str>) {
        let _ = (line, column, span, name);
    }

    /// A function is opening at this output position.
    fn start_symbol(&mut self, line: u32, column: u32, span: Span) {
        let _ = (line, column, span);
    }

    /// The innermost open function ended; `name` is its declared name.
    fn end_symbol(&mut self, name: Option<&str>) {
        let _ = name;
    }
}

/// Print `program` with the given settings.
pub fn print(program: &Block, settings: &CodeSettings) -> String {
    let mut printer = Printer::new(settings, None);
    printer.print_stmt_list(&program.stmts, true);
    printer.out
}

/// Print `program`, reporting output positions to `sink`.
pub fn print_with_sink(
    program: &Block,
    settings: &CodeSettings,
    sink: &mut dyn SegmentSink,
) -> String {
    let mut printer = Printer::new(settings, Some(sink));
    printer.print_stmt_list(&program.stmts, true);
    printer.out
}

// ─────────────────────────────────────────────────────────────────────────────
// Printer
// ─────────────────────────────────────────────────────────────────────────────

struct Printer<'a> {
    settings: &'a CodeSettings,
    out: String,
    /// 0-based output line.
    line: u32,
    /// 0-based column on the current output line, in characters.
    column: u32,
    /// The last character written, `'\0'` before any output.
    last_char: char,
    /// The last token written was a numeric literal with no `.`, exponent,
    /// or radix prefix, so a following `.` would extend the number.
    last_int_literal: bool,
    /// Current indent depth (multi-line mode).
    indent: usize,
    /// While positive, soft line breaks are suppressed (`for` heads).
    no_breaks: u32,
    sink: Option<&'a mut dyn SegmentSink>,
}

impl<'a> Printer<'a> {
    fn new(settings: &'a CodeSettings, sink: Option<&'a mut dyn SegmentSink>) -> Self {
        Self {
            settings,
            out: String::new(),
            line: 0,
            column: 0,
            last_char: '\0',
            last_int_literal: false,
            indent: 0,
            no_breaks: 0,
            sink,
        }
    }

    fn pretty(&self) -> bool {
        self.settings.output_mode == OutputMode::MultipleLines
    }

    // ── The emit choke point ────────────────────────────────────────────────

    fn push_char(&mut self, ch: char) {
        self.out.push(ch);
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        self.last_char = ch;
    }

    /// Would `first` fuse with the previous character into a different
    /// token?
    fn needs_space(&self, first: char) -> bool {
        let last = self.last_char;
        if last == '\0' {
            return false;
        }
        (is_word_char(last) && is_word_char(first))
            || (last == '+' && first == '+')
            || (last == '-' && first == '-')
            || (last == '/' && first == '/')
            || (first == '.' && self.last_int_literal)
    }

    fn emit(&mut self, text: &str) {
        let Some(first) = text.chars().next() else {
            return;
        };
        if self.needs_space(first) {
            self.push_char(' ');
        }
        for ch in text.chars() {
            self.push_char(ch);
        }
        self.last_int_literal = false;
        if matches!(self.last_char, ',' | ';' | '{' | '}') {
            self.maybe_line_break();
        }
    }

    /// Emit a token while reporting its output position to the sink.
    fn emit_marked(&mut self, text: &str, span: Span, name: Option<&str>) {
        let Some(first) = text.chars().next() else {
            return;
        };
        if self.needs_space(first) {
            self.push_char(' ');
        }
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.mark_segment(self.line, self.column, span, name);
        }
        for ch in text.chars() {
            self.push_char(ch);
        }
        self.last_int_literal = false;
    }

    /// In single-line mode, break the line at a safe point once it has
    /// grown past the threshold.
    fn maybe_line_break(&mut self) {
        if !self.pretty()
            && self.settings.line_break_threshold > 0
            && self.column as usize >= self.settings.line_break_threshold
            && self.no_breaks == 0
        {
            self.push_char('\n');
        }
    }

    /// A space in multi-line mode, nothing in single-line mode.
    fn sp(&mut self) {
        if self.pretty() && !matches!(self.last_char, ' ' | '\n' | '\0') {
            self.push_char(' ');
        }
    }

    /// Start a fresh indented line in multi-line mode.
    fn newline_indent(&mut self) {
        if !self.pretty() || self.last_char == '\0' {
            return;
        }
        self.push_char('\n');
        for _ in 0..self.indent * self.settings.indent_size {
            self.push_char(' ');
        }
    }

    /// A hard line break in any mode, used around important comments.
    fn force_newline(&mut self) {
        if !matches!(self.last_char, '\n' | '\0') {
            self.push_char('\n');
        }
    }

    fn comma(&mut self) {
        self.emit(",");
        self.sp();
    }

    /// Keyword followed by `(`, spaced apart in multi-line mode.
    fn kw_paren(&mut self, kw: &str) {
        self.emit(kw);
        self.sp();
        self.emit("(");
    }

    // ── Statement lists ─────────────────────────────────────────────────────

    /// Print a statement sequence with `;` separators where required.
    /// `trailing` is `true` when `}` or end of output follows, letting
    /// single-line mode drop the final semicolon.
    fn print_stmt_list(&mut self, stmts: &[Stmt], trailing: bool) {
        let n = stmts.len();
        for (i, stmt) in stmts.iter().enumerate() {
            self.newline_indent();
            self.print_stmt(stmt);
            if stmt.requires_separator() {
                let last = trailing && i + 1 == n;
                if !last || self.pretty() || ends_incomplete(stmt) {
                    self.emit(";");
                }
            }
        }
    }

    fn print_braced(&mut self, block: &Block) {
        self.sp();
        self.emit("{");
        self.indent += 1;
        self.print_stmt_list(&block.stmts, true);
        self.indent -= 1;
        self.newline_indent();
        self.emit("}");
    }

    /// A control-flow body. Empty blocks print nothing (the caller's
    /// separator supplies the `;`); single statements print braceless unless
    /// braces are structurally required; anything else gets braces.
    /// Multi-line mode always keeps braces.
    fn print_body(&mut self, block: &Block, force_braces: bool) {
        if self.pretty() || force_braces || block.stmts.len() > 1 {
            self.print_braced(block);
            return;
        }
        match block.single() {
            Some(stmt) => {
                // Lexical declarations and function declarations are not
                // legal as a braceless body.
                if matches!(stmt, Stmt::Var(v) if v.kind != DeclKind::Var)
                    || matches!(stmt, Stmt::FunctionDecl(_))
                {
                    self.print_braced(block);
                } else {
                    self.print_stmt(stmt);
                }
            }
            None => {}
        }
    }

    // ── Statements ──────────────────────────────────────────────────────────

    /// Print one statement without its trailing separator.
    fn print_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(b) => self.print_braced(b),
            Stmt::Empty(_) => self.emit(";"),
            Stmt::Var(v) => {
                self.print_var(v, false);
            }
            Stmt::Expr(e) => self.print_expr_stmt(e),
            Stmt::If(i) => {
                self.kw_paren("if");
                self.print_expr(&i.condition);
                self.emit(")");
                // A braceless true branch ending in an if with no else would
                // capture this statement's else.
                let force = i.false_branch.is_some() && block_has_trailing_open_if(&i.true_branch);
                self.print_body(&i.true_branch, force);
                if let Some(fb) = &i.false_branch {
                    if !force && !self.pretty() && block_needs_terminator(&i.true_branch) {
                        self.emit(";");
                    }
                    self.sp();
                    self.emit("else");
                    match fb.single() {
                        // `else if` chains stay flat.
                        Some(chained @ Stmt::If(_)) if !self.pretty() => self.print_stmt(chained),
                        _ => self.print_body(fb, false),
                    }
                }
            }
            Stmt::For(f) => {
                self.no_breaks += 1;
                self.kw_paren("for");
                if let Some(init) = &f.init {
                    self.print_for_head_init(init);
                }
                self.emit(";");
                if let Some(c) = &f.condition {
                    self.sp();
                    self.print_expr(c);
                }
                self.emit(";");
                if let Some(u) = &f.update {
                    self.sp();
                    self.print_expr(u);
                }
                self.emit(")");
                self.no_breaks -= 1;
                self.print_body(&f.body, false);
            }
            Stmt::ForIn(f) => {
                self.no_breaks += 1;
                self.kw_paren("for");
                match &*f.left {
                    Stmt::Var(v) => self.print_var(v, true),
                    Stmt::Expr(e) => self.print_expr(&e.expr),
                    other => self.print_stmt(other),
                }
                self.emit(f.kind.as_str());
                self.print_expr(&f.right);
                self.emit(")");
                self.no_breaks -= 1;
                self.print_body(&f.body, false);
            }
            Stmt::While(w) => {
                self.kw_paren("while");
                self.print_expr(&w.condition);
                self.emit(")");
                self.print_body(&w.body, false);
            }
            Stmt::DoWhile(d) => {
                self.emit("do");
                self.print_body(&d.body, false);
                if !self.pretty() && block_needs_terminator(&d.body) {
                    self.emit(";");
                }
                self.sp();
                self.kw_paren("while");
                self.print_expr(&d.condition);
                self.emit(")");
            }
            Stmt::Continue(j) => {
                self.emit("continue");
                if let Some(label) = &j.label {
                    self.emit_marked(&label.name, label.span, Some(&label.name));
                }
            }
            Stmt::Break(j) => {
                self.emit("break");
                if let Some(label) = &j.label {
                    self.emit_marked(&label.name, label.span, Some(&label.name));
                }
            }
            Stmt::Return(r) => {
                self.emit("return");
                if let Some(value) = &r.value {
                    self.sp();
                    self.print_expr(value);
                }
            }
            Stmt::With(w) => {
                self.kw_paren("with");
                self.print_expr(&w.object);
                self.emit(")");
                self.print_body(&w.body, false);
            }
            Stmt::Switch(s) => {
                self.kw_paren("switch");
                self.print_expr(&s.discriminant);
                self.emit(")");
                self.sp();
                self.emit("{");
                self.indent += 1;
                let n = s.cases.len();
                for (i, case) in s.cases.iter().enumerate() {
                    self.print_switch_case(case, i + 1 == n);
                }
                self.indent -= 1;
                self.newline_indent();
                self.emit("}");
            }
            Stmt::Labeled(l) => {
                self.emit_marked(&l.label.name, l.label.span, Some(&l.label.name));
                self.emit(":");
                self.sp();
                self.print_stmt(&l.body);
            }
            Stmt::Throw(t) => {
                self.emit("throw");
                self.sp();
                self.print_expr(&t.value);
            }
            Stmt::Try(t) => {
                self.emit("try");
                self.print_braced(&t.block);
                if let Some(c) = &t.catch {
                    self.sp();
                    self.kw_paren("catch");
                    self.emit_marked(&c.param.name, c.param.span, Some(&c.param.name));
                    self.emit(")");
                    self.print_braced(&c.body);
                }
                if let Some(f) = &t.finally {
                    self.sp();
                    self.emit("finally");
                    self.print_braced(f);
                }
            }
            Stmt::Debugger(_) => self.emit("debugger"),
            Stmt::FunctionDecl(f) => self.print_function(f),
            Stmt::Directive(d) => self.print_str(&d.literal),
            Stmt::ImportantComment(_, text) => {
                self.force_newline();
                self.emit(text);
                self.push_char('\n');
            }
        }
    }

    fn print_switch_case(&mut self, case: &SwitchCase, is_last: bool) {
        self.newline_indent();
        match &case.test {
            Some(test) => {
                self.emit("case");
                self.sp();
                self.print_expr(test);
                self.emit(":");
            }
            None => {
                self.emit("default");
                self.emit(":");
            }
        }
        if self.pretty() {
            self.indent += 1;
            self.print_stmt_list(&case.body, is_last);
            self.indent -= 1;
        } else {
            self.print_stmt_list(&case.body, is_last);
        }
    }

    /// A `var`/`let`/`const` declaration list without its terminator.
    /// `single_binding` suppresses the comma form (for-in heads).
    fn print_var(&mut self, v: &VarStmt, single_binding: bool) {
        self.emit(v.kind.as_str());
        for (i, decl) in v.decls.iter().enumerate() {
            if i > 0 {
                if single_binding {
                    break;
                }
                self.comma();
            }
            self.emit_marked(&decl.name.name, decl.name.span, Some(&decl.name.name));
            if let Some(init) = &decl.init {
                self.sp();
                self.emit("=");
                self.sp();
                self.print_assign_value(init);
            }
        }
    }

    fn print_expr_stmt(&mut self, e: &ExprStmt) {
        // An expression statement must not begin with `{` or `function`.
        let needs = matches!(
            e.expr.left_hand_side(),
            Expr::Object(_) | Expr::Function(_)
        );
        self.group(&e.expr, needs);
    }

    /// A classic for-head initializer; any top-level `in` must be
    /// parenthesized so the head cannot reparse as a for-in.
    fn print_for_head_init(&mut self, init: &Stmt) {
        match init {
            Stmt::Var(v) => {
                self.emit(v.kind.as_str());
                for (i, decl) in v.decls.iter().enumerate() {
                    if i > 0 {
                        self.comma();
                    }
                    self.emit_marked(&decl.name.name, decl.name.span, Some(&decl.name.name));
                    if let Some(value) = &decl.init {
                        self.sp();
                        self.emit("=");
                        self.sp();
                        self.group(value, contains_bare_in(value));
                    }
                }
            }
            Stmt::Expr(e) => self.group(&e.expr, contains_bare_in(&e.expr)),
            other => self.print_stmt(other),
        }
    }

    // ── Expressions ─────────────────────────────────────────────────────────

    fn group(&mut self, e: &Expr, parens: bool) {
        if parens {
            self.emit("(");
            self.print_expr(e);
            self.emit(")");
        } else {
            self.print_expr(e);
        }
    }

    /// An assignment-level position: only a sequence needs parens.
    fn print_assign_value(&mut self, e: &Expr) {
        self.group(e, e.precedence() == Precedence::Comma);
    }

    fn print_expr(&mut self, e: &Expr) {
        match e {
            Expr::Null(_) => self.emit("null"),
            Expr::True(_) => self.emit("true"),
            Expr::False(_) => self.emit("false"),
            Expr::This(_) => self.emit("this"),
            Expr::Num(n) => self.print_num(n),
            Expr::Str(s) => self.print_str(s),
            Expr::Regex(r) => {
                let text = format!("/{}/{}", r.pattern, r.flags);
                self.emit_marked(&text, r.span, None);
            }
            Expr::Ident(i) => self.emit_marked(&i.name, i.span, Some(&i.name)),
            Expr::EmbeddedBlock(_, text) => self.emit(text),
            Expr::Array(a) => {
                self.emit("[");
                let n = a.elements.len();
                for (i, element) in a.elements.iter().enumerate() {
                    if i > 0 {
                        self.comma();
                    }
                    match element {
                        Some(value) => self.print_assign_value(value),
                        None => {
                            // An elision is just its comma; a trailing hole
                            // needs one more to count.
                            if i + 1 == n {
                                self.emit(",");
                            }
                        }
                    }
                }
                self.emit("]");
            }
            Expr::Object(o) => {
                self.emit("{");
                for (i, prop) in o.properties.iter().enumerate() {
                    if i > 0 {
                        self.comma();
                    }
                    match prop.kind {
                        PropertyKind::Init => {
                            self.print_property_key(&prop.key);
                            self.emit(":");
                            self.sp();
                            self.print_assign_value(&prop.value);
                        }
                        PropertyKind::Get | PropertyKind::Set => {
                            self.emit(if prop.kind == PropertyKind::Get {
                                "get"
                            } else {
                                "set"
                            });
                            self.sp();
                            self.print_property_key(&prop.key);
                            if let Expr::Function(f) = &prop.value {
                                self.print_params_and_body(f);
                            }
                        }
                    }
                }
                self.emit("}");
            }
            Expr::Function(f) => self.print_function(f),
            Expr::Unary(u) => {
                self.emit(u.op.as_str());
                self.group(&u.operand, u.operand.precedence() < Precedence::Unary);
            }
            Expr::Postfix(p) => {
                self.group(&p.operand, p.operand.precedence() < Precedence::Postfix);
                self.emit(p.op.as_str());
            }
            Expr::Binary(b) => {
                let p = b.op.precedence();
                let left_parens = match b.left.precedence().cmp(&p) {
                    std::cmp::Ordering::Less => true,
                    // `(a ** b) ** c` keeps its parens: `**` groups rightward.
                    std::cmp::Ordering::Equal => !b.op.is_left_associative(),
                    std::cmp::Ordering::Greater => false,
                };
                let right_parens = match b.right.precedence().cmp(&p) {
                    std::cmp::Ordering::Less => true,
                    std::cmp::Ordering::Equal => {
                        if !b.op.is_left_associative() {
                            false
                        } else if let Expr::Binary(r) = &b.right {
                            // Drop parens only when regrouping cannot change
                            // the result: the identical associative operator.
                            !(r.op == b.op && b.op.is_associative())
                        } else {
                            false
                        }
                    }
                    std::cmp::Ordering::Greater => false,
                };
                self.group(&b.left, left_parens);
                self.sp();
                self.emit(b.op.as_str());
                // A binary operator is also a safe break point: a line
                // terminator here can never trigger semicolon insertion.
                self.maybe_line_break();
                self.sp();
                self.group(&b.right, right_parens);
            }
            Expr::Assign(a) => {
                self.group(&a.left, a.left.precedence() <= Precedence::Conditional);
                self.sp();
                self.emit(a.op.as_str());
                self.sp();
                self.print_assign_value(&a.right);
            }
            Expr::Conditional(c) => {
                self.group(
                    &c.condition,
                    c.condition.precedence() <= Precedence::Conditional,
                );
                self.sp();
                self.emit("?");
                self.sp();
                self.print_assign_value(&c.if_true);
                self.sp();
                self.emit(":");
                self.sp();
                self.print_assign_value(&c.if_false);
            }
            Expr::Sequence(s) => {
                for (i, item) in s.exprs.iter().enumerate() {
                    if i > 0 {
                        self.comma();
                    }
                    self.print_assign_value(item);
                }
            }
            Expr::Member(m) => {
                self.group(&m.object, object_needs_parens(&m.object));
                self.emit(".");
                self.emit_marked(&m.property.name, m.property.span, Some(&m.property.name));
            }
            Expr::Index(i) => {
                self.group(&i.object, object_needs_parens(&i.object));
                self.emit("[");
                self.print_expr(&i.index);
                self.emit("]");
            }
            Expr::Call(c) => {
                self.group(&c.callee, object_needs_parens(&c.callee));
                self.emit("(");
                for (i, arg) in c.args.iter().enumerate() {
                    if i > 0 {
                        self.comma();
                    }
                    self.print_assign_value(arg);
                }
                self.emit(")");
            }
            Expr::New(n) => {
                self.emit("new");
                let parens =
                    n.callee.precedence() < Precedence::CallMember || callee_has_call(&n.callee);
                self.group(&n.callee, parens);
                if !n.args.is_empty() {
                    self.emit("(");
                    for (i, arg) in n.args.iter().enumerate() {
                        if i > 0 {
                            self.comma();
                        }
                        self.print_assign_value(arg);
                    }
                    self.emit(")");
                }
            }
        }
    }

    fn print_function(&mut self, f: &Function) {
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.start_symbol(self.line, self.column, f.span);
        }
        self.emit("function");
        if let Some(name) = &f.name {
            self.emit_marked(&name.name, name.span, Some(&name.name));
        }
        self.print_params_and_body(f);
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.end_symbol(f.name.as_ref().map(|n| n.name.as_str()));
        }
    }

    fn print_params_and_body(&mut self, f: &Function) {
        self.emit("(");
        for (i, param) in f.params.iter().enumerate() {
            if i > 0 {
                self.comma();
            }
            self.emit_marked(&param.name, param.span, Some(&param.name));
        }
        self.emit(")");
        self.print_braced(&f.body);
    }

    fn print_property_key(&mut self, key: &PropertyKey) {
        match key {
            PropertyKey::Ident(i) => {
                if self.settings.quote_object_keys {
                    let quoted = quote_string(&i.name);
                    self.emit_marked(&quoted, i.span, Some(&i.name));
                } else {
                    self.emit_marked(&i.name, i.span, Some(&i.name));
                }
            }
            PropertyKey::Str(s) => {
                // A quoted key that is a valid identifier can shed its
                // quotes when literal rewriting is on.
                if !self.settings.quote_object_keys
                    && self.settings.minify_literals
                    && is_valid_identifier(&s.value)
                {
                    let name = s.value.clone();
                    self.emit_marked(&name, s.span, Some(&name));
                } else {
                    self.print_str(s);
                }
            }
            PropertyKey::Num(n) => self.print_num(n),
        }
    }

    fn print_num(&mut self, n: &NumLit) {
        let text = if self.settings.minify_literals {
            minify_number(n.value, &n.raw)
        } else {
            n.raw.clone()
        };
        self.emit_marked(&text, n.span, None);
        self.last_int_literal = !text.contains(['.', 'e', 'E', 'x', 'X', 'o', 'O', 'b', 'B']);
    }

    fn print_str(&mut self, s: &StrLit) {
        let text = if self.settings.minify_literals {
            quote_string(&s.value)
        } else {
            s.raw.clone()
        };
        self.emit_marked(&text, s.span, None);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Structural helpers
// ─────────────────────────────────────────────────────────────────────────────

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '\\'
}

/// Parens around the object of a member/index/call suffix: anything binding
/// looser than the suffix, plus a zero-argument `new` (whose argument list
/// would otherwise claim the suffix: `(new Foo).bar`).
fn object_needs_parens(object: &Expr) -> bool {
    if object.precedence() < Precedence::CallMember {
        return true;
    }
    matches!(object, Expr::New(n) if n.args.is_empty())
}

/// Whether a `new` callee ends in a call, which would steal the `new`'s
/// argument list.
fn callee_has_call(e: &Expr) -> bool {
    match e {
        Expr::Call(_) => true,
        Expr::Member(m) => callee_has_call(&m.object),
        Expr::Index(i) => callee_has_call(&i.object),
        _ => false,
    }
}

/// A top-level (unparenthesizable-by-precedence) `in` operator, illegal in a
/// bare for-head position.
fn contains_bare_in(e: &Expr) -> bool {
    match e {
        Expr::Binary(b) => {
            b.op == crate::parser::ast::BinaryOp::In
                || contains_bare_in(&b.left)
                || contains_bare_in(&b.right)
        }
        Expr::Assign(a) => contains_bare_in(&a.left) || contains_bare_in(&a.right),
        Expr::Conditional(c) => {
            contains_bare_in(&c.condition)
                || contains_bare_in(&c.if_true)
                || contains_bare_in(&c.if_false)
        }
        Expr::Sequence(s) => s.exprs.iter().any(contains_bare_in),
        Expr::Unary(u) => contains_bare_in(&u.operand),
        Expr::Postfix(p) => contains_bare_in(&p.operand),
        _ => false,
    }
}

/// Whether `;` must follow this block when something comes after it,
/// mirroring the statement separator rules for bodies printed braceless.
fn block_needs_terminator(block: &Block) -> bool {
    match block.single() {
        Some(stmt) => stmt.requires_separator(),
        None => block.stmts.is_empty(),
    }
}

/// Statements whose single-line rendering is incomplete without a final `;`
/// even at end of output (`if(a)` with an empty branch, `for(;;)`).
fn ends_incomplete(stmt: &Stmt) -> bool {
    fn block_ends_incomplete(block: &Block) -> bool {
        match block.single() {
            Some(stmt) => ends_incomplete(stmt),
            None => block.stmts.is_empty(),
        }
    }
    match stmt {
        Stmt::If(i) => match &i.false_branch {
            Some(fb) => block_ends_incomplete(fb),
            None => block_ends_incomplete(&i.true_branch),
        },
        Stmt::For(f) => block_ends_incomplete(&f.body),
        Stmt::ForIn(f) => block_ends_incomplete(&f.body),
        Stmt::While(w) => block_ends_incomplete(&w.body),
        Stmt::With(w) => block_ends_incomplete(&w.body),
        Stmt::Labeled(l) => ends_incomplete(&l.body),
        _ => false,
    }
}

/// Whether a braceless rendering of this block would end in an `if` with no
/// `else`, ready to capture an `else` that follows.
fn block_has_trailing_open_if(block: &Block) -> bool {
    fn stmt_has_trailing_open_if(stmt: &Stmt) -> bool {
        match stmt {
            Stmt::If(i) => match &i.false_branch {
                None => true,
                Some(fb) => block_has_trailing_open_if(fb),
            },
            Stmt::While(w) => block_has_trailing_open_if(&w.body),
            Stmt::For(f) => block_has_trailing_open_if(&f.body),
            Stmt::ForIn(f) => block_has_trailing_open_if(&f.body),
            Stmt::With(w) => block_has_trailing_open_if(&w.body),
            Stmt::Labeled(l) => stmt_has_trailing_open_if(&l.body),
            _ => false,
        }
    }
    match block.single() {
        Some(stmt) => stmt_has_trailing_open_if(stmt),
        None => false,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Literal rewriting
// ─────────────────────────────────────────────────────────────────────────────

/// The shortest equivalent rendering of a numeric literal: plain decimal,
/// exponential, or hex, with a redundant leading `0.` dropped.
fn minify_number(value: f64, raw: &str) -> String {
    if !value.is_finite() {
        return raw.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let mut best = format!("{value}");
    let exp = format!("{value:e}");
    if exp.len() < best.len() {
        best = exp;
    }
    if value.fract() == 0.0 && value >= 0.0 && value <= u64::MAX as f64 {
        let hex = format!("0x{:x}", value as u64);
        if hex.len() < best.len() {
            best = hex;
        }
    }
    if let Some(rest) = best.strip_prefix("0.") {
        best = format!(".{rest}");
    }
    best
}

/// Quote and escape a string value, picking whichever delimiter needs fewer
/// escapes (double quotes on a tie).
fn quote_string(value: &str) -> String {
    let doubles = value.matches('"').count();
    let singles = value.matches('\'').count();
    let quote = if singles < doubles { '\'' } else { '"' };
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{B}' => out.push_str("\\v"),
            '\u{C}' => out.push_str("\\f"),
            '\0' => out.push_str("\\0"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// A strict subset of IdentifierName, good enough to unquote object keys.
fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') && !is_reserved_word(s)
}

fn is_reserved_word(s: &str) -> bool {
    matches!(
        s,
        "break"
            | "case"
            | "catch"
            | "class"
            | "const"
            | "continue"
            | "debugger"
            | "default"
            | "delete"
            | "do"
            | "else"
            | "enum"
            | "export"
            | "extends"
            | "false"
            | "finally"
            | "for"
            | "function"
            | "if"
            | "import"
            | "in"
            | "instanceof"
            | "let"
            | "new"
            | "null"
            | "return"
            | "super"
            | "switch"
            | "this"
            | "throw"
            | "true"
            | "try"
            | "typeof"
            | "var"
            | "void"
            | "while"
            | "with"
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn min(src: &str) -> String {
        let settings = CodeSettings::default();
        let result = Parser::new(src, &settings).parse();
        print(&result.program, &settings)
    }

    fn roundtrips(src: &str) {
        let once = min(src);
        let twice = min(&once);
        assert_eq!(once, twice, "printing is not idempotent for {src:?}");
    }

    // ── Statement layout ──────────────────────────────────────────────────────

    #[test]
    fn test_if_else_single_line() {
        assert_eq!(min("if (a) b; else c;"), "if(a)b;else c");
    }

    #[test]
    fn test_trailing_semicolon_dropped() {
        assert_eq!(min("var x = 1;"), "var x=1");
        assert_eq!(min("a(); b();"), "a();b()");
    }

    #[test]
    fn test_empty_loop_body_keeps_semicolon() {
        assert_eq!(min("for (var i = 0; i < 10; i++) {}"), "for(var i=0;i<10;i++);");
        assert_eq!(min("while (a) {}"), "while(a);");
    }

    #[test]
    fn test_dangling_else_gets_braces() {
        assert_eq!(
            min("if (a) { if (b) c(); } else d();"),
            "if(a){if(b)c()}else d()"
        );
    }

    #[test]
    fn test_else_if_chain_stays_flat() {
        assert_eq!(
            min("if (a) b(); else if (c) d(); else e();"),
            "if(a)b();else if(c)d();else e()"
        );
    }

    #[test]
    fn test_do_while() {
        assert_eq!(min("do a(); while (b);"), "do a();while(b)");
        assert_eq!(min("do { a(); b(); } while (c);"), "do{a();b()}while(c)");
    }

    #[test]
    fn test_switch() {
        assert_eq!(
            min("switch (x) { case 1: a(); break; default: b(); }"),
            "switch(x){case 1:a();break;default:b()}"
        );
    }

    #[test]
    fn test_try_catch_finally() {
        assert_eq!(
            min("try { a(); } catch (e) { b(e); } finally { c(); }"),
            "try{a()}catch(e){b(e)}finally{c()}"
        );
    }

    #[test]
    fn test_labeled_loop() {
        assert_eq!(
            min("outer: for (;;) break outer;"),
            "outer:for(;;)break outer"
        );
    }

    #[test]
    fn test_lexical_declaration_body_keeps_braces() {
        assert_eq!(min("if (a) let x = 1;"), "if(a){let x=1}");
    }

    #[test]
    fn test_for_in_and_of() {
        assert_eq!(min("for (var k in obj) a(k);"), "for(var k in obj)a(k)");
        assert_eq!(min("for (var v of list) a(v);"), "for(var v of list)a(v)");
    }

    #[test]
    fn test_in_parenthesized_in_for_head() {
        assert_eq!(
            min("for (var x = ('a' in b); x; ) {}"),
            "for(var x=(\"a\"in b);x;);"
        );
    }

    #[test]
    fn test_directive_prologue_printed_first() {
        assert_eq!(min("\"use strict\"; var x;"), "\"use strict\";var x");
    }

    #[test]
    fn test_important_comment_on_own_line() {
        assert_eq!(min("/*! legal */ var x;"), "/*! legal */\nvar x");
    }

    // ── Parenthesization ──────────────────────────────────────────────────────

    #[test]
    fn test_precedence_parens_re_derived() {
        assert_eq!(min("x = (a + b) * c;"), "x=(a+b)*c");
        assert_eq!(min("x = a + b * c;"), "x=a+b*c");
    }

    #[test]
    fn test_equal_precedence_right_operand() {
        // Kept: regrouping subtraction changes the value.
        assert_eq!(min("x = a - (b - c);"), "x=a-(b-c)");
        assert_eq!(min("x = a / (b * c);"), "x=a/(b*c)");
        // Dropped: same associative operator.
        assert_eq!(min("x = a * (b * c);"), "x=a*b*c");
        assert_eq!(min("x = a && (b && c);"), "x=a&&b&&c");
    }

    #[test]
    fn test_exponent_keeps_left_parens() {
        assert_eq!(min("x = (a ** b) ** c;"), "x=(a**b)**c");
        assert_eq!(min("x = a ** b ** c;"), "x=a**b**c");
    }

    #[test]
    fn test_zero_arg_new_object_parenthesized() {
        assert_eq!(min("(new Foo).bar;"), "(new Foo).bar");
        // An empty argument list is dropped, so the parenthesized form wins.
        assert_eq!(min("new Foo().bar;"), "(new Foo).bar");
    }

    #[test]
    fn test_new_callee_with_call_parenthesized() {
        assert_eq!(min("new (f());"), "new(f())");
    }

    #[test]
    fn test_statement_start_object_and_function() {
        assert_eq!(min("({ a: 1 });"), "({a:1})");
        assert_eq!(min("(function () {})();"), "(function(){}())");
    }

    #[test]
    fn test_sequence_and_conditional() {
        assert_eq!(min("a, b, c;"), "a,b,c");
        assert_eq!(min("x = (a, b);"), "x=(a,b)");
        assert_eq!(min("x = a ? b : c = d;"), "x=a?b:c=d");
    }

    // ── Token fusion guards ───────────────────────────────────────────────────

    #[test]
    fn test_sign_run_spacing() {
        assert_eq!(min("x = a - -b;"), "x=a- -b");
        assert_eq!(min("x = a + +b;"), "x=a+ +b");
        assert_eq!(min("x = a + ++b;"), "x=a+ ++b");
    }

    #[test]
    fn test_word_operator_spacing() {
        assert_eq!(min("x = typeof y;"), "x=typeof y");
        assert_eq!(min("x = a in b;"), "x=a in b");
        assert_eq!(min("x = a instanceof b;"), "x=a instanceof b");
    }

    #[test]
    fn test_integer_dot_member() {
        assert_eq!(min("x = (1).toString();"), "x=1 .toString()");
        // A fractional literal already has a dot; no space needed.
        assert_eq!(min("x = (1.5).toString();"), "x=1.5.toString()");
    }

    #[test]
    fn test_regex_after_slash() {
        assert_eq!(min("x = a / /re/.exec(b);"), "x=a/ /re/.exec(b)");
        assert_eq!(min("if (a) /re/.test(b);"), "if(a)/re/.test(b)");
    }

    // ── Literal rewriting ─────────────────────────────────────────────────────

    #[test]
    fn test_number_minification() {
        assert_eq!(min("x = 0.5;"), "x=.5");
        assert_eq!(min("x = 1000000;"), "x=1e6");
        assert_eq!(min("x = 1e21;"), "x=1e21");
        assert_eq!(min("x = 15;"), "x=15");
        assert_eq!(min("x = 0x10;"), "x=16");
    }

    #[test]
    fn test_string_delimiter_choice() {
        assert_eq!(min("x = 'plain';"), "x=\"plain\"");
        assert_eq!(min("x = \"it's\";"), "x=\"it's\"");
        assert_eq!(min("x = 'say \"hi\"';"), "x='say \"hi\"'");
    }

    #[test]
    fn test_object_key_unquoting() {
        assert_eq!(min("x = { 'a': 1, \"b c\": 2 };"), "x={a:1,\"b c\":2}");
    }

    #[test]
    fn test_array_holes_round_trip() {
        assert_eq!(min("x = [1, , 3];"), "x=[1,,3]");
        assert_eq!(min("x = [1, , ];"), "x=[1,,]");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(
            min("x = { get a() { return 1; }, set a(v) {} };"),
            "x={get a(){return 1},set a(v){}}"
        );
    }

    // ── ASI output ────────────────────────────────────────────────────────────

    #[test]
    fn test_asi_statements_get_semicolons() {
        assert_eq!(min("a\nb"), "a;b");
        assert_eq!(min("return"), "return");
    }

    // ── Idempotence ───────────────────────────────────────────────────────────

    #[test]
    fn test_print_is_idempotent() {
        roundtrips("if (a) { if (b) c(); } else d();");
        roundtrips("for (var i = 0; i < 10; i++) { f(i); }");
        roundtrips("x = a ? b : c = d, e;");
        roundtrips("(new Foo).bar(1, 2)[3];");
        roundtrips("x = { get a() { return -1; } };");
        roundtrips("try { a(); } catch (e) { b(); } finally {}");
        roundtrips("x = a / /re/g.exec(\"s\");");
    }

    // ── Soft line breaks ──────────────────────────────────────────────────────

    #[test]
    fn test_soft_line_break_after_threshold() {
        let mut settings = CodeSettings::minified();
        settings.line_break_threshold = 16;
        let src = "aaaa(); bbbb(); cccc(); dddd();";
        let result = Parser::new(src, &settings).parse();
        let out = print(&result.program, &settings);
        assert!(out.contains('\n'), "expected a soft break in {out:?}");
        // Breaks only ever follow a safe punctuator.
        for (i, c) in out.char_indices() {
            if c == '\n' {
                let prev = out[..i].chars().last().unwrap();
                assert!(matches!(prev, ',' | ';' | '{' | '}'));
            }
        }
    }

    #[test]
    fn test_no_break_inside_for_head() {
        let mut settings = CodeSettings::minified();
        settings.line_break_threshold = 4;
        let src = "for (var i = 0; i < 100; i++) { body(); }";
        let result = Parser::new(src, &settings).parse();
        let out = print(&result.program, &settings);
        let head_end = out.find(')').unwrap();
        assert!(!out[..head_end].contains('\n'));
    }

    // ── Multi-line mode ───────────────────────────────────────────────────────

    #[test]
    fn test_pretty_output() {
        let settings = CodeSettings::pretty();
        let result = Parser::new("if (a) { b(); c(); }", &settings).parse();
        let out = print(&result.program, &settings);
        assert_eq!(out, "if (a) {\n    b();\n    c();\n}");
    }

    #[test]
    fn test_pretty_keeps_literals_as_written() {
        let settings = CodeSettings::pretty();
        let result = Parser::new("x = 0.50;", &settings).parse();
        let out = print(&result.program, &settings);
        assert_eq!(out, "x = 0.50;");
    }

    // ── Source-map hook ───────────────────────────────────────────────────────

    #[test]
    fn test_segment_sink_sees_symbols() {
        #[derive(Default)]
        struct Recorder {
            names: Vec<String>,
            functions: Vec<Option<String>>,
        }
        impl SegmentSink for Recorder {
            fn mark_segment(&mut self, _line: u32, _column: u32, _span: Span, name: Option<&str>) {
                if let Some(n) = name {
                    self.names.push(n.to_string());
                }
            }
            fn end_symbol(&mut self, name: Option<&str>) {
                self.functions.push(name.map(str::to_string));
            }
        }
        let settings = CodeSettings::default();
        let result = Parser::new("function f(a) { return a; }", &settings).parse();
        let mut recorder = Recorder::default();
        let out = print_with_sink(&result.program, &settings, &mut recorder);
        assert_eq!(out, "function f(a){return a}");
        assert_eq!(recorder.names, vec!["f", "a", "a"]);
        assert_eq!(recorder.functions, vec![Some("f".to_string())]);
    }

    // ── Literal helpers ───────────────────────────────────────────────────────

    #[test]
    fn test_minify_number_forms() {
        assert_eq!(minify_number(0.0, "0"), "0");
        assert_eq!(minify_number(0.25, "0.25"), ".25");
        assert_eq!(minify_number(100000.0, "100000"), "1e5");
        assert_eq!(minify_number(123.0, "123"), "123");
    }

    #[test]
    fn test_quote_string_escapes() {
        assert_eq!(quote_string("a\nb"), "\"a\\nb\"");
        assert_eq!(quote_string("it's"), "\"it's\"");
        assert_eq!(quote_string("a\"b'c\"d"), "'a\"b\\'c\"d'");
    }

    #[test]
    fn test_identifier_check() {
        assert!(is_valid_identifier("abc"));
        assert!(is_valid_identifier("$x_1"));
        assert!(!is_valid_identifier("1abc"));
        assert!(!is_valid_identifier("a b"));
        assert!(!is_valid_identifier("in"));
    }
}

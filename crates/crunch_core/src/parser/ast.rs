//! Abstract syntax tree for JavaScript.
//!
//! Nodes are owned by value: every node owns its children through `Box` and
//! `Vec`, and the parent relation is implicit in that ownership. The closed
//! [`Expr`] and [`Stmt`] enums are matched exhaustively everywhere, so adding
//! a variant surfaces every site that must learn about it.
//!
//! Structural child access is uniform across node types through the
//! [`AstNode`] trait: `child`/`children` enumerate present children in fixed
//! grammar order, and `replace_child` swaps a child by slot index. Replacing
//! a statement inside a [`Block`] with another block splices its statements
//! in-place rather than nesting.

use std::mem;

use crate::parser::scanner::Span;

// ─────────────────────────────────────────────────────────────────────────────
// Precedence
// ─────────────────────────────────────────────────────────────────────────────

/// Operator precedence, lowest to highest.
///
/// This single ordering drives both expression parsing (reduce decisions)
/// and printing (minimal parenthesization): a child is parenthesized exactly
/// when its precedence is too low for the slot it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// Not an operator; no binding power at all.
    None,
    /// `,` sequence.
    Comma,
    /// `=` and compound assignment.
    Assignment,
    /// `?:`
    Conditional,
    /// `??`
    NullishCoalesce,
    /// `||`
    LogicalOr,
    /// `&&`
    LogicalAnd,
    /// `|`
    BitwiseOr,
    /// `^`
    BitwiseXor,
    /// `&`
    BitwiseAnd,
    /// `==` `!=` `===` `!==`
    Equality,
    /// `<` `>` `<=` `>=` `in` `instanceof`
    Relational,
    /// `<<` `>>` `>>>`
    Shift,
    /// `+` `-`
    Additive,
    /// `*` `/` `%`
    Multiplicative,
    /// `**`
    Exponentiation,
    /// Prefix operators: `!` `~` `+` `-` `++` `--` `delete` `void` `typeof`.
    Unary,
    /// Postfix `++` `--`.
    Postfix,
    /// Member access, indexing, calls, `new`.
    CallMember,
    /// Literals, identifiers, parenthesized groups.
    Primary,
}

// ─────────────────────────────────────────────────────────────────────────────
// Operators
// ─────────────────────────────────────────────────────────────────────────────

/// Binary (including logical) operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Exp,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    In,
    Instanceof,
    ShiftLeft,
    ShiftRight,
    ShiftRightUnsigned,
    BitAnd,
    BitOr,
    BitXor,
    LogicalAnd,
    LogicalOr,
    NullishCoalesce,
}

impl BinaryOp {
    /// The precedence class of this operator.
    pub fn precedence(self) -> Precedence {
        use BinaryOp::*;
        match self {
            NullishCoalesce => Precedence::NullishCoalesce,
            LogicalOr => Precedence::LogicalOr,
            LogicalAnd => Precedence::LogicalAnd,
            BitOr => Precedence::BitwiseOr,
            BitXor => Precedence::BitwiseXor,
            BitAnd => Precedence::BitwiseAnd,
            Equal | NotEqual | StrictEqual | StrictNotEqual => Precedence::Equality,
            Less | Greater | LessEqual | GreaterEqual | In | Instanceof => Precedence::Relational,
            ShiftLeft | ShiftRight | ShiftRightUnsigned => Precedence::Shift,
            Add | Sub => Precedence::Additive,
            Mul | Div | Mod => Precedence::Multiplicative,
            Exp => Precedence::Exponentiation,
        }
    }

    /// `**` groups right-to-left; everything else left-to-right.
    pub fn is_left_associative(self) -> bool {
        !matches!(self, BinaryOp::Exp)
    }

    /// `true` for operators where `a op (b op c)` equals `(a op b) op c`,
    /// letting the printer drop parentheses around an equal-precedence right
    /// operand when the operator tokens are identical.
    pub fn is_associative(self) -> bool {
        matches!(
            self,
            BinaryOp::Mul
                | BinaryOp::BitAnd
                | BinaryOp::BitOr
                | BinaryOp::BitXor
                | BinaryOp::LogicalAnd
                | BinaryOp::LogicalOr
        )
    }

    /// Source text for this operator.
    pub fn as_str(self) -> &'static str {
        use BinaryOp::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
            Exp => "**",
            Equal => "==",
            NotEqual => "!=",
            StrictEqual => "===",
            StrictNotEqual => "!==",
            Less => "<",
            Greater => ">",
            LessEqual => "<=",
            GreaterEqual => ">=",
            In => "in",
            Instanceof => "instanceof",
            ShiftLeft => "<<",
            ShiftRight => ">>",
            ShiftRightUnsigned => ">>>",
            BitAnd => "&",
            BitOr => "|",
            BitXor => "^",
            LogicalAnd => "&&",
            LogicalOr => "||",
            NullishCoalesce => "??",
        }
    }

    /// `true` for `in` and `instanceof`, which need identifier spacing.
    pub fn is_word(self) -> bool {
        matches!(self, BinaryOp::In | BinaryOp::Instanceof)
    }
}

/// Assignment operators (all right-associative, all at
/// [`Precedence::Assignment`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    ExpAssign,
    ShiftLeftAssign,
    ShiftRightAssign,
    ShiftRightUnsignedAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    NullishAssign,
}

impl AssignOp {
    /// Source text for this operator.
    pub fn as_str(self) -> &'static str {
        use AssignOp::*;
        match self {
            Assign => "=",
            AddAssign => "+=",
            SubAssign => "-=",
            MulAssign => "*=",
            DivAssign => "/=",
            ModAssign => "%=",
            ExpAssign => "**=",
            ShiftLeftAssign => "<<=",
            ShiftRightAssign => ">>=",
            ShiftRightUnsignedAssign => ">>>=",
            BitAndAssign => "&=",
            BitOrAssign => "|=",
            BitXorAssign => "^=",
            NullishAssign => "??=",
        }
    }
}

/// Prefix unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Delete,
    Void,
    Typeof,
    Plus,
    Minus,
    BitNot,
    Not,
    Increment,
    Decrement,
}

impl UnaryOp {
    /// Source text for this operator.
    pub fn as_str(self) -> &'static str {
        use UnaryOp::*;
        match self {
            Delete => "delete",
            Void => "void",
            Typeof => "typeof",
            Plus => "+",
            Minus => "-",
            BitNot => "~",
            Not => "!",
            Increment => "++",
            Decrement => "--",
        }
    }

    /// `true` for word-form operators that need trailing identifier spacing.
    pub fn is_word(self) -> bool {
        matches!(self, UnaryOp::Delete | UnaryOp::Void | UnaryOp::Typeof)
    }
}

/// Postfix update operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

impl PostfixOp {
    /// Source text for this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            PostfixOp::Increment => "++",
            PostfixOp::Decrement => "--",
        }
    }
}

/// Declaration keyword of a variable statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Var,
    Let,
    Const,
}

impl DeclKind {
    /// The declaration keyword text.
    pub fn as_str(self) -> &'static str {
        match self {
            DeclKind::Var => "var",
            DeclKind::Let => "let",
            DeclKind::Const => "const",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared node pieces
// ─────────────────────────────────────────────────────────────────────────────

/// An identifier reference or binding name.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub span: Span,
    pub name: String,
}

/// A function declaration or expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub span: Span,
    /// `None` for anonymous function expressions.
    pub name: Option<Ident>,
    pub params: Vec<Ident>,
    pub body: Block,
}

/// A numeric literal with its original source text.
#[derive(Debug, Clone, PartialEq)]
pub struct NumLit {
    pub span: Span,
    pub value: f64,
    /// The literal exactly as written, used when literal minification is off.
    pub raw: String,
}

/// A string literal.
#[derive(Debug, Clone, PartialEq)]
pub struct StrLit {
    pub span: Span,
    /// The decoded character value (escapes resolved, quotes stripped).
    pub value: String,
    /// The literal exactly as written, including quotes.
    pub raw: String,
}

/// A regular-expression literal.
#[derive(Debug, Clone, PartialEq)]
pub struct RegexLit {
    pub span: Span,
    pub pattern: String,
    pub flags: String,
}

/// How an object-literal property supplies its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// `key: value`
    Init,
    /// `get key() { … }`
    Get,
    /// `set key(v) { … }`
    Set,
}

/// An object-literal property key.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    Ident(Ident),
    Str(StrLit),
    Num(NumLit),
}

impl PropertyKey {
    pub fn span(&self) -> Span {
        match self {
            PropertyKey::Ident(i) => i.span,
            PropertyKey::Str(s) => s.span,
            PropertyKey::Num(n) => n.span,
        }
    }
}

/// A single object-literal property.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub span: Span,
    pub kind: PropertyKind,
    pub key: PropertyKey,
    /// For [`PropertyKind::Get`]/[`PropertyKind::Set`] this is always an
    /// [`Expr::Function`].
    pub value: Expr,
}

// ─────────────────────────────────────────────────────────────────────────────
// Expressions
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub span: Span,
    pub op: UnaryOp,
    pub operand: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostfixExpr {
    pub span: Span,
    pub op: PostfixOp,
    pub operand: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub span: Span,
    pub op: BinaryOp,
    pub left: Expr,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignExpr {
    pub span: Span,
    pub op: AssignOp,
    pub left: Expr,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CondExpr {
    pub span: Span,
    pub condition: Expr,
    pub if_true: Expr,
    pub if_false: Expr,
}

/// An n-ary comma sequence. Parsing normalizes nested comma pairs into one
/// flat list, so a `Sequence` never directly contains another `Sequence`.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceExpr {
    pub span: Span,
    /// Always at least two expressions.
    pub exprs: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr {
    pub span: Span,
    pub object: Expr,
    pub property: Ident,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub span: Span,
    pub object: Expr,
    pub index: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub span: Span,
    pub callee: Expr,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpr {
    pub span: Span,
    pub callee: Expr,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLit {
    pub span: Span,
    /// `None` entries are elisions (`[1,,3]`).
    pub elements: Vec<Option<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLit {
    pub span: Span,
    pub properties: Vec<Property>,
}

/// A JavaScript expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null(Span),
    True(Span),
    False(Span),
    This(Span),
    Num(NumLit),
    Str(StrLit),
    Regex(RegexLit),
    Ident(Ident),
    Array(Box<ArrayLit>),
    Object(Box<ObjectLit>),
    Function(Box<Function>),
    Unary(Box<UnaryExpr>),
    Postfix(Box<PostfixExpr>),
    Binary(Box<BinaryExpr>),
    Assign(Box<AssignExpr>),
    Conditional(Box<CondExpr>),
    Sequence(Box<SequenceExpr>),
    Member(Box<MemberExpr>),
    Index(Box<IndexExpr>),
    Call(Box<CallExpr>),
    New(Box<NewExpr>),
    /// Raw `<% … %>` host-template text passed through verbatim.
    EmbeddedBlock(Span, String),
}

impl Expr {
    /// Source location of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Null(s) | Expr::True(s) | Expr::False(s) | Expr::This(s) => *s,
            Expr::Num(n) => n.span,
            Expr::Str(s) => s.span,
            Expr::Regex(r) => r.span,
            Expr::Ident(i) => i.span,
            Expr::Array(a) => a.span,
            Expr::Object(o) => o.span,
            Expr::Function(f) => f.span,
            Expr::Unary(u) => u.span,
            Expr::Postfix(p) => p.span,
            Expr::Binary(b) => b.span,
            Expr::Assign(a) => a.span,
            Expr::Conditional(c) => c.span,
            Expr::Sequence(s) => s.span,
            Expr::Member(m) => m.span,
            Expr::Index(i) => i.span,
            Expr::Call(c) => c.span,
            Expr::New(n) => n.span,
            Expr::EmbeddedBlock(s, _) => *s,
        }
    }

    /// The precedence class of this expression, from the static operator
    /// table. Every parenthesization decision derives from this.
    pub fn precedence(&self) -> Precedence {
        match self {
            Expr::Sequence(_) => Precedence::Comma,
            Expr::Assign(_) => Precedence::Assignment,
            Expr::Conditional(_) => Precedence::Conditional,
            Expr::Binary(b) => b.op.precedence(),
            Expr::Unary(_) => Precedence::Unary,
            Expr::Postfix(_) => Precedence::Postfix,
            Expr::Member(_) | Expr::Index(_) | Expr::Call(_) | Expr::New(_) => {
                Precedence::CallMember
            }
            Expr::Null(_)
            | Expr::True(_)
            | Expr::False(_)
            | Expr::This(_)
            | Expr::Num(_)
            | Expr::Str(_)
            | Expr::Regex(_)
            | Expr::Ident(_)
            | Expr::Array(_)
            | Expr::Object(_)
            | Expr::Function(_)
            | Expr::EmbeddedBlock(..) => Precedence::Primary,
        }
    }

    /// The leftmost node in source/printed order: the node whose first output
    /// character is also this expression's first output character.
    ///
    /// Used to decide whether an expression statement would begin with `{`
    /// or `function` (which must then be parenthesized). Prefix unary
    /// expressions are their own left-hand side since the operator token
    /// prints first.
    pub fn left_hand_side(&self) -> &Expr {
        match self {
            Expr::Binary(b) => b.left.left_hand_side(),
            Expr::Assign(a) => a.left.left_hand_side(),
            Expr::Conditional(c) => c.condition.left_hand_side(),
            Expr::Sequence(s) => s.exprs[0].left_hand_side(),
            Expr::Postfix(p) => p.operand.left_hand_side(),
            Expr::Member(m) => m.object.left_hand_side(),
            Expr::Index(i) => i.object.left_hand_side(),
            Expr::Call(c) => c.callee.left_hand_side(),
            _ => self,
        }
    }

    /// `true` when the expression is a literal constant or composed purely of
    /// constants.
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Null(_) | Expr::True(_) | Expr::False(_) | Expr::Num(_) | Expr::Str(_) => true,
            Expr::Unary(u) => {
                !matches!(u.op, UnaryOp::Delete | UnaryOp::Increment | UnaryOp::Decrement)
                    && u.operand.is_constant()
            }
            Expr::Binary(b) => b.left.is_constant() && b.right.is_constant(),
            Expr::Conditional(c) => {
                c.condition.is_constant() && c.if_true.is_constant() && c.if_false.is_constant()
            }
            _ => false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────────────

/// A brace-delimited (or implicit) statement list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub span: Span,
    pub stmts: Vec<Stmt>,
}

impl Block {
    /// The single statement of a one-statement block, used by the printer to
    /// decide whether braces can be dropped.
    pub fn single(&self) -> Option<&Stmt> {
        if self.stmts.len() == 1 {
            self.stmts.first()
        } else {
            None
        }
    }
}

/// One `name = init` binding of a variable statement.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub span: Span,
    pub name: Ident,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarStmt {
    pub span: Span,
    pub kind: DeclKind,
    pub decls: Vec<VarDecl>,
    /// Span of the terminating `;`, if one was written.
    pub terminator: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub span: Span,
    pub expr: Expr,
    pub terminator: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub span: Span,
    pub condition: Expr,
    pub true_branch: Block,
    pub false_branch: Option<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub span: Span,
    /// A terminator-less [`Stmt::Var`] or [`Stmt::Expr`], when present.
    pub init: Option<Box<Stmt>>,
    pub condition: Option<Expr>,
    pub update: Option<Expr>,
    pub body: Block,
}

/// Which enumeration form a `for (… in/of …)` head uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForInKind {
    In,
    Of,
}

impl ForInKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ForInKind::In => "in",
            ForInKind::Of => "of",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForInStmt {
    pub span: Span,
    pub kind: ForInKind,
    /// A terminator-less [`Stmt::Var`] (single binding, no initializer) or
    /// [`Stmt::Expr`] naming the iteration target.
    pub left: Box<Stmt>,
    pub right: Expr,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub span: Span,
    pub condition: Expr,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStmt {
    pub span: Span,
    pub body: Block,
    pub condition: Expr,
    pub terminator: Option<Span>,
}

/// `break` or `continue`.
#[derive(Debug, Clone, PartialEq)]
pub struct JumpStmt {
    pub span: Span,
    pub label: Option<Ident>,
    /// Number of `try { … } finally` blocks this jump exits through.
    pub escapes_finally: u32,
    pub terminator: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub span: Span,
    pub value: Option<Expr>,
    pub terminator: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithStmt {
    pub span: Span,
    pub object: Expr,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub span: Span,
    /// `None` for the `default:` clause.
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub span: Span,
    pub discriminant: Expr,
    pub cases: Vec<SwitchCase>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledStmt {
    pub span: Span,
    pub label: Ident,
    /// How many labeled statements enclose this one with the same nesting
    /// chain; lets a renaming pass shorten labels without collisions.
    pub nest_level: u32,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStmt {
    pub span: Span,
    pub value: Expr,
    pub terminator: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub span: Span,
    pub param: Ident,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt {
    pub span: Span,
    pub block: Block,
    pub catch: Option<CatchClause>,
    pub finally: Option<Block>,
}

/// A directive-prologue string statement such as `"use strict"`.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveStmt {
    pub span: Span,
    pub literal: StrLit,
    pub terminator: Option<Span>,
}

/// A JavaScript statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Block(Block),
    Var(VarStmt),
    Empty(Span),
    Expr(ExprStmt),
    If(Box<IfStmt>),
    For(Box<ForStmt>),
    ForIn(Box<ForInStmt>),
    While(Box<WhileStmt>),
    DoWhile(Box<DoWhileStmt>),
    Continue(JumpStmt),
    Break(JumpStmt),
    Return(ReturnStmt),
    With(Box<WithStmt>),
    Switch(Box<SwitchStmt>),
    Labeled(Box<LabeledStmt>),
    Throw(ThrowStmt),
    Try(Box<TryStmt>),
    Debugger(Span),
    FunctionDecl(Box<Function>),
    Directive(DirectiveStmt),
    /// A `/*! … */` or conditional-compilation comment kept as a statement.
    ImportantComment(Span, String),
}

impl Stmt {
    /// Source location of this statement.
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block(b) => b.span,
            Stmt::Var(v) => v.span,
            Stmt::Empty(s) => *s,
            Stmt::Expr(e) => e.span,
            Stmt::If(i) => i.span,
            Stmt::For(f) => f.span,
            Stmt::ForIn(f) => f.span,
            Stmt::While(w) => w.span,
            Stmt::DoWhile(d) => d.span,
            Stmt::Continue(j) | Stmt::Break(j) => j.span,
            Stmt::Return(r) => r.span,
            Stmt::With(w) => w.span,
            Stmt::Switch(s) => s.span,
            Stmt::Labeled(l) => l.span,
            Stmt::Throw(t) => t.span,
            Stmt::Try(t) => t.span,
            Stmt::Debugger(s) => *s,
            Stmt::FunctionDecl(f) => f.span,
            Stmt::Directive(d) => d.span,
            Stmt::ImportantComment(s, _) => *s,
        }
    }

    /// `true` when a `;` must separate this statement from a following one.
    ///
    /// Statements ending in `}` (blocks, function declarations, switch, try)
    /// need no separator; an empty statement prints its own. Wrapping
    /// statements delegate to the last thing they print.
    pub fn requires_separator(&self) -> bool {
        match self {
            Stmt::Block(_)
            | Stmt::Empty(_)
            | Stmt::Switch(_)
            | Stmt::Try(_)
            | Stmt::FunctionDecl(_)
            | Stmt::ImportantComment(..) => false,
            Stmt::If(i) => match &i.false_branch {
                Some(b) => block_requires_separator(b),
                None => block_requires_separator(&i.true_branch),
            },
            Stmt::For(f) => block_requires_separator(&f.body),
            Stmt::ForIn(f) => block_requires_separator(&f.body),
            Stmt::While(w) => block_requires_separator(&w.body),
            Stmt::With(w) => block_requires_separator(&w.body),
            Stmt::Labeled(l) => l.body.requires_separator(),
            Stmt::Var(_)
            | Stmt::Expr(_)
            | Stmt::DoWhile(_)
            | Stmt::Continue(_)
            | Stmt::Break(_)
            | Stmt::Return(_)
            | Stmt::Throw(_)
            | Stmt::Debugger(_)
            | Stmt::Directive(_) => true,
        }
    }
}

/// Whether a block, printed braceless when it holds one statement, ends in
/// something needing a separator.
fn block_requires_separator(block: &Block) -> bool {
    match block.single() {
        Some(stmt) => stmt.requires_separator(),
        // Zero statements print `;`, two or more print braces.
        None => block.stmts.is_empty(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Uniform child access
// ─────────────────────────────────────────────────────────────────────────────

/// A shared reference to a child node.
#[derive(Debug, Clone, Copy)]
pub enum ChildRef<'a> {
    Expr(&'a Expr),
    Stmt(&'a Stmt),
    Block(&'a Block),
}

/// An owned node, used as the replacement payload for
/// [`AstNode::replace_child`] and as its return value.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildNode {
    Expr(Expr),
    Stmt(Stmt),
    Block(Block),
}

/// A mutable slot holding one child. Internal currency of `replace_child`.
enum SlotMut<'a> {
    Expr(&'a mut Expr),
    Stmt(&'a mut Stmt),
    Block(&'a mut Block),
}

/// Uniform structural access to a node's children.
///
/// Children are enumerated in fixed grammar order; absent optional children
/// are skipped entirely, so indices are dense.
pub trait AstNode {
    /// Number of present children.
    fn child_count(&self) -> usize;

    /// The `index`-th present child, or `None` past the end.
    fn child(&self, index: usize) -> Option<ChildRef<'_>>;

    /// Replace the `index`-th child with `new`, returning the old child.
    ///
    /// On an out-of-range index or a type mismatch between slot and payload
    /// the tree is left untouched and `new` comes back as the error value.
    ///
    /// Replacing a statement slot of a [`Block`] with a block splices the
    /// replacement's statements in-place instead of nesting.
    fn replace_child(&mut self, index: usize, new: ChildNode) -> Result<ChildNode, ChildNode>;

    /// Lazy iterator over present children, in the same order as
    /// [`AstNode::child`]. Restartable: call again for a fresh pass.
    fn children(&self) -> Children<'_>
    where
        Self: Sized,
    {
        Children { node: self, index: 0 }
    }
}

/// Iterator over a node's present children. See [`AstNode::children`].
pub struct Children<'a> {
    node: &'a dyn AstNode,
    index: usize,
}

impl<'a> Iterator for Children<'a> {
    type Item = ChildRef<'a>;

    fn next(&mut self) -> Option<ChildRef<'a>> {
        let child = self.node.child(self.index)?;
        self.index += 1;
        Some(child)
    }
}

/// Swap `new` into the `index`-th slot, returning the displaced child.
fn replace_in_slots(
    mut slots: Vec<SlotMut<'_>>,
    index: usize,
    new: ChildNode,
) -> Result<ChildNode, ChildNode> {
    if index >= slots.len() {
        return Err(new);
    }
    match (slots.swap_remove(index), new) {
        (SlotMut::Expr(slot), ChildNode::Expr(e)) => Ok(ChildNode::Expr(mem::replace(slot, e))),
        (SlotMut::Stmt(slot), ChildNode::Stmt(s)) => Ok(ChildNode::Stmt(mem::replace(slot, s))),
        // A statement slot accepts a bare block by wrapping it.
        (SlotMut::Stmt(slot), ChildNode::Block(b)) => {
            Ok(ChildNode::Stmt(mem::replace(slot, Stmt::Block(b))))
        }
        (SlotMut::Block(slot), ChildNode::Block(b)) => Ok(ChildNode::Block(mem::replace(slot, b))),
        (_, new) => Err(new),
    }
}

impl AstNode for Expr {
    fn child_count(&self) -> usize {
        expr_refs(self).len()
    }

    fn child(&self, index: usize) -> Option<ChildRef<'_>> {
        expr_refs(self).into_iter().nth(index)
    }

    fn replace_child(&mut self, index: usize, new: ChildNode) -> Result<ChildNode, ChildNode> {
        replace_in_slots(expr_slots(self), index, new)
    }
}

impl AstNode for Stmt {
    fn child_count(&self) -> usize {
        match self {
            Stmt::Block(b) => b.child_count(),
            _ => stmt_refs(self).len(),
        }
    }

    fn child(&self, index: usize) -> Option<ChildRef<'_>> {
        match self {
            Stmt::Block(b) => b.child(index),
            _ => stmt_refs(self).into_iter().nth(index),
        }
    }

    fn replace_child(&mut self, index: usize, new: ChildNode) -> Result<ChildNode, ChildNode> {
        match self {
            // Block goes through Block's own logic to get splicing.
            Stmt::Block(b) => b.replace_child(index, new),
            _ => replace_in_slots(stmt_slots(self), index, new),
        }
    }
}

impl AstNode for Block {
    fn child_count(&self) -> usize {
        self.stmts.len()
    }

    fn child(&self, index: usize) -> Option<ChildRef<'_>> {
        self.stmts.get(index).map(ChildRef::Stmt)
    }

    fn replace_child(&mut self, index: usize, new: ChildNode) -> Result<ChildNode, ChildNode> {
        if index >= self.stmts.len() {
            return Err(new);
        }
        // Block-for-statement replacement splices; the tree never gains a
        // nested block from a replacement.
        let incoming = match new {
            ChildNode::Block(b) | ChildNode::Stmt(Stmt::Block(b)) => {
                let old = self.stmts.remove(index);
                self.stmts.splice(index..index, b.stmts);
                return Ok(ChildNode::Stmt(old));
            }
            ChildNode::Stmt(s) => s,
            other @ ChildNode::Expr(_) => return Err(other),
        };
        Ok(ChildNode::Stmt(mem::replace(&mut self.stmts[index], incoming)))
    }
}

/// Present children of an expression, in grammar order.
fn expr_refs(expr: &Expr) -> Vec<ChildRef<'_>> {
    let mut out = Vec::new();
    match expr {
        Expr::Null(_)
        | Expr::True(_)
        | Expr::False(_)
        | Expr::This(_)
        | Expr::Num(_)
        | Expr::Str(_)
        | Expr::Regex(_)
        | Expr::Ident(_)
        | Expr::EmbeddedBlock(..) => {}
        Expr::Array(a) => {
            out.extend(a.elements.iter().flatten().map(ChildRef::Expr));
        }
        Expr::Object(o) => {
            out.extend(o.properties.iter().map(|p| ChildRef::Expr(&p.value)));
        }
        Expr::Function(f) => out.push(ChildRef::Block(&f.body)),
        Expr::Unary(u) => out.push(ChildRef::Expr(&u.operand)),
        Expr::Postfix(p) => out.push(ChildRef::Expr(&p.operand)),
        Expr::Binary(b) => {
            out.push(ChildRef::Expr(&b.left));
            out.push(ChildRef::Expr(&b.right));
        }
        Expr::Assign(a) => {
            out.push(ChildRef::Expr(&a.left));
            out.push(ChildRef::Expr(&a.right));
        }
        Expr::Conditional(c) => {
            out.push(ChildRef::Expr(&c.condition));
            out.push(ChildRef::Expr(&c.if_true));
            out.push(ChildRef::Expr(&c.if_false));
        }
        Expr::Sequence(s) => out.extend(s.exprs.iter().map(ChildRef::Expr)),
        Expr::Member(m) => out.push(ChildRef::Expr(&m.object)),
        Expr::Index(i) => {
            out.push(ChildRef::Expr(&i.object));
            out.push(ChildRef::Expr(&i.index));
        }
        Expr::Call(c) => {
            out.push(ChildRef::Expr(&c.callee));
            out.extend(c.args.iter().map(ChildRef::Expr));
        }
        Expr::New(n) => {
            out.push(ChildRef::Expr(&n.callee));
            out.extend(n.args.iter().map(ChildRef::Expr));
        }
    }
    out
}

/// Mutable slots of an expression, same order as [`expr_refs`].
fn expr_slots(expr: &mut Expr) -> Vec<SlotMut<'_>> {
    let mut out = Vec::new();
    match expr {
        Expr::Null(_)
        | Expr::True(_)
        | Expr::False(_)
        | Expr::This(_)
        | Expr::Num(_)
        | Expr::Str(_)
        | Expr::Regex(_)
        | Expr::Ident(_)
        | Expr::EmbeddedBlock(..) => {}
        Expr::Array(a) => {
            out.extend(a.elements.iter_mut().flatten().map(SlotMut::Expr));
        }
        Expr::Object(o) => {
            out.extend(o.properties.iter_mut().map(|p| SlotMut::Expr(&mut p.value)));
        }
        Expr::Function(f) => out.push(SlotMut::Block(&mut f.body)),
        Expr::Unary(u) => out.push(SlotMut::Expr(&mut u.operand)),
        Expr::Postfix(p) => out.push(SlotMut::Expr(&mut p.operand)),
        Expr::Binary(b) => {
            out.push(SlotMut::Expr(&mut b.left));
            out.push(SlotMut::Expr(&mut b.right));
        }
        Expr::Assign(a) => {
            out.push(SlotMut::Expr(&mut a.left));
            out.push(SlotMut::Expr(&mut a.right));
        }
        Expr::Conditional(c) => {
            out.push(SlotMut::Expr(&mut c.condition));
            out.push(SlotMut::Expr(&mut c.if_true));
            out.push(SlotMut::Expr(&mut c.if_false));
        }
        Expr::Sequence(s) => out.extend(s.exprs.iter_mut().map(SlotMut::Expr)),
        Expr::Member(m) => out.push(SlotMut::Expr(&mut m.object)),
        Expr::Index(i) => {
            out.push(SlotMut::Expr(&mut i.object));
            out.push(SlotMut::Expr(&mut i.index));
        }
        Expr::Call(c) => {
            out.push(SlotMut::Expr(&mut c.callee));
            out.extend(c.args.iter_mut().map(SlotMut::Expr));
        }
        Expr::New(n) => {
            out.push(SlotMut::Expr(&mut n.callee));
            out.extend(n.args.iter_mut().map(SlotMut::Expr));
        }
    }
    out
}

/// Present children of a non-block statement, in grammar order.
fn stmt_refs(stmt: &Stmt) -> Vec<ChildRef<'_>> {
    let mut out = Vec::new();
    match stmt {
        Stmt::Block(_) => unreachable!("Block handled by its own AstNode impl"),
        Stmt::Empty(_)
        | Stmt::Continue(_)
        | Stmt::Break(_)
        | Stmt::Debugger(_)
        | Stmt::Directive(_)
        | Stmt::ImportantComment(..) => {}
        Stmt::Var(v) => {
            out.extend(v.decls.iter().filter_map(|d| d.init.as_ref()).map(ChildRef::Expr));
        }
        Stmt::Expr(e) => out.push(ChildRef::Expr(&e.expr)),
        Stmt::If(i) => {
            out.push(ChildRef::Expr(&i.condition));
            out.push(ChildRef::Block(&i.true_branch));
            if let Some(b) = &i.false_branch {
                out.push(ChildRef::Block(b));
            }
        }
        Stmt::For(f) => {
            if let Some(init) = &f.init {
                out.push(ChildRef::Stmt(init));
            }
            if let Some(c) = &f.condition {
                out.push(ChildRef::Expr(c));
            }
            if let Some(u) = &f.update {
                out.push(ChildRef::Expr(u));
            }
            out.push(ChildRef::Block(&f.body));
        }
        Stmt::ForIn(f) => {
            out.push(ChildRef::Stmt(&f.left));
            out.push(ChildRef::Expr(&f.right));
            out.push(ChildRef::Block(&f.body));
        }
        Stmt::While(w) => {
            out.push(ChildRef::Expr(&w.condition));
            out.push(ChildRef::Block(&w.body));
        }
        Stmt::DoWhile(d) => {
            out.push(ChildRef::Block(&d.body));
            out.push(ChildRef::Expr(&d.condition));
        }
        Stmt::Return(r) => {
            if let Some(v) = &r.value {
                out.push(ChildRef::Expr(v));
            }
        }
        Stmt::With(w) => {
            out.push(ChildRef::Expr(&w.object));
            out.push(ChildRef::Block(&w.body));
        }
        Stmt::Switch(s) => {
            out.push(ChildRef::Expr(&s.discriminant));
            for case in &s.cases {
                if let Some(test) = &case.test {
                    out.push(ChildRef::Expr(test));
                }
                out.extend(case.body.iter().map(ChildRef::Stmt));
            }
        }
        Stmt::Labeled(l) => out.push(ChildRef::Stmt(&l.body)),
        Stmt::Throw(t) => out.push(ChildRef::Expr(&t.value)),
        Stmt::Try(t) => {
            out.push(ChildRef::Block(&t.block));
            if let Some(c) = &t.catch {
                out.push(ChildRef::Block(&c.body));
            }
            if let Some(f) = &t.finally {
                out.push(ChildRef::Block(f));
            }
        }
        Stmt::FunctionDecl(f) => out.push(ChildRef::Block(&f.body)),
    }
    out
}

/// Mutable slots of a non-block statement, same order as [`stmt_refs`].
fn stmt_slots(stmt: &mut Stmt) -> Vec<SlotMut<'_>> {
    let mut out = Vec::new();
    match stmt {
        Stmt::Block(_) => unreachable!("Block handled by its own AstNode impl"),
        Stmt::Empty(_)
        | Stmt::Continue(_)
        | Stmt::Break(_)
        | Stmt::Debugger(_)
        | Stmt::Directive(_)
        | Stmt::ImportantComment(..) => {}
        Stmt::Var(v) => {
            out.extend(
                v.decls
                    .iter_mut()
                    .filter_map(|d| d.init.as_mut())
                    .map(SlotMut::Expr),
            );
        }
        Stmt::Expr(e) => out.push(SlotMut::Expr(&mut e.expr)),
        Stmt::If(i) => {
            out.push(SlotMut::Expr(&mut i.condition));
            out.push(SlotMut::Block(&mut i.true_branch));
            if let Some(b) = &mut i.false_branch {
                out.push(SlotMut::Block(b));
            }
        }
        Stmt::For(f) => {
            if let Some(init) = &mut f.init {
                out.push(SlotMut::Stmt(init));
            }
            if let Some(c) = &mut f.condition {
                out.push(SlotMut::Expr(c));
            }
            if let Some(u) = &mut f.update {
                out.push(SlotMut::Expr(u));
            }
            out.push(SlotMut::Block(&mut f.body));
        }
        Stmt::ForIn(f) => {
            out.push(SlotMut::Stmt(&mut f.left));
            out.push(SlotMut::Expr(&mut f.right));
            out.push(SlotMut::Block(&mut f.body));
        }
        Stmt::While(w) => {
            out.push(SlotMut::Expr(&mut w.condition));
            out.push(SlotMut::Block(&mut w.body));
        }
        Stmt::DoWhile(d) => {
            out.push(SlotMut::Block(&mut d.body));
            out.push(SlotMut::Expr(&mut d.condition));
        }
        Stmt::Return(r) => {
            if let Some(v) = &mut r.value {
                out.push(SlotMut::Expr(v));
            }
        }
        Stmt::With(w) => {
            out.push(SlotMut::Expr(&mut w.object));
            out.push(SlotMut::Block(&mut w.body));
        }
        Stmt::Switch(s) => {
            out.push(SlotMut::Expr(&mut s.discriminant));
            for case in &mut s.cases {
                if let Some(test) = &mut case.test {
                    out.push(SlotMut::Expr(test));
                }
                out.extend(case.body.iter_mut().map(SlotMut::Stmt));
            }
        }
        Stmt::Labeled(l) => out.push(SlotMut::Stmt(&mut l.body)),
        Stmt::Throw(t) => out.push(SlotMut::Expr(&mut t.value)),
        Stmt::Try(t) => {
            out.push(SlotMut::Block(&mut t.block));
            if let Some(c) = &mut t.catch {
                out.push(SlotMut::Block(&mut c.body));
            }
            if let Some(f) = &mut t.finally {
                out.push(SlotMut::Block(f));
            }
        }
        Stmt::FunctionDecl(f) => out.push(SlotMut::Block(&mut f.body)),
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sp() -> Span {
        Span::default()
    }

    fn ident(name: &str) -> Expr {
        Expr::Ident(Ident {
            span: sp(),
            name: name.to_string(),
        })
    }

    fn num(value: f64) -> Expr {
        Expr::Num(NumLit {
            span: sp(),
            value,
            raw: value.to_string(),
        })
    }

    fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary(Box::new(BinaryExpr {
            span: sp(),
            op,
            left,
            right,
        }))
    }

    fn expr_stmt(expr: Expr) -> Stmt {
        Stmt::Expr(ExprStmt {
            span: sp(),
            expr,
            terminator: None,
        })
    }

    fn block(stmts: Vec<Stmt>) -> Block {
        Block { span: sp(), stmts }
    }

    // ── Precedence ordering ───────────────────────────────────────────────────

    #[test]
    fn test_precedence_total_order() {
        assert!(Precedence::None < Precedence::Comma);
        assert!(Precedence::Comma < Precedence::Assignment);
        assert!(Precedence::Assignment < Precedence::Conditional);
        assert!(Precedence::Conditional < Precedence::NullishCoalesce);
        assert!(Precedence::LogicalOr < Precedence::LogicalAnd);
        assert!(Precedence::Equality < Precedence::Relational);
        assert!(Precedence::Additive < Precedence::Multiplicative);
        assert!(Precedence::Multiplicative < Precedence::Exponentiation);
        assert!(Precedence::Unary < Precedence::Postfix);
        assert!(Precedence::CallMember < Precedence::Primary);
    }

    #[test]
    fn test_operator_precedence_table() {
        assert_eq!(BinaryOp::Add.precedence(), Precedence::Additive);
        assert_eq!(BinaryOp::Exp.precedence(), Precedence::Exponentiation);
        assert_eq!(BinaryOp::In.precedence(), Precedence::Relational);
        assert_eq!(
            BinaryOp::NullishCoalesce.precedence(),
            Precedence::NullishCoalesce
        );
    }

    #[test]
    fn test_associativity() {
        assert!(BinaryOp::Add.is_left_associative());
        assert!(!BinaryOp::Exp.is_left_associative());
        assert!(BinaryOp::Mul.is_associative());
        assert!(!BinaryOp::Sub.is_associative());
        assert!(!BinaryOp::Div.is_associative());
    }

    #[test]
    fn test_expr_precedence() {
        let e = binary(BinaryOp::Add, ident("a"), ident("b"));
        assert_eq!(e.precedence(), Precedence::Additive);
        assert_eq!(ident("a").precedence(), Precedence::Primary);
        let seq = Expr::Sequence(Box::new(SequenceExpr {
            span: sp(),
            exprs: vec![ident("a"), ident("b")],
        }));
        assert_eq!(seq.precedence(), Precedence::Comma);
    }

    // ── Children enumeration ──────────────────────────────────────────────────

    #[test]
    fn test_children_order_binary() {
        let e = binary(BinaryOp::Mul, ident("a"), ident("b"));
        let kids: Vec<_> = e.children().collect();
        assert_eq!(kids.len(), 2);
        assert!(matches!(kids[0], ChildRef::Expr(Expr::Ident(i)) if i.name == "a"));
        assert!(matches!(kids[1], ChildRef::Expr(Expr::Ident(i)) if i.name == "b"));
    }

    #[test]
    fn test_children_skip_absent() {
        // `if (c) {}` with no else: 2 children, not 3.
        let stmt = Stmt::If(Box::new(IfStmt {
            span: sp(),
            condition: ident("c"),
            true_branch: block(vec![]),
            false_branch: None,
        }));
        assert_eq!(stmt.child_count(), 2);

        // Array holes are skipped.
        let arr = Expr::Array(Box::new(ArrayLit {
            span: sp(),
            elements: vec![Some(num(1.0)), None, Some(num(3.0))],
        }));
        assert_eq!(arr.child_count(), 2);
    }

    #[test]
    fn test_children_iterator_restartable() {
        let e = binary(BinaryOp::Add, ident("x"), ident("y"));
        assert_eq!(e.children().count(), 2);
        assert_eq!(e.children().count(), 2);
    }

    // ── replace_child ─────────────────────────────────────────────────────────

    #[test]
    fn test_replace_child_returns_old() {
        let mut e = binary(BinaryOp::Add, ident("a"), ident("b"));
        let old = e
            .replace_child(1, ChildNode::Expr(num(2.0)))
            .expect("valid slot");
        assert_eq!(old, ChildNode::Expr(ident("b")));
        match &e {
            Expr::Binary(b) => assert!(matches!(&b.right, Expr::Num(n) if n.value == 2.0)),
            _ => panic!("still a binary"),
        }
    }

    #[test]
    fn test_replace_child_out_of_range() {
        let mut e = binary(BinaryOp::Add, ident("a"), ident("b"));
        let err = e.replace_child(5, ChildNode::Expr(num(1.0)));
        assert!(err.is_err());
        // Tree untouched.
        assert_eq!(e, binary(BinaryOp::Add, ident("a"), ident("b")));
    }

    #[test]
    fn test_replace_child_type_mismatch() {
        let mut e = binary(BinaryOp::Add, ident("a"), ident("b"));
        let err = e.replace_child(0, ChildNode::Stmt(Stmt::Empty(sp())));
        assert!(err.is_err());
    }

    #[test]
    fn test_block_replace_splices_block() {
        let mut outer = block(vec![
            expr_stmt(ident("a")),
            expr_stmt(ident("b")),
            expr_stmt(ident("c")),
        ]);
        let replacement = block(vec![expr_stmt(ident("x")), expr_stmt(ident("y"))]);
        let old = outer
            .replace_child(1, ChildNode::Block(replacement))
            .expect("valid slot");
        assert_eq!(old, ChildNode::Stmt(expr_stmt(ident("b"))));
        // Spliced flat, not nested.
        assert_eq!(outer.stmts.len(), 4);
        assert!(outer.stmts.iter().all(|s| !matches!(s, Stmt::Block(_))));
        assert_eq!(outer.stmts[1], expr_stmt(ident("x")));
        assert_eq!(outer.stmts[2], expr_stmt(ident("y")));
        assert_eq!(outer.stmts[3], expr_stmt(ident("c")));
    }

    #[test]
    fn test_block_replace_plain_stmt() {
        let mut outer = block(vec![expr_stmt(ident("a"))]);
        let old = outer
            .replace_child(0, ChildNode::Stmt(Stmt::Empty(sp())))
            .expect("valid slot");
        assert_eq!(old, ChildNode::Stmt(expr_stmt(ident("a"))));
        assert_eq!(outer.stmts, vec![Stmt::Empty(sp())]);
    }

    // ── left_hand_side ────────────────────────────────────────────────────────

    #[test]
    fn test_left_hand_side_descends_left_spine() {
        // `a.b + c` starts with the identifier `a`.
        let member = Expr::Member(Box::new(MemberExpr {
            span: sp(),
            object: ident("a"),
            property: Ident {
                span: sp(),
                name: "b".to_string(),
            },
        }));
        let e = binary(BinaryOp::Add, member, ident("c"));
        assert!(matches!(e.left_hand_side(), Expr::Ident(i) if i.name == "a"));
    }

    #[test]
    fn test_left_hand_side_prefix_unary_is_self() {
        let e = Expr::Unary(Box::new(UnaryExpr {
            span: sp(),
            op: UnaryOp::Not,
            operand: ident("a"),
        }));
        assert!(matches!(e.left_hand_side(), Expr::Unary(_)));
    }

    // ── is_constant ───────────────────────────────────────────────────────────

    #[test]
    fn test_is_constant() {
        assert!(num(1.0).is_constant());
        assert!(binary(BinaryOp::Add, num(1.0), num(2.0)).is_constant());
        assert!(!binary(BinaryOp::Add, num(1.0), ident("x")).is_constant());
        let neg = Expr::Unary(Box::new(UnaryExpr {
            span: sp(),
            op: UnaryOp::Minus,
            operand: num(5.0),
        }));
        assert!(neg.is_constant());
        let del = Expr::Unary(Box::new(UnaryExpr {
            span: sp(),
            op: UnaryOp::Delete,
            operand: num(5.0),
        }));
        assert!(!del.is_constant());
    }

    // ── requires_separator ────────────────────────────────────────────────────

    #[test]
    fn test_requires_separator() {
        assert!(expr_stmt(ident("a")).requires_separator());
        assert!(!Stmt::Block(block(vec![])).requires_separator());
        assert!(!Stmt::FunctionDecl(Box::new(Function {
            span: sp(),
            name: Some(Ident {
                span: sp(),
                name: "f".to_string()
            }),
            params: vec![],
            body: block(vec![]),
        }))
        .requires_separator());
        // `if (a) b` ends in an expression statement: separator needed.
        let if_stmt = Stmt::If(Box::new(IfStmt {
            span: sp(),
            condition: ident("a"),
            true_branch: block(vec![expr_stmt(ident("b"))]),
            false_branch: None,
        }));
        assert!(if_stmt.requires_separator());
        // `if (a) { b; c }` ends in `}`: none needed.
        let if_braced = Stmt::If(Box::new(IfStmt {
            span: sp(),
            condition: ident("a"),
            true_branch: block(vec![expr_stmt(ident("b")), expr_stmt(ident("c"))]),
            false_branch: None,
        }));
        assert!(!if_braced.requires_separator());
    }

    // ── Operator text ─────────────────────────────────────────────────────────

    #[test]
    fn test_operator_text() {
        assert_eq!(BinaryOp::ShiftRightUnsigned.as_str(), ">>>");
        assert_eq!(AssignOp::NullishAssign.as_str(), "??=");
        assert_eq!(UnaryOp::Typeof.as_str(), "typeof");
        assert!(UnaryOp::Typeof.is_word());
        assert!(BinaryOp::Instanceof.is_word());
        assert!(!BinaryOp::Add.is_word());
    }
}

//! Expressions and expression sequences.
//!
//! A body is a `Seq`: statements in source order, always terminated by `Expr::NOp`.
//! The language does not distinguish statements from expressions;
//! the code generator decides how each node is rendered from its `Form`.

use super::op::BOp;
use super::ty::Type;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `mut T name = value`. Composition also introduces uninitialised locals.
    Mut {
        ty: Type,
        name: String,
        value: Option<Box<Expr>>,
    },
    /// `let T name = value`.
    Const {
        ty: Type,
        name: String,
        value: Box<Expr>,
    },
    /// `set name = value`.
    Update {
        name: String,
        value: Box<Expr>,
    },
    /// `out name = value`, assigns a shader output.
    Out {
        name: String,
        value: Box<Expr>,
    },
    /// `if cond { .. } else { .. }`.
    Branch {
        cond: Box<Expr>,
        then: Seq,
        otherwise: Seq,
    },
    /// `for bound do { .. }` or `for counter in bound do { .. }`.
    For {
        bound: Box<Expr>,
        counter: Option<String>,
        body: Seq,
    },
    /// Nested block, produced by shader composition.
    Scope {
        body: Seq,
    },
    I(i64),
    B(bool),
    F(f32),
    D(f64),
    V2(Box<[Expr; 2]>),
    V3(Box<[Expr; 3]>),
    V4(Box<[Expr; 4]>),
    /// Parsed, but rejected by the code generator.
    Mat4(Vec<Expr>),
    Ref(String),
    App {
        name: String,
        args: Vec<Expr>,
    },
    BinOp {
        op: BOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Field access or swizzle, e.g. `pos.xy`.
    AccessN {
        base: Box<Expr>,
        field: String,
    },
    /// Index access, e.g. `weights[2]`.
    AccessI {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Array(Vec<Expr>),
    SComment(String),
    BComment(String),
    NOp,
}

/// How an expression behaves in statement position.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Form {
    /// Rendered as a `;`-terminated statement.
    Effect,
    /// Lifted into `return <value>;`.
    Value,
    /// Rendered as a structured block.
    Control,
    /// Comments and the end marker.
    Trivia,
}

impl Expr {
    pub fn form(self: &Self) -> Form {
        match self {
            Expr::Mut { .. }
            | Expr::Const { .. }
            | Expr::Update { .. }
            | Expr::Out { .. }
            | Expr::App { .. } => Form::Effect,
            Expr::Branch { .. } | Expr::For { .. } | Expr::Scope { .. } => Form::Control,
            Expr::I(_)
            | Expr::B(_)
            | Expr::F(_)
            | Expr::D(_)
            | Expr::V2(_)
            | Expr::V3(_)
            | Expr::V4(_)
            | Expr::Mat4(_)
            | Expr::Ref(_)
            | Expr::BinOp { .. }
            | Expr::AccessN { .. }
            | Expr::AccessI { .. }
            | Expr::Array(_) => Form::Value,
            Expr::SComment(_) | Expr::BComment(_) | Expr::NOp => Form::Trivia,
        }
    }

    pub fn bin(op: BOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::BinOp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

/// A sequence of expressions, terminated by `Expr::NOp`.
#[derive(Debug, Clone, PartialEq)]
pub struct Seq {
    exprs: Vec<Expr>,
}

impl Seq {
    /// Builds a sequence, appending the end marker.
    /// Markers already present in `exprs` are dropped.
    pub fn new(exprs: Vec<Expr>) -> Self {
        let mut exprs: Vec<Expr> = exprs.into_iter().filter(|e| *e != Expr::NOp).collect();
        exprs.push(Expr::NOp);
        Seq { exprs }
    }

    pub fn empty() -> Self {
        Seq::new(Vec::new())
    }

    /// The statements, without the end marker.
    pub fn stmts(self: &Self) -> &[Expr] {
        &self.exprs[..self.exprs.len() - 1]
    }

    /// All nodes, including the end marker.
    pub fn exprs(self: &Self) -> &[Expr] {
        &self.exprs
    }

    pub fn is_empty(self: &Self) -> bool {
        self.exprs.len() == 1
    }

    /// Rewrites every statement (recursively, into nested bodies) with `f`.
    pub fn map_stmts(self: Self, f: &dyn Fn(Expr) -> Expr) -> Self {
        Seq::new(
            self.exprs
                .into_iter()
                .map(|e| match e {
                    Expr::Branch {
                        cond,
                        then,
                        otherwise,
                    } => Expr::Branch {
                        cond,
                        then: then.map_stmts(f),
                        otherwise: otherwise.map_stmts(f),
                    },
                    Expr::For {
                        bound,
                        counter,
                        body,
                    } => Expr::For {
                        bound,
                        counter,
                        body: body.map_stmts(f),
                    },
                    Expr::Scope { body } => Expr::Scope {
                        body: body.map_stmts(f),
                    },
                    e => f(e),
                })
                .collect(),
        )
    }
}

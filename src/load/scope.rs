//! Environment of a body: names visible at each point.
//!
//! The environment of a statement contains the names defined *before* the statement:
//! globals (uniforms, functions, shader inputs and outputs), parameters,
//! locals bound earlier in the same block or in enclosing blocks, loop counters.
//! It is only used to lint bodies for names that cannot resolve; nothing is rejected.

use crate::lang::*;

/// Names provided by the target language.
pub const BUILTINS: &[&str] = &[
    "radians", "degrees", "sin", "cos", "tan", "asin", "acos", "atan", "pow", "exp", "log", "exp2",
    "log2", "sqrt", "inversesqrt", "abs", "sign", "floor", "ceil", "fract", "mod", "min", "max",
    "clamp", "mix", "step", "smoothstep", "length", "distance", "dot", "cross", "normalize",
    "faceforward", "reflect", "refract", "matrixCompMult", "lessThan", "lessThanEqual",
    "greaterThan", "greaterThanEqual", "equal", "notEqual", "any", "all", "not", "texture2D",
    "textureCube", "float", "int", "bool", "vec2", "vec3", "vec4", "mat2", "mat3", "mat4",
    "gl_Position", "gl_PointSize", "gl_FragCoord", "gl_FrontFacing", "gl_FragColor",
    "gl_FragData", "gl_PointCoord",
];

#[derive(Debug, Clone)]
pub struct Env<'a> {
    names: Vec<String>,
    outer: Option<&'a Env<'a>>,
}

impl Env<'static> {
    pub fn global<I: IntoIterator<Item = String>>(names: I) -> Self {
        Env {
            names: names.into_iter().collect(),
            outer: None,
        }
    }
}

impl<'a> Env<'a> {
    pub fn child(self: &Self) -> Env<'_> {
        Env {
            names: Vec::new(),
            outer: Some(self),
        }
    }

    pub fn bind(self: &mut Self, name: &str) {
        self.names.push(name.to_owned());
    }

    pub fn resolve(self: &Self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
            || self.outer.map_or(false, |outer| outer.resolve(name))
            || BUILTINS.contains(&name)
    }
}

/// Names used in `body` that resolve to nothing, each reported once, in order of first use.
pub fn unresolved(body: &Seq, env: &Env) -> Vec<String> {
    let mut missing = Vec::new();
    walk_seq(body, env.child(), &mut missing);
    missing
}

fn walk_seq(seq: &Seq, mut env: Env, missing: &mut Vec<String>) {
    for stmt in seq.stmts() {
        match stmt {
            Expr::Mut { name, value, .. } => {
                if let Some(value) = value {
                    walk_expr(value, &env, missing);
                }
                env.bind(name);
            }
            Expr::Const { name, value, .. } => {
                walk_expr(value, &env, missing);
                env.bind(name);
            }
            stmt => walk_expr(stmt, &env, missing),
        }
    }
}

fn walk_expr(expr: &Expr, env: &Env, missing: &mut Vec<String>) {
    let mut check = |name: &str| {
        if !env.resolve(name) && !missing.iter().any(|m| m == name) {
            missing.push(name.to_owned());
        }
    };

    match expr {
        Expr::Ref(name) => check(name),
        Expr::Update { name, value } | Expr::Out { name, value } => {
            check(name);
            walk_expr(value, env, missing);
        }
        Expr::App { name, args } => {
            check(name);
            for arg in args {
                walk_expr(arg, env, missing);
            }
        }
        Expr::BinOp { lhs, rhs, .. } => {
            walk_expr(lhs, env, missing);
            walk_expr(rhs, env, missing);
        }
        Expr::AccessN { base, .. } => walk_expr(base, env, missing),
        Expr::AccessI { base, index } => {
            walk_expr(base, env, missing);
            walk_expr(index, env, missing);
        }
        Expr::V2(items) => items.iter().for_each(|e| walk_expr(e, env, missing)),
        Expr::V3(items) => items.iter().for_each(|e| walk_expr(e, env, missing)),
        Expr::V4(items) => items.iter().for_each(|e| walk_expr(e, env, missing)),
        Expr::Mat4(items) | Expr::Array(items) => {
            items.iter().for_each(|e| walk_expr(e, env, missing))
        }
        Expr::Branch {
            cond,
            then,
            otherwise,
        } => {
            walk_expr(cond, env, missing);
            walk_seq(then, env.child(), missing);
            walk_seq(otherwise, env.child(), missing);
        }
        Expr::For {
            bound,
            counter,
            body,
        } => {
            walk_expr(bound, env, missing);
            let mut inner = env.child();
            if let Some(counter) = counter {
                inner.bind(counter);
            }
            walk_seq(body, inner, missing);
        }
        Expr::Scope { body } => walk_seq(body, env.child(), missing),
        // Bindings outside of a sequence only appear in malformed trees.
        Expr::Mut { .. } | Expr::Const { .. } => {}
        Expr::I(_)
        | Expr::B(_)
        | Expr::F(_)
        | Expr::D(_)
        | Expr::SComment(_)
        | Expr::BComment(_)
        | Expr::NOp => {}
    }
}

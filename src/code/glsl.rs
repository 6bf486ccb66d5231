//! GLSL emission for a single shader stage.

use std::fmt::{Display, Formatter};

use genco::lang::Lang;
use genco::Tokens;
use log::debug;

use crate::lang::kw::RESERVED_COUNTER;
use crate::lang::*;

/// Iterations after which every `for` loop stops, whatever its bound.
pub const LOOP_CEILING: u32 = 10000;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlslLang;

impl Lang for GlslLang {
    type Config = ();
    type Format = ();
    type Item = ();
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenError {
    /// A construct the target cannot express, e.g. matrix literals.
    Unsupported { what: String },
    /// A node in a position it cannot occupy, e.g. a binding used as a value.
    Malformed { expr: Expr },
    Fmt,
}

impl Display for GenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GenError::Unsupported { what } => write!(f, "{} cannot be generated", what),
            GenError::Malformed { expr } => {
                write!(f, "malformed expression reached the generator: {:?}", expr)
            }
            GenError::Fmt => f.write_str("cannot format generated code"),
        }
    }
}

impl std::error::Error for GenError {}

impl From<genco::fmt::Error> for GenError {
    fn from(_: genco::fmt::Error) -> Self {
        GenError::Fmt
    }
}

pub fn type_name(ty: &Type) -> String {
    match ty {
        Type::Int => "int".into(),
        Type::Bool => "bool".into(),
        Type::Float => "float".into(),
        Type::Vec2 => "vec2".into(),
        Type::Vec3 => "vec3".into(),
        Type::Vec4 => "vec4".into(),
        Type::Mat4 => "mat4".into(),
        Type::Array(item, size) => format!("{}[{}]", type_name(item), size),
    }
}

/// Declarator for a binding of type `ty`: arrays put their size after the name.
pub fn decl(ty: &Type, name: &str) -> String {
    match ty {
        Type::Array(item, size) => format!("{} {}[{}]", type_name(item), name, size),
        ty => format!("{} {}", type_name(ty), name),
    }
}

fn opaque(o: &Opaque) -> String {
    format!("{} {};", o.kind, decl(&o.ty, &o.name))
}

/// Renders a full stage: preamble, global declarations, user functions, `main`.
pub fn gen_stage(globals: &[Opaque], funcs: &[Func], shader: &Shader) -> Result<String, GenError> {
    let mut e = Emitter::default();

    e.line("precision highp float;");
    e.line("precision highp int;");
    e.blank();

    for g in globals {
        e.line(opaque(g));
    }
    if !globals.is_empty() {
        e.blank();
    }

    for func in funcs {
        if let Linkage::Body { label, body } = &func.linkage {
            debug!("emitting function `{}`", label);
            let params: Vec<String> = func.params.iter().map(|(n, t)| decl(t, n)).collect();
            e.open(format!(
                "{} {}({})",
                func.ret.as_ref().map_or("void".into(), type_name),
                func.name,
                params.join(", ")
            ));
            e.seq(body)?;
            e.close();
            e.blank();
        }
    }

    e.open("void main()".into());
    e.seq(&shader.body)?;
    e.close();

    Ok(e.tokens.to_file_string()?)
}

#[derive(Default)]
struct Emitter {
    tokens: Tokens<GlslLang>,
}

impl Emitter {
    fn line<S: Into<String>>(&mut self, text: S) {
        self.tokens.push();
        self.tokens.append(text.into());
    }

    fn blank(&mut self) {
        self.tokens.line();
    }

    fn open(&mut self, header: String) {
        self.line(format!("{} {{", header));
        self.tokens.indent();
    }

    fn close(&mut self) {
        self.tokens.unindent();
        self.line("}");
    }

    fn seq(&mut self, seq: &Seq) -> Result<(), GenError> {
        for stmt in seq.exprs() {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: &Expr) -> Result<(), GenError> {
        match stmt.form() {
            Form::Effect => self.line(format!("{};", effect(stmt)?)),
            Form::Value => self.line(format!("return {};", expr(stmt)?)),
            Form::Control => self.control(stmt)?,
            Form::Trivia => match stmt {
                Expr::SComment(text) => self.line(format!("//{}", text)),
                Expr::BComment(text) => self.line(format!("/*{}*/", text)),
                _ => {}
            },
        }
        Ok(())
    }

    fn control(&mut self, stmt: &Expr) -> Result<(), GenError> {
        match stmt {
            Expr::Branch {
                cond,
                then,
                otherwise,
            } => {
                self.open(format!("if ({})", expr(cond)?));
                self.seq(then)?;
                if !otherwise.is_empty() {
                    self.tokens.unindent();
                    self.line("} else {");
                    self.tokens.indent();
                    self.seq(otherwise)?;
                }
                self.close();
            }
            Expr::For {
                bound,
                counter,
                body,
            } => {
                let c = counter.as_deref().unwrap_or(RESERVED_COUNTER);
                self.open(format!(
                    "for (int {c} = 0; {c} < {}; {c}++)",
                    LOOP_CEILING,
                    c = c
                ));
                self.seq(body)?;
                self.line(format!("if ({} >= {}) break;", c, expr(bound)?));
                self.close();
            }
            Expr::Scope { body } => {
                self.line("{");
                self.tokens.indent();
                self.seq(body)?;
                self.close();
            }
            _ => return Err(malformed(stmt)),
        }
        Ok(())
    }
}

fn malformed(e: &Expr) -> GenError {
    GenError::Malformed { expr: e.clone() }
}

fn effect(e: &Expr) -> Result<String, GenError> {
    Ok(match e {
        Expr::Mut { ty, name, value } => match value {
            Some(value) => format!("{} = {}", decl(ty, name), expr(value)?),
            None => decl(ty, name),
        },
        Expr::Const { ty, name, value } => format!("{} = {}", decl(ty, name), expr(value)?),
        Expr::Update { name, value } | Expr::Out { name, value } => {
            format!("{} = {}", name, expr(value)?)
        }
        Expr::App { .. } => expr(e)?,
        _ => return Err(malformed(e)),
    })
}

fn list(items: &[Expr]) -> Result<String, GenError> {
    let items = items.iter().map(expr).collect::<Result<Vec<_>, _>>()?;
    Ok(items.join(", "))
}

/// Operands that are themselves operations are parenthesised.
fn operand(e: &Expr) -> Result<String, GenError> {
    match e {
        Expr::BinOp { .. } => Ok(format!("({})", expr(e)?)),
        e => expr(e),
    }
}

fn expr(e: &Expr) -> Result<String, GenError> {
    Ok(match e {
        Expr::I(i) => i.to_string(),
        Expr::B(b) => b.to_string(),
        Expr::F(f) => format!("{:?}", f),
        Expr::D(d) => format!("{:?}", d),
        Expr::V2(items) => format!("vec2({})", list(&items[..])?),
        Expr::V3(items) => format!("vec3({})", list(&items[..])?),
        Expr::V4(items) => format!("vec4({})", list(&items[..])?),
        Expr::Mat4(_) => {
            return Err(GenError::Unsupported {
                what: "matrix literal".into(),
            })
        }
        Expr::Ref(name) => name.clone(),
        Expr::App { name, args } => format!("{}({})", name, list(args)?),
        Expr::BinOp { op, lhs, rhs } => format!("{} {} {}", operand(lhs)?, op, operand(rhs)?),
        Expr::AccessN { base, field } => format!("{}.{}", operand(base)?, field),
        Expr::AccessI { base, index } => format!("{}[{}]", operand(base)?, expr(index)?),
        Expr::Array(items) => format!("{{{}}}", list(items)?),
        _ => return Err(malformed(e)),
    })
}

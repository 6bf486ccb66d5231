//! Parse types, expressions and expression sequences from a `syn::parse::ParseBuffer`.
//!
//! Binary operators are parsed by precedence climbing over `BOp::prec`.
//! Everything else is recursive descent with lookahead: an alternative is only
//! committed to once its first tokens have been seen, so a failed alternative consumes nothing.

use std::convert::TryInto;

use proc_macro2::Span;
use syn::ext::IdentExt;
use syn::parse::discouraged::Speculative;
use syn::parse::{Parse, ParseBuffer, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Error, Lit, LitBool, Result, Token};

use crate::lang::expr::*;
use crate::lang::kw::kw;
use crate::lang::op::BOp;
use crate::lang::ty::Type;

use super::lex::*;

impl Parse for Type {
    fn parse(input: &ParseBuffer) -> Result<Self> {
        let la = input.lookahead1();
        if la.peek(kw::Int) {
            input.parse::<kw::Int>()?;
            Ok(Type::Int)
        } else if la.peek(kw::Bool) {
            input.parse::<kw::Bool>()?;
            Ok(Type::Bool)
        } else if la.peek(kw::Float) {
            input.parse::<kw::Float>()?;
            Ok(Type::Float)
        } else if la.peek(kw::Vec2) {
            input.parse::<kw::Vec2>()?;
            Ok(Type::Vec2)
        } else if la.peek(kw::Vec3) {
            input.parse::<kw::Vec3>()?;
            Ok(Type::Vec3)
        } else if la.peek(kw::Vec4) {
            input.parse::<kw::Vec4>()?;
            Ok(Type::Vec4)
        } else if la.peek(kw::Mat4) {
            input.parse::<kw::Mat4>()?;
            Ok(Type::Mat4)
        } else if la.peek(syn::token::Bracket) {
            let content;
            syn::bracketed!(content in input);
            let item: Type = content.parse()?;
            content.parse::<Token![;]>()?;
            let size: syn::LitInt = content.parse()?;
            finish(&content)?;
            Ok(Type::Array(Box::new(item), size.base10_parse()?))
        } else {
            Err(la.error())
        }
    }
}

impl Parse for BOp {
    fn parse(input: &ParseBuffer) -> Result<Self> {
        // Longer operators first: `Token![<]` also matches the start of `<=`.
        Ok(if input.peek(Token![&&]) {
            input.parse::<Token![&&]>()?;
            BOp::And
        } else if input.peek(Token![||]) {
            input.parse::<Token![||]>()?;
            BOp::Or
        } else if input.peek(Token![==]) {
            input.parse::<Token![==]>()?;
            BOp::Eq
        } else if input.peek(Token![!=]) {
            input.parse::<Token![!=]>()?;
            BOp::Neq
        } else if input.peek(Token![<=]) {
            input.parse::<Token![<=]>()?;
            BOp::Lte
        } else if input.peek(Token![>=]) {
            input.parse::<Token![>=]>()?;
            BOp::Gte
        } else if input.peek(Token![<]) {
            input.parse::<Token![<]>()?;
            BOp::Lt
        } else if input.peek(Token![>]) {
            input.parse::<Token![>]>()?;
            BOp::Gt
        } else if input.peek(Token![&]) {
            input.parse::<Token![&]>()?;
            BOp::BitAnd
        } else if input.peek(Token![|]) {
            input.parse::<Token![|]>()?;
            BOp::BitOr
        } else if input.peek(Token![^]) {
            input.parse::<Token![^]>()?;
            BOp::BitXor
        } else if input.peek(Token![+]) {
            input.parse::<Token![+]>()?;
            BOp::Add
        } else if input.peek(Token![-]) && !input.peek(Token![->]) {
            input.parse::<Token![-]>()?;
            BOp::Sub
        } else if input.peek(Token![*]) {
            input.parse::<Token![*]>()?;
            BOp::Mul
        } else if input.peek(Token![/]) {
            input.parse::<Token![/]>()?;
            BOp::Div
        } else if input.peek(Token![%]) {
            input.parse::<Token![%]>()?;
            BOp::Mod
        } else {
            return Err(input.error("expected binary operator"));
        })
    }
}

fn peek_bop(input: ParseStream) -> Option<BOp> {
    input.fork().parse::<BOp>().ok()
}

pub fn peek_type(input: ParseStream) -> bool {
    input.peek(kw::Int)
        || input.peek(kw::Bool)
        || input.peek(kw::Float)
        || input.peek(kw::Vec2)
        || input.peek(kw::Vec3)
        || input.peek(kw::Vec4)
        || input.peek(kw::Mat4)
        || input.peek(syn::token::Bracket)
}

impl Parse for Seq {
    fn parse(input: &ParseBuffer) -> Result<Self> {
        let mut exprs = vec![];
        loop {
            while input.peek(Token![;]) {
                input.parse::<Token![;]>()?;
            }
            // The closing brace ends the sequence; the end marker is added by `Seq::new`.
            if input.is_empty() {
                break;
            }
            exprs.push(parse_stmt(input)?);
        }
        Ok(Seq::new(exprs))
    }
}

fn parse_braced_seq(input: ParseStream) -> Result<Seq> {
    let content;
    syn::braced!(content in input);
    content.parse()
}

/// Parses `= value`, where the `=` may be omitted.
fn parse_assigned(input: ParseStream) -> Result<Box<Expr>> {
    if input.peek(Token![=]) && !input.peek(Token![==]) {
        input.parse::<Token![=]>()?;
    }
    Ok(Box::new(input.parse()?))
}

fn parse_stmt(input: ParseStream) -> Result<Expr> {
    if peek_comment(input) {
        parse_comment(input)
    } else if input.peek(Token![let]) {
        input.parse::<Token![let]>()?;
        let ty: Type = input.parse()?;
        let name = parse_name(input)?;
        input.parse::<Token![=]>()?;
        Ok(Expr::Const {
            ty,
            name: name.to_string(),
            value: Box::new(input.parse()?),
        })
    } else if input.peek(Token![mut]) {
        input.parse::<Token![mut]>()?;
        let ty: Type = input.parse()?;
        let name = parse_name(input)?;
        input.parse::<Token![=]>()?;
        Ok(Expr::Mut {
            ty,
            name: name.to_string(),
            value: Some(Box::new(input.parse()?)),
        })
    } else if input.peek(kw::set) {
        input.parse::<kw::set>()?;
        let name = parse_name(input)?;
        Ok(Expr::Update {
            name: name.to_string(),
            value: parse_assigned(input)?,
        })
    } else if input.peek(kw::out) {
        input.parse::<kw::out>()?;
        let name = parse_name(input)?;
        Ok(Expr::Out {
            name: name.to_string(),
            value: parse_assigned(input)?,
        })
    } else if input.peek(Token![if]) {
        parse_branch(input)
    } else if input.peek(Token![for]) {
        input.parse::<Token![for]>()?;
        let counter = if peek_name(input) && input.peek2(Token![in]) {
            let counter = parse_name(input)?;
            input.parse::<Token![in]>()?;
            Some(counter.to_string())
        } else {
            None
        };
        let bound = Box::new(input.parse()?);
        input.parse::<Token![do]>()?;
        Ok(Expr::For {
            bound,
            counter,
            body: parse_braced_seq(input)?,
        })
    } else {
        input.parse()
    }
}

fn parse_branch(input: ParseStream) -> Result<Expr> {
    input.parse::<Token![if]>()?;
    let cond = Box::new(input.parse()?);
    let then = parse_braced_seq(input)?;
    let otherwise = if input.peek(Token![else]) {
        input.parse::<Token![else]>()?;
        if input.peek(Token![if]) {
            Seq::new(vec![parse_branch(input)?])
        } else {
            parse_braced_seq(input)?
        }
    } else {
        Seq::empty()
    };
    Ok(Expr::Branch {
        cond,
        then,
        otherwise,
    })
}

impl Parse for Expr {
    fn parse(input: &ParseBuffer) -> Result<Self> {
        parse_binary(input, 0)
    }
}

/// Parses operators binding at least as tight as `min_prec`. All operators are left-associative.
fn parse_binary(input: ParseStream, min_prec: u8) -> Result<Expr> {
    let mut lhs = parse_postfix(input)?;
    loop {
        // Comments before an operator belong to the expression, otherwise they end it.
        let ahead = input.fork();
        skip_comments(&ahead)?;
        let op = match peek_bop(&ahead) {
            Some(op) if op.prec() >= min_prec => op,
            _ => break,
        };
        skip_comments(input)?;
        input.parse::<BOp>()?;
        let rhs = parse_binary(input, op.prec() + 1)?;
        lhs = Expr::bin(op, lhs, rhs);
    }
    Ok(lhs)
}

/// Parses a primary expression followed by any number of `[index]` and `.field` accesses.
fn parse_postfix(input: ParseStream) -> Result<Expr> {
    let mut current = parse_primary(input)?;
    loop {
        if input.peek(syn::token::Bracket) {
            let index_input;
            syn::bracketed!(index_input in input);
            let index = index_input.parse()?;
            finish(&index_input)?;
            current = Expr::AccessI {
                base: Box::new(current),
                index: Box::new(index),
            };
        } else if input.peek(Token![.]) && input.peek2(syn::Ident::peek_any) {
            input.parse::<Token![.]>()?;
            let field = syn::Ident::parse_any(input)?;
            current = Expr::AccessN {
                base: Box::new(current),
                field: field.to_string(),
            };
        } else {
            return Ok(current);
        }
    }
}

fn parse_primary(input: ParseStream) -> Result<Expr> {
    skip_comments(input)?;

    if input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in input);
        let expr = if peek_bop(&content).is_some() {
            let fork = content.fork();
            match parse_prefix(&fork) {
                Ok(expr) => {
                    content.advance_to(&fork);
                    expr
                }
                // `(-1 + x)` starts like a prefix subtraction.
                Err(_) if content.peek(Token![-]) && content.peek2(Lit) => content.parse()?,
                Err(err) => return Err(err),
            }
        } else {
            content.parse()?
        };
        finish(&content)?;
        Ok(expr)
    } else if input.peek(syn::token::Bracket) {
        let content;
        syn::bracketed!(content in input);
        Ok(Expr::Array(parse_args(&content)?))
    } else if input.peek(LitBool) {
        let lit: LitBool = input.parse()?;
        Ok(Expr::B(lit.value))
    } else if input.peek(Lit) {
        parse_number(input, false)
    } else if input.peek(Token![-]) && input.peek2(Lit) {
        input.parse::<Token![-]>()?;
        parse_number(input, true)
    } else if let Some(ty) = peek_ctor(input) {
        parse_ctor(input, ty)
    } else if peek_name(input) {
        let name = parse_name(input)?;
        if input.peek(syn::token::Paren) {
            let args_input;
            syn::parenthesized!(args_input in input);
            Ok(Expr::App {
                name: name.to_string(),
                args: parse_args(&args_input)?,
            })
        } else {
            Ok(Expr::Ref(name.to_string()))
        }
    } else {
        Err(input.error("expected expression"))
    }
}

/// Prefix form: `(op lhs rhs)`, parenthesis already stripped.
fn parse_prefix(input: ParseStream) -> Result<Expr> {
    let op: BOp = input.parse()?;
    let lhs = parse_postfix(input)?;
    let rhs = parse_postfix(input)?;
    finish(input)?;
    Ok(Expr::bin(op, lhs, rhs))
}

fn parse_args(input: ParseStream) -> Result<Vec<Expr>> {
    Ok(Punctuated::<Expr, Token![,]>::parse_terminated(input)?
        .into_iter()
        .collect())
}

fn parse_number(input: ParseStream, negate: bool) -> Result<Expr> {
    let lit: Lit = input.parse()?;
    let (digits_span, suffix, is_float) = match &lit {
        Lit::Int(i) => (i.span(), i.suffix().to_owned(), false),
        Lit::Float(f) => (f.span(), f.suffix().to_owned(), true),
        _ => return Err(Error::new(lit.span(), "expected a numeric literal")),
    };
    let sign = if negate { -1.0 } else { 1.0 };

    match (suffix.as_str(), &lit) {
        ("", Lit::Int(i)) => {
            let value: i64 = i.base10_parse()?;
            Ok(Expr::I(if negate { -value } else { value }))
        }
        ("d", _) | ("f64", _) => {
            let value = sign * base10_f64(&lit)?;
            in_range(value, "double", &lit)?;
            Ok(Expr::D(value))
        }
        ("", _) | ("f", _) | ("f32", _) => {
            let value = sign as f32 * base10_f64(&lit)? as f32;
            in_range(value.into(), "float", &lit)?;
            Ok(Expr::F(value))
        }
        (suffix, _) => Err(Error::new(
            digits_span,
            format!(
                "unknown {} literal suffix `{}`",
                if is_float { "float" } else { "integer" },
                suffix
            ),
        )),
    }
}

fn in_range(value: f64, ty: &str, lit: &Lit) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::new(
            lit.span(),
            format!("literal is out of range for a {} value", ty),
        ))
    }
}

fn base10_f64(lit: &Lit) -> Result<f64> {
    match lit {
        Lit::Int(i) => i.base10_parse(),
        Lit::Float(f) => f.base10_parse(),
        _ => Err(Error::new(lit.span(), "expected a numeric literal")),
    }
}

fn peek_ctor(input: ParseStream) -> Option<Type> {
    if input.peek(kw::Vec2) {
        Some(Type::Vec2)
    } else if input.peek(kw::Vec3) {
        Some(Type::Vec3)
    } else if input.peek(kw::Vec4) {
        Some(Type::Vec4)
    } else if input.peek(kw::Mat4) {
        Some(Type::Mat4)
    } else {
        None
    }
}

/// Parses `Vec2(a, b)`, `Vec3(a, b, c)`, `Vec4(a, b, c, d)` or `Mat4(..)` (16 components).
fn parse_ctor(input: ParseStream, ty: Type) -> Result<Expr> {
    input.parse::<Type>()?;
    let args_input;
    let paren = syn::parenthesized!(args_input in input);
    let args = parse_args(&args_input)?;

    let expected = ty.vector_size().unwrap_or(16);
    if args.len() != expected {
        return Err(arity_error(paren.span, &ty, expected, args.len()));
    }

    Ok(match ty {
        Type::Vec2 => Expr::V2(exact(args)?),
        Type::Vec3 => Expr::V3(exact(args)?),
        Type::Vec4 => Expr::V4(exact(args)?),
        _ => Expr::Mat4(args),
    })
}

fn exact<const N: usize>(args: Vec<Expr>) -> Result<Box<[Expr; N]>> {
    args.into_boxed_slice()
        .try_into()
        .map_err(|_| Error::new(Span::call_site(), "wrong number of components"))
}

fn arity_error(span: Span, ty: &Type, expected: usize, actual: usize) -> Error {
    Error::new(
        span,
        format!(
            "`{}` takes exactly {} components, got {}",
            ty, expected, actual
        ),
    )
}

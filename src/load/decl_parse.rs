//! Parse top-level declarations, recording them into a `Ctx`.

use log::{debug, warn};
use proc_macro2::Ident;
use syn::parse::ParseStream;
use syn::punctuated::Punctuated;
use syn::{Error, Result, Token};

use crate::lang::kw::kw;
use crate::lang::*;

use super::compose::compose;
use super::ctx::Ctx;
use super::diagnostic::Diagnostic;
use super::expr_parse::peek_type;
use super::lex::*;
use super::scope::{unresolved, Env};

pub fn parse_module(input: ParseStream, dgns: &mut Vec<Diagnostic>) -> Result<Module> {
    let mut ctx = Ctx::default();
    loop {
        while peek_comment(input) || input.peek(Token![;]) {
            if input.peek(Token![;]) {
                input.parse::<Token![;]>()?;
            } else {
                parse_comment(input)?;
            }
        }
        if input.is_empty() {
            break;
        }
        parse_decl(input, &mut ctx, dgns)?;
    }
    Ok(ctx.into_module())
}

fn parse_decl(input: ParseStream, ctx: &mut Ctx, dgns: &mut Vec<Diagnostic>) -> Result<()> {
    if input.peek(kw::uniform) {
        input.parse::<kw::uniform>()?;
        let ty: Type = input.parse()?;
        let name = parse_decl_name(input)?;
        ctx.add_uniform(&name.to_string(), ty);
        Ok(())
    } else if input.peek(kw::vert) {
        input.parse::<kw::vert>()?;
        parse_shader(input, Stage::Vert, ctx, dgns)
    } else if input.peek(kw::frag) {
        input.parse::<kw::frag>()?;
        parse_shader(input, Stage::Frag, ctx, dgns)
    } else {
        let name = parse_decl_name(input)?;
        input.parse::<Token![:]>()?;
        if input.peek(kw::Prog) {
            parse_program(input, name, ctx, dgns)
        } else {
            parse_function(input, name, ctx, dgns)
        }
    }
}

/// Parses a signature list: `(T a, T b)`, `()` or `T a`.
fn parse_sig_list(input: ParseStream) -> Result<Vec<(Ident, Type)>> {
    if input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in input);
        let params = Punctuated::<(Ident, Type), Token![,]>::parse_terminated_with(
            &content,
            parse_param,
        )?;
        Ok(params.into_iter().collect())
    } else {
        Ok(vec![parse_param(input)?])
    }
}

fn parse_param(input: ParseStream) -> Result<(Ident, Type)> {
    let ty: Type = input.parse()?;
    let name = parse_name(input)?;
    Ok((name, ty))
}

fn parse_ret(input: ParseStream) -> Result<Option<Type>> {
    if input.peek(Token![->]) {
        input.parse::<Token![->]>()?;
        Ok(Some(input.parse()?))
    } else {
        Ok(None)
    }
}

fn parse_body(input: ParseStream) -> Result<Seq> {
    let content;
    syn::braced!(content in input);
    content.parse()
}

fn parse_function(
    input: ParseStream,
    name: Ident,
    ctx: &mut Ctx,
    dgns: &mut Vec<Diagnostic>,
) -> Result<()> {
    // A bare type (`half : Float = {..}`) is a result type, not a parameter.
    let bare = peek_type(input) && {
        let fork = input.fork();
        fork.parse::<Type>().is_ok() && fork.peek(Token![=])
    };

    let (params, ret) = if bare {
        (vec![], Some(input.parse()?))
    } else {
        let params = parse_sig_list(input)?;
        (params, parse_ret(input)?)
    };
    input.parse::<Token![=]>()?;
    let body = parse_body(input)?;

    let mut env = global_env(ctx, &[]);
    env.bind(&name.to_string());
    for (param, _) in &params {
        env.bind(&param.to_string());
    }
    lint(&name, &body, &env, dgns);

    ctx.add_function(Func {
        name: name.to_string(),
        params: params
            .into_iter()
            .map(|(name, ty)| (name.to_string(), ty))
            .collect(),
        ret,
        linkage: Linkage::Body {
            label: name.to_string(),
            body,
        },
    });
    Ok(())
}

fn varyings(list: Vec<(Ident, Type)>) -> Vec<Opaque> {
    list.into_iter()
        .map(|(name, ty)| Opaque::new(OpaqueType::Varying, ty, &name.to_string()))
        .collect()
}

fn parse_shader(
    input: ParseStream,
    stage: Stage,
    ctx: &mut Ctx,
    dgns: &mut Vec<Diagnostic>,
) -> Result<()> {
    let name = parse_decl_name(input)?;
    input.parse::<Token![:]>()?;
    let inputs = varyings(parse_sig_list(input)?);
    input.parse::<Token![->]>()?;
    let outputs = varyings(parse_sig_list(input)?);
    input.parse::<Token![=]>()?;

    if input.peek(syn::token::Brace) {
        let body = parse_body(input)?;

        let linked: Vec<Opaque> = inputs.iter().chain(&outputs).cloned().collect();
        lint(&name, &body, &global_env(ctx, &linked), dgns);

        ctx.add_shader(
            &name.to_string(),
            Shader {
                stage,
                inputs,
                outputs,
                body,
            },
        );
        return Ok(());
    }

    let downstream = parse_name(input)?;
    input.parse::<Token![.]>()?;
    let upstream = parse_name(input)?;

    let down = lookup_shader(ctx, &downstream)?;
    let up = lookup_shader(ctx, &upstream)?;

    match compose(stage, down, up) {
        Ok(shader) => {
            if shader.inputs != inputs || shader.outputs != outputs {
                warn!(
                    "signature of `{}` does not match `{} . {}`, using the composed signature",
                    name, downstream, upstream
                );
            }
            ctx.add_shader(&name.to_string(), shader);
        }
        Err(error) => {
            debug!("composition `{}` failed: {}", name, error);
            dgns.push(Diagnostic::CompositionMismatch {
                name,
                downstream,
                upstream,
                error,
            });
        }
    }
    Ok(())
}

fn parse_program(
    input: ParseStream,
    name: Ident,
    ctx: &mut Ctx,
    dgns: &mut Vec<Diagnostic>,
) -> Result<()> {
    input.parse::<kw::Prog>()?;
    input.parse::<Token![=]>()?;
    input.parse::<kw::mkProg>()?;
    let vertex_name = parse_name(input)?;
    let fragment_name = parse_name(input)?;

    let vertex = lookup_shader(ctx, &vertex_name)?.clone();
    let fragment = lookup_shader(ctx, &fragment_name)?.clone();

    for (shader, ident, expected) in &[
        (&vertex, &vertex_name, Stage::Vert),
        (&fragment, &fragment_name, Stage::Frag),
    ] {
        if shader.stage != *expected {
            dgns.push(Diagnostic::StageMismatch {
                name: name.clone(),
                shader: (*ident).clone(),
                expected: *expected,
                found: shader.stage,
            });
        }
    }

    let prog = Prog {
        uniforms: ctx.uniform_opaques(),
        attributes: vertex
            .inputs
            .iter()
            .map(|input| input.with_kind(OpaqueType::Attribute))
            .collect(),
        vertex,
        fragment,
    };
    ctx.add_program(&name.to_string(), prog);
    Ok(())
}

fn lookup_shader<'a>(ctx: &'a Ctx, name: &Ident) -> Result<&'a Shader> {
    ctx.lookup_shader(&name.to_string()).ok_or_else(|| {
        Error::new(
            name.span(),
            format!("no shader named `{}` declared before this point", name),
        )
    })
}

/// Names visible to a body: uniforms, earlier functions and the given shader varyings.
fn global_env(ctx: &Ctx, varyings: &[Opaque]) -> Env<'static> {
    let entries: Vec<Func> = ctx
        .uniforms()
        .iter()
        .chain(ctx.functions())
        .cloned()
        .chain(varyings.iter().map(Func::varying))
        .collect();
    Env::global(entries.into_iter().map(|f| f.name))
}

fn lint(decl: &Ident, body: &Seq, env: &Env, dgns: &mut Vec<Diagnostic>) {
    for name in unresolved(body, env) {
        dgns.push(Diagnostic::UnresolvedName {
            decl: decl.clone(),
            name,
        });
    }
}

use proc_macro2::Ident;

use crate::lang::sess::Sess;
use crate::lang::Stage;

use super::compose::CompositionError;

#[derive(Debug, Clone)]
pub enum Diagnostic {
    LexError {
        error: syn::parse::Error,
    },
    UnterminatedComment {
        offset: usize,
    },
    ParseError {
        error: syn::parse::Error,
    },
    CompositionMismatch {
        name: Ident,
        downstream: Ident,
        upstream: Ident,
        error: CompositionError,
    },
    StageMismatch {
        name: Ident,
        shader: Ident,
        expected: Stage,
        found: Stage,
    },
    UnresolvedName {
        decl: Ident,
        name: String,
    },
}

impl Diagnostic {
    /// Whether parsing stopped at this diagnostic.
    pub fn is_critical(self: &Self) -> bool {
        match self {
            Diagnostic::LexError { .. }
            | Diagnostic::UnterminatedComment { .. }
            | Diagnostic::ParseError { .. } => true,
            _ => false,
        }
    }

    pub fn is_error(self: &Self) -> bool {
        match self {
            Diagnostic::StageMismatch { .. } | Diagnostic::UnresolvedName { .. } => false,
            _ => true,
        }
    }

    pub fn diagnostic_message(self: &Self, sess: &Sess) -> String {
        match self {
            Diagnostic::LexError { error } => sess.error(
                &format!("cannot tokenize source: {}", error),
                vec![sess.error_ann("here", error.span())],
            ),
            Diagnostic::UnterminatedComment { offset } => sess.error(
                "unterminated block comment",
                vec![sess.offset_ann("comment starts here", *offset)],
            ),
            Diagnostic::ParseError { error } => sess.error(
                &error.to_string(),
                vec![sess.error_ann("here", error.span())],
            ),
            Diagnostic::CompositionMismatch {
                name,
                downstream,
                upstream,
                error,
            } => sess.error(
                &format!(
                    "cannot compose `{}` after `{}`: {}",
                    downstream, upstream, error
                ),
                vec![
                    sess.error_ann("shader not declared", name.span()),
                    sess.help_ann("downstream", downstream.span()),
                    sess.help_ann("upstream", upstream.span()),
                ],
            ),
            Diagnostic::StageMismatch {
                name,
                shader,
                expected,
                found,
            } => sess.warning(
                &format!(
                    "program `{}` uses {} shader `{}` as its {} shader",
                    name, found, shader, expected
                ),
                vec![sess.warning_ann("wrong stage", shader.span())],
            ),
            Diagnostic::UnresolvedName { decl, name } => sess.warning(
                &format!("no binding named `{}` is visible in `{}`", name, decl),
                vec![sess.warning_ann("referenced in this declaration", decl.span())],
            ),
        }
    }
}

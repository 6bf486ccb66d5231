//! Loading: source text to a `Module`.
//!
//! Comments are masked, the text is tokenized with `proc_macro2`,
//! then declarations are parsed in order, accumulating diagnostics.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::read_to_string;
use std::path::Path;

use log::info;
use syn::parse::{ParseStream, Parser};

use crate::lang::sess::Sess;
use crate::lang::Module;

pub mod compose;
pub mod ctx;
pub mod decl_parse;
pub mod diagnostic;
pub mod expr_parse;
pub mod lex;
pub mod scope;

pub use compose::{compose, CompositionError};
pub use diagnostic::Diagnostic;

use decl_parse::parse_module;
use lex::{mask_comments, UnterminatedComment};

/// Parses a whole source file.
/// Non-fatal diagnostics are appended to `dgns` even on success.
pub fn parse_source(source: &str, dgns: &mut Vec<Diagnostic>) -> Result<Module, ()> {
    let masked = match mask_comments(source) {
        Ok(masked) => masked,
        Err(UnterminatedComment { offset }) => {
            dgns.push(Diagnostic::UnterminatedComment { offset });
            return Err(());
        }
    };

    let tokens: proc_macro2::TokenStream = match masked.text.parse() {
        Ok(tokens) => tokens,
        Err(error) => {
            let error = syn::Error::new(error.span(), error.to_string());
            dgns.push(Diagnostic::LexError { error });
            return Err(());
        }
    };

    let parser = |input: ParseStream| parse_module(input, dgns);
    match parser.parse2(tokens) {
        Ok(module) => Ok(module),
        Err(error) => {
            dgns.push(Diagnostic::ParseError { error });
            Err(())
        }
    }
}

/// Fatal errors were found while loading a source file.
#[derive(Debug)]
pub struct LoadError {
    pub path: String,
    pub errors: usize,
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "could not load `{}` due to {} previous error{}",
            self.path,
            self.errors,
            if self.errors == 1 { "" } else { "s" }
        )
    }
}

impl Error for LoadError {}

/// Loads the source file at the given path.
/// Prints diagnostics on stderr.
pub fn load(path: &Path, color: bool) -> Result<Module, Box<dyn Error>> {
    let name = path.to_str().ok_or("file path is not valid UTF-8")?;
    let source = read_to_string(path)?;

    let mut code_map = codemap::CodeMap::new();
    let file = code_map.add_file(name.into(), source);
    let sess = Sess::new(&file, color);

    let mut dgns = Vec::new();
    let module = parse_source(sess.file.source(), &mut dgns);

    for d in &dgns {
        eprintln!("{}", d.diagnostic_message(&sess));
    }

    match module {
        Ok(module) => {
            info!(
                "loaded `{}`: {} functions, {} programs",
                name,
                module.functions.len(),
                module.programs.len()
            );
            Ok(module)
        }
        Err(()) => Err(Box::new(LoadError {
            path: name.to_owned(),
            errors: dgns.iter().filter(|d| d.is_error()).count(),
        })),
    }
}

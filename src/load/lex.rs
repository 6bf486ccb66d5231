//! Lexical layer.
//!
//! Tokenization is done by `proc_macro2`, which discards comments.
//! Comments are part of the language (they are copied into the generated code),
//! so before tokenization they are replaced by marker tokens
//! `#[line = "..."]` and `#[block = "..."]` holding the comment text.
//! Newlines inside block comments are re-emitted after the marker, so line numbers are unchanged.

use proc_macro2::{Ident, LineColumn, TokenTree};
use syn::parse::ParseStream;
use syn::{Error, LitStr, Result, Token};

use crate::lang::expr::Expr;
use crate::lang::kw::{is_reserved, kw};

/// Offset of a `/*` without a matching `*/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnterminatedComment {
    pub offset: usize,
}

/// Source text with comments masked, and the way back to the original offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Masked {
    pub text: String,
    segments: Vec<Segment>,
}

/// A run of masked text starting at `masked`, mapped onto the original text at `original`.
/// Offsets past `len` in the run stick to its last original offset (markers have `len == 0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    masked: usize,
    original: usize,
    len: usize,
}

impl Masked {
    /// Byte offset in the masked text of a 1-based line, 0-based (character) column.
    pub fn offset(self: &Self, lc: LineColumn) -> usize {
        let mut start = 0;
        for line in self.text.split_inclusive('\n').take(lc.line.saturating_sub(1)) {
            start += line.len();
        }
        let line = self.text[start..].split('\n').next().unwrap_or("");
        start
            + line
                .char_indices()
                .nth(lc.column)
                .map_or(line.len(), |(i, _)| i)
    }

    /// Maps a byte offset in the masked text back to the original source.
    pub fn original_offset(self: &Self, offset: usize) -> usize {
        match self.segments.iter().rev().find(|s| s.masked <= offset) {
            Some(s) => s.original + (offset - s.masked).min(s.len),
            None => offset,
        }
    }
}

pub fn mask_comments(source: &str) -> std::result::Result<Masked, UnterminatedComment> {
    let bytes = source.as_bytes();
    let mut masked = String::with_capacity(source.len());
    let mut segments = vec![];
    let mut copied = 0;
    let mut i = 0;

    let copy = |masked: &mut String, segments: &mut Vec<Segment>, from: usize, to: usize| {
        segments.push(Segment {
            masked: masked.len(),
            original: from,
            len: to - from,
        });
        masked.push_str(&source[from..to]);
    };

    while i + 1 < bytes.len() {
        if bytes[i] != b'/' {
            i += 1;
            continue;
        }
        match bytes[i + 1] {
            b'/' => {
                let end = source[i..].find('\n').map_or(source.len(), |n| i + n);
                copy(&mut masked, &mut segments, copied, i);
                segments.push(Segment {
                    masked: masked.len(),
                    original: i,
                    len: 0,
                });
                masked.push_str(&marker("line", source[i + 2..end].trim_end_matches('\r')));
                i = end;
                copied = end;
            }
            b'*' => {
                let end = match source[i + 2..].find("*/") {
                    Some(n) => i + 2 + n,
                    None => return Err(UnterminatedComment { offset: i }),
                };
                let text = &source[i + 2..end];
                copy(&mut masked, &mut segments, copied, i);
                segments.push(Segment {
                    masked: masked.len(),
                    original: i,
                    len: 0,
                });
                masked.push_str(&marker("block", text));
                masked.extend(text.matches('\n'));
                i = end + 2;
                copied = i;
            }
            _ => i += 1,
        }
    }
    copy(&mut masked, &mut segments, copied, source.len());

    Ok(Masked {
        text: masked,
        segments,
    })
}

fn marker(kind: &str, text: &str) -> String {
    format!("#[{} = {:?}]", kind, text.replace('\r', ""))
}

pub fn peek_comment(input: ParseStream) -> bool {
    input.peek(Token![#]) && input.peek2(syn::token::Bracket)
}

/// Parses a comment marker into `Expr::SComment` or `Expr::BComment`.
pub fn parse_comment(input: ParseStream) -> Result<Expr> {
    input.parse::<Token![#]>()?;
    let content;
    syn::bracketed!(content in input);

    let la = content.lookahead1();
    let block = if la.peek(kw::line) {
        content.parse::<kw::line>()?;
        false
    } else if la.peek(kw::block) {
        content.parse::<kw::block>()?;
        true
    } else {
        return Err(la.error());
    };
    content.parse::<Token![=]>()?;
    let text: LitStr = content.parse()?;

    Ok(if block {
        Expr::BComment(text.value())
    } else {
        Expr::SComment(text.value())
    })
}

/// Skips comments where they carry no meaning (between declarations, inside expressions).
pub fn skip_comments(input: ParseStream) -> Result<()> {
    while peek_comment(input) {
        parse_comment(input)?;
    }
    Ok(())
}

pub fn peek_name(input: ParseStream) -> bool {
    match input.cursor().ident() {
        Some((ident, _)) => !is_reserved(&ident.to_string()),
        None => false,
    }
}

pub fn parse_name(input: ParseStream) -> Result<Ident> {
    // Parsing TokenTree instead of Ident to accept Rust keywords as names
    let token_tree: TokenTree = input.parse()?;
    match token_tree {
        TokenTree::Ident(ident) => {
            if is_reserved(&ident.to_string()) {
                Err(Error::new(
                    ident.span(),
                    format!("`{}` is a reserved word and cannot be used as a name", ident),
                ))
            } else {
                Ok(ident)
            }
        }
        _ => Err(Error::new(token_tree.span(), "expected identifier")),
    }
}

/// Parses the name of a top-level declaration, which must start with a lowercase letter.
pub fn parse_decl_name(input: ParseStream) -> Result<Ident> {
    let ident = parse_name(input)?;
    match ident.to_string().chars().next() {
        Some(c) if c.is_ascii_lowercase() => Ok(ident),
        _ => Err(Error::new(
            ident.span(),
            format!("declaration name `{}` must start with a lowercase letter", ident),
        )),
    }
}

/// Fails if a delimited group has unparsed tokens left.
pub fn finish(input: ParseStream) -> Result<()> {
    if input.is_empty() {
        Ok(())
    } else {
        Err(input.error("unexpected token"))
    }
}

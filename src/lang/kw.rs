//! Definitions of custom keywords.

extern crate syn;

pub mod kw {
    syn::custom_keyword!(uniform);
    syn::custom_keyword!(vert);
    syn::custom_keyword!(frag);
    syn::custom_keyword!(mkProg);
    syn::custom_keyword!(Prog);
    syn::custom_keyword!(set);
    syn::custom_keyword!(out);
    syn::custom_keyword!(line);
    syn::custom_keyword!(block);

    syn::custom_keyword!(Int);
    syn::custom_keyword!(Bool);
    syn::custom_keyword!(Float);
    syn::custom_keyword!(Vec2);
    syn::custom_keyword!(Vec3);
    syn::custom_keyword!(Vec4);
    syn::custom_keyword!(Mat4);
}

/// Words that cannot be used as names.
pub const RESERVED: &[&str] = &[
    "uniform", "vert", "frag", "mkProg", "Prog", "Int", "Bool", "Float", "Vec2", "Vec3", "Vec4",
    "Mat4", "let", "mut", "set", "out", "if", "else", "for", "in", "do", "true", "false",
    RESERVED_COUNTER,
];

/// Loop counter used by `for` loops without a named counter.
pub const RESERVED_COUNTER: &str = "_i";

/// Prefix of the temporaries carrying signals between composed shaders (`_c0`, `_c1`, ...).
pub const LINK_PREFIX: &str = "_c";

pub fn link_name(index: usize) -> String {
    format!("{}{}", LINK_PREFIX, index)
}

pub fn is_reserved(name: &str) -> bool {
    let is_link = name
        .strip_prefix(LINK_PREFIX)
        .map_or(false, |n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
    RESERVED.contains(&name) || is_link
}

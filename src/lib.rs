//! Compiler from a small functional shader language to paired vertex/fragment GLSL programs.
//!
//! Pipeline: source text is loaded into a `lang::Module` (see `load`),
//! then each program of the module is rendered by `code`.

extern crate genco;
extern crate syn;

pub mod code;
pub mod lang;
pub mod load;

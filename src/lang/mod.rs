//! Data model of the shader language.
//!
//! Types and operators are shared by the parser and the code generator.
//! Expressions form bodies (`Seq`), which are wrapped into functions and shaders;
//! shaders are finally paired into programs.

pub mod decl;
pub mod expr;
pub mod kw;
pub mod op;
pub mod sess;
pub mod ty;

pub use decl::*;
pub use expr::*;
pub use op::BOp;
pub use ty::Type;

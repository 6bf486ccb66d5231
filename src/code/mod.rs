//! Target code generation.

pub mod glsl;
pub mod main;

pub use glsl::GenError;
pub use main::{code_gen, gen_prog, ProgCode};

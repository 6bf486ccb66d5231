//! Declarations accumulated while parsing a source file.
//!
//! Declarations are recorded in textual order, and a declaration only sees what was recorded before it.
//! Lookups scan newest-first, so a later declaration shadows an earlier one with the same name.

use log::debug;

use crate::lang::*;

#[derive(Debug, Default, Clone)]
pub struct Ctx {
    uniforms: Vec<Func>,
    functions: Vec<Func>,
    shaders: Vec<(String, Shader)>,
    programs: Vec<(String, Prog)>,
}

impl Ctx {
    pub fn add_uniform(self: &mut Self, name: &str, ty: Type) {
        debug!("uniform `{}`: {}", name, ty);
        self.uniforms.push(Func::uniform(name, ty));
    }

    pub fn add_function(self: &mut Self, func: Func) {
        debug!("function `{}` ({} params)", func.name, func.params.len());
        self.functions.push(func);
    }

    pub fn add_shader(self: &mut Self, name: &str, shader: Shader) {
        debug!(
            "{} shader `{}` ({} inputs, {} outputs)",
            shader.stage,
            name,
            shader.inputs.len(),
            shader.outputs.len()
        );
        self.shaders.push((name.to_owned(), shader));
    }

    pub fn add_program(self: &mut Self, name: &str, prog: Prog) {
        debug!(
            "program `{}` ({} uniforms, {} attributes)",
            name,
            prog.uniforms.len(),
            prog.attributes.len()
        );
        self.programs.push((name.to_owned(), prog));
    }

    pub fn lookup_shader(self: &Self, name: &str) -> Option<&Shader> {
        self.shaders
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, shader)| shader)
    }

    /// Uniform entries, in declaration order.
    pub fn uniforms(self: &Self) -> &[Func] {
        &self.uniforms
    }

    /// User functions, in declaration order.
    pub fn functions(self: &Self) -> &[Func] {
        &self.functions
    }

    pub fn uniform_opaques(self: &Self) -> Vec<Opaque> {
        self.uniforms.iter().filter_map(Func::as_opaque).collect()
    }

    pub fn into_module(self: Self) -> Module {
        Module {
            functions: self.functions,
            programs: self.programs,
        }
    }
}

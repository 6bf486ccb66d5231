use log::info;

use crate::lang::*;

use super::glsl::{gen_stage, GenError};

/// Generated text of a program, one blob per stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgCode {
    pub vertex: String,
    pub fragment: String,
}

pub fn gen_prog(module: &Module, prog: &Prog) -> Result<ProgCode, GenError> {
    let vertex_globals: Vec<Opaque> = prog
        .uniforms
        .iter()
        .chain(&prog.attributes)
        .chain(&prog.vertex.outputs)
        .cloned()
        .collect();
    let fragment_globals: Vec<Opaque> = prog
        .uniforms
        .iter()
        .chain(&prog.fragment.inputs)
        .chain(&prog.fragment.outputs)
        .cloned()
        .collect();

    Ok(ProgCode {
        vertex: gen_stage(&vertex_globals, &module.functions, &prog.vertex)?,
        fragment: gen_stage(&fragment_globals, &module.functions, &prog.fragment)?,
    })
}

/// Generates the programs of the module in declaration order, or only the one named `only`.
/// Stops at the first program that fails.
pub fn code_gen(module: &Module, only: Option<&str>) -> Result<Vec<(String, ProgCode)>, GenError> {
    module
        .programs
        .iter()
        .filter(|(name, _)| only.map_or(true, |p| name.as_str() == p))
        .map(|(name, prog)| {
            info!("generating program `{}`", name);
            Ok((name.clone(), gen_prog(module, prog)?))
        })
        .collect()
}

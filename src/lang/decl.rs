//! Top-level declarations: global bindings, functions, shaders and programs.

use std::fmt::{Display, Error, Formatter};

use super::expr::Seq;
use super::ty::Type;

/// Pipeline linkage of a global binding.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum OpaqueType {
    Uniform,
    Attribute,
    Varying,
}

impl Display for OpaqueType {
    fn fmt(self: &Self, f: &mut Formatter) -> Result<(), Error> {
        match self {
            OpaqueType::Uniform => f.write_str("uniform"),
            OpaqueType::Attribute => f.write_str("attribute"),
            OpaqueType::Varying => f.write_str("varying"),
        }
    }
}

/// A global binding with a linkage qualifier, e.g. `uniform float time;`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Opaque {
    pub kind: OpaqueType,
    pub ty: Type,
    pub name: String,
}

impl Opaque {
    pub fn new(kind: OpaqueType, ty: Type, name: &str) -> Self {
        Opaque {
            kind,
            ty,
            name: name.to_owned(),
        }
    }

    pub fn with_kind(self: &Self, kind: OpaqueType) -> Self {
        Opaque {
            kind,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Linkage {
    /// Declared with `uniform`, no body.
    Uniform,
    /// A shader input or output seen from a shader body, no body.
    Varying,
    /// A user function.
    Body { label: String, body: Seq },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Func {
    pub name: String,
    pub params: Vec<(String, Type)>,
    /// `None` renders as `void`.
    pub ret: Option<Type>,
    pub linkage: Linkage,
}

impl Func {
    pub fn uniform(name: &str, ty: Type) -> Self {
        Func {
            name: name.to_owned(),
            params: Vec::new(),
            ret: Some(ty),
            linkage: Linkage::Uniform,
        }
    }

    pub fn varying(opaque: &Opaque) -> Self {
        Func {
            name: opaque.name.clone(),
            params: Vec::new(),
            ret: Some(opaque.ty.clone()),
            linkage: Linkage::Varying,
        }
    }

    /// The binding this entry stands for, if it has no body.
    pub fn as_opaque(self: &Self) -> Option<Opaque> {
        let kind = match self.linkage {
            Linkage::Uniform => OpaqueType::Uniform,
            Linkage::Varying => OpaqueType::Varying,
            Linkage::Body { .. } => return None,
        };
        Some(Opaque::new(kind, self.ret.clone()?, &self.name))
    }

    pub fn body(self: &Self) -> Option<&Seq> {
        match &self.linkage {
            Linkage::Body { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Stage {
    Vert,
    Frag,
}

impl Display for Stage {
    fn fmt(self: &Self, f: &mut Formatter) -> Result<(), Error> {
        match self {
            Stage::Vert => f.write_str("vertex"),
            Stage::Frag => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shader {
    pub stage: Stage,
    pub inputs: Vec<Opaque>,
    pub outputs: Vec<Opaque>,
    pub body: Seq,
}

/// A vertex shader and a fragment shader, linked together.
#[derive(Debug, Clone, PartialEq)]
pub struct Prog {
    pub uniforms: Vec<Opaque>,
    /// Inputs of the vertex shader, qualified as attributes.
    pub attributes: Vec<Opaque>,
    pub vertex: Shader,
    pub fragment: Shader,
}

/// Result of parsing a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// User functions, in declaration order.
    pub functions: Vec<Func>,
    /// Named programs, in declaration order.
    pub programs: Vec<(String, Prog)>,
}

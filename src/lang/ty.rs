//! Value types.

use std::fmt::{Display, Error, Formatter};

/// Type of a binding, parameter, result or pipeline variable.
///
/// Mirrors the scalar, vector, matrix and array types of the target language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Bool,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
    /// Array of a fixed number of items, e.g. `[Float; 3]`.
    Array(Box<Type>, usize),
}

impl Type {
    /// Number of components of a vector type, if this is one.
    pub fn vector_size(self: &Self) -> Option<usize> {
        match self {
            Type::Vec2 => Some(2),
            Type::Vec3 => Some(3),
            Type::Vec4 => Some(4),
            _ => None,
        }
    }
}

impl Display for Type {
    fn fmt(self: &Self, f: &mut Formatter) -> Result<(), Error> {
        match self {
            Type::Int => f.write_str("Int"),
            Type::Bool => f.write_str("Bool"),
            Type::Float => f.write_str("Float"),
            Type::Vec2 => f.write_str("Vec2"),
            Type::Vec3 => f.write_str("Vec3"),
            Type::Vec4 => f.write_str("Vec4"),
            Type::Mat4 => f.write_str("Mat4"),
            Type::Array(item, size) => write!(f, "[{}; {}]", item, size),
        }
    }
}

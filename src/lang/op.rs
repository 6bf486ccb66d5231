//! Binary operators

use std::fmt::{Display, Error, Formatter};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Eq,
    Neq,
    Gte,
    Gt,
    Lte,
    Lt,
    BitAnd,
    BitOr,
    BitXor,
}

impl BOp {
    /// Binding strength; higher binds tighter.
    ///
    /// Relational operators are not grouped on one level:
    /// `<` binds tighter than `<=`, which binds tighter than `==`, and so on down to `>`.
    pub fn prec(self: &Self) -> u8 {
        match self {
            BOp::Mul | BOp::Div | BOp::Mod => 13,
            BOp::Add | BOp::Sub => 12,
            BOp::Lt => 11,
            BOp::Lte => 10,
            BOp::Eq => 9,
            BOp::Neq => 8,
            BOp::Gte => 7,
            BOp::Gt => 6,
            BOp::BitAnd => 5,
            BOp::BitXor => 4,
            BOp::BitOr => 3,
            BOp::And => 2,
            BOp::Or => 1,
        }
    }

    pub fn symbol(self: &Self) -> &'static str {
        match self {
            BOp::Add => "+",
            BOp::Sub => "-",
            BOp::Mul => "*",
            BOp::Div => "/",
            BOp::Mod => "%",
            BOp::And => "&&",
            BOp::Or => "||",
            BOp::Eq => "==",
            BOp::Neq => "!=",
            BOp::Gte => ">=",
            BOp::Gt => ">",
            BOp::Lte => "<=",
            BOp::Lt => "<",
            BOp::BitAnd => "&",
            BOp::BitOr => "|",
            BOp::BitXor => "^",
        }
    }
}

impl Display for BOp {
    fn fmt(self: &Self, f: &mut Formatter) -> Result<(), Error> {
        f.write_str(self.symbol())
    }
}

//! Comparison operators for WHERE-clause comparators.
//!
//! The [`Operator`] enum is closed: every operator the parser can produce is
//! listed here, and [`Operator::supports`] states which value kinds each one
//! can compare.

use std::cmp::Ordering;
use std::fmt;

use crate::value::Kind;

/// Comparison operator of a comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    GtEq,
    /// `<=`
    LtEq,
    /// ` in `
    In,
    /// ` not in `
    NotIn,
}

impl Operator {
    /// Operators in the order the parser searches for them.
    ///
    /// Two-character tokens come before their one-character prefixes and
    /// `not in` comes before `in`.
    pub const SEARCH_ORDER: [Operator; 8] = [
        Operator::GtEq,
        Operator::LtEq,
        Operator::NotEq,
        Operator::Eq,
        Operator::Gt,
        Operator::Lt,
        Operator::NotIn,
        Operator::In,
    ];

    /// The token as it appears in query text, including surrounding spaces
    /// for the word operators.
    pub fn token(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::GtEq => ">=",
            Operator::LtEq => "<=",
            Operator::In => " in ",
            Operator::NotIn => " not in ",
        }
    }

    /// Short name without padding.
    pub fn as_str(self) -> &'static str {
        self.token().trim()
    }

    /// Returns `true` for `in` and `not in`.
    pub fn is_membership(self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    /// Returns `true` if a comparison exists for this operator and kind.
    pub fn supports(self, kind: Kind) -> bool {
        match kind {
            Kind::String | Kind::Int | Kind::Uint | Kind::Float => true,
            Kind::Bool => matches!(
                self,
                Operator::Eq | Operator::NotEq | Operator::In | Operator::NotIn
            ),
            Kind::Pointer => matches!(self, Operator::Eq | Operator::NotEq),
            Kind::Struct => false,
        }
    }

    /// Evaluates an ordering operator given the ordering of left to right.
    ///
    /// Membership operators always return `false`.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::NotEq => ordering != Ordering::Equal,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::GtEq => ordering != Ordering::Less,
            Operator::Lt => ordering == Ordering::Less,
            Operator::LtEq => ordering != Ordering::Greater,
            Operator::In | Operator::NotIn => false,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Boolean expression tree of a WHERE clause.
//!
//! - [`Expression`] holds either a flat [`Condition`] or a parenthesized
//!   child expression, optionally followed by `and`/`or` and another
//!   expression.
//! - [`Condition`] is a run of comparators joined by `and`/`or` with no
//!   brackets in between.
//! - [`Comparator`] is a single `left op right` test.
//!
//! Trees are built by [`crate::parser::parse`] and are immutable once bound
//! to a root type.

use std::fmt;

use crate::compare::{list_items, strip_quotes};
use crate::error::{GsqlError, ParseError, ResolutionError};
use crate::op::Operator;
use crate::path::PropertyPath;
use crate::traits::StructSchema;

/// Boolean connective between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conjunction {
    And,
    Or,
}

impl Conjunction {
    pub fn as_str(self) -> &'static str {
        match self {
            Conjunction::And => "and",
            Conjunction::Or => "or",
        }
    }

    /// `true` for AND, `false` for OR.
    pub fn identity(op: Option<Conjunction>) -> bool {
        op != Some(Conjunction::Or)
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparator {
    /// Left operand, lower-cased outside keys and quotes.
    pub left: String,
    /// Left operand as written.
    pub raw_left: String,
    pub op: Operator,
    /// Right operand, lower-cased outside keys and quotes.
    pub right: String,
    /// Right operand as written.
    pub raw_right: String,
    /// Set when the left operand names a field of the root type.
    pub left_path: Option<PropertyPath>,
    /// Set when the right operand names a field of the root type.
    pub right_path: Option<PropertyPath>,
}

impl Comparator {
    /// Resolves each operand that names a field of `root` into a path.
    ///
    /// Quoted operands are always literals. Fails when neither side is a
    /// field.
    pub fn bind(&mut self, root: &'static StructSchema) -> Result<(), GsqlError> {
        self.left_path = bind_operand(&self.left, root);
        self.right_path = bind_operand(&self.right, root);

        if self.left_path.is_none() && self.right_path.is_none() {
            return Err(ResolutionError::NoField(self.to_string()).into());
        }
        if self.op.is_membership() && self.right_path.is_none() && list_items(&self.right).is_none()
        {
            return Err(ParseError::MalformedList {
                op: self.op,
                text: self.right.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// The literal operand, unquoted and in its original case.
    ///
    /// Empty when both operands are fields.
    pub fn key(&self) -> &str {
        if self.left_path.is_none() {
            strip_quotes(&self.raw_left)
        } else if self.right_path.is_none() {
            strip_quotes(&self.raw_right)
        } else {
            ""
        }
    }
}

fn bind_operand(text: &str, root: &'static StructSchema) -> Option<PropertyPath> {
    if text.starts_with('\'') {
        return None;
    }
    PropertyPath::bind(text, root).ok()
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.left_path {
            Some(path) => write!(f, "{}", path)?,
            None => f.write_str(&self.left)?,
        }
        f.write_str(self.op.token())?;
        match &self.right_path {
            Some(path) => write!(f, "{}", path),
            None => f.write_str(&self.right),
        }
    }
}

/// Comparators joined left to right without brackets.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub comparator: Comparator,
    pub op: Option<Conjunction>,
    pub next: Option<Box<Condition>>,
}

impl Condition {
    /// Iterates the chain as `(comparator, op joining it to the next)`.
    pub fn iter(&self) -> impl Iterator<Item = (&Comparator, Option<Conjunction>)> {
        std::iter::successors(Some(self), |c| c.next.as_deref()).map(|c| (&c.comparator, c.op))
    }

    pub fn bind(&mut self, root: &'static StructSchema) -> Result<(), GsqlError> {
        self.comparator.bind(root)?;
        match &mut self.next {
            Some(next) => next.bind(root),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (comparator, op) in self.iter() {
            write!(f, "{}", comparator)?;
            if let Some(op) = op {
                write!(f, " {} ", op)?;
            }
        }
        f.write_str(")")
    }
}

/// A node of the expression tree.
///
/// Exactly one of `condition` and `child` is set, except for the node of an
/// empty bracket group which has neither.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expression {
    pub condition: Option<Condition>,
    pub child: Option<Box<Expression>>,
    pub op: Option<Conjunction>,
    pub next: Option<Box<Expression>>,
}

impl Expression {
    /// Binds every comparator in the tree, see [`Comparator::bind`].
    pub fn bind(&mut self, root: &'static StructSchema) -> Result<(), GsqlError> {
        if let Some(condition) = &mut self.condition {
            condition.bind(root)?;
        }
        if let Some(child) = &mut self.child {
            child.bind(root)?;
        }
        if let Some(next) = &mut self.next {
            next.bind(root)?;
        }
        Ok(())
    }

    /// The first comparator of the tree, in text order.
    pub fn first_comparator(&self) -> Option<&Comparator> {
        match (&self.condition, &self.child) {
            (Some(condition), _) => Some(&condition.comparator),
            (None, Some(child)) => child.first_comparator(),
            (None, None) => self.next.as_deref().and_then(Expression::first_comparator),
        }
    }

    /// Renders the tree one node per line, indented by depth.
    pub fn visualize(&self) -> String {
        let mut out = String::new();
        self.visualize_into(&mut out, 0);
        out
    }

    fn visualize_into(&self, out: &mut String, level: usize) {
        push_line(out, level, "Expression", self.op);
        if let Some(condition) = &self.condition {
            for (comparator, op) in condition.iter() {
                push_line(out, level + 1, &format!("Comparator {}", comparator), op);
            }
        }
        if let Some(child) = &self.child {
            child.visualize_into(out, level + 1);
        }
        if let Some(next) = &self.next {
            next.visualize_into(out, level);
        }
    }
}

fn push_line(out: &mut String, level: usize, label: &str, op: Option<Conjunction>) {
    out.push('|');
    out.push_str(&"--".repeat(level + 1));
    out.push_str(label);
    if let Some(op) = op {
        out.push(' ');
        out.push_str(op.as_str());
    }
    out.push('\n');
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.condition, &self.child) {
            (Some(condition), _) => write!(f, "{}", condition)?,
            (None, Some(child)) => write!(f, "({})", child)?,
            (None, None) => {}
        }
        if let (Some(op), Some(next)) = (self.op, &self.next) {
            write!(f, " {} {}", op, next)?;
        }
        Ok(())
    }
}

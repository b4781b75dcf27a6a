//! Matching expression trees against candidates.
//!
//! A condition chain folds left to right: each comparator result is
//! combined with the running result by the conjunction before it. An
//! expression node combines its condition (or child) with its `next` using
//! its own conjunction, where a missing part counts as the conjunction's
//! identity: `true` for AND, `false` for OR.
//!
//! Bracketed groups therefore associate to the right: `(a) and (b) or (c)`
//! is `a and (b or c)`, while the flat chain `a and b or c` is
//! `(a and b) or c`.
//!
//! Every comparator in the tree is evaluated; an unresolved field anywhere
//! fails the whole candidate, bracketed or not.

use crate::ast::{Comparator, Condition, Conjunction, Expression};
use crate::compare::{compare_operands, LiteralSide};
use crate::error::EvalError;
use crate::path::PropertyPath;
use crate::resolve::resolve_values;
use crate::traits::Reflect;
use crate::value::Value;

impl Comparator {
    /// Evaluates this comparator against `root`.
    ///
    /// Field operands that resolve to nothing on `root` are an error.
    pub fn matches(&self, root: &dyn Reflect, case_sensitive: bool) -> Result<bool, EvalError> {
        let left = operand(
            root,
            self.left_path.as_ref(),
            &self.raw_left,
            &self.left,
            case_sensitive,
        )?;
        let right = operand(
            root,
            self.right_path.as_ref(),
            &self.raw_right,
            &self.right,
            case_sensitive,
        )?;
        let literal = match (&self.left_path, &self.right_path) {
            (_, None) => LiteralSide::Right,
            (None, Some(_)) => LiteralSide::Left,
            (Some(_), Some(_)) => LiteralSide::Neither,
        };
        compare_operands(self.op, &left, &right, case_sensitive, literal)
    }
}

fn operand<'a>(
    root: &'a dyn Reflect,
    path: Option<&PropertyPath>,
    raw: &'a str,
    lowered: &'a str,
    case_sensitive: bool,
) -> Result<Vec<Value<'a>>, EvalError> {
    match path {
        Some(path) => {
            let values = resolve_values(root, path);
            if values.is_empty() {
                Err(EvalError::Unresolved(path.id()))
            } else {
                Ok(values)
            }
        }
        None if case_sensitive => Ok(vec![Value::String(raw)]),
        None => Ok(vec![Value::String(lowered)]),
    }
}

impl Condition {
    pub fn matches(&self, root: &dyn Reflect, case_sensitive: bool) -> Result<bool, EvalError> {
        let mut result = Conjunction::identity(self.op);
        let mut joined_by = self.op;
        for (comparator, op) in self.iter() {
            let value = comparator.matches(root, case_sensitive)?;
            result = match joined_by {
                Some(Conjunction::Or) => result || value,
                _ => result && value,
            };
            joined_by = op;
        }
        Ok(result)
    }
}

impl Expression {
    /// Evaluates the tree against `root`.
    pub fn matches(&self, root: &dyn Reflect, case_sensitive: bool) -> Result<bool, EvalError> {
        let identity = Conjunction::identity(self.op);
        let head = match (&self.condition, &self.child) {
            (Some(condition), _) => condition.matches(root, case_sensitive)?,
            (None, Some(child)) => child.matches(root, case_sensitive)?,
            (None, None) => identity,
        };
        let tail = match &self.next {
            Some(next) => next.matches(root, case_sensitive)?,
            None => identity,
        };
        Ok(match self.op {
            Some(Conjunction::Or) => head || tail,
            _ => head && tail,
        })
    }
}

//! Recursive descent parser for WHERE-clause expressions.
//!
//! There is no tokenizer. Each production works on a byte span of the
//! input and locates structure by searching for brackets, conjunctions
//! and operator tokens:
//!
//! ```text
//! expression := group | prefixed | condition
//! group      := "(" expression ")" [conjunction expression]
//! prefixed   := condition conjunction group
//! condition  := comparator [conjunction condition]
//! comparator := operand operator operand
//! ```
//!
//! Single-quoted literals and bracketed keys (`[...]`) are opaque: nothing
//! inside them is read as structure. Keywords are matched without regard
//! to case; operands keep their original text alongside a lower-cased copy.

use crate::ast::{Comparator, Condition, Conjunction, Expression};
use crate::error::ParseError;
use crate::op::Operator;
use crate::path::lower_outside_keys;

/// Parses a WHERE-clause expression.
pub fn parse(text: &str) -> Result<Expression, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let parser = Parser::new(text);
    parser.parse_expression(Span::new(0, text.len()))
}

#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
}

impl Span {
    fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }
}

struct Parser<'a> {
    raw: &'a str,
    /// ASCII lower-cased copy with identical byte offsets.
    lower: String,
    /// Bytes inside quotes or `[...]`.
    opaque: Vec<bool>,
}

impl<'a> Parser<'a> {
    fn new(raw: &'a str) -> Self {
        let mut opaque = vec![false; raw.len()];
        let mut in_quote = false;
        let mut in_key = false;
        for (i, b) in raw.bytes().enumerate() {
            let starts = match b {
                b'\'' if !in_key => {
                    in_quote = !in_quote;
                    true
                }
                b'[' if !in_quote => {
                    in_key = true;
                    true
                }
                b']' if !in_quote && in_key => {
                    in_key = false;
                    true
                }
                _ => false,
            };
            opaque[i] = starts || in_quote || in_key;
        }
        Parser {
            raw,
            lower: raw.to_ascii_lowercase(),
            opaque,
        }
    }

    /// Trims whitespace from both ends of a span.
    fn trim(&self, span: Span) -> Span {
        let text = &self.raw[span.start..span.end];
        let start = span.start + (text.len() - text.trim_start().len());
        let end = span.end - (text.len() - text.trim_end().len());
        Span::new(start, end.max(start))
    }

    fn text(&self, span: Span) -> &'a str {
        &self.raw[span.start..span.end]
    }

    /// Position of the first structural occurrence of `token` in `span`.
    fn find(&self, span: Span, token: &str) -> Option<usize> {
        let haystack = &self.lower[span.start..span.end];
        haystack
            .match_indices(token)
            .map(|(i, _)| span.start + i)
            .find(|&i| !self.opaque[i..i + token.len()].iter().any(|o| *o))
    }

    fn parse_expression(&self, span: Span) -> Result<Expression, ParseError> {
        let span = self.trim(span);
        match self.find(span, "(") {
            None => Ok(Expression {
                condition: Some(self.parse_condition(span)?),
                ..Expression::default()
            }),
            Some(open) if open == span.start => self.parse_group(span),
            Some(open) => self.parse_prefixed(span, open),
        }
    }

    /// `( expression ) [conjunction expression]`
    fn parse_group(&self, span: Span) -> Result<Expression, ParseError> {
        let close = self.matching_close(span)?;
        let inner = self.trim(Span::new(span.start + 1, close));
        let child = if inner.start == inner.end {
            Expression::default()
        } else {
            self.parse_expression(inner)?
        };

        let mut expression = Expression {
            child: Some(Box::new(child)),
            ..Expression::default()
        };

        let rest = self.trim(Span::new(close + 1, span.end));
        if rest.start < rest.end {
            let (op, after) = self
                .leading_conjunction(rest)
                .ok_or_else(|| ParseError::MissingConjunction(self.text(rest).to_string()))?;
            expression.op = Some(op);
            expression.next = Some(Box::new(self.parse_expression(after)?));
        }
        Ok(expression)
    }

    /// `condition conjunction ( ... )`
    fn parse_prefixed(&self, span: Span, open: usize) -> Result<Expression, ParseError> {
        let prefix = self.trim(Span::new(span.start, open));
        let (condition, op) = self
            .trailing_conjunction(prefix)
            .ok_or_else(|| ParseError::MissingConjunction(self.text(span).to_string()))?;
        Ok(Expression {
            condition: Some(self.parse_condition(condition)?),
            op: Some(op),
            next: Some(Box::new(self.parse_group(Span::new(open, span.end))?)),
            ..Expression::default()
        })
    }

    /// `comparator [conjunction condition]`, split at the earliest conjunction.
    fn parse_condition(&self, span: Span) -> Result<Condition, ParseError> {
        let span = self.trim(span);
        let and = self.find(span, " and ").map(|i| (i, Conjunction::And, 5));
        let or = self.find(span, " or ").map(|i| (i, Conjunction::Or, 4));
        let split = match (and, or) {
            (Some(a), Some(o)) => Some(if a.0 < o.0 { a } else { o }),
            (a, o) => a.or(o),
        };

        match split {
            None => Ok(Condition {
                comparator: self.parse_comparator(span)?,
                op: None,
                next: None,
            }),
            Some((at, op, len)) => Ok(Condition {
                comparator: self.parse_comparator(Span::new(span.start, at))?,
                op: Some(op),
                next: Some(Box::new(
                    self.parse_condition(Span::new(at + len, span.end))?,
                )),
            }),
        }
    }

    fn parse_comparator(&self, span: Span) -> Result<Comparator, ParseError> {
        let span = self.trim(span);
        let whole = self.text(span);
        let (at, op) = Operator::SEARCH_ORDER
            .iter()
            .find_map(|op| self.find(span, op.token()).map(|at| (at, *op)))
            .ok_or_else(|| ParseError::NoOperator(whole.to_string()))?;

        let left = self.trim(Span::new(span.start, at));
        let right = self.trim(Span::new(at + op.token().len(), span.end));
        for side in [left, right] {
            if side.start == side.end {
                return Err(ParseError::EmptyOperand(whole.to_string()));
            }
            if self.find(side, "(").is_some() || self.find(side, ")").is_some() {
                return Err(ParseError::IllegalBracket(self.text(side).to_string()));
            }
        }

        let raw_left = self.text(left);
        let raw_right = self.text(right);
        Ok(Comparator {
            left: lower_outside_keys(raw_left),
            raw_left: raw_left.to_string(),
            op,
            right: lower_outside_keys(raw_right),
            raw_right: raw_right.to_string(),
            left_path: None,
            right_path: None,
        })
    }

    /// End of the bracket group opening at `span.start`.
    fn matching_close(&self, span: Span) -> Result<usize, ParseError> {
        let mut depth = 0usize;
        for (i, b) in self.raw.bytes().enumerate().take(span.end).skip(span.start) {
            if self.opaque[i] {
                continue;
            }
            match b {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(i);
                    }
                }
                _ => {}
            }
        }
        Err(ParseError::MissingCloseBracket(self.text(span).to_string()))
    }

    /// Splits `and rest` / `or rest` into the conjunction and `rest`.
    fn leading_conjunction(&self, span: Span) -> Option<(Conjunction, Span)> {
        let text = &self.lower[span.start..span.end];
        [Conjunction::And, Conjunction::Or].into_iter().find_map(|op| {
            let word = op.as_str();
            let after = text.strip_prefix(word)?;
            let boundary = after.starts_with(|c: char| c.is_whitespace() || c == '(');
            boundary.then(|| (op, Span::new(span.start + word.len(), span.end)))
        })
    }

    /// Splits `condition and` / `condition or` into the condition and conjunction.
    fn trailing_conjunction(&self, span: Span) -> Option<(Span, Conjunction)> {
        let text = &self.lower[span.start..span.end];
        [Conjunction::And, Conjunction::Or].into_iter().find_map(|op| {
            let word = op.as_str();
            let before = text.strip_suffix(word)?;
            let boundary = before.ends_with(|c: char| c.is_whitespace() || c == ')');
            boundary.then(|| (Span::new(span.start, span.end - word.len()), op))
        })
    }
}

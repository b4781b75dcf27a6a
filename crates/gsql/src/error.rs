//! Error types for the gsql crate.
//!
//! Each layer reports its own error type. [`GsqlError`] wraps all of them
//! for callers that drive the whole pipeline through [`crate::Query`].

use thiserror::Error;

use crate::op::Operator;
use crate::value::Kind;

/// Malformed query or WHERE-clause text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// An opening bracket has no matching close bracket.
    #[error("missing close bracket in: {0}")]
    MissingCloseBracket(String),

    /// A closing bracket has no matching open bracket.
    #[error("unexpected close bracket in: {0}")]
    UnexpectedCloseBracket(String),

    /// No comparison operator was found in a comparator.
    #[error("cannot find comparator operation in: {0}")]
    NoOperator(String),

    /// A comparator has an empty operand.
    #[error("missing operand in: {0}")]
    EmptyOperand(String),

    /// A comparator operand contains a stray bracket.
    #[error("illegal bracket in operand: {0}")]
    IllegalBracket(String),

    /// Text between two groups is not joined by `and` or `or`.
    #[error("expected 'and' or 'or' in: {0}")]
    MissingConjunction(String),

    /// The right side of `in` / `not in` is not a bracketed list.
    #[error("malformed list for '{op}': {text}")]
    MalformedList { op: Operator, text: String },

    /// The limit is at or above the configured maximum.
    #[error("limit {limit} is too large, must be below {max}")]
    LimitTooLarge { limit: usize, max: usize },

    /// The page value is not an unsigned integer.
    #[error("invalid page value: {0}")]
    InvalidPage(String),

    /// The query has no `from` clause.
    #[error("missing from clause in: {0}")]
    MissingFrom(String),

    /// The WHERE clause is empty.
    #[error("empty expression")]
    Empty,
}

/// A name in the query does not resolve against the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// The root type is not registered.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// A path segment names no field of its struct.
    #[error("no field '{field}' in type '{ty}'")]
    UnknownField { ty: String, field: String },

    /// A bracketed key was applied to something that is not a list or map.
    #[error("key '[{key}]' applied to non-collection field '{field}'")]
    KeyOnScalar { field: String, key: String },

    /// A list key is not a non-negative integer.
    #[error("invalid list index '[{key}]' on field '{field}'")]
    InvalidIndex { field: String, key: String },

    /// A path continues past a scalar value.
    #[error("cannot traverse into scalar field '{0}'")]
    NotAStruct(String),

    /// A map segment on a write path has no key.
    #[error("map field '{0}' needs a key to be written")]
    MissingMapKey(String),

    /// Neither side of a comparator is a known field.
    #[error("no field was found for comparator: {0}")]
    NoField(String),

    /// A value could not be written because its type differs from the target.
    #[error("type mismatch writing path '{0}'")]
    TypeMismatch(String),
}

/// Failure while matching a single candidate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A field path resolved to no values on this candidate.
    #[error("path '{0}' resolved to no values")]
    Unresolved(String),

    /// No comparison exists for this operator and kind.
    #[error("operator '{op}' is not supported for {kind} values")]
    Unsupported { op: Operator, kind: Kind },
}

/// Top level error for compiling and running queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GsqlError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Result type for gsql operations.
pub type Result<T> = std::result::Result<T, GsqlError>;

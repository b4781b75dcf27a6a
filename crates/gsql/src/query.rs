//! Compiled queries.
//!
//! [`Query::compile`] splits the text into clauses, resolves the root type,
//! binds columns, sort key and every field operand of the WHERE clause, and
//! keeps the result for repeated matching.

use std::fmt;

use sha2::{Digest, Sha256};
use tracing::{debug, error, warn};

use crate::ast::Expression;
use crate::error::{EvalError, ParseError, ResolutionError, Result};
use crate::options::QueryOptions;
use crate::ordering::{page_bounds, sort_by_path, Dir};
use crate::parser::parse;
use crate::path::PropertyPath;
use crate::resolve;
use crate::schema::SchemaProvider;
use crate::statement::Statement;
use crate::traits::{Record, Reflect, StructSchema, View};

/// A compiled query.
///
/// Immutable after compilation and safe to share between threads.
///
/// # Example
///
/// ```
/// use gsql::{Query, Record, Registry};
///
/// #[derive(Debug, Clone, Default, Record)]
/// struct Task {
///     name: String,
///     priority: u8,
///     tags: Vec<String>,
/// }
///
/// let registry = Registry::new();
/// registry.register::<Task>();
///
/// let tasks = vec![
///     Task { name: "Write docs".into(), priority: 3, tags: vec!["docs".into()] },
///     Task { name: "Fix bug".into(), priority: 5, tags: vec!["bug".into(), "urgent".into()] },
///     Task { name: "Old task".into(), priority: 1, tags: vec![] },
/// ];
///
/// let query = Query::compile(
///     "select name from task where priority >= 3 and tags = urgent",
///     &registry,
/// )
/// .unwrap();
///
/// let results = query.filter(&tasks, true);
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].name, "Fix bug");
/// assert_eq!(results[0].priority, 0);
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    text: String,
    statement: Statement,
    root: &'static StructSchema,
    columns: Vec<PropertyPath>,
    sort_by: Option<PropertyPath>,
    expression: Option<Expression>,
    match_case: bool,
}

impl Query {
    /// Compiles `text` with default options.
    pub fn compile(text: &str, provider: &dyn SchemaProvider) -> Result<Self> {
        Self::compile_with(text, provider, &QueryOptions::default())
    }

    pub fn compile_with(
        text: &str,
        provider: &dyn SchemaProvider,
        options: &QueryOptions,
    ) -> Result<Self> {
        let statement = Statement::parse(text, options)?;
        let table = statement
            .tables
            .first()
            .ok_or_else(|| ParseError::MissingFrom(text.to_string()))?;
        let root = provider
            .root_type(table)
            .ok_or_else(|| ResolutionError::UnknownType(table.clone()))?;

        let columns = statement
            .columns
            .iter()
            .map(|column| PropertyPath::bind(column, root))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let sort_by = statement
            .sort_by
            .as_deref()
            .map(|column| PropertyPath::bind(column, root))
            .transpose()?;

        let expression = match &statement.where_clause {
            Some(text) => {
                let mut expression = parse(text)?;
                expression.bind(root)?;
                Some(expression)
            }
            None => None,
        };

        let query = Query {
            text: text.to_string(),
            match_case: statement.match_case || options.match_case,
            statement,
            root,
            columns,
            sort_by,
            expression,
        };
        debug!(query = %query, hash = %query.hash(), "compiled query");
        Ok(query)
    }

    /// Returns `true` if `item` satisfies the WHERE clause.
    ///
    /// Evaluation errors are logged and count as a non-match.
    pub fn matches<T: Record>(&self, item: &T) -> bool {
        self.matches_dyn(item)
    }

    /// Like [`Query::matches`] for any reflected value.
    ///
    /// Values that are not of the query's root type never match.
    pub fn matches_dyn(&self, item: &dyn Reflect) -> bool {
        match item.view() {
            View::Struct(s) if s.struct_schema().name == self.root.name => {}
            _ => return false,
        }
        match self.try_matches(item) {
            Ok(matched) => matched,
            Err(err @ EvalError::Unsupported { .. }) => {
                error!(query = %self, error = %err, "no comparison for operand kind");
                false
            }
            Err(err) => {
                warn!(query = %self, error = %err, "candidate evaluation failed");
                false
            }
        }
    }

    /// Evaluates the WHERE clause against `item`, reporting errors.
    pub fn try_matches(&self, item: &dyn Reflect) -> std::result::Result<bool, EvalError> {
        match &self.expression {
            Some(expression) => expression.matches(item, self.match_case),
            None => Ok(true),
        }
    }

    /// Returns the matching items, cloned.
    ///
    /// With `only_selected_columns`, each clone holds only the selected
    /// columns and defaults elsewhere (see [`Query::project`]).
    pub fn filter<T: Record>(&self, items: &[T], only_selected_columns: bool) -> Vec<T> {
        items
            .iter()
            .filter(|item| self.matches(*item))
            .map(|item| {
                if only_selected_columns {
                    self.project(item)
                } else {
                    item.clone()
                }
            })
            .collect()
    }

    /// Clones `item` keeping only the selected columns.
    ///
    /// A query without columns (`select *`) returns a full clone.
    pub fn project<T: Record>(&self, item: &T) -> T {
        if self.columns.is_empty() {
            return item.clone();
        }
        let mut out = T::default();
        for column in &self.columns {
            if let Err(err) = resolve::project(item, &mut out, column) {
                warn!(column = %column, error = %err, "could not copy column");
            }
        }
        out
    }

    /// Returns references to the matching items, sorted and paged.
    pub fn execute<'a, T: Record>(&self, items: &'a [T]) -> Vec<&'a T> {
        let mut matched: Vec<&T> = items.iter().filter(|item| self.matches(*item)).collect();
        if let Some(sort_by) = &self.sort_by {
            let dir = if self.descending() { Dir::Desc } else { Dir::Asc };
            sort_by_path(&mut matched, sort_by, dir);
        }
        let (start, end) = page_bounds(matched.len(), self.page(), self.limit());
        matched.drain(start..end).collect()
    }

    /// Number of matching items.
    pub fn count<T: Record>(&self, items: &[T]) -> usize {
        items.iter().filter(|item| self.matches(*item)).count()
    }

    /// The query text as given.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Root type name as declared.
    pub fn root_type(&self) -> &'static str {
        self.root.name
    }

    pub fn schema_name(&self) -> Option<&str> {
        self.statement.schema_name.as_deref()
    }

    /// Selected columns; empty means all.
    pub fn columns(&self) -> &[PropertyPath] {
        &self.columns
    }

    pub fn where_clause(&self) -> Option<&Expression> {
        self.expression.as_ref()
    }

    pub fn sort_by(&self) -> Option<&PropertyPath> {
        self.sort_by.as_ref()
    }

    pub fn descending(&self) -> bool {
        self.statement.descending
    }

    pub fn match_case(&self) -> bool {
        self.match_case
    }

    pub fn limit(&self) -> Option<usize> {
        self.statement.limit
    }

    pub fn page(&self) -> usize {
        self.statement.page
    }

    /// The literal operand of the first comparator, or `""`.
    pub fn key_of(&self) -> &str {
        self.expression
            .as_ref()
            .and_then(Expression::first_comparator)
            .map_or("", |c| c.key())
    }

    /// Stable identifier of what the query selects.
    ///
    /// Hex SHA-256 of the root type, canonical WHERE text and sort key.
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.root.name.as_bytes());
        if let Some(expression) = &self.expression {
            hasher.update(expression.to_string().as_bytes());
        }
        if let Some(sort_by) = &self.sort_by {
            hasher.update(sort_by.id().as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    /// Debug rendering of the WHERE tree.
    pub fn visualize(&self) -> String {
        self.expression
            .as_ref()
            .map(Expression::visualize)
            .unwrap_or_default()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("select ")?;
        if self.columns.is_empty() {
            f.write_str("*")?;
        }
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", column)?;
        }
        write!(f, " from {}", self.root.name.to_lowercase())?;
        if let Some(expression) = &self.expression {
            write!(f, " where {}", expression)?;
        }
        Ok(())
    }
}

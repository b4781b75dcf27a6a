//! Splitting query text into clauses.
//!
//! ```text
//! select <cols> from <type> [where <expr>] [sort-by <col>] [page <n>]
//!     [limit <n>] [match-case] [descending | ascending]
//! ```
//!
//! Clauses may appear in any order. A clause runs from its keyword to the
//! next keyword. Keywords are case-insensitive and only count as whole
//! words outside quotes and bracketed keys.

use tracing::warn;

use crate::error::ParseError;
use crate::options::QueryOptions;
use crate::path::lower_outside_keys;

const SELECT: &str = "select";
const FROM: &str = "from";
const WHERE: &str = "where";
const SORT_BY: &str = "sort-by";
const DESCENDING: &str = "descending";
const ASCENDING: &str = "ascending";
const LIMIT: &str = "limit";
const PAGE: &str = "page";
const MATCH_CASE: &str = "match-case";

const KEYWORDS: [&str; 9] = [
    SELECT, FROM, WHERE, SORT_BY, DESCENDING, ASCENDING, LIMIT, PAGE, MATCH_CASE,
];

/// The clauses of a query, before any name is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statement {
    /// Selected columns, lower-cased outside keys. Empty means all.
    pub columns: Vec<String>,
    /// Tables named in `from`, without schema prefix.
    pub tables: Vec<String>,
    /// Schema prefix of the first table (`from schema.table`).
    pub schema_name: Option<String>,
    /// WHERE text as written.
    pub where_clause: Option<String>,
    pub sort_by: Option<String>,
    pub descending: bool,
    pub limit: Option<usize>,
    pub page: usize,
    pub match_case: bool,
}

impl Statement {
    /// Splits `text` into clauses.
    pub fn parse(text: &str, options: &QueryOptions) -> Result<Self, ParseError> {
        let text = text.trim();
        let clauses = Clauses::new(text);
        let mut statement = Statement::default();

        if let Some(select) = clauses.value(SELECT) {
            statement.columns = lower_outside_keys(select)
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty() && *c != "*")
                .map(str::to_string)
                .collect();
        }

        if let Some(from) = clauses.value(FROM) {
            for (i, table) in from.split(',').map(str::trim).enumerate() {
                if table.is_empty() {
                    continue;
                }
                let table = table.to_lowercase();
                match table.split_once('.') {
                    Some((schema, name)) => {
                        if i == 0 {
                            statement.schema_name = Some(schema.to_string());
                        }
                        statement.tables.push(name.to_string());
                    }
                    None => statement.tables.push(table),
                }
            }
        }

        statement.where_clause = clauses
            .value(WHERE)
            .filter(|w| !w.is_empty())
            .map(str::to_string);

        statement.sort_by = clauses
            .value(SORT_BY)
            .filter(|s| !s.is_empty())
            .map(lower_outside_keys);

        if let Some(limit) = clauses.value(LIMIT) {
            let limit = match limit.parse::<usize>() {
                Ok(limit) => limit,
                Err(_) => {
                    warn!(
                        limit,
                        fallback = options.default_limit,
                        "invalid limit, using default"
                    );
                    options.default_limit
                }
            };
            if limit >= options.max_limit {
                return Err(ParseError::LimitTooLarge {
                    limit,
                    max: options.max_limit,
                });
            }
            statement.limit = Some(limit);
        }

        if let Some(page) = clauses.value(PAGE) {
            statement.page = page
                .parse::<usize>()
                .map_err(|_| ParseError::InvalidPage(page.to_string()))?;
        }

        statement.descending = clauses.has(DESCENDING) && !clauses.has(ASCENDING);
        statement.match_case = clauses.has(MATCH_CASE);
        Ok(statement)
    }
}

/// Keyword positions within a query text.
struct Clauses<'a> {
    text: &'a str,
    /// `(keyword, start)` sorted by start.
    found: Vec<(&'static str, usize)>,
}

impl<'a> Clauses<'a> {
    fn new(text: &'a str) -> Self {
        let lower = text.to_ascii_lowercase();
        let opaque = opaque_mask(text);
        let mut found: Vec<(&'static str, usize)> = KEYWORDS
            .iter()
            .filter_map(|kw| find_keyword(&lower, &opaque, kw).map(|at| (*kw, at)))
            .collect();
        found.sort_by_key(|(_, at)| *at);
        Clauses { text, found }
    }

    fn has(&self, keyword: &str) -> bool {
        self.found.iter().any(|(kw, _)| *kw == keyword)
    }

    /// Text between `keyword` and the next keyword, trimmed.
    fn value(&self, keyword: &str) -> Option<&'a str> {
        let index = self.found.iter().position(|(kw, _)| *kw == keyword)?;
        let start = self.found[index].1 + keyword.len();
        let end = self
            .found
            .get(index + 1)
            .map_or(self.text.len(), |(_, at)| *at);
        Some(self.text[start..end].trim())
    }
}

/// First whole-word, non-opaque occurrence of `keyword`.
fn find_keyword(lower: &str, opaque: &[bool], keyword: &str) -> Option<usize> {
    lower.match_indices(keyword).map(|(at, _)| at).find(|&at| {
        let end = at + keyword.len();
        let before = lower[..at].chars().next_back();
        let after = lower[end..].chars().next();
        !opaque[at]
            && before.map_or(true, char::is_whitespace)
            && after.map_or(true, char::is_whitespace)
    })
}

/// Marks bytes inside single quotes or `[...]`.
fn opaque_mask(text: &str) -> Vec<bool> {
    let mut mask = vec![false; text.len()];
    let mut in_quote = false;
    let mut in_key = false;
    for (i, b) in text.bytes().enumerate() {
        match b {
            b'\'' if !in_key => in_quote = !in_quote,
            b'[' if !in_quote => in_key = true,
            b']' if !in_quote => in_key = false,
            _ => {}
        }
        mask[i] = in_quote || in_key;
    }
    mask
}

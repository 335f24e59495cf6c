//! # Query Building
//!
//! Backend-independent SQL statements.
//!
//! ## Placeholder Rendering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Repository writes (always):                                            │
//! │    Query::new("UPDATE produtos SET nome = ? WHERE id = ?")             │
//! │        .bind("Air Street")                                             │
//! │        .bind(7)                                                         │
//! │                                                                         │
//! │  Backend::render()                                                      │
//! │    ├── Sqlite   → UPDATE produtos SET nome = ? WHERE id = ?            │
//! │    └── Postgres → UPDATE produtos SET nome = $1 WHERE id = $2          │
//! │                                                                         │
//! │  Rendering happens once, inside Storage. Call sites never see the      │
//! │  backend-specific syntax.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::borrow::Cow;
use std::fmt;

// =============================================================================
// Backend
// =============================================================================

/// The relational engine behind a [`crate::Storage`].
///
/// Chosen once from the connection URL when the database is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Embedded file backend.
    Sqlite,
    /// Client-server backend.
    Postgres,
}

impl Backend {
    /// Detects the backend from a connection URL.
    ///
    /// `postgres://` and `postgresql://` select Postgres; anything else is
    /// treated as SQLite (`sqlite://file.db`, `sqlite::memory:`).
    pub fn from_url(url: &str) -> Self {
        let lower = url.trim_start().to_ascii_lowercase();
        if lower.starts_with("postgres://") || lower.starts_with("postgresql://") {
            Backend::Postgres
        } else {
            Backend::Sqlite
        }
    }

    /// Rewrites `?` markers into this backend's placeholder syntax.
    ///
    /// Markers inside single-quoted literals, double-quoted identifiers,
    /// `--` line comments and `/* */` block comments are left alone.
    pub fn render<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        match self {
            Backend::Sqlite => Cow::Borrowed(sql),
            Backend::Postgres => Cow::Owned(number_placeholders(sql)),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Sqlite => f.write_str("sqlite"),
            Backend::Postgres => f.write_str("postgres"),
        }
    }
}

/// Feeds every character of `sql` to `visit`, flagged `true` when it sits in
/// plain SQL and `false` inside a literal, quoted identifier or comment.
fn walk_sql(sql: &str, mut visit: impl FnMut(char, bool)) {
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                visit(c, false);
                // Doubled quotes ('' or "") are escapes and keep us inside.
                while let Some(inner) = chars.next() {
                    visit(inner, false);
                    if inner == c {
                        if chars.peek() == Some(&c) {
                            visit(c, false);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                visit(c, false);
                for inner in chars.by_ref() {
                    visit(inner, false);
                    if inner == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                visit(c, false);
                if let Some(star) = chars.next() {
                    visit(star, false);
                }
                while let Some(inner) = chars.next() {
                    visit(inner, false);
                    if inner == '*' && chars.peek() == Some(&'/') {
                        visit('/', false);
                        chars.next();
                        break;
                    }
                }
            }
            _ => visit(c, true),
        }
    }
}

fn number_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut index = 0;

    walk_sql(sql, |c, code| {
        if code && c == '?' {
            index += 1;
            out.push('$');
            out.push_str(&index.to_string());
        } else {
            out.push(c);
        }
    });

    out
}

/// True when `keyword` appears as a whole word in plain SQL.
fn has_keyword(sql: &str, keyword: &str) -> bool {
    let mut masked = String::with_capacity(sql.len());
    walk_sql(sql, |c, code| masked.push(if code { c } else { ' ' }));

    masked
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|word| word.eq_ignore_ascii_case(keyword))
}

// =============================================================================
// Values
// =============================================================================

/// A value bound to a `?` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Text(String),
    Null,
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

// =============================================================================
// Query
// =============================================================================

/// A SQL statement written with `?` markers plus its bound values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    sql: String,
    params: Vec<Value>,
}

impl Query {
    /// Starts a statement. Use `?` for every parameter.
    pub fn new(sql: impl Into<String>) -> Self {
        Query {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Binds the next `?` marker.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// True when the statement is an `INSERT`.
    pub fn is_insert(&self) -> bool {
        self.sql
            .trim_start()
            .get(..6)
            .is_some_and(|head| head.eq_ignore_ascii_case("insert"))
    }

    /// True when the statement already asks for rows back.
    pub(crate) fn has_returning(&self) -> bool {
        has_keyword(&self.sql, "returning")
    }

    /// Returns the statement with ` RETURNING id` appended.
    pub(crate) fn with_returning_id(&self) -> Query {
        let trimmed = self.sql.trim_end().trim_end_matches(';');
        Query {
            sql: format!("{} RETURNING id", trimmed),
            params: self.params.clone(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! Opaque expressions used for column defaults and sort keys.
//!
//! The model never evaluates an [`Expression`]; evaluation belongs to the
//! query engine. The only thing the model looks at is which columns an
//! expression references, so that sort keys can be resolved against the
//! owning table.
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Constant values that can appear inside an [`Expression`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Literal {
    /// SQL `NULL`.
    Null,
    /// Boolean constant.
    Boolean(bool),
    /// Integer constant.
    Integer(i64),
    /// Exact decimal constant, kept in its textual form (for example `"12.50"`).
    Decimal(String),
    /// String constant.
    String(String),
    /// Timestamp constant, in UTC.
    Timestamp(DateTime<Utc>),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "NULL"),
            Literal::Boolean(b) => write!(f, "{b}"),
            Literal::Integer(i) => write!(f, "{i}"),
            Literal::Decimal(d) => write!(f, "{d}"),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Timestamp(ts) => write!(f, "TIMESTAMP '{}'", ts.to_rfc3339()),
        }
    }
}

/// An expression tree over columns, literals and named functions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Expression {
    /// Reference to a top-level column by name.
    Column(String),
    /// A constant value.
    Literal(Literal),
    /// A function call, interpreted by the engine (for example
    /// `current_timestamp()` or `lower(name)`).
    Function {
        /// Function name.
        name: String,
        /// Ordered arguments.
        #[serde(default)]
        args: Vec<Expression>,
    },
}

impl Expression {
    /// Reference to the column `name`.
    pub fn column(name: impl Into<String>) -> Self {
        Expression::Column(name.into())
    }

    /// A literal expression.
    pub fn literal(value: Literal) -> Self {
        Expression::Literal(value)
    }

    /// A function call expression.
    pub fn function(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Function {
            name: name.into(),
            args,
        }
    }

    /// Columns referenced anywhere in this expression, in first-seen order and
    /// without duplicates.
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expression::Column(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Expression::Literal(_) => {}
            Expression::Function { args, .. } => {
                for arg in args {
                    arg.collect_columns(out);
                }
            }
        }
    }

    /// Rewrite every reference to column `from` into a reference to `to`.
    pub(crate) fn rename_column(&mut self, from: &str, to: &str) {
        match self {
            Expression::Column(name) => {
                if name == from {
                    *name = to.to_string();
                }
            }
            Expression::Literal(_) => {}
            Expression::Function { args, .. } => {
                for arg in args {
                    arg.rename_column(from, to);
                }
            }
        }
    }
}

impl From<Literal> for Expression {
    fn from(value: Literal) -> Self {
        Expression::Literal(value)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Column(name) => write!(f, "{name}"),
            Expression::Literal(lit) => write!(f, "{lit}"),
            Expression::Function { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referenced_columns_walks_function_args() {
        let expr = Expression::function(
            "concat",
            vec![
                Expression::column("first"),
                Expression::literal(Literal::String(" ".to_string())),
                Expression::function("upper", vec![Expression::column("last")]),
                Expression::column("first"),
            ],
        );

        assert_eq!(expr.referenced_columns(), vec!["first", "last"]);
        assert!(Expression::literal(Literal::Null).referenced_columns().is_empty());
    }

    #[test]
    fn rename_column_rewrites_nested_references() {
        let mut expr = Expression::function(
            "coalesce",
            vec![Expression::column("a"), Expression::column("b")],
        );
        expr.rename_column("a", "z");
        assert_eq!(expr.to_string(), "coalesce(z, b)");
    }

    #[test]
    fn display_quotes_strings() {
        let lit = Literal::String("it's".to_string());
        assert_eq!(lit.to_string(), "'it''s'");
        assert_eq!(
            Expression::function("current_timestamp", vec![]).to_string(),
            "current_timestamp()"
        );
    }
}

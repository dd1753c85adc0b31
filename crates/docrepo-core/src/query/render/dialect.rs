use crate::{model::PropertyPath, query::QueryAction};
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// DialectKind
///
/// Configuration-level selector for a built-in dialect.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[default]
    Generic,
    Cosmos,
}

impl DialectKind {
    #[must_use]
    pub fn dialect(self) -> Box<dyn Dialect> {
        match self {
            Self::Generic => Box::new(GenericDialect),
            Self::Cosmos => Box::new(CosmosDialect),
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic => f.write_str("generic"),
            Self::Cosmos => f.write_str("cosmos"),
        }
    }
}

///
/// UnaryCheck
///
/// Postfix/function checks that bind no parameter.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnaryCheck {
    Null,
    Empty,
    Defined,
    True,
    False,
}

///
/// Placeholder
///
/// Text emitted for one bound parameter, and the parameter name the executor
/// binds it under (`None` for positional dialects).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Placeholder {
    pub text: String,
    pub name: Option<String>,
}

///
/// Dialect
///
/// Target-language surface: everything that differs between stores.
/// Operator structure, parenthesization and parameter order are shared.
///

pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    /// Qualified subject expression for a property path.
    fn subject(&self, path: &PropertyPath) -> String;

    /// Placeholder for the `ordinal`-th parameter (0-based, whole query).
    fn placeholder(&self, path: &PropertyPath, ordinal: usize) -> Placeholder;

    fn unary_check(&self, check: UnaryCheck, subject: &str) -> String;

    fn uppercase(&self, expr: &str) -> String {
        format!("UPPER({expr})")
    }

    /// `SELECT ... FROM ...` head.
    fn select(
        &self,
        action: QueryAction,
        distinct: bool,
        limit: Option<u32>,
        container: &str,
    ) -> String;

    /// Trailing limit clause, for dialects that do not cap in the head.
    fn limit_suffix(&self, _limit: u32) -> Option<String> {
        None
    }
}

///
/// GenericDialect
///
/// ANSI-flavoured text with positional `?` placeholders.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct GenericDialect;

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn subject(&self, path: &PropertyPath) -> String {
        path.to_string()
    }

    fn placeholder(&self, _path: &PropertyPath, _ordinal: usize) -> Placeholder {
        Placeholder {
            text: "?".to_string(),
            name: None,
        }
    }

    fn unary_check(&self, check: UnaryCheck, subject: &str) -> String {
        match check {
            UnaryCheck::Null => format!("{subject} IS NULL"),
            UnaryCheck::Empty => format!("{subject} IS EMPTY"),
            UnaryCheck::Defined => format!("{subject} IS DEFINED"),
            UnaryCheck::True => format!("{subject} = TRUE"),
            UnaryCheck::False => format!("{subject} = FALSE"),
        }
    }

    fn select(
        &self,
        action: QueryAction,
        distinct: bool,
        _limit: Option<u32>,
        container: &str,
    ) -> String {
        match action {
            QueryAction::Count | QueryAction::Exists => {
                format!("SELECT COUNT(*) FROM {container}")
            }
            QueryAction::Find | QueryAction::Delete if distinct => {
                format!("SELECT DISTINCT * FROM {container}")
            }
            QueryAction::Find | QueryAction::Delete => format!("SELECT * FROM {container}"),
        }
    }

    fn limit_suffix(&self, limit: u32) -> Option<String> {
        Some(format!("LIMIT {limit}"))
    }
}

///
/// CosmosDialect
///
/// Document-store SQL: `r`-rooted subjects, named `@` parameters, function
/// forms for type checks, `TOP` in the head.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct CosmosDialect;

impl CosmosDialect {
    const ROOT: &'static str = "r";
}

impl Dialect for CosmosDialect {
    fn name(&self) -> &'static str {
        "cosmos"
    }

    fn subject(&self, path: &PropertyPath) -> String {
        format!("{}.{path}", Self::ROOT)
    }

    // The ordinal follows the last `_` and holds no `_` itself, so names are
    // unique per ordinal whatever the path spells.
    fn placeholder(&self, path: &PropertyPath, ordinal: usize) -> Placeholder {
        let name = format!("@{}_{ordinal}", path.as_str().replace('.', "_"));

        Placeholder {
            text: name.clone(),
            name: Some(name),
        }
    }

    fn unary_check(&self, check: UnaryCheck, subject: &str) -> String {
        match check {
            UnaryCheck::Null => format!("IS_NULL({subject})"),
            UnaryCheck::Empty => format!("({subject} = \"\" OR ARRAY_LENGTH({subject}) = 0)"),
            UnaryCheck::Defined => format!("IS_DEFINED({subject})"),
            UnaryCheck::True => format!("{subject} = true"),
            UnaryCheck::False => format!("{subject} = false"),
        }
    }

    fn select(
        &self,
        action: QueryAction,
        distinct: bool,
        limit: Option<u32>,
        _container: &str,
    ) -> String {
        let root = Self::ROOT;
        let top = limit.map(|n| format!(" TOP {n}")).unwrap_or_default();

        match action {
            QueryAction::Count | QueryAction::Exists => {
                format!("SELECT VALUE COUNT(1) FROM ROOT {root}")
            }
            QueryAction::Find | QueryAction::Delete if distinct => {
                format!("SELECT DISTINCT{top} VALUE {root} FROM ROOT {root}")
            }
            QueryAction::Find | QueryAction::Delete => {
                format!("SELECT{top} * FROM ROOT {root}")
            }
        }
    }
}

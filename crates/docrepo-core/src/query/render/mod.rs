//! Module: query::render
//! Responsibility: criteria tree + sort + page → query text and parameters.
//! Does not own: tree construction or execution.
//! Boundary: rendered precedence always matches tree structure; OR groups
//! are parenthesized as a whole whatever the target grammar's precedence.

mod dialect;


pub use dialect::{CosmosDialect, Dialect, DialectKind, GenericDialect, Placeholder, UnaryCheck};

use crate::{
    cursor::{ContinuationToken, PageRequest},
    model::{PropertyPath, PropertyResolver},
    query::{
        QueryAction,
        criteria::{Criteria, CriteriaKind, LeafCriteria, LogicalOp, ModifierError},
        sort::SortSpec,
    },
    value::Value,
};
use serde::Serialize;
use thiserror::Error as ThisError;

///
/// QuerySpec
///
/// Everything the renderer consumes for one execution.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuerySpec {
    pub action: QueryAction,
    pub distinct: bool,
    pub limit: Option<u32>,
    pub criteria: Option<Criteria>,
    /// Static + dynamic sort, before the page's own keys are appended.
    pub sort: SortSpec,
    pub page: Option<PageRequest>,
}

impl QuerySpec {
    #[must_use]
    pub fn new(action: QueryAction) -> Self {
        Self {
            action,
            ..Self::default()
        }
    }

    /// Row query over `criteria` (all rows when `None`).
    #[must_use]
    pub fn find(criteria: Option<Criteria>) -> Self {
        Self::new(QueryAction::Find).with_criteria(criteria)
    }

    #[must_use]
    pub fn with_criteria(mut self, criteria: Option<Criteria>) -> Self {
        self.criteria = criteria;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: Option<PageRequest>) -> Self {
        self.page = page;
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Declared sort followed by the page's sort; first mention wins.
    #[must_use]
    pub fn effective_sort(&self) -> SortSpec {
        match &self.page {
            Some(page) => self.sort.merged(page.sort()),
            None => self.sort.clone(),
        }
    }
}

///
/// QueryParameter
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryParameter {
    /// Bind name for named-parameter dialects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: Value,
}

///
/// RenderedQuery
///
/// Immutable hand-off to the executor.
///

#[derive(Clone, Debug, PartialEq)]
pub struct RenderedQuery {
    pub text: String,
    /// Aligned with placeholders in traversal order.
    pub parameters: Vec<QueryParameter>,
    pub action: QueryAction,
    pub container: String,
    /// Fetch-size hint.
    pub page_size: Option<u32>,
    /// Passed through untouched; never turned into OFFSET arithmetic.
    pub continuation: Option<ContinuationToken>,
    /// Set when the criteria pin the entity's partition key.
    pub partition_key: Option<Value>,
}

impl RenderedQuery {
    #[must_use]
    pub const fn is_cross_partition(&self) -> bool {
        self.partition_key.is_none()
    }

    /// Parameter values in placeholder order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.parameters.iter().map(|param| &param.value)
    }
}

///
/// RenderError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RenderError {
    #[error(transparent)]
    Modifier(#[from] ModifierError),

    #[error("property '{path}' does not exist on entity '{entity}'")]
    UnknownProperty { entity: String, path: String },
}

///
/// QueryRenderer
///

#[derive(Clone, Copy)]
pub struct QueryRenderer<'a> {
    dialect: &'a dyn Dialect,
    resolver: &'a dyn PropertyResolver,
}

impl<'a> QueryRenderer<'a> {
    #[must_use]
    pub const fn new(dialect: &'a dyn Dialect, resolver: &'a dyn PropertyResolver) -> Self {
        Self { dialect, resolver }
    }

    /// Render one query. Pure: equal inputs give equal text and parameters.
    pub fn render(&self, spec: &QuerySpec) -> Result<RenderedQuery, RenderError> {
        if let Some(criteria) = &spec.criteria {
            criteria.validate_modifiers()?;
            for leaf in criteria.leaves() {
                self.check_property(leaf.subject())?;
            }
        }

        let sort = spec.effective_sort();
        if spec.action.returns_rows() {
            for key in &sort {
                self.check_property(&key.property)?;
            }
        }

        let mut text = self.dialect.select(
            spec.action,
            spec.distinct,
            spec.limit,
            self.resolver.container(),
        );
        let mut parameters = Vec::new();

        if let Some(criteria) = &spec.criteria {
            text.push_str(" WHERE ");
            text.push_str(&self.render_node(criteria, None, &mut parameters));
        }

        if spec.action.returns_rows() {
            if !sort.is_empty() {
                let keys: Vec<String> = sort
                    .keys()
                    .iter()
                    .map(|key| format!("{} {}", self.dialect.subject(&key.property), key.direction))
                    .collect();
                text.push_str(" ORDER BY ");
                text.push_str(&keys.join(", "));
            }

            if let Some(suffix) = spec.limit.and_then(|n| self.dialect.limit_suffix(n)) {
                text.push(' ');
                text.push_str(&suffix);
            }
        }

        let partition_key = self
            .resolver
            .partition_key()
            .zip(spec.criteria.as_ref())
            .and_then(|(key, criteria)| pinned_value(criteria, key))
            .cloned();

        tracing::debug!(
            dialect = self.dialect.name(),
            action = %spec.action,
            parameters = parameters.len(),
            cross_partition = partition_key.is_none(),
            "rendered query"
        );
        tracing::trace!(query = %text, "rendered query text");

        Ok(RenderedQuery {
            text,
            parameters,
            action: spec.action,
            container: self.resolver.container().to_string(),
            page_size: spec.page.as_ref().map(PageRequest::page_size),
            continuation: spec.page.as_ref().and_then(|p| p.continuation().cloned()),
            partition_key,
        })
    }

    fn check_property(&self, path: &PropertyPath) -> Result<(), RenderError> {
        if self.resolver.resolves(path) {
            Ok(())
        } else {
            Err(RenderError::UnknownProperty {
                entity: self.resolver.entity_name().to_string(),
                path: path.to_string(),
            })
        }
    }

    // Depth-first, left to right; parameters are pushed in emission order.
    fn render_node(
        &self,
        node: &Criteria,
        parent: Option<LogicalOp>,
        parameters: &mut Vec<QueryParameter>,
    ) -> String {
        match node {
            Criteria::Leaf(leaf) => self.render_leaf(leaf, parameters),
            Criteria::Combinator(combinator) => {
                let op = combinator.op();
                let left = self.render_node(combinator.left(), Some(op), parameters);
                let right = self.render_node(combinator.right(), Some(op), parameters);
                let joined = format!("{left} {} {right}", op.keyword());

                match (op, parent) {
                    (LogicalOp::Or, _) | (LogicalOp::And, Some(LogicalOp::Or)) => {
                        format!("({joined})")
                    }
                    (LogicalOp::And, _) => joined,
                }
            }
        }
    }

    fn render_leaf(&self, leaf: &LeafCriteria, parameters: &mut Vec<QueryParameter>) -> String {
        let path = leaf.subject();
        let fold = |expr: String| {
            if leaf.is_ignore_case() {
                self.dialect.uppercase(&expr)
            } else {
                expr
            }
        };

        let subject = fold(self.dialect.subject(path));

        let mut bind = |value: &Value| {
            let placeholder = self.dialect.placeholder(path, parameters.len());
            parameters.push(QueryParameter {
                name: placeholder.name,
                value: value.clone(),
            });
            fold(placeholder.text)
        };

        let args: Vec<String> = match leaf.kind() {
            CriteriaKind::In => leaf
                .values()
                .iter()
                .flat_map(|value| value.as_list().unwrap_or(std::slice::from_ref(value)))
                .map(&mut bind)
                .collect(),
            _ => leaf.values().iter().map(&mut bind).collect(),
        };

        let expr = self.leaf_expr(leaf.kind(), &subject, &args);
        if leaf.is_negated() {
            format!("NOT ({expr})")
        } else {
            expr
        }
    }

    fn leaf_expr(&self, kind: CriteriaKind, subject: &str, args: &[String]) -> String {
        let arg = |i: usize| args.get(i).map_or("", String::as_str);

        match kind {
            CriteriaKind::Equal => format!("{subject} = {}", arg(0)),
            CriteriaKind::LessThan => format!("{subject} < {}", arg(0)),
            CriteriaKind::LessThanEqual => format!("{subject} <= {}", arg(0)),
            CriteriaKind::GreaterThan => format!("{subject} > {}", arg(0)),
            CriteriaKind::GreaterThanEqual => format!("{subject} >= {}", arg(0)),
            CriteriaKind::Between => format!("{subject} BETWEEN {} AND {}", arg(0), arg(1)),
            CriteriaKind::Containing => format!("CONTAINS({subject}, {})", arg(0)),
            CriteriaKind::StartingWith => format!("STARTSWITH({subject}, {})", arg(0)),
            CriteriaKind::EndingWith => format!("ENDSWITH({subject}, {})", arg(0)),
            CriteriaKind::Like => format!("{subject} LIKE {}", arg(0)),
            CriteriaKind::Regex => format!("REGEXMATCH({subject}, {})", arg(0)),
            CriteriaKind::In => format!("{subject} IN ({})", args.join(", ")),
            CriteriaKind::Near => format!("ST_DISTANCE({subject}, {}) <= {}", arg(0), arg(1)),
            CriteriaKind::IsNull => self.dialect.unary_check(UnaryCheck::Null, subject),
            CriteriaKind::IsEmpty => self.dialect.unary_check(UnaryCheck::Empty, subject),
            CriteriaKind::Exists => self.dialect.unary_check(UnaryCheck::Defined, subject),
            CriteriaKind::IsTrue => self.dialect.unary_check(UnaryCheck::True, subject),
            CriteriaKind::IsFalse => self.dialect.unary_check(UnaryCheck::False, subject),
            // Combinators never reach leaf rendering.
            CriteriaKind::And | CriteriaKind::Or => String::new(),
        }
    }
}

/// Render with a one-off renderer.
pub fn render(
    spec: &QuerySpec,
    dialect: &dyn Dialect,
    resolver: &dyn PropertyResolver,
) -> Result<RenderedQuery, RenderError> {
    QueryRenderer::new(dialect, resolver).render(spec)
}

// Value pinned for `key` by a plain equality reachable through AND nodes only.
fn pinned_value<'c>(node: &'c Criteria, key: &PropertyPath) -> Option<&'c Value> {
    match node {
        Criteria::Leaf(leaf) => (leaf.kind() == CriteriaKind::Equal
            && !leaf.is_negated()
            && !leaf.is_ignore_case()
            && leaf.subject() == key)
            .then(|| leaf.values().first())
            .flatten(),
        Criteria::Combinator(combinator) => match combinator.op() {
            LogicalOp::And => pinned_value(combinator.left(), key)
                .or_else(|| pinned_value(combinator.right(), key)),
            LogicalOp::Or => None,
        },
    }
}

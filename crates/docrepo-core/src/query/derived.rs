//! Module: query::derived
//! Responsibility: one registered derived query and its call-time binding.
//! Does not own: parsing rules, rendering, or caching.
//! Boundary: `parse` surfaces every declaration defect; `bind` only fails on
//! arguments that do not fit the declared shape.

use crate::{
    cursor::PageRequest,
    error::QueryError,
    model::PropertyResolver,
    query::{
        assemble::{BoundClause, assemble},
        criteria::check_modifiers,
        descriptor::{ArgShape, MethodDescriptor, parse_method_name},
        fingerprint::DescriptorFingerprint,
        render::QuerySpec,
        sort::SortSpec,
    },
    value::Value,
};
use std::slice;
use thiserror::Error as ThisError;

///
/// Arg
///
/// One call-time argument.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Arg {
    Value(Value),
    Sort(SortSpec),
    Page(PageRequest),
}

impl Arg {
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    #[must_use]
    pub const fn sort(sort: SortSpec) -> Self {
        Self::Sort(sort)
    }

    #[must_use]
    pub const fn page(page: PageRequest) -> Self {
        Self::Page(page)
    }

    /// Shape this argument presents at bind time.
    #[must_use]
    pub const fn shape(&self) -> ArgShape {
        match self {
            Self::Value(value) if value.is_collection() => ArgShape::Collection,
            Self::Value(_) => ArgShape::Scalar,
            Self::Sort(_) => ArgShape::Sort,
            Self::Page(_) => ArgShape::Page,
        }
    }

    // A scalar slot takes any value; `Equal` against an array field binds a list.
    const fn fits(&self, declared: ArgShape) -> bool {
        match (self, declared) {
            (Self::Value(_), ArgShape::Scalar) | (Self::Sort(_), ArgShape::Sort) => true,
            (Self::Value(value), ArgShape::Collection) => value.is_collection(),
            (Self::Page(_), ArgShape::Page) => true,
            _ => false,
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<SortSpec> for Arg {
    fn from(sort: SortSpec) -> Self {
        Self::Sort(sort)
    }
}

impl From<PageRequest> for Arg {
    fn from(page: PageRequest) -> Self {
        Self::Page(page)
    }
}

///
/// BindError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum BindError {
    #[error("'{method}' takes {expected} argument(s), got {found}")]
    ArgumentCount {
        method: String,
        expected: usize,
        found: usize,
    },

    #[error("argument {position} of '{method}' must be {expected}, got {found}")]
    ArgumentShape {
        method: String,
        position: usize,
        expected: ArgShape,
        found: ArgShape,
    },
}

///
/// DerivedQuery
///
/// Parsed, validated template for one repository method. Immutable once
/// built and shared across calls through the registry.
///

#[derive(Clone, Debug, PartialEq)]
pub struct DerivedQuery {
    method: String,
    shape: Vec<ArgShape>,
    descriptor: MethodDescriptor,
    fingerprint: DescriptorFingerprint,
}

impl DerivedQuery {
    /// Parse `method` declared with `shape`.
    ///
    /// With a resolver, every predicate and `OrderBy` path must exist on the
    /// entity. Modifier combinations are checked here too, so a registered
    /// query can only fail later on its arguments.
    pub fn parse(
        method: &str,
        shape: &[ArgShape],
        resolver: Option<&dyn PropertyResolver>,
    ) -> Result<Self, QueryError> {
        let descriptor = parse_method_name(method, shape, resolver)?;

        for clause in &descriptor.predicate.clauses {
            check_modifiers(
                clause.kind,
                &clause.property,
                clause.negated,
                clause.ignore_case,
            )?;
        }

        Ok(Self {
            method: method.to_string(),
            shape: shape.to_vec(),
            descriptor,
            fingerprint: DescriptorFingerprint::of(method, shape),
        })
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[must_use]
    pub fn shape(&self) -> &[ArgShape] {
        &self.shape
    }

    #[must_use]
    pub const fn descriptor(&self) -> &MethodDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub const fn fingerprint(&self) -> DescriptorFingerprint {
        self.fingerprint
    }

    /// Bind call-time arguments and assemble the criteria tree.
    ///
    /// Static `OrderBy` keys come first, then the dynamic sort argument; the
    /// page request's own sort is merged later by the renderer.
    pub fn bind(&self, args: &[Arg]) -> Result<QuerySpec, QueryError> {
        self.check_args(args)?;

        let predicate = &self.descriptor.predicate;
        let mut bound = Vec::with_capacity(predicate.clauses.len());
        for clause in &predicate.clauses {
            let values = args[clause.arguments.clone()]
                .iter()
                .filter_map(|arg| match arg {
                    Arg::Value(value) => Some(value.clone()),
                    Arg::Sort(_) | Arg::Page(_) => None,
                })
                .collect();
            bound.push(BoundClause::new(clause, values));
        }
        let criteria = assemble(bound)?;

        let sort = match predicate.sort_argument.map(|i| &args[i]) {
            Some(Arg::Sort(dynamic)) => self.descriptor.order_by.merged(dynamic),
            _ => self.descriptor.order_by.clone(),
        };
        let page = match predicate.page_argument.map(|i| &args[i]) {
            Some(Arg::Page(page)) => Some(page.clone()),
            _ => None,
        };

        let subject = self.descriptor.subject;
        let mut spec = QuerySpec::new(subject.action)
            .with_criteria(criteria)
            .with_sort(sort)
            .with_page(page)
            .with_limit(subject.limit);
        spec.distinct = subject.distinct;

        Ok(spec)
    }

    fn check_args(&self, args: &[Arg]) -> Result<(), BindError> {
        if args.len() != self.shape.len() {
            return Err(BindError::ArgumentCount {
                method: self.method.clone(),
                expected: self.shape.len(),
                found: args.len(),
            });
        }

        for (position, (arg, declared)) in args.iter().zip(&self.shape).enumerate() {
            if !arg.fits(*declared) {
                return Err(BindError::ArgumentShape {
                    method: self.method.clone(),
                    position,
                    expected: *declared,
                    found: arg.shape(),
                });
            }
        }

        Ok(())
    }

    /// Bind a single value argument.
    pub fn bind_one(&self, value: impl Into<Value>) -> Result<QuerySpec, QueryError> {
        self.bind(slice::from_ref(&Arg::value(value)))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ErrorClass,
        model::EntitySchema,
        query::{CriteriaKind, QueryAction},
    };

    fn person() -> EntitySchema {
        EntitySchema::new("Person").with_properties([
            "name",
            "email",
            "address",
            "age",
            "status",
            "location",
        ])
    }

    fn parse(method: &str, shape: &[ArgShape]) -> Result<DerivedQuery, QueryError> {
        let schema = person();
        DerivedQuery::parse(method, shape, Some(&schema))
    }

    #[test]
    fn and_or_descriptor_binds_left_deep_tree() {
        let query = parse(
            "findByNameAndEmailOrAddress",
            &[ArgShape::Scalar, ArgShape::Scalar, ArgShape::Scalar],
        )
        .expect("descriptor should parse");

        let spec = query
            .bind(&[
                Arg::value("ada"),
                Arg::value("ada@example.com"),
                Arg::value("1 Analytical Way"),
            ])
            .expect("arguments should bind");
        let criteria = spec.criteria.expect("criteria should exist");

        assert_eq!(criteria.to_string(), "OR(AND(name=?,email=?),address=?)");
        let values: Vec<_> = criteria
            .leaves()
            .into_iter()
            .flat_map(|leaf| leaf.values().to_vec())
            .collect();
        assert_eq!(
            values,
            vec![
                Value::from("ada"),
                Value::from("ada@example.com"),
                Value::from("1 Analytical Way"),
            ]
        );
    }

    #[test]
    fn wrong_argument_count_is_rejected() {
        let query = parse("findByName", &[ArgShape::Scalar]).expect("descriptor should parse");

        let err = query.bind(&[]).expect_err("missing argument should fail");

        assert_eq!(err.class(), ErrorClass::InvalidArgument);
        assert!(matches!(
            err,
            QueryError::Bind(BindError::ArgumentCount {
                expected: 1,
                found: 0,
                ..
            })
        ));
    }

    #[test]
    fn collection_slot_requires_a_list() {
        let query =
            parse("findByStatusIn", &[ArgShape::Collection]).expect("descriptor should parse");

        let err = query
            .bind(&[Arg::value("active")])
            .expect_err("scalar in collection slot should fail");
        assert!(matches!(
            err,
            QueryError::Bind(BindError::ArgumentShape {
                position: 0,
                expected: ArgShape::Collection,
                found: ArgShape::Scalar,
                ..
            })
        ));

        let spec = query
            .bind(&[Arg::value(vec!["active", "pending"])])
            .expect("list should bind");
        let criteria = spec.criteria.expect("criteria should exist");
        assert_eq!(criteria.kind(), CriteriaKind::In);
    }

    #[test]
    fn empty_in_list_is_a_criteria_shape_error() {
        let query =
            parse("findByStatusIn", &[ArgShape::Collection]).expect("descriptor should parse");

        let err = query
            .bind(&[Arg::Value(Value::List(Vec::new()))])
            .expect_err("empty list should fail");

        assert_eq!(err.class(), ErrorClass::InvalidCriteriaShape);
    }

    #[test]
    fn unsupported_modifier_fails_at_parse() {
        let err = parse("findByAgeIsNullIgnoreCase", &[]).expect_err("modifier should fail");

        assert_eq!(err.class(), ErrorClass::UnsupportedOperatorCombination);
    }

    #[test]
    fn trailing_sort_and_page_flow_into_spec() {
        let query = parse(
            "findFirst5ByAgeGreaterThanOrderByNameDesc",
            &[ArgShape::Scalar, ArgShape::Sort, ArgShape::Page],
        )
        .expect("descriptor should parse");
        let page = PageRequest::first(20).expect("page should build");

        let spec = query
            .bind(&[
                Arg::value(30),
                Arg::sort(SortSpec::asc("age").then("name", crate::query::Direction::Asc)),
                Arg::page(page.clone()),
            ])
            .expect("arguments should bind");

        assert_eq!(spec.action, QueryAction::Find);
        assert_eq!(spec.limit, Some(5));
        assert_eq!(spec.page, Some(page));
        let keys: Vec<String> = spec
            .sort
            .keys()
            .iter()
            .map(|key| key.property.to_string())
            .collect();
        assert_eq!(keys, vec!["name", "age"]);
    }

    #[test]
    fn misplaced_page_argument_is_rejected() {
        let query = parse("findByName", &[ArgShape::Scalar, ArgShape::Page])
            .expect("descriptor should parse");

        let err = query
            .bind(&[Arg::value("ada"), Arg::sort(SortSpec::asc("name"))])
            .expect_err("sort in page slot should fail");

        assert!(matches!(
            err,
            QueryError::Bind(BindError::ArgumentShape {
                position: 1,
                expected: ArgShape::Page,
                found: ArgShape::Sort,
                ..
            })
        ));
    }

    #[test]
    fn count_subject_carries_action_and_fingerprint() {
        let query = parse("countByName", &[ArgShape::Scalar]).expect("descriptor should parse");

        let spec = query.bind_one("ada").expect("argument should bind");

        assert_eq!(spec.action, QueryAction::Count);
        assert_eq!(
            query.fingerprint(),
            DescriptorFingerprint::of("countByName", &[ArgShape::Scalar])
        );
    }
}

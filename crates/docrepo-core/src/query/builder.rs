use crate::{
    model::PropertyPath,
    query::criteria::{Criteria, CriteriaError, CriteriaKind},
    value::{GeoPoint, Value},
};

/// Start a programmatic predicate on `path`.
#[must_use]
pub fn field(path: impl Into<PropertyPath>) -> Field {
    Field::new(path)
}

///
/// Field
///
/// Property handle used to build criteria leaves without a descriptor.
/// Every constructor returns the leaf's shape check result directly.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Field(PropertyPath);

impl Field {
    #[must_use]
    pub fn new(path: impl Into<PropertyPath>) -> Self {
        Self(path.into())
    }

    #[must_use]
    pub const fn path(&self) -> &PropertyPath {
        &self.0
    }

    fn leaf(&self, kind: CriteriaKind, values: Vec<Value>) -> Result<Criteria, CriteriaError> {
        Criteria::leaf(kind, self.0.clone(), values)
    }

    // ------------------------------------------------------------------
    // Comparison
    // ------------------------------------------------------------------

    pub fn eq(&self, value: impl Into<Value>) -> Result<Criteria, CriteriaError> {
        self.leaf(CriteriaKind::Equal, vec![value.into()])
    }

    /// Case-insensitive text equality.
    pub fn eq_ci(&self, value: impl Into<Value>) -> Result<Criteria, CriteriaError> {
        self.eq(value)?.ignoring_case()
    }

    pub fn ne(&self, value: impl Into<Value>) -> Result<Criteria, CriteriaError> {
        self.eq(value)?.negate()
    }

    pub fn lt(&self, value: impl Into<Value>) -> Result<Criteria, CriteriaError> {
        self.leaf(CriteriaKind::LessThan, vec![value.into()])
    }

    pub fn lte(&self, value: impl Into<Value>) -> Result<Criteria, CriteriaError> {
        self.leaf(CriteriaKind::LessThanEqual, vec![value.into()])
    }

    pub fn gt(&self, value: impl Into<Value>) -> Result<Criteria, CriteriaError> {
        self.leaf(CriteriaKind::GreaterThan, vec![value.into()])
    }

    pub fn gte(&self, value: impl Into<Value>) -> Result<Criteria, CriteriaError> {
        self.leaf(CriteriaKind::GreaterThanEqual, vec![value.into()])
    }

    /// Inclusive range.
    pub fn between(
        &self,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Result<Criteria, CriteriaError> {
        self.leaf(CriteriaKind::Between, vec![low.into(), high.into()])
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    pub fn contains(&self, value: impl Into<Value>) -> Result<Criteria, CriteriaError> {
        self.leaf(CriteriaKind::Containing, vec![value.into()])
    }

    pub fn starts_with(&self, value: impl Into<Value>) -> Result<Criteria, CriteriaError> {
        self.leaf(CriteriaKind::StartingWith, vec![value.into()])
    }

    pub fn ends_with(&self, value: impl Into<Value>) -> Result<Criteria, CriteriaError> {
        self.leaf(CriteriaKind::EndingWith, vec![value.into()])
    }

    pub fn like(&self, pattern: impl Into<Value>) -> Result<Criteria, CriteriaError> {
        self.leaf(CriteriaKind::Like, vec![pattern.into()])
    }

    pub fn regex(&self, pattern: impl Into<Value>) -> Result<Criteria, CriteriaError> {
        self.leaf(CriteriaKind::Regex, vec![pattern.into()])
    }

    // ------------------------------------------------------------------
    // Membership / spatial
    // ------------------------------------------------------------------

    pub fn in_list<I, V>(&self, values: I) -> Result<Criteria, CriteriaError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let list = values.into_iter().map(Into::into).collect();
        self.leaf(CriteriaKind::In, vec![Value::List(list)])
    }

    /// Within `distance` of `point`.
    pub fn near(
        &self,
        point: GeoPoint,
        distance: impl Into<Value>,
    ) -> Result<Criteria, CriteriaError> {
        self.leaf(CriteriaKind::Near, vec![Value::Point(point), distance.into()])
    }

    // ------------------------------------------------------------------
    // Unary checks
    // ------------------------------------------------------------------

    pub fn is_null(&self) -> Result<Criteria, CriteriaError> {
        self.leaf(CriteriaKind::IsNull, Vec::new())
    }

    pub fn is_not_null(&self) -> Result<Criteria, CriteriaError> {
        self.is_null()?.negate()
    }

    pub fn is_empty(&self) -> Result<Criteria, CriteriaError> {
        self.leaf(CriteriaKind::IsEmpty, Vec::new())
    }

    pub fn exists(&self) -> Result<Criteria, CriteriaError> {
        self.leaf(CriteriaKind::Exists, Vec::new())
    }

    pub fn is_true(&self) -> Result<Criteria, CriteriaError> {
        self.leaf(CriteriaKind::IsTrue, Vec::new())
    }

    pub fn is_false(&self) -> Result<Criteria, CriteriaError> {
        self.leaf(CriteriaKind::IsFalse, Vec::new())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_matches_direct_leaf_construction() {
        let built = field("age")
            .between(18, 65)
            .expect("between should build");
        let direct = Criteria::leaf(
            CriteriaKind::Between,
            "age",
            vec![Value::from(18), Value::from(65)],
        )
        .expect("between should build");

        assert_eq!(built, direct);
    }

    #[test]
    fn modifier_helpers_set_flags() {
        let ne = field("name").ne("x").expect("ne should build");
        assert!(ne.is_negated());
        assert!(!ne.is_ignore_case());

        let ci = field("name").eq_ci("x").expect("eq_ci should build");
        assert!(ci.is_ignore_case());
        assert!(!ci.is_negated());
    }

    #[test]
    fn empty_in_list_is_a_shape_error() {
        let err = field("status")
            .in_list(Vec::<&str>::new())
            .expect_err("empty list should fail");

        assert!(matches!(err, CriteriaError::EmptyCollection { .. }));
    }

    #[test]
    fn builder_trees_compose_with_operators() {
        let tree = field("a").eq(1).expect("leaf should build")
            & (field("b").is_null().expect("leaf should build")
                | field("c").is_true().expect("leaf should build"));

        assert_eq!(tree.to_string(), "AND(a=?,OR(b:IsNull,c:IsTrue))");
    }
}

//! Clause folding.
//!
//! Clauses fold strictly left to right with no precedence rebalancing:
//! `A And B Or C` becomes `OR(AND(A, B), C)`, exactly as written.

use crate::{
    query::{
        criteria::{Criteria, CriteriaError, LeafCriteria, LogicalOp},
        descriptor::{Conjunction, PredicateClause},
    },
    value::Value,
};

///
/// BoundClause
///
/// A parsed clause paired with the concrete values of its argument slots.
///

#[derive(Clone, Debug)]
pub struct BoundClause<'a> {
    pub clause: &'a PredicateClause,
    pub values: Vec<Value>,
}

impl<'a> BoundClause<'a> {
    #[must_use]
    pub const fn new(clause: &'a PredicateClause, values: Vec<Value>) -> Self {
        Self { clause, values }
    }

    fn into_leaf(self) -> Result<Criteria, CriteriaError> {
        let clause = self.clause;
        let leaf = LeafCriteria::new(clause.kind, clause.property.clone(), self.values)?
            .with_modifiers(clause.negated, clause.ignore_case);

        Ok(Criteria::Leaf(leaf))
    }
}

/// Fold bound clauses into one tree; `None` when there are no clauses.
///
/// Each step is `acc = Combinator(previous.conjunction, acc, next_leaf)`.
/// Only the last clause may be `Terminal`, and it must be.
pub fn assemble<'a, I>(clauses: I) -> Result<Option<Criteria>, CriteriaError>
where
    I: IntoIterator<Item = BoundClause<'a>>,
{
    let mut acc: Option<(Criteria, Conjunction)> = None;

    for (position, bound) in clauses.into_iter().enumerate() {
        let conjunction = bound.clause.conjunction;
        let leaf = bound.into_leaf()?;

        let tree = match acc {
            None => leaf,
            Some((tree, Conjunction::And)) => Criteria::combine(LogicalOp::And, tree, leaf),
            Some((tree, Conjunction::Or)) => Criteria::combine(LogicalOp::Or, tree, leaf),
            Some((_, Conjunction::Terminal)) => {
                return Err(CriteriaError::ClauseSequence { position });
            }
        };
        acc = Some((tree, conjunction));
    }

    match acc {
        None => Ok(None),
        Some((tree, Conjunction::Terminal)) => Ok(Some(tree)),
        Some((tree, _)) => Err(CriteriaError::ClauseSequence {
            position: tree.leaves().len(),
        }),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::criteria::CriteriaKind;
    use proptest::prelude::*;

    fn clause(property: &str, conjunction: Conjunction) -> PredicateClause {
        PredicateClause {
            property: property.into(),
            kind: CriteriaKind::Equal,
            negated: false,
            ignore_case: false,
            conjunction,
            arguments: 0..1,
        }
    }

    fn bind(clauses: &[PredicateClause]) -> Vec<BoundClause<'_>> {
        clauses
            .iter()
            .map(|c| BoundClause::new(c, vec![Value::from(c.property.as_str())]))
            .collect()
    }

    #[test]
    fn and_then_or_folds_left() {
        let clauses = [
            clause("name", Conjunction::And),
            clause("email", Conjunction::Or),
            clause("address", Conjunction::Terminal),
        ];

        let tree = assemble(bind(&clauses))
            .expect("assembly should succeed")
            .expect("tree should exist");

        assert_eq!(tree.to_string(), "OR(AND(name=?,email=?),address=?)");
    }

    #[test]
    fn or_then_and_is_not_rebalanced() {
        let clauses = [
            clause("a", Conjunction::Or),
            clause("b", Conjunction::And),
            clause("c", Conjunction::Terminal),
        ];

        let tree = assemble(bind(&clauses))
            .expect("assembly should succeed")
            .expect("tree should exist");

        assert_eq!(tree.to_string(), "AND(OR(a=?,b=?),c=?)");
    }

    #[test]
    fn single_clause_is_a_bare_leaf() {
        let clauses = [clause("name", Conjunction::Terminal)];

        let tree = assemble(bind(&clauses))
            .expect("assembly should succeed")
            .expect("tree should exist");

        assert!(matches!(tree, Criteria::Leaf(_)));
    }

    #[test]
    fn no_clauses_yield_no_criteria() {
        let tree = assemble(Vec::new()).expect("empty assembly should succeed");

        assert_eq!(tree, None);
    }

    #[test]
    fn misplaced_terminal_is_rejected() {
        let clauses = [
            clause("a", Conjunction::Terminal),
            clause("b", Conjunction::Terminal),
        ];

        let err = assemble(bind(&clauses)).expect_err("early terminal should fail");
        assert_eq!(err, CriteriaError::ClauseSequence { position: 1 });

        let clauses = [clause("a", Conjunction::And)];
        let err = assemble(bind(&clauses)).expect_err("missing terminal should fail");
        assert_eq!(err, CriteriaError::ClauseSequence { position: 1 });
    }

    #[test]
    fn clause_values_must_match_arity() {
        let mut between = clause("age", Conjunction::Terminal);
        between.kind = CriteriaKind::Between;

        let err = assemble([BoundClause::new(&between, vec![Value::from(1)])])
            .expect_err("between with one value should fail");

        assert!(matches!(err, CriteriaError::ValueCountMismatch { .. }));
    }

    proptest! {
        #[test]
        fn fold_is_left_deep_with_clause_order_preserved(
            ops in proptest::collection::vec(any::<bool>(), 0..10)
        ) {
            let mut clauses: Vec<PredicateClause> = ops
                .iter()
                .enumerate()
                .map(|(i, is_and)| {
                    let conj = if *is_and { Conjunction::And } else { Conjunction::Or };
                    clause(&format!("p{i}"), conj)
                })
                .collect();
            clauses.push(clause(&format!("p{}", ops.len()), Conjunction::Terminal));

            let tree = assemble(bind(&clauses))
                .expect("assembly should succeed")
                .expect("tree should exist");

            // Every right child is a leaf; depth grows by one per clause.
            let mut node = &tree;
            for is_and in ops.iter().rev() {
                let expected = if *is_and { CriteriaKind::And } else { CriteriaKind::Or };
                prop_assert_eq!(node.kind(), expected);
                prop_assert!(matches!(node.children()[1], Criteria::Leaf(_)));
                node = &node.children()[0];
            }
            prop_assert!(matches!(node, Criteria::Leaf(_)));

            let order: Vec<String> = tree
                .leaves()
                .into_iter()
                .map(|leaf| leaf.subject().to_string())
                .collect();
            let expected: Vec<String> = (0..=ops.len()).map(|i| format!("p{i}")).collect();
            prop_assert_eq!(order, expected);
        }
    }
}

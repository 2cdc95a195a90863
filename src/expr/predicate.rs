//! Predicate abstraction: atomic filter conditions and AND-composition.
//!
//! A [`Predicate`] is an immutable atomic condition. It knows the set of
//! base relations (effective table names) it reads from and classifies
//! itself as a value predicate (one relation) or a join predicate (two or
//! more). Compound conditions are a [`FilterExpr`] tree of AND nodes that
//! flattens into a deterministic sequence of atomic predicates; the plan
//! tree only ever holds single-predicate filter nodes.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::value::Value;

/// A fully-qualified column reference: `table.column`.
///
/// `table` is the effective name of a FROM-clause entry (alias when
/// present), never the underlying schema name of an aliased table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    /// Create a qualified column reference.
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComparisonOp::Eq => "eq",
            ComparisonOp::Neq => "neq",
            ComparisonOp::Lt => "lt",
            ComparisonOp::Lte => "lte",
            ComparisonOp::Gt => "gt",
            ComparisonOp::Gte => "gte",
        };
        write!(f, "{}", s)
    }
}

/// The right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Another column (join predicate candidate).
    Column(ColumnRef),
    /// A literal value.
    Literal(Value),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Column(col) => write!(f, "{}", col),
            Operand::Literal(value) => write!(f, "{}", value),
        }
    }
}

/// An immutable atomic filter condition.
///
/// Two predicates with equal content are still distinct nodes for
/// tree-rewriting bookkeeping; share one via [`Arc`] instead of
/// constructing it twice.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    left: ColumnRef,
    op: ComparisonOp,
    right: Operand,
    tables: BTreeSet<String>,
}

impl Predicate {
    /// A value predicate: column compared against a literal.
    pub fn value(left: ColumnRef, op: ComparisonOp, literal: impl Into<Value>) -> Arc<Self> {
        let mut tables = BTreeSet::new();
        tables.insert(left.table.clone());
        Arc::new(Self {
            left,
            op,
            right: Operand::Literal(literal.into()),
            tables,
        })
    }

    /// A column-vs-column predicate. Classified as a join predicate when
    /// the two columns belong to different relations.
    pub fn join(left: ColumnRef, op: ComparisonOp, right: ColumnRef) -> Arc<Self> {
        let mut tables = BTreeSet::new();
        tables.insert(left.table.clone());
        tables.insert(right.table.clone());
        Arc::new(Self {
            left,
            op,
            right: Operand::Column(right),
            tables,
        })
    }

    /// The set of relations this predicate reads from, computed once at
    /// construction.
    pub fn referenced_tables(&self) -> &BTreeSet<String> {
        &self.tables
    }

    /// True when the predicate spans more than one relation.
    pub fn is_join_predicate(&self) -> bool {
        self.tables.len() > 1
    }

    /// Left-hand column.
    pub fn left(&self) -> &ColumnRef {
        &self.left
    }

    /// Comparison operator.
    pub fn op(&self) -> ComparisonOp {
        self.op
    }

    /// Right-hand operand.
    pub fn right(&self) -> &Operand {
        &self.right
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_join_predicate() {
            "join_pred"
        } else {
            "value_pred"
        };
        write!(f, "{}({} {} {})", kind, self.left, self.op, self.right)
    }
}

/// A compound filter condition: an AND tree over atomic predicates.
#[derive(Debug, Clone)]
pub enum FilterExpr {
    /// A single atomic predicate.
    Pred(Arc<Predicate>),
    /// Conjunction of sub-expressions.
    And(Vec<FilterExpr>),
}

impl FilterExpr {
    /// Conjunction of the given expressions.
    pub fn and(exprs: Vec<FilterExpr>) -> Self {
        FilterExpr::And(exprs)
    }

    /// Flatten nested conjunctions into the ordered list of atomic
    /// predicates whose AND is equivalent to this expression.
    ///
    /// Depth-first, left-to-right: the order is deterministic so plans
    /// are reproducible.
    pub fn conjuncts(&self) -> Vec<Arc<Predicate>> {
        let mut out = Vec::new();
        self.collect_conjuncts(&mut out);
        out
    }

    fn collect_conjuncts(&self, out: &mut Vec<Arc<Predicate>>) {
        match self {
            FilterExpr::Pred(pred) => out.push(Arc::clone(pred)),
            FilterExpr::And(exprs) => {
                for expr in exprs {
                    expr.collect_conjuncts(out);
                }
            }
        }
    }
}

impl From<Arc<Predicate>> for FilterExpr {
    fn from(pred: Arc<Predicate>) -> Self {
        FilterExpr::Pred(pred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(table: &str, column: &str) -> ColumnRef {
        ColumnRef::new(table, column)
    }

    #[test]
    fn test_value_predicate() {
        let pred = Predicate::value(col("Employee", "salary"), ComparisonOp::Gt, 1000i64);

        assert!(!pred.is_join_predicate());
        assert_eq!(pred.referenced_tables().len(), 1);
        assert!(pred.referenced_tables().contains("Employee"));
        assert_eq!(pred.to_string(), "value_pred(Employee.salary gt 1000)");
    }

    #[test]
    fn test_join_predicate() {
        let pred = Predicate::join(
            col("Employee", "jobId"),
            ComparisonOp::Eq,
            col("Job", "id"),
        );

        assert!(pred.is_join_predicate());
        assert_eq!(pred.referenced_tables().len(), 2);
        assert_eq!(pred.to_string(), "join_pred(Employee.jobId eq Job.id)");
    }

    #[test]
    fn test_self_comparison_is_value_predicate() {
        // Both columns on the same relation: one referenced table.
        let pred = Predicate::join(
            col("Job", "minSalary"),
            ComparisonOp::Lt,
            col("Job", "maxSalary"),
        );

        assert!(!pred.is_join_predicate());
        assert_eq!(pred.to_string(), "value_pred(Job.minSalary lt Job.maxSalary)");
    }

    #[test]
    fn test_aliased_tables_are_distinct() {
        // Self-join under aliases: the alias, not the table, decides.
        let pred = Predicate::join(
            col("j1", "maxSalary"),
            ComparisonOp::Eq,
            col("j2", "minSalary"),
        );

        assert!(pred.is_join_predicate());
        assert_eq!(pred.to_string(), "join_pred(j1.maxSalary eq j2.minSalary)");
    }

    #[test]
    fn test_conjuncts_flatten_nested_ands() {
        let p1 = Predicate::value(col("Employee", "salary"), ComparisonOp::Gt, 1000i64);
        let p2 = Predicate::value(col("Job", "minSalary"), ComparisonOp::Gt, 100i64);
        let p3 = Predicate::value(col("Employee", "id"), ComparisonOp::Eq, "empId");

        let expr = FilterExpr::and(vec![
            FilterExpr::Pred(Arc::clone(&p1)),
            FilterExpr::and(vec![
                FilterExpr::Pred(Arc::clone(&p2)),
                FilterExpr::Pred(Arc::clone(&p3)),
            ]),
        ]);

        let conjuncts = expr.conjuncts();
        assert_eq!(conjuncts.len(), 3);
        assert!(Arc::ptr_eq(&conjuncts[0], &p1));
        assert!(Arc::ptr_eq(&conjuncts[1], &p2));
        assert!(Arc::ptr_eq(&conjuncts[2], &p3));
    }

    #[test]
    fn test_single_predicate_conjuncts() {
        let p = Predicate::value(col("Employee", "salary"), ComparisonOp::Gt, 10i64);
        let expr: FilterExpr = Arc::clone(&p).into();

        let conjuncts = expr.conjuncts();
        assert_eq!(conjuncts.len(), 1);
        assert!(Arc::ptr_eq(&conjuncts[0], &p));
    }
}

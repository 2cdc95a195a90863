//! Query context: the read-only description of a query being planned.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::TableRef;
use crate::expr::{ColumnRef, FilterExpr};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "ASC"),
            SortDirection::Descending => write!(f, "DESC"),
        }
    }
}

/// One ORDER BY key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: ColumnRef,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: ColumnRef, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Ascending sort on a column.
    pub fn asc(column: ColumnRef) -> Self {
        Self::new(column, SortDirection::Ascending)
    }

    /// Descending sort on a column.
    pub fn desc(column: ColumnRef) -> Self {
        Self::new(column, SortDirection::Descending)
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.direction)
    }
}

/// The external description of a query: selected relations, filter
/// condition, ordering.
///
/// The optimizer consumes a context to build and validate plan trees;
/// it never mutates one.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// FROM clause, in declaration order.
    pub from: Vec<TableRef>,
    /// WHERE condition, possibly compound.
    pub filter: Option<FilterExpr>,
    /// ORDER BY keys, in declaration order.
    pub order_by: Vec<SortSpec>,
}

impl QueryContext {
    /// Context selecting the given relations, with no filter or ordering.
    pub fn new(from: Vec<TableRef>) -> Self {
        Self {
            from,
            filter: None,
            order_by: Vec::new(),
        }
    }

    /// Set the filter condition.
    pub fn with_filter(mut self, filter: impl Into<FilterExpr>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set the ordering.
    pub fn with_order_by(mut self, order_by: Vec<SortSpec>) -> Self {
        self.order_by = order_by;
        self
    }

    /// Effective names of the selected relations.
    pub fn aliases(&self) -> BTreeSet<&str> {
        self.from.iter().map(|t| t.effective_name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_spec_display() {
        let spec = SortSpec::asc(ColumnRef::new("Employee", "id"));
        assert_eq!(spec.to_string(), "Employee.id ASC");

        let spec = SortSpec::desc(ColumnRef::new("Job", "maxSalary"));
        assert_eq!(spec.to_string(), "Job.maxSalary DESC");
    }

    #[test]
    fn test_aliases_use_effective_names() {
        let ctx = QueryContext::new(vec![
            TableRef::aliased("Job", "j1"),
            TableRef::aliased("Job", "j2"),
            TableRef::new("Employee"),
        ]);

        let aliases = ctx.aliases();
        assert!(aliases.contains("j1"));
        assert!(aliases.contains("j2"));
        assert!(aliases.contains("Employee"));
        assert!(!aliases.contains("Job"));
    }
}

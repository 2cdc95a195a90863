//! Filter expressions: literal values, column references, predicates.

mod predicate;
mod value;

pub use predicate::{ColumnRef, ComparisonOp, FilterExpr, Operand, Predicate};
pub use value::Value;

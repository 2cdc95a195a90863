//! relplan - Logical query-plan optimization for an embedded relational
//! query engine.
//!
//! This crate rewrites logical plan trees into equivalent but cheaper
//! forms before execution. Plans are strict trees of table accesses,
//! cross products, selections, and order-by nodes; the flagship rewrite
//! is selection push-down, which relocates each filter as close as
//! possible to the table scan it constrains without changing the query's
//! result set or the positional join order.
//!
//! # Example
//!
//! ```no_run
//! use relplan::catalog::{Catalog, ColumnDef, DataType, TableRef, TableSchema};
//! use relplan::expr::{ColumnRef, ComparisonOp, Predicate};
//! use relplan::planner::{Optimizer, PlanBuilder, QueryContext};
//!
//! let catalog = Catalog::new();
//! catalog
//!     .register(TableSchema::new(
//!         "Employee",
//!         vec![ColumnDef::new("salary", DataType::Integer)],
//!     ))
//!     .unwrap();
//! catalog
//!     .register(TableSchema::new(
//!         "Job",
//!         vec![ColumnDef::new("id", DataType::Text)],
//!     ))
//!     .unwrap();
//!
//! let pred = Predicate::value(
//!     ColumnRef::new("Employee", "salary"),
//!     ComparisonOp::Gt,
//!     1000i64,
//! );
//! let ctx = QueryContext::new(vec![TableRef::new("Employee"), TableRef::new("Job")])
//!     .with_filter(pred);
//!
//! let plan = PlanBuilder::new(catalog).build(&ctx).unwrap();
//! let optimized = Optimizer::new().optimize(plan, &ctx).unwrap();
//! println!("{}", optimized.render());
//! ```

pub mod catalog;
pub mod expr;
pub mod planner;

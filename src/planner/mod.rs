//! Logical planning and plan-tree optimization.
//!
//! This module owns the plan node model, the construction of initial
//! trees from query contexts, and the rewrite-pass pipeline that
//! optimizes trees before execution.

mod builder;
mod context;
mod error;
mod node;
mod optimizer;
mod pushdown;

pub use builder::PlanBuilder;
pub use context::{QueryContext, SortDirection, SortSpec};
pub use error::{PlanError, PlanResult};
pub use node::PlanNode;
pub use optimizer::{Optimizer, RewritePass};
pub use pushdown::SelectionPushDown;

//! Rewrite pass interface and the optimization pipeline.
//!
//! A pass takes a plan tree plus its query context and returns a
//! semantically equivalent (possibly identical) tree. Passes are composed
//! by sequential application and must terminate on any finite input.

use log::debug;

use super::context::QueryContext;
use super::error::PlanResult;
use super::node::PlanNode;
use super::pushdown::SelectionPushDown;

/// A single plan-tree rewrite.
///
/// Implementations must preserve the query's result set, preserve the
/// left-to-right order of cross-product children, and terminate in a
/// finite number of steps.
pub trait RewritePass {
    /// Name of the pass, for diagnostics.
    fn name(&self) -> &str;

    /// Rewrite the tree, consuming it.
    fn apply(&self, root: PlanNode, context: &QueryContext) -> PlanResult<PlanNode>;
}

/// The logical plan optimizer: an ordered pipeline of rewrite passes.
pub struct Optimizer {
    passes: Vec<Box<dyn RewritePass>>,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Optimizer {
    /// Optimizer with the default pass pipeline.
    pub fn new() -> Self {
        Self {
            passes: vec![Box::new(SelectionPushDown)],
        }
    }

    /// Optimizer with no passes.
    pub fn empty() -> Self {
        Self { passes: Vec::new() }
    }

    /// Append a pass to the pipeline.
    pub fn add_pass(&mut self, pass: Box<dyn RewritePass>) {
        self.passes.push(pass);
    }

    /// Run every pass over the tree, in order.
    ///
    /// The input tree is validated first; malformed input aborts
    /// optimization instead of producing a silently-wrong plan.
    pub fn optimize(&self, root: PlanNode, context: &QueryContext) -> PlanResult<PlanNode> {
        root.validate()?;

        let mut current = root;
        for pass in &self.passes {
            debug!("applying rewrite pass {}", pass.name());
            current = pass.apply(current, context)?;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TableRef;
    use crate::expr::{ColumnRef, ComparisonOp, Predicate};
    use crate::planner::error::PlanError;

    fn two_table_context() -> QueryContext {
        QueryContext::new(vec![TableRef::new("Employee"), TableRef::new("Job")])
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let cross = PlanNode::cross_product(vec![
            PlanNode::table_access(TableRef::new("Employee")),
            PlanNode::table_access(TableRef::new("Job")),
        ])
        .unwrap();
        let before = cross.render();

        let optimizer = Optimizer::empty();
        let after = optimizer.optimize(cross, &two_table_context()).unwrap();

        assert_eq!(after.render(), before);
    }

    #[test]
    fn test_default_pipeline_pushes_selections() {
        let pred = Predicate::value(
            ColumnRef::new("Employee", "salary"),
            ComparisonOp::Gt,
            10i64,
        );
        let cross = PlanNode::cross_product(vec![
            PlanNode::table_access(TableRef::new("Employee")),
            PlanNode::table_access(TableRef::new("Job")),
        ])
        .unwrap();
        let root = PlanNode::select(pred, cross);

        let optimizer = Optimizer::new();
        let result = optimizer.optimize(root, &two_table_context()).unwrap();

        assert_eq!(
            result.render(),
            "cross_product\n\
             -select(value_pred(Employee.salary gt 10))\n\
             --table_access(Employee)\n\
             -table_access(Job)\n"
        );
    }

    #[test]
    fn test_malformed_tree_rejected_before_passes() {
        // A selection over a relation its subtree does not produce.
        let pred = Predicate::value(
            ColumnRef::new("Department", "id"),
            ComparisonOp::Eq,
            1i64,
        );
        let root = PlanNode::select(pred, PlanNode::table_access(TableRef::new("Employee")));

        let optimizer = Optimizer::new();
        let result = optimizer.optimize(root, &two_table_context());

        assert!(matches!(result, Err(PlanError::UnknownAlias(_))));
    }

    #[test]
    fn test_custom_pass_runs_after_defaults() {
        struct CountLeaves(std::sync::atomic::AtomicUsize);

        impl RewritePass for CountLeaves {
            fn name(&self) -> &str {
                "CountLeaves"
            }

            fn apply(&self, root: PlanNode, _ctx: &QueryContext) -> PlanResult<PlanNode> {
                self.0.store(
                    root.leaf_tables().len(),
                    std::sync::atomic::Ordering::Relaxed,
                );
                Ok(root)
            }
        }

        let counter = std::sync::Arc::new(CountLeaves(std::sync::atomic::AtomicUsize::new(0)));

        struct Shared(std::sync::Arc<CountLeaves>);
        impl RewritePass for Shared {
            fn name(&self) -> &str {
                self.0.name()
            }
            fn apply(&self, root: PlanNode, ctx: &QueryContext) -> PlanResult<PlanNode> {
                self.0.apply(root, ctx)
            }
        }

        let mut optimizer = Optimizer::new();
        optimizer.add_pass(Box::new(Shared(std::sync::Arc::clone(&counter))));

        let cross = PlanNode::cross_product(vec![
            PlanNode::table_access(TableRef::new("Employee")),
            PlanNode::table_access(TableRef::new("Job")),
        ])
        .unwrap();
        optimizer.optimize(cross, &two_table_context()).unwrap();

        assert_eq!(counter.0.load(std::sync::atomic::Ordering::Relaxed), 2);
    }
}

//! Selection push-down: relocate filters toward the table scans they
//! constrain.
//!
//! Moving a selection below a cross product shrinks the intermediate
//! result the product has to build. A relocation is legal only when the
//! target branch produces every relation the predicate references, so a
//! value predicate descends all the way to its scan while a join
//! predicate stops at the lowest cross product that still covers its
//! table set. Cross-product child order is never altered, and a filter
//! never crosses an order-by boundary.
//!
//! The pass reaches its fixpoint in a single traversal: each maximal
//! chain of stacked selections is peeled off, the subtree beneath it is
//! rewritten first, and the peeled predicates are then sunk one at a
//! time, deepest first. Predicates that cannot descend are re-stacked in
//! their original relative order, so two filters over the same relation
//! never oscillate by swapping with each other.

use std::collections::BTreeSet;
use std::sync::Arc;

use log::{debug, trace};

use super::context::QueryContext;
use super::error::{PlanError, PlanResult};
use super::node::PlanNode;
use super::optimizer::RewritePass;
use crate::expr::Predicate;

/// The selection push-down rewrite pass.
pub struct SelectionPushDown;

impl RewritePass for SelectionPushDown {
    fn name(&self) -> &str {
        "SelectionPushDown"
    }

    fn apply(&self, root: PlanNode, context: &QueryContext) -> PlanResult<PlanNode> {
        root.validate()?;
        check_context(&root, context)?;

        let mut relocations = 0usize;
        let rewritten = push_down(root, &mut relocations);
        debug!("selection push-down performed {} relocation(s)", relocations);
        Ok(rewritten)
    }
}

/// Verify that every selection predicate only references relations the
/// query context actually selects. A stray alias means the caller handed
/// us a predicate for a table missing from the FROM list.
fn check_context(root: &PlanNode, context: &QueryContext) -> PlanResult<()> {
    fn walk(node: &PlanNode, aliases: &BTreeSet<&str>) -> PlanResult<()> {
        if let PlanNode::Select { predicate, .. } = node {
            for table in predicate.referenced_tables() {
                if !aliases.contains(table.as_str()) {
                    return Err(PlanError::UnknownAlias(table.clone()));
                }
            }
        }
        for child in node.children() {
            walk(child, aliases)?;
        }
        Ok(())
    }

    walk(root, &context.aliases())
}

/// Outcome of trying to sink one predicate into a subtree.
enum Sink {
    /// The predicate descended past at least one cross product; the
    /// returned tree contains it at its final position.
    Moved(PlanNode),
    /// No legal descent; the predicate is handed back along with the
    /// (possibly internally rewritten) subtree.
    Stuck(Arc<Predicate>, PlanNode),
}

/// Rewrite a subtree to its push-down fixpoint.
fn push_down(node: PlanNode, relocations: &mut usize) -> PlanNode {
    match node {
        select @ PlanNode::Select { .. } => {
            let (preds, base) = peel_selects(select);
            let mut current = push_down(base, relocations);

            // Deepest predicate first: a predicate never leapfrogs one
            // that started below it on the same branch, and blocked
            // predicates re-stack in their original relative order.
            let mut blocked = Vec::new();
            for pred in preds.into_iter().rev() {
                match sink(pred, current, relocations) {
                    Sink::Moved(tree) => current = tree,
                    Sink::Stuck(pred, tree) => {
                        current = tree;
                        blocked.push(pred);
                    }
                }
            }
            for pred in blocked {
                current = PlanNode::select(pred, current);
            }
            current
        }
        PlanNode::OrderBy { keys, child } => PlanNode::OrderBy {
            keys,
            child: Box::new(push_down(*child, relocations)),
        },
        PlanNode::CrossProduct { children } => PlanNode::CrossProduct {
            children: children
                .into_iter()
                .map(|c| push_down(c, relocations))
                .collect(),
        },
        leaf @ PlanNode::TableAccess { .. } => leaf,
    }
}

/// Detach the maximal chain of consecutive selections, top to bottom.
fn peel_selects(node: PlanNode) -> (Vec<Arc<Predicate>>, PlanNode) {
    let mut preds = Vec::new();
    let mut current = node;
    while let PlanNode::Select { predicate, child } = current {
        preds.push(predicate);
        current = *child;
    }
    (preds, current)
}

/// Try to sink one predicate as deep into `node` as legality allows.
///
/// Descent happens at a cross product whose single covering child
/// produces every referenced relation (sibling table-sets are disjoint,
/// so at most one child qualifies). An existing selection is passed
/// through only when the predicate keeps descending below it; otherwise
/// the swap would be no improvement and is not performed. Table accesses
/// and order-by nodes stop the descent.
fn sink(pred: Arc<Predicate>, node: PlanNode, relocations: &mut usize) -> Sink {
    match node {
        PlanNode::CrossProduct { mut children } => {
            let target = children.iter().position(|child| {
                let produced = child.produced_tables();
                pred.referenced_tables()
                    .iter()
                    .all(|t| produced.contains(t.as_str()))
            });

            match target {
                Some(index) => {
                    trace!("pushing {} into cross-product child {}", pred, index);
                    *relocations += 1;

                    let child = children.remove(index);
                    let new_child = match sink(pred, child, relocations) {
                        Sink::Moved(tree) => tree,
                        Sink::Stuck(pred, tree) => PlanNode::select(pred, tree),
                    };
                    children.insert(index, new_child);
                    Sink::Moved(PlanNode::CrossProduct { children })
                }
                None => Sink::Stuck(pred, PlanNode::CrossProduct { children }),
            }
        }
        PlanNode::Select { predicate, child } => match sink(pred, *child, relocations) {
            Sink::Moved(tree) => Sink::Moved(PlanNode::Select {
                predicate,
                child: Box::new(tree),
            }),
            Sink::Stuck(pred, tree) => Sink::Stuck(
                pred,
                PlanNode::Select {
                    predicate,
                    child: Box::new(tree),
                },
            ),
        },
        stop @ (PlanNode::TableAccess { .. } | PlanNode::OrderBy { .. }) => {
            Sink::Stuck(pred, stop)
        }
    }
}

//! Logical plan tree representation.
//!
//! A plan is a strict tree of owned nodes: every child has exactly one
//! parent, and structural edits go through [`PlanNode::replace_child`],
//! which swaps a single child in place and never perturbs sibling order.
//! Cross-product child order is semantically significant (positional join
//! order) and must survive every rewrite.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::context::SortSpec;
use super::error::{PlanError, PlanResult};
use crate::catalog::TableRef;
use crate::expr::Predicate;

/// A node of the logical plan tree.
///
/// Closed set of operator kinds; rewrite passes match exhaustively, so a
/// new kind forces every dispatch site to be revisited.
#[derive(Debug, Clone)]
pub enum PlanNode {
    /// Scan of one base relation. Leaf.
    TableAccess { table: TableRef },

    /// Positional combination of two or more inputs (join without, or
    /// prior to attaching, a predicate). Child order is load-bearing.
    CrossProduct { children: Vec<PlanNode> },

    /// Selection: evaluates one atomic predicate against its input.
    Select {
        predicate: Arc<Predicate>,
        child: Box<PlanNode>,
    },

    /// Ordering of the input rows.
    OrderBy {
        keys: Vec<SortSpec>,
        child: Box<PlanNode>,
    },
}

impl PlanNode {
    /// Leaf scan of a base relation.
    pub fn table_access(table: TableRef) -> Self {
        PlanNode::TableAccess { table }
    }

    /// Cross product of two or more inputs.
    pub fn cross_product(children: Vec<PlanNode>) -> PlanResult<Self> {
        if children.len() < 2 {
            return Err(PlanError::MalformedPlan(format!(
                "cross product requires at least 2 children, got {}",
                children.len()
            )));
        }
        Ok(PlanNode::CrossProduct { children })
    }

    /// Selection wrapping a child.
    pub fn select(predicate: Arc<Predicate>, child: PlanNode) -> Self {
        PlanNode::Select {
            predicate,
            child: Box::new(child),
        }
    }

    /// Order-by wrapping a child.
    pub fn order_by(keys: Vec<SortSpec>, child: PlanNode) -> Self {
        PlanNode::OrderBy {
            keys,
            child: Box::new(child),
        }
    }

    /// Ordered view of this node's children.
    pub fn children(&self) -> Vec<&PlanNode> {
        match self {
            PlanNode::TableAccess { .. } => Vec::new(),
            PlanNode::CrossProduct { children } => children.iter().collect(),
            PlanNode::Select { child, .. } | PlanNode::OrderBy { child, .. } => {
                vec![child.as_ref()]
            }
        }
    }

    /// Append a child, preserving the order of existing children.
    ///
    /// Only cross products grow children; other kinds have a fixed arity.
    pub fn add_child(&mut self, node: PlanNode) -> PlanResult<()> {
        match self {
            PlanNode::CrossProduct { children } => {
                children.push(node);
                Ok(())
            }
            other => Err(PlanError::MalformedPlan(format!(
                "cannot add a child to a {} node",
                other.kind_name()
            ))),
        }
    }

    /// Swap the child at `index` for `new`, returning the old child.
    ///
    /// All sibling positions are preserved. This is the sole structural
    /// edit primitive used by rewrite passes.
    pub fn replace_child(&mut self, index: usize, new: PlanNode) -> PlanResult<PlanNode> {
        match self {
            PlanNode::CrossProduct { children } => {
                if index >= children.len() {
                    return Err(PlanError::Internal(format!(
                        "replace_child index {} out of bounds ({} children)",
                        index,
                        children.len()
                    )));
                }
                Ok(std::mem::replace(&mut children[index], new))
            }
            PlanNode::Select { child, .. } | PlanNode::OrderBy { child, .. } => {
                if index != 0 {
                    return Err(PlanError::Internal(format!(
                        "replace_child index {} out of bounds (1 child)",
                        index
                    )));
                }
                Ok(std::mem::replace(child.as_mut(), new))
            }
            PlanNode::TableAccess { .. } => Err(PlanError::Internal(
                "replace_child on a leaf node".to_string(),
            )),
        }
    }

    /// The set of relations this subtree produces rows from: the union of
    /// the children's table-sets, with a table access producing exactly
    /// its own effective name. Recomputed bottom-up on demand.
    pub fn produced_tables(&self) -> BTreeSet<&str> {
        match self {
            PlanNode::TableAccess { table } => {
                let mut set = BTreeSet::new();
                set.insert(table.effective_name());
                set
            }
            PlanNode::CrossProduct { children } => children
                .iter()
                .flat_map(|c| c.produced_tables())
                .collect(),
            PlanNode::Select { child, .. } | PlanNode::OrderBy { child, .. } => {
                child.produced_tables()
            }
        }
    }

    /// Effective names of all table-access leaves, flattened left to
    /// right. Join-order diagnostics: this sequence must be identical
    /// before and after any rewrite pass.
    pub fn leaf_tables(&self) -> Vec<&str> {
        match self {
            PlanNode::TableAccess { table } => vec![table.effective_name()],
            PlanNode::CrossProduct { children } => {
                children.iter().flat_map(|c| c.leaf_tables()).collect()
            }
            PlanNode::Select { child, .. } | PlanNode::OrderBy { child, .. } => {
                child.leaf_tables()
            }
        }
    }

    /// Check the tree's structural contract:
    ///
    /// - every cross product has at least two children;
    /// - every selection predicate references at least one relation, all
    ///   of which its subtree produces.
    pub fn validate(&self) -> PlanResult<()> {
        match self {
            PlanNode::TableAccess { .. } => Ok(()),
            PlanNode::CrossProduct { children } => {
                if children.len() < 2 {
                    return Err(PlanError::MalformedPlan(format!(
                        "cross product requires at least 2 children, got {}",
                        children.len()
                    )));
                }
                for child in children {
                    child.validate()?;
                }
                Ok(())
            }
            PlanNode::Select { predicate, child } => {
                let referenced = predicate.referenced_tables();
                if referenced.is_empty() {
                    return Err(PlanError::MalformedPlan(format!(
                        "predicate {} references no relations",
                        predicate
                    )));
                }
                let produced = child.produced_tables();
                for table in referenced {
                    if !produced.contains(table.as_str()) {
                        return Err(PlanError::UnknownAlias(table.clone()));
                    }
                }
                child.validate()
            }
            PlanNode::OrderBy { child, .. } => child.validate(),
        }
    }

    /// Deterministic textual rendering: one node per line, one leading
    /// `-` per depth level.
    ///
    /// Two trees render identically exactly when they are structurally
    /// equal; golden tests assert rewrite shapes against this form.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push('-');
        }
        match self {
            PlanNode::TableAccess { table } => {
                out.push_str(&format!("table_access({})\n", table));
            }
            PlanNode::CrossProduct { children } => {
                out.push_str("cross_product\n");
                for child in children {
                    child.render_into(out, depth + 1);
                }
            }
            PlanNode::Select { predicate, child } => {
                out.push_str(&format!("select({})\n", predicate));
                child.render_into(out, depth + 1);
            }
            PlanNode::OrderBy { keys, child } => {
                let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
                out.push_str(&format!("order_by({})\n", keys.join(", ")));
                child.render_into(out, depth + 1);
            }
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            PlanNode::TableAccess { .. } => "table_access",
            PlanNode::CrossProduct { .. } => "cross_product",
            PlanNode::Select { .. } => "select",
            PlanNode::OrderBy { .. } => "order_by",
        }
    }
}

impl fmt::Display for PlanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

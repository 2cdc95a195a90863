//! Initial plan construction from a query context.
//!
//! The builder produces the canonical pre-optimization tree: table-access
//! leaves in FROM order under a single cross product, the filter condition
//! decomposed into a stack of single-predicate selection nodes, and an
//! order-by node on top. Rewrite passes take it from there.

use super::context::QueryContext;
use super::error::{PlanError, PlanResult};
use super::node::PlanNode;
use crate::catalog::{Catalog, TableRef};
use crate::expr::{ColumnRef, Operand};

/// Builds and validates initial logical plan trees.
pub struct PlanBuilder {
    catalog: Catalog,
}

impl PlanBuilder {
    /// Create a builder resolving names against the given catalog.
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Build the initial plan tree for a context.
    ///
    /// Fails fast on contract violations: empty FROM, duplicate aliases,
    /// unregistered tables, predicates or sort keys referencing unknown
    /// relations or columns.
    pub fn build(&self, ctx: &QueryContext) -> PlanResult<PlanNode> {
        self.check_from(ctx)?;

        let conjuncts = ctx
            .filter
            .as_ref()
            .map(|f| f.conjuncts())
            .unwrap_or_default();
        for pred in &conjuncts {
            self.check_column(ctx, pred.left())?;
            if let Operand::Column(right) = pred.right() {
                self.check_column(ctx, right)?;
            }
        }
        for key in &ctx.order_by {
            self.check_column(ctx, &key.column)?;
        }

        let mut scans: Vec<PlanNode> = ctx
            .from
            .iter()
            .map(|t| PlanNode::table_access(t.clone()))
            .collect();

        let mut plan = if scans.len() == 1 {
            scans.pop().ok_or_else(|| {
                PlanError::Internal("scan list emptied unexpectedly".to_string())
            })?
        } else {
            PlanNode::cross_product(scans)?
        };

        // Stack conjuncts so the first one ends up outermost.
        for pred in conjuncts.into_iter().rev() {
            plan = PlanNode::select(pred, plan);
        }

        if !ctx.order_by.is_empty() {
            plan = PlanNode::order_by(ctx.order_by.clone(), plan);
        }

        Ok(plan)
    }

    fn check_from(&self, ctx: &QueryContext) -> PlanResult<()> {
        if ctx.from.is_empty() {
            return Err(PlanError::EmptyFrom);
        }

        let mut seen = std::collections::HashSet::new();
        for table in &ctx.from {
            if !self.catalog.contains(&table.name) {
                return Err(PlanError::TableNotFound(table.name.clone()));
            }
            if !seen.insert(table.effective_name()) {
                return Err(PlanError::DuplicateAlias(
                    table.effective_name().to_string(),
                ));
            }
        }
        Ok(())
    }

    fn check_column(&self, ctx: &QueryContext, col: &ColumnRef) -> PlanResult<()> {
        let table = self
            .resolve_alias(ctx, &col.table)
            .ok_or_else(|| PlanError::UnknownAlias(col.table.clone()))?;

        let schema = self
            .catalog
            .get(&table.name)
            .ok_or_else(|| PlanError::TableNotFound(table.name.clone()))?;

        if schema.get_column(&col.column).is_none() {
            return Err(PlanError::ColumnNotFound(col.to_string()));
        }
        Ok(())
    }

    fn resolve_alias<'a>(&self, ctx: &'a QueryContext, alias: &str) -> Option<&'a TableRef> {
        ctx.from.iter().find(|t| t.effective_name() == alias)
    }
}

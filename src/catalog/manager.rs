//! In-memory catalog of table schemas.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::schema::{SchemaError, TableSchema};

/// The catalog manages table schemas for the planner.
///
/// Schemas are registered once and only read during planning and
/// optimization; the lock exists so a catalog can be shared across
/// planner instances, not to support concurrent mutation of a schema
/// a live plan references.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: Arc<RwLock<HashMap<String, Arc<TableSchema>>>>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table schema.
    pub fn register(&self, schema: TableSchema) -> Result<(), SchemaError> {
        schema.validate()?;

        let mut tables = self.tables.write();
        if tables.contains_key(&schema.name) {
            return Err(SchemaError::DuplicateTable(schema.name.clone()));
        }
        tables.insert(schema.name.clone(), Arc::new(schema));
        Ok(())
    }

    /// Get a table schema by name.
    pub fn get(&self, name: &str) -> Option<Arc<TableSchema>> {
        self.tables.read().get(name).cloned()
    }

    /// Check if a table is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    /// Names of all registered tables, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnDef, DataType};

    fn sample_schema(name: &str) -> TableSchema {
        TableSchema::new(name, vec![ColumnDef::new("id", DataType::Text)])
    }

    #[test]
    fn test_register_and_get() {
        let catalog = Catalog::new();
        catalog.register(sample_schema("Employee")).unwrap();

        assert!(catalog.contains("Employee"));
        assert_eq!(catalog.get("Employee").unwrap().name, "Employee");
        assert!(catalog.get("Job").is_none());
    }

    #[test]
    fn test_register_duplicate() {
        let catalog = Catalog::new();
        catalog.register(sample_schema("Employee")).unwrap();

        let result = catalog.register(sample_schema("Employee"));
        assert!(matches!(result, Err(SchemaError::DuplicateTable(_))));
    }

    #[test]
    fn test_table_names_sorted() {
        let catalog = Catalog::new();
        catalog.register(sample_schema("Job")).unwrap();
        catalog.register(sample_schema("Employee")).unwrap();

        assert_eq!(catalog.table_names(), vec!["Employee", "Job"]);
    }
}

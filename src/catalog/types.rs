//! Data types for relation schema definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// SQL-like data types the planner understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Text/string data (VARCHAR in SQL).
    Text,
    /// Integer numbers (BIGINT in SQL).
    Integer,
    /// Floating point numbers (DOUBLE in SQL).
    Float,
    /// Boolean values.
    Boolean,
    /// Timestamps with UTC timezone.
    Timestamp,
}

impl DataType {
    /// Get the SQL name for this type.
    pub fn sql_name(&self) -> &'static str {
        match self {
            DataType::Text => "TEXT",
            DataType::Integer => "INTEGER",
            DataType::Float => "REAL",
            DataType::Boolean => "BOOLEAN",
            DataType::Timestamp => "TIMESTAMP",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql_name())
    }
}

/// Column definition within a table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Data type.
    pub data_type: DataType,
}

impl ColumnDef {
    /// Create a new column definition.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_sql_names() {
        assert_eq!(DataType::Text.to_string(), "TEXT");
        assert_eq!(DataType::Integer.to_string(), "INTEGER");
        assert_eq!(DataType::Timestamp.to_string(), "TIMESTAMP");
    }

    #[test]
    fn test_column_def_display() {
        let col = ColumnDef::new("salary", DataType::Integer);
        assert_eq!(col.to_string(), "salary INTEGER");
    }
}

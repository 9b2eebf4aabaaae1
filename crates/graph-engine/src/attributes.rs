use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute names with dedicated semantics. They are stored like any other
/// column but never show up in generic enumeration.
pub const RESERVED_NAMES: [&str; 4] = ["name", "label", "tableName", "weight"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Numeric(f64),
    Boolean(bool),
    Text(String),
}

impl Value {
    /// Display form used when an attribute stands in for a vertex name.
    pub fn render(&self) -> String {
        match self {
            Value::Numeric(n) if n.fract() == 0.0 && n.is_finite() => format!("{}", *n as i64),
            Value::Numeric(n) => n.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Boolean,
    String,
}

/// One typed column, indexed by vertex or edge ID. `None` marks an absent value.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    Boolean(Vec<Option<bool>>),
    Text(Vec<Option<String>>),
}

impl Column {
    fn empty_like(value: &Value, len: usize) -> Self {
        match value {
            Value::Numeric(_) => Column::Numeric(vec![None; len]),
            Value::Boolean(_) => Column::Boolean(vec![None; len]),
            Value::Text(_) => Column::Text(vec![None; len]),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Numeric(_) => ColumnType::Numeric,
            Column::Boolean(_) => ColumnType::Boolean,
            Column::Text(_) => ColumnType::String,
        }
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            Column::Numeric(v) => v.get(index).copied().flatten().map(Value::Numeric),
            Column::Boolean(v) => v.get(index).copied().flatten().map(Value::Boolean),
            Column::Text(v) => v.get(index).cloned().flatten().map(Value::Text),
        }
    }
}

/// Columnar attribute storage for either the vertices or the edges of a graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeTable {
    len: usize,
    columns: BTreeMap<String, Column>,
}

impl AttributeTable {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            columns: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn has(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn get(&self, name: &str, index: usize) -> Option<Value> {
        self.columns.get(name).and_then(|col| col.get(index))
    }

    /// Installs a complete string column, replacing any previous one.
    pub fn insert_text_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.len {
            return Err(EngineError::validation(format!(
                "Attribute column {name} has {} values, expected {}",
                values.len(),
                self.len
            )));
        }
        self.columns.insert(
            name.to_string(),
            Column::Text(values.into_iter().map(Some).collect()),
        );
        Ok(())
    }

    /// Sets one cell, creating the column with the value's type on first use.
    /// A value whose type disagrees with the existing column is rejected.
    pub fn set(&mut self, name: &str, index: usize, value: Value) -> Result<()> {
        if index >= self.len {
            return Err(EngineError::validation(format!(
                "Attribute {name} set on index {index}, table holds {} entries",
                self.len
            )));
        }

        let len = self.len;
        let column = self
            .columns
            .entry(name.to_string())
            .or_insert_with(|| Column::empty_like(&value, len));

        match (column, value) {
            (Column::Numeric(col), Value::Numeric(n)) => col[index] = Some(n),
            (Column::Boolean(col), Value::Boolean(b)) => col[index] = Some(b),
            (Column::Text(col), Value::Text(s)) => col[index] = Some(s),
            (column, value) => {
                return Err(EngineError::validation(format!(
                    "Attribute {name} mixes {:?} and {:?} values",
                    column.column_type(),
                    Column::empty_like(&value, 0).column_type()
                )));
            }
        }
        Ok(())
    }

    /// Columns without dedicated semantics, in name order.
    pub fn user_columns(&self) -> impl Iterator<Item = (&str, ColumnType)> + '_ {
        self.columns
            .iter()
            .filter(|(name, _)| !RESERVED_NAMES.contains(&name.as_str()))
            .map(|(name, col)| (name.as_str(), col.column_type()))
    }
}

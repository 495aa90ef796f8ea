//! Tabular datasets.
//!
//! A [`Dataset`] is an immutable, row-major table over an ordered list of
//! variables. The value storage is a tagged variant resolved once at
//! construction ([`DatasetValues::Continuous`] or [`DatasetValues::Discrete`]),
//! so callers never re-check the concrete data kind per access.
//!
//! Every transformation (row selection, column subset, concatenation) returns
//! a NEW dataset; the source is never mutated.

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};

use super::node::{Node, NodeType};

/// Kind of values stored in a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Continuous,
    Discrete,
}

/// Row-major value storage.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetValues {
    Continuous(Vec<Vec<f64>>),
    Discrete(Vec<Vec<i64>>),
}

impl DatasetValues {
    fn len(&self) -> usize {
        match self {
            DatasetValues::Continuous(rows) => rows.len(),
            DatasetValues::Discrete(rows) => rows.len(),
        }
    }

    fn kind(&self) -> DataKind {
        match self {
            DatasetValues::Continuous(_) => DataKind::Continuous,
            DatasetValues::Discrete(_) => DataKind::Discrete,
        }
    }

    fn row_widths(&self) -> Vec<usize> {
        match self {
            DatasetValues::Continuous(rows) => rows.iter().map(Vec::len).collect(),
            DatasetValues::Discrete(rows) => rows.iter().map(Vec::len).collect(),
        }
    }

    fn select_rows(&self, indices: &[usize]) -> Self {
        match self {
            DatasetValues::Continuous(rows) => {
                DatasetValues::Continuous(indices.iter().map(|&i| rows[i].clone()).collect())
            }
            DatasetValues::Discrete(rows) => {
                DatasetValues::Discrete(indices.iter().map(|&i| rows[i].clone()).collect())
            }
        }
    }

    fn select_columns(&self, columns: &[usize]) -> Self {
        match self {
            DatasetValues::Continuous(rows) => DatasetValues::Continuous(
                rows.iter()
                    .map(|row| columns.iter().map(|&c| row[c]).collect())
                    .collect(),
            ),
            DatasetValues::Discrete(rows) => DatasetValues::Discrete(
                rows.iter()
                    .map(|row| columns.iter().map(|&c| row[c]).collect())
                    .collect(),
            ),
        }
    }
}

/// Immutable table of observations.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    variables: Vec<Node>,
    values: DatasetValues,
    index: HashMap<String, usize>,
}

impl Dataset {
    /// Build a dataset, validating variable names and row widths.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if there are no variables, a name is repeated, or
    ///   a row width differs from the variable count.
    pub fn new(variables: Vec<Node>, values: DatasetValues) -> CoreResult<Self> {
        if variables.is_empty() {
            return Err(CoreError::validation("variables", "dataset needs at least one variable"));
        }

        let mut index = HashMap::with_capacity(variables.len());
        for (i, node) in variables.iter().enumerate() {
            if index.insert(node.name().to_string(), i).is_some() {
                return Err(CoreError::validation(
                    "variables",
                    format!("duplicate variable name '{}'", node.name()),
                ));
            }
        }

        if let Some((row, width)) = values
            .row_widths()
            .into_iter()
            .enumerate()
            .find(|(_, w)| *w != variables.len())
        {
            return Err(CoreError::validation(
                "rows",
                format!("row {} has {} values, expected {}", row, width, variables.len()),
            ));
        }

        let expected = match values.kind() {
            DataKind::Continuous => NodeType::Continuous,
            DataKind::Discrete => NodeType::Discrete,
        };
        let variables = variables
            .into_iter()
            .map(|n| Node::new(n.name(), expected))
            .collect();

        Ok(Self {
            variables,
            values,
            index,
        })
    }

    /// Continuous dataset from variable names and row-major values.
    pub fn continuous<S: Into<String>>(names: Vec<S>, rows: Vec<Vec<f64>>) -> CoreResult<Self> {
        let variables = names.into_iter().map(Node::continuous).collect();
        Self::new(variables, DatasetValues::Continuous(rows))
    }

    /// Discrete dataset from variable names and row-major category codes.
    pub fn discrete<S: Into<String>>(names: Vec<S>, rows: Vec<Vec<i64>>) -> CoreResult<Self> {
        let variables = names.into_iter().map(Node::discrete).collect();
        Self::new(variables, DatasetValues::Discrete(rows))
    }

    pub fn variables(&self) -> &[Node] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&Node> {
        self.index.get(name).map(|&i| &self.variables[i])
    }

    pub fn column_index(&self, node: &Node) -> Option<usize> {
        self.index.get(node.name()).copied()
    }

    pub fn contains(&self, node: &Node) -> bool {
        self.index.contains_key(node.name())
    }

    pub fn num_rows(&self) -> usize {
        self.values.len()
    }

    pub fn num_columns(&self) -> usize {
        self.variables.len()
    }

    pub fn kind(&self) -> DataKind {
        self.values.kind()
    }

    pub fn values(&self) -> &DatasetValues {
        &self.values
    }

    /// Column values widened to `f64` (discrete codes are cast).
    pub fn column(&self, node: &Node) -> CoreResult<Vec<f64>> {
        let col = self.column_index(node).ok_or_else(|| CoreError::NodeNotFound {
            name: node.name().to_string(),
        })?;
        Ok(match &self.values {
            DatasetValues::Continuous(rows) => rows.iter().map(|r| r[col]).collect(),
            DatasetValues::Discrete(rows) => rows.iter().map(|r| r[col] as f64).collect(),
        })
    }

    /// New dataset made of the given source rows, in the given order.
    /// Indices may repeat (bootstrap draws).
    ///
    /// # Errors
    ///
    /// `ValidationError` if any index is out of range.
    pub fn select_rows(&self, indices: &[usize]) -> CoreResult<Dataset> {
        let rows = self.num_rows();
        if let Some(bad) = indices.iter().find(|&&i| i >= rows) {
            return Err(CoreError::validation(
                "rows",
                format!("row index {} out of range for {} rows", bad, rows),
            ));
        }
        Ok(Self {
            variables: self.variables.clone(),
            values: self.values.select_rows(indices),
            index: self.index.clone(),
        })
    }

    /// New dataset restricted to `nodes`, in the order given.
    ///
    /// # Errors
    ///
    /// `NodeNotFound` if a node is not a variable of this dataset.
    pub fn subset_columns(&self, nodes: &[Node]) -> CoreResult<Dataset> {
        let columns = nodes
            .iter()
            .map(|n| {
                self.column_index(n).ok_or_else(|| CoreError::NodeNotFound {
                    name: n.name().to_string(),
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;
        let variables = columns.iter().map(|&c| self.variables[c].clone()).collect();
        Self::new(variables, self.values.select_columns(&columns))
    }

    /// Checks that `datasets` is non-empty and every member shares the
    /// first one's ordered variables and data kind. Returns the first.
    ///
    /// # Errors
    ///
    /// - `IncompatibleDatasets` for an empty slice, mismatched variables or
    ///   mixed data kinds.
    pub fn check_compatible(datasets: &[Dataset]) -> CoreResult<&Dataset> {
        let first = datasets
            .first()
            .ok_or_else(|| CoreError::IncompatibleDatasets("no datasets to concatenate".into()))?;

        for (i, other) in datasets.iter().enumerate().skip(1) {
            if other.variables != first.variables {
                return Err(CoreError::IncompatibleDatasets(format!(
                    "dataset {} variables differ from dataset 0",
                    i
                )));
            }
            if other.kind() != first.kind() {
                return Err(CoreError::IncompatibleDatasets(format!(
                    "dataset {} is {:?}, dataset 0 is {:?}",
                    i,
                    other.kind(),
                    first.kind()
                )));
            }
        }
        Ok(first)
    }

    /// Row-wise concatenation of datasets over the same ordered variables and
    /// the same data kind.
    ///
    /// # Errors
    ///
    /// Same as [`Dataset::check_compatible`].
    pub fn concatenate(datasets: &[Dataset]) -> CoreResult<Dataset> {
        let first = Self::check_compatible(datasets)?;

        let values = match &first.values {
            DatasetValues::Continuous(_) => DatasetValues::Continuous(
                datasets
                    .iter()
                    .flat_map(|d| match &d.values {
                        DatasetValues::Continuous(rows) => rows.clone(),
                        DatasetValues::Discrete(_) => Vec::new(),
                    })
                    .collect(),
            ),
            DatasetValues::Discrete(_) => DatasetValues::Discrete(
                datasets
                    .iter()
                    .flat_map(|d| match &d.values {
                        DatasetValues::Discrete(rows) => rows.clone(),
                        DatasetValues::Continuous(_) => Vec::new(),
                    })
                    .collect(),
            ),
        };

        Ok(Self {
            variables: first.variables.clone(),
            values,
            index: first.index.clone(),
        })
    }
}

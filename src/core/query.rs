//! Filtering, projection and truncation over a [`NormalizedTable`].
//!
//! Querying is deliberately forgiving: filter keys and column names that are not part of
//! the schema are dropped instead of reported, so ad-hoc queries never fail.

use crate::domain::model::{Field, FieldValue, NormalizedRecord, NormalizedTable};
use std::collections::HashMap;

pub const DEFAULT_ROW_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLimit {
    Limited(usize),
    All,
}

impl RowLimit {
    fn apply(self, available: usize) -> usize {
        match self {
            RowLimit::Limited(n) => n.min(available),
            RowLimit::All => available,
        }
    }
}

impl Default for RowLimit {
    fn default() -> Self {
        RowLimit::Limited(DEFAULT_ROW_LIMIT)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRequest {
    pub limit: RowLimit,
    pub filters: HashMap<String, FieldValue>,
    pub columns: Option<Vec<String>>,
}

impl QueryRequest {
    pub fn new(limit: RowLimit) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub columns: Vec<Field>,
    pub rows: Vec<Vec<FieldValue>>,
    /// Rows that passed the filters, before truncation.
    pub total_matches: usize,
}

impl QueryResult {
    pub fn returned(&self) -> usize {
        self.rows.len()
    }
}

pub fn query(table: &NormalizedTable, request: &QueryRequest) -> QueryResult {
    let filters = resolve_filters(&request.filters);
    let columns = resolve_columns(request.columns.as_deref());

    let matching: Vec<&NormalizedRecord> = table
        .iter()
        .filter(|record| {
            filters
                .iter()
                .all(|(field, expected)| record.get(*field).matches(expected))
        })
        .collect();

    let total_matches = matching.len();
    let take = request.limit.apply(total_matches);

    let rows = matching
        .into_iter()
        .take(take)
        .map(|record| columns.iter().map(|field| record.get(*field)).collect())
        .collect();

    QueryResult {
        columns,
        rows,
        total_matches,
    }
}

fn resolve_filters(filters: &HashMap<String, FieldValue>) -> Vec<(Field, &FieldValue)> {
    filters
        .iter()
        .filter_map(|(name, value)| match Field::from_name(name) {
            Some(field) => Some((field, value)),
            None => {
                tracing::debug!("Ignoring filter on unknown field '{}'", name);
                None
            }
        })
        .collect()
}

fn resolve_columns(columns: Option<&[String]>) -> Vec<Field> {
    match columns {
        Some(names) if !names.is_empty() => names
            .iter()
            .filter_map(|name| {
                let field = Field::from_name(name);
                if field.is_none() {
                    tracing::debug!("Ignoring unknown column '{}'", name);
                }
                field
            })
            .collect(),
        _ => Field::ALL.to_vec(),
    }
}

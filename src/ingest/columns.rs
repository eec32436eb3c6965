//! Column selection and its resolution against a table header.

use crate::core::RawTable;
use crate::error::{ParamError, Result, SchemaError};
use serde::{Deserialize, Serialize};

/// Which columns of the raw table play which role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSelection {
    pub date_column: String,
    pub value_column: String,
    #[serde(default)]
    pub order_date_column: Option<String>,
    #[serde(default)]
    pub delivery_date_column: Option<String>,
    #[serde(default)]
    pub regressor_columns: Vec<String>,
}

impl ColumnSelection {
    pub fn new(date_column: impl Into<String>, value_column: impl Into<String>) -> Self {
        Self {
            date_column: date_column.into(),
            value_column: value_column.into(),
            order_date_column: None,
            delivery_date_column: None,
            regressor_columns: Vec::new(),
        }
    }

    /// Enable the order/delivery date consistency filter.
    pub fn with_order_delivery(
        mut self,
        order_date_column: impl Into<String>,
        delivery_date_column: impl Into<String>,
    ) -> Self {
        self.order_date_column = Some(order_date_column.into());
        self.delivery_date_column = Some(delivery_date_column.into());
        self
    }

    /// Add columns to treat as exogenous regressors.
    pub fn with_regressors<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regressor_columns
            .extend(names.into_iter().map(Into::into));
        self
    }
}

/// Column positions after checking a selection against a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub date: usize,
    pub value: usize,
    /// Regressors that exist in the table, in selection order.
    pub regressors: Vec<(String, usize)>,
    /// Requested regressors that were not usable.
    pub ignored_regressors: Vec<String>,
}

/// Check the selection against the table header.
///
/// Fails with a [`SchemaError`] when the date or value column is missing,
/// when they collide, or when the table has no rows, and with a
/// [`ParamError::NoValidRegressors`] when regressors were requested but none
/// of them exist.
pub fn resolve_columns(table: &RawTable, selection: &ColumnSelection) -> Result<ResolvedColumns> {
    if selection.date_column == selection.value_column {
        return Err(SchemaError::ColumnCollision {
            column: selection.date_column.clone(),
        }
        .into());
    }

    let date = table.require_column(&selection.date_column)?;
    let value = table.require_column(&selection.value_column)?;

    if table.is_empty() {
        return Err(SchemaError::EmptyTable.into());
    }

    let mut regressors: Vec<(String, usize)> = Vec::new();
    let mut ignored_regressors = Vec::new();
    for name in &selection.regressor_columns {
        let usable = name != &selection.date_column && name != &selection.value_column;
        match table.column_index(name) {
            Some(idx) if usable && !regressors.iter().any(|(n, _)| n == name) => {
                regressors.push((name.clone(), idx));
            }
            Some(_) if usable => {}
            _ => ignored_regressors.push(name.clone()),
        }
    }

    if !selection.regressor_columns.is_empty() && regressors.is_empty() {
        let available = table
            .columns()
            .iter()
            .filter(|c| **c != selection.date_column && **c != selection.value_column)
            .cloned()
            .collect();
        return Err(ParamError::NoValidRegressors {
            requested: selection.regressor_columns.clone(),
            available,
        }
        .into());
    }

    Ok(ResolvedColumns {
        date,
        value,
        regressors,
        ignored_regressors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Scalar;
    use crate::error::{ErrorKind, ForecastError};

    fn table(columns: &[&str], rows: usize) -> RawTable {
        RawTable::new(
            columns.iter().map(|c| c.to_string()).collect(),
            vec![vec![Scalar::Null; columns.len()]; rows],
        )
        .unwrap()
    }

    #[test]
    fn resolves_positions_and_ignores_unknown_regressors() {
        let t = table(&["ds", "y", "promo", "price"], 1);
        let selection =
            ColumnSelection::new("ds", "y").with_regressors(["price", "missing", "promo"]);
        let resolved = resolve_columns(&t, &selection).unwrap();

        assert_eq!(resolved.date, 0);
        assert_eq!(resolved.value, 1);
        assert_eq!(
            resolved.regressors,
            vec![("price".to_string(), 3), ("promo".to_string(), 2)]
        );
        assert_eq!(resolved.ignored_regressors, vec!["missing".to_string()]);
    }

    #[test]
    fn missing_value_column_is_a_schema_error() {
        let t = table(&["ds", "profit"], 3);
        let err = resolve_columns(&t, &ColumnSelection::new("ds", "sales")).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::Schema(SchemaError::MissingColumn { ref column, .. }) if column == "sales"
        ));
    }

    #[test]
    fn collision_and_empty_table_are_schema_errors() {
        let t = table(&["ds", "y"], 0);
        let err = resolve_columns(&t, &ColumnSelection::new("ds", "ds")).unwrap_err();
        assert!(matches!(err, ForecastError::Schema(SchemaError::ColumnCollision { .. })));

        let err = resolve_columns(&t, &ColumnSelection::new("ds", "y")).unwrap_err();
        assert!(matches!(err, ForecastError::Schema(SchemaError::EmptyTable)));
    }

    #[test]
    fn all_invalid_regressors_are_a_param_error() {
        let t = table(&["ds", "y", "promo"], 1);
        let selection = ColumnSelection::new("ds", "y").with_regressors(["nope", "y"]);
        let err = resolve_columns(&t, &selection).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Param);
        assert!(err.to_string().contains("promo"));
    }
}

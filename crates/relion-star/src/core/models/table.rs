use super::value::{ColumnType, Value};
use std::cmp::Ordering;
use thiserror::Error;

/// Errors raised by the column and row operations of a [`Table`].
///
/// Every failing operation leaves the table exactly as it was before the call.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TableError {
    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("Length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Type mismatch in column '{column}': expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: ColumnType,
        found: ColumnType,
    },

    #[error("Row index {index} is out of range for a table with {len} rows")]
    RowOutOfRange { index: usize, len: usize },

    #[error("Invalid column label '{0}': labels must be non-empty and contain no whitespace")]
    InvalidLabel(String),
}

fn check_label(label: &str) -> Result<(), TableError> {
    if label.is_empty() || label.contains(char::is_whitespace) {
        return Err(TableError::InvalidLabel(label.to_string()));
    }
    Ok(())
}

/// Strips the leading underscore used by STAR label declarations.
pub fn normalize_label(label: &str) -> &str {
    label.strip_prefix('_').unwrap_or(label)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    label: String,
    kind: ColumnType,
}

impl Column {
    pub fn new(label: impl Into<String>, kind: ColumnType) -> Self {
        let label = label.into();
        let label = match label.strip_prefix('_') {
            Some(stripped) => stripped.to_string(),
            None => label,
        };
        Self { label, kind }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn validate(&self) -> Result<(), TableError> {
        check_label(&self.label)
    }

    pub fn kind(&self) -> ColumnType {
        self.kind
    }
}

/// An in-memory STAR table: ordered typed columns and ordered rows.
///
/// Rows are stored as dense value vectors in column order. Every row holds
/// exactly one value per column and each value matches its column type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Creates an empty table with the given columns.
    ///
    /// # Errors
    ///
    /// * [`TableError::InvalidLabel`] if a label is empty or contains whitespace.
    /// * [`TableError::DuplicateColumn`] if two columns share a label.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        for (i, column) in columns.iter().enumerate() {
            column.validate()?;
            if columns[..i].iter().any(|c| c.label == column.label) {
                return Err(TableError::DuplicateColumn(column.label.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Convenience constructor from `(label, type)` pairs.
    pub fn with_columns<'a>(
        columns: impl IntoIterator<Item = (&'a str, ColumnType)>,
    ) -> Result<Self, TableError> {
        Self::new(
            columns
                .into_iter()
                .map(|(label, kind)| Column::new(label, kind))
                .collect(),
        )
    }

    /// Assembles a table whose rows were already validated by the caller.
    pub(crate) fn from_parts(columns: Vec<Column>, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.label.as_str())
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        let label = normalize_label(label);
        self.columns.iter().position(|c| c.label == label)
    }

    pub fn has_column(&self, label: &str) -> bool {
        self.column_index(label).is_some()
    }

    pub fn column(&self, label: &str) -> Option<&Column> {
        self.column_index(label).map(|i| &self.columns[i])
    }

    pub fn column_type(&self, label: &str) -> Result<ColumnType, TableError> {
        Ok(self.columns[self.require_column(label)?].kind)
    }

    fn require_column(&self, label: &str) -> Result<usize, TableError> {
        self.column_index(label)
            .ok_or_else(|| TableError::ColumnNotFound(normalize_label(label).to_string()))
    }

    fn check_type(column: &Column, value: &Value) -> Result<(), TableError> {
        let found = value.column_type();
        if found != column.kind {
            return Err(TableError::TypeMismatch {
                column: column.label.clone(),
                expected: column.kind,
                found,
            });
        }
        Ok(())
    }

    /// Appends a row given as values in column order.
    pub fn add_row(&mut self, values: Vec<Value>) -> Result<(), TableError> {
        if values.len() != self.columns.len() {
            return Err(TableError::LengthMismatch {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        for (column, value) in self.columns.iter().zip(&values) {
            Self::check_type(column, value)?;
        }
        self.rows.push(values);
        Ok(())
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.rows.len()).then_some(Row { table: self, index })
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = Row<'_>> {
        (0..self.rows.len()).map(move |index| Row { table: self, index })
    }

    pub fn value(&self, index: usize, label: &str) -> Result<&Value, TableError> {
        let col = self.require_column(label)?;
        self.rows
            .get(index)
            .map(|row| &row[col])
            .ok_or(TableError::RowOutOfRange {
                index,
                len: self.rows.len(),
            })
    }

    /// Returns the values of one column in row order.
    pub fn column_values(&self, label: &str) -> Result<Vec<&Value>, TableError> {
        let col = self.require_column(label)?;
        Ok(self.rows.iter().map(|row| &row[col]).collect())
    }

    /// Returns a numeric column as `f64`, widening integer columns.
    pub fn float_column(&self, label: &str) -> Result<Vec<f64>, TableError> {
        let col = self.require_column(label)?;
        let column = &self.columns[col];
        if !column.kind.is_numeric() {
            return Err(TableError::TypeMismatch {
                column: column.label.clone(),
                expected: ColumnType::Float,
                found: column.kind,
            });
        }
        Ok(self
            .rows
            .iter()
            .filter_map(|row| row[col].as_f64().ok())
            .collect())
    }

    pub fn int_column(&self, label: &str) -> Result<Vec<i64>, TableError> {
        let col = self.require_column(label)?;
        let column = &self.columns[col];
        if column.kind != ColumnType::Int {
            return Err(TableError::TypeMismatch {
                column: column.label.clone(),
                expected: ColumnType::Int,
                found: column.kind,
            });
        }
        Ok(self
            .rows
            .iter()
            .filter_map(|row| row[col].as_int().ok())
            .collect())
    }

    /// Appends a column whose type is taken from the first value.
    ///
    /// An empty `values` on an empty table creates a string column; use
    /// [`Table::add_column_typed`] to choose the type explicitly.
    pub fn add_column(
        &mut self,
        label: impl Into<String>,
        values: Vec<Value>,
    ) -> Result<(), TableError> {
        let kind = values
            .first()
            .map(Value::column_type)
            .unwrap_or(ColumnType::Str);
        self.add_column_typed(label, kind, values)
    }

    pub fn add_column_typed(
        &mut self,
        label: impl Into<String>,
        kind: ColumnType,
        values: Vec<Value>,
    ) -> Result<(), TableError> {
        let column = Column::new(label, kind);
        column.validate()?;
        if self.has_column(&column.label) {
            return Err(TableError::DuplicateColumn(column.label));
        }
        if values.len() != self.rows.len() {
            return Err(TableError::LengthMismatch {
                expected: self.rows.len(),
                actual: values.len(),
            });
        }
        for value in &values {
            Self::check_type(&column, value)?;
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn remove_column(&mut self, label: &str) -> Result<Column, TableError> {
        let col = self.require_column(label)?;
        for row in &mut self.rows {
            row.remove(col);
        }
        Ok(self.columns.remove(col))
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<(), TableError> {
        let col = self.require_column(from)?;
        let to = normalize_label(to);
        check_label(to)?;
        if let Some(existing) = self.column_index(to) {
            if existing != col {
                return Err(TableError::DuplicateColumn(to.to_string()));
            }
        }
        self.columns[col].label = to.to_string();
        Ok(())
    }

    /// Replaces one cell, keeping the column type fixed.
    pub fn set_value(
        &mut self,
        index: usize,
        label: &str,
        value: Value,
    ) -> Result<(), TableError> {
        let col = self.require_column(label)?;
        Self::check_type(&self.columns[col], &value)?;
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(TableError::RowOutOfRange { index, len })?;
        row[col] = value;
        Ok(())
    }

    /// Builds a new table from the rows accepted by `predicate`.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Table
    where
        F: FnMut(&Row<'_>) -> bool,
    {
        let rows = self
            .rows()
            .filter(|row| predicate(row))
            .map(|row| self.rows[row.index].clone())
            .collect();
        Table::from_parts(self.columns.clone(), rows)
    }

    /// Stable sort on one column.
    ///
    /// Numbers compare numerically with NaN placed last regardless of
    /// direction; strings compare lexically.
    pub fn sort_by_column(&mut self, label: &str, descending: bool) -> Result<(), TableError> {
        let col = self.require_column(label)?;
        self.rows.sort_by(|a, b| {
            let ord = compare_values(&a[col], &b[col]);
            match (is_nan(&a[col]), is_nan(&b[col])) {
                (false, false) if descending => ord.reverse(),
                _ => ord,
            }
        });
        Ok(())
    }
}

fn is_nan(value: &Value) -> bool {
    matches!(value, Value::Float(v) if v.is_nan())
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Str(x), Value::Str(y)) => x.cmp(y),
        _ => match (a.as_f64(), b.as_f64()) {
            (Ok(x), Ok(y)) => match (x.is_nan(), y.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            },
            _ => Ordering::Equal,
        },
    }
}

/// A borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn values(&self) -> &'a [Value] {
        &self.table.rows[self.index]
    }

    pub fn get(&self, label: &str) -> Option<&'a Value> {
        self.table
            .column_index(label)
            .map(|col| &self.table.rows[self.index][col])
    }

    fn typed<T>(
        &self,
        label: &str,
        read: impl FnOnce(&'a Value) -> Result<T, super::value::ValueTypeError>,
    ) -> Result<T, TableError> {
        let value = self
            .get(label)
            .ok_or_else(|| TableError::ColumnNotFound(normalize_label(label).to_string()))?;
        read(value).map_err(|e| TableError::TypeMismatch {
            column: normalize_label(label).to_string(),
            expected: e.expected,
            found: e.found,
        })
    }

    pub fn get_int(&self, label: &str) -> Result<i64, TableError> {
        self.typed(label, Value::as_int)
    }

    /// Reads a numeric cell as `f64`, accepting integer columns.
    pub fn get_float(&self, label: &str) -> Result<f64, TableError> {
        self.typed(label, Value::as_f64)
    }

    pub fn get_str(&self, label: &str) -> Result<&'a str, TableError> {
        self.typed(label, Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particles() -> Table {
        let mut table = Table::with_columns([
            ("rlnImageId", ColumnType::Int),
            ("rlnDefocusU", ColumnType::Float),
            ("rlnImageName", ColumnType::Str),
        ])
        .unwrap();
        table
            .add_row(vec![1.into(), 10000.0.into(), "a.mrcs".into()])
            .unwrap();
        table
            .add_row(vec![2.into(), 12000.0.into(), "b.mrcs".into()])
            .unwrap();
        table
            .add_row(vec![3.into(), 11000.0.into(), "c.mrcs".into()])
            .unwrap();
        table
    }

    #[test]
    fn new_rejects_duplicate_labels() {
        let result = Table::with_columns([("rlnA", ColumnType::Int), ("_rlnA", ColumnType::Int)]);
        assert_eq!(result, Err(TableError::DuplicateColumn("rlnA".into())));
    }

    #[test]
    fn column_values_are_returned_in_row_order() {
        let table = particles();
        let values = table.column_values("rlnDefocusU").unwrap();
        assert_eq!(
            values,
            vec![&Value::Float(10000.0), &Value::Float(12000.0), &Value::Float(11000.0)]
        );
    }

    #[test]
    fn column_lookup_accepts_leading_underscore() {
        let table = particles();
        assert!(table.has_column("_rlnImageName"));
        assert_eq!(table.column_type("_rlnImageId").unwrap(), ColumnType::Int);
    }

    #[test]
    fn column_values_fails_for_missing_label() {
        let table = particles();
        assert_eq!(
            table.column_values("rlnVoltage"),
            Err(TableError::ColumnNotFound("rlnVoltage".into()))
        );
    }

    #[test]
    fn add_row_checks_length_and_types() {
        let mut table = particles();
        assert!(matches!(
            table.add_row(vec![4.into()]),
            Err(TableError::LengthMismatch {
                expected: 3,
                actual: 1
            })
        ));
        assert!(matches!(
            table.add_row(vec![4.into(), 1.into(), "d".into()]),
            Err(TableError::TypeMismatch { .. })
        ));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn add_column_appends_at_the_end() {
        let mut table = particles();
        table
            .add_column("rlnClassNumber", vec![1.into(), 2.into(), 1.into()])
            .unwrap();
        let labels: Vec<_> = table.labels().collect();
        assert_eq!(
            labels,
            vec!["rlnImageId", "rlnDefocusU", "rlnImageName", "rlnClassNumber"]
        );
        assert_eq!(table.int_column("rlnClassNumber").unwrap(), vec![1, 2, 1]);
    }

    #[test]
    fn add_column_with_short_values_leaves_table_unmodified() {
        let mut table = particles();
        let before = table.clone();
        let result = table.add_column("rlnClassNumber", vec![1.into(), 2.into()]);
        assert_eq!(
            result,
            Err(TableError::LengthMismatch {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(table, before);
    }

    #[test]
    fn add_column_rejects_mixed_types_without_modifying() {
        let mut table = particles();
        let before = table.clone();
        let result = table.add_column("rlnMixed", vec![1.into(), 2.5.into(), 3.into()]);
        assert!(matches!(result, Err(TableError::TypeMismatch { .. })));
        assert_eq!(table, before);
    }

    #[test]
    fn add_column_rejects_existing_label() {
        let mut table = particles();
        let result = table.add_column("rlnImageId", vec![1.into(), 2.into(), 3.into()]);
        assert_eq!(result, Err(TableError::DuplicateColumn("rlnImageId".into())));
    }

    #[test]
    fn add_column_typed_on_empty_table() {
        let mut table = Table::default();
        table
            .add_column_typed("rlnVoltage", ColumnType::Float, vec![])
            .unwrap();
        assert_eq!(table.column_type("rlnVoltage").unwrap(), ColumnType::Float);
        assert!(table.is_empty());
    }

    #[test]
    fn set_value_type_checks() {
        let mut table = particles();
        table
            .set_value(1, "rlnDefocusU", Value::Float(15000.0))
            .unwrap();
        assert_eq!(table.value(1, "rlnDefocusU").unwrap(), &Value::Float(15000.0));

        let err = table
            .set_value(1, "rlnDefocusU", Value::Str("high".into()))
            .unwrap_err();
        assert_eq!(
            err,
            TableError::TypeMismatch {
                column: "rlnDefocusU".into(),
                expected: ColumnType::Float,
                found: ColumnType::Str
            }
        );
        assert!(matches!(
            table.set_value(9, "rlnDefocusU", Value::Float(1.0)),
            Err(TableError::RowOutOfRange { index: 9, len: 3 })
        ));
    }

    #[test]
    fn filter_rows_returns_new_table_and_keeps_source() {
        let table = particles();
        let high = table.filter_rows(|row| row.get_float("rlnDefocusU").unwrap() > 10500.0);
        assert_eq!(table.len(), 3);
        assert_eq!(high.len(), 2);
        assert_eq!(high.columns(), table.columns());
        assert_eq!(high.int_column("rlnImageId").unwrap(), vec![2, 3]);
    }

    #[test]
    fn sort_by_column_orders_numerically_and_is_stable() {
        let mut table = particles();
        table.sort_by_column("rlnDefocusU", true).unwrap();
        assert_eq!(table.int_column("rlnImageId").unwrap(), vec![2, 3, 1]);
        table.sort_by_column("rlnImageName", false).unwrap();
        assert_eq!(table.int_column("rlnImageId").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn sort_places_nan_last_in_both_directions() {
        let mut table = Table::with_columns([("rlnScore", ColumnType::Float)]).unwrap();
        for v in [2.0, f64::NAN, 1.0, 3.0] {
            table.add_row(vec![v.into()]).unwrap();
        }
        table.sort_by_column("rlnScore", false).unwrap();
        let asc = table.float_column("rlnScore").unwrap();
        assert_eq!(&asc[..3], &[1.0, 2.0, 3.0]);
        assert!(asc[3].is_nan());

        table.sort_by_column("rlnScore", true).unwrap();
        let desc = table.float_column("rlnScore").unwrap();
        assert_eq!(&desc[..3], &[3.0, 2.0, 1.0]);
        assert!(desc[3].is_nan());
    }

    #[test]
    fn remove_and_rename_columns() {
        let mut table = particles();
        let removed = table.remove_column("rlnImageName").unwrap();
        assert_eq!(removed.kind(), ColumnType::Str);
        assert_eq!(table.row(0).unwrap().values().len(), 2);

        table.rename_column("rlnImageId", "rlnParticleId").unwrap();
        assert!(table.has_column("rlnParticleId"));
        assert_eq!(
            table.rename_column("rlnParticleId", "rlnDefocusU"),
            Err(TableError::DuplicateColumn("rlnDefocusU".into()))
        );
    }

    #[test]
    fn labels_must_be_non_empty_without_whitespace() {
        assert_eq!(
            Table::with_columns([("rln A", ColumnType::Int)]),
            Err(TableError::InvalidLabel("rln A".into()))
        );
        assert_eq!(
            Table::with_columns([("_", ColumnType::Int)]),
            Err(TableError::InvalidLabel("".into()))
        );

        let mut table = particles();
        let before = table.clone();
        assert_eq!(
            table.add_column_typed("rln\tScore", ColumnType::Float, vec![0.0.into(); 3]),
            Err(TableError::InvalidLabel("rln\tScore".into()))
        );
        assert_eq!(
            table.rename_column("rlnImageId", "rln Id"),
            Err(TableError::InvalidLabel("rln Id".into()))
        );
        assert_eq!(
            table.rename_column("rlnImageId", ""),
            Err(TableError::InvalidLabel("".into()))
        );
        assert_eq!(table, before);
    }

    #[test]
    fn row_accessors_are_typed() {
        let table = particles();
        let row = table.row(0).unwrap();
        assert_eq!(row.get_int("rlnImageId").unwrap(), 1);
        assert_eq!(row.get_float("rlnImageId").unwrap(), 1.0);
        assert_eq!(row.get_str("rlnImageName").unwrap(), "a.mrcs");
        assert!(matches!(
            row.get_str("rlnDefocusU"),
            Err(TableError::TypeMismatch { .. })
        ));
        assert!(table.row(3).is_none());
    }

    #[test]
    fn float_column_rejects_string_columns() {
        let table = particles();
        assert!(table.float_column("rlnImageName").is_err());
        assert_eq!(table.float_column("rlnImageId").unwrap(), vec![1.0, 2.0, 3.0]);
    }
}
